//! Wire formatting: converts joined database records into response JSON.

use serde_json::{json, Value};

use crate::database::models::{ContentDetail, RatingDetail, User};
use crate::services::aggregation::round_half_up;

/// Public user profile. Email is only included for the account owner
/// (registration, login, and /api/auth/me responses).
pub fn user_profile(user: &User, include_email: bool) -> Value {
    let mut data = json!({
        "user_id": user.user_id,
        "username": user.username,
        "rating_count": user.rating_count,
        "last_login": user.last_login,
        "created_at": user.created_at,
    });
    if include_email {
        data["email"] = json!(user.email);
    }
    data
}

/// Media content with creator summary and live rating stats
pub fn content_detail(detail: &ContentDetail) -> Value {
    let media = &detail.media;
    json!({
        "media_id": media.media_id,
        "title": media.title,
        "description": media.description,
        "category": media.category,
        "thumbnail_url": media.thumbnail_url,
        "content_url": media.content_url,
        "user_id": media.user_id,
        "created_at": media.created_at,
        "updated_at": media.updated_at,
        "creator": {
            "user_id": media.user_id,
            "username": detail.creator_username,
        },
        "stats": {
            "total_ratings": detail.rating_total,
            "average_rating": round_half_up(detail.rating_average, 2),
        },
    })
}

/// Rating with rater and media summaries
pub fn rating_detail(detail: &RatingDetail) -> Value {
    let rating = &detail.rating;
    json!({
        "rating_id": rating.rating_id,
        "media_id": rating.media_id,
        "user_id": rating.user_id,
        "score": rating.score,
        "comment": rating.comment,
        "created_at": rating.created_at,
        "updated_at": rating.updated_at,
        "user": {
            "user_id": rating.user_id,
            "username": detail.rater_username,
        },
        "media": {
            "media_id": rating.media_id,
            "title": detail.media_title,
            "category": detail.media_category,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{MediaCategory, MediaContent, Rating};
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_user() -> User {
        User {
            user_id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$argon2id$...".into(),
            rating_count: 3,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn profile_hides_email_and_hash_by_default() {
        let user = sample_user();
        let value = user_profile(&user, false);
        assert!(value.get("email").is_none());
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["username"], "alice");
    }

    #[test]
    fn profile_includes_email_for_owner() {
        let user = sample_user();
        let value = user_profile(&user, true);
        assert_eq!(value["email"], "alice@example.com");
    }

    #[test]
    fn content_detail_nests_creator_and_stats() {
        let owner = Uuid::new_v4();
        let detail = ContentDetail {
            media: MediaContent {
                media_id: Uuid::new_v4(),
                title: "Deep Dive".into(),
                description: None,
                category: MediaCategory::Video,
                thumbnail_url: None,
                content_url: "https://cdn.example.com/v/1".into(),
                user_id: owner,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            creator_username: "bob".into(),
            rating_total: 3,
            rating_average: 14.0 / 3.0,
        };
        let value = content_detail(&detail);
        assert_eq!(value["creator"]["username"], "bob");
        assert_eq!(value["category"], "video");
        assert_eq!(value["stats"]["total_ratings"], 3);
        assert_eq!(value["stats"]["average_rating"], 4.67);
    }

    #[test]
    fn rating_detail_nests_user_and_media() {
        let detail = RatingDetail {
            rating: Rating {
                rating_id: Uuid::new_v4(),
                media_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                score: 5,
                comment: Some("great".into()),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            rater_username: "carol".into(),
            media_title: "Skyline".into(),
            media_category: MediaCategory::Artwork,
        };
        let value = rating_detail(&detail);
        assert_eq!(value["score"], 5);
        assert_eq!(value["user"]["username"], "carol");
        assert_eq!(value["media"]["title"], "Skyline");
        assert_eq!(value["media"]["category"], "artwork");
    }
}
