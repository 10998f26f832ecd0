use sqlx::PgPool;
use uuid::Uuid;

use crate::api::pagination::{PageInfo, PageParams};
use crate::database::manager::DatabaseManager;
use crate::database::models::{Rating, RatingDetail};

use super::aggregation::{RatingStats, MAX_SCORE, MIN_SCORE};
use super::{authorization, is_foreign_key_violation, is_unique_violation, ServiceError};

/// Joined select shared by get/list
const DETAIL_SELECT: &str = "SELECT r.*, u.username AS rater_username, \
       m.title AS media_title, m.category AS media_category \
 FROM ratings r \
 JOIN users u ON u.user_id = r.user_id \
 JOIN media_content m ON m.media_id = r.media_id";

/// Partial update. Inner `Option` on comment distinguishes "clear the
/// comment" (explicit null) from "leave unchanged" (absent key).
#[derive(Debug, Clone, Default)]
pub struct RatingPatch {
    pub score: Option<i32>,
    pub comment: Option<Option<String>>,
}

impl RatingPatch {
    pub fn is_empty(&self) -> bool {
        self.score.is_none() && self.comment.is_none()
    }
}

pub struct RatingService {
    pool: PgPool,
}

impl RatingService {
    pub async fn new() -> Result<Self, ServiceError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Create a rating and bump the content owner's received-rating counter
    /// in one transaction.
    ///
    /// Duplicate (media, rater) pairs are not pre-checked: the insert runs
    /// unconditionally and the unique constraint reports the loser of any
    /// race, which surfaces here as Conflict.
    pub async fn create_rating(
        &self,
        rater_id: Uuid,
        media_id: Uuid,
        score: i32,
        comment: Option<String>,
    ) -> Result<RatingDetail, ServiceError> {
        validate_score(score)?;

        let mut tx = self.pool.begin().await?;

        let owner_id =
            sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM media_content WHERE media_id = $1")
                .bind(media_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| ServiceError::NotFound("Media content not found".to_string()))?;

        let inserted = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO ratings (media_id, user_id, score, comment) \
             VALUES ($1, $2, $3, $4) RETURNING rating_id",
        )
        .bind(media_id)
        .bind(rater_id)
        .bind(score)
        .bind(&comment)
        .fetch_one(&mut *tx)
        .await;

        let rating_id = match inserted {
            Ok(id) => id,
            Err(e) if is_unique_violation(&e) => {
                return Err(ServiceError::Conflict(
                    "You have already rated this content".to_string(),
                ));
            }
            // Media deleted between the owner lookup and the insert
            Err(e) if is_foreign_key_violation(&e) => {
                return Err(ServiceError::NotFound(
                    "Media content not found".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        sqlx::query(
            "UPDATE users SET rating_count = rating_count + 1, updated_at = now() \
             WHERE user_id = $1",
        )
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_rating(rating_id).await
    }

    pub async fn get_rating(&self, rating_id: Uuid) -> Result<RatingDetail, ServiceError> {
        let sql = format!("{DETAIL_SELECT} WHERE r.rating_id = $1");
        sqlx::query_as::<_, RatingDetail>(&sql)
            .bind(rating_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Rating not found".to_string()))
    }

    /// Newest-first listing; ties on created_at are broken by rating_id so
    /// pages stay stable across requests.
    pub async fn list_ratings(
        &self,
        media_id: Option<Uuid>,
        user_id: Option<Uuid>,
        page: PageParams,
    ) -> Result<(Vec<RatingDetail>, PageInfo), ServiceError> {
        let mut conditions: Vec<String> = Vec::new();
        let mut next_param = 0usize;

        if media_id.is_some() {
            next_param += 1;
            conditions.push(format!("r.media_id = ${}", next_param));
        }
        if user_id.is_some() {
            next_param += 1;
            conditions.push(format!("r.user_id = ${}", next_param));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM ratings r{where_clause}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(media_id) = media_id {
            count_query = count_query.bind(media_id);
        }
        if let Some(user_id) = user_id {
            count_query = count_query.bind(user_id);
        }
        let total_items = count_query.fetch_one(&self.pool).await?;

        let list_sql = format!(
            "{DETAIL_SELECT}{where_clause} \
             ORDER BY r.created_at DESC, r.rating_id DESC \
             LIMIT ${limit} OFFSET ${offset}",
            limit = next_param + 1,
            offset = next_param + 2,
        );
        let mut list_query = sqlx::query_as::<_, RatingDetail>(&list_sql);
        if let Some(media_id) = media_id {
            list_query = list_query.bind(media_id);
        }
        if let Some(user_id) = user_id {
            list_query = list_query.bind(user_id);
        }
        let items = list_query
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((items, PageInfo::new(page, total_items)))
    }

    pub async fn update_rating(
        &self,
        rating_id: Uuid,
        actor_id: Uuid,
        patch: RatingPatch,
    ) -> Result<RatingDetail, ServiceError> {
        let rating = self.fetch_rating(rating_id).await?;
        authorization::ensure_owner(actor_id, rating.user_id, "You can only update your own ratings")?;

        if patch.is_empty() {
            return Err(ServiceError::validation(
                "At least one field must be provided for update",
            ));
        }
        if let Some(score) = patch.score {
            validate_score(score)?;
        }

        let score = patch.score.unwrap_or(rating.score);
        let comment = match patch.comment {
            Some(value) => value,
            None => rating.comment,
        };

        sqlx::query(
            "UPDATE ratings SET score = $2, comment = $3, updated_at = now() \
             WHERE rating_id = $1",
        )
        .bind(rating_id)
        .bind(score)
        .bind(&comment)
        .execute(&self.pool)
        .await?;

        self.get_rating(rating_id).await
    }

    /// Delete a rating and decrement the content owner's counter in one
    /// transaction.
    pub async fn delete_rating(&self, rating_id: Uuid, actor_id: Uuid) -> Result<(), ServiceError> {
        let rating = self.fetch_rating(rating_id).await?;
        authorization::ensure_owner(actor_id, rating.user_id, "You can only delete your own ratings")?;

        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM ratings WHERE rating_id = $1")
            .bind(rating_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            // Already gone (concurrent delete or cascading content delete)
            tx.rollback().await?;
            return Err(ServiceError::NotFound("Rating not found".to_string()));
        }

        sqlx::query(
            "UPDATE users u SET rating_count = u.rating_count - 1, updated_at = now() \
             FROM media_content m \
             WHERE m.media_id = $1 AND u.user_id = m.user_id",
        )
        .bind(rating.media_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Rating statistics for one media item, computed from live ledger rows.
    pub async fn compute_stats(&self, media_id: Uuid) -> Result<(String, RatingStats), ServiceError> {
        let title =
            sqlx::query_scalar::<_, String>("SELECT title FROM media_content WHERE media_id = $1")
                .bind(media_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| ServiceError::NotFound("Media content not found".to_string()))?;

        let buckets = sqlx::query_as::<_, (i32, i64)>(
            "SELECT score, COUNT(*) FROM ratings WHERE media_id = $1 GROUP BY score",
        )
        .bind(media_id)
        .fetch_all(&self.pool)
        .await?;

        Ok((title, RatingStats::from_buckets(&buckets)))
    }

    /// Recompute every user's received-rating counter from scratch and fix
    /// any row that disagrees. Returns the number of repaired rows. The
    /// per-mutation transactional updates keep this at zero; running it at
    /// startup turns silent drift into a logged, corrected anomaly.
    pub async fn reconcile_rating_counts(&self) -> Result<u64, ServiceError> {
        let repaired = sqlx::query(
            "UPDATE users u SET rating_count = sub.actual \
             FROM ( \
                 SELECT u2.user_id, COUNT(r.rating_id) AS actual \
                 FROM users u2 \
                 LEFT JOIN media_content m ON m.user_id = u2.user_id \
                 LEFT JOIN ratings r ON r.media_id = m.media_id \
                 GROUP BY u2.user_id \
             ) sub \
             WHERE u.user_id = sub.user_id AND u.rating_count <> sub.actual",
        )
        .execute(&self.pool)
        .await?;

        Ok(repaired.rows_affected())
    }

    async fn fetch_rating(&self, rating_id: Uuid) -> Result<Rating, ServiceError> {
        sqlx::query_as::<_, Rating>("SELECT * FROM ratings WHERE rating_id = $1")
            .bind(rating_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Rating not found".to_string()))
    }
}

fn validate_score(score: i32) -> Result<(), ServiceError> {
    if (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(())
    } else {
        Err(ServiceError::field("score", "Must be between 1 and 5"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_scores_are_accepted() {
        assert!(validate_score(1).is_ok());
        assert!(validate_score(5).is_ok());
    }

    #[test]
    fn out_of_range_scores_are_rejected() {
        for score in [0, 6, -1, 100] {
            let err = validate_score(score).unwrap_err();
            match err {
                ServiceError::Validation {
                    field_errors: Some(fields),
                    ..
                } => assert!(fields.contains_key("score"), "score {} missing field", score),
                other => panic!("expected Validation for {}, got {:?}", score, other),
            }
        }
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(RatingPatch::default().is_empty());
        assert!(!RatingPatch {
            score: Some(4),
            ..RatingPatch::default()
        }
        .is_empty());
        // Explicit null comment still counts as a supplied field
        assert!(!RatingPatch {
            comment: Some(None),
            ..RatingPatch::default()
        }
        .is_empty());
    }
}
