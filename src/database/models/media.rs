use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Closed category set for media content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MediaCategory {
    Game,
    Video,
    Artwork,
    Music,
}

impl MediaCategory {
    pub const ALL: [MediaCategory; 4] = [
        MediaCategory::Game,
        MediaCategory::Video,
        MediaCategory::Artwork,
        MediaCategory::Music,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::Game => "game",
            MediaCategory::Video => "video",
            MediaCategory::Artwork => "artwork",
            MediaCategory::Music => "music",
        }
    }

    pub fn parse(value: &str) -> Option<MediaCategory> {
        match value {
            "game" => Some(MediaCategory::Game),
            "video" => Some(MediaCategory::Video),
            "artwork" => Some(MediaCategory::Artwork),
            "music" => Some(MediaCategory::Music),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MediaContent {
    pub media_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: MediaCategory,
    pub thumbnail_url: Option<String>,
    pub content_url: String,
    /// Owning user, immutable after creation
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Media row joined with its creator and live rating aggregates
#[derive(Debug, Clone, FromRow)]
pub struct ContentDetail {
    #[sqlx(flatten)]
    pub media: MediaContent,
    pub creator_username: String,
    pub rating_total: i64,
    pub rating_average: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parse_round_trips() {
        for category in MediaCategory::ALL {
            assert_eq!(MediaCategory::parse(category.as_str()), Some(category));
        }
    }

    #[test]
    fn category_rejects_unknown_values() {
        assert_eq!(MediaCategory::parse("podcast"), None);
        assert_eq!(MediaCategory::parse("GAME"), None);
        assert_eq!(MediaCategory::parse(""), None);
    }
}
