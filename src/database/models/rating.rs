use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::media::MediaCategory;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rating {
    pub rating_id: Uuid,
    pub media_id: Uuid,
    /// The rater; only this user may update or delete the rating
    pub user_id: Uuid,
    pub score: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Rating row joined with rater and media summaries
#[derive(Debug, Clone, FromRow)]
pub struct RatingDetail {
    #[sqlx(flatten)]
    pub rating: Rating,
    pub rater_username: String,
    pub media_title: String,
    pub media_category: MediaCategory,
}
