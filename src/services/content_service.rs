use sqlx::PgPool;
use std::collections::HashMap;
use url::Url;
use uuid::Uuid;

use crate::api::pagination::{PageInfo, PageParams};
use crate::database::manager::DatabaseManager;
use crate::database::models::{ContentDetail, MediaCategory, MediaContent};

use super::{authorization, ServiceError};

const MAX_TITLE_LEN: usize = 255;
const MAX_URL_LEN: usize = 512;

/// Joined select shared by get/list; aggregates are read live from the
/// ratings table so results always reflect the latest committed mutation.
const DETAIL_SELECT: &str = "SELECT m.*, u.username AS creator_username, \
       COUNT(r.rating_id) AS rating_total, \
       COALESCE(AVG(r.score), 0)::float8 AS rating_average \
 FROM media_content m \
 JOIN users u ON u.user_id = m.user_id \
 LEFT JOIN ratings r ON r.media_id = m.media_id";

/// Creation input as received on the wire
#[derive(Debug, Clone)]
pub struct NewContent {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub thumbnail_url: Option<String>,
    pub content_url: String,
}

/// Partial update. Inner `Option` distinguishes "clear the column" (explicit
/// null) from "leave unchanged" (absent key) for the nullable fields.
#[derive(Debug, Clone, Default)]
pub struct ContentPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<String>,
    pub thumbnail_url: Option<Option<String>>,
    pub content_url: Option<String>,
}

impl ContentPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.thumbnail_url.is_none()
            && self.content_url.is_none()
    }
}

/// List filters; `sort_by` and `order` are pre-validated enums so no caller
/// input ever reaches the ORDER BY clause as text.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    pub category: Option<MediaCategory>,
    pub user_id: Option<Uuid>,
    pub search: Option<String>,
    pub sort_by: ContentSort,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSort {
    CreatedAt,
    UpdatedAt,
    Title,
}

impl ContentSort {
    pub const ALLOWED: &'static [&'static str] = &["created_at", "updated_at", "title"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created_at" => Some(ContentSort::CreatedAt),
            "updated_at" => Some(ContentSort::UpdatedAt),
            "title" => Some(ContentSort::Title),
            _ => None,
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            ContentSort::CreatedAt => "m.created_at",
            ContentSort::UpdatedAt => "m.updated_at",
            ContentSort::Title => "m.title",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

pub struct ContentService {
    pool: PgPool,
}

impl ContentService {
    pub async fn new() -> Result<Self, ServiceError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub async fn create_content(
        &self,
        owner_id: Uuid,
        input: NewContent,
    ) -> Result<ContentDetail, ServiceError> {
        let category = validate_new_content(&input)?;

        let media_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO media_content \
               (title, description, category, thumbnail_url, content_url, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING media_id",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(category)
        .bind(&input.thumbnail_url)
        .bind(&input.content_url)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        self.get_content(media_id).await
    }

    pub async fn get_content(&self, media_id: Uuid) -> Result<ContentDetail, ServiceError> {
        let sql = format!(
            "{DETAIL_SELECT} WHERE m.media_id = $1 GROUP BY m.media_id, u.user_id"
        );
        sqlx::query_as::<_, ContentDetail>(&sql)
            .bind(media_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Content not found".to_string()))
    }

    /// Filtered, sorted, paginated listing. Ties on the sort column are
    /// broken by media_id so pages stay stable across requests.
    pub async fn list_content(
        &self,
        filter: &ContentFilter,
        page: PageParams,
    ) -> Result<(Vec<ContentDetail>, PageInfo), ServiceError> {
        let mut conditions: Vec<String> = Vec::new();
        let mut next_param = 0usize;

        if filter.category.is_some() {
            next_param += 1;
            conditions.push(format!("m.category = ${}", next_param));
        }
        if filter.user_id.is_some() {
            next_param += 1;
            conditions.push(format!("m.user_id = ${}", next_param));
        }
        if filter.search.is_some() {
            next_param += 1;
            conditions.push(format!(
                "(m.title ILIKE ${p} OR m.description ILIKE ${p})",
                p = next_param
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM media_content m{where_clause}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(category) = filter.category {
            count_query = count_query.bind(category);
        }
        if let Some(user_id) = filter.user_id {
            count_query = count_query.bind(user_id);
        }
        if let Some(search) = &filter.search {
            count_query = count_query.bind(format!("%{}%", search));
        }
        let total_items = count_query.fetch_one(&self.pool).await?;

        let list_sql = format!(
            "{DETAIL_SELECT}{where_clause} \
             GROUP BY m.media_id, u.user_id \
             ORDER BY {sort} {order}, m.media_id DESC \
             LIMIT ${limit} OFFSET ${offset}",
            sort = filter.sort_by.as_sql(),
            order = filter.order.as_sql(),
            limit = next_param + 1,
            offset = next_param + 2,
        );
        let mut list_query = sqlx::query_as::<_, ContentDetail>(&list_sql);
        if let Some(category) = filter.category {
            list_query = list_query.bind(category);
        }
        if let Some(user_id) = filter.user_id {
            list_query = list_query.bind(user_id);
        }
        if let Some(search) = &filter.search {
            list_query = list_query.bind(format!("%{}%", search));
        }
        let items = list_query
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((items, PageInfo::new(page, total_items)))
    }

    pub async fn update_content(
        &self,
        media_id: Uuid,
        actor_id: Uuid,
        patch: ContentPatch,
    ) -> Result<ContentDetail, ServiceError> {
        let media = self.fetch_media(media_id).await?;
        authorization::ensure_owner(actor_id, media.user_id, "You can only update your own content")?;

        let merged = validate_patch(&media, patch)?;

        sqlx::query(
            "UPDATE media_content SET \
               title = $2, description = $3, category = $4, \
               thumbnail_url = $5, content_url = $6, updated_at = now() \
             WHERE media_id = $1",
        )
        .bind(media_id)
        .bind(&merged.title)
        .bind(&merged.description)
        .bind(merged.category)
        .bind(&merged.thumbnail_url)
        .bind(&merged.content_url)
        .execute(&self.pool)
        .await?;

        self.get_content(media_id).await
    }

    /// Delete content and its ratings. The owner's received-rating counter
    /// loses one per cascaded rating; the delta is computed and applied in
    /// the same transaction that removes the row, so the counter can never
    /// drift even if the request dies mid-way.
    pub async fn delete_content(&self, media_id: Uuid, actor_id: Uuid) -> Result<(), ServiceError> {
        let media = self.fetch_media(media_id).await?;
        authorization::ensure_owner(actor_id, media.user_id, "You can only delete your own content")?;

        let mut tx = self.pool.begin().await?;

        let rating_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ratings WHERE media_id = $1")
                .bind(media_id)
                .fetch_one(&mut *tx)
                .await?;

        if rating_count > 0 {
            sqlx::query(
                "UPDATE users SET rating_count = rating_count - $2, updated_at = now() \
                 WHERE user_id = $1",
            )
            .bind(media.user_id)
            .bind(rating_count as i32)
            .execute(&mut *tx)
            .await?;
        }

        let deleted = sqlx::query("DELETE FROM media_content WHERE media_id = $1")
            .bind(media_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            // Lost a race with a concurrent delete; roll back the counter change
            tx.rollback().await?;
            return Err(ServiceError::NotFound("Content not found".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn fetch_media(&self, media_id: Uuid) -> Result<MediaContent, ServiceError> {
        sqlx::query_as::<_, MediaContent>("SELECT * FROM media_content WHERE media_id = $1")
            .bind(media_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Content not found".to_string()))
    }
}

struct MergedContent {
    title: String,
    description: Option<String>,
    category: MediaCategory,
    thumbnail_url: Option<String>,
    content_url: String,
}

fn validate_new_content(input: &NewContent) -> Result<MediaCategory, ServiceError> {
    let mut errors = HashMap::new();

    check_title(&input.title, &mut errors);
    let category = check_category(&input.category, &mut errors);
    check_url("content_url", &input.content_url, &mut errors);
    if let Some(thumbnail) = &input.thumbnail_url {
        check_url("thumbnail_url", thumbnail, &mut errors);
    }

    match (errors.is_empty(), category) {
        (true, Some(category)) => Ok(category),
        _ => Err(ServiceError::Validation {
            message: "Validation failed".to_string(),
            field_errors: Some(errors),
        }),
    }
}

fn validate_patch(current: &MediaContent, patch: ContentPatch) -> Result<MergedContent, ServiceError> {
    if patch.is_empty() {
        return Err(ServiceError::validation(
            "At least one field must be provided for update",
        ));
    }

    let mut errors = HashMap::new();

    let title = patch.title.unwrap_or_else(|| current.title.clone());
    check_title(&title, &mut errors);

    let category = match &patch.category {
        Some(raw) => check_category(raw, &mut errors),
        None => Some(current.category),
    };

    let content_url = patch
        .content_url
        .unwrap_or_else(|| current.content_url.clone());
    check_url("content_url", &content_url, &mut errors);

    let thumbnail_url = match patch.thumbnail_url {
        Some(value) => value,
        None => current.thumbnail_url.clone(),
    };
    if let Some(thumbnail) = &thumbnail_url {
        check_url("thumbnail_url", thumbnail, &mut errors);
    }

    let description = match patch.description {
        Some(value) => value,
        None => current.description.clone(),
    };

    match (errors.is_empty(), category) {
        (true, Some(category)) => Ok(MergedContent {
            title,
            description,
            category,
            thumbnail_url,
            content_url,
        }),
        _ => Err(ServiceError::Validation {
            message: "Validation failed".to_string(),
            field_errors: Some(errors),
        }),
    }
}

fn check_title(title: &str, errors: &mut HashMap<String, String>) {
    if title.trim().is_empty() || title.len() > MAX_TITLE_LEN {
        errors.insert(
            "title".to_string(),
            "Length must be between 1 and 255".to_string(),
        );
    }
}

fn check_category(raw: &str, errors: &mut HashMap<String, String>) -> Option<MediaCategory> {
    let category = MediaCategory::parse(raw);
    if category.is_none() {
        errors.insert(
            "category".to_string(),
            "Must be one of: game, video, artwork, music".to_string(),
        );
    }
    category
}

fn check_url(field: &str, value: &str, errors: &mut HashMap<String, String>) {
    if value.is_empty() {
        errors.insert(field.to_string(), "Missing data for required field".to_string());
        return;
    }
    if value.len() > MAX_URL_LEN {
        errors.insert(
            field.to_string(),
            "Longer than maximum length 512".to_string(),
        );
        return;
    }
    if Url::parse(value).is_err() {
        errors.insert(field.to_string(), "Not a valid URL".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_content() -> NewContent {
        NewContent {
            title: "Pixel Odyssey".to_string(),
            description: Some("A retro platformer".to_string()),
            category: "game".to_string(),
            thumbnail_url: None,
            content_url: "https://cdn.example.com/games/pixel-odyssey".to_string(),
        }
    }

    fn field_errors(err: ServiceError) -> HashMap<String, String> {
        match err {
            ServiceError::Validation {
                field_errors: Some(fields),
                ..
            } => fields,
            other => panic!("expected field validation error, got {:?}", other),
        }
    }

    #[test]
    fn valid_content_parses_its_category() {
        assert_eq!(
            validate_new_content(&new_content()).unwrap(),
            MediaCategory::Game
        );
    }

    #[test]
    fn unknown_category_is_rejected() {
        let mut input = new_content();
        input.category = "podcast".to_string();
        let fields = field_errors(validate_new_content(&input).unwrap_err());
        assert!(fields.contains_key("category"));
    }

    #[test]
    fn content_url_must_be_present_and_parse() {
        let mut input = new_content();
        input.content_url = String::new();
        let fields = field_errors(validate_new_content(&input).unwrap_err());
        assert!(fields.contains_key("content_url"));

        let mut input = new_content();
        input.content_url = "not a url".to_string();
        let fields = field_errors(validate_new_content(&input).unwrap_err());
        assert!(fields.contains_key("content_url"));
    }

    #[test]
    fn multiple_failures_are_reported_together() {
        let input = NewContent {
            title: String::new(),
            description: None,
            category: "podcast".to_string(),
            thumbnail_url: Some("nope".to_string()),
            content_url: String::new(),
        };
        let fields = field_errors(validate_new_content(&input).unwrap_err());
        assert_eq!(fields.len(), 4);
    }

    #[test]
    fn sort_allow_list_rejects_unknown_columns() {
        assert_eq!(ContentSort::parse("created_at"), Some(ContentSort::CreatedAt));
        assert_eq!(ContentSort::parse("title"), Some(ContentSort::Title));
        assert_eq!(ContentSort::parse("password_hash"), None);
        assert_eq!(ContentSort::parse("created_at; DROP TABLE users"), None);
        assert_eq!(SortOrder::parse("asc"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("random()"), None);
    }

    #[test]
    fn empty_patch_is_invalid() {
        let current = MediaContent {
            media_id: Uuid::new_v4(),
            title: "Old".to_string(),
            description: None,
            category: MediaCategory::Game,
            thumbnail_url: None,
            content_url: "https://cdn.example.com/x".to_string(),
            user_id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert!(validate_patch(&current, ContentPatch::default()).is_err());
    }

    #[test]
    fn patch_merges_over_current_values() {
        let current = MediaContent {
            media_id: Uuid::new_v4(),
            title: "Old".to_string(),
            description: Some("keep me".to_string()),
            category: MediaCategory::Game,
            thumbnail_url: Some("https://cdn.example.com/t.png".to_string()),
            content_url: "https://cdn.example.com/x".to_string(),
            user_id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let merged = validate_patch(
            &current,
            ContentPatch {
                title: Some("New".to_string()),
                // Explicit null clears the thumbnail; absent description is kept
                thumbnail_url: Some(None),
                ..ContentPatch::default()
            },
        )
        .unwrap();
        assert_eq!(merged.title, "New");
        assert_eq!(merged.description.as_deref(), Some("keep me"));
        assert_eq!(merged.thumbnail_url, None);
        assert_eq!(merged.category, MediaCategory::Game);
    }
}
