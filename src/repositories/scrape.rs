use crate::entities::{ScrapeResult, ScrapeRow};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres, types::Json};
use uuid::Uuid;

const SCRAPE_COLUMNS: &str = r#"
    id, created_at, user_id, url, title, meta_description, keywords, links,
    highlighted_content, og_data, raw_content, ai_summary, short_summary,
    verified_origin, future_forecast, relevance_score, social_posts,
    key_highlights, analysis_source
"#;

/// Per-user storage of scrape results. Every read and delete is scoped to
/// the owning user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScrapeRepositoryTrait: Send + Sync {
    /// Stores `result` for `user_id`, returning it with id and timestamp.
    async fn insert(&self, user_id: Uuid, result: &ScrapeResult) -> Result<ScrapeResult>;

    /// The user's results, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ScrapeResult>>;

    async fn find_for_user(&self, user_id: Uuid, id: Uuid) -> Result<Option<ScrapeResult>>;

    /// Returns whether a row was removed.
    async fn delete_for_user(&self, user_id: Uuid, id: Uuid) -> Result<bool>;
}

#[derive(Clone)]
pub struct ScrapeRepository {
    pool: Pool<Postgres>,
}

impl ScrapeRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScrapeRepositoryTrait for ScrapeRepository {
    async fn insert(&self, user_id: Uuid, result: &ScrapeResult) -> Result<ScrapeResult> {
        let query = format!(
            r#"
            INSERT INTO scrapes
                  (user_id, url, title, meta_description, keywords, links,
                   highlighted_content, og_data, raw_content, ai_summary, short_summary,
                   verified_origin, future_forecast, relevance_score, social_posts,
                   key_highlights, analysis_source)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {}
            "#,
            SCRAPE_COLUMNS
        );

        let row = sqlx::query_as::<_, ScrapeRow>(&query)
            .bind(user_id)
            .bind(&result.url)
            .bind(&result.title)
            .bind(&result.meta_description)
            .bind(&result.keywords)
            .bind(Json(&result.links))
            .bind(Json(&result.highlighted_content))
            .bind(result.og_data.as_ref().map(Json))
            .bind(&result.raw_content)
            .bind(&result.ai_summary)
            .bind(&result.short_summary)
            .bind(&result.verified_origin)
            .bind(&result.future_forecast)
            .bind(result.relevance_score)
            .bind(result.social_posts.as_ref().map(Json))
            .bind(result.key_highlights.as_ref().map(Json))
            .bind(result.analysis_source.map(|s| s.as_str()))
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ScrapeResult>> {
        let query = format!(
            r#"
            SELECT {}
            FROM scrapes
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
            SCRAPE_COLUMNS
        );

        let rows = sqlx::query_as::<_, ScrapeRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ScrapeResult::from).collect())
    }

    async fn find_for_user(&self, user_id: Uuid, id: Uuid) -> Result<Option<ScrapeResult>> {
        let query = format!(
            r#"
            SELECT {}
            FROM scrapes
            WHERE id = $1 AND user_id = $2
            "#,
            SCRAPE_COLUMNS
        );

        let row = sqlx::query_as::<_, ScrapeRow>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ScrapeResult::from))
    }

    async fn delete_for_user(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM scrapes
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
