use crate::{ArticleStore, validate_rows};
use app_config::AppConfig;
use app_error::AppError;
use app_schema::{
    community::{CommunityCounts, CommunityMatch, CommunityQaRow, CommunityStats, top_tags},
    knowledge::{ArticleField, KnowledgeArticle},
};
use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, future::Future, time::Duration};
use tracing::*;
use uuid::Uuid;

const DATABASE_URL: &'static str = "DATABASE_URL";
const STATS_TAG_SAMPLE: i64 = 1000;
const STATS_TOP_TAGS: usize = 10;

const MIGRATIONS: [&'static str; 4] = [
    include_str!("../../../SQL/migrations/001_knowledge_base.sql"),
    include_str!("../../../SQL/migrations/002_community_qa.sql"),
    include_str!("../../../SQL/migrations/003_community_qa_index.sql"),
    include_str!("../../../SQL/migrations/004_search_community_qa.sql"),
];

pub struct PgArticleStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgArticleStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let database_url = env::var(DATABASE_URL).map_err(|e| {
            AppError::internal(format!("Cannot locate {DATABASE_URL} env variable: {e}"))
        })?;
        let max_connections = u32::try_from(config.pg_connection)
            .map_err(|_| AppError::internal("pg_connection does not fit in u32"))?;
        let timeout = Duration::from_secs(config.query_timeout_secs);
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .connect(&database_url)
            .await?;
        Ok(Self::new(pool, timeout))
    }

    /// Creates both tables and the `search_community_qa` ranking function if
    /// they are missing.
    pub async fn migrate(&self) -> Result<(), AppError> {
        for statement in MIGRATIONS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn bounded<T, F>(&self, query: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        Ok(tokio::time::timeout(self.timeout, query).await??)
    }
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn knowledge_by_text(
        &self,
        field: ArticleField,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<KnowledgeArticle>, AppError> {
        let query = format!(
            r"{} WHERE is_active = TRUE AND {} ILIKE $1 ESCAPE '\' ORDER BY priority DESC LIMIT $2",
            KnowledgeArticle::select_base(),
            field.column()
        );
        let rows = self
            .bounded(
                sqlx::query_as::<_, KnowledgeArticle>(&query)
                    .bind(pattern)
                    .bind(sql_limit(limit))
                    .fetch_all(&self.pool),
            )
            .await?;
        debug!("knowledge {} match: {} rows", field.column(), rows.len());
        Ok(rows)
    }

    async fn knowledge_by_terms(
        &self,
        words: &[String],
        limit: usize,
    ) -> Result<Vec<KnowledgeArticle>, AppError> {
        let query = format!(
            "{} WHERE is_active = TRUE AND (keywords && $1 OR tags && $1) ORDER BY priority DESC LIMIT $2",
            KnowledgeArticle::select_base()
        );
        let rows = self
            .bounded(
                sqlx::query_as::<_, KnowledgeArticle>(&query)
                    .bind(words)
                    .bind(sql_limit(limit))
                    .fetch_all(&self.pool),
            )
            .await?;
        debug!("knowledge keyword/tag match: {} rows", rows.len());
        Ok(rows)
    }

    async fn knowledge_by_category(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<KnowledgeArticle>, AppError> {
        let query = format!(
            "{} WHERE is_active = TRUE AND category = $1 ORDER BY priority DESC LIMIT $2",
            KnowledgeArticle::select_base()
        );
        self.bounded(
            sqlx::query_as::<_, KnowledgeArticle>(&query)
                .bind(category)
                .bind(sql_limit(limit))
                .fetch_all(&self.pool),
        )
        .await
    }

    async fn knowledge_by_id(&self, id: Uuid) -> Result<Option<KnowledgeArticle>, AppError> {
        let query = format!(
            "{} WHERE is_active = TRUE AND id = $1",
            KnowledgeArticle::select_base()
        );
        self.bounded(
            sqlx::query_as::<_, KnowledgeArticle>(&query)
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn community_ranked(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CommunityMatch>, AppError> {
        let result_limit = i32::try_from(limit).unwrap_or(i32::MAX);
        let rows = self
            .bounded(
                sqlx::query_as::<_, CommunityQaRow>(CommunityQaRow::search_ranked())
                    .bind(query)
                    .bind(result_limit)
                    .fetch_all(&self.pool),
            )
            .await?;
        Ok(validate_rows(rows))
    }

    async fn community_by_text(
        &self,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<CommunityMatch>, AppError> {
        let query = format!(
            r"{} WHERE title ILIKE $1 ESCAPE '\' OR question ILIKE $1 ESCAPE '\' OR answer ILIKE $1 ESCAPE '\' ORDER BY upvotes DESC NULLS LAST LIMIT $2",
            CommunityQaRow::select_base()
        );
        let rows = self
            .bounded(
                sqlx::query_as::<_, CommunityQaRow>(&query)
                    .bind(pattern)
                    .bind(sql_limit(limit))
                    .fetch_all(&self.pool),
            )
            .await?;
        Ok(validate_rows(rows))
    }

    async fn community_by_tags(
        &self,
        tags: &[String],
        limit: usize,
    ) -> Result<Vec<CommunityMatch>, AppError> {
        let query = format!(
            "{} WHERE tags @> $1 ORDER BY upvotes DESC NULLS LAST LIMIT $2",
            CommunityQaRow::select_base()
        );
        let rows = self
            .bounded(
                sqlx::query_as::<_, CommunityQaRow>(&query)
                    .bind(tags)
                    .bind(sql_limit(limit))
                    .fetch_all(&self.pool),
            )
            .await?;
        Ok(validate_rows(rows))
    }

    async fn community_stats(&self) -> Result<CommunityStats, AppError> {
        let counts = self
            .bounded(
                sqlx::query_as::<_, CommunityCounts>(CommunityCounts::select())
                    .fetch_one(&self.pool),
            )
            .await?;
        let tag_rows = self
            .bounded(
                sqlx::query_scalar::<_, Option<Vec<String>>>(
                    "SELECT tags FROM community_qa LIMIT $1",
                )
                .bind(STATS_TAG_SAMPLE)
                .fetch_all(&self.pool),
            )
            .await?;
        let tag_lists: Vec<Vec<String>> = tag_rows.into_iter().flatten().collect();
        Ok(CommunityStats {
            total_posts: counts.total_posts,
            total_answers: counts.total_answers,
            average_upvotes: counts.average_upvotes.round() as i64,
            top_tags: top_tags(tag_lists.iter().map(Vec::as_slice), STATS_TOP_TAGS),
        })
    }
}
