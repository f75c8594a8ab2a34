//! Read-only access to the knowledge base and the community Q&A corpus.
//!
//! Callers receive an [`ArticleStore`] explicitly (usually an
//! `Arc<dyn ArticleStore>` out of the application state) and never reach for a
//! process-wide client.

pub mod like;
pub mod memory;
pub mod postgres;

use app_config::{AppConfig, StoreBackend};
use app_error::AppError;
use app_schema::{
    community::{CommunityMatch, CommunityQaRow, CommunityStats},
    knowledge::{ArticleField, KnowledgeArticle},
};
use async_trait::async_trait;
use memory::MemoryArticleStore;
use postgres::PgArticleStore;
use std::sync::Arc;
use tracing::*;
use uuid::Uuid;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Active articles whose `field` matches a case-insensitive LIKE
    /// `pattern` (backslash escapes), highest priority first.
    async fn knowledge_by_text(
        &self,
        field: ArticleField,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<KnowledgeArticle>, AppError>;

    /// Active articles whose keyword or tag array contains any of `words`,
    /// highest priority first.
    async fn knowledge_by_terms(
        &self,
        words: &[String],
        limit: usize,
    ) -> Result<Vec<KnowledgeArticle>, AppError>;

    async fn knowledge_by_category(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<KnowledgeArticle>, AppError>;

    async fn knowledge_by_id(&self, id: Uuid) -> Result<Option<KnowledgeArticle>, AppError>;

    /// Server-side full-text ranking of the community corpus.
    async fn community_ranked(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CommunityMatch>, AppError>;

    /// Substring match over title, question and answer, most upvoted first.
    async fn community_by_text(
        &self,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<CommunityMatch>, AppError>;

    /// Entries carrying every tag in `tags`, most upvoted first.
    async fn community_by_tags(
        &self,
        tags: &[String],
        limit: usize,
    ) -> Result<Vec<CommunityMatch>, AppError>;

    async fn community_stats(&self) -> Result<CommunityStats, AppError>;
}

/// Drops community rows that fail validation, logging each one.
pub fn validate_rows(rows: Vec<CommunityQaRow>) -> Vec<CommunityMatch> {
    rows.into_iter()
        .filter_map(|row| match row.validate() {
            Ok(m) => Some(m),
            Err(rejection) => {
                warn!("Skipping malformed community row: {}", rejection);
                None
            }
        })
        .collect()
}

pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn ArticleStore>, AppError> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let store = PgArticleStore::connect(config).await?;
            store.migrate().await?;
            info!("Article store: postgres");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            let store = match &config.seed_path {
                Some(path) => MemoryArticleStore::from_seed_file(path)?,
                None => MemoryArticleStore::default(),
            };
            info!(
                "Article store: memory ({} articles, {} community entries)",
                store.article_count(),
                store.community_count()
            );
            Ok(Arc::new(store))
        }
    }
}
