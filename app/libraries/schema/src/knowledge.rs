use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Curated reference article about a veteran benefits topic.
///
/// Articles are authored outside this service; every query path here is
/// read-only and only ever sees rows with `is_active = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct KnowledgeArticle {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl KnowledgeArticle {
    #[inline]
    pub fn select_base() -> &'static str {
        include_str!("../../../SQL/knowledge_base/select_base.sql")
    }
}

/// Free-text column of `knowledge_base` that a substring pattern runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleField {
    Title,
    Content,
}

impl ArticleField {
    #[inline]
    pub fn column(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
        }
    }

    #[inline]
    pub fn value<'a>(&self, article: &'a KnowledgeArticle) -> &'a str {
        match self {
            Self::Title => &article.title,
            Self::Content => &article.content,
        }
    }
}
