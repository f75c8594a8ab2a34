//! Best-effort retrieval over the knowledge base and the community corpus.
//!
//! Nothing in here returns an error: a failing store query is recorded in the
//! [`SearchOutcome`] and contributes no rows, so callers can always proceed.

pub mod community;
pub mod knowledge;

use app_error::AppError;
use serde::Serialize;
use std::fmt;
use tracing::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QuerySource {
    KnowledgeTitle,
    KnowledgeContent,
    KnowledgeTerms,
    CommunityRanked,
    CommunityFallback,
}

impl fmt::Display for QuerySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::KnowledgeTitle => "knowledge title",
            Self::KnowledgeContent => "knowledge content",
            Self::KnowledgeTerms => "knowledge keywords/tags",
            Self::CommunityRanked => "community ranked search",
            Self::CommunityFallback => "community fallback search",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryFailure {
    pub source: QuerySource,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EmptyReason {
    /// Query had no searchable text.
    BlankQuery,
    /// Every query ran and nothing matched.
    NoMatches,
    /// Nothing came back and at least one query failed.
    Unavailable(Vec<QueryFailure>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SearchOutcome<T> {
    Hits {
        hits: Vec<T>,
        degraded: Vec<QueryFailure>,
    },
    Empty(EmptyReason),
}

impl<T> SearchOutcome<T> {
    pub fn from_parts(hits: Vec<T>, failures: Vec<QueryFailure>) -> Self {
        if !hits.is_empty() {
            Self::Hits {
                hits,
                degraded: failures,
            }
        } else if failures.is_empty() {
            Self::Empty(EmptyReason::NoMatches)
        } else {
            Self::Empty(EmptyReason::Unavailable(failures))
        }
    }

    pub fn hits(&self) -> &[T] {
        match self {
            Self::Hits { hits, .. } => hits,
            Self::Empty(_) => &[],
        }
    }

    pub fn into_hits(self) -> Vec<T> {
        match self {
            Self::Hits { hits, .. } => hits,
            Self::Empty(_) => Vec::new(),
        }
    }

    /// Failures behind this outcome, whether or not rows still came back.
    pub fn failures(&self) -> &[QueryFailure] {
        match self {
            Self::Hits { degraded, .. } => degraded,
            Self::Empty(EmptyReason::Unavailable(failures)) => failures,
            Self::Empty(_) => &[],
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.failures().is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits().is_empty()
    }
}

/// Unwraps a store result, turning an error into "no rows" and a recorded failure.
pub(crate) fn rows_or_record<R>(
    result: Result<Vec<R>, AppError>,
    source: QuerySource,
    failures: &mut Vec<QueryFailure>,
) -> Vec<R> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            warn!("{} query failed, continuing without it: {}", source, e.message);
            failures.push(QueryFailure {
                source,
                message: e.message,
            });
            Vec::new()
        }
    }
}

/// Escapes LIKE metacharacters so user text only ever matches literally.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `%…%` substring pattern for `input`.
pub fn contains_pattern(input: &str) -> String {
    format!("%{}%", escape_like(input))
}
