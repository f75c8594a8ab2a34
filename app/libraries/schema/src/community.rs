use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{collections::HashMap, fmt};
use uuid::Uuid;

/// Row as it comes back from `community_qa`; the scraper fills these columns
/// loosely, so nothing beyond the id is trusted until [`CommunityQaRow::validate`].
#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct CommunityQaRow {
    pub id: Uuid,
    pub title: Option<String>,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub upvotes: Option<i32>,
    pub url: Option<String>,
    #[sqlx(default)]
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[sqlx(default)]
    #[serde(default)]
    pub relevance_score: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityQa {
    pub id: Uuid,
    pub title: String,
    pub question: String,
    pub answer: Option<String>,
    pub upvotes: u32,
    pub url: String,
    pub tags: Vec<String>,
}

/// Community Q&A entry paired with the store's own ranking, when it has one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityMatch {
    pub qa: CommunityQa,
    pub rank: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    MissingTitle(Uuid),
    MissingUrl(Uuid),
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTitle(id) => write!(f, "community row {id} has no title"),
            Self::MissingUrl(id) => write!(f, "community row {id} has no source url"),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl CommunityQaRow {
    #[inline]
    pub fn select_base() -> &'static str {
        include_str!("../../../SQL/community_qa/select_base.sql")
    }

    #[inline]
    pub fn search_ranked() -> &'static str {
        include_str!("../../../SQL/community_qa/search_ranked.sql")
    }

    pub fn validate(self) -> Result<CommunityMatch, RowRejection> {
        let title = non_blank(self.title).ok_or(RowRejection::MissingTitle(self.id))?;
        let url = non_blank(self.url).ok_or(RowRejection::MissingUrl(self.id))?;
        Ok(CommunityMatch {
            qa: CommunityQa {
                id: self.id,
                title,
                question: self.question.unwrap_or_default(),
                answer: non_blank(self.answer),
                upvotes: self.upvotes.unwrap_or(0).max(0) as u32,
                url,
                tags: self.tags.unwrap_or_default(),
            },
            rank: self.relevance_score,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommunityStats {
    pub total_posts: i64,
    pub total_answers: i64,
    pub average_upvotes: i64,
    pub top_tags: Vec<TagCount>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CommunityCounts {
    pub total_posts: i64,
    pub total_answers: i64,
    pub average_upvotes: f64,
}

impl CommunityCounts {
    #[inline]
    pub fn select() -> &'static str {
        include_str!("../../../SQL/community_qa/stats_counts.sql")
    }
}

/// Most frequent tags, highest count first; ties keep first-seen order.
pub fn top_tags<'a, I>(tag_lists: I, n: usize) -> Vec<TagCount>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for tags in tag_lists {
        for tag in tags {
            let entry = counts.entry(tag.as_str()).or_insert_with(|| {
                order.push(tag.as_str());
                0
            });
            *entry += 1;
        }
    }
    let mut ranked: Vec<TagCount> = order
        .into_iter()
        .map(|tag| TagCount {
            tag: tag.to_string(),
            count: counts[tag],
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}
