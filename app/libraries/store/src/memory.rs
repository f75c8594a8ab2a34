use crate::{ArticleStore, like::ilike, validate_rows};
use app_error::AppError;
use app_schema::{
    community::{CommunityMatch, CommunityQa, CommunityQaRow, CommunityStats, top_tags},
    knowledge::{ArticleField, KnowledgeArticle},
};
use async_trait::async_trait;
use serde::Deserialize;
use std::{fs, path::Path};
use uuid::Uuid;

const STATS_TAG_SAMPLE: usize = 1000;
const STATS_TOP_TAGS: usize = 10;

#[derive(Debug, Default, Deserialize)]
struct SeedFile {
    #[serde(default)]
    knowledge_base: Vec<KnowledgeArticle>,
    #[serde(default)]
    community_qa: Vec<CommunityQaRow>,
}

/// Process-local store with the same query semantics as the Postgres one.
/// Used for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryArticleStore {
    articles: Vec<KnowledgeArticle>,
    community: Vec<CommunityQa>,
}

impl MemoryArticleStore {
    pub fn new(articles: Vec<KnowledgeArticle>, community: Vec<CommunityQa>) -> Self {
        Self {
            articles,
            community,
        }
    }

    pub fn from_seed_json(json: &str) -> Result<Self, AppError> {
        let seed: SeedFile = serde_json::from_str(json)?;
        let community = validate_rows(seed.community_qa)
            .into_iter()
            .map(|m| m.qa)
            .collect();
        Ok(Self::new(seed.knowledge_base, community))
    }

    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let json = fs::read_to_string(path)?;
        Self::from_seed_json(&json)
    }

    pub fn article_count(&self) -> usize {
        self.articles.len()
    }

    pub fn community_count(&self) -> usize {
        self.community.len()
    }

    fn active_by_priority<P>(&self, predicate: P, limit: usize) -> Vec<KnowledgeArticle>
    where
        P: Fn(&KnowledgeArticle) -> bool,
    {
        let mut hits: Vec<&KnowledgeArticle> = self
            .articles
            .iter()
            .filter(|a| a.is_active && predicate(a))
            .collect();
        hits.sort_by(|a, b| b.priority.cmp(&a.priority));
        hits.into_iter().take(limit).cloned().collect()
    }

    fn community_by_upvotes<P>(&self, predicate: P, limit: usize) -> Vec<CommunityMatch>
    where
        P: Fn(&CommunityQa) -> bool,
    {
        let mut hits: Vec<&CommunityQa> = self.community.iter().filter(|q| predicate(q)).collect();
        hits.sort_by(|a, b| b.upvotes.cmp(&a.upvotes));
        hits.into_iter()
            .take(limit)
            .map(|qa| CommunityMatch {
                qa: qa.clone(),
                rank: None,
            })
            .collect()
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn knowledge_by_text(
        &self,
        field: ArticleField,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<KnowledgeArticle>, AppError> {
        Ok(self.active_by_priority(|a| ilike(pattern, field.value(a)), limit))
    }

    async fn knowledge_by_terms(
        &self,
        words: &[String],
        limit: usize,
    ) -> Result<Vec<KnowledgeArticle>, AppError> {
        Ok(self.active_by_priority(
            |a| {
                a.keywords.iter().any(|k| words.contains(k)) || a.tags.iter().any(|t| words.contains(t))
            },
            limit,
        ))
    }

    async fn knowledge_by_category(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<KnowledgeArticle>, AppError> {
        Ok(self.active_by_priority(|a| a.category == category, limit))
    }

    async fn knowledge_by_id(&self, id: Uuid) -> Result<Option<KnowledgeArticle>, AppError> {
        Ok(self
            .articles
            .iter()
            .find(|a| a.is_active && a.id == id)
            .cloned())
    }

    /// Ranks by the share of query words found anywhere in the entry,
    /// breaking ties on upvotes.
    async fn community_ranked(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CommunityMatch>, AppError> {
        let lower = query.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();
        if words.is_empty() {
            return Ok(Vec::new());
        }
        let mut ranked: Vec<CommunityMatch> = self
            .community
            .iter()
            .filter_map(|qa| {
                let haystack = format!(
                    "{} {} {}",
                    qa.title,
                    qa.question,
                    qa.answer.as_deref().unwrap_or("")
                )
                .to_lowercase();
                let found = words.iter().filter(|w| haystack.contains(**w)).count();
                (found > 0).then(|| CommunityMatch {
                    qa: qa.clone(),
                    rank: Some(found as f32 / words.len() as f32),
                })
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.rank
                .partial_cmp(&a.rank)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.qa.upvotes.cmp(&a.qa.upvotes))
        });
        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn community_by_text(
        &self,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<CommunityMatch>, AppError> {
        Ok(self.community_by_upvotes(
            |qa| {
                ilike(pattern, &qa.title)
                    || ilike(pattern, &qa.question)
                    || qa.answer.as_deref().is_some_and(|a| ilike(pattern, a))
            },
            limit,
        ))
    }

    async fn community_by_tags(
        &self,
        tags: &[String],
        limit: usize,
    ) -> Result<Vec<CommunityMatch>, AppError> {
        Ok(self.community_by_upvotes(|qa| tags.iter().all(|t| qa.tags.contains(t)), limit))
    }

    async fn community_stats(&self) -> Result<CommunityStats, AppError> {
        let total = self.community.len();
        let answered = self.community.iter().filter(|q| q.answer.is_some()).count();
        let average = if total == 0 {
            0.0
        } else {
            self.community.iter().map(|q| q.upvotes as f64).sum::<f64>() / total as f64
        };
        Ok(CommunityStats {
            total_posts: total as i64,
            total_answers: answered as i64,
            average_upvotes: average.round() as i64,
            top_tags: top_tags(
                self.community
                    .iter()
                    .take(STATS_TAG_SAMPLE)
                    .map(|q| q.tags.as_slice()),
                STATS_TOP_TAGS,
            ),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;

    fn article(title: &str, priority: i32, active: bool, keywords: &[&str]) -> KnowledgeArticle {
        KnowledgeArticle {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: format!("All about {title}."),
            category: "claims".to_string(),
            tags: vec!["va".to_string()],
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            priority,
            is_active: active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn qa(title: &str, upvotes: u32, tags: &[&str]) -> CommunityQa {
        CommunityQa {
            id: Uuid::new_v4(),
            title: title.to_string(),
            question: String::new(),
            answer: Some(format!("Answer to {title}")),
            upvotes,
            url: "https://reddit.com/r/VeteransBenefits".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn store() -> MemoryArticleStore {
        MemoryArticleStore::new(
            vec![
                article("PTSD Claims", 1, true, &["ptsd"]),
                article("PTSD Secondary Conditions", 5, true, &["ptsd", "secondary"]),
                article("Retired PTSD Guide", 9, false, &["ptsd"]),
            ],
            vec![
                qa("PTSD claim timeline", 40, &["ptsd", "claims"]),
                qa("PTSD nexus letter", 90, &["ptsd"]),
                qa("GI Bill housing", 10, &["education"]),
            ],
        )
    }

    #[tokio::test]
    async fn text_match_is_active_only_and_priority_ordered() {
        let hits = store()
            .knowledge_by_text(ArticleField::Title, "%ptsd%", 10)
            .await
            .unwrap();
        let titles: Vec<&str> = hits.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["PTSD Secondary Conditions", "PTSD Claims"]);
    }

    #[tokio::test]
    async fn term_match_uses_containment() {
        let s = store();
        let hits = s
            .knowledge_by_terms(&["secondary".to_string()], 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        let by_tag = s.knowledge_by_terms(&["va".to_string()], 1).await.unwrap();
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].title, "PTSD Secondary Conditions");
    }

    #[tokio::test]
    async fn inactive_article_is_not_found_by_id() {
        let s = store();
        let retired = s.articles[2].id;
        assert!(s.knowledge_by_id(retired).await.unwrap().is_none());
        let live = s.articles[0].id;
        assert!(s.knowledge_by_id(live).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn community_ranked_prefers_coverage_then_upvotes() {
        let hits = store().community_ranked("ptsd claim", 5).await.unwrap();
        assert_eq!(hits[0].qa.title, "PTSD claim timeline");
        assert_eq!(hits[0].rank, Some(1.0));
        assert_eq!(hits[1].qa.title, "PTSD nexus letter");
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn community_text_and_tags_order_by_upvotes() {
        let s = store();
        let text = s.community_by_text("%ptsd%", 5).await.unwrap();
        assert_eq!(text[0].qa.title, "PTSD nexus letter");
        let tagged = s
            .community_by_tags(&["ptsd".to_string(), "claims".to_string()], 5)
            .await
            .unwrap();
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].qa.title, "PTSD claim timeline");
    }

    #[tokio::test]
    async fn stats_summarise_corpus() {
        let stats = store().community_stats().await.unwrap();
        assert_eq!(stats.total_posts, 3);
        assert_eq!(stats.total_answers, 3);
        assert_eq!(stats.average_upvotes, 47);
        assert_eq!(stats.top_tags[0].tag, "ptsd");
        assert_eq!(stats.top_tags[0].count, 2);
    }

    #[test]
    fn seed_json_drops_malformed_community_rows() {
        let json = r#"{
            "knowledge_base": [{
                "id": "7d3c5f0e-4a86-4f53-9b0c-3c1f9d5e2a11",
                "title": "Tinnitus and Hearing Loss Claims",
                "content": "Tinnitus is rated at 10%.",
                "category": "claims",
                "keywords": ["tinnitus", "hearing"],
                "priority": 2
            }],
            "community_qa": [
                {"id": "0b6f2c52-0f5e-4a8e-8f43-1d2f1f6f8a01", "title": "Tinnitus only 10%?", "url": "https://reddit.com/1", "upvotes": 5},
                {"id": "0b6f2c52-0f5e-4a8e-8f43-1d2f1f6f8a02", "title": null, "url": "https://reddit.com/2"}
            ]
        }"#;
        let s = MemoryArticleStore::from_seed_json(json).unwrap();
        assert_eq!(s.article_count(), 1);
        assert_eq!(s.community_count(), 1);
    }

    #[tokio::test]
    async fn bundled_seed_loads() {
        let s = MemoryArticleStore::from_seed_json(include_str!("../../../seed/command_seed.json"))
            .unwrap();
        assert_eq!(s.article_count(), 6);
        assert_eq!(s.community_count(), 4);
        let hits = s
            .knowledge_by_terms(&["tinnitus".to_string()], 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Tinnitus and Hearing Loss Claims");
    }
}
