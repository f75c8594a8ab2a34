use crate::{QueryFailure, QuerySource, SearchOutcome, contains_pattern, rows_or_record};
use app_schema::knowledge::{ArticleField, KnowledgeArticle};
use app_store::ArticleStore;
use serde::Serialize;
use std::collections::HashSet;
use tracing::*;

pub const TITLE_MATCH_SCORE: u32 = 10;
pub const KEYWORD_MATCH_SCORE: u32 = 5;
pub const TAG_MATCH_SCORE: u32 = 3;
pub const CONTENT_MATCH_SCORE: u32 = 2;

/// Words of this many characters or fewer never drive keyword/tag matching.
const MIN_WORD_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub article: KnowledgeArticle,
    pub relevance_score: u32,
    pub matched_keywords: Vec<String>,
}

/// Lower-cased whitespace-separated words longer than two characters.
pub fn query_words(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() > MIN_WORD_CHARS)
        .map(str::to_string)
        .collect()
}

pub fn score_article(article: KnowledgeArticle, lower_query: &str, words: &[String]) -> SearchResult {
    let mut score = 0u32;
    let mut matched: Vec<String> = Vec::new();
    let hits_any_word = |value: &str| {
        let value = value.to_lowercase();
        words.iter().any(|w| value.contains(w.as_str()))
    };

    if article.title.to_lowercase().contains(lower_query) {
        score += TITLE_MATCH_SCORE;
    }
    for keyword in &article.keywords {
        if hits_any_word(keyword) {
            score += KEYWORD_MATCH_SCORE;
            matched.push(keyword.clone());
        }
    }
    for tag in &article.tags {
        if hits_any_word(tag) {
            score += TAG_MATCH_SCORE;
            if !matched.contains(tag) {
                matched.push(tag.clone());
            }
        }
    }
    if article.content.to_lowercase().contains(lower_query) {
        score += CONTENT_MATCH_SCORE;
    }
    // Negative priorities would break the non-negative score invariant.
    score += article.priority.max(0) as u32;

    SearchResult {
        article,
        relevance_score: score,
        matched_keywords: matched,
    }
}

/// Up to `limit` active articles for `query`, highest relevance first.
///
/// Candidates come from a title match, a content match and (when the query has
/// usable words) a keyword/tag containment match, each fetching `limit * 2`
/// rows. They are merged in that order without duplicates, scored with
/// [`score_article`] and stably sorted.
pub async fn search_knowledge_base(
    store: &dyn ArticleStore,
    query: &str,
    limit: usize,
) -> SearchOutcome<SearchResult> {
    if query.trim().is_empty() {
        return SearchOutcome::Empty(crate::EmptyReason::BlankQuery);
    }
    let lower_query = query.to_lowercase();
    let words = query_words(query);
    let pattern = contains_pattern(query);
    let fetch = limit.saturating_mul(2);

    let terms = async {
        if words.is_empty() {
            None
        } else {
            Some(store.knowledge_by_terms(&words, fetch).await)
        }
    };
    let (by_title, by_content, by_terms) = tokio::join!(
        store.knowledge_by_text(ArticleField::Title, &pattern, fetch),
        store.knowledge_by_text(ArticleField::Content, &pattern, fetch),
        terms,
    );

    let mut failures: Vec<QueryFailure> = Vec::new();
    let mut candidates = rows_or_record(by_title, QuerySource::KnowledgeTitle, &mut failures);
    candidates.extend(rows_or_record(
        by_content,
        QuerySource::KnowledgeContent,
        &mut failures,
    ));
    if let Some(by_terms) = by_terms {
        candidates.extend(rows_or_record(
            by_terms,
            QuerySource::KnowledgeTerms,
            &mut failures,
        ));
    }

    let mut seen = HashSet::new();
    let mut results: Vec<SearchResult> = candidates
        .into_iter()
        .filter(|a| a.is_active && seen.insert(a.id))
        .map(|a| score_article(a, &lower_query, &words))
        .collect();
    results.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    results.truncate(limit);

    debug!(
        "knowledge search for {:?}: {} results, {} failed queries",
        query,
        results.len(),
        failures.len()
    );
    SearchOutcome::from_parts(results, failures)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{EmptyReason, testing::*};
    use app_store::memory::MemoryArticleStore;

    #[test]
    fn query_words_drop_short_words() {
        assert_eq!(
            query_words("Is my  C&P exam on the VA portal"),
            vec!["c&p", "exam", "the", "portal"]
        );
        assert!(query_words("is a VA").is_empty());
    }

    #[test]
    fn title_bonus_needs_whole_query_in_title() {
        let a = article(
            "Tinnitus and Hearing Loss Claims",
            "How ringing in the ears is rated.",
            &["tinnitus", "hearing"],
            &[],
            2,
        );
        let r = score_article(a, "tinnitus rating", &query_words("tinnitus rating"));
        assert_eq!(r.matched_keywords, vec!["tinnitus"]);
        assert_eq!(r.relevance_score, KEYWORD_MATCH_SCORE + 2);
    }

    #[test]
    fn title_keyword_content_and_priority_add_up() {
        let a = article(
            "Tinnitus Rating Basics",
            "Tinnitus rating is capped at 10%.",
            &["tinnitus", "hearing"],
            &[],
            2,
        );
        let r = score_article(a, "tinnitus rating", &query_words("tinnitus rating"));
        assert!(r.relevance_score >= 17);
        assert_eq!(
            r.relevance_score,
            TITLE_MATCH_SCORE + KEYWORD_MATCH_SCORE + CONTENT_MATCH_SCORE + 2
        );
    }

    #[test]
    fn tags_add_three_and_are_not_double_counted() {
        let a = article("PTSD", "", &["ptsd"], &["ptsd", "mental-health"], 0);
        let r = score_article(a, "ptsd claim", &query_words("ptsd claim"));
        assert_eq!(r.relevance_score, KEYWORD_MATCH_SCORE + TAG_MATCH_SCORE);
        assert_eq!(r.matched_keywords, vec!["ptsd"]);
    }

    #[test]
    fn score_grows_with_matched_terms() {
        let words = query_words("sleep apnea secondary");
        let fewer = article("X", "", &["sleep"], &[], 0);
        let more = article("X", "", &["sleep", "apnea"], &["secondary"], 0);
        let low = score_article(fewer, "sleep apnea secondary", &words).relevance_score;
        let high = score_article(more, "sleep apnea secondary", &words).relevance_score;
        assert!(high > low);
    }

    #[test]
    fn negative_priority_never_goes_below_zero() {
        let a = article("Unrelated", "", &[], &[], -50);
        assert_eq!(score_article(a, "gi bill", &query_words("gi bill")).relevance_score, 0);
    }

    #[tokio::test]
    async fn tinnitus_scenario_end_to_end() {
        let store = MemoryArticleStore::new(
            vec![article(
                "Tinnitus and Hearing Loss Claims",
                "Tinnitus claims are usually rated at 10%.",
                &["tinnitus", "hearing"],
                &["claims"],
                2,
            )],
            vec![],
        );
        let outcome = search_knowledge_base(&store, "tinnitus rating", 3).await;
        assert!(!outcome.is_degraded());
        let hits = outcome.hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].relevance_score, KEYWORD_MATCH_SCORE + 2);
    }

    #[tokio::test]
    async fn only_active_articles_and_limit_respected() {
        let mut retired = article("PTSD Claims Archive", "ptsd", &["ptsd"], &[], 100);
        retired.is_active = false;
        let store = LeakyStore(vec![
            retired,
            article("PTSD Claims", "ptsd", &["ptsd"], &[], 3),
            article("PTSD Nexus Letters", "ptsd", &["ptsd", "nexus"], &[], 1),
            article("PTSD Secondary", "ptsd", &["ptsd"], &[], 0),
        ]);
        let outcome = search_knowledge_base(&store, "ptsd", 2).await;
        let hits = outcome.hits();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|r| r.article.is_active));
        assert_eq!(hits[0].article.title, "PTSD Claims");
    }

    #[tokio::test]
    async fn duplicates_across_queries_are_merged() {
        let store = MemoryArticleStore::new(
            vec![article("PTSD Claims", "PTSD claims explained", &["ptsd"], &["ptsd"], 0)],
            vec![],
        );
        let outcome = search_knowledge_base(&store, "ptsd", 5).await;
        assert_eq!(outcome.len(), 1);
    }

    #[tokio::test]
    async fn wildcards_in_query_match_literally() {
        let store = MemoryArticleStore::new(
            vec![
                article("Rated 100% P&T", "", &[], &[], 0),
                article("Rated 1000 days", "", &[], &[], 0),
            ],
            vec![],
        );
        let outcome = search_knowledge_base(&store, "100%", 5).await;
        let titles: Vec<&str> = outcome.hits().iter().map(|r| r.article.title.as_str()).collect();
        assert_eq!(titles, vec!["Rated 100% P&T"]);
    }

    #[tokio::test]
    async fn short_words_skip_term_query() {
        let store = FlakyStore::new(
            vec![article("VA", "", &["va"], &[], 0)],
            vec![],
            &[Op::KnowledgeTerms],
        );
        let outcome = search_knowledge_base(&store, "va", 5).await;
        // Term query never ran, so its configured failure never surfaced.
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.len(), 1);
    }

    #[tokio::test]
    async fn failing_subquery_degrades_but_keeps_other_rows() {
        let store = FlakyStore::new(
            vec![article("Sleep Apnea", "", &["apnea"], &[], 0)],
            vec![],
            &[Op::KnowledgeTitle],
        );
        let outcome = search_knowledge_base(&store, "apnea", 5).await;
        assert_eq!(outcome.len(), 1);
        assert!(outcome.is_degraded());
        assert_eq!(outcome.failures()[0].source, QuerySource::KnowledgeTitle);
    }

    #[tokio::test]
    async fn all_queries_failing_yields_empty_not_error() {
        let store = FlakyStore::new(
            vec![article("Sleep Apnea", "", &["apnea"], &[], 0)],
            vec![],
            &[Op::KnowledgeTitle, Op::KnowledgeContent, Op::KnowledgeTerms],
        );
        let outcome = search_knowledge_base(&store, "sleep apnea", 5).await;
        assert!(outcome.is_empty());
        match outcome {
            SearchOutcome::Empty(EmptyReason::Unavailable(failures)) => {
                assert_eq!(failures.len(), 3)
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_query_short_circuits() {
        let store = MemoryArticleStore::default();
        let outcome = search_knowledge_base(&store, "   ", 5).await;
        assert_eq!(outcome, SearchOutcome::Empty(EmptyReason::BlankQuery));
    }
}
