pub mod format;
pub mod template;

use app_dto::chat::ConversationMessage;
use app_search::{
    SearchOutcome, community::search_community_qa, knowledge::search_knowledge_base,
};
use app_store::ArticleStore;
use format::{format_community_block, format_knowledge_block, render_history};
use template::{CONTEXT_RESULTS, assemble};
use tracing::*;

fn log_degraded<T>(label: &str, outcome: &SearchOutcome<T>) {
    for failure in outcome.failures() {
        warn!(
            "{} enrichment degraded ({}): {}",
            label, failure.source, failure.message
        );
    }
}

/// Builds the full prompt for one chat turn.
///
/// Knowledge-base and community lookups run concurrently when enabled; a
/// lookup that fails or finds nothing simply leaves its block out.
pub async fn build_prompt(
    store: &dyn ArticleStore,
    user_message: &str,
    history: &[ConversationMessage],
    include_knowledge_base: bool,
    include_community_qa: bool,
) -> String {
    let knowledge = async {
        if !include_knowledge_base {
            return String::new();
        }
        let outcome = search_knowledge_base(store, user_message, CONTEXT_RESULTS).await;
        log_degraded("Knowledge base", &outcome);
        format_knowledge_block(outcome.hits())
    };
    let community = async {
        if !include_community_qa {
            return String::new();
        }
        let outcome = search_community_qa(store, user_message, CONTEXT_RESULTS).await;
        log_degraded("Community Q&A", &outcome);
        format_community_block(outcome.hits())
    };
    let (knowledge_block, community_block) = tokio::join!(knowledge, community);

    let prompt = assemble(
        &render_history(history),
        user_message,
        &knowledge_block,
        &community_block,
    );
    debug!(
        "Prompt assembled: {} chars (knowledge: {}, community: {})",
        prompt.len(),
        !knowledge_block.is_empty(),
        !community_block.is_empty()
    );
    prompt
}

#[cfg(test)]
mod test {
    use super::*;
    use app_error::AppError;
    use app_schema::{
        community::{CommunityMatch, CommunityQa, CommunityStats},
        knowledge::{ArticleField, KnowledgeArticle},
    };
    use app_store::memory::MemoryArticleStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use template::*;
    use uuid::Uuid;

    fn store() -> MemoryArticleStore {
        MemoryArticleStore::new(
            vec![KnowledgeArticle {
                id: Uuid::new_v4(),
                title: "Tinnitus and Hearing Loss Claims".into(),
                content: "Tinnitus is rated at 10% under DC 6260.".into(),
                category: "Disability Claims".into(),
                tags: vec!["hearing".into()],
                keywords: vec!["tinnitus".into(), "hearing".into()],
                priority: 2,
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }],
            vec![CommunityQa {
                id: Uuid::new_v4(),
                title: "Tinnitus claim approved at 10%".into(),
                question: "Filed for tinnitus after 8 years as a 0311.".into(),
                answer: Some("Mine went through in 90 days.".into()),
                upvotes: 42,
                url: "https://reddit.com/r/VeteransBenefits/tinnitus".into(),
                tags: vec!["tinnitus".into()],
            }],
        )
    }

    /// Every query fails.
    struct DownStore;

    #[async_trait]
    impl ArticleStore for DownStore {
        async fn knowledge_by_text(
            &self,
            _field: ArticleField,
            _pattern: &str,
            _limit: usize,
        ) -> Result<Vec<KnowledgeArticle>, AppError> {
            Err(AppError::timeout("store timed out"))
        }

        async fn knowledge_by_terms(
            &self,
            _words: &[String],
            _limit: usize,
        ) -> Result<Vec<KnowledgeArticle>, AppError> {
            Err(AppError::timeout("store timed out"))
        }

        async fn knowledge_by_category(
            &self,
            _category: &str,
            _limit: usize,
        ) -> Result<Vec<KnowledgeArticle>, AppError> {
            Err(AppError::timeout("store timed out"))
        }

        async fn knowledge_by_id(&self, _id: Uuid) -> Result<Option<KnowledgeArticle>, AppError> {
            Err(AppError::timeout("store timed out"))
        }

        async fn community_ranked(
            &self,
            _query: &str,
            _limit: usize,
        ) -> Result<Vec<CommunityMatch>, AppError> {
            Err(AppError::timeout("store timed out"))
        }

        async fn community_by_text(
            &self,
            _pattern: &str,
            _limit: usize,
        ) -> Result<Vec<CommunityMatch>, AppError> {
            Err(AppError::timeout("store timed out"))
        }

        async fn community_by_tags(
            &self,
            _tags: &[String],
            _limit: usize,
        ) -> Result<Vec<CommunityMatch>, AppError> {
            Err(AppError::timeout("store timed out"))
        }

        async fn community_stats(&self) -> Result<CommunityStats, AppError> {
            Err(AppError::timeout("store timed out"))
        }
    }

    #[tokio::test]
    async fn empty_history_without_enrichment_is_the_bare_template() {
        let question = "How do I request my DD-214?";
        let prompt = build_prompt(&store(), question, &[], false, false).await;
        let expected = format!(
            "{SYSTEM_PROMPT}\n\nConversation History:\n{HISTORY_PLACEHOLDER}\n\nCurrent User Question: {question}\n\n\n\n{CLOSING_INSTRUCTION}"
        );
        assert_eq!(prompt, expected);
        assert!(!prompt.contains(KNOWLEDGE_HEADER));
        assert!(!prompt.contains(COMMUNITY_HEADER));
    }

    #[tokio::test]
    async fn enrichment_adds_both_blocks_in_order() {
        let history = vec![
            ConversationMessage::user("I got out in 2019."),
            ConversationMessage::assistant("Thanks for your service."),
        ];
        let prompt = build_prompt(&store(), "tinnitus claim", &history, true, true).await;
        assert!(prompt.contains("Current User Question: tinnitus claim"));
        assert!(prompt.contains("User: I got out in 2019.\n\nAssistant: Thanks for your service."));
        let kb = prompt.find(KNOWLEDGE_HEADER).unwrap();
        let community = prompt.find(COMMUNITY_HEADER).unwrap();
        let closing = prompt.find(CLOSING_INSTRUCTION).unwrap();
        assert!(kb < community && community < closing);
        assert!(prompt.contains("Title: Tinnitus and Hearing Loss Claims"));
        assert!(prompt.contains("Source: https://reddit.com/r/VeteransBenefits/tinnitus"));
    }

    #[tokio::test]
    async fn disabled_source_is_not_queried_into_prompt() {
        let prompt = build_prompt(&store(), "tinnitus claim", &[], true, false).await;
        assert!(prompt.contains(KNOWLEDGE_HEADER));
        assert!(!prompt.contains(COMMUNITY_HEADER));
    }

    #[tokio::test]
    async fn store_outage_still_produces_a_prompt() {
        let question = "What is TDIU?";
        let prompt = build_prompt(&DownStore, question, &[], true, true).await;
        let bare = build_prompt(&store(), question, &[], false, false).await;
        assert_eq!(prompt, bare);
    }

    #[tokio::test]
    async fn question_is_kept_verbatim() {
        let question = "  100% P&T -- what about CHAMPVA_dental?  ";
        let prompt = build_prompt(&store(), question, &[], true, true).await;
        assert!(prompt.contains(question));
    }
}
