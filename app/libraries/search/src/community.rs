use crate::{EmptyReason, QueryFailure, QuerySource, SearchOutcome, contains_pattern};
use app_schema::community::CommunityMatch;
use app_store::ArticleStore;
use tracing::*;

/// Up to `limit` community Q&A entries for `query`.
///
/// Ranking is delegated to the store's full-text procedure. If that call
/// fails, a plain substring match over title, question and answer ordered by
/// upvotes takes its place; if that fails too the outcome is empty.
pub async fn search_community_qa(
    store: &dyn ArticleStore,
    query: &str,
    limit: usize,
) -> SearchOutcome<CommunityMatch> {
    if query.trim().is_empty() {
        return SearchOutcome::Empty(EmptyReason::BlankQuery);
    }

    let primary = match store.community_ranked(query, limit).await {
        Ok(mut hits) => {
            hits.truncate(limit);
            debug!("community ranked search for {:?}: {} results", query, hits.len());
            return SearchOutcome::from_parts(hits, Vec::new());
        }
        Err(e) => {
            warn!("Community ranked search failed, using fallback: {}", e.message);
            QueryFailure {
                source: QuerySource::CommunityRanked,
                message: e.message,
            }
        }
    };

    match store.community_by_text(&contains_pattern(query), limit).await {
        Ok(mut hits) if !hits.is_empty() => {
            hits.truncate(limit);
            SearchOutcome::Hits {
                hits,
                degraded: vec![primary],
            }
        }
        Ok(_) => SearchOutcome::Empty(EmptyReason::NoMatches),
        Err(e) => {
            warn!("Community fallback search failed: {}", e.message);
            SearchOutcome::Empty(EmptyReason::Unavailable(vec![
                primary,
                QueryFailure {
                    source: QuerySource::CommunityFallback,
                    message: e.message,
                },
            ]))
        }
    }
}
