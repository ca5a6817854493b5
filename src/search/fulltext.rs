//! Engine-backed full-text search. Token matching and ranking are delegated
//! to the store's text primitive; ranks are normalized into [0, 1] by the
//! page maximum. When the primitive is unavailable the strategy falls back
//! to the relevance scorer and flags the response as degraded.

use crate::error::SearchError;
use crate::search::{StrategyOutput, SearchFilters, paginate, relevance, sort_scored_desc};
use crate::models::SearchResult;
use crate::store::ListingStore;

pub(crate) async fn search(
    store: &dyn ListingStore,
    filters: &SearchFilters,
) -> Result<StrategyOutput, SearchError> {
    let Some(query) = &filters.query else {
        // No text to rank: same filtered browse-all the relevance scorer does.
        return relevance::search(store, filters).await;
    };

    let Some(mut hits) = store.text_search(query, filters).await? else {
        tracing::warn!("text-search primitive unavailable, falling back to relevance scoring");
        let mut output = relevance::search(store, filters).await?;
        output.degraded = true;
        return Ok(output);
    };

    let max_rank = hits.iter().map(|(_, rank)| *rank).fold(0.0, f64::max);
    if max_rank > 0.0 {
        for hit in &mut hits {
            hit.1 /= max_rank;
        }
    }

    sort_scored_desc(&mut hits);

    let (page, total_count) = paginate(hits, filters.offset, filters.limit);
    let results = page
        .iter()
        .map(|(listing, rank)| SearchResult::from_listing(listing).with_relevance(*rank))
        .collect();
    Ok(StrategyOutput::new(results, total_count))
}
