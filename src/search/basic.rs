//! Cheapest strategy: case-insensitive substring match on the listing name,
//! no scoring, stable id-ascending order.

use crate::error::SearchError;
use crate::models::SearchResult;
use crate::search::{StrategyOutput, SearchFilters, paginate};
use crate::store::ListingStore;

pub(crate) async fn search(
    store: &dyn ListingStore,
    filters: &SearchFilters,
) -> Result<StrategyOutput, SearchError> {
    let mut candidates = store.fetch_matching(filters).await?;

    if let Some(query) = &filters.query {
        let needle = query.to_lowercase();
        candidates.retain(|l| l.name.to_lowercase().contains(&needle));
    }

    candidates.sort_by(|a, b| a.id.cmp(&b.id));

    let (page, total_count) = paginate(candidates, filters.offset, filters.limit);
    let results = page.iter().map(SearchResult::from_listing).collect();
    Ok(StrategyOutput::new(results, total_count))
}
