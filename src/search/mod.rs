use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::error::SearchError;
use crate::models::{Listing, SearchResponse, SearchResult, SearchType};
use crate::store::ListingStore;

pub mod basic;
pub mod filters;
pub mod fulltext;
pub mod fuzzy;
pub mod location;
pub mod relevance;
pub mod stats;
pub mod suggest;

pub use filters::{SearchFilterInput, SearchFilters};

/// Below this many results (with a query present) the response is enriched
/// with alternate query terms.
const SPARSE_RESULT_THRESHOLD: usize = 3;

/// What a strategy hands back to the dispatcher: one page of results plus
/// the pre-pagination match count. `degraded` is set when the strategy fell
/// back to a simpler one because its primitive was unavailable.
pub(crate) struct StrategyOutput {
    pub results: Vec<SearchResult>,
    pub total_count: u64,
    pub degraded: bool,
}

impl StrategyOutput {
    pub(crate) fn new(results: Vec<SearchResult>, total_count: u64) -> Self {
        Self {
            results,
            total_count,
            degraded: false,
        }
    }
}

/// Stateless search dispatcher. Each call is a pure function of the search
/// type, the validated filters and the current store contents; the service
/// holds no mutable state and is safe to share across tasks.
pub struct SearchService {
    store: Arc<dyn ListingStore>,
}

impl SearchService {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self { store }
    }

    /// Routes to exactly one strategy, then wraps its output with timing,
    /// the echoed filters and (when results are sparse) suggestions.
    pub async fn search(
        &self,
        search_type: SearchType,
        filters: SearchFilters,
    ) -> Result<SearchResponse, SearchError> {
        let started = Instant::now();

        let output = self.dispatch(search_type, &filters).await?;

        let suggestions = match &filters.query {
            Some(query) if output.results.len() < SPARSE_RESULT_THRESHOLD => {
                suggest::generate(self.store.as_ref(), query).await
            }
            _ => Vec::new(),
        };

        Ok(SearchResponse {
            results: output.results,
            total_count: output.total_count,
            search_type,
            execution_time_ms: started.elapsed().as_millis() as u64,
            filters_applied: filters,
            suggestions,
            cache_hit: false,
            degraded: output.degraded,
            timestamp: Utc::now(),
        })
    }

    /// Pure routing and precondition checks; no scoring happens here.
    async fn dispatch(
        &self,
        search_type: SearchType,
        filters: &SearchFilters,
    ) -> Result<StrategyOutput, SearchError> {
        let store = self.store.as_ref();
        match search_type {
            SearchType::Basic => basic::search(store, filters).await,
            SearchType::Advanced => relevance::search(store, filters).await,
            SearchType::Location => {
                // Defense in depth: filter validation allows coordinate-less
                // filters, but a location search cannot run without them.
                if !filters.has_location() {
                    return Err(SearchError::validation(
                        "lat",
                        "location search requires both lat and lng",
                    ));
                }
                location::search(store, filters).await
            }
            SearchType::FullText => fulltext::search(store, filters).await,
            SearchType::Fuzzy => fuzzy::search(store, filters).await,
        }
    }
}

/// Applies offset/limit to a fully-sorted match set, returning the page and
/// the pre-pagination total.
pub(crate) fn paginate<T>(items: Vec<T>, offset: usize, limit: usize) -> (Vec<T>, u64) {
    let total = items.len() as u64;
    let page = items.into_iter().skip(offset).take(limit).collect();
    (page, total)
}

/// Descending by score, ties broken by listing id ascending so identical
/// inputs always produce identical ordering.
pub(crate) fn sort_scored_desc(scored: &mut [(Listing, f64)]) {
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.id.cmp(&b.0.id))
    });
}

/// Ascending by score (used for distances), same id tie-break.
pub(crate) fn sort_scored_asc(scored: &mut [(Listing, f64)]) {
    scored.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.id.cmp(&b.0.id))
    });
}
