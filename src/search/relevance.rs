//! Composite relevance scoring: exact name match outweighs a substring
//! match, which outweighs token overlap with the name and description.

use std::collections::HashSet;

use crate::analyzer::TextAnalyzer;
use crate::error::SearchError;
use crate::models::{Listing, SearchResult};
use crate::search::{StrategyOutput, SearchFilters, paginate, sort_scored_desc};
use crate::store::ListingStore;

const EXACT_WEIGHT: f64 = 0.5;
const SUBSTRING_WEIGHT: f64 = 0.3;
const OVERLAP_WEIGHT: f64 = 0.2;

/// Weighted composite in [0, 1]. An exact name match scores 1.0 because it
/// also satisfies the substring and full-overlap components.
pub(crate) fn score(analyzer: &TextAnalyzer, query: &str, listing: &Listing) -> f64 {
    let query_lower = query.to_lowercase();
    let name_lower = listing.name.to_lowercase();

    let mut total = 0.0;
    if name_lower == query_lower {
        total += EXACT_WEIGHT;
    }
    if name_lower.contains(&query_lower) {
        total += SUBSTRING_WEIGHT;
    }

    let query_tokens: HashSet<String> = analyzer.analyze(query).into_iter().collect();
    if !query_tokens.is_empty() {
        let doc_tokens: HashSet<String> = analyzer
            .analyze(&format!("{} {}", listing.name, listing.description))
            .into_iter()
            .collect();
        let overlap = query_tokens.intersection(&doc_tokens).count();
        total += OVERLAP_WEIGHT * overlap as f64 / query_tokens.len() as f64;
    }

    total
}

pub(crate) async fn search(
    store: &dyn ListingStore,
    filters: &SearchFilters,
) -> Result<StrategyOutput, SearchError> {
    let candidates = store.fetch_matching(filters).await?;
    let analyzer = TextAnalyzer::for_queries();

    let mut scored: Vec<(Listing, f64)> = match &filters.query {
        // Filtered browse-all: every candidate gets the same score and the
        // id tie-break produces the ordering.
        None => candidates.into_iter().map(|l| (l, 1.0)).collect(),
        Some(query) => candidates
            .into_iter()
            .filter_map(|l| {
                let s = score(&analyzer, query, &l);
                if s > 0.0 { Some((l, s)) } else { None }
            })
            .collect(),
    };

    sort_scored_desc(&mut scored);

    let (page, total_count) = paginate(scored, filters.offset, filters.limit);
    let results = page
        .iter()
        .map(|(listing, s)| SearchResult::from_listing(listing).with_relevance(*s))
        .collect();
    Ok(StrategyOutput::new(results, total_count))
}
