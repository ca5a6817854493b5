//! Typo-tolerant matching via normalized Damerau-Levenshtein similarity
//! (1 = identical, 0 = completely different). Handles the typical typo
//! class: single insertions, deletions, substitutions and adjacent
//! transpositions.

use rapidfuzz::distance::damerau_levenshtein;

use crate::error::SearchError;
use crate::models::{Listing, SearchResult};
use crate::search::{StrategyOutput, SearchFilters, paginate, sort_scored_desc};
use crate::store::ListingStore;

/// Similarity between a query and a listing name: the best of whole-name
/// similarity and per-token similarity, so a one-word query still matches
/// a multi-word name ("piza" vs "Pizza Palace").
pub(crate) fn similarity(query: &str, name: &str) -> f64 {
    let query = query.to_lowercase();
    let name = name.to_lowercase();

    let whole = damerau_levenshtein::normalized_similarity(query.chars(), name.chars());
    name.split_whitespace()
        .map(|token| damerau_levenshtein::normalized_similarity(query.chars(), token.chars()))
        .fold(whole, f64::max)
}

pub(crate) async fn search(
    store: &dyn ListingStore,
    filters: &SearchFilters,
) -> Result<StrategyOutput, SearchError> {
    let candidates = store.fetch_matching(filters).await?;

    let Some(query) = &filters.query else {
        // Nothing to match against: behave like a filtered browse.
        let mut candidates = candidates;
        candidates.sort_by(|a, b| a.id.cmp(&b.id));
        let (page, total_count) = paginate(candidates, filters.offset, filters.limit);
        let results = page.iter().map(SearchResult::from_listing).collect();
        return Ok(StrategyOutput::new(results, total_count));
    };

    let mut scored: Vec<(Listing, f64)> = candidates
        .into_iter()
        .filter_map(|l| {
            let s = similarity(query, &l.name);
            if s >= filters.fuzzy_threshold {
                Some((l, s))
            } else {
                None
            }
        })
        .collect();

    sort_scored_desc(&mut scored);

    let (page, total_count) = paginate(scored, filters.offset, filters.limit);
    let results = page
        .iter()
        .map(|(listing, s)| SearchResult::from_listing(listing).with_similarity(*s))
        .collect();
    Ok(StrategyOutput::new(results, total_count))
}
