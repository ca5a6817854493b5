//! Best-effort alternate query terms for sparse result pages. Fuzzy-matches
//! the query against the store's known terms at a looser threshold than the
//! main search. Never fails the surrounding call: any error degrades to an
//! empty list.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::search::fuzzy;
use crate::store::ListingStore;

/// Looser than the search default (0.3) so near-misses still surface.
const SUGGESTION_THRESHOLD: f64 = 0.2;
const MAX_SUGGESTIONS: usize = 5;

pub(crate) async fn generate(store: &dyn ListingStore, query: &str) -> Vec<String> {
    let terms = match store.suggestion_terms().await {
        Ok(terms) => terms,
        Err(e) => {
            tracing::warn!(error = %e, "suggestion term lookup failed");
            return Vec::new();
        }
    };

    let mut scored: Vec<(String, f64)> = terms
        .into_iter()
        .filter_map(|term| {
            if term.eq_ignore_ascii_case(query) {
                return None;
            }
            let s = fuzzy::similarity(query, &term);
            if s >= SUGGESTION_THRESHOLD {
                Some((term, s))
            } else {
                None
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut seen = HashSet::new();
    scored
        .into_iter()
        .filter_map(|(term, _)| {
            if seen.insert(term.to_lowercase()) {
                Some(term)
            } else {
                None
            }
        })
        .take(MAX_SUGGESTIONS)
        .collect()
}
