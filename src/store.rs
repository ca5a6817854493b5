use std::collections::HashMap;

use async_trait::async_trait;

use crate::analyzer::TextAnalyzer;
use crate::error::SearchError;
use crate::models::{GroupCount, Listing, StatsDimension, StatsFilters};
use crate::search::filters::SearchFilters;

/// Read-only contract the search service needs from its datastore.
///
/// `fetch_matching` applies only the equality and quality filters; query
/// text, geometry and pagination belong to the strategies. `text_search`
/// returns `Ok(None)` when the store has no full-text primitive, which the
/// caller treats as a degraded-mode signal rather than a failure.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn fetch_matching(&self, filters: &SearchFilters) -> Result<Vec<Listing>, SearchError>;

    /// Relevance-ranked multi-term search over indexed text fields. All
    /// query terms must match. Ranks are the store's own, unnormalized.
    async fn text_search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Option<Vec<(Listing, f64)>>, SearchError>;

    async fn count_grouped(
        &self,
        dimension: StatsDimension,
        filters: &StatsFilters,
    ) -> Result<Vec<GroupCount>, SearchError>;

    async fn count_all(&self, filters: &StatsFilters) -> Result<u64, SearchError>;

    /// Distinct names/categories/cuisines used as the suggestion corpus.
    async fn suggestion_terms(&self) -> Result<Vec<String>, SearchError>;
}

/// In-process store over a fixed set of listings. Used by tests and demos;
/// mirrors the Mongo-backed store's filter semantics exactly.
pub struct MemoryStore {
    listings: Vec<Listing>,
    text_search_enabled: bool,
}

impl MemoryStore {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings,
            text_search_enabled: true,
        }
    }

    /// Disables the full-text primitive so callers can exercise the
    /// degraded-mode fallback.
    pub fn without_text_search(mut self) -> Self {
        self.text_search_enabled = false;
        self
    }

    fn matches(listing: &Listing, filters: &SearchFilters) -> bool {
        if let Some(region) = &filters.region
            && &listing.region != region
        {
            return false;
        }
        if let Some(category) = &filters.category
            && &listing.category != category
        {
            return false;
        }
        if let Some(cuisine) = &filters.cuisine
            && listing.cuisine.as_ref() != Some(cuisine)
        {
            return false;
        }
        if let Some(certifier) = &filters.certifier
            && listing.certifier.as_ref() != Some(certifier)
        {
            return false;
        }
        if let Some(certified) = filters.certified
            && listing.certified != certified
        {
            return false;
        }
        if let Some(delivery) = filters.delivery
            && listing.delivery != delivery
        {
            return false;
        }
        if let Some(min_rating) = filters.min_rating
            && !listing.rating.is_some_and(|r| r >= min_rating)
        {
            return false;
        }
        if let Some(has_reviews) = filters.has_reviews
            && (listing.review_count > 0) != has_reviews
        {
            return false;
        }
        if let Some(open_now) = filters.open_now
            && listing.open_now != open_now
        {
            return false;
        }
        true
    }

    fn stats_match(listing: &Listing, filters: &StatsFilters) -> bool {
        if let Some(region) = &filters.region
            && &listing.region != region
        {
            return false;
        }
        if let Some(category) = &filters.category
            && &listing.category != category
        {
            return false;
        }
        true
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn fetch_matching(&self, filters: &SearchFilters) -> Result<Vec<Listing>, SearchError> {
        Ok(self
            .listings
            .iter()
            .filter(|l| Self::matches(l, filters))
            .cloned()
            .collect())
    }

    async fn text_search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Option<Vec<(Listing, f64)>>, SearchError> {
        if !self.text_search_enabled {
            return Ok(None);
        }

        let analyzer = TextAnalyzer::for_queries();
        let query_tokens = analyzer.analyze(query);
        if query_tokens.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let mut hits = Vec::new();
        for listing in self.listings.iter().filter(|l| Self::matches(l, filters)) {
            let doc_tokens =
                analyzer.analyze(&format!("{} {}", listing.name, listing.description));
            let all_present = query_tokens
                .iter()
                .all(|q| doc_tokens.iter().any(|d| d == q));
            if !all_present {
                continue;
            }
            // Rank by query-term frequency, like an engine's term-match score.
            let rank = doc_tokens
                .iter()
                .filter(|d| query_tokens.contains(*d))
                .count() as f64;
            hits.push((listing.clone(), rank));
        }
        Ok(Some(hits))
    }

    async fn count_grouped(
        &self,
        dimension: StatsDimension,
        filters: &StatsFilters,
    ) -> Result<Vec<GroupCount>, SearchError> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for listing in self.listings.iter().filter(|l| Self::stats_match(l, filters)) {
            let key = match dimension {
                StatsDimension::Region => Some(listing.region.clone()),
                StatsDimension::Category => Some(listing.category.clone()),
                StatsDimension::Certifier => listing.certifier.clone(),
            };
            if let Some(key) = key {
                *counts.entry(key).or_insert(0) += 1;
            }
        }
        let mut groups: Vec<GroupCount> = counts
            .into_iter()
            .map(|(name, count)| GroupCount { name, count })
            .collect();
        groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        Ok(groups)
    }

    async fn count_all(&self, filters: &StatsFilters) -> Result<u64, SearchError> {
        Ok(self
            .listings
            .iter()
            .filter(|l| Self::stats_match(l, filters))
            .count() as u64)
    }

    async fn suggestion_terms(&self) -> Result<Vec<String>, SearchError> {
        let mut terms = Vec::new();
        for listing in &self.listings {
            terms.push(listing.name.clone());
            terms.push(listing.category.clone());
            if let Some(cuisine) = &listing.cuisine {
                terms.push(cuisine.clone());
            }
        }
        terms.sort();
        terms.dedup();
        Ok(terms)
    }
}
