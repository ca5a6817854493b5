use std::sync::Arc;

use platefinder::error::SearchError;
use platefinder::models::{GroupCount, Listing, SearchType, StatsFilters};
use platefinder::search::{SearchFilterInput, SearchFilters, SearchService, stats};
use platefinder::store::{ListingStore, MemoryStore};

mod fixtures {
    use super::*;

    pub fn listing(name: &str, description: &str, city: &str, region: &str) -> Listing {
        Listing::new(
            name.to_string(),
            description.to_string(),
            "1 Main St".to_string(),
            city.to_string(),
            region.to_string(),
            "restaurant".to_string(),
        )
    }

    /// Five listings around South Florida plus one in Georgia. Coordinates
    /// are real enough for the distance assertions to hold.
    pub fn sample_listings() -> Vec<Listing> {
        let mut pizza_palace = listing(
            "Pizza Palace",
            "Wood fired pizza and calzones",
            "Miami",
            "FL",
        );
        pizza_palace.cuisine = Some("Italian".into());
        pizza_palace.lat = Some(25.7743);
        pizza_palace.lng = Some(-80.1937);
        pizza_palace.rating = Some(4.5);
        pizza_palace.review_count = 120;
        pizza_palace.open_now = true;

        let mut ocean_pizza = listing(
            "Ocean Pizza Co",
            "Slices on the boardwalk",
            "Miami Beach",
            "FL",
        );
        ocean_pizza.cuisine = Some("Italian".into());
        ocean_pizza.lat = Some(25.7907);
        ocean_pizza.lng = Some(-80.1300);
        ocean_pizza.rating = Some(4.0);
        ocean_pizza.review_count = 35;

        let mut napoli = listing(
            "Napoli Pizzeria",
            "Authentic pizza and pasta",
            "Orlando",
            "FL",
        );
        napoli.cuisine = Some("Italian".into());
        napoli.lat = Some(28.5384);
        napoli.lng = Some(-81.3789);

        let mut burger_barn = listing(
            "Burger Barn",
            "Charcoal grilled burgers",
            "Atlanta",
            "GA",
        );
        burger_barn.lat = Some(33.7490);
        burger_barn.lng = Some(-84.3880);
        burger_barn.rating = Some(3.5);

        let mut grocer = listing("Green Grocer", "Fresh produce and pantry staples", "Miami", "FL");
        grocer.category = "grocery".into();
        grocer.certified = true;
        grocer.certifier = Some("HFSAA".into());

        vec![pizza_palace, ocean_pizza, napoli, burger_barn, grocer]
    }

    pub fn service() -> SearchService {
        SearchService::new(Arc::new(MemoryStore::new(sample_listings())))
    }

    pub fn filters(input: SearchFilterInput) -> SearchFilters {
        SearchFilters::from_input(input).unwrap()
    }

    pub fn query(q: &str) -> SearchFilters {
        filters(SearchFilterInput {
            query: Some(q.to_string()),
            ..Default::default()
        })
    }
}

use fixtures::{filters, query, service};

#[tokio::test]
async fn basic_search_matches_name_substring_case_insensitively() {
    let response = service()
        .search(SearchType::Basic, query("PIZZA"))
        .await
        .unwrap();

    let names: Vec<&str> = response.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(response.total_count, 2);
    assert!(names.contains(&"Pizza Palace"));
    assert!(names.contains(&"Ocean Pizza Co"));
    // "Napoli Pizzeria" has no literal "pizza" substring in its name.
    assert!(!names.contains(&"Napoli Pizzeria"));

    for result in &response.results {
        assert!(result.relevance_score.is_none());
        assert!(result.similarity_score.is_none());
        assert!(result.distance.is_none());
    }

    // Stable natural-key ordering.
    let ids: Vec<&str> = response.results.iter().map(|r| r.id.as_str()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

#[tokio::test]
async fn basic_search_respects_equality_and_quality_filters() {
    let response = service()
        .search(
            SearchType::Basic,
            filters(SearchFilterInput {
                query: Some("pizza".into()),
                min_rating: Some(4.2),
                open_now: Some(true),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

    assert_eq!(response.total_count, 1);
    assert_eq!(response.results[0].name, "Pizza Palace");
}

#[tokio::test]
async fn advanced_search_ranks_exact_match_first() {
    let response = service()
        .search(SearchType::Advanced, query("Pizza Palace"))
        .await
        .unwrap();

    assert!(!response.results.is_empty());
    assert_eq!(response.results[0].name, "Pizza Palace");
    let top = response.results[0].relevance_score.unwrap();
    assert!((top - 1.0).abs() < 1e-9, "exact match should score 1.0, got {top}");

    // Scores are sorted descending.
    let scores: Vec<f64> = response
        .results
        .iter()
        .map(|r| r.relevance_score.unwrap())
        .collect();
    for pair in scores.windows(2) {
        assert!(pair[0] >= pair[1]);
    }
}

#[tokio::test]
async fn advanced_search_is_deterministic_across_calls() {
    let service = service();
    let first = service
        .search(SearchType::Advanced, query("pizza"))
        .await
        .unwrap();
    let second = service
        .search(SearchType::Advanced, query("pizza"))
        .await
        .unwrap();

    let first_ids: Vec<&str> = first.results.iter().map(|r| r.id.as_str()).collect();
    let second_ids: Vec<&str> = second.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn advanced_search_with_empty_query_is_a_filtered_browse() {
    let response = service()
        .search(SearchType::Advanced, filters(SearchFilterInput::default()))
        .await
        .unwrap();

    assert_eq!(response.total_count, 5);
    assert_eq!(response.results.len(), 5);
    for result in &response.results {
        assert_eq!(result.relevance_score, Some(1.0));
    }
}

#[tokio::test]
async fn pagination_respects_limit_offset_and_total() {
    let response = service()
        .search(
            SearchType::Advanced,
            filters(SearchFilterInput {
                limit: Some(2),
                offset: Some(1),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

    assert_eq!(response.total_count, 5);
    assert_eq!(response.results.len(), 2);
    assert!(
        response.filters_applied.offset as u64 + response.results.len() as u64
            <= response.total_count
    );
}

#[tokio::test]
async fn location_search_filters_by_radius_and_sorts_by_distance() {
    let response = service()
        .search(
            SearchType::Location,
            filters(SearchFilterInput {
                lat: Some(25.7617),
                lng: Some(-80.1918),
                radius: Some(10.0),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

    // Orlando, Atlanta and the coordinate-less grocer are all out.
    assert_eq!(response.total_count, 2);
    let distances: Vec<f64> = response
        .results
        .iter()
        .map(|r| r.distance.expect("distance populated on every row"))
        .collect();
    for d in &distances {
        assert!(*d <= 10.0);
    }
    for pair in distances.windows(2) {
        assert!(pair[0] <= pair[1]);
    }
    assert_eq!(response.results[0].name, "Pizza Palace");
}

#[tokio::test]
async fn location_search_far_from_everything_is_empty() {
    let response = service()
        .search(
            SearchType::Location,
            filters(SearchFilterInput {
                lat: Some(45.0),
                lng: Some(-120.0),
                radius: Some(0.001),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

    assert!(response.results.is_empty());
    assert_eq!(response.total_count, 0);
}

#[tokio::test]
async fn location_search_without_coordinates_is_rejected() {
    let err = service()
        .search(SearchType::Location, filters(SearchFilterInput::default()))
        .await
        .unwrap_err();
    match err {
        SearchError::Validation { field, .. } => assert_eq!(field, "lat"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn fuzzy_search_finds_typos_that_basic_misses() {
    let service = service();

    let basic = service
        .search(SearchType::Basic, query("piza"))
        .await
        .unwrap();
    assert_eq!(basic.total_count, 0);

    let fuzzy = service
        .search(SearchType::Fuzzy, query("piza"))
        .await
        .unwrap();
    assert!(fuzzy.total_count >= 2);
    let names: Vec<&str> = fuzzy.results.iter().map(|r| r.name.as_str()).collect();
    assert!(names.contains(&"Pizza Palace"));
    assert!(!names.contains(&"Burger Barn"));

    let scores: Vec<f64> = fuzzy
        .results
        .iter()
        .map(|r| r.similarity_score.unwrap())
        .collect();
    for s in &scores {
        assert!(*s >= 0.3);
    }
    for pair in scores.windows(2) {
        assert!(pair[0] >= pair[1]);
    }
}

#[tokio::test]
async fn fuzzy_threshold_narrows_the_match_set() {
    let response = service()
        .search(
            SearchType::Fuzzy,
            filters(SearchFilterInput {
                query: Some("pizza palace".into()),
                fuzzy_threshold: Some(0.95),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

    assert_eq!(response.total_count, 1);
    assert_eq!(response.results[0].name, "Pizza Palace");
}

#[tokio::test]
async fn full_text_search_uses_the_store_primitive() {
    let response = service()
        .search(SearchType::FullText, query("pizza"))
        .await
        .unwrap();

    assert!(!response.degraded);
    assert_eq!(response.total_count, 3);

    let scores: Vec<f64> = response
        .results
        .iter()
        .map(|r| r.relevance_score.unwrap())
        .collect();
    // Store ranks are normalized against the page maximum.
    assert!((scores[0] - 1.0).abs() < 1e-9);
    for s in &scores {
        assert!((0.0..=1.0).contains(s));
    }
}

#[tokio::test]
async fn full_text_search_degrades_when_primitive_is_missing() {
    let store = MemoryStore::new(fixtures::sample_listings()).without_text_search();
    let service = SearchService::new(Arc::new(store));

    let response = service
        .search(SearchType::FullText, query("pizza"))
        .await
        .unwrap();

    assert!(response.degraded);
    assert!(!response.results.is_empty());
    for result in &response.results {
        assert!(result.relevance_score.is_some());
    }
}

#[tokio::test]
async fn sparse_results_trigger_suggestions() {
    let response = service()
        .search(SearchType::Basic, query("piza"))
        .await
        .unwrap();

    assert_eq!(response.total_count, 0);
    assert!(!response.suggestions.is_empty());
    assert!(response.suggestions.len() <= 5);
    assert!(response.suggestions.iter().any(|s| s == "Pizza Palace"));
}

#[tokio::test]
async fn filters_applied_echoes_effective_defaults() {
    let response = service()
        .search(SearchType::Basic, query("  pizza  "))
        .await
        .unwrap();

    assert_eq!(response.filters_applied.limit, 50);
    assert_eq!(response.filters_applied.offset, 0);
    assert_eq!(response.filters_applied.query.as_deref(), Some("pizza"));
    assert_eq!(response.search_type, SearchType::Basic);
    assert!(!response.cache_hit);
}

struct FailingSuggestionStore;

#[async_trait::async_trait]
impl ListingStore for FailingSuggestionStore {
    async fn fetch_matching(&self, _: &SearchFilters) -> Result<Vec<Listing>, SearchError> {
        Ok(Vec::new())
    }

    async fn text_search(
        &self,
        _: &str,
        _: &SearchFilters,
    ) -> Result<Option<Vec<(Listing, f64)>>, SearchError> {
        Ok(Some(Vec::new()))
    }

    async fn count_grouped(
        &self,
        _: platefinder::models::StatsDimension,
        _: &StatsFilters,
    ) -> Result<Vec<GroupCount>, SearchError> {
        Ok(Vec::new())
    }

    async fn count_all(&self, _: &StatsFilters) -> Result<u64, SearchError> {
        Ok(0)
    }

    async fn suggestion_terms(&self) -> Result<Vec<String>, SearchError> {
        Err(SearchError::datastore(
            "suggestion_terms",
            anyhow::anyhow!("connection reset"),
        ))
    }
}

#[tokio::test]
async fn suggestion_failures_never_fail_the_search() {
    let service = SearchService::new(Arc::new(FailingSuggestionStore));
    let response = service
        .search(SearchType::Basic, query("pizza"))
        .await
        .unwrap();

    assert_eq!(response.total_count, 0);
    assert!(response.suggestions.is_empty());
}

#[tokio::test]
async fn directory_stats_counts_by_dimension() {
    let store = MemoryStore::new(fixtures::sample_listings());
    let stats = stats::directory_stats(&store, &StatsFilters::default())
        .await
        .unwrap();

    assert_eq!(stats.total_listings, 5);
    assert_eq!(
        stats.by_region,
        vec![
            GroupCount { name: "FL".into(), count: 4 },
            GroupCount { name: "GA".into(), count: 1 },
        ]
    );
    assert_eq!(
        stats.by_category,
        vec![
            GroupCount { name: "restaurant".into(), count: 4 },
            GroupCount { name: "grocery".into(), count: 1 },
        ]
    );
    assert_eq!(
        stats.by_certifier,
        vec![GroupCount { name: "HFSAA".into(), count: 1 }]
    );
}

#[tokio::test]
async fn directory_stats_respects_equality_constraints() {
    let store = MemoryStore::new(fixtures::sample_listings());
    let stats = stats::directory_stats(
        &store,
        &StatsFilters {
            category: Some("restaurant".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(stats.total_listings, 4);
    assert_eq!(
        stats.by_region,
        vec![
            GroupCount { name: "FL".into(), count: 3 },
            GroupCount { name: "GA".into(), count: 1 },
        ]
    );
}
