use std::str::FromStr;

use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::search::filters::SearchFilters;

/// A single business listing as persisted in the `listings` collection.
/// Rows are written by the ingestion/admin subsystem; this service only
/// reads them.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Listing {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub name: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub category: String,
    pub cuisine: Option<String>,
    pub certifier: Option<String>,
    pub certified: bool,
    pub delivery: bool,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub rating: Option<f64>,
    pub review_count: i64,
    pub open_now: bool,
    pub image_url: Option<String>,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl Listing {
    pub fn new(
        name: String,
        description: String,
        address: String,
        city: String,
        region: String,
        category: String,
    ) -> Listing {
        Listing {
            id: ObjectId::new(),
            name,
            description,
            address,
            city,
            region,
            phone: None,
            website: None,
            category,
            cuisine: None,
            certifier: None,
            certified: false,
            delivery: false,
            lat: None,
            lng: None,
            rating: None,
            review_count: 0,
            open_now: false,
            image_url: None,
            created_at: bson::DateTime::now(),
            updated_at: bson::DateTime::now(),
        }
    }
}

/// Discriminator selecting which search strategy handles a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    Basic,
    Advanced,
    Location,
    FullText,
    Fuzzy,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Basic => "basic",
            SearchType::Advanced => "advanced",
            SearchType::Location => "location",
            SearchType::FullText => "full_text",
            SearchType::Fuzzy => "fuzzy",
        }
    }
}

impl FromStr for SearchType {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(SearchType::Basic),
            "advanced" => Ok(SearchType::Advanced),
            "location" => Ok(SearchType::Location),
            "full_text" => Ok(SearchType::FullText),
            "fuzzy" => Ok(SearchType::Fuzzy),
            other => Err(SearchError::validation(
                "search_type",
                format!("unknown search type '{other}'"),
            )),
        }
    }
}

/// One ranked listing projection. At most one of `relevance_score`,
/// `similarity_score` and `distance` is populated, determined by the
/// strategy that produced the row.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SearchResult {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub category: String,
    pub cuisine: Option<String>,
    pub certifier: Option<String>,
    pub certified: bool,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub rating: Option<f64>,
    pub review_count: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl SearchResult {
    pub fn from_listing(listing: &Listing) -> SearchResult {
        SearchResult {
            id: listing.id.to_hex(),
            name: listing.name.clone(),
            address: listing.address.clone(),
            city: listing.city.clone(),
            region: listing.region.clone(),
            phone: listing.phone.clone(),
            website: listing.website.clone(),
            category: listing.category.clone(),
            cuisine: listing.cuisine.clone(),
            certifier: listing.certifier.clone(),
            certified: listing.certified,
            lat: listing.lat,
            lng: listing.lng,
            rating: listing.rating,
            review_count: listing.review_count,
            image_url: listing.image_url.clone(),
            created_at: listing.created_at.to_chrono(),
            updated_at: listing.updated_at.to_chrono(),
            relevance_score: None,
            similarity_score: None,
            distance: None,
        }
    }

    pub fn with_relevance(mut self, score: f64) -> SearchResult {
        self.relevance_score = Some(score);
        self
    }

    pub fn with_similarity(mut self, score: f64) -> SearchResult {
        self.similarity_score = Some(score);
        self
    }

    pub fn with_distance(mut self, miles: f64) -> SearchResult {
        self.distance = Some(miles);
        self
    }
}

/// Response envelope for a single search call. `cache_hit` is set by the
/// caller that consulted the cache, never computed here.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub total_count: u64,
    pub search_type: SearchType,
    pub execution_time_ms: u64,
    pub filters_applied: SearchFilters,
    pub suggestions: Vec<String>,
    pub cache_hit: bool,
    pub degraded: bool,
    pub timestamp: DateTime<Utc>,
}

/// One bucket of a grouped count.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub name: String,
    pub count: u64,
}

/// Read-only aggregation over the listing store, used for dashboards.
#[derive(Serialize, Debug, Clone)]
pub struct DirectoryStats {
    pub total_listings: u64,
    pub by_region: Vec<GroupCount>,
    pub by_category: Vec<GroupCount>,
    pub by_certifier: Vec<GroupCount>,
}

/// Dimension a statistics aggregation groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsDimension {
    Region,
    Category,
    Certifier,
}

impl StatsDimension {
    pub fn field_name(&self) -> &'static str {
        match self {
            StatsDimension::Region => "region",
            StatsDimension::Category => "category",
            StatsDimension::Certifier => "certifier",
        }
    }
}

/// Optional equality constraints for statistics aggregation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsFilters {
    pub region: Option<String>,
    pub category: Option<String>,
}
