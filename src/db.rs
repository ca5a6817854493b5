use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::{
    Client, Collection, Database as MongoDatabase, IndexModel,
    bson::{Bson, Document, doc},
    error::ErrorKind,
};
use serde::Deserialize;

use crate::config::CONFIG;
use crate::error::SearchError;
use crate::models::{GroupCount, Listing, StatsDimension, StatsFilters};
use crate::search::filters::SearchFilters;
use crate::store::ListingStore;

/// Collection names as constants for consistency
pub mod collections {
    pub const LISTINGS: &str = "listings";
}

/// Main database wrapper providing connection management and collection access
#[derive(Debug, Clone)]
pub struct Database {
    client: Client,
    db: MongoDatabase,
}

impl Database {
    /// Create a new Database instance with custom URI and database name.
    /// Useful for testing with a different database.
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        let client_options = ClientOptions::parse(uri)
            .await
            .context("Failed to parse MongoDB connection string")?;

        let client =
            Client::with_options(client_options).context("Failed to create MongoDB client")?;

        // Ping the database to verify connection
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .context("Failed to connect to MongoDB")?;

        log::info!("Connected to MongoDB database: {}", db_name);

        let db = client.database(db_name);

        Ok(Self { client, db })
    }

    /// Create a Database instance using environment configuration
    pub async fn from_config() -> Result<Self> {
        Self::new(&CONFIG.mongo_uri, &CONFIG.mongo_db_name).await
    }

    /// Get a typed collection by name
    pub fn collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.db.collection(name)
    }

    /// Get the underlying MongoDB client (for advanced operations)
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get the underlying MongoDB database (for advanced operations)
    pub fn database(&self) -> &MongoDatabase {
        &self.db
    }

    /// Get the listings collection
    pub fn listings(&self) -> Collection<Listing> {
        self.collection(collections::LISTINGS)
    }
}

/// A listing row extended with the engine's text-search rank.
#[derive(Deserialize)]
struct ScoredListing {
    #[serde(flatten)]
    listing: Listing,
    score: f64,
}

/// Mongo-backed implementation of the [`ListingStore`] contract. The `$text`
/// operator is the full-text primitive; a missing text index surfaces as
/// "primitive unavailable" (`Ok(None)`), not as a hard failure.
pub struct MongoListingStore {
    db: Database,
}

impl MongoListingStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates the text index backing `$text` queries. Callers may treat a
    /// failure as non-fatal; full-text search degrades at query time.
    pub async fn ensure_indexes(&self) -> Result<(), SearchError> {
        let index = IndexModel::builder()
            .keys(doc! { "name": "text", "description": "text", "cuisine": "text" })
            .build();
        self.db
            .listings()
            .create_index(index)
            .await
            .map_err(|e| SearchError::datastore("create_text_index", e))?;
        Ok(())
    }

    /// Equality and quality filters as a Mongo filter document. Query text,
    /// geometry and pagination are intentionally absent.
    fn listing_filter(filters: &SearchFilters) -> Document {
        let mut filter = doc! {};
        if let Some(region) = &filters.region {
            filter.insert("region", region.as_str());
        }
        if let Some(category) = &filters.category {
            filter.insert("category", category.as_str());
        }
        if let Some(cuisine) = &filters.cuisine {
            filter.insert("cuisine", cuisine.as_str());
        }
        if let Some(certifier) = &filters.certifier {
            filter.insert("certifier", certifier.as_str());
        }
        if let Some(certified) = filters.certified {
            filter.insert("certified", certified);
        }
        if let Some(delivery) = filters.delivery {
            filter.insert("delivery", delivery);
        }
        if let Some(min_rating) = filters.min_rating {
            filter.insert("rating", doc! { "$gte": min_rating });
        }
        if let Some(has_reviews) = filters.has_reviews {
            if has_reviews {
                filter.insert("review_count", doc! { "$gt": 0 });
            } else {
                filter.insert("review_count", 0_i64);
            }
        }
        if let Some(open_now) = filters.open_now {
            filter.insert("open_now", open_now);
        }
        filter
    }

    fn stats_filter(filters: &StatsFilters) -> Document {
        let mut filter = doc! {};
        if let Some(region) = &filters.region {
            filter.insert("region", region.as_str());
        }
        if let Some(category) = &filters.category {
            filter.insert("category", category.as_str());
        }
        filter
    }

    fn is_missing_text_index(err: &mongodb::error::Error) -> bool {
        // Server code 27 = IndexNotFound ("text index required for $text query")
        matches!(&*err.kind, ErrorKind::Command(c) if c.code == 27)
    }
}

#[async_trait]
impl ListingStore for MongoListingStore {
    async fn fetch_matching(&self, filters: &SearchFilters) -> Result<Vec<Listing>, SearchError> {
        let filter = Self::listing_filter(filters);
        let cursor = self
            .db
            .listings()
            .find(filter)
            .await
            .map_err(|e| SearchError::datastore("fetch_listings", e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| SearchError::datastore("fetch_listings", e))
    }

    async fn text_search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Option<Vec<(Listing, f64)>>, SearchError> {
        let mut filter = Self::listing_filter(filters);
        filter.insert("$text", doc! { "$search": query });

        let options = FindOptions::builder()
            .projection(doc! { "score": { "$meta": "textScore" } })
            .sort(doc! { "score": { "$meta": "textScore" } })
            .build();

        let cursor = match self
            .db
            .collection::<ScoredListing>(collections::LISTINGS)
            .find(filter)
            .with_options(options)
            .await
        {
            Ok(cursor) => cursor,
            Err(e) if Self::is_missing_text_index(&e) => return Ok(None),
            Err(e) => return Err(SearchError::datastore("text_search", e)),
        };

        let scored: Vec<ScoredListing> = match cursor.try_collect().await {
            Ok(scored) => scored,
            Err(e) if Self::is_missing_text_index(&e) => return Ok(None),
            Err(e) => return Err(SearchError::datastore("text_search", e)),
        };

        Ok(Some(
            scored.into_iter().map(|s| (s.listing, s.score)).collect(),
        ))
    }

    async fn count_grouped(
        &self,
        dimension: StatsDimension,
        filters: &StatsFilters,
    ) -> Result<Vec<GroupCount>, SearchError> {
        let mut pipeline = Vec::new();
        let match_doc = Self::stats_filter(filters);
        if !match_doc.is_empty() {
            pipeline.push(doc! { "$match": match_doc });
        }
        pipeline.push(doc! {
            "$group": {
                "_id": format!("${}", dimension.field_name()),
                "count": { "$sum": 1 },
            }
        });
        pipeline.push(doc! { "$sort": { "count": -1, "_id": 1 } });

        let mut cursor = self
            .db
            .listings()
            .aggregate(pipeline)
            .await
            .map_err(|e| SearchError::datastore("count_grouped", e))?;

        let mut groups = Vec::new();
        while let Some(bucket) = cursor
            .try_next()
            .await
            .map_err(|e| SearchError::datastore("count_grouped", e))?
        {
            // Rows without a value for the dimension group under null; skip them.
            let name = match bucket.get("_id") {
                Some(Bson::String(name)) => name.clone(),
                _ => continue,
            };
            let count = match bucket.get("count") {
                Some(Bson::Int32(n)) => *n as u64,
                Some(Bson::Int64(n)) => *n as u64,
                _ => 0,
            };
            groups.push(GroupCount { name, count });
        }
        Ok(groups)
    }

    async fn count_all(&self, filters: &StatsFilters) -> Result<u64, SearchError> {
        self.db
            .listings()
            .count_documents(Self::stats_filter(filters))
            .await
            .map_err(|e| SearchError::datastore("count_listings", e))
    }

    async fn suggestion_terms(&self) -> Result<Vec<String>, SearchError> {
        let listings = self.db.listings();
        let mut terms = Vec::new();
        for field in ["name", "category", "cuisine"] {
            let values = listings
                .distinct(field, doc! {})
                .await
                .map_err(|e| SearchError::datastore("suggestion_terms", e))?;
            terms.extend(values.into_iter().filter_map(|v| match v {
                Bson::String(s) => Some(s),
                _ => None,
            }));
        }
        terms.sort();
        terms.dedup();
        Ok(terms)
    }
}
