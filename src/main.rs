use std::sync::Arc;
use std::time::Duration;

use platefinder::api::{self, AppState};
use platefinder::cache::MemoryCache;
use platefinder::config::CONFIG;
use platefinder::db::{Database, MongoListingStore};
use platefinder::search::SearchService;
use platefinder::store::ListingStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber (handles both tracing and log crate)
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let db = Database::from_config().await?;
    let mongo_store = Arc::new(MongoListingStore::new(db));
    if let Err(e) = mongo_store.ensure_indexes().await {
        // Full-text search degrades to relevance scoring at query time.
        tracing::warn!(error = %e, "could not create text index");
    }
    let store: Arc<dyn ListingStore> = mongo_store;

    let state = AppState {
        service: Arc::new(SearchService::new(store.clone())),
        store,
        cache: Arc::new(MemoryCache::new()),
        cache_ttl: Duration::from_secs(CONFIG.cache_ttl_secs),
    };

    let router = api::create_router(state);
    let listener = tokio::net::TcpListener::bind(&CONFIG.bind_addr).await?;
    tracing::info!(addr = %CONFIG.bind_addr, "platefinder listening");
    axum::serve(listener, router).await?;
    Ok(())
}
