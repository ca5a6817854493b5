//! Read-only aggregation over the listing store, independent of the search
//! call path. Used by dashboards and reporting.

use crate::error::SearchError;
use crate::models::{DirectoryStats, StatsDimension, StatsFilters};
use crate::store::ListingStore;

pub async fn directory_stats(
    store: &dyn ListingStore,
    filters: &StatsFilters,
) -> Result<DirectoryStats, SearchError> {
    let total_listings = store.count_all(filters).await?;
    let by_region = store.count_grouped(StatsDimension::Region, filters).await?;
    let by_category = store
        .count_grouped(StatsDimension::Category, filters)
        .await?;
    let by_certifier = store
        .count_grouped(StatsDimension::Certifier, filters)
        .await?;

    Ok(DirectoryStats {
        total_listings,
        by_region,
        by_category,
        by_certifier,
    })
}
