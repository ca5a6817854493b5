//! Great-circle distance ranking via the haversine formula. Distances are
//! in miles to match the request's `radius` unit.

use crate::error::SearchError;
use crate::models::{Listing, SearchResult};
use crate::search::{StrategyOutput, SearchFilters, paginate, sort_scored_asc};
use crate::store::ListingStore;

/// Fixed so radius filtering and the boundary tests agree on units.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

pub fn haversine_miles(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

pub(crate) async fn search(
    store: &dyn ListingStore,
    filters: &SearchFilters,
) -> Result<StrategyOutput, SearchError> {
    // Presence is enforced by the dispatcher before this runs.
    let (Some(lat), Some(lng)) = (filters.lat, filters.lng) else {
        return Err(SearchError::validation(
            "lat",
            "location search requires both lat and lng",
        ));
    };

    let mut candidates = store.fetch_matching(filters).await?;

    if let Some(query) = &filters.query {
        let needle = query.to_lowercase();
        candidates.retain(|l| l.name.to_lowercase().contains(&needle));
    }

    // Listings without stored coordinates cannot be ranked and are excluded.
    let mut measured: Vec<(Listing, f64)> = candidates
        .into_iter()
        .filter_map(|l| match (l.lat, l.lng) {
            (Some(l_lat), Some(l_lng)) => {
                let distance = haversine_miles(lat, lng, l_lat, l_lng);
                Some((l, distance))
            }
            _ => None,
        })
        .collect();

    if let Some(radius) = filters.radius {
        measured.retain(|(_, distance)| *distance <= radius);
    }

    sort_scored_asc(&mut measured);

    let (page, total_count) = paginate(measured, filters.offset, filters.limit);
    let results = page
        .iter()
        .map(|(listing, distance)| SearchResult::from_listing(listing).with_distance(*distance))
        .collect();
    Ok(StrategyOutput::new(results, total_count))
}
