use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Raw, fully-optional filter values as they arrive from the transport
/// layer. Validated into [`SearchFilters`] before any store access.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchFilterInput {
    pub query: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
    pub region: Option<String>,
    pub category: Option<String>,
    pub cuisine: Option<String>,
    pub certifier: Option<String>,
    pub certified: Option<bool>,
    pub delivery: Option<bool>,
    pub min_rating: Option<f64>,
    pub has_reviews: Option<bool>,
    pub open_now: Option<bool>,
    pub fuzzy_threshold: Option<f64>,
}

/// Validated, immutable description of a single search request. Defaults
/// are applied during validation; the struct is never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchFilters {
    pub query: Option<String>,
    pub limit: usize,
    pub offset: usize,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Search radius in miles. Only meaningful together with `lat`/`lng`.
    pub radius: Option<f64>,
    pub region: Option<String>,
    pub category: Option<String>,
    pub cuisine: Option<String>,
    pub certifier: Option<String>,
    pub certified: Option<bool>,
    pub delivery: Option<bool>,
    pub min_rating: Option<f64>,
    pub has_reviews: Option<bool>,
    pub open_now: Option<bool>,
    pub fuzzy_threshold: f64,
}

impl SearchFilters {
    pub const DEFAULT_LIMIT: usize = 50;
    pub const MAX_LIMIT: usize = 100;
    pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.3;

    /// Validates raw input and applies defaults. Fails with a
    /// `ValidationError` naming the offending field; no store access
    /// happens before this succeeds.
    pub fn from_input(input: SearchFilterInput) -> Result<SearchFilters, SearchError> {
        let limit = input.limit.unwrap_or(Self::DEFAULT_LIMIT as i64);
        if limit < 1 || limit > Self::MAX_LIMIT as i64 {
            return Err(SearchError::validation(
                "limit",
                format!("must be between 1 and {}, got {limit}", Self::MAX_LIMIT),
            ));
        }

        let offset = input.offset.unwrap_or(0);
        if offset < 0 {
            return Err(SearchError::validation(
                "offset",
                format!("must not be negative, got {offset}"),
            ));
        }

        match (input.lat, input.lng) {
            (Some(_), None) => {
                return Err(SearchError::validation(
                    "lng",
                    "lat was provided without lng",
                ));
            }
            (None, Some(_)) => {
                return Err(SearchError::validation(
                    "lat",
                    "lng was provided without lat",
                ));
            }
            _ => {}
        }

        if let Some(lat) = input.lat
            && (!lat.is_finite() || !(-90.0..=90.0).contains(&lat))
        {
            return Err(SearchError::validation(
                "lat",
                format!("must be a finite latitude in [-90, 90], got {lat}"),
            ));
        }
        if let Some(lng) = input.lng
            && (!lng.is_finite() || !(-180.0..=180.0).contains(&lng))
        {
            return Err(SearchError::validation(
                "lng",
                format!("must be a finite longitude in [-180, 180], got {lng}"),
            ));
        }

        if let Some(radius) = input.radius {
            if input.lat.is_none() || input.lng.is_none() {
                return Err(SearchError::validation(
                    "radius",
                    "requires both lat and lng",
                ));
            }
            if !radius.is_finite() || radius <= 0.0 {
                return Err(SearchError::validation(
                    "radius",
                    format!("must be a positive number of miles, got {radius}"),
                ));
            }
        }

        let fuzzy_threshold = input
            .fuzzy_threshold
            .unwrap_or(Self::DEFAULT_FUZZY_THRESHOLD);
        if !fuzzy_threshold.is_finite() || !(0.0..=1.0).contains(&fuzzy_threshold) {
            return Err(SearchError::validation(
                "fuzzy_threshold",
                format!("must be between 0.0 and 1.0, got {fuzzy_threshold}"),
            ));
        }

        let query = input.query.and_then(|q| {
            let trimmed = q.trim().to_string();
            if trimmed.is_empty() { None } else { Some(trimmed) }
        });

        Ok(SearchFilters {
            query,
            limit: limit as usize,
            offset: offset as usize,
            lat: input.lat,
            lng: input.lng,
            radius: input.radius,
            region: input.region,
            category: input.category,
            cuisine: input.cuisine,
            certifier: input.certifier,
            certified: input.certified,
            delivery: input.delivery,
            min_rating: input.min_rating,
            has_reviews: input.has_reviews,
            open_now: input.open_now,
            fuzzy_threshold,
        })
    }

    pub fn has_location(&self) -> bool {
        self.lat.is_some() && self.lng.is_some()
    }
}
