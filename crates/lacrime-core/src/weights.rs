//! Spatial co-occurrence weighting over rounded coordinate pairs.

use std::collections::HashSet;

use polars::prelude::*;
use tracing::debug;

use crate::categories::CANONICAL_CATEGORIES;
use crate::error::{PipelineError, Result};
use crate::schema::{CRIME_DESCRIPTION, LATITUDE, LONGITUDE};

/// Pseudo-category selecting the full enriched dataset.
pub const ALL_CATEGORIES: &str = "All";

/// Matching tolerance for the support scan. Coordinates are compared within
/// this distance rather than for exact equality, so rounding residue from
/// independent float paths still groups together.
pub const COORD_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateWeight {
    pub latitude: f64,
    pub longitude: f64,
    /// Number of enriched rows sharing this rounded coordinate.
    pub support: u32,
    /// Support normalized by the maximum support, in (0, 1].
    pub weight: f64,
}

/// Computes, per distinct rounded coordinate pair, how many rows of the
/// selected category share that coordinate, normalized so the densest pair
/// has weight 1.0.
///
/// The scan is O(D x N) over D distinct pairs and N restricted rows, which is
/// fine at tens of thousands of rows but worth revisiting if D grows large.
pub fn coordinate_weights(enriched: &DataFrame, category: &str) -> Result<Vec<CoordinateWeight>> {
    let restricted = restrict_to_category(enriched, category)?;
    let lat = restricted.column(LATITUDE)?.f64()?;
    let lng = restricted.column(LONGITUDE)?.f64()?;
    let height = restricted.height();

    let mut pairs: Vec<(f64, f64)> = Vec::new();
    let mut seen: HashSet<(u64, u64)> = HashSet::new();
    for idx in 0..height {
        if let (Some(lat_value), Some(lng_value)) = (lat.get(idx), lng.get(idx)) {
            if seen.insert((lat_value.to_bits(), lng_value.to_bits())) {
                pairs.push((lat_value, lng_value));
            }
        }
    }
    debug!(
        category,
        rows = height,
        distinct_pairs = pairs.len(),
        "scanning coordinate supports"
    );

    let mut supports: Vec<u32> = Vec::with_capacity(pairs.len());
    for (pair_lat, pair_lng) in &pairs {
        let mut support = 0u32;
        for idx in 0..height {
            if let (Some(lat_value), Some(lng_value)) = (lat.get(idx), lng.get(idx)) {
                if (lat_value - pair_lat).abs() <= COORD_TOLERANCE
                    && (lng_value - pair_lng).abs() <= COORD_TOLERANCE
                {
                    support += 1;
                }
            }
        }
        supports.push(support);
    }

    let max_support = supports.iter().copied().max().unwrap_or(0);
    Ok(pairs
        .into_iter()
        .zip(supports)
        .map(|((latitude, longitude), support)| CoordinateWeight {
            latitude,
            longitude,
            support,
            weight: support as f64 / max_support as f64,
        })
        .collect())
}

fn restrict_to_category(enriched: &DataFrame, category: &str) -> Result<DataFrame> {
    if category == ALL_CATEGORIES {
        return Ok(enriched.clone());
    }
    if !CANONICAL_CATEGORIES.contains(&category) {
        return Err(PipelineError::UnknownCategory(category.to_string()));
    }
    let keep: Vec<bool> = enriched
        .column(CRIME_DESCRIPTION)?
        .str()?
        .iter()
        .map(|value| value == Some(category))
        .collect();
    let mask = BooleanChunked::from_slice("".into(), &keep);
    Ok(enriched.filter(&mask)?)
}
