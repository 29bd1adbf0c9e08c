//! Nearest-point query engine.
//!
//! A query is a single full scan over the index's coordinate arrays. At the
//! data sizes this crate targets (thousands of markers) the scan is cheaper
//! than maintaining a spatial tree, and it keeps tie-breaking trivial.

use serde::Serialize;

use crate::distance::distance_many;
use crate::error::{Error, Result};
use crate::index::PointIndex;
use crate::observer::ObserverPosition;
use crate::record::GeoRecord;

/// The closest record to an observer and its great-circle distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub record: GeoRecord,
    pub distance_meters: f64,
    /// Insertion position of `record` within the queried index.
    pub position: usize,
}

/// Find the record closest to `observer`.
///
/// Ties on the exact minimum distance resolve to the lowest insertion
/// position. The observer's domain is not checked here; out-of-range but
/// finite positions still produce a distance.
///
/// # Errors
///
/// Returns [`Error::NoDataAvailable`] when `index` is empty, and
/// [`Error::InvalidObserver`] when either observer coordinate is not finite.
pub fn nearest(index: &PointIndex, observer: ObserverPosition) -> Result<QueryResult> {
    if index.is_empty() {
        return Err(Error::NoDataAvailable);
    }
    if !observer.latitude.is_finite() || !observer.longitude.is_finite() {
        return Err(Error::InvalidObserver {
            latitude: observer.latitude.to_string(),
            longitude: observer.longitude.to_string(),
        });
    }

    let distances = distance_many(
        observer.latitude,
        observer.longitude,
        index.latitudes(),
        index.longitudes(),
    );

    let (position, distance_meters) = min_position(&distances).ok_or(Error::NoDataAvailable)?;
    let record = index.get(position).cloned().ok_or(Error::NoDataAvailable)?;

    Ok(QueryResult {
        record,
        distance_meters,
        position,
    })
}

/// Position and value of the first minimum. NaN entries never win.
fn min_position(values: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (position, &value) in values.iter().enumerate() {
        match best {
            _ if value.is_nan() => {}
            Some((_, current)) if value >= current => {}
            _ => best = Some((position, value)),
        }
    }
    best
}
