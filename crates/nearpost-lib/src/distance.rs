//! Great-circle distance on a spherical Earth.
//!
//! All inputs are in degrees and all outputs are in metres. The sphere model
//! ignores ellipsoidal flattening, which is well inside tolerance for
//! "nearest marker" lookups over a few kilometres.

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance in metres between two latitude/longitude points.
///
/// The result is non-negative, symmetric in its arguments, and exactly zero
/// when both points are identical.
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    haversine_radians(phi1, phi1.cos(), lon1, phi2, lon2)
}

/// Distances in metres from one point to every point of a coordinate array.
///
/// `output[i]` is the distance to `(lats[i], lons[i])`. Both slices are
/// expected to have equal length; only the common prefix is evaluated
/// otherwise.
pub fn distance_many(lat1: f64, lon1: f64, lats: &[f64], lons: &[f64]) -> Vec<f64> {
    debug_assert_eq!(lats.len(), lons.len(), "coordinate arrays differ in length");

    let phi1 = lat1.to_radians();
    let cos_phi1 = phi1.cos();
    lats.iter()
        .zip(lons)
        .map(|(&lat2, &lon2)| haversine_radians(phi1, cos_phi1, lon1, lat2.to_radians(), lon2))
        .collect()
}

#[inline]
fn haversine_radians(phi1: f64, cos_phi1: f64, lon1: f64, phi2: f64, lon2: f64) -> f64 {
    let delta_phi = phi2 - phi1;
    let delta_lambda = (lon2 - lon1).to_radians();

    let sin_dphi = (delta_phi / 2.0).sin();
    let sin_dlambda = (delta_lambda / 2.0).sin();
    let a = sin_dphi * sin_dphi + cos_phi1 * phi2.cos() * sin_dlambda * sin_dlambda;
    // Rounding can push `a` marginally above 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_METERS * c
}
