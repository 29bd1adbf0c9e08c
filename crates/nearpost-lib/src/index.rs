//! In-memory point index built once per batch of sources.
//!
//! Coordinates are stored as two parallel arrays next to the full records so
//! the query engine can scan them without touching attribute maps.

use sha2::{Digest, Sha256};

use crate::record::GeoRecord;
use crate::table::RawTable;

/// Domain tag separating record-level digests from source-set digests.
const RECORD_SET_DOMAIN: &[u8] = b"nearpost/records\0";

/// Immutable, ordered collection of validated records.
///
/// Insertion order is source order, then row order within each source. The
/// index is never mutated after construction; a changed source set produces a
/// new index.
#[derive(Debug, Clone, Default)]
pub struct PointIndex {
    records: Vec<GeoRecord>,
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
    fingerprint: String,
}

impl PointIndex {
    /// Build an index over `records`, keeping their order.
    pub fn new(records: Vec<GeoRecord>, fingerprint: impl Into<String>) -> Self {
        let latitudes = records.iter().map(|record| record.latitude).collect();
        let longitudes = records.iter().map(|record| record.longitude).collect();
        Self {
            records,
            latitudes,
            longitudes,
            fingerprint: fingerprint.into(),
        }
    }

    /// Build an index over `records` with a fingerprint derived from their
    /// provenance and coordinates.
    ///
    /// This is for indexes assembled without raw sources (fixtures, benches,
    /// embedders). Its fingerprint is never equal to a
    /// [`source_set_fingerprint`], so a [`Session`](crate::Session) reload
    /// always replaces such an index.
    pub fn from_records(records: Vec<GeoRecord>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(RECORD_SET_DOMAIN);
        for record in &records {
            hasher.update(record.source.as_bytes());
            hasher.update(record.latitude.to_le_bytes());
            hasher.update(record.longitude.to_le_bytes());
        }
        let fingerprint = hex::encode(hasher.finalize());
        Self::new(records, fingerprint)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&GeoRecord> {
        self.records.get(position)
    }

    pub fn records(&self) -> &[GeoRecord] {
        &self.records
    }

    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    /// Hex SHA-256 digest identifying what this index was built from.
    ///
    /// Indexes produced by ingestion carry the [`source_set_fingerprint`] of
    /// their raw sources (names, headers, cells, failure causes). Indexes
    /// built with [`PointIndex::from_records`] hash record provenance and
    /// coordinates under a separate domain tag instead.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Distinct source names in first-seen order.
    pub fn sources(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.source.as_str()) {
                seen.push(record.source.as_str());
            }
        }
        seen
    }

    /// Arithmetic mean of all coordinates, used as a fallback map centre
    /// before any observer position is known.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let count = self.len() as f64;
        let lat = self.latitudes.iter().sum::<f64>() / count;
        let lon = self.longitudes.iter().sum::<f64>() / count;
        Some((lat, lon))
    }
}

/// Fingerprint an ordered source set from names and payload contents.
///
/// Unreadable sources contribute their failure cause, so a source that
/// recovers changes the fingerprint.
pub fn source_set_fingerprint<'a, I>(sources: I) -> String
where
    I: IntoIterator<Item = (&'a str, std::result::Result<&'a RawTable, &'a str>)>,
{
    let mut hasher = Sha256::new();
    for (name, payload) in sources {
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        match payload {
            Ok(table) => {
                hasher.update([1u8]);
                for header in table.headers() {
                    hasher.update(header.as_bytes());
                    hasher.update([0x1f]);
                }
                for row in table.rows() {
                    hasher.update([0x1e]);
                    for cell in row {
                        hasher.update(cell.as_bytes());
                        hasher.update([0x1f]);
                    }
                }
            }
            Err(cause) => {
                hasher.update([2u8]);
                hasher.update(cause.as_bytes());
            }
        }
        hasher.update([0x1d]);
    }
    hex::encode(hasher.finalize())
}
