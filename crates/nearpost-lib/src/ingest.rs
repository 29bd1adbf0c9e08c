//! Record ingestion: validate and union heterogeneous coordinate tables.
//!
//! Each source is processed independently. Source-level problems become
//! [`IngestionWarning`]s and never abort the batch; rows with invalid or
//! out-of-domain coordinates are dropped silently.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::error::IngestionWarning;
use crate::index::{source_set_fingerprint, PointIndex};
use crate::record::{
    coerce_coordinate, AttributeValue, GeoRecord, LATITUDE_RANGE, LONGITUDE_RANGE,
};
use crate::table::RawTable;

/// A reader's outcome for one source: a table, or the reason it failed.
pub type SourcePayload = std::result::Result<RawTable, String>;

/// A named source handed to [`ingest`].
#[derive(Debug, Clone)]
pub struct RawSource {
    pub name: String,
    pub payload: SourcePayload,
}

impl RawSource {
    pub fn new(name: impl Into<String>, payload: SourcePayload) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    pub fn table(name: impl Into<String>, table: RawTable) -> Self {
        Self::new(name, Ok(table))
    }

    pub fn unreadable(name: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::new(name, Err(cause.into()))
    }
}

/// Recognised coordinate column names.
///
/// Names are tried in order, exact matches first and then ASCII
/// case-insensitive ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub latitude_columns: Vec<String>,
    pub longitude_columns: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            latitude_columns: vec!["Lat".to_string()],
            longitude_columns: vec!["Lon".to_string()],
        }
    }
}

impl IngestConfig {
    /// Accept additional column names after the defaults.
    pub fn with_aliases(
        mut self,
        latitude: impl IntoIterator<Item = String>,
        longitude: impl IntoIterator<Item = String>,
    ) -> Self {
        self.latitude_columns.extend(latitude);
        self.longitude_columns.extend(longitude);
        self
    }
}

/// Counters describing one ingestion batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Sources whose payload was readable, whether or not they had coordinates.
    pub sources_read: usize,
    pub rows_seen: usize,
    pub rows_dropped: usize,
    pub records: usize,
}

/// Result of an ingestion batch.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub index: PointIndex,
    pub warnings: Vec<IngestionWarning>,
    pub report: IngestReport,
}

/// Ingest `sources` with the default `Lat`/`Lon` column names.
pub fn ingest(sources: &[RawSource]) -> Ingested {
    ingest_with(sources, &IngestConfig::default())
}

/// Ingest `sources` into a single [`PointIndex`].
///
/// The union keeps source order, then row order within each source. An empty
/// union is not an error; queries against it report `NoDataAvailable`.
pub fn ingest_with(sources: &[RawSource], config: &IngestConfig) -> Ingested {
    let mut records = Vec::new();
    let mut warnings = Vec::new();
    let mut report = IngestReport::default();

    for source in sources {
        let table = match &source.payload {
            Ok(table) => table,
            Err(cause) => {
                warn!(source = %source.name, %cause, "source unreadable; skipping");
                warnings.push(IngestionWarning::SourceUnreadable {
                    source_name: source.name.clone(),
                    cause: cause.clone(),
                });
                continue;
            }
        };
        report.sources_read += 1;
        report.rows_seen += table.row_count();

        let (Some(lat_col), Some(lon_col)) = (
            table.find_column(&config.latitude_columns),
            table.find_column(&config.longitude_columns),
        ) else {
            warn!(source = %source.name, "source lacks coordinate columns; skipping");
            warnings.push(IngestionWarning::MissingCoordinateColumns {
                source_name: source.name.clone(),
            });
            report.rows_dropped += table.row_count();
            continue;
        };

        let before = records.len();
        for row in table.rows() {
            let (Some(latitude), Some(longitude)) = (
                coerce_coordinate(&row[lat_col], LATITUDE_RANGE),
                coerce_coordinate(&row[lon_col], LONGITUDE_RANGE),
            ) else {
                continue;
            };
            records.push(GeoRecord {
                latitude,
                longitude,
                source: source.name.clone(),
                attributes: row_attributes(table.headers(), row),
            });
        }

        let kept = records.len() - before;
        let dropped = table.row_count() - kept;
        report.rows_dropped += dropped;
        debug!(source = %source.name, rows = table.row_count(), kept, dropped, "ingested source");
    }

    report.records = records.len();
    let index = PointIndex::new(records, batch_fingerprint(sources));

    info!(
        sources = sources.len(),
        records = report.records,
        dropped = report.rows_dropped,
        warnings = warnings.len(),
        fingerprint = %index.fingerprint(),
        "built point index"
    );

    Ingested {
        index,
        warnings,
        report,
    }
}

/// Fingerprint of an ordered source batch, as carried by the index built
/// from it.
pub(crate) fn batch_fingerprint(sources: &[RawSource]) -> String {
    let parts = sources.iter().map(|source| {
        let payload = source.payload.as_ref().map_err(String::as_str);
        (source.name.as_str(), payload)
    });
    source_set_fingerprint(parts)
}

fn row_attributes(headers: &[String], row: &[String]) -> BTreeMap<String, AttributeValue> {
    let mut attributes = BTreeMap::new();
    for (header, cell) in headers.iter().zip(row) {
        // Duplicate headers keep the leftmost column.
        attributes
            .entry(header.clone())
            .or_insert_with(|| AttributeValue::from_raw(cell));
    }
    attributes
}
