//! nearpost library entry points.
//!
//! This crate ingests tabular coordinate sources into an immutable point
//! index and answers "which record is nearest to this observer?" queries
//! against it. Higher-level consumers (the CLI, map front ends) should only
//! depend on the functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod distance;
pub mod error;
pub mod github;
pub mod index;
pub mod ingest;
pub mod nearest;
pub mod observer;
pub mod record;
pub mod session;
pub mod source;
pub mod table;

pub use distance::{distance_many, haversine, EARTH_RADIUS_METERS};
pub use error::{Error, IngestionWarning, Result};
pub use github::{GitHubOrigin, GitHubReference};
pub use index::PointIndex;
pub use ingest::{
    ingest, ingest_with, IngestConfig, IngestReport, Ingested, RawSource, SourcePayload,
};
pub use nearest::{nearest, QueryResult};
pub use observer::ObserverPosition;
pub use record::{AttributeValue, DisplayFields, GeoRecord};
pub use session::{ReloadOutcome, Session};
pub use source::{
    load_sources, LocalDirectory, SourceEnumerator, SourceOrigin, SourceReader, DATA_DIR_ENV,
};
pub use table::RawTable;
