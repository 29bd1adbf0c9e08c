//! Query session: owns the current index and answers observer events.
//!
//! Readers take an `Arc` snapshot of the index, so a concurrent rebuild never
//! exposes a partially constructed index. A rebuild is skipped when the
//! incoming source set has the same fingerprint as the current index.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::error::{IngestionWarning, Result};
use crate::index::PointIndex;
use crate::ingest::{batch_fingerprint, ingest_with, IngestConfig, IngestReport, RawSource};
use crate::nearest::{nearest, QueryResult};
use crate::observer::ObserverPosition;

/// Outcome of [`Session::reload`].
#[derive(Debug, Clone)]
pub enum ReloadOutcome {
    /// A new index was built and swapped in.
    Rebuilt {
        report: IngestReport,
        warnings: Vec<IngestionWarning>,
    },
    /// The source set matched the current fingerprint; nothing changed.
    Unchanged,
}

#[derive(Debug, Default)]
pub struct Session {
    config: IngestConfig,
    index: RwLock<Arc<PointIndex>>,
}

impl Session {
    /// An empty session using the default column configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: IngestConfig) -> Self {
        Self {
            config,
            index: RwLock::default(),
        }
    }

    /// Build a session and ingest `sources` immediately.
    pub fn from_sources(sources: &[RawSource], config: IngestConfig) -> (Self, ReloadOutcome) {
        let session = Self::with_config(config);
        let outcome = session.reload(sources);
        (session, outcome)
    }

    /// The index currently in use.
    pub fn snapshot(&self) -> Arc<PointIndex> {
        let guard = self.index.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Map centre to use before any observer position is known: the centroid
    /// of the current index, or `None` while it is empty.
    pub fn default_center(&self) -> Option<ObserverPosition> {
        let (latitude, longitude) = self.snapshot().centroid()?;
        Some(ObserverPosition::new(latitude, longitude))
    }

    /// Re-ingest `sources`, swapping in a new index if the set changed.
    pub fn reload(&self, sources: &[RawSource]) -> ReloadOutcome {
        let fingerprint = batch_fingerprint(sources);

        if self.snapshot().fingerprint() == fingerprint {
            debug!(%fingerprint, "source set unchanged; keeping current index");
            return ReloadOutcome::Unchanged;
        }

        let ingested = ingest_with(sources, &self.config);
        let rebuilt = Arc::new(ingested.index);
        *self.index.write().unwrap_or_else(PoisonError::into_inner) = rebuilt;

        info!(
            records = ingested.report.records,
            %fingerprint,
            "swapped in rebuilt index"
        );
        ReloadOutcome::Rebuilt {
            report: ingested.report,
            warnings: ingested.warnings,
        }
    }

    /// Answer one observer event against the current index.
    pub fn nearest(&self, observer: ObserverPosition) -> Result<QueryResult> {
        nearest(&self.snapshot(), observer)
    }

    /// Answer each observer event in turn.
    ///
    /// Every position is evaluated independently against the index current
    /// at the time it is pulled; no state carries between events. A stream
    /// that never yields leaves the session idle.
    pub fn track<'a, I>(&'a self, positions: I) -> impl Iterator<Item = Result<QueryResult>> + 'a
    where
        I: IntoIterator<Item = ObserverPosition>,
        I::IntoIter: 'a,
    {
        positions
            .into_iter()
            .map(move |observer| self.nearest(observer))
    }
}
