use thiserror::Error;

/// Convenient result alias for the nearpost library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a query is attempted against an index with no records.
    #[error("no data available: the point index is empty")]
    NoDataAvailable,

    /// Raised when a source origin descriptor cannot be interpreted.
    #[error("invalid origin reference '{origin}': {reason}")]
    InvalidOriginReference { origin: String, reason: String },

    /// Raised when a well-formed origin could not be listed.
    #[error("origin {origin} is unreachable: {message}")]
    OriginUnreachable { origin: String, message: String },

    /// Raised when a selected source is not part of the origin listing.
    #[error("source {source_name} was not found in the origin{}", format_available(.available))]
    SourceNotFound {
        source_name: String,
        available: Vec<String>,
    },

    /// Raised by source readers when a payload could not be obtained or parsed.
    #[error("source {source_name} could not be read: {cause}")]
    SourceUnreadable { source_name: String, cause: String },

    /// Raised when an observer coordinate fails parsing or domain checks.
    #[error("invalid observer position ({latitude}, {longitude})")]
    InvalidObserver { latitude: String, longitude: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for CSV parsing errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Per-source condition recorded during ingestion.
///
/// Warnings never abort a batch; they are collected for the caller to report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestionWarning {
    /// The source lacks a recognized latitude or longitude column.
    #[error("source {source_name} has no latitude/longitude columns; skipped")]
    MissingCoordinateColumns { source_name: String },

    /// The source payload could not be obtained or parsed.
    #[error("source {source_name} could not be read: {cause}")]
    SourceUnreadable { source_name: String, cause: String },
}

impl IngestionWarning {
    /// Name of the source the warning refers to.
    pub fn source_name(&self) -> &str {
        match self {
            IngestionWarning::MissingCoordinateColumns { source_name }
            | IngestionWarning::SourceUnreadable { source_name, .. } => source_name,
        }
    }
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(
            "; available: {}",
            available
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
