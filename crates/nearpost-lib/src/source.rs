//! Source enumeration and reading.
//!
//! An origin lists the tabular sources it offers and reads them by name.
//! Listing failures are fatal for the batch (nothing is known to load), while
//! individual read failures are carried into ingestion as warnings.

use std::env;
use std::ffi::OsStr;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::github::{GitHubOrigin, GitHubReference};
use crate::ingest::RawSource;
use crate::table::RawTable;

/// Environment variable overriding the default source origin.
pub const DATA_DIR_ENV: &str = "NEARPOST_DATA_DIR";

/// Directory searched when no origin is configured.
pub const DEFAULT_DATA_DIR: &str = "data";

/// File extension recognised as a tabular source.
const SOURCE_EXTENSION: &str = "csv";

/// Lists the source names an origin offers.
pub trait SourceEnumerator {
    /// Available source names in a stable order.
    ///
    /// A reachable origin with no sources yields an empty list, not an error.
    fn list_sources(&self) -> Result<Vec<String>>;
}

/// Reads one named source into a [`RawTable`].
pub trait SourceReader {
    /// # Errors
    ///
    /// Returns [`Error::SourceUnreadable`] when the payload cannot be fetched
    /// or parsed.
    fn read_source(&self, name: &str) -> Result<RawTable>;
}

/// A directory of CSV files on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDirectory {
    root: PathBuf,
}

impl LocalDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn listing_error(&self, err: io::Error) -> Error {
        let origin = self.root.display().to_string();
        if err.kind() == io::ErrorKind::NotFound {
            Error::OriginUnreachable {
                origin,
                message: "directory does not exist".to_string(),
            }
        } else if self.root.exists() && !self.root.is_dir() {
            Error::InvalidOriginReference {
                origin,
                reason: format!("not a directory ({err})"),
            }
        } else {
            Error::OriginUnreachable {
                origin,
                message: err.to_string(),
            }
        }
    }

    fn unreadable(name: &str, cause: impl fmt::Display) -> Error {
        Error::SourceUnreadable {
            source_name: name.to_string(),
            cause: cause.to_string(),
        }
    }
}

impl SourceEnumerator for LocalDirectory {
    fn list_sources(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) => return Err(self.listing_error(err)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let is_source = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
                .unwrap_or(false);
            if let (true, Some(name)) = (is_source, entry.file_name().to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();

        debug!(root = %self.root.display(), count = names.len(), "listed local sources");
        Ok(names)
    }
}

impl SourceReader for LocalDirectory {
    fn read_source(&self, name: &str) -> Result<RawTable> {
        // Names are plain file names; anything else could escape the root.
        if name.is_empty() || Path::new(name).file_name() != Some(OsStr::new(name)) {
            return Err(Self::unreadable(name, "not a plain file name"));
        }

        let path = self.root.join(name);
        let file = File::open(&path).map_err(|err| Self::unreadable(name, err))?;
        RawTable::from_csv_reader(BufReader::new(file)).map_err(|err| Self::unreadable(name, err))
    }
}

/// Where sources are listed and read from.
#[derive(Debug)]
pub enum SourceOrigin {
    Local(LocalDirectory),
    GitHub(GitHubOrigin),
}

impl SourceOrigin {
    /// Interpret an origin descriptor.
    ///
    /// `github:owner/repo[/path][@branch]` and `https://github.com/...` URLs
    /// select a remote repository directory; anything else is a local path.
    pub fn parse(reference: &str) -> Result<Self> {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidOriginReference {
                origin: reference.to_string(),
                reason: "origin is empty".to_string(),
            });
        }

        if GitHubReference::is_remote(trimmed) {
            let parsed = GitHubReference::parse(trimmed)?;
            return Ok(SourceOrigin::GitHub(GitHubOrigin::new(parsed)?));
        }

        Ok(SourceOrigin::Local(LocalDirectory::new(trimmed)))
    }

    /// Resolve the origin to use.
    ///
    /// The resolution order is:
    /// 1. Explicit `origin` argument when provided.
    /// 2. `NEARPOST_DATA_DIR` environment variable.
    /// 3. The `data` directory relative to the working directory.
    pub fn resolve(origin: Option<&str>) -> Result<Self> {
        if let Some(explicit) = origin {
            return Self::parse(explicit);
        }

        if let Some(env_origin) = env::var_os(DATA_DIR_ENV) {
            return Self::parse(&env_origin.to_string_lossy());
        }

        Ok(SourceOrigin::Local(LocalDirectory::new(DEFAULT_DATA_DIR)))
    }
}

impl fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOrigin::Local(dir) => write!(f, "{}", dir.root().display()),
            SourceOrigin::GitHub(remote) => write!(f, "{}", remote.reference()),
        }
    }
}

impl SourceEnumerator for SourceOrigin {
    fn list_sources(&self) -> Result<Vec<String>> {
        match self {
            SourceOrigin::Local(dir) => dir.list_sources(),
            SourceOrigin::GitHub(remote) => remote.list_sources(),
        }
    }
}

impl SourceReader for SourceOrigin {
    fn read_source(&self, name: &str) -> Result<RawTable> {
        match self {
            SourceOrigin::Local(dir) => dir.read_source(name),
            SourceOrigin::GitHub(remote) => remote.read_source(name),
        }
    }
}

/// Read the selected sources from `origin`.
///
/// An empty `selection` reads every listed source. Each selected name must
/// appear in the listing. Per-source read failures are returned as
/// unreadable payloads so ingestion can report them without aborting.
pub fn load_sources<O>(origin: &O, selection: &[String]) -> Result<Vec<RawSource>>
where
    O: SourceEnumerator + SourceReader + ?Sized,
{
    let available = origin.list_sources()?;

    let chosen: Vec<String> = if selection.is_empty() {
        available.clone()
    } else {
        for name in selection {
            if !available.contains(name) {
                return Err(Error::SourceNotFound {
                    source_name: name.clone(),
                    available: available.clone(),
                });
            }
        }
        selection.to_vec()
    };

    let sources: Vec<RawSource> = chosen
        .into_iter()
        .map(|name| match origin.read_source(&name) {
            Ok(table) => RawSource::table(name, table),
            Err(Error::SourceUnreadable { cause, .. }) => RawSource::unreadable(name, cause),
            Err(other) => RawSource::unreadable(name, other.to_string()),
        })
        .collect();

    info!(
        available = available.len(),
        selected = sources.len(),
        "loaded source payloads"
    );
    Ok(sources)
}
