// Module exports for CLI subcommands
//
// Each module handles a specific CLI subcommand. main.rs parses arguments,
// resolves the origin, and dispatches to these handlers.

pub mod nearest;
pub mod sources;
pub mod track;

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use nearpost_lib::{load_sources, IngestConfig, ReloadOutcome, Session, SourceOrigin};

use crate::output::Renderer;

/// Exit status used when a query ran against an empty index.
pub const EXIT_NO_DATA: u8 = 2;

/// Resolve the source origin from command-line flags.
///
/// `--data-dir` and `--origin` are mutually exclusive; without either the
/// library falls back to `NEARPOST_DATA_DIR` and then `./data`.
pub fn resolve_origin(data_dir: Option<&Path>, origin: Option<&str>) -> Result<SourceOrigin> {
    let explicit = data_dir
        .map(|dir| dir.to_string_lossy().into_owned())
        .or_else(|| origin.map(str::to_string));
    SourceOrigin::resolve(explicit.as_deref()).context("failed to resolve the source origin")
}

/// Read the selected sources and build a query session over them.
///
/// Per-source warnings are written to stderr; a failure to list the origin
/// aborts with an error.
pub fn load_session(
    origin: &SourceOrigin,
    selection: &[String],
    config: IngestConfig,
    renderer: &Renderer,
) -> Result<Session> {
    let sources = load_sources(origin, selection)
        .with_context(|| format!("failed to load sources from {}", origin))?;

    let (session, outcome) = Session::from_sources(&sources, config);
    if let ReloadOutcome::Rebuilt { report, warnings } = outcome {
        renderer.render_warnings(&mut io::stderr().lock(), &warnings)?;
        info!(
            records = report.records,
            sources = report.sources_read,
            dropped = report.rows_dropped,
            "loaded {} records from {} sources",
            report.records,
            sources.len()
        );
    }

    Ok(session)
}
