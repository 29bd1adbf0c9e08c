//! Track command handler: answer a stream of observer positions.
//!
//! Positions arrive one per line on the input. Each line is answered before
//! the next one is read, and nothing carries over between lines.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use nearpost_lib::{Error as LibError, ObserverPosition, Session};

use crate::output::Renderer;

/// Counters for a finished stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackSummary {
    pub answered: usize,
    pub rejected: usize,
    pub unanswerable: usize,
}

/// Handle the track subcommand.
///
/// The index centroid is logged as the map centre before the first position
/// arrives. Blank lines and `#` comments are skipped. Malformed positions are
/// reported on stderr and the loop continues with the next line.
pub fn handle_track<R: BufRead, W: Write>(
    session: &Session,
    renderer: &Renderer,
    input: R,
    out: &mut W,
) -> Result<TrackSummary> {
    let mut summary = TrackSummary::default();
    match session.default_center() {
        Some(center) => info!(%center, "awaiting positions"),
        None => warn!("index is empty; positions will be unanswerable"),
    }

    for (line_no, line) in input.lines().enumerate() {
        let line = line.context("failed to read observer positions")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let observer = match trimmed.parse::<ObserverPosition>() {
            Ok(observer) => observer,
            Err(err) => {
                warn!(line = line_no + 1, error = %err, "skipping malformed position");
                eprintln!("line {}: {}", line_no + 1, err);
                summary.rejected += 1;
                continue;
            }
        };

        match session.nearest(observer) {
            Ok(result) => {
                renderer.render_event(out, observer, Some(&result), None)?;
                summary.answered += 1;
            }
            Err(LibError::NoDataAvailable) => {
                let message = LibError::NoDataAvailable.to_string();
                renderer.render_event(out, observer, None, Some(message))?;
                summary.unanswerable += 1;
            }
            Err(other) => return Err(other.into()),
        }
        out.flush()?;
    }

    debug!(?summary, "position stream ended");
    Ok(summary)
}
