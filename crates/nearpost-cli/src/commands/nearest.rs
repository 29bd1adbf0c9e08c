//! Nearest command handler for a one-shot query.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;

use nearpost_lib::{Error as LibError, ObserverPosition, Session};

use crate::commands::EXIT_NO_DATA;
use crate::output::Renderer;

/// Handle the nearest subcommand.
///
/// Prints the closest record to `observer`. An empty index is reported on
/// stderr and maps to [`EXIT_NO_DATA`]; no record is printed in that case.
pub fn handle_nearest<W: Write>(
    session: &Session,
    observer: ObserverPosition,
    renderer: &Renderer,
    out: &mut W,
) -> Result<ExitCode> {
    match session.nearest(observer) {
        Ok(result) => {
            renderer.render_result(out, observer, &result)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(LibError::NoDataAvailable) => {
            writeln!(
                io::stderr(),
                "no data available: no source yielded valid coordinates"
            )?;
            Ok(ExitCode::from(EXIT_NO_DATA))
        }
        Err(other) => Err(other.into()),
    }
}
