//! Sources command handler for listing what an origin offers.

use std::io::Write;

use anyhow::{Context, Result};

use nearpost_lib::{SourceEnumerator, SourceOrigin};

use crate::output::Renderer;

/// Handle the sources subcommand.
pub fn handle_sources<W: Write>(
    origin: &SourceOrigin,
    renderer: &Renderer,
    out: &mut W,
) -> Result<()> {
    let sources = origin
        .list_sources()
        .with_context(|| format!("failed to list sources in {}", origin))?;
    renderer.render_sources(out, &origin.to_string(), &sources)?;
    Ok(())
}
