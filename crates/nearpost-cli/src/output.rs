//! Output formatting for query results.
//!
//! Text output is meant for people; JSON output emits one document per
//! query (one line per event when tracking) for other programs to consume.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use nearpost_lib::{DisplayFields, IngestionWarning, ObserverPosition, QueryResult};

use crate::terminal::{format_meters, ColorPalette};

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON documents (JSON Lines for `track`).
    Json,
}

/// JSON shape for a single answered (or unanswerable) observer event.
#[derive(Debug, Serialize)]
pub struct QueryOutput<'a> {
    pub observer: ObserverPosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kilometer_post: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<&'a QueryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Renders results and warnings for one invocation.
#[derive(Debug, Clone)]
pub struct Renderer {
    pub format: OutputFormat,
    pub fields: DisplayFields,
    pub palette: ColorPalette,
}

impl Renderer {
    pub fn new(format: OutputFormat, fields: DisplayFields) -> Self {
        Self {
            format,
            fields,
            palette: ColorPalette::detect(),
        }
    }

    /// Render the answer to a one-shot query.
    pub fn render_result<W: Write>(
        &self,
        out: &mut W,
        observer: ObserverPosition,
        result: &QueryResult,
    ) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                let p = &self.palette;
                writeln!(
                    out,
                    "Nearest point {}(source: {}){}",
                    p.gray, result.record.source, p.reset
                )?;
                writeln!(
                    out,
                    "  {}Line:{}       {}{}{}",
                    p.gray,
                    p.reset,
                    p.white_bold,
                    self.fields.line(&result.record),
                    p.reset
                )?;
                writeln!(
                    out,
                    "  {}Distance:{}   {}{}{}",
                    p.gray,
                    p.reset,
                    p.cyan,
                    self.fields.kilometer_post(&result.record),
                    p.reset
                )?;
                writeln!(
                    out,
                    "  {}From you:{}   {}{}{}",
                    p.gray,
                    p.reset,
                    p.green,
                    format_meters(result.distance_meters),
                    p.reset
                )?;
                writeln!(
                    out,
                    "  {}Position:{}   {:.6},{:.6}",
                    p.gray, p.reset, result.record.latitude, result.record.longitude
                )
            }
            OutputFormat::Json => self.write_json(out, &self.query_output(observer, Some(result))),
        }
    }

    /// Render one event of a position stream as a single line.
    pub fn render_event<W: Write>(
        &self,
        out: &mut W,
        observer: ObserverPosition,
        result: Option<&QueryResult>,
        error: Option<String>,
    ) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => match (result, error) {
                (Some(result), _) => writeln!(
                    out,
                    "{} -> {} {} ({}) [{}]",
                    observer,
                    self.fields.line(&result.record),
                    self.fields.kilometer_post(&result.record),
                    format_meters(result.distance_meters),
                    result.record.source
                ),
                (None, error) => writeln!(
                    out,
                    "{} -> {}",
                    observer,
                    error.unwrap_or_else(|| "no result".to_string())
                ),
            },
            OutputFormat::Json => {
                let mut output = self.query_output(observer, result);
                output.error = error;
                self.write_json(out, &output)
            }
        }
    }

    /// Render the list of sources an origin offers.
    pub fn render_sources<W: Write>(
        &self,
        out: &mut W,
        origin: &str,
        sources: &[String],
    ) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                if sources.is_empty() {
                    return writeln!(out, "No sources found in {}", origin);
                }
                writeln!(out, "Sources in {}:", origin)?;
                for name in sources {
                    writeln!(out, "- {}", name)?;
                }
                Ok(())
            }
            OutputFormat::Json => {
                #[derive(Serialize)]
                struct SourcesOutput<'a> {
                    origin: &'a str,
                    sources: &'a [String],
                }
                self.write_json(out, &SourcesOutput { origin, sources })
            }
        }
    }

    /// Report ingestion warnings; always plain text on the given stream.
    pub fn render_warnings<W: Write>(
        &self,
        out: &mut W,
        warnings: &[IngestionWarning],
    ) -> io::Result<()> {
        for warning in warnings {
            writeln!(
                out,
                "{}warning:{} {}",
                self.palette.yellow, self.palette.reset, warning
            )?;
        }
        Ok(())
    }

    fn query_output<'a>(
        &self,
        observer: ObserverPosition,
        result: Option<&'a QueryResult>,
    ) -> QueryOutput<'a> {
        QueryOutput {
            observer,
            line: result.map(|r| self.fields.line(&r.record)),
            kilometer_post: result.map(|r| self.fields.kilometer_post(&r.record)),
            result,
            error: None,
        }
    }

    fn write_json<W: Write, T: Serialize>(&self, out: &mut W, value: &T) -> io::Result<()> {
        serde_json::to_writer(&mut *out, value)?;
        writeln!(out)
    }
}
