use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use nearpost_cli::commands::{load_session, nearest, resolve_origin, sources, track};
use nearpost_cli::output::{OutputFormat, Renderer};
use nearpost_lib::{DisplayFields, IngestConfig, ObserverPosition};

#[derive(Parser, Debug)]
#[command(author, version, about = "Find the nearest marker in CSV coordinate tables")]
struct Cli {
    /// Local directory containing CSV sources.
    #[arg(long, conflicts_with = "origin")]
    data_dir: Option<PathBuf>,

    /// Source origin: a directory, `github:owner/repo[/path][@branch]`, or a github.com URL.
    #[arg(long)]
    origin: Option<String>,

    /// Source to load (repeatable). Defaults to every source the origin lists.
    #[arg(long = "source", value_name = "NAME")]
    sources: Vec<String>,

    /// Additional latitude column name (repeatable); `Lat` is always recognised.
    #[arg(long = "lat-column", value_name = "NAME")]
    lat_columns: Vec<String>,

    /// Additional longitude column name (repeatable); `Lon` is always recognised.
    #[arg(long = "lon-column", value_name = "NAME")]
    lon_columns: Vec<String>,

    /// Kilometre-post column aliases, tried in order (default: Distance, KP).
    #[arg(long = "kp-column", value_name = "NAME")]
    kp_columns: Vec<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the sources available in the origin.
    Sources,
    /// Find the record nearest to a single position.
    Nearest {
        /// Observer latitude in degrees.
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Observer longitude in degrees.
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Read `lat,lon` positions from stdin and answer each one as it arrives.
    Track,
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let origin = resolve_origin(cli.data_dir.as_deref(), cli.origin.as_deref())?;
    let renderer = Renderer::new(cli.format, display_fields(&cli.kp_columns));
    let config = IngestConfig::default().with_aliases(cli.lat_columns, cli.lon_columns);
    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::Sources => {
            sources::handle_sources(&origin, &renderer, &mut stdout)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Nearest { lat, lon } => {
            let observer = ObserverPosition::checked(lat, lon)
                .context("observer position is outside the valid coordinate domain")?;
            let session = load_session(&origin, &cli.sources, config, &renderer)?;
            nearest::handle_nearest(&session, observer, &renderer, &mut stdout)
        }
        Command::Track => {
            let session = load_session(&origin, &cli.sources, config, &renderer)?;
            track::handle_track(&session, &renderer, io::stdin().lock(), &mut stdout)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn display_fields(kp_columns: &[String]) -> DisplayFields {
    let mut fields = DisplayFields::default();
    if !kp_columns.is_empty() {
        fields.kilometer_post_aliases = kp_columns.to_vec();
    }
    fields
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
