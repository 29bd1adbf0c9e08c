use std::io::Cursor;

use nearpost_cli::commands::track::{handle_track, TrackSummary};
use nearpost_cli::output::{OutputFormat, Renderer};
use nearpost_cli::terminal::ColorPalette;
use nearpost_lib::{DisplayFields, IngestConfig, RawSource, RawTable, Session};

fn renderer(format: OutputFormat) -> Renderer {
    Renderer {
        format,
        fields: DisplayFields::default(),
        palette: ColorPalette::plain(),
    }
}

fn session() -> Session {
    let table = RawTable::from_columns([
        ("Lat", vec!["35.0", "35.01"]),
        ("Lon", vec!["139.0", "139.01"]),
        ("Line", vec!["A", "B"]),
    ]);
    let sources = [RawSource::table("inline.csv", table)];
    let (session, _) = Session::from_sources(&sources, IngestConfig::default());
    session
}

#[test]
fn stream_results_follow_the_observer() {
    let input = Cursor::new("# start\n35.0,139.0\n35.01,139.01\n");
    let mut out = Vec::new();

    let summary = handle_track(&session(), &renderer(OutputFormat::Json), input, &mut out)
        .expect("stream handled");

    assert_eq!(
        summary,
        TrackSummary {
            answered: 2,
            rejected: 0,
            unanswerable: 0,
        }
    );
    let lines: Vec<serde_json::Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines[0]["line"], "A");
    assert_eq!(lines[1]["line"], "B");
}

#[test]
fn malformed_lines_do_not_stop_the_stream() {
    let input = Cursor::new("35.0\n95,0\n35.0,139.0\n");
    let mut out = Vec::new();

    let summary = handle_track(&session(), &renderer(OutputFormat::Text), input, &mut out)
        .expect("stream handled");

    assert_eq!(summary.answered, 1);
    assert_eq!(summary.rejected, 2);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("-> A N/A (0.0 m) [inline.csv]"));
}

#[test]
fn empty_session_reports_each_event_as_unanswerable() {
    let input = Cursor::new("35.0,139.0\n36.0,140.0\n");
    let mut out = Vec::new();

    let session = Session::new();
    let summary = handle_track(&session, &renderer(OutputFormat::Text), input, &mut out)
        .expect("stream handled");

    assert_eq!(summary.unanswerable, 2);
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("no data available").count(), 2);
}

#[test]
fn silent_stream_is_idle() {
    let input = Cursor::new("");
    let mut out = Vec::new();
    let summary = handle_track(&session(), &renderer(OutputFormat::Text), input, &mut out)
        .expect("stream handled");

    assert_eq!(summary, TrackSummary::default());
    assert!(out.is_empty());
}
