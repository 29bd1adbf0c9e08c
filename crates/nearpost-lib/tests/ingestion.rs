mod common;

use std::fs;

use nearpost_lib::{
    ingest, load_sources, DisplayFields, IngestionWarning, LocalDirectory, RawSource,
    SourceEnumerator,
};
use tempfile::tempdir;

use common::{coords_source, fixtures_dir, table};

#[test]
fn valid_rows_survive_and_coordinate_less_source_warns() {
    let sources = vec![
        coords_source(
            "markers.csv",
            &["35.0", "35.1", "not_a_number", "35.2"],
            &["139.0", "139.1", "139.15", "139.2"],
            &["A", "B", "X", "C"],
        ),
        RawSource::table("notes.csv", table(&[("Memo", &["first", "second"])])),
    ];

    let ingested = ingest(&sources);

    assert_eq!(ingested.index.len(), 3);
    assert_eq!(ingested.warnings.len(), 1);
    assert!(matches!(
        &ingested.warnings[0],
        IngestionWarning::MissingCoordinateColumns { source_name } if source_name == "notes.csv"
    ));
}

#[test]
fn out_of_domain_rows_are_dropped_silently() {
    let sources = vec![coords_source(
        "edge.csv",
        &["90", "-90", "200", "45", "45"],
        &["180", "-180", "0", "180.5", "-0"],
        &["north", "south", "bad-lat", "bad-lon", "zero"],
    )];

    let ingested = ingest(&sources);

    let lines: Vec<_> = ingested
        .index
        .records()
        .iter()
        .map(|r| r.attribute_or("Line", "?"))
        .collect();
    assert_eq!(lines, ["north", "south", "zero"]);
    assert!(ingested.warnings.is_empty());
    assert_eq!(ingested.report.rows_dropped, 2);
}

#[test]
fn numeric_looking_attributes_pass_through_verbatim() {
    let sources = vec![RawSource::table(
        "ids.csv",
        table(&[
            ("Lat", &["35.0", "35.1"]),
            ("Lon", &["139.0", "139.1"]),
            ("Line", &["007", "1e3"]),
            ("Distance", &["0.0", "12.50"]),
        ]),
    )];

    let ingested = ingest(&sources);
    let fields = DisplayFields::default();
    let shown: Vec<_> = ingested
        .index
        .records()
        .iter()
        .map(|r| (fields.line(r), fields.kilometer_post(r)))
        .collect();

    assert_eq!(
        shown,
        [
            ("007".to_string(), "0.0".to_string()),
            ("1e3".to_string(), "12.50".to_string()),
        ]
    );
    let json = serde_json::to_value(&ingested.index.records()[0]).expect("record serializes");
    assert_eq!(json["attributes"]["Line"], "007");
    assert_eq!(json["attributes"]["Distance"], "0.0");
}

#[test]
fn fixture_directory_ingests_in_listing_order() {
    let origin = LocalDirectory::new(fixtures_dir());
    assert_eq!(
        origin.list_sources().expect("fixtures listed"),
        ["chuo.csv", "stations_meta.csv", "tokaido.csv"]
    );

    let sources = load_sources(&origin, &[]).expect("fixtures load");
    let ingested = ingest(&sources);

    assert_eq!(ingested.index.len(), 7);
    assert_eq!(ingested.index.sources(), ["chuo.csv", "tokaido.csv"]);
    assert_eq!(
        ingested.warnings,
        vec![IngestionWarning::MissingCoordinateColumns {
            source_name: "stations_meta.csv".to_string(),
        }]
    );

    let first = &ingested.index.records()[0];
    assert_eq!(first.source, "chuo.csv");
    assert_eq!(first.attribute_or("Line", "N/A"), "Chuo");
    assert_eq!(first.attribute_or("KP", "N/A"), "1.3");
}

#[test]
fn selection_limits_the_batch() {
    let origin = LocalDirectory::new(fixtures_dir());
    let sources = load_sources(&origin, &["tokaido.csv".to_string()]).expect("selection loads");

    assert_eq!(sources.len(), 1);
    let ingested = ingest(&sources);
    assert_eq!(ingested.index.len(), 4);
    assert!(ingested.warnings.is_empty());
}

#[test]
fn malformed_file_is_reported_and_others_still_load() {
    let dir = tempdir().expect("create temp dir");
    fs::write(dir.path().join("a_good.csv"), "Lat,Lon\n35.0,139.0\n").expect("write good");
    fs::write(dir.path().join("b_bad.csv"), b"Lat,Lon\n35.0,\xff\xfe\n").expect("write bad");

    let origin = LocalDirectory::new(dir.path());
    let sources = load_sources(&origin, &[]).expect("directory lists");
    let ingested = ingest(&sources);

    assert_eq!(ingested.index.len(), 1);
    assert!(matches!(
        &ingested.warnings[..],
        [IngestionWarning::SourceUnreadable { source_name, .. }] if source_name == "b_bad.csv"
    ));
}

#[test]
fn all_sources_invalid_yields_empty_index() {
    let sources = vec![
        coords_source("bad.csv", &["x", "999"], &["y", "0"], &["A", "B"]),
        RawSource::unreadable("gone.csv", "connection reset"),
    ];

    let ingested = ingest(&sources);

    assert!(ingested.index.is_empty());
    assert_eq!(ingested.warnings.len(), 1);
}
