#![allow(dead_code)]

pub mod http;

use std::path::PathBuf;

use nearpost_lib::{AttributeValue, GeoRecord, RawSource, RawTable};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/lines")
}

pub fn table(columns: &[(&str, &[&str])]) -> RawTable {
    let columns = columns
        .iter()
        .map(|(name, values)| (name.to_string(), values.to_vec()));
    RawTable::from_columns(columns)
}

pub fn coords_source(name: &str, lats: &[&str], lons: &[&str], lines: &[&str]) -> RawSource {
    let columns = table(&[("Lat", lats), ("Lon", lons), ("Line", lines)]);
    RawSource::table(name, columns)
}

pub fn line_record(lat: f64, lon: f64, line: &str) -> GeoRecord {
    GeoRecord::new(lat, lon, "inline")
        .with_attribute("Line", AttributeValue::Text(line.to_string()))
}
