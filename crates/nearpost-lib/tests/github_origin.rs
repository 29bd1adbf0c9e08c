//! Remote origins against a local stand-in for the GitHub API.

mod common;

use nearpost_lib::{
    ingest, load_sources, DisplayFields, Error, GitHubOrigin, GitHubReference, SourceEnumerator,
    SourceReader,
};

use common::http::StubServer;

const TRUNK_LISTING_TARGET: &str = "/repos/acme/markers/contents/data?ref=trunk";

fn origin(server: &StubServer, reference: &str) -> GitHubOrigin {
    let reference = GitHubReference::parse(reference).expect("reference parses");
    GitHubOrigin::with_api_base(reference, server.base())
        .expect("client builds")
        .with_raw_base(format!("{}/raw", server.base()))
}

fn listing(entries: &[(&str, &str, Option<String>)]) -> String {
    let entries: Vec<_> = entries
        .iter()
        .map(|(name, kind, url)| {
            serde_json::json!({ "name": name, "type": kind, "download_url": url })
        })
        .collect();
    serde_json::Value::Array(entries).to_string()
}

#[test]
fn default_branch_is_resolved_and_used_for_listing_and_download() {
    let server = StubServer::start();
    server.route("/repos/acme/markers", 200, r#"{"default_branch":"trunk"}"#);
    server.route(
        TRUNK_LISTING_TARGET,
        200,
        listing(&[
            ("a.csv", "file", Some(format!("{}/dl/a.csv", server.base()))),
            ("README.md", "file", Some(format!("{}/dl/README.md", server.base()))),
            ("archive.csv", "dir", None),
        ]),
    );
    server.route("/dl/a.csv", 200, "Lat,Lon,Line,KP\n35.0,139.0,Remote,0.0\n");

    let remote = origin(&server, "github:acme/markers/data");

    assert_eq!(remote.branch().expect("branch resolves"), "trunk");
    assert_eq!(remote.list_sources().expect("listing"), ["a.csv"]);

    let sources = load_sources(&remote, &[]).expect("sources load");
    let ingested = ingest(&sources);
    assert_eq!(ingested.index.len(), 1);
    let record = &ingested.index.records()[0];
    assert_eq!(DisplayFields::default().line(record), "Remote");
    assert_eq!(DisplayFields::default().kilometer_post(record), "0.0");

    assert_eq!(
        server.requests(),
        ["/repos/acme/markers", TRUNK_LISTING_TARGET, "/dl/a.csv"]
    );
}

#[test]
fn explicit_branch_skips_repository_lookup() {
    let server = StubServer::start();
    server.route(
        "/repos/acme/markers/contents?ref=release",
        200,
        listing(&[("top.csv", "file", None)]),
    );

    let remote = origin(&server, "github:acme/markers@release");

    assert_eq!(remote.list_sources().expect("listing"), ["top.csv"]);
    assert_eq!(
        server.requests(),
        ["/repos/acme/markers/contents?ref=release"]
    );
}

#[test]
fn entry_without_download_url_is_fetched_from_raw_base() {
    let server = StubServer::start();
    let body = listing(&[("b.csv", "file", None)]);
    server.route(TRUNK_LISTING_TARGET, 200, body);
    server.route(
        "/raw/acme/markers/trunk/data/b.csv",
        200,
        "Lat,Lon\n34.5,135.5\n",
    );

    let remote = origin(&server, "github:acme/markers/data@trunk");
    let table = remote.read_source("b.csv").expect("raw download");

    assert_eq!(table.row_count(), 1);
    let requests = server.requests();
    assert!(requests.contains(&"/raw/acme/markers/trunk/data/b.csv".to_string()));
}

#[test]
fn failed_download_is_a_per_source_warning() {
    let server = StubServer::start();
    server.route(
        TRUNK_LISTING_TARGET,
        200,
        listing(&[
            ("gone.csv", "file", Some(format!("{}/dl/gone.csv", server.base()))),
            ("ok.csv", "file", Some(format!("{}/dl/ok.csv", server.base()))),
        ]),
    );
    server.route("/dl/ok.csv", 200, "Lat,Lon\n1.0,2.0\n");

    let remote = origin(&server, "github:acme/markers/data@trunk");
    let ingested = ingest(&load_sources(&remote, &[]).expect("listing succeeds"));

    assert_eq!(ingested.index.len(), 1);
    assert_eq!(ingested.warnings.len(), 1);
    assert_eq!(ingested.warnings[0].source_name(), "gone.csv");
}

#[test]
fn missing_listing_path_is_unreachable() {
    let server = StubServer::start();

    let remote = origin(&server, "github:acme/markers/data@trunk");

    let listed = remote.list_sources();
    assert!(matches!(listed, Err(Error::OriginUnreachable { .. })));
}

#[test]
fn missing_repository_is_unreachable() {
    let server = StubServer::start();

    let remote = origin(&server, "github:acme/markers/data");

    assert!(matches!(remote.branch(), Err(Error::OriginUnreachable { .. })));
    assert!(matches!(
        load_sources(&remote, &[]),
        Err(Error::OriginUnreachable { .. })
    ));
}

#[test]
fn file_path_listing_is_an_invalid_origin() {
    let server = StubServer::start();
    server.route(
        TRUNK_LISTING_TARGET,
        200,
        r#"{"name":"data","type":"file","download_url":null}"#,
    );

    let remote = origin(&server, "github:acme/markers/data@trunk");

    assert!(matches!(
        remote.list_sources(),
        Err(Error::InvalidOriginReference { .. })
    ));
}
