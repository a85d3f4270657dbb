mod common;

use common::{bare_cmd, FixtureServer, Route};
use predicates::prelude::*;
use predicates::str::{contains, starts_with};
use serde_json::json;
use std::time::Duration;

#[test]
fn healthy_instance_reports_ok() {
    let server = FixtureServer::start();
    server.healthy_rdm();
    server
        .cmd()
        .assert()
        .code(0)
        .stdout("OK: records, metadata schemas and files are accessible.\n");
}

#[test]
fn schema_failure_is_critical() {
    let server = FixtureServer::start();
    server
        .healthy_rdm()
        .route("/schemas/records/record-v6.0.0.json", Route::status(500));
    server
        .cmd()
        .assert()
        .code(2)
        .stdout(starts_with("CRITICAL: schema: HTTP 500"));
}

#[test]
fn missing_file_is_critical() {
    let server = FixtureServer::start();
    server
        .healthy_rdm()
        .route("/api/records/abc-123/files/data.csv/content", Route::status(404));
    server
        .cmd()
        .assert()
        .code(2)
        .stdout(starts_with("CRITICAL: files: HTTP 404"));
}

#[test]
fn strict_metadata_rejects_vocabulary_enrichment() {
    let server = FixtureServer::start();
    server.healthy_rdm();
    server
        .cmd()
        .arg("--strict-metadata")
        .assert()
        .code(2)
        .stdout(starts_with("CRITICAL: validation:"));
}

#[test]
fn debug_metadata_lists_ignored_keys_on_stderr() {
    let server = FixtureServer::start();
    server.healthy_rdm();
    server
        .cmd()
        .args(["--debug-metadata", "--metadata-report"])
        .assert()
        .code(0)
        .stderr(contains("/resource_type/icon"))
        .stderr(contains("vocabulary-like keys: 2 found, 2 ignored, 0 flagged"))
        .stdout(starts_with("OK:"));
}

#[test]
fn empty_instance_is_ok_unless_escalated() {
    let server = FixtureServer::start();
    server.route(
        "/api/records?sort=newest&size=10",
        Route::json(json!({"hits": {"total": 0, "hits": []}})),
    );
    server.cmd().assert().code(0).stdout(starts_with("OK:"));
    server
        .cmd()
        .arg("--error-if-no-records-present")
        .assert()
        .code(2)
        .stdout(contains("no records stored"));
}

#[test]
fn slow_search_times_out_as_critical() {
    let server = FixtureServer::start();
    server.route(
        "/api/records?sort=newest&size=10",
        Route::json(json!({"hits": {"total": 0, "hits": []}})).slow(Duration::from_secs(3)),
    );
    bare_cmd()
        .args(["-u", server.base.as_str(), "-t", "1"])
        .assert()
        .code(2)
        .stdout(starts_with("CRITICAL: search:").and(contains("timed out")));
}

fn schema_with_remote_title(server: &FixtureServer) -> Route {
    Route::json(json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {
            "metadata": {
                "type": "object",
                "required": ["title"],
                "properties": {
                    "title": {"$ref": server.url("/schemas/definitions.json#/title")},
                    "resource_type": {"type": "object", "properties": {"id": {"type": "string"}}}
                }
            }
        }
    }))
}

#[test]
fn remote_schema_reference_is_resolved() {
    let server = FixtureServer::start();
    server
        .healthy_rdm()
        .route(
            "/schemas/records/record-v6.0.0.json",
            schema_with_remote_title(&server),
        )
        .route(
            "/schemas/definitions.json",
            Route::json(json!({"title": {"type": "string", "minLength": 1}})),
        );
    server
        .cmd()
        .assert()
        .code(0)
        .stdout(starts_with("OK: records, metadata schemas and files"));
}

#[test]
fn slow_remote_schema_reference_respects_timeout() {
    let server = FixtureServer::start();
    server
        .healthy_rdm()
        .route(
            "/schemas/records/record-v6.0.0.json",
            schema_with_remote_title(&server),
        )
        .route(
            "/schemas/definitions.json",
            Route::json(json!({"title": {"type": "string"}})).slow(Duration::from_secs(4)),
        );
    let started = std::time::Instant::now();
    bare_cmd()
        .args(["-u", server.base.as_str(), "-t", "1"])
        .assert()
        .code(2)
        .stdout(starts_with("CRITICAL: schema:").and(contains("timed out")));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn verbose_trace_goes_to_stderr() {
    let server = FixtureServer::start();
    server.healthy_rdm();
    let out = server
        .cmd()
        .arg("-vv")
        .assert()
        .code(0)
        .stderr(contains("Making a search."))
        .stderr(contains("Making a HTTP GET request to"))
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
}

#[test]
fn unreachable_host_is_critical() {
    bare_cmd()
        .args(["-u", "http://127.0.0.1:9", "-t", "2"])
        .assert()
        .code(2)
        .stdout(starts_with("CRITICAL: search:"));
}

#[test]
fn invalid_url_is_unknown() {
    bare_cmd()
        .args(["-u", "not a url"])
        .assert()
        .code(3)
        .stdout(starts_with("UNKNOWN: Invalid URL syntax"));
}

#[test]
fn missing_url_is_unknown() {
    bare_cmd().assert().code(3).stdout(starts_with("UNKNOWN:"));
}

#[test]
fn help_exits_zero() {
    bare_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--strict-metadata"));
}
