//! Integration tests for the CLI subcommands.
//!
//! These tests use `assert_cmd` to verify:
//! - inspect output for each event shape (text and JSON)
//! - 404 envelope and exit code for unmatched routes
//! - configuration errors
//! - the routes table

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Temporary directory holding event fixtures for one test.
struct TestEnv {
    temp_dir: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
        }
    }

    /// Write `event` to a JSON file and return its path.
    fn write_event(&self, name: &str, event: &Value) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, serde_json::to_vec_pretty(event).expect("serialize event"))
            .expect("write event");
        path
    }
}

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("catalyst-cli").expect("binary exists");
    for var in [
        "CATALYST_EVENT_SHAPE",
        "CATALYST_ROUTE_PREFIX",
        "CATALYST_EXTENSION_SEPARATOR",
        "CATALYST_BODY_ENCODING",
        "CATALYST_BASE_URL",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn simple_proxy_event(path: &str) -> Value {
    json!({
        "httpMethod": "GET",
        "path": path,
        "headers": {
            "Host": "api.example.com",
            "X-Forwarded-For": "203.0.113.10",
            "Accept": "*/*",
            "key": "abc123"
        },
        "queryStringParameters": {"limit": "213", "collection": "bld-fts-building-1,trn-ntwk-pathlink"},
        "pathParameters": {"proxy": path.trim_start_matches('/')}
    })
}

// ==================== Inspect Tests ====================

#[test]
fn test_inspect_simple_proxy_event_text() {
    let env = TestEnv::new();
    let event = env.write_event(
        "event.json",
        &simple_proxy_event("/catalyst/features/multi-collection/items/limit-col"),
    );

    cli()
        .args(["--shape", "simple-proxy", "--format", "text", "inspect"])
        .arg(&event)
        .assert()
        .success()
        .stdout(predicate::str::contains("method:     GET"))
        .stdout(predicate::str::contains(
            "url:        https://api.example.com/catalyst/features/multi-collection/items/limit-col",
        ))
        .stdout(predicate::str::contains("collection: multi-collection"))
        .stdout(predicate::str::contains("LimitColSchema + items_limit_col"))
        .stdout(predicate::str::contains("key = abc123"))
        .stdout(predicate::str::contains("X-Forwarded-For").not())
        .stdout(predicate::str::contains("proxy =").not());
}

#[test]
fn test_inspect_custom_path_event_json() {
    let env = TestEnv::new();
    let event = env.write_event(
        "event.json",
        &json!({
            "rawPath": "/catalyst/features/lnd-fts-land-1/items",
            "http": {"method": "GET"},
            "requestContext": {"domainName": "example.com"},
            "queryStringParameters": {"crs": "27700"}
        }),
    );

    let output = cli()
        .args(["--format", "json", "inspect"])
        .arg(&event)
        .output()
        .expect("run cli");

    assert!(output.status.success());
    let parsed: Value = serde_json::from_slice(&output.stdout).expect("JSON output");
    assert_eq!(parsed["request"]["method"], "GET");
    assert_eq!(parsed["request"]["route_parameters"]["collection"], "lnd-fts-land-1");
    assert_eq!(parsed["request"]["query_parameters"]["crs"], "27700");
    assert_eq!(parsed["dispatch"]["handler"], "features");
    assert_eq!(parsed["dispatch"]["schema"], "FeaturesBaseSchema");
    assert_eq!(parsed["dispatch"]["query"], "items");
}

#[test]
fn test_inspect_defaults_to_json_document() {
    let env = TestEnv::new();
    let event = env.write_event(
        "event.json",
        &simple_proxy_event("/catalyst/features/bld-fts-building-1/items/limit-geom"),
    );

    let output = cli()
        .args(["--shape", "simple-proxy", "inspect"])
        .arg(&event)
        .output()
        .expect("run cli");

    assert!(output.status.success());
    let parsed: Value = serde_json::from_slice(&output.stdout).expect("JSON output");
    assert_eq!(
        parsed["request"]["url"],
        "https://api.example.com/catalyst/features/bld-fts-building-1/items/limit-geom"
    );
    assert_eq!(parsed["route"]["collection"], "bld-fts-building-1");
    assert_eq!(parsed["dispatch"]["schema"], "LimitGeomSchema");
    assert_eq!(parsed["dispatch"]["query"], "items_limit_geom");
}

#[test]
fn test_inspect_unknown_route_prints_not_found_envelope() {
    let env = TestEnv::new();
    let path = "/catalyst/features/c/items/unknown-ext";
    let event = env.write_event("event.json", &simple_proxy_event(path));

    cli()
        .args(["--shape", "simple-proxy", "inspect"])
        .arg(&event)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("\"statusCode\": 404"))
        .stdout(predicate::str::contains(path));
}

#[test]
fn test_inspect_malformed_event_fails() {
    let env = TestEnv::new();
    let event = env.write_event("event.json", &json!({"path": "/catalyst/features/c/items"}));

    cli()
        .args(["--shape", "simple-proxy", "inspect"])
        .arg(&event)
        .assert()
        .failure()
        .stderr(predicate::str::contains("httpMethod"));
}

#[test]
fn test_inspect_missing_file_fails() {
    cli()
        .args(["inspect", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read event"));
}

// ==================== Configuration Tests ====================

#[test]
fn test_resource_template_requires_base_url() {
    let env = TestEnv::new();
    let event = env.write_event("event.json", &simple_proxy_event("/catalyst/features/c/items"));

    cli()
        .args(["--shape", "resource-template", "inspect"])
        .arg(&event)
        .assert()
        .failure()
        .stderr(predicate::str::contains("base URL"));
}

#[test]
fn test_resource_template_uses_base_url() {
    let env = TestEnv::new();
    let event = env.write_event("event.json", &simple_proxy_event("/catalyst/features/c/items/geom"));

    cli()
        .args([
            "--shape",
            "resource-template",
            "--base-url",
            "https://gw.example.com/prod",
            "--format",
            "text",
            "inspect",
        ])
        .arg(&event)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "url:        https://gw.example.com/prod/catalyst/features/c/items/geom",
        ));
}

// ==================== Routes Tests ====================

#[test]
fn test_routes_lists_fixed_table() {
    cli()
        .args(["--separator", "underscore", "routes"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "catalyst/features/{collection}/items/limit_geom_col",
        ))
        .stdout(predicate::str::contains("LimitGeomColSchema + items_limit_geom_col"))
        .stdout(predicate::str::contains("catalyst/features/latest-collections"));
}

#[test]
fn test_routes_json_has_nine_entries() {
    let output = cli()
        .args(["--format", "json", "--prefix", "base", "routes"])
        .output()
        .expect("run cli");

    assert!(output.status.success());
    let rows: Vec<Value> = serde_json::from_slice(&output.stdout).expect("JSON output");
    assert_eq!(rows.len(), 9);
    assert_eq!(rows[0]["path_template"], "base/{collection}/items");
}

#[test]
fn test_invalid_separator_is_rejected() {
    cli()
        .args(["--separator", "dot", "routes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid gateway configuration"));
}
