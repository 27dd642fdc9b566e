// End-to-end tests for `tabrecon run` / `tabrecon validate`.
// Run with: cargo test -p tabrecon-cli --test run_tests

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use rusqlite::Connection;
use tempfile::{tempdir, TempDir};

fn tabrecon() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tabrecon"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run(args: &[&str]) -> Output {
    tabrecon().args(args).output().expect("failed to spawn tabrecon")
}

fn stdout_json(out: &Output) -> serde_json::Value {
    serde_json::from_slice(&out.stdout).expect("stdout is JSON")
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

/// Alice/Bob/Carl fixture: Bob's balance differs, Carl only in target,
/// Dave only in source.
fn people_fixture() -> TempDir {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "crm.csv",
        "id,cust_name,balance\n1,Alice,100\n2,Bob,200\n4,Dave,50\n",
    );
    write(
        dir.path(),
        "warehouse.csv",
        "id,name,balance\n1,Alice,100\n2,Bob,250\n3,Carl,300\n",
    );
    dir
}

const PEOPLE_PAIR: &str = r#"
[[pairs]]
keys = ["id"]
column_map = { cust_name = "name" }
[pairs.source]
name = "crm"
type = "file"
path = "crm.csv"
[pairs.target]
name = "warehouse"
type = "file"
path = "warehouse.csv"
"#;

#[test]
fn discrepancies_exit_1_with_reports() {
    let dir = people_fixture();
    write(dir.path(), "recon.toml", PEOPLE_PAIR);
    let config = dir.path().join("recon.toml");

    let out = run(&["run", config.to_str().unwrap(), "--json"]);
    assert_eq!(out.status.code(), Some(1), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let json = stdout_json(&out);
    let pair = &json["pairs"][0];
    assert_eq!(pair["name"], "crm_vs_warehouse");
    assert_eq!(pair["status"], "discrepancies");
    assert_eq!(pair["counts"]["matched_rows"], 2);
    assert_eq!(pair["counts"]["mismatched_rows"], 1);
    assert_eq!(pair["counts"]["source_only_rows"], 1);
    assert_eq!(pair["counts"]["target_only_rows"], 1);

    let html = pair["reports"]["html"].as_str().unwrap();
    let xlsx = pair["reports"]["xlsx"].as_str().unwrap();
    assert!(Path::new(html).is_file());
    assert!(Path::new(xlsx).is_file());
    assert!(html.contains("recon_reports"));
    assert!(Path::new(html)
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("recon_report_crm_warehouse_"));
}

#[test]
fn clean_pair_exits_0() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.csv", "id,v\n1,x\n2,y\n");
    write(dir.path(), "b.csv", "id,v\n2,y\n1,x\n");
    write(
        dir.path(),
        "recon.toml",
        r#"
[[pairs]]
keys = ["id"]
[pairs.source]
name = "a"
type = "file"
path = "a.csv"
[pairs.target]
name = "b"
type = "file"
path = "b.csv"
"#,
    );
    let out_dir = dir.path().join("custom_out");

    let out = run(&[
        "run",
        dir.path().join("recon.toml").to_str().unwrap(),
        "--output-dir",
        out_dir.to_str().unwrap(),
    ]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 2);
    assert!(String::from_utf8_lossy(&out.stderr).contains("1 clean"));
}

#[test]
fn failed_pair_does_not_stop_others() {
    let dir = people_fixture();
    let config = format!(
        r#"
[[pairs]]
name = "broken"
keys = ["id"]
[pairs.source]
name = "missing"
type = "file"
path = "does_not_exist.csv"
[pairs.target]
name = "warehouse"
type = "file"
path = "warehouse.csv"
{PEOPLE_PAIR}"#
    );
    write(dir.path(), "recon.toml", &config);
    let path = dir.path().join("recon.toml");

    let out = run(&["run", path.to_str().unwrap(), "--json"]);
    assert_eq!(out.status.code(), Some(4));
    let json = stdout_json(&out);
    assert_eq!(json["pairs"][0]["status"], "failed");
    assert!(json["pairs"][0]["error"].as_str().unwrap().contains("does_not_exist.csv"));
    assert_eq!(json["pairs"][1]["status"], "discrepancies");

    let out = run(&["run", path.to_str().unwrap(), "--json", "--fail-fast"]);
    assert_eq!(out.status.code(), Some(4));
    assert_eq!(stdout_json(&out)["pairs"].as_array().unwrap().len(), 1);
}

#[test]
fn unsupported_backend_is_a_failed_pair() {
    let dir = people_fixture();
    write(dir.path(), "q.sql", "SELECT 1");
    write(
        dir.path(),
        "recon.toml",
        r#"
[[pairs]]
keys = ["id"]
[pairs.source]
name = "crm"
type = "file"
path = "crm.csv"
[pairs.target]
name = "ora"
type = "database"
kind = "oracle"
database = "ORCL"
host = "db.example"
query_file = "q.sql"
"#,
    );

    let out = run(&["run", dir.path().join("recon.toml").to_str().unwrap(), "--json"]);
    assert_eq!(out.status.code(), Some(4));
    let err = stdout_json(&out)["pairs"][0]["error"].as_str().unwrap().to_string();
    assert!(err.contains("oracle"), "{err}");
}

#[test]
fn sqlite_target_with_mapping_file() {
    let dir = people_fixture();
    let conn = Connection::open(dir.path().join("wh.db")).unwrap();
    conn.execute_batch(
        "CREATE TABLE customers (id INTEGER, name TEXT, balance REAL);
         INSERT INTO customers VALUES (1, 'Alice', 100.0);
         INSERT INTO customers VALUES (2, 'Bob', 200.4);
         INSERT INTO customers VALUES (4, 'Dave', 50);",
    )
    .unwrap();
    drop(conn);
    write(dir.path(), "customers.sql", "SELECT id, name, balance FROM customers");
    write(dir.path(), "map.csv", "source,target\ncust_name,name\n");
    write(
        dir.path(),
        "recon.toml",
        r#"
output_dir = "reports"

[[pairs]]
keys = ["id"]
mapping_file = "map.csv"
[pairs.tolerance]
absolute = 0.5
[pairs.source]
name = "crm"
type = "file"
path = "crm.csv"
[pairs.target]
name = "wh"
type = "database"
kind = "sqlite"
database = "wh.db"
query_file = "customers.sql"
"#,
    );

    let out = run(&["run", dir.path().join("recon.toml").to_str().unwrap(), "--json"]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let json = stdout_json(&out);
    assert_eq!(json["pairs"][0]["status"], "clean");
    assert_eq!(json["pairs"][0]["counts"]["matched_rows"], 3);
    assert!(dir.path().join("reports").is_dir());
}

#[test]
fn invalid_config_exits_3() {
    let dir = tempdir().unwrap();
    write(dir.path(), "bad.toml", "[[pairs]]\nkeys = []\n");
    let out = run(&["validate", dir.path().join("bad.toml").to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(3));

    write(dir.path(), "broken.toml", "[[pairs]\n");
    let out = run(&["run", dir.path().join("broken.toml").to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn usage_errors_exit_2() {
    let out = run(&["run", "/definitely/not/here/recon.toml"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("config file not found"));

    let out = run(&["frobnicate"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn validate_ok() {
    let dir = people_fixture();
    write(dir.path(), "recon.toml", PEOPLE_PAIR);
    let out = run(&["validate", dir.path().join("recon.toml").to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stderr).contains("config OK: 1 pair(s)"));
}
