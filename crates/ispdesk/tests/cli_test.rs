//! Integration tests for the `ispdesk` CLI binary.
//!
//! Offline tests cover argument parsing, help, completions, config and
//! the commands that need no backend. Roster tests run the binary against
//! a wiremock back office.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `ispdesk` binary with env isolation.
///
/// Clears every `ISPDESK_*` variable and points the config file into
/// `dir`, so tests never touch the user's real configuration.
fn ispdesk_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ispdesk");
    cmd.env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir)
        .env("ISPDESK_CONFIG", dir.join("config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("ISPDESK_PROFILE")
        .env_remove("ISPDESK_URL")
        .env_remove("ISPDESK_TOKEN")
        .env_remove("ISPDESK_OUTPUT")
        .env_remove("ISPDESK_INSECURE")
        .env_remove("ISPDESK_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = ispdesk_cmd(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let dir = tempfile::tempdir().unwrap();
    ispdesk_cmd(dir.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("clients")
            .and(predicate::str::contains("dashboard"))
            .and(predicate::str::contains("vouchers")),
    );
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    ispdesk_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ispdesk"));
}

#[test]
fn test_clients_subcommands_exist() {
    let dir = tempfile::tempdir().unwrap();
    ispdesk_cmd(dir.path())
        .args(["clients", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("get"))
                .and(predicate::str::contains("export"))
                .and(predicate::str::contains("bulk"))
                .and(predicate::str::contains("add")),
        );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let dir = tempfile::tempdir().unwrap();
    ispdesk_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    let dir = tempfile::tempdir().unwrap();
    ispdesk_cmd(dir.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let dir = tempfile::tempdir().unwrap();
    let output = ispdesk_cmd(dir.path()).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_clients_list_without_config() {
    let dir = tempfile::tempdir().unwrap();
    ispdesk_cmd(dir.path())
        .args(["clients", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ispdesk config init"));
}

#[test]
fn test_invalid_filter_value() {
    let dir = tempfile::tempdir().unwrap();
    let output = ispdesk_cmd(dir.path())
        .args(["clients", "list", "--zone", "atlantis"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("possible values"));
}

#[test]
fn test_apply_plan_requires_target_plan() {
    let dir = tempfile::tempdir().unwrap();
    ispdesk_cmd(dir.path())
        .args(["clients", "bulk", "apply-plan", "--ids", "c1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--to-plan"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honors_env() {
    let dir = tempfile::tempdir().unwrap();
    let expected = dir.path().join("config.toml");
    ispdesk_cmd(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn test_config_show_no_config() {
    let dir = tempfile::tempdir().unwrap();
    ispdesk_cmd(dir.path()).args(["config", "show"]).assert().success();
}

#[test]
fn test_config_set_then_show() {
    let dir = tempfile::tempdir().unwrap();
    ispdesk_cmd(dir.path())
        .args(["config", "set", "url", "https://panel.example.net/api"])
        .assert()
        .success();
    ispdesk_cmd(dir.path())
        .args(["config", "set", "token", "s3cret"])
        .assert()
        .success();

    let output = ispdesk_cmd(dir.path())
        .args(["-o", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let cfg: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        cfg["profiles"]["default"]["url"],
        "https://panel.example.net/api"
    );
    assert_eq!(cfg["profiles"]["default"]["token"], "********");

    ispdesk_cmd(dir.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default *"));
}

#[test]
fn test_config_set_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    ispdesk_cmd(dir.path())
        .args(["config", "set", "colour", "blue"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown config key"));
}

#[test]
fn test_config_defaults_pick_output_format() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[defaults]\noutput = \"plain\"\n",
    )
    .unwrap();
    ispdesk_cmd(dir.path())
        .args(["nav", "view=finance"])
        .assert()
        .success()
        .stdout("view=finance&tab=list&portal=usage&queue=open\n");
}

// ── Offline commands ────────────────────────────────────────────────

#[test]
fn test_nav_resolves_query() {
    let dir = tempfile::tempdir().unwrap();
    let output = ispdesk_cmd(dir.path())
        .args(["-o", "json", "nav", "?view=clients&tab=bulk&view=finance&queue=bogus"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let nav: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        nav,
        json!({ "view": "clients", "tab": "bulk", "portal": "usage", "queue": "open" })
    );
}

#[test]
fn test_vouchers_generate_plain() {
    let dir = tempfile::tempdir().unwrap();
    let output = ispdesk_cmd(dir.path())
        .args(["-o", "plain", "vouchers", "generate", "-n", "5", "--prefix", "wifi"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let codes: Vec<&str> = stdout.lines().collect();
    assert_eq!(codes.len(), 5);
    for code in codes {
        assert!(code.starts_with("WIFI"), "unexpected code {code}");
    }
}

#[test]
fn test_vouchers_generate_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("batch.csv");
    ispdesk_cmd(dir.path())
        .args(["vouchers", "generate", "-n", "3", "--minutes", "120", "-f"])
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("3 voucher(s) written"));

    let csv = std::fs::read_to_string(&file).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], r#""Code","Profile","Minutes""#);
    assert!(lines[1].ends_with(r#","default","120""#));
}

#[test]
fn test_vouchers_count_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    ispdesk_cmd(dir.path())
        .args(["vouchers", "generate", "-n", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("between 1 and 1000"));
}

// ── Against a mock back office ──────────────────────────────────────

fn user(role: &str) -> Value {
    json!({
        "id": "u-1",
        "name": "Carla Rojas",
        "role": role,
        "tenant": { "id": "t-1", "name": "Fibra Andina", "slug": "fibra-andina" }
    })
}

async fn mock_backend(role: &str) -> MockServer {
    let server = MockServer::start().await;
    let gets = [
        ("/api/auth/me", user(role)),
        (
            "/api/connections",
            json!({ "data": [
                { "id": "c1", "ip": "10.0.0.2", "mac": "aa:bb:cc:dd:ee:01", "status": "active" },
                { "id": "c2", "ip": "10.0.0.3", "mac": "aa:bb:cc:dd:ee:02", "status": "idle" }
            ]}),
        ),
        (
            "/api/clients",
            json!([
                { "connectionId": "c1", "name": "Ana Torres", "plan": "40 Mbps",
                  "zone": "norte", "debt": 25.5, "tickets": 1 }
            ]),
        ),
    ];
    for (route, body) in gets {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
    }
    server
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(dir: &Path, server: &MockServer, args: &[&str]) -> std::process::Output {
    let mut cmd = ispdesk_cmd(dir);
    cmd.args(["--url", &format!("{}/api", server.uri()), "--token", "test-token"])
        .args(args);
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_clients_list_json() {
    let dir = tempfile::tempdir().unwrap();
    let server = mock_backend("company_admin").await;

    let output = run(dir.path(), &server, &["-o", "json", "clients", "list"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let rows: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows.len(), 2);
    let ana = rows.iter().find(|r| r["id"] == "c1").unwrap();
    assert_eq!(ana["name"], "Ana Torres");
    assert_eq!(ana["code"], "CL-0001");
    assert_eq!(ana["risk"], "medium");
    let synthetic = rows.iter().find(|r| r["id"] == "c2").unwrap();
    assert_eq!(synthetic["synthetic"], true);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_clients_list_filters_by_segment() {
    let dir = tempfile::tempdir().unwrap();
    let server = mock_backend("company_admin").await;

    let output = run(
        dir.path(),
        &server,
        &["-o", "plain", "clients", "list", "--segment", "delinquent", "--search", "torres"],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "c1\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_clients_get_unknown_code() {
    let dir = tempfile::tempdir().unwrap();
    let server = mock_backend("company_admin").await;

    let output = run(dir.path(), &server, &["clients", "get", "CL-9999"]).await;
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("CL-9999"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bulk_suspend_posts_status() {
    let dir = tempfile::tempdir().unwrap();
    let server = mock_backend("company_admin").await;
    Mock::given(method("POST"))
        .and(path("/api/connections/c1/status"))
        .and(body_json(json!({ "status": "offline" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(
        dir.path(),
        &server,
        &["-y", "-o", "json", "clients", "bulk", "suspend", "--ids", "CL-0001"],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["action"], "suspend");
    assert_eq!(report["ids"], json!(["c1"]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bulk_without_yes_needs_terminal() {
    let dir = tempfile::tempdir().unwrap();
    let server = mock_backend("company_admin").await;

    let output = run(dir.path(), &server, &["clients", "bulk", "reminder"]).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_technician_cannot_run_bulk() {
    let dir = tempfile::tempdir().unwrap();
    let server = mock_backend("technician").await;

    let output = run(dir.path(), &server, &["-y", "clients", "bulk", "reminder"]).await;
    assert_eq!(output.status.code(), Some(5), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_export_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let server = mock_backend("company_admin").await;
    let file = dir.path().join("out.csv");

    let output = run(
        dir.path(),
        &server,
        &[
            "clients",
            "export",
            "--columns",
            "code,name,debt",
            "--ids",
            "c1",
            "-f",
            file.to_str().unwrap(),
        ],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let csv = std::fs::read_to_string(&file).unwrap();
    assert_eq!(csv, "\"Code\",\"Name\",\"Debt\"\n\"CL-0001\",\"Ana Torres\",\"25.50\"");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dashboard_plain() {
    let dir = tempfile::tempdir().unwrap();
    let server = mock_backend("company_admin").await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalClients": 2, "activeConnections": 1, "monthlyRevenue": 120.0,
            "pendingDebt": 25.5, "openTickets": 1
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/portal/overview"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let output = run(dir.path(), &server, &["-o", "plain", "dashboard"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("total_clients=2"));
    assert!(stdout.contains("pending_debt=25.50"));
    assert!(stdout.contains("pending_invoices=-"));
}
