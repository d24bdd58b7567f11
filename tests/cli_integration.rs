//! CLI integration tests for taskgraph
//!
//! These tests write plan files to a temporary directory and check each
//! command's text and JSON output.

use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const PLAN: &str = r#"
[[tasks]]
key = "db"
title = "Setup Database"
assignee = "John"
priority = "high"
deadline = "2024-04-01"
status = "done"
points = 3

[[tasks]]
key = "api"
title = "Create API"
assignee = "Alice"
priority = "medium"
deadline = "2024-04-15"
depends_on = ["db"]
points = 5

[[tasks]]
key = "ui"
title = "Build UI"
priority = "high"
deadline = "2024-05-01T12:00"
depends_on = ["api"]

[[tasks]]
key = "docs"
title = "Write docs"
priority = "low"
deadline = "2024-05-10"
status = "blocked"
"#;

/// Get a command instance for the taskgraph binary, isolated from any
/// user config
fn taskgraph_cmd(home: &TempDir) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("taskgraph"));
    cmd.env_remove("TASKGRAPH_CONFIG")
        .env_remove("TASKGRAPH_LOG")
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"));
    cmd
}

/// Create a temporary directory holding a plan file
fn setup_plan(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    (dir, path)
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap()
}

// =============================================================================
// Order
// =============================================================================

#[test]
fn test_order_lists_dependencies_first() {
    let (dir, plan) = setup_plan("plan.toml", PLAN);

    let output = taskgraph_cmd(&dir)
        .arg("order")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("Execution order (4):"));

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let db = stdout.find("Setup Database").unwrap();
    let api = stdout.find("Create API").unwrap();
    let ui = stdout.find("Build UI").unwrap();
    assert!(db < api && api < ui);
}

#[test]
fn test_order_json() {
    let (dir, plan) = setup_plan("plan.toml", PLAN);

    let output = taskgraph_cmd(&dir)
        .args(["order", "--format", "json"])
        .arg(&plan)
        .assert()
        .success();

    let json = stdout_json(output.get_output());
    let keys: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["key"].as_str().unwrap())
        .collect();

    // docs has no dependencies but is low priority, so the chain goes first
    assert_eq!(keys, vec!["db", "api", "ui", "docs"]);
    assert_eq!(json[0]["position"], 1);
    assert_eq!(json[1]["depends_on"], serde_json::json!(["db"]));
    assert_eq!(json[2]["deadline"], "2024-05-01 12:00");
}

#[test]
fn test_yaml_plan() {
    let yaml = r#"
tasks:
  - key: db
    title: Setup Database
    deadline: "2024-04-01"
  - key: api
    title: Create API
    deadline: "2024-04-15"
    depends_on: [db]
"#;
    let (dir, plan) = setup_plan("plan.yaml", yaml);

    taskgraph_cmd(&dir)
        .arg("check")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan OK: 2 tasks, 1 dependencies"));
}

// =============================================================================
// Ready / Blocked / Board
// =============================================================================

#[test]
fn test_ready_shows_unblocked_pending_tasks() {
    let (dir, plan) = setup_plan("plan.toml", PLAN);

    taskgraph_cmd(&dir)
        .arg("ready")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("Ready tasks (1):"))
        .stdout(predicate::str::contains("Create API"))
        .stdout(predicate::str::contains("Build UI").not());
}

#[test]
fn test_blocked_shows_blockers() {
    let (dir, plan) = setup_plan("plan.toml", PLAN);

    let output = taskgraph_cmd(&dir)
        .args(["blocked", "-f", "json"])
        .arg(&plan)
        .assert()
        .success();

    let json = stdout_json(output.get_output());
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["key"], "ui");
    assert_eq!(items[0]["reason"], "dependencies");
    assert_eq!(items[0]["blocked_by"], serde_json::json!(["api"]));
    assert_eq!(items[1]["key"], "docs");
    assert_eq!(items[1]["status"], "blocked");
    assert_eq!(items[1]["reason"], "status");
    assert_eq!(items[1]["blocked_by"], serde_json::json!([]));
}

#[test]
fn test_blocked_includes_blocked_status_without_dependencies() {
    let plan_text = r#"
[[tasks]]
key = "docs"
title = "Write docs"
deadline = "2024-05-10"
status = "blocked"
"#;
    let (dir, plan) = setup_plan("plan.toml", plan_text);

    taskgraph_cmd(&dir)
        .arg("blocked")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("Blocked tasks (1):"))
        .stdout(predicate::str::contains("Write docs"))
        .stdout(predicate::str::contains("No blocked tasks.").not());
}

#[test]
fn test_kpi_sums_done_work_per_assignee() {
    let (dir, plan) = setup_plan("plan.toml", PLAN);

    taskgraph_cmd(&dir)
        .arg("kpi")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("Team performance (2):"))
        .stdout(predicate::str::contains("Alice"))
        .stdout(predicate::str::contains("John"));

    let output = taskgraph_cmd(&dir)
        .args(["kpi", "--format", "json"])
        .arg(&plan)
        .assert()
        .success();

    let json = stdout_json(output.get_output());
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 2);

    assert_eq!(items[0]["assignee"], "Alice");
    assert_eq!(items[0]["points"], 0);
    assert_eq!(items[0]["completed"], 0);
    assert_eq!(items[0]["assigned"], 1);
    assert!(items[0]["last_completed_at"].is_null());

    assert_eq!(items[1]["assignee"], "John");
    assert_eq!(items[1]["points"], 3);
    assert_eq!(items[1]["completed"], 1);
    assert!(items[1]["last_completed_at"].is_string());
}

#[test]
fn test_board_groups_by_status() {
    let (dir, plan) = setup_plan("plan.toml", PLAN);

    taskgraph_cmd(&dir)
        .arg("board")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("PENDING (2)"))
        .stdout(predicate::str::contains("IN_PROGRESS (0)"))
        .stdout(predicate::str::contains("BLOCKED (1)"))
        .stdout(predicate::str::contains("DONE (1)"))
        .stdout(predicate::str::contains("(5 pts)"));
}

// =============================================================================
// Show / Check
// =============================================================================

#[test]
fn test_show_by_key_and_id() {
    let (dir, plan) = setup_plan("plan.toml", PLAN);

    taskgraph_cmd(&dir)
        .args(["show"])
        .arg(&plan)
        .arg("api")
        .assert()
        .success()
        .stdout(predicate::str::contains("Title:       Create API"))
        .stdout(predicate::str::contains("Depends on:  db"))
        .stdout(predicate::str::contains("Needed by:   ui"));

    let output = taskgraph_cmd(&dir)
        .args(["show", "--format", "json"])
        .arg(&plan)
        .arg("t-1")
        .assert()
        .success();

    let json = stdout_json(output.get_output());
    assert_eq!(json["key"], "db");
    assert_eq!(json["status"], "done");
    assert!(json["completed_at"].is_string());
}

#[test]
fn test_show_unknown_task_fails() {
    let (dir, plan) = setup_plan("plan.toml", PLAN);

    taskgraph_cmd(&dir)
        .arg("show")
        .arg(&plan)
        .arg("nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task not found in plan: nope"));
}

#[test]
fn test_check_rejects_cycle() {
    let cyclic = r#"
[[tasks]]
key = "a"
title = "A"
deadline = "2024-04-01"
depends_on = ["c"]

[[tasks]]
key = "b"
title = "B"
deadline = "2024-04-01"
depends_on = ["a"]

[[tasks]]
key = "c"
title = "C"
deadline = "2024-04-01"
depends_on = ["b"]
"#;
    let (dir, plan) = setup_plan("plan.toml", cyclic);

    taskgraph_cmd(&dir)
        .arg("check")
        .arg(&plan)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid plan"))
        .stderr(predicate::str::contains("would create a cycle"));
}

#[test]
fn test_check_rejects_unmet_status() {
    let plan_text = r#"
[[tasks]]
key = "db"
title = "Setup Database"
deadline = "2024-04-01"

[[tasks]]
key = "api"
title = "Create API"
deadline = "2024-04-15"
status = "done"
depends_on = ["db"]
"#;
    let (dir, plan) = setup_plan("plan.toml", plan_text);

    taskgraph_cmd(&dir)
        .arg("check")
        .arg(&plan)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task 'api'"))
        .stderr(predicate::str::contains("not done"));
}

#[test]
fn test_missing_plan_fails() {
    let dir = TempDir::new().unwrap();

    taskgraph_cmd(&dir)
        .arg("order")
        .arg(dir.path().join("missing.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read plan"));
}

// =============================================================================
// Config / Demo
// =============================================================================

#[test]
fn test_config_sets_default_format_and_priority() {
    let plan_text = r#"
[[tasks]]
key = "a"
title = "A"
deadline = "2024-04-01"
"#;
    let (dir, plan) = setup_plan("plan.toml", plan_text);
    let config = dir.path().join("config.toml");
    fs::write(&config, "default_format = \"json\"\ndefault_priority = \"high\"\n").unwrap();

    let output = taskgraph_cmd(&dir)
        .arg("--config")
        .arg(&config)
        .arg("order")
        .arg(&plan)
        .assert()
        .success();

    let json = stdout_json(output.get_output());
    assert_eq!(json[0]["priority"], "high");
}

#[test]
fn test_config_from_env() {
    let (dir, plan) = setup_plan("plan.toml", PLAN);
    let config = dir.path().join("config.toml");
    fs::write(&config, "default_format = \"json\"\n").unwrap();

    let output = taskgraph_cmd(&dir)
        .env("TASKGRAPH_CONFIG", &config)
        .arg("check")
        .arg(&plan)
        .assert()
        .success();

    let json = stdout_json(output.get_output());
    assert_eq!(json["valid"], true);
    assert_eq!(json["tasks"], 4);
    assert_eq!(json["dependencies"], 2);
}

#[test]
fn test_demo_orders_database_before_api() {
    let dir = TempDir::new().unwrap();

    let output = taskgraph_cmd(&dir)
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Execution order (2):"));

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let db = stdout.find("Setup Database").unwrap();
    let api = stdout.find("Create API").unwrap();
    assert!(db < api);
}

#[test]
fn test_verbose_logs_to_stderr() {
    let dir = TempDir::new().unwrap();

    taskgraph_cmd(&dir)
        .args(["--verbose", "demo"])
        .assert()
        .success()
        .stderr(predicate::str::contains("added dependency"));
}
