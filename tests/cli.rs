//! End-to-end tests for the `tracker` binary against a temporary data
//! directory.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// A fresh data directory with cheap password hashing
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.json"),
            r#"{"password_hashing":{"memory_cost":8,"time_cost":1,"parallelism":1}}"#,
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("tracker").unwrap();
        cmd.env("TRACKER_DATA_DIR", self.path())
            .env_remove("TRACKER_PASSWORD")
            .env_remove("TRACKER_BACKEND")
            .env_remove("TRACKER_LOG");
        cmd
    }

    /// Run a command that must succeed, returning stdout
    fn run(&self, args: &[&str]) -> String {
        let output = self.cmd().args(args).assert().success().get_output().clone();
        String::from_utf8(output.stdout).unwrap()
    }

    fn sign_up(&self, email: &str, name: &str, role: &str) {
        self.run(&[
            "user", "sign-up", email, "--name", name, "--role", role, "--password", "hunter22",
        ]);
    }

    fn sign_in(&self, email: &str) {
        self.run(&["user", "sign-in", email, "--password", "hunter22"]);
    }
}

/// Pull the value of the first `ID:` line out of command output
fn id_from(output: &str) -> String {
    output
        .lines()
        .find_map(|line| line.trim().strip_prefix("ID:"))
        .map(|id| id.trim().to_string())
        .unwrap()
}

#[test]
fn test_init_creates_data_files() {
    let ws = Workspace::new();

    ws.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("5 data files created"));

    for name in ["users", "projects", "defects", "comments", "history"] {
        assert!(ws.path().join("data").join(format!("{}.json", name)).exists());
    }
}

#[test]
fn test_config_shows_backend() {
    let ws = Workspace::new();

    ws.cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backend:             json"));
}

#[test]
fn test_roles_lists_every_role() {
    let ws = Workspace::new();

    ws.cmd()
        .arg("roles")
        .assert()
        .success()
        .stdout(predicate::str::contains("Administrator (admin)"))
        .stdout(predicate::str::contains("Team Lead (team_lead)"));
}

#[test]
fn test_commands_need_a_session() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["project", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn test_wrong_password_is_rejected() {
    let ws = Workspace::new();
    ws.sign_up("ann@example.com", "Ann Admin", "admin");

    ws.cmd()
        .args(["user", "sign-in", "ann@example.com", "--password", "wrong-one"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid email or password"));

    ws.cmd()
        .args(["user", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in."));
}

#[test]
fn test_duplicate_sign_up_fails() {
    let ws = Workspace::new();
    ws.sign_up("ann@example.com", "Ann Admin", "admin");

    ws.cmd()
        .args([
            "user", "sign-up", "ANN@example.com", "--name", "Other", "--password", "hunter22",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_engineer_cannot_create_projects() {
    let ws = Workspace::new();
    ws.sign_up("eve@example.com", "Eve Engineer", "engineer");
    ws.sign_in("eve@example.com");

    ws.cmd()
        .args(["project", "create", "Harbor"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Permission denied: create_projects"));
}

#[test]
fn test_defect_lifecycle_with_history() {
    let ws = Workspace::new();
    ws.sign_up("ann@example.com", "Ann Admin", "admin");
    ws.sign_up("eve@example.com", "Eve Engineer", "engineer");
    ws.sign_in("ann@example.com");

    ws.run(&["project", "create", "Harbor", "--description", "Pier rebuild"]);
    let created = ws.run(&[
        "defect",
        "create",
        "--project",
        "harbor",
        "Crack in slab",
        "--priority",
        "high",
        "--assignee",
        "eve@example.com",
        "--due",
        "2030-01-15",
    ]);
    let defect = id_from(&created);

    ws.run(&["defect", "edit", &defect, "--status", "in_progress", "--unassign"]);

    let history = ws.run(&["defect", "history", &defect]);
    assert!(history.contains("status: \"new\" -> \"in_progress\""));
    assert!(history.contains("assigned_to:"));
    assert!(history.contains("by Ann Admin"));

    ws.run(&["comment", "add", &defect, "Measured 3mm"]);
    let comments = ws.run(&["comment", "list", &defect]);
    assert!(comments.contains("Measured 3mm"));

    let shown = ws.run(&["defect", "show", &defect]);
    assert!(shown.contains("Crack in slab"));
    assert!(shown.contains("Harbor"));

    let listed = ws.run(&["defect", "list", "--status", "in_progress"]);
    assert!(listed.contains("Crack in slab"));
    let listed = ws.run(&["defect", "list", "--status", "closed"]);
    assert!(listed.contains("No defects found."));
}

#[test]
fn test_role_change_applies_to_existing_session() {
    let ws = Workspace::new();
    ws.sign_up("ann@example.com", "Ann Admin", "admin");
    ws.sign_up("eve@example.com", "Eve Engineer", "engineer");

    ws.sign_in("ann@example.com");
    ws.run(&["user", "set-role", "eve@example.com", "manager"]);

    ws.sign_in("eve@example.com");
    ws.run(&["project", "create", "Harbor"]);

    ws.sign_in("ann@example.com");
    ws.run(&["user", "set-role", "eve@example.com", "engineer"]);

    ws.sign_in("eve@example.com");
    ws.cmd()
        .args(["project", "create", "Depot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Permission denied"));
}

#[test]
fn test_delete_needs_force() {
    let ws = Workspace::new();
    ws.sign_up("ann@example.com", "Ann Admin", "admin");
    ws.sign_in("ann@example.com");

    ws.run(&["project", "create", "Harbor"]);
    let defect = id_from(&ws.run(&["defect", "create", "--project", "Harbor", "Leak"]));

    let notice = ws.run(&["project", "delete", "Harbor"]);
    assert!(notice.contains("run again with --force"));
    assert!(ws.run(&["project", "list"]).contains("Harbor"));

    let deleted = ws.run(&["project", "delete", "Harbor", "--force"]);
    assert!(deleted.contains("Removed 1 defects"));

    ws.cmd()
        .args(["defect", "show", &defect])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Defect not found"));
}

#[test]
fn test_export_and_verify() {
    let ws = Workspace::new();
    ws.sign_up("ann@example.com", "Ann Admin", "admin");
    ws.sign_in("ann@example.com");
    ws.run(&["project", "create", "Harbor"]);
    ws.run(&["defect", "create", "--project", "Harbor", "Leak"]);

    let json = ws.path().join("export.json");
    let yaml = ws.path().join("export.yaml");
    let csv = ws.path().join("defects.csv");

    ws.run(&["export", "all", json.to_str().unwrap(), "--pretty"]);
    ws.run(&["export", "all", yaml.to_str().unwrap(), "--format", "yaml"]);
    let exported = ws.run(&["export", "defects", csv.to_str().unwrap()]);
    assert!(exported.contains("Exported 1 defects"));

    let contents = fs::read_to_string(&json).unwrap();
    assert!(!contents.contains("password_hash"));

    ws.cmd()
        .args(["export", "verify", json.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Defects:   1"));
    ws.cmd()
        .args(["export", "verify", yaml.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Export is valid"));

    let rows = fs::read_to_string(&csv).unwrap();
    assert!(rows.starts_with("ID,Project,Title"));
    assert!(rows.contains("Harbor,Leak"));
}

#[test]
fn test_engineer_cannot_export() {
    let ws = Workspace::new();
    ws.sign_up("eve@example.com", "Eve Engineer", "engineer");
    ws.sign_in("eve@example.com");
    let out = ws.path().join("export.json");

    ws.cmd()
        .args(["export", "all", out.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Permission denied: export_data"));
    assert!(!out.exists());
}
