use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn hodge(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hodge").unwrap();
    cmd.current_dir(dir.path()).env("HODGE_ROOT", dir.path());
    cmd
}

fn init_project(dir: &TempDir) {
    hodge(dir).arg("init").assert().success();
}

fn mirror(dir: &TempDir) -> String {
    std::fs::read_to_string(dir.path().join(".hodge/project_management.md")).unwrap()
}

// ---------------------------------------------------------------------------
// hodge init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_state_files() {
    let dir = TempDir::new().unwrap();
    hodge(&dir).arg("init").assert().success();

    assert!(dir.path().join(".hodge").is_dir());
    assert!(dir.path().join(".hodge/config.yaml").exists());
    assert!(dir.path().join(".hodge/project_management.md").exists());

    let content = mirror(&dir);
    assert!(content.contains("## Implementation Phases"));
    assert!(content.contains("## Active Features"));
    assert!(content.contains("## Completed Features"));
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    hodge(&dir).arg("init").assert().success();
    hodge(&dir).arg("init").assert().success();
}

#[test]
fn init_preserves_existing_mirror() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    hodge(&dir).args(["explore", "auth"]).assert().success();

    hodge(&dir).arg("init").assert().success();
    assert!(mirror(&dir).contains("### HODGE-001"));
}

// ---------------------------------------------------------------------------
// phase commands
// ---------------------------------------------------------------------------

#[test]
fn explore_allocates_id_and_updates_mirror() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hodge(&dir)
        .args(["explore", "auth"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HODGE-001"));

    let content = mirror(&dir);
    assert!(content.contains("### HODGE-001: auth"));
    assert!(content.contains("- **Status**: exploring"));
}

#[test]
fn explore_is_idempotent_for_known_feature() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hodge(&dir).args(["explore", "auth"]).assert().success();
    hodge(&dir)
        .args(["explore", "HODGE-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HODGE-001"));

    // No second feature allocated
    assert!(!mirror(&dir).contains("HODGE-002"));
}

#[test]
fn build_requires_known_feature() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hodge(&dir)
        .args(["build", "HODGE-001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown feature"));
}

#[test]
fn full_phase_progression() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hodge(&dir).args(["explore", "auth"]).assert().success();
    hodge(&dir).args(["build", "HODGE-001"]).assert().success();
    assert!(mirror(&dir).contains("- **Status**: building"));

    hodge(&dir).args(["harden", "HODGE-001"]).assert().success();
    assert!(mirror(&dir).contains("- **Status**: hardening"));

    hodge(&dir)
        .args(["ship", "HODGE-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Shipped HODGE-001"));

    // Shipped features move below the Completed Features heading.
    let content = mirror(&dir);
    let completed_at = content.find("## Completed Features").unwrap();
    let block_at = content.find("### HODGE-001").unwrap();
    assert!(block_at > completed_at);
    assert!(content.contains("- **Status**: shipped"));
}

#[test]
fn ship_comment_includes_progress_and_context() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hodge(&dir).args(["explore", "auth"]).assert().success();
    hodge(&dir).args(["explore", "billing"]).assert().success();

    hodge(&dir)
        .args([
            "ship",
            "HODGE-001",
            "--tests-passed",
            "42",
            "--coverage",
            "87",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/2 features shipped (50%)"))
        .stdout(predicate::str::contains("Tests passed: 42"));
}

#[test]
fn phase_commands_resolve_external_ids() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hodge(&dir).args(["explore", "auth"]).assert().success();
    hodge(&dir)
        .args(["id", "link", "HODGE-001", "HOD-42"])
        .assert()
        .success();

    hodge(&dir)
        .args(["build", "HOD-42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HODGE-001"));
}

// ---------------------------------------------------------------------------
// hodge id
// ---------------------------------------------------------------------------

#[test]
fn id_create_and_resolve() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hodge(&dir)
        .args(["id", "create", "auth"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HODGE-001"));

    hodge(&dir)
        .args(["id", "resolve", "HODGE-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("auth"));
}

#[test]
fn id_create_with_external_infers_tool() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hodge(&dir)
        .args(["id", "create", "auth", "--external", "HOD-7", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"pmTool\": \"linear\""));
}

#[test]
fn id_resolve_unknown_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hodge(&dir)
        .args(["id", "resolve", "HODGE-999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no mapping"));
}

#[test]
fn id_sub_allocates_dotted_children() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hodge(&dir).args(["id", "create", "auth"]).assert().success();
    hodge(&dir)
        .args(["id", "sub", "HODGE-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HODGE-001.1"));
    hodge(&dir)
        .args(["id", "sub", "HODGE-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HODGE-001.2"));

    hodge(&dir)
        .args(["id", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("epic"));
}

#[test]
fn id_sub_rejects_nesting() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hodge(&dir).args(["id", "create", "auth"]).assert().success();
    hodge(&dir).args(["id", "sub", "HODGE-001"]).assert().success();
    hodge(&dir)
        .args(["id", "sub", "HODGE-001.1"])
        .assert()
        .failure();
}

#[test]
fn id_list_empty_project() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hodge(&dir)
        .args(["id", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No features yet."));
}

// ---------------------------------------------------------------------------
// hodge sync / status
// ---------------------------------------------------------------------------

#[test]
fn sync_with_empty_queue_is_noop() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hodge(&dir)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("Queue empty"));
}

#[test]
fn status_reports_per_feature_state() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    hodge(&dir).args(["explore", "auth"]).assert().success();
    hodge(&dir).args(["explore", "billing"]).assert().success();
    hodge(&dir).args(["ship", "HODGE-002"]).assert().success();

    hodge(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("HODGE-001"))
        .stdout(predicate::str::contains("shipped"))
        .stdout(predicate::str::contains("1/2 shipped (50%)"));
}

#[test]
fn status_json_output() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    hodge(&dir).args(["explore", "auth"]).assert().success();

    hodge(&dir)
        .args(["status", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"exploring\""));
}

// ---------------------------------------------------------------------------
// root resolution
// ---------------------------------------------------------------------------

#[test]
fn commands_work_from_nested_directory() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let nested = dir.path().join("src/deep");
    std::fs::create_dir_all(&nested).unwrap();

    // No HODGE_ROOT: the CLI walks up from cwd to find .hodge/
    let mut cmd = Command::cargo_bin("hodge").unwrap();
    cmd.current_dir(&nested)
        .args(["explore", "auth"])
        .assert()
        .success();

    assert!(mirror(&dir).contains("### HODGE-001"));
}
