#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn onboard(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("onboard").unwrap();
    cmd.current_dir(dir.path())
        .env("ONBOARD_ROOT", dir.path())
        .env_remove("ONBOARD_SESSION");
    cmd
}

fn init_project(dir: &TempDir) {
    onboard(dir).arg("init").assert().success();
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.arg("--json").output().unwrap();
    assert!(out.status.success(), "command failed: {:?}", out);
    serde_json::from_slice(&out.stdout).unwrap()
}

// ---------------------------------------------------------------------------
// onboard init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_directory_tree() {
    let dir = TempDir::new().unwrap();
    onboard(&dir).arg("init").assert().success();

    assert!(dir.path().join(".onboard").is_dir());
    assert!(dir.path().join(".onboard/sessions").is_dir());
    assert!(dir.path().join(".onboard/config.yaml").exists());
    assert!(!dir.path().join(".onboard/catalog.yaml").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    onboard(&dir).arg("init").assert().success();
    onboard(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:"));
}

#[test]
fn init_with_catalog_writes_editable_catalog() {
    let dir = TempDir::new().unwrap();
    onboard(&dir)
        .args(["init", "--with-catalog"])
        .assert()
        .success();

    let content = std::fs::read_to_string(dir.path().join(".onboard/catalog.yaml")).unwrap();
    assert!(content.contains("Finance Operation Automation"));

    // The written catalog is the one loaded afterwards.
    onboard(&dir)
        .args(["code", "decode", "2b2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Automation"));
}

// ---------------------------------------------------------------------------
// onboard catalog
// ---------------------------------------------------------------------------

#[test]
fn catalog_list_shows_every_service() {
    let dir = TempDir::new().unwrap();
    let v = json_output(onboard(&dir).args(["catalog", "list"]));
    let rows = v.as_array().unwrap();
    assert_eq!(rows.len(), 12);
    assert_eq!(rows[0]["label"], "Zoho");
    assert_eq!(rows[1]["code"], "2");
}

#[test]
fn catalog_show_lists_child_codes() {
    let dir = TempDir::new().unwrap();
    onboard(&dir)
        .args(["catalog", "show", "2", "--path", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2b2"))
        .stdout(predicate::str::contains("Financial Audit Readiness"));
}

#[test]
fn catalog_override_with_invalid_shape_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::write(
        dir.path().join(".onboard/catalog.yaml"),
        "- label: A\n- label: A\n",
    )
    .unwrap();

    onboard(&dir)
        .args(["catalog", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid catalog"));
}

// ---------------------------------------------------------------------------
// onboard code
// ---------------------------------------------------------------------------

#[test]
fn encode_builds_compact_code() {
    let dir = TempDir::new().unwrap();
    onboard(&dir)
        .args(["code", "encode", "2", "--path", "1.1"])
        .assert()
        .success()
        .stdout("2b2\n");
}

#[test]
fn encode_out_of_range_path_reports_truncation() {
    let dir = TempDir::new().unwrap();
    let v = json_output(onboard(&dir).args(["code", "encode", "2", "--path", "1.40"]));
    assert_eq!(v["code"], "2b");
    assert_eq!(v["depth"], 1);
    assert_eq!(v["truncated"], true);
}

#[test]
fn decode_resolves_labels() {
    let dir = TempDir::new().unwrap();
    let v = json_output(onboard(&dir).args(["code", "decode", "2b2"]));
    assert_eq!(
        v["labels"],
        serde_json::json!([
            "Finance Operation Automation",
            "CFO Stack – ITeC App",
            "Automation"
        ])
    );
    assert!(v.get("stop").is_none());
}

#[test]
fn decode_unknown_service_is_empty_not_an_error() {
    let dir = TempDir::new().unwrap();
    let v = json_output(onboard(&dir).args(["code", "decode", "99x"]));
    assert_eq!(v["labels"], serde_json::json!([]));
    assert_eq!(v["stop"]["reason"], "unknown_service");
}

#[test]
fn resolve_partial_path_is_incomplete() {
    let dir = TempDir::new().unwrap();
    let v = json_output(onboard(&dir).args(["code", "resolve", "2", "--path", "1"]));
    assert_eq!(v["detail"]["service"], "Finance Operation Automation");
    assert_eq!(v["detail"]["option"], "CFO Stack – ITeC App");
    assert_eq!(v["detail"]["sub_option"], serde_json::Value::Null);
    assert_eq!(v["complete"], false);
}

// ---------------------------------------------------------------------------
// onboard session
// ---------------------------------------------------------------------------

#[test]
fn session_walkthrough_reaches_proposal() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    for (field, value) in [
        ("responsibility", "Founder"),
        ("business_category", "SaaS"),
        ("valuation_range", "Yet to begin"),
        ("currency", "INR"),
    ] {
        onboard(&dir)
            .args(["session", "set", field, value])
            .assert()
            .success();
    }

    let v = json_output(onboard(&dir).args(["session", "path", "2", "1.1"]));
    assert_eq!(v["complete"], true);

    let v = json_output(onboard(&dir).args(["session", "show"]));
    assert_eq!(
        v["milestones"],
        serde_json::json!([true, true, false, false, false])
    );
    assert_eq!(v["active_step"], "preview");

    onboard(&dir).args(["session", "preview"]).assert().success();
    onboard(&dir)
        .args(["session", "share", "Asha", "9876543210", "asha@example.com"])
        .assert()
        .success();

    let v = json_output(onboard(&dir).args(["session", "request", "sms"]));
    assert_eq!(v["channel"], "sms");
    assert_eq!(v["to"], "+919876543210");

    onboard(&dir)
        .args(["session", "deliver", "sms"])
        .assert()
        .success();

    let v = json_output(onboard(&dir).args(["session", "show"]));
    assert_eq!(v["complete"], true);
    assert_eq!(v["active_step_index"], 4);
}

#[test]
fn failed_delivery_leaves_progress_unchanged() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let v = json_output(onboard(&dir).args([
        "session",
        "deliver",
        "email",
        "--failed",
        "mailbox unavailable",
    ]));
    assert_eq!(v["changed"], false);
    assert_eq!(
        v["milestones"],
        serde_json::json!([false, false, false, false, false])
    );
}

#[test]
fn invalid_contact_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    onboard(&dir)
        .args(["session", "share", "Asha", "12345", "asha@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("10 digits"));

    let v = json_output(onboard(&dir).args(["session", "show"]));
    assert_eq!(v["milestones"][3], false);
}

#[test]
fn selecting_unknown_service_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    onboard(&dir)
        .args(["session", "select", "40"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("service not found: 40"));
}

#[test]
fn services_payload_joins_labels_in_selection_order() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    onboard(&dir).args(["session", "select", "3"]).assert().success();
    onboard(&dir).args(["session", "select", "1"]).assert().success();

    onboard(&dir)
        .args(["session", "payload", "services"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"services\": \"Payroll,Zoho\""));
}

#[test]
fn sessions_are_isolated_by_name() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    onboard(&dir)
        .args(["--session", "acme", "session", "select", "1"])
        .assert()
        .success();

    let v = json_output(onboard(&dir).args(["session", "show"]));
    assert_eq!(v["form"]["selected_services"], serde_json::json!([]));
    assert!(dir.path().join(".onboard/sessions/acme").is_dir());
}

#[test]
fn logout_removes_stored_session() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    onboard(&dir).args(["session", "select", "1"]).assert().success();
    assert!(dir
        .path()
        .join(".onboard/sessions/default/form_state.json")
        .exists());

    onboard(&dir).args(["session", "logout"]).assert().success();
    assert!(!dir
        .path()
        .join(".onboard/sessions/default/form_state.json")
        .exists());
}

// ---------------------------------------------------------------------------
// onboard progress
// ---------------------------------------------------------------------------

#[test]
fn progress_set_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let first = json_output(onboard(&dir).args(["progress", "set", "preview", "true"]));
    assert_eq!(first["changed"], true);
    let second = json_output(onboard(&dir).args(["progress", "set", "preview", "true"]));
    assert_eq!(second["changed"], false);
    assert_eq!(first["version"], second["version"]);
}

#[test]
fn progress_complete_advances_cursor() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let v = json_output(onboard(&dir).args(["progress", "complete", "0"]));
    assert_eq!(v["current_step"], 1);
    assert_eq!(v["active_step"], "additional_services");
}

#[test]
fn invalid_milestone_index_fails_in_development_mode() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    onboard(&dir)
        .args(["progress", "set", "7", "true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid milestone index 7"));
}

#[test]
fn invalid_milestone_index_is_ignored_in_production_mode() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::write(
        dir.path().join(".onboard/config.yaml"),
        "version: 1\nmode: production\n",
    )
    .unwrap();

    let v = json_output(onboard(&dir).args(["progress", "set", "7", "true"]));
    assert_eq!(v["changed"], false);
    assert_eq!(
        v["milestones"],
        serde_json::json!([false, false, false, false, false])
    );
}

#[test]
fn default_currency_applies_to_new_sessions() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::write(
        dir.path().join(".onboard/config.yaml"),
        "version: 1\ndefault_currency: INR\n",
    )
    .unwrap();

    onboard(&dir)
        .args(["session", "show"])
        .assert()
        .success();
    assert!(!dir.path().join(".onboard/sessions/default").exists());

    onboard(&dir).args(["session", "select", "1"]).assert().success();
    let v = json_output(onboard(&dir).args(["session", "show"]));
    assert_eq!(v["form"]["currency"], "INR");
}

#[test]
fn read_only_commands_do_not_write_snapshots() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    for args in [
        ["session", "show"].as_slice(),
        ["session", "listing"].as_slice(),
        ["session", "payload", "services"].as_slice(),
        ["progress", "show"].as_slice(),
    ] {
        onboard(&dir).args(args).assert().success();
    }
    assert!(!dir.path().join(".onboard/sessions/default").exists());
}

#[test]
fn employee_count_must_be_a_listed_choice() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    onboard(&dir)
        .args(["session", "set", "employee_count", "about forty"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("51-200"));
    onboard(&dir)
        .args(["session", "set", "employee_count", "51-200"])
        .assert()
        .success();
}

#[test]
fn code_listing_reads_stored_codes() {
    let dir = TempDir::new().unwrap();
    let v = json_output(onboard(&dir).args([
        "code",
        "listing",
        "Asha",
        "2b5,3a",
        "--services",
        "Finance Operation Automation,Bookkeeping",
    ]));
    assert_eq!(v["service_details"][0]["code"], "2b5");
    assert_eq!(
        v["service_details"][1]["labels"],
        serde_json::json!(["Payroll", "End-to-end support"])
    );
    assert_eq!(
        v["selected_services"],
        serde_json::json!(["Finance Operation Automation", "Bookkeeping"])
    );
}

#[test]
fn decode_rejects_a_run_no_option_matches() {
    let dir = TempDir::new().unwrap();
    let v = json_output(onboard(&dir).args(["code", "decode", "2b12"]));
    assert_eq!(v["labels"].as_array().unwrap().len(), 2);
    assert_eq!(v["stop"]["reason"], "invalid_token");
    assert_eq!(v["stop"]["offset"], 2);
}
