use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn hookwright() -> Command {
    let mut cmd = Command::cargo_bin("hookwright").unwrap();
    cmd.env("RUST_LOG", "off");
    cmd
}

const REQUEST: &str = "root_name: test_module\nhooks:\n  - hook_help\n  - hook_install\nreadme: true\n";

#[test]
fn test_components_lists_roots() {
    hookwright()
        .arg("components")
        .assert()
        .success()
        .stdout(predicate::str::contains("module"))
        .stdout(predicate::str::contains("hook_implementation").not());

    hookwright()
        .args(["components", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hook_implementation"));
}

#[test]
fn test_hooks_filtered_by_group() {
    hookwright()
        .args(["hooks", "--group", "help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hook_help"))
        .stdout(predicate::str::contains("hook_form_alter").not());
}

#[test]
fn test_schema_as_json() {
    let output = hookwright().args(["schema", "service", "--format", "json"]).output().unwrap();
    assert!(output.status.success());
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(schema["service_name"]["required"], serde_json::json!(true));
    assert!(schema.get("root_component_name").is_none());
}

#[test]
fn test_schema_of_unknown_type_fails() {
    hookwright()
        .args(["schema", "nonsense"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_generate_writes_then_reports_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let request = dir.path().join("request.yml");
    fs::write(&request, REQUEST).unwrap();
    let output = dir.path().join("test_module");

    hookwright()
        .arg("generate")
        .arg(&request)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("test_module.install"));

    assert!(output.join("test_module.info.yml").is_file());
    assert!(output.join("README.md").is_file());
    let install = fs::read_to_string(output.join("test_module.install")).unwrap();
    assert!(install.contains("function test_module_install("));

    hookwright()
        .arg("generate")
        .arg(&request)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("unchanged"))
        .stdout(predicate::str::contains("Wrote 0 of"));
}

#[test]
fn test_generate_keeps_hand_written_functions() {
    let dir = tempfile::tempdir().unwrap();
    let request = dir.path().join("request.yml");
    fs::write(&request, REQUEST).unwrap();
    let output = dir.path().join("test_module");
    fs::create_dir_all(&output).unwrap();
    fs::write(
        output.join("test_module.module"),
        "<?php\n\nfunction test_module_custom() {\n  return 1;\n}\n",
    )
    .unwrap();

    hookwright()
        .arg("generate")
        .arg(&request)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("merge"));

    let module = fs::read_to_string(output.join("test_module.module")).unwrap();
    assert!(module.contains("function test_module_custom() {\n  return 1;\n}"));
    assert!(module.contains("function test_module_help("));
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let request = dir.path().join("request.yml");
    fs::write(&request, REQUEST).unwrap();
    let output = dir.path().join("out");

    hookwright()
        .arg("generate")
        .arg(&request)
        .arg("-o")
        .arg(&output)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));
    assert!(!output.exists());
}

#[test]
fn test_stdout_prints_files() {
    let dir = tempfile::tempdir().unwrap();
    let request = dir.path().join("request.yml");
    fs::write(&request, "root_name: test_module\n").unwrap();

    hookwright()
        .arg("generate")
        .arg(&request)
        .arg("--stdout")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("==> test_module.info.yml <=="))
        .stdout(predicate::str::contains("name: 'Test module'"));
    assert!(!dir.path().join("test_module").exists());
}

#[test]
fn test_invalid_request_fails() {
    let dir = tempfile::tempdir().unwrap();
    let request = dir.path().join("request.yml");
    fs::write(&request, "root_name: test_module\nhooks: [hook_nope]\n").unwrap();

    hookwright()
        .arg("generate")
        .arg(&request)
        .arg("-o")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid request"));
}

#[test]
fn test_unsupported_core_version() {
    hookwright()
        .args(["schema", "module", "--core", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported core version 7"));
}

#[test]
fn test_unreadable_existing_file_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let request = dir.path().join("request.yml");
    fs::write(&request, REQUEST).unwrap();
    let output = dir.path().join("test_module");
    fs::create_dir_all(&output).unwrap();
    let mut module = b"<?php\n\n/**\n * Caf".to_vec();
    module.push(0xE9);
    module.extend_from_slice(b".\n */\nfunction test_module_helper() {\n}\n");
    fs::write(output.join("test_module.module"), &module).unwrap();

    hookwright()
        .arg("generate")
        .arg(&request)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("test_module.module"));

    assert_eq!(fs::read(output.join("test_module.module")).unwrap(), module);
    assert!(!output.join("test_module.info.yml").exists());
}
