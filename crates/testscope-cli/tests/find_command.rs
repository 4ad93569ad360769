use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_testscope"))
}

fn suite(root: &std::path::Path) {
    fs::create_dir_all(root.join("compute")).unwrap();
    fs::write(
        root.join("compute").join("vm_test.go"),
        "package compute\n\nvar _ = Describe(\"VM\", func() {\n\
         \tIt(\"[test_id:1742]boots\", func() {})\n})\n",
    )
    .unwrap();
    fs::write(root.join("suite_test.go"), "package tests\n").unwrap();
}

#[test]
fn find_by_id_with_walk_search() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    suite(temp.path());

    let mut cmd = cli();
    cmd.args(["find", "VM [test_id:1742]boots", "--by-id", "--search", "walk", "--dir"])
        .arg(temp.path());

    cmd.assert()
        .success()
        .stdout(contains("vm_test.go"))
        .stdout(contains("(by test id)"));
    Ok(())
}

#[test]
fn find_by_id_json_output() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    suite(temp.path());

    let mut cmd = cli();
    cmd.args(["--json", "find", "[test_id:1742]", "--by-id", "--search", "walk", "--dir"])
        .arg(temp.path());

    cmd.assert()
        .success()
        .stdout(contains("\"type\":\"test_file\""))
        .stdout(contains("\"method\":\"id\""));
    Ok(())
}

#[test]
fn find_by_unknown_id_is_data_error() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    suite(temp.path());

    let mut cmd = cli();
    cmd.args(["find", "[test_id:9999]gone", "--by-id", "--search", "walk", "--dir"])
        .arg(temp.path());

    cmd.assert()
        .failure()
        .code(65)
        .stderr(contains("[test_id:9999]"));
    Ok(())
}

#[test]
fn find_by_id_without_token_is_data_error() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    suite(temp.path());

    let mut cmd = cli();
    cmd.args(["find", "VM boots", "--by-id", "--search", "walk", "--dir"])
        .arg(temp.path());

    cmd.assert().failure().code(65).stderr(contains("no test id"));
    Ok(())
}

#[test]
fn find_by_name_reports_missing_ginkgo() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    suite(temp.path());
    let config = temp.path().join("testscope.yaml");
    fs::write(&config, "tools:\n  ginkgo: definitely-not-a-ginkgo-binary\n")?;

    let mut cmd = cli();
    cmd.arg("--config")
        .arg(&config)
        .args(["find", "VM boots", "--dir"])
        .arg(temp.path());

    cmd.assert()
        .failure()
        .code(70)
        .stderr(contains("definitely-not-a-ginkgo-binary"));
    Ok(())
}

#[test]
fn unknown_search_backend_is_usage_error() {
    cli()
        .args(["find", "x", "--by-id", "--search", "grep"])
        .assert()
        .failure()
        .code(64);
}
