use assert_cmd::Command; // Bring Command into scope
use predicates::prelude::*; // Bring predicate traits into scope
use tempfile::tempdir;

#[test]
fn test_ping_command() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("appkit")?;
    cmd.arg("--ping");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("pong"));

    Ok(())
}

#[test]
fn test_no_args_runs_full_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("appkit")?;

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Initializing application..."))
        .stdout(predicate::str::contains("files: booted"))
        .stdout(predicate::str::contains("Shutting down application..."))
        .stdout(predicate::str::contains("pong").not());

    Ok(())
}

#[test]
fn test_services_lists_files_identifiers() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("appkit")?;
    cmd.arg("services");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("files::APIController"))
        .stdout(predicate::str::contains("files::TagService"))
        .stdout(predicate::str::contains("files::AppName"));

    Ok(())
}

#[test]
fn test_capabilities_prints_document() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("appkit")?;
    cmd.arg("capabilities");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"bigfilechunking\": true"))
        .stdout(predicate::str::contains(".htaccess"));

    Ok(())
}

#[test]
fn test_config_file_sets_init_params() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("host.json");
    std::fs::write(
        &path,
        r#"{ "log_level": "warn", "apps": { "files": { "blacklisted_files": ["desktop.ini"] } } }"#,
    )?;

    let mut cmd = Command::cargo_bin("appkit")?;
    cmd.arg("--config").arg(&path).arg("capabilities");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("desktop.ini"))
        .stdout(predicate::str::contains(".htaccess").not());

    Ok(())
}

#[test]
fn test_missing_config_file_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let mut cmd = Command::cargo_bin("appkit")?;
    cmd.arg("--config").arg(dir.path().join("absent.json")).arg("boot");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));

    Ok(())
}

#[test]
fn test_boot_reports_registrations() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("appkit")?;
    cmd.arg("boot");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("App 'files': booted"))
        .stdout(predicate::str::contains("FileResourceProvider"))
        .stdout(predicate::str::contains("FilesNotifier"));

    Ok(())
}

#[test]
fn test_publish_load_sidebar_queues_script() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("appkit")?;
    cmd.args(["publish", "load-sidebar"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("files/sidebar"));

    Ok(())
}

#[test]
fn test_publish_load_scripts_reaches_legacy_subscribers() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("appkit")?;
    cmd.args(["publish", "load-scripts"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Received legacy event 'files.load_additional_scripts'"))
        .stdout(predicate::str::contains("files/sidebar").not());

    Ok(())
}
