//! Command-line behaviour that needs no network access.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

/// `nfx` running in `workdir`, with the user config location moved there too.
fn nfx(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nfx").unwrap();
    cmd.current_dir(workdir)
        .env("HOME", workdir)
        .env("XDG_CONFIG_HOME", workdir.join(".config"))
        .env_remove("RUST_LOG")
        .env("OPENAI_API_KEY", "sk-test");
    cmd
}

#[test]
fn config_init_then_get_and_set() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("conf").join("nfx.json");
    let config_arg = config.to_str().unwrap();

    nfx(dir.path())
        .args(["--no-log-file", "--config", config_arg, "config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    assert!(config.is_file());

    nfx(dir.path())
        .args(["--no-log-file", "--config", config_arg, "config", "get", "completion.model"])
        .assert()
        .success()
        .stdout("gpt-4o-mini\n");

    nfx(dir.path())
        .args([
            "--no-log-file",
            "--config",
            config_arg,
            "config",
            "set",
            "extraction.max_text_chars",
            "4000",
        ])
        .assert()
        .success();

    nfx(dir.path())
        .args(["--no-log-file", "--config", config_arg, "config", "get", "extraction.max_text_chars"])
        .assert()
        .success()
        .stdout("4000\n");
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nfx.json");
    fs::write(&config, "{}").unwrap();

    nfx(dir.path())
        .args(["--no-log-file", "--config", config.to_str().unwrap(), "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn config_rejects_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nfx.json");
    let config_arg = config.to_str().unwrap();

    nfx(dir.path())
        .args(["--no-log-file", "--config", config_arg, "config", "set", "completion.colour", "red"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
    assert!(!config.exists());
}

#[test]
fn batch_on_missing_folder_fails() {
    let dir = tempfile::tempdir().unwrap();

    nfx(dir.path())
        .args(["--no-log-file", "batch", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Folder not found"));
}

#[test]
fn batch_on_folder_without_pdfs_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notas");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("leia-me.txt"), "sem notas").unwrap();

    nfx(dir.path())
        .args(["--no-log-file", "batch", "notas", "--output", "out/res.csv", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No .pdf files found"));

    assert!(!dir.path().join("out").exists());
}

#[test]
fn error_log_file_is_created() {
    let dir = tempfile::tempdir().unwrap();

    nfx(dir.path())
        .args(["--config", "nfx.json", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"));

    assert!(dir.path().join("logs").join("nfx-errors.log").is_file());
}

#[test]
fn process_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();

    nfx(dir.path())
        .args(["--no-log-file", "process", "nota.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn defaults_ignore_config_outside_workdir() {
    let dir = tempfile::tempdir().unwrap();

    nfx(dir.path())
        .args(["--no-log-file", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(dir.path().to_str().unwrap()));
}

#[test]
fn error_log_keeps_only_errors() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("vazia")).unwrap();
    fs::write(dir.path().join("corrupt.pdf"), "isto nao e um pdf").unwrap();

    // Emits a WARN (no documents) that must stay out of the file
    nfx(dir.path())
        .args(["--log-file", "logs/erros.log", "batch", "vazia", "--quiet"])
        .assert()
        .success();

    nfx(dir.path())
        .args(["--log-file", "logs/erros.log", "process", "corrupt.pdf", "--text-only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No text extracted"));

    let log = fs::read_to_string(dir.path().join("logs").join("erros.log")).unwrap();
    let first = log.lines().next().unwrap_or_default();

    // timestamp, level, message
    assert!(first.starts_with(|c: char| c.is_ascii_digit()), "{}", log);
    assert!(first.contains("ERROR"), "{}", log);
    assert!(first.contains("Failed to extract text"), "{}", log);
    assert!(log.contains("corrupt.pdf"));
    assert!(!log.contains("WARN"));
    assert!(!log.contains('\u{1b}'));
}
