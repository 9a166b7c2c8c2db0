//! Shell runner tests against a real `bash`

use std::fs;

use hookd::deploy::pipeline::shell_quote;
use hookd::deploy::runner::{CommandRunner, ShellRunner};
use hookd::errors::HookError;

#[tokio::test]
async fn test_environment_does_not_survive_between_commands() {
    let runner = ShellRunner::default();

    runner.run("export HOOKD_MARKER=activated").await.unwrap();
    let out = runner.run("echo \"[${HOOKD_MARKER:-}]\"").await.unwrap();

    assert_eq!(out, "[]\n");
}

#[tokio::test]
async fn test_activation_applies_within_compound_command() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("venv").join("bin");
    fs::create_dir_all(&bin).unwrap();
    let activate = bin.join("activate");
    fs::write(&activate, "export VIRTUAL_ENV=fake-venv\n").unwrap();

    let activate = shell_quote(&activate.to_string_lossy());
    let runner = ShellRunner::default();

    // Standalone activation succeeds but leaves nothing behind
    runner.run(&format!("source {activate}")).await.unwrap();
    let out = runner.run("echo \"[${VIRTUAL_ENV:-}]\"").await.unwrap();
    assert_eq!(out, "[]\n");

    let out = runner
        .run(&format!("source {activate} && echo \"[$VIRTUAL_ENV]\""))
        .await
        .unwrap();
    assert_eq!(out, "[fake-venv]\n");
}

#[tokio::test]
async fn test_missing_activation_script_fails() {
    let dir = tempfile::tempdir().unwrap();
    let activate = dir.path().join("venv/bin/activate");

    let runner = ShellRunner::default();
    let err = runner
        .run(&format!("source {}", shell_quote(&activate.to_string_lossy())))
        .await
        .unwrap_err();

    match err {
        HookError::CommandFailed { code, stderr, .. } => {
            assert_ne!(code, Some(0));
            assert!(stderr.contains("No such file"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_create_dir_only_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("env dir");
    let quoted = shell_quote(&target.to_string_lossy());
    let command = format!("if [ ! -d {quoted} ]; then mkdir {quoted} && echo created; fi");

    let runner = ShellRunner::default();
    assert_eq!(runner.run(&command).await.unwrap(), "created\n");
    assert!(target.is_dir());
    assert_eq!(runner.run(&command).await.unwrap(), "");
}

#[tokio::test]
async fn test_cd_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");

    let runner = ShellRunner::default();
    let result = runner
        .run(&format!("cd {} && echo unreachable", shell_quote(&missing.to_string_lossy())))
        .await;

    assert!(matches!(result, Err(HookError::CommandFailed { .. })));
}
