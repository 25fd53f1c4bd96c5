//! Host switches and dispatch through `RunContext` with an in-memory store.

use super::test_utils::{capture_registry, record};
use clap::Parser;
use cmdext::cli::{Cli, RunContext};
use cmdext::config::CliConfig;
use cmdext::error::{CliError, RunError};
use cmdext::extension::MemorySource;
use tokio_util::sync::CancellationToken;

const GREET: &str = r#"
metadata:
  name: greet
uses: greet_action
flags:
  - type: string
    name: name
    shorthand: n
    configPath: spec.name
    required: true
  - type: bool
    name: loud
    configPath: spec.loud
"#;

#[tokio::test]
async fn test_required_flag_gate_through_host() {
    let (registry, captured) = capture_registry("greet_action");
    let ctx = RunContext::new(CliConfig::default(), registry, CancellationToken::new())
        .with_source(Box::new(MemorySource::new(vec![record("default", "greet", GREET)])));

    let cli = Cli::try_parse_from(["cmdext", "greet"]).unwrap();
    let result = ctx.execute(&cli, &mut Vec::new(), &mut Vec::new()).await;
    assert!(matches!(
        result,
        Err(CliError::Run(RunError::RequiredFlagsMissing(_)))
    ));
    assert!(captured.lock().unwrap().is_empty());

    let cli = Cli::try_parse_from(["cmdext", "greet", "-n", "Ada", "--loud"]).unwrap();
    ctx.execute(&cli, &mut Vec::new(), &mut Vec::new())
        .await
        .unwrap();
    let as_json = serde_json::to_value(&captured.lock().unwrap()[0]).unwrap();
    assert_eq!(
        as_json,
        serde_json::json!({ "spec": { "name": "Ada", "loud": true } })
    );
}

#[tokio::test]
async fn test_explicit_bool_value_needs_equals() {
    let (registry, captured) = capture_registry("greet_action");
    let ctx = RunContext::new(CliConfig::default(), registry, CancellationToken::new())
        .with_source(Box::new(MemorySource::new(vec![record("default", "greet", GREET)])));

    let cli = Cli::try_parse_from(["cmdext", "greet", "--name", "Ada", "--loud=false"]).unwrap();
    ctx.execute(&cli, &mut Vec::new(), &mut Vec::new())
        .await
        .unwrap();
    let as_json = serde_json::to_value(&captured.lock().unwrap()[0]).unwrap();
    assert_eq!(as_json["spec"]["loud"], false);
}

#[tokio::test]
async fn test_invalid_flag_value_is_reported() {
    let yaml = r#"
metadata:
  name: scale
uses: greet_action
flags:
  - type: int
    name: replicas
    configPath: spec.replicas
"#;
    let (registry, _) = capture_registry("greet_action");
    let ctx = RunContext::new(CliConfig::default(), registry, CancellationToken::new())
        .with_source(Box::new(MemorySource::new(vec![record("default", "scale", yaml)])));

    let cli = Cli::try_parse_from(["cmdext", "scale", "--replicas", "many"]).unwrap();
    let err = ctx
        .execute(&cli, &mut Vec::new(), &mut Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CliError::Run(RunError::InvalidFlagValue { ref flag, .. }) if flag == "replicas"
    ));
}

#[tokio::test]
async fn test_skip_extensions_leaves_builtins_working() {
    let (registry, _) = capture_registry("greet_action");
    let ctx = RunContext::new(CliConfig::default(), registry, CancellationToken::new())
        .with_source(Box::new(MemorySource::new(vec![record("default", "greet", GREET)])));

    let cli = Cli::try_parse_from(["cmdext", "--skip-extensions", "extensions", "list"]).unwrap();
    let mut out = Vec::new();
    ctx.execute(&cli, &mut out, &mut Vec::new()).await.unwrap();
    assert!(String::from_utf8(out).unwrap().contains("No extensions found."));

    let cli = Cli::try_parse_from(["cmdext", "actions"]).unwrap();
    let mut out = Vec::new();
    ctx.execute(&cli, &mut out, &mut Vec::new()).await.unwrap();
    assert!(String::from_utf8(out).unwrap().contains("greet_action"));
}

#[tokio::test]
async fn test_path_flag_passes_file_content() {
    let yaml = r#"
metadata:
  name: apply
uses: greet_action
flags:
  - type: path
    name: body
    configPath: body
"#;
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("body.txt");
    std::fs::write(&file, "hello").unwrap();

    let (registry, captured) = capture_registry("greet_action");
    let ctx = RunContext::new(CliConfig::default(), registry, CancellationToken::new())
        .with_source(Box::new(MemorySource::new(vec![record("default", "apply", yaml)])));

    let cli = Cli::try_parse_from(["cmdext", "apply", "--body", file.to_str().unwrap()]).unwrap();
    ctx.execute(&cli, &mut Vec::new(), &mut Vec::new())
        .await
        .unwrap();
    let as_json = serde_json::to_value(&captured.lock().unwrap()[0]).unwrap();
    assert_eq!(as_json, serde_json::json!({ "body": "hello" }));

    let missing = dir.path().join("absent.txt");
    let cli =
        Cli::try_parse_from(["cmdext", "apply", "--body", missing.to_str().unwrap()]).unwrap();
    let err = ctx
        .execute(&cli, &mut Vec::new(), &mut Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CliError::Run(RunError::InvalidFlagValue { ref flag, .. }) if flag == "body"
    ));
    assert_eq!(captured.lock().unwrap().len(), 1);
}
