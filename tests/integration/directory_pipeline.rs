//! Extensions listed from a manifest directory, run through the host CLI.

use clap::Parser;
use cmdext::actions::builtin_registry;
use cmdext::cli::{Cli, RunContext};
use cmdext::config::{CliConfig, SourceKind};
use cmdext::error::CliError;
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const HELLO: &str = r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: hello
  namespace: tools
  labels:
    kyma-cli/extension: commands
data:
  kyma-commands.yaml: |
    metadata:
      name: hello
      description: print a greeting
    uses: message_print
    config:
      prefix: "hello, "
    args:
      type: string
      configPath: message
"#;

const UNLABELED: &str = r#"
kind: ConfigMap
metadata:
  name: ignored
data:
  kyma-commands.yaml: |
    metadata:
      name: ignored
"#;

fn context(dir: &Path) -> RunContext {
    let mut config = CliConfig::default();
    config.extensions.source = SourceKind::Directory;
    config.extensions.directory = Some(dir.to_path_buf());
    RunContext::new(config, builtin_registry(), CancellationToken::new())
}

async fn run(ctx: &RunContext, argv: &[&str]) -> (Result<(), CliError>, String, String) {
    let cli = Cli::try_parse_from(argv).unwrap();
    let mut out = Vec::new();
    let mut err = Vec::new();
    let result = ctx.execute(&cli, &mut out, &mut err).await;
    (
        result,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

#[tokio::test]
async fn test_directory_extension_runs() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("hello.yaml"), HELLO).unwrap();
    std::fs::write(temp.path().join("ignored.yaml"), UNLABELED).unwrap();

    let ctx = context(temp.path());
    let (result, out, err) = run(&ctx, &["cmdext", "hello", "world"]).await;
    result.unwrap();
    assert_eq!(out, "hello, world\n");
    assert!(err.is_empty(), "{}", err);

    let (result, out, _) = run(&ctx, &["cmdext", "extensions", "list", "--format", "json"]).await;
    result.unwrap();
    let listed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(listed["total"], 1);
    assert_eq!(listed["extensions"][0]["name"], "hello");
    assert_eq!(listed["extensions"][0]["configmap"]["namespace"], "tools");
}

#[tokio::test]
async fn test_argument_count_enforced() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("hello.yaml"), HELLO).unwrap();
    let ctx = context(temp.path());

    let (result, _, _) = run(&ctx, &["cmdext", "hello"]).await;
    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "requires exactly one argument, received 0");

    let (result, _, _) = run(&ctx, &["cmdext", "hello", "a", "b"]).await;
    assert_eq!(
        result.unwrap_err().to_string(),
        "requires exactly one argument, received 2"
    );
}

#[tokio::test]
async fn test_missing_directory_degrades_to_builtins() {
    let temp = TempDir::new().unwrap();
    let ctx = context(&temp.path().join("absent"));

    let (result, out, err) = run(&ctx, &["cmdext", "actions"]).await;
    result.unwrap();
    assert!(out.contains("config_print"));
    assert!(err.is_empty());

    let (result, out, err) = run(&ctx, &["cmdext", "extensions", "list"]).await;
    result.unwrap();
    assert!(out.contains("No extensions found."));
    assert!(err.contains("Use the '--show-extensions-error' flag"), "{}", err);

    let (result, _, err) =
        run(&ctx, &["cmdext", "--show-extensions-error", "extensions", "list"]).await;
    result.unwrap();
    assert!(err.contains("failed to read extension directory"), "{}", err);
}
