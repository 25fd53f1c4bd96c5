//! Load, validate, build and run one extension through the whole pipeline.

use super::test_utils::{capture_registry, record};
use cmdext::error::RunError;
use cmdext::extension::{ExtensionPipeline, MemorySource, PipelineOptions};
use tokio_util::sync::CancellationToken;

const GREET: &str = r#"
metadata:
  name: greet
  description: greet someone
uses: greet_action
flags:
  - type: string
    name: name
    description: who to greet
    configPath: spec.name
    required: true
"#;

#[tokio::test]
async fn test_greet_requires_name_then_binds_it() {
    let (registry, captured) = capture_registry("greet_action");
    let source = MemorySource::new(vec![record("default", "greet", GREET)]);

    let mut pipeline = ExtensionPipeline::new(PipelineOptions::default());
    let extensions = pipeline
        .build(&source, &registry, &CancellationToken::new())
        .await;
    assert!(pipeline.errors().is_empty(), "{}", pipeline.errors());
    assert_eq!(extensions.len(), 1);

    let greet = &extensions[0].command;
    assert_eq!(greet.name(), "greet");
    assert_eq!(greet.required_flags().collect::<Vec<_>>(), vec!["name"]);

    // Without --name the gate fails before the action runs
    let matches = greet.to_clap().try_get_matches_from(["greet"]).unwrap();
    let mut out = Vec::new();
    let err = greet.execute(&matches, &mut out).unwrap_err();
    assert!(matches!(err, RunError::RequiredFlagsMissing(ref names) if names == &["name"]));
    assert_eq!(err.to_string(), "required flag(s) \"name\" not set");
    assert!(captured.lock().unwrap().is_empty());

    let matches = greet
        .to_clap()
        .try_get_matches_from(["greet", "--name", "Ada"])
        .unwrap();
    greet.execute(&matches, &mut out).unwrap();

    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    let as_json = serde_json::to_value(&captured[0]).unwrap();
    assert_eq!(as_json, serde_json::json!({ "spec": { "name": "Ada" } }));
}

#[tokio::test]
async fn test_seed_config_is_kept_and_defaults_bound() {
    let yaml = r#"
metadata:
  name: deploy
uses: capture
config:
  spec:
    replicas: 1
    image: nginx
flags:
  - type: int
    name: replicas
    configPath: spec.replicas
    default: "3"
  - type: bool
    name: dry-run
    configPath: options.dryRun
args:
  type: string
  optional: true
  configPath: metadata.name
"#;
    let (registry, captured) = capture_registry("capture");
    let source = MemorySource::new(vec![record("default", "deploy", yaml)]);
    let mut pipeline = ExtensionPipeline::new(PipelineOptions::default());
    let extensions = pipeline
        .build(&source, &registry, &CancellationToken::new())
        .await;
    let deploy = &extensions[0].command;

    let matches = deploy
        .to_clap()
        .try_get_matches_from(["deploy", "web", "--dry-run"])
        .unwrap();
    deploy.execute(&matches, &mut Vec::new()).unwrap();

    let as_json = serde_json::to_value(&captured.lock().unwrap()[0]).unwrap();
    assert_eq!(
        as_json,
        serde_json::json!({
            "spec": { "replicas": 3, "image": "nginx" },
            "options": { "dryRun": true },
            "metadata": { "name": "web" }
        })
    );
}

#[tokio::test]
async fn test_subcommand_runs_with_its_own_config() {
    let yaml = r#"
metadata:
  name: tools
subCommands:
  - metadata:
      name: echo
    uses: capture
    config:
      kind: echo
    args:
      type: string
      configPath: text
"#;
    let (registry, captured) = capture_registry("capture");
    let source = MemorySource::new(vec![record("default", "tools", yaml)]);
    let mut pipeline = ExtensionPipeline::new(PipelineOptions::default());
    let extensions = pipeline
        .build(&source, &registry, &CancellationToken::new())
        .await;
    let tools = &extensions[0].command;
    assert!(tools.action_id().is_none());

    let matches = tools
        .to_clap()
        .try_get_matches_from(["tools", "echo", "hi"])
        .unwrap();
    tools.execute(&matches, &mut Vec::new()).unwrap();
    let as_json = serde_json::to_value(&captured.lock().unwrap()[0]).unwrap();
    assert_eq!(as_json, serde_json::json!({ "kind": "echo", "text": "hi" }));

    // Group node prints help instead of failing
    let matches = tools.to_clap().try_get_matches_from(["tools"]).unwrap();
    let mut out = Vec::new();
    tools.execute(&matches, &mut out).unwrap();
    assert!(String::from_utf8(out).unwrap().contains("echo"));
}
