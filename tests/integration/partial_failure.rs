//! Bad records and bad definitions never take well-formed siblings down.

use super::test_utils::{capture_registry, record};
use cmdext::error::{ExtensionError, RecordError};
use cmdext::extension::{ExtensionPipeline, Loader, MemorySource, PipelineOptions, RawRecord};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

fn named(name: &str) -> String {
    format!("metadata:\n  name: {}\nuses: capture\n", name)
}

#[tokio::test]
async fn test_malformed_records_are_skipped_individually() {
    let mut records = Vec::new();
    for i in 0..5 {
        records.push(record("default", &format!("good-{}", i), &named(&format!("cmd{}", i))));
    }
    records.push(record("default", "bad-yaml", "metadata: [unclosed"));
    records.push(RawRecord::new(
        cmdext::extension::Provenance::new("default", "no-key"),
        BTreeMap::new(),
    ));

    let loaded = Loader::default()
        .load(&MemorySource::new(records), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(loaded.definitions.len(), 5);
    assert_eq!(loaded.errors.len(), 2);
    assert!(loaded.errors.iter().any(|e| matches!(e, RecordError::MissingKey { .. })));
    assert!(loaded
        .errors
        .to_string()
        .contains("failed to parse configmap 'default/no-key': missing .data.kyma-commands.yaml field"));
}

#[tokio::test]
async fn test_duplicate_names_first_seen_wins() {
    // Listed out of order; provenance order decides which one is first
    let records = vec![
        record("zeta", "greet", &named("greet")),
        record("alpha", "greet", &named("greet")),
        record("alpha", "other-greet", &named("greet")),
    ];
    let loaded = Loader::default().decode_records(records);
    assert_eq!(loaded.definitions.len(), 1);
    assert_eq!(loaded.definitions[0].provenance.to_string(), "alpha/greet");
    assert_eq!(loaded.errors.len(), 2);
    assert!(loaded
        .errors
        .iter()
        .all(|e| matches!(e, RecordError::DuplicateName { name, .. } if name == "greet")));
}

#[tokio::test]
async fn test_unresolvable_action_excluded_sibling_kept() {
    let (registry, _) = capture_registry("capture");
    let source = MemorySource::new(vec![
        record("default", "broken", "metadata:\n  name: broken\nuses: nonexistent\n"),
        record("default", "fine", &named("fine")),
    ]);
    let mut pipeline = ExtensionPipeline::new(PipelineOptions::default());
    let extensions = pipeline
        .build(&source, &registry, &CancellationToken::new())
        .await;

    let names: Vec<_> = extensions.iter().map(|e| e.command.name()).collect();
    assert_eq!(names, vec!["fine"]);
    assert_eq!(pipeline.errors().len(), 1);
    assert!(matches!(
        pipeline.errors().iter().next(),
        Some(ExtensionError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_validation_collects_every_violation() {
    let yaml = r#"
metadata:
  name: ""
uses: nonexistent
flags:
  - type: float
    name: ratio
args:
  type: string
subCommands:
  - metadata:
      name: child
    uses: also-missing
"#;
    let (registry, _) = capture_registry("capture");
    let source = MemorySource::new(vec![record("default", "messy", yaml)]);
    let mut pipeline = ExtensionPipeline::new(PipelineOptions {
        show_extensions_error: true,
        ..PipelineOptions::default()
    });
    let extensions = pipeline
        .build(&source, &registry, &CancellationToken::new())
        .await;
    assert!(extensions.is_empty());

    let text = pipeline.errors().to_string();
    assert!(text.contains("wrong .uses: unsupported value 'nonexistent'"), "{}", text);
    assert!(text.contains("wrong .metadata: empty name"), "{}", text);
    assert!(text.contains("wrong .flags[0]: unknown type 'float'"), "{}", text);
    assert!(text.contains("wrong .flags[0]: empty configPath"), "{}", text);
    assert!(text.contains("wrong .args: empty configPath"), "{}", text);
    assert!(
        text.contains("wrong .subCommands[0].uses: unsupported value 'also-missing'"),
        "{}",
        text
    );
}
