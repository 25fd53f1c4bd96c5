//! Integration tests for the configuration system

use cmdext::config::{ConfigLoader, SourceKind, DEFAULT_LABEL_SELECTOR};
use cmdext::extension::source::open_source;
use cmdext::error::FetchError;
use tempfile::TempDir;

#[test]
fn test_directory_source_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("config.toml");
    let manifests = temp_dir.path().join("manifests");
    std::fs::create_dir(&manifests).unwrap();
    std::fs::write(
        &config_file,
        format!(
            "[extensions]\nsource = \"directory\"\ndirectory = {:?}\n",
            manifests.to_string_lossy()
        ),
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert_eq!(config.extensions.source, SourceKind::Directory);
    assert_eq!(config.extensions.label_selector, DEFAULT_LABEL_SELECTOR);

    let source = open_source(&config.extensions).unwrap().unwrap();
    assert!(source.describe().contains("manifests"));
}

#[test]
fn test_kube_source_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_file,
        r#"
[extensions]
source = "kube"
label_selector = "team=platform"

[extensions.kube]
server = "https://127.0.0.1:6443"
token = "secret"
namespace = "tools"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert_eq!(config.extensions.source, SourceKind::Kube);
    assert_eq!(config.extensions.kube.namespace.as_deref(), Some("tools"));

    let source = open_source(&config.extensions).unwrap().unwrap();
    assert!(source.describe().contains("127.0.0.1"));
}

#[test]
fn test_no_source_configured() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("config.toml");
    std::fs::write(&config_file, "[logging]\nlevel = \"info\"\n").unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert!(open_source(&config.extensions).unwrap().is_none());
}

#[test]
fn test_bad_label_selector_is_fetch_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_file,
        "[extensions]\nsource = \"directory\"\ndirectory = \"/tmp\"\nlabel_selector = \"!team\"\n",
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert!(matches!(
        open_source(&config.extensions),
        Err(FetchError::InvalidSelector(_))
    ));
}

#[test]
fn test_exclusive_token_settings_fail_at_open() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_file,
        r#"
[extensions]
source = "kube"

[extensions.kube]
server = "https://127.0.0.1:6443"
token = "secret"
token_file = "/var/run/token"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    match open_source(&config.extensions) {
        Err(FetchError::NotConfigured(reason)) => assert!(reason.contains("exclusive")),
        other => panic!("unexpected result: {:?}", other.map(|s| s.map(|s| s.describe()))),
    }
}
