//! Configuration System
//!
//! Host configuration: where extensions come from and how logging behaves.
//! Layered with the `config` crate: defaults, global file, explicit file,
//! then `CMDEXT__*` environment variables.

use crate::error::CliError;
use crate::extension::loader::DEFAULT_DATA_KEY;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod merge;
mod sources;

pub use sources::global_file::global_config_path;

/// Label selecting extension ConfigMaps.
pub const DEFAULT_LABEL_SELECTOR: &str = "kyma-cli/extension==commands";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub extensions: ExtensionsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which store extensions are listed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    None,
    Directory,
    Kube,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionsConfig {
    #[serde(default)]
    pub source: SourceKind,

    /// Manifest directory for the `directory` source
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Record key holding the definition YAML
    #[serde(default = "default_data_key")]
    pub data_key: String,

    #[serde(default = "default_label_selector")]
    pub label_selector: String,

    /// Upper bound for listing the store, in seconds (0 disables)
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default)]
    pub kube: KubeConfig,
}

/// API server access for the `kube` source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KubeConfig {
    pub server: Option<String>,

    #[serde(skip_serializing)]
    pub token: Option<String>,

    pub token_file: Option<PathBuf>,

    /// Namespace to list; all namespaces when unset
    pub namespace: Option<String>,

    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}

fn default_data_key() -> String {
    DEFAULT_DATA_KEY.to_string()
}

fn default_label_selector() -> String {
    DEFAULT_LABEL_SELECTOR.to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            directory: None,
            data_key: default_data_key(),
            label_selector: default_label_selector(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            kube: KubeConfig::default(),
        }
    }
}

impl ExtensionsConfig {
    pub fn fetch_timeout(&self) -> Option<Duration> {
        if self.fetch_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.fetch_timeout_secs))
        }
    }

    /// Validate the extensions configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.data_key.is_empty() {
            errors.push("extensions.data_key cannot be empty".to_string());
        }
        match self.source {
            SourceKind::Directory if self.directory.is_none() => {
                errors.push("extensions.directory is required for the directory source".to_string());
            }
            SourceKind::Kube if self.kube.server.as_deref().unwrap_or("").is_empty() => {
                errors.push("extensions.kube.server is required for the kube source".to_string());
            }
            _ => {}
        }
        if self.kube.token.is_some() && self.kube.token_file.is_some() {
            errors.push("extensions.kube.token and extensions.kube.token_file are exclusive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Loads [`CliConfig`] from its layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration: defaults, global file, `explicit` file, environment.
    pub fn load(explicit: Option<&Path>) -> Result<CliConfig, CliError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = match explicit {
            Some(path) => sources::explicit_file::add_to_builder(builder, path)?,
            None => builder,
        };
        let builder = sources::environment::add_to_builder(builder);

        // Extension settings are checked when the store is opened, so a bad
        // store config only disables extensions.
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Load only from `path` on top of defaults.
    pub fn load_from_file(path: &Path) -> Result<CliConfig, CliError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::explicit_file::add_to_builder(builder, path)?;
        Ok(builder.build()?.try_deserialize()?)
    }
}
