//! External store access: raw records and the sources that list them.
//!
//! A record is a ConfigMap-shaped triple of namespace, name and string data.
//! Sources only list; decoding belongs to the loader.

use crate::config::{ExtensionsConfig, SourceKind};
use crate::error::FetchError;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

pub mod directory;
pub mod kube;

pub use directory::DirectorySource;
pub use kube::KubeSource;

/// Identity of the record a definition came from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct Provenance {
    pub namespace: String,
    pub name: String,
}

impl Provenance {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// One record as listed from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub provenance: Provenance,
    pub data: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new(provenance: Provenance, data: BTreeMap<String, String>) -> Self {
        Self { provenance, data }
    }
}

/// Read capability over the external store.
#[async_trait]
pub trait ExtensionSource: Send + Sync {
    /// List every extension record. A failure here disables extensions for the run.
    async fn list_records(&self) -> Result<Vec<RawRecord>, FetchError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Fixed in-memory record list.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<RawRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: RawRecord) {
        self.records.push(record);
    }
}

#[async_trait]
impl ExtensionSource for MemorySource {
    async fn list_records(&self) -> Result<Vec<RawRecord>, FetchError> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("memory ({} records)", self.records.len())
    }
}

/// Equality label selector: `key==value`, `key=value` or bare `key`, comma separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSelector {
    raw: String,
    requirements: Vec<(String, Option<String>)>,
}

impl LabelSelector {
    pub fn parse(raw: &str) -> Result<Self, FetchError> {
        let mut requirements = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = match part.split_once("==").or_else(|| part.split_once('=')) {
                Some((key, value)) => (key.trim(), Some(value.trim().to_string())),
                None => (part, None),
            };
            if key.is_empty() || key.contains('!') {
                return Err(FetchError::InvalidSelector(raw.to_string()));
            }
            requirements.push((key.to_string(), value));
        }
        Ok(Self {
            raw: raw.to_string(),
            requirements,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|(key, value)| match value {
            Some(expected) => labels.get(key) == Some(expected),
            None => labels.contains_key(key),
        })
    }
}

/// Object metadata shared by manifests on disk and API responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// The subset of a ConfigMap the sources read.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ConfigMapObject {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
    #[serde(default)]
    pub items: Vec<ConfigMapObject>,
}

impl ConfigMapObject {
    pub(crate) fn into_record(self, default_namespace: &str) -> RawRecord {
        let namespace = self
            .metadata
            .namespace
            .filter(|ns| !ns.is_empty())
            .unwrap_or_else(|| default_namespace.to_string());
        RawRecord::new(Provenance::new(namespace, self.metadata.name), self.data)
    }
}

/// Open the source selected by configuration. `None` when extensions are
/// configured off.
pub fn open_source(
    config: &ExtensionsConfig,
) -> Result<Option<Box<dyn ExtensionSource>>, FetchError> {
    if config.source == SourceKind::None {
        return Ok(None);
    }
    config
        .validate()
        .map_err(|errors| FetchError::NotConfigured(errors.join("; ")))?;
    let selector = LabelSelector::parse(&config.label_selector)?;
    match config.source {
        SourceKind::None => Ok(None),
        SourceKind::Directory => {
            let dir = config.directory.clone().ok_or_else(|| {
                FetchError::NotConfigured("extensions.directory is not set".to_string())
            })?;
            Ok(Some(Box::new(DirectorySource::new(dir, selector))))
        }
        SourceKind::Kube => Ok(Some(Box::new(KubeSource::new(&config.kube, selector)?))),
    }
}
