//! Directory source: ConfigMap manifests (`*.yaml`, `*.yml`, `*.json`) on disk.
//!
//! A file may hold several YAML documents, and a document may be a `List`.
//! Only ConfigMaps whose labels match the selector are returned.

use super::{ConfigMapObject, ExtensionSource, LabelSelector, RawRecord};
use crate::error::FetchError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_NAMESPACE: &str = "default";
const MANIFEST_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

pub struct DirectorySource {
    root: PathBuf,
    selector: LabelSelector,
}

impl DirectorySource {
    pub fn new(root: PathBuf, selector: LabelSelector) -> Self {
        Self { root, selector }
    }

    fn manifest_files(&self) -> Result<Vec<PathBuf>, FetchError> {
        let io_err = |source| FetchError::Io {
            path: self.root.clone(),
            source,
        };
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.root).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let is_manifest = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| MANIFEST_EXTENSIONS.contains(&e))
                .unwrap_or(false);
            if path.is_file() && is_manifest {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn read_manifest(&self, path: &Path) -> Result<Vec<RawRecord>, FetchError> {
        let content = std::fs::read_to_string(path).map_err(|source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut records = Vec::new();
        for document in serde_yaml::Deserializer::from_str(&content) {
            let object = Option::<ConfigMapObject>::deserialize(document).map_err(|e| {
                FetchError::Decode {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            })?;
            let Some(object) = object else {
                continue;
            };
            self.collect(object, path, &mut records);
        }
        Ok(records)
    }

    fn collect(&self, object: ConfigMapObject, path: &Path, records: &mut Vec<RawRecord>) {
        match object.kind.as_str() {
            "List" | "ConfigMapList" => {
                for item in object.items {
                    self.collect(item, path, records);
                }
            }
            "ConfigMap" => {
                if self.selector.matches(&object.metadata.labels) {
                    records.push(object.into_record(DEFAULT_NAMESPACE));
                } else {
                    debug!(
                        file = %path.display(),
                        configmap = %object.metadata.name,
                        "ConfigMap does not match extension label selector"
                    );
                }
            }
            other => {
                debug!(file = %path.display(), kind = other, "Skipping non-ConfigMap manifest");
            }
        }
    }
}

#[async_trait]
impl ExtensionSource for DirectorySource {
    async fn list_records(&self) -> Result<Vec<RawRecord>, FetchError> {
        let mut records = Vec::new();
        for file in self.manifest_files()? {
            records.extend(self.read_manifest(&file)?);
        }
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}
