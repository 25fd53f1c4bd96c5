//! Loader: store records to definitions.
//!
//! A failed listing is fatal and returned as one [`FetchError`]. Per-record
//! problems never abort the batch; they are collected and the record skipped.

use crate::error::{ErrorList, FetchError, RecordError};
use crate::extension::definition::Definition;
use crate::extension::source::{ExtensionSource, Provenance, RawRecord};
use std::collections::HashSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Record data key holding the definition YAML.
pub const DEFAULT_DATA_KEY: &str = "kyma-commands.yaml";

/// A decoded definition and the record it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDefinition {
    pub provenance: Provenance,
    pub definition: Definition,
}

/// Accepted definitions plus every skipped record.
#[derive(Debug, Default)]
pub struct LoadOutput {
    pub definitions: Vec<LoadedDefinition>,
    pub errors: ErrorList<RecordError>,
}

pub struct Loader {
    data_key: String,
    timeout: Option<Duration>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_KEY)
    }
}

impl Loader {
    pub fn new(data_key: impl Into<String>) -> Self {
        Self {
            data_key: data_key.into(),
            timeout: None,
        }
    }

    /// Bound the listing call; expiry is reported as [`FetchError::Timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// List the store and decode every record.
    pub async fn load(
        &self,
        source: &dyn ExtensionSource,
        cancel: &CancellationToken,
    ) -> Result<LoadOutput, FetchError> {
        debug!(source = %source.describe(), "Listing extension records");
        let records = self.fetch(source, cancel).await?;
        Ok(self.decode_records(records))
    }

    async fn fetch(
        &self,
        source: &dyn ExtensionSource,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawRecord>, FetchError> {
        let listing = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, source.list_records())
                    .await
                    .map_err(|_| FetchError::Timeout(limit))?,
                None => source.list_records().await,
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            result = listing => result,
        }
    }

    /// Decode records in provenance order; the first definition with a given
    /// name wins.
    pub fn decode_records(&self, mut records: Vec<RawRecord>) -> LoadOutput {
        records.sort_by(|a, b| a.provenance.cmp(&b.provenance));

        let mut output = LoadOutput::default();
        let mut seen: HashSet<String> = HashSet::new();
        for record in records {
            let definition = match self.decode_record(&record) {
                Ok(definition) => definition,
                Err(err) => {
                    warn!(configmap = %record.provenance, error = %err, "Skipping extension record");
                    output.errors.push(err);
                    continue;
                }
            };

            if !seen.insert(definition.metadata.name.clone()) {
                let err = RecordError::DuplicateName {
                    provenance: record.provenance.clone(),
                    name: definition.metadata.name.clone(),
                };
                warn!(configmap = %record.provenance, error = %err, "Skipping extension record");
                output.errors.push(err);
                continue;
            }

            debug!(configmap = %record.provenance, extension = %definition.metadata.name, "Loaded extension definition");
            output.definitions.push(LoadedDefinition {
                provenance: record.provenance,
                definition,
            });
        }
        output
    }

    fn decode_record(&self, record: &RawRecord) -> Result<Definition, RecordError> {
        let text = record
            .data
            .get(&self.data_key)
            .ok_or_else(|| RecordError::MissingKey {
                provenance: record.provenance.clone(),
                key: self.data_key.clone(),
            })?;
        Definition::from_yaml(text).map_err(|e| RecordError::Parse {
            provenance: record.provenance.clone(),
            message: e.to_string(),
        })
    }
}
