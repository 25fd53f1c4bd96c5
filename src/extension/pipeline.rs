//! Extension pipeline: load, validate and build once per process run.
//!
//! Every skipped record, rejected definition or omitted node lands in one
//! aggregate error, shown once as a warning. A failed listing disables
//! extensions for the run and leaves the host's own commands untouched.

use crate::error::{ErrorList, ExtensionError, FetchError};
use crate::extension::builder::CommandBuilder;
use crate::extension::command::ExtensionCommand;
use crate::extension::loader::{Loader, DEFAULT_DATA_KEY};
use crate::extension::registry::ActionRegistry;
use crate::extension::source::{ExtensionSource, Provenance};
use crate::extension::validate::validate;
use std::io::Write;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Host switches and loader settings, parsed once by the host.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Do not contact the store at all.
    pub skip_extensions: bool,
    /// Print the full aggregate error instead of the one-line hint.
    pub show_extensions_error: bool,
    pub data_key: String,
    pub fetch_timeout: Option<Duration>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            skip_extensions: false,
            show_extensions_error: false,
            data_key: DEFAULT_DATA_KEY.to_string(),
            fetch_timeout: None,
        }
    }
}

/// A top-level extension command and the record it came from.
#[derive(Debug)]
pub struct LoadedExtension {
    pub provenance: Provenance,
    pub command: ExtensionCommand,
}

pub struct ExtensionPipeline {
    options: PipelineOptions,
    errors: ErrorList<ExtensionError>,
}

impl ExtensionPipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            errors: ErrorList::new(),
        }
    }

    /// Aggregate of everything skipped during [`build`](Self::build).
    pub fn errors(&self) -> &ErrorList<ExtensionError> {
        &self.errors
    }

    /// Record a store that could not be opened. Extensions stay disabled for
    /// this run, exactly as for a failed listing.
    pub fn record_fetch_error(&mut self, err: FetchError) {
        warn!(error = %err, "Failed to open extension source");
        self.errors.push(err.into());
    }

    /// Load every definition from `source`, validate it and build its command tree.
    pub async fn build(
        &mut self,
        source: &dyn ExtensionSource,
        registry: &ActionRegistry,
        cancel: &CancellationToken,
    ) -> Vec<LoadedExtension> {
        if self.options.skip_extensions {
            info!("Skipping extensions");
            return Vec::new();
        }

        let mut loader = Loader::new(self.options.data_key.clone());
        if let Some(timeout) = self.options.fetch_timeout {
            loader = loader.with_timeout(timeout);
        }

        let loaded = match loader.load(source, cancel).await {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(source = %source.describe(), error = %err, "Failed to fetch extensions");
                self.errors.push(err.into());
                return Vec::new();
            }
        };
        for err in loaded.errors {
            self.errors.push(err.into());
        }

        let builder = CommandBuilder::new(registry);
        let mut extensions = Vec::with_capacity(loaded.definitions.len());
        for entry in loaded.definitions {
            if let Err(violations) = validate(&entry.definition, registry) {
                warn!(configmap = %entry.provenance, "Extension failed validation");
                self.errors.push(ExtensionError::Validation {
                    provenance: entry.provenance,
                    violations,
                });
                continue;
            }

            let output = builder.build(&entry.definition);
            if !output.errors.is_empty() {
                warn!(configmap = %entry.provenance, "Extension built with errors");
                self.errors.push(ExtensionError::Build {
                    provenance: entry.provenance.clone(),
                    errors: output.errors,
                });
            }
            if let Some(command) = output.command {
                extensions.push(LoadedExtension {
                    provenance: entry.provenance,
                    command,
                });
            }
        }

        info!(count = extensions.len(), skipped = self.errors.len(), "Extensions ready");
        extensions
    }

    /// Print the aggregate error, if any, as a warning.
    pub fn display_warnings(&self, out: &mut dyn Write) -> std::io::Result<()> {
        if self.errors.is_empty() {
            return Ok(());
        }
        if self.options.show_extensions_error {
            write!(out, "Extensions Warning:\n{}\n\n", self.errors)
        } else {
            write!(
                out,
                "Extensions Warning:\nfailed to fetch all extensions. Use the '--show-extensions-error' flag to see more details.\n\n"
            )
        }
    }
}
