//! Error types for the command extension framework.
//!
//! Load-time failures are collected per record and per node, joined into an
//! [`ErrorList`], and surfaced once as a warning. Runtime failures of an
//! extension command go through [`RunError`].

use crate::extension::registry::ActionError;
use crate::extension::source::Provenance;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Ordered collection of errors that renders as one joined message.
#[derive(Debug)]
pub struct ErrorList<E>(Vec<E>);

impl<E> ErrorList<E> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: E) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.0.iter()
    }

    /// `Ok(())` when nothing was collected, otherwise the whole list.
    pub fn into_result(self) -> Result<(), Self> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl<E> Default for ErrorList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> From<Vec<E>> for ErrorList<E> {
    fn from(errors: Vec<E>) -> Self {
        Self(errors)
    }
}

impl<E> FromIterator<E> for ErrorList<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<E> IntoIterator for ErrorList<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a ErrorList<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<E: fmt::Display> fmt::Display for ErrorList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for ErrorList<E> {}

/// Listing the external store failed. Disables extensions for the run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("extension source is not configured: {0}")]
    NotConfigured(String),

    #[error("failed to read extension directory {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode manifest {path:?}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("failed to load ConfigMaps from cluster with label {selector}: {message}")]
    Request { selector: String, message: String },

    #[error("not authorized to list ConfigMaps: {0}")]
    Unauthorized(String),

    #[error("invalid label selector '{0}'")]
    InvalidSelector(String),

    #[error("fetching extensions timed out after {0:?}")]
    Timeout(Duration),

    #[error("fetching extensions was cancelled")]
    Cancelled,
}

/// A single store record that could not be turned into a definition.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to parse configmap '{provenance}': missing .data.{key} field")]
    MissingKey { provenance: Provenance, key: String },

    #[error("failed to parse configmap '{provenance}': {message}")]
    Parse {
        provenance: Provenance,
        message: String,
    },

    #[error(
        "failed to validate configmap '{provenance}': extension with rootCommand.name='{name}' already exists"
    )]
    DuplicateName { provenance: Provenance, name: String },
}

/// Structural problem found while validating a definition tree.
///
/// `path` is the node address (`.` or `.subCommands[0].`), `field` the
/// offending field below it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("wrong {path}{field}: {reason}")]
pub struct Violation {
    pub path: String,
    pub field: String,
    pub reason: String,
}

impl Violation {
    pub fn new(path: &str, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failure to parse text into a typed value.
#[derive(Debug, Error)]
pub enum ValueError {
    #[error("invalid int value '{text}': {source}")]
    InvalidInt {
        text: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("invalid bool value '{0}'")]
    InvalidBool(String),

    #[error("failed to read file {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to write a value into the config tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("empty config path")]
    EmptyPath,

    #[error("config path '{0}' contains an empty segment")]
    EmptySegment(String),

    #[error("cannot set '{path}': config root is not a mapping")]
    RootNotMapping { path: String },

    #[error("cannot set '{path}': '{segment}' already holds a non-mapping value")]
    Conflict { path: String, segment: String },
}

/// A node that could not be built. The node is omitted from its parent.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("command '{command}': unsupported action '{action}'")]
    UnknownAction { command: String, action: String },

    #[error("command '{command}': flag '{flag}' has unknown type '{kind}'")]
    UnknownType {
        command: String,
        flag: String,
        kind: String,
    },

    #[error("failed to build flag '{flag}' for '{command}' command: failed to set default value '{default}': {source}")]
    DefaultValue {
        command: String,
        flag: String,
        default: String,
        #[source]
        source: ValueError,
    },

    #[error("failed to build sub-command '{name}':\n{errors}")]
    SubCommand {
        name: String,
        errors: ErrorList<BuildError>,
    },
}

/// Aggregate entry of one pipeline run, attributed to its source record.
#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("failed to validate extension from configmap '{provenance}':\n{violations}")]
    Validation {
        provenance: Provenance,
        violations: ErrorList<Violation>,
    },

    #[error("failed to build extension from configmap '{provenance}':\n{errors}")]
    Build {
        provenance: Provenance,
        errors: ErrorList<BuildError>,
    },
}

/// Failure while invoking an extension command.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("required flag(s) {} not set", quote_all(.0))]
    RequiredFlagsMissing(Vec<String>),

    #[error("accepts at most one argument, received {0}")]
    TooManyArgs(usize),

    #[error("requires exactly one argument, received {0}")]
    ArgCount(usize),

    #[error("invalid argument \"{text}\" for \"--{flag}\" flag: {source}")]
    InvalidFlagValue {
        flag: String,
        text: String,
        #[source]
        source: ValueError,
    },

    #[error("invalid argument \"{text}\": {source}")]
    InvalidArgValue {
        text: String,
        #[source]
        source: ValueError,
    },

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

fn quote_all(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("\"{}\"", name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors surfaced by the host binary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Run(#[from] RunError),

    #[error(transparent)]
    Usage(#[from] clap::Error),

    #[error("{0} extension error(s) found")]
    ExtensionsInvalid(usize),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        CliError::ConfigError(err.to_string())
    }
}
