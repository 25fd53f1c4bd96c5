//! Runtime command extensions.
//!
//! Extensions are declarative command definitions kept in an external store.
//! Each one names a pre-registered action and binds its flags and positional
//! argument into the config tree that action receives. Nothing fetched from
//! the store is executed as code.
//!
//! Flow: [`source`] lists records, [`loader`] decodes them, [`validate`]
//! checks each definition, [`builder`] turns it into an [`ExtensionCommand`].
//! [`pipeline`] runs all of it once per process.

pub mod builder;
pub mod command;
pub mod config_tree;
pub mod definition;
pub mod loader;
pub mod pipeline;
pub mod registry;
pub mod source;
pub mod validate;
pub mod value;

pub use builder::{BuildOutput, CommandBuilder};
pub use command::{ArgRule, BoundArgs, BoundFlag, ExtensionCommand};
pub use config_tree::{ConfigNode, Scalar};
pub use definition::{ArgsDefinition, Definition, FlagDefinition, Metadata, ParamType};
pub use loader::{LoadOutput, LoadedDefinition, Loader, DEFAULT_DATA_KEY};
pub use pipeline::{ExtensionPipeline, LoadedExtension, PipelineOptions};
pub use registry::{Action, ActionError, ActionFactory, ActionRegistry};
pub use source::{ExtensionSource, LabelSelector, MemorySource, Provenance, RawRecord};
pub use value::{TypedValue, ValueKind};
