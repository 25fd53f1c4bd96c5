//! cmdext: Runtime Command Extensions
//!
//! Lets a CLI gain commands at runtime from declarative definitions kept in
//! an external store. Definitions are validated, turned into a command tree
//! and wired to actions the host registered ahead of time.

pub mod actions;
pub mod cli;
pub mod config;
pub mod error;
pub mod extension;
pub mod logging;
