//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::CliError;

/// Map errors to a string for CLI output. Usage errors carry clap's own rendering.
pub fn map_error(e: &CliError) -> String {
    match e {
        CliError::Usage(err) => err.render().to_string(),
        other => format!("Error: {}", other),
    }
}

/// Process exit code for an error.
pub fn exit_code(e: &CliError) -> i32 {
    match e {
        CliError::Usage(err) => err.exit_code(),
        _ => 1,
    }
}
