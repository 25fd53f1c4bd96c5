//! CLI domain: parse, route, help, output, and presentation only.
//! Built-in commands go through one route table; every other command is
//! dispatched to the extension tree.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::{command_name, help_path, is_builtin, BUILTIN_COMMANDS};
pub use output::{exit_code, map_error};
pub use parse::{Cli, Commands, ExtensionsCommands, HostSwitches};
pub use presentation::{
    format_action_list_text, format_extension_list_json, format_extension_list_text,
    format_validation_report,
};
pub use route::RunContext;
