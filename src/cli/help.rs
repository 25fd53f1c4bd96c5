//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::{Commands, ExtensionsCommands};

/// Built-in top-level command names. Extensions with these names can never be reached.
pub const BUILTIN_COMMANDS: &[&str] = &["extensions", "actions", "help"];

/// Command name string for log spans (e.g. "extensions.list", "ext.greet").
pub fn command_name(command: Option<&Commands>) -> String {
    match command {
        None | Some(Commands::Help { .. }) => "help".to_string(),
        Some(Commands::Extensions { command }) => {
            format!("extensions.{}", extensions_command_name(command))
        }
        Some(Commands::Actions) => "actions".to_string(),
        Some(Commands::External(args)) => match args.first() {
            Some(name) => format!("ext.{}", name),
            None => "ext".to_string(),
        },
    }
}

/// Command path that `--help` applies to, e.g. `["extensions", "list"]`.
/// For extension commands the path stops at the first option.
pub fn help_path(command: &Commands) -> Vec<String> {
    match command {
        Commands::Extensions { command } => vec![
            "extensions".to_string(),
            extensions_command_name(command).to_string(),
        ],
        Commands::Actions => vec!["actions".to_string()],
        Commands::Help { command } => command.clone(),
        Commands::External(args) => args
            .iter()
            .take_while(|arg| !arg.starts_with('-'))
            .cloned()
            .collect(),
    }
}

pub fn extensions_command_name(command: &ExtensionsCommands) -> &'static str {
    match command {
        ExtensionsCommands::List { .. } => "list",
        ExtensionsCommands::Validate => "validate",
    }
}

/// Whether an extension named `name` would be shadowed by a built-in command.
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_COMMANDS.contains(&name)
}
