//! CLI presentation: text and json formatters for the built-in commands.

use crate::error::{ErrorList, ExtensionError};
use crate::extension::{ActionRegistry, ExtensionCommand, LoadedExtension};
use serde_json::{json, Value};

pub fn format_extension_list_text(extensions: &[LoadedExtension]) -> String {
    if extensions.is_empty() {
        return "No extensions found.".to_string();
    }
    let mut output = String::from("Available Extensions:\n");
    for extension in extensions {
        push_command_text(&mut output, &extension.command, 1);
        output.push_str(&format!("      from: {}\n", extension.provenance));
    }
    output.push_str(&format!("\nTotal: {} extension(s)", extensions.len()));
    output
}

fn push_command_text(output: &mut String, command: &ExtensionCommand, depth: usize) {
    let indent = "  ".repeat(depth);
    let action = command.action_id().unwrap_or("-");
    output.push_str(&format!(
        "{}{:<20} {:<16} {}\n",
        indent,
        command.name(),
        action,
        command.metadata().description
    ));
    for child in command.children() {
        push_command_text(output, child, depth + 1);
    }
}

pub fn format_extension_list_json(extensions: &[LoadedExtension]) -> String {
    let list: Vec<Value> = extensions
        .iter()
        .map(|extension| {
            let mut entry = command_json(&extension.command);
            entry["configmap"] = json!(extension.provenance);
            entry
        })
        .collect();
    let out = json!({ "extensions": list, "total": extensions.len() });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}

fn command_json(command: &ExtensionCommand) -> Value {
    let flags: Vec<Value> = command
        .flags()
        .iter()
        .map(|flag| {
            json!({
                "name": flag.name,
                "type": flag.value.kind().as_str(),
                "required": flag.required,
            })
        })
        .collect();
    let sub_commands: Vec<Value> = command.children().iter().map(command_json).collect();
    json!({
        "name": command.name(),
        "description": command.metadata().description,
        "action": command.action_id(),
        "flags": flags,
        "subCommands": sub_commands,
    })
}

/// Result of `extensions validate`: accepted extensions, then every problem.
pub fn format_validation_report(
    extensions: &[LoadedExtension],
    errors: &ErrorList<ExtensionError>,
) -> String {
    let mut output = String::new();
    for extension in extensions {
        output.push_str(&format!(
            "✓ {} ({})\n",
            extension.command.name(),
            extension.provenance
        ));
    }
    if errors.is_empty() {
        output.push_str(&format!(
            "\nAll {} extension(s) valid",
            extensions.len()
        ));
        return output;
    }
    if !extensions.is_empty() {
        output.push('\n');
    }
    for error in errors.iter() {
        output.push_str(&format!("✗ {}\n", error));
    }
    output.push_str(&format!("\n{} error(s) found", errors.len()));
    output
}

pub fn format_action_list_text(registry: &ActionRegistry) -> String {
    if registry.is_empty() {
        return "No actions registered.".to_string();
    }
    let mut output = String::from("Registered Actions:\n");
    for id in registry.ids() {
        output.push_str(&format!("  {}\n", id));
    }
    output.push_str(&format!("\nTotal: {} action(s)", registry.len()));
    output
}
