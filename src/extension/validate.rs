//! Structural validation of definition trees.
//!
//! Every check runs; findings are tagged with the node path (`.` for the
//! root, `.subCommands[i].` below it) and returned together.

use crate::error::{ErrorList, Violation};
use crate::extension::config_tree::ConfigNode;
use crate::extension::definition::{Definition, ParamType};
use crate::extension::registry::ActionRegistry;
use std::collections::HashSet;

/// Flag, shorthand and subcommand names owned by the host parser.
const RESERVED_NAME: &str = "help";
const RESERVED_SHORTHAND: char = 'h';

/// Validate `definition` and all of its subcommands against `registry`.
pub fn validate(definition: &Definition, registry: &ActionRegistry) -> Result<(), ErrorList<Violation>> {
    let mut violations = ErrorList::new();
    validate_at(definition, ".", registry, &mut violations);
    violations.into_result()
}

fn validate_at(
    definition: &Definition,
    path: &str,
    registry: &ActionRegistry,
    violations: &mut ErrorList<Violation>,
) {
    if let Some(action) = definition.action_id() {
        if !registry.contains(action) {
            violations.push(Violation::new(
                path,
                "uses",
                format!("unsupported value '{}'", action),
            ));
        }
    }

    if definition.metadata.name.is_empty() {
        violations.push(Violation::new(path, "metadata", "empty name"));
    }

    if let Some(config) = &definition.config {
        if !matches!(config, ConfigNode::Mapping(_)) {
            violations.push(Violation::new(path, "config", "must be a mapping"));
        }
    }

    if let Some(args) = &definition.args {
        check_param(path, "args", &args.param_type, &args.config_path, violations);
    }

    let mut names = HashSet::new();
    let mut shorthands = HashSet::new();
    for (i, flag) in definition.flags.iter().enumerate() {
        let field = format!("flags[{}]", i);
        check_param(path, &field, &flag.param_type, &flag.config_path, violations);

        if flag.name.is_empty() {
            violations.push(Violation::new(path, field.as_str(), "empty name"));
        } else if flag.name == RESERVED_NAME {
            violations.push(Violation::new(path, field.as_str(), "name 'help' is reserved"));
        } else if !is_long_name(&flag.name) {
            violations.push(Violation::new(
                path,
                field.as_str(),
                format!("invalid flag name '{}'", flag.name),
            ));
        } else if !names.insert(flag.name.as_str()) {
            violations.push(Violation::new(
                path,
                field.as_str(),
                format!("duplicate flag name '{}'", flag.name),
            ));
        }

        let mut chars = flag.shorthand.chars();
        match (chars.next(), chars.next()) {
            (None, _) => {}
            (Some(_), Some(_)) => violations.push(Violation::new(
                path,
                field.as_str(),
                format!("shorthand '{}' is more than one character", flag.shorthand),
            )),
            (Some(c), None) if c == RESERVED_SHORTHAND => {
                violations.push(Violation::new(path, field.as_str(), "shorthand 'h' is reserved"))
            }
            (Some(c), None) if !c.is_ascii_alphanumeric() => violations.push(Violation::new(
                path,
                field.as_str(),
                format!("shorthand '{}' must be a letter or digit", c),
            )),
            (Some(c), None) => {
                if !shorthands.insert(c) {
                    violations.push(Violation::new(
                        path,
                        field.as_str(),
                        format!("duplicate shorthand '{}'", c),
                    ));
                }
            }
        }
    }

    let mut sub_names = HashSet::new();
    for (i, sub) in definition.sub_commands.iter().enumerate() {
        let sub_path = format!("{}subCommands[{}].", path, i);
        if sub.metadata.name == RESERVED_NAME {
            violations.push(Violation::new(&sub_path, "metadata", "name 'help' is reserved"));
        } else if !sub.metadata.name.is_empty() && !sub_names.insert(sub.metadata.name.as_str()) {
            violations.push(Violation::new(
                &sub_path,
                "metadata",
                format!("duplicate sub-command name '{}'", sub.metadata.name),
            ));
        }
        validate_at(sub, &sub_path, registry, violations);
    }
}

/// A name usable as `--<name>`: no leading '-', no '=' and no whitespace.
fn is_long_name(name: &str) -> bool {
    !name.starts_with('-') && !name.contains(|c: char| c == '=' || c.is_whitespace())
}

fn check_param(
    path: &str,
    field: &str,
    param_type: &ParamType,
    config_path: &str,
    violations: &mut ErrorList<Violation>,
) {
    if param_type.kind().is_none() {
        violations.push(Violation::new(
            path,
            field,
            format!("unknown type '{}'", param_type.name()),
        ));
    }
    if config_path.is_empty() {
        violations.push(Violation::new(path, field, "empty configPath"));
    }
}
