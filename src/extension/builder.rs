//! Command tree builder: validated definitions to runnable nodes.
//!
//! Each call returns the node (if it could be built) together with every
//! error found in its subtree. A child that fails is left out of its parent
//! and reported; its siblings are still attached.

use crate::error::{BuildError, ErrorList};
use crate::extension::command::{ArgRule, BoundArgs, BoundFlag, ExtensionCommand};
use crate::extension::definition::{Definition, FlagDefinition, ParamType};
use crate::extension::registry::ActionRegistry;
use crate::extension::value::{TypedValue, ValueKind};
use tracing::debug;

/// Result of building one definition node.
#[derive(Debug)]
pub struct BuildOutput {
    /// `None` when the node itself could not be built.
    pub command: Option<ExtensionCommand>,
    /// Errors of this node and of every omitted or partially built descendant.
    pub errors: ErrorList<BuildError>,
}

pub struct CommandBuilder<'a> {
    registry: &'a ActionRegistry,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(registry: &'a ActionRegistry) -> Self {
        Self { registry }
    }

    pub fn build(&self, definition: &Definition) -> BuildOutput {
        let mut errors = ErrorList::new();
        let name = definition.metadata.name.clone();

        let action = match definition.action_id() {
            Some(id) => match self.registry.get(id) {
                Some(factory) => Some(factory()),
                None => {
                    errors.push(BuildError::UnknownAction {
                        command: name.clone(),
                        action: id.to_string(),
                    });
                    None
                }
            },
            None => None,
        };

        let mut flags = Vec::with_capacity(definition.flags.len());
        for flag in &definition.flags {
            match self.bind_flag(&name, flag) {
                Ok(bound) => flags.push(bound),
                Err(err) => errors.push(err),
            }
        }

        let args = match &definition.args {
            Some(args) => match kind_of(&name, "args", &args.param_type) {
                Ok(kind) => Some(BoundArgs {
                    rule: if args.optional {
                        ArgRule::AtMostOne
                    } else {
                        ArgRule::ExactlyOne
                    },
                    value: TypedValue::new(kind, args.config_path.clone()),
                }),
                Err(err) => {
                    errors.push(err);
                    None
                }
            },
            None => None,
        };

        let node_failed = !errors.is_empty();

        let mut children = Vec::with_capacity(definition.sub_commands.len());
        for sub in &definition.sub_commands {
            let output = self.build(sub);
            if !output.errors.is_empty() {
                errors.push(BuildError::SubCommand {
                    name: sub.metadata.name.clone(),
                    errors: output.errors,
                });
            }
            if let Some(child) = output.command {
                children.push(child);
            } else {
                debug!(parent = %name, command = %sub.metadata.name, "Omitting sub-command that failed to build");
            }
        }

        if node_failed {
            return BuildOutput {
                command: None,
                errors,
            };
        }

        debug!(command = %name, action = ?definition.action_id(), flags = flags.len(), children = children.len(), "Built extension command");
        BuildOutput {
            command: Some(ExtensionCommand {
                metadata: definition.metadata.clone(),
                action_id: definition.action_id().map(str::to_string),
                action,
                seed: definition.seed_config(),
                flags,
                args,
                children,
            }),
            errors,
        }
    }

    fn bind_flag(&self, command: &str, flag: &FlagDefinition) -> Result<BoundFlag, BuildError> {
        let kind = kind_of(command, &flag.name, &flag.param_type)?;
        let mut value = TypedValue::new(kind, flag.config_path.clone());
        if let Some(default) = &flag.default_value {
            value
                .set_from_text(default)
                .map_err(|source| BuildError::DefaultValue {
                    command: command.to_string(),
                    flag: flag.name.clone(),
                    default: default.clone(),
                    source,
                })?;
        }
        Ok(BoundFlag {
            name: flag.name.clone(),
            shorthand: flag.shorthand.chars().next(),
            description: flag.description.clone(),
            required: flag.required,
            value,
        })
    }
}

fn kind_of(command: &str, field: &str, param_type: &ParamType) -> Result<ValueKind, BuildError> {
    param_type.kind().ok_or_else(|| BuildError::UnknownType {
        command: command.to_string(),
        flag: field.to_string(),
        kind: param_type.name().to_string(),
    })
}
