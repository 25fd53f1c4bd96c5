//! Runnable extension command nodes.
//!
//! A node is rendered into a `clap::Command` for parsing. After parsing,
//! [`ExtensionCommand::execute`] walks to the matched node, runs the gate
//! (argument count, required flags, config binding) and then the action.

use crate::error::RunError;
use crate::extension::config_tree::ConfigNode;
use crate::extension::definition::Metadata;
use crate::extension::registry::Action;
use crate::extension::value::{TypedValue, ValueKind};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::io::Write;
use tracing::{debug, trace};

/// Clap id of the positional argument. Flag names never contain whitespace,
/// so no flag can take it.
const POSITIONAL_ID: &str = "positional args";

/// A flag wired to a typed value.
#[derive(Debug, Clone)]
pub struct BoundFlag {
    pub name: String,
    pub shorthand: Option<char>,
    pub description: String,
    pub required: bool,
    /// Value with the declared default already applied.
    pub value: TypedValue,
}

/// Positional argument count rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgRule {
    ExactlyOne,
    AtMostOne,
}

impl ArgRule {
    pub fn check(&self, count: usize) -> Result<(), RunError> {
        match self {
            ArgRule::ExactlyOne if count != 1 => Err(RunError::ArgCount(count)),
            ArgRule::AtMostOne if count > 1 => Err(RunError::TooManyArgs(count)),
            _ => Ok(()),
        }
    }
}

/// The positional argument wired to a typed value.
#[derive(Debug, Clone)]
pub struct BoundArgs {
    pub rule: ArgRule,
    pub value: TypedValue,
}

pub struct ExtensionCommand {
    pub(crate) metadata: Metadata,
    pub(crate) action_id: Option<String>,
    pub(crate) action: Option<Box<dyn Action>>,
    pub(crate) seed: ConfigNode,
    pub(crate) flags: Vec<BoundFlag>,
    pub(crate) args: Option<BoundArgs>,
    pub(crate) children: Vec<ExtensionCommand>,
}

impl std::fmt::Debug for ExtensionCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionCommand")
            .field("name", &self.metadata.name)
            .field("action_id", &self.action_id)
            .field("flags", &self.flags)
            .field("args", &self.args)
            .field("children", &self.children)
            .finish()
    }
}

impl ExtensionCommand {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn action_id(&self) -> Option<&str> {
        self.action_id.as_deref()
    }

    pub fn flags(&self) -> &[BoundFlag] {
        &self.flags
    }

    pub fn args(&self) -> Option<&BoundArgs> {
        self.args.as_ref()
    }

    pub fn children(&self) -> &[ExtensionCommand] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&ExtensionCommand> {
        self.children.iter().find(|c| c.name() == name)
    }

    /// Names of flags that must be given on the command line.
    pub fn required_flags(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
    }

    /// Render this node and its children as a clap command.
    pub fn to_clap(&self) -> Command {
        let mut command = Command::new(self.metadata.name.clone());
        if !self.metadata.description.is_empty() {
            command = command.about(self.metadata.description.clone());
        }
        if !self.metadata.description_long.is_empty() {
            command = command.long_about(self.metadata.description_long.clone());
        }

        for flag in &self.flags {
            command = command.arg(flag_arg(flag));
        }

        if let Some(args) = &self.args {
            command = command.arg(
                Arg::new(POSITIONAL_ID)
                    .value_name(args.value.kind().as_str().to_uppercase())
                    .num_args(0..)
                    .action(ArgAction::Append),
            );
        }

        for child in &self.children {
            command = command.subcommand(child.to_clap());
        }
        command
    }

    /// Run the node matched by `matches`, descending into subcommands.
    ///
    /// Group nodes without an action print their help.
    pub fn execute(&self, matches: &ArgMatches, out: &mut dyn Write) -> Result<(), RunError> {
        if let Some((name, sub_matches)) = matches.subcommand() {
            let child = self
                .child(name)
                .ok_or_else(|| RunError::UnknownCommand(name.to_string()))?;
            return child.execute(sub_matches, out);
        }

        let Some(action) = &self.action else {
            write!(out, "{}", self.to_clap().render_help())?;
            return Ok(());
        };

        let config = self.prepare(matches)?;
        debug!(command = %self.metadata.name, action = ?self.action_id, "Running extension action");
        action.run(&config, out)?;
        Ok(())
    }

    /// Execution gate: parse supplied values, check the argument count and
    /// required flags, then bind every set value into a copy of the seed config.
    pub fn prepare(&self, matches: &ArgMatches) -> Result<ConfigNode, RunError> {
        let mut values = Vec::with_capacity(self.flags.len() + 1);
        for flag in &self.flags {
            let mut value = flag.value.clone();
            if let Some(text) = matches.get_one::<String>(&flag.name) {
                value
                    .set_from_text(text)
                    .map_err(|source| RunError::InvalidFlagValue {
                        flag: flag.name.clone(),
                        text: text.clone(),
                        source,
                    })?;
            }
            values.push(value);
        }

        if let Some(args) = &self.args {
            let raw: Vec<&String> = matches
                .get_many::<String>(POSITIONAL_ID)
                .map(|v| v.collect())
                .unwrap_or_default();
            args.rule.check(raw.len())?;

            let mut value = args.value.clone();
            if let Some(text) = raw.first() {
                value
                    .set_from_text(text)
                    .map_err(|source| RunError::InvalidArgValue {
                        text: text.to_string(),
                        source,
                    })?;
            }
            values.push(value);
        }

        let missing: Vec<String> = self
            .required_flags()
            .filter(|name| matches.value_source(name) != Some(ValueSource::CommandLine))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(RunError::RequiredFlagsMissing(missing));
        }

        let mut config = self.seed.clone();
        for value in &values {
            config.bind(value)?;
        }
        trace!(command = %self.metadata.name, config = ?config, "Bound extension config");
        Ok(config)
    }
}

fn flag_arg(flag: &BoundFlag) -> Arg {
    let mut arg = Arg::new(flag.name.clone())
        .long(flag.name.clone())
        .action(ArgAction::Set);
    if let Some(short) = flag.shorthand {
        arg = arg.short(short);
    }
    if !flag.description.is_empty() {
        arg = arg.help(flag.description.clone());
    }

    match flag.value.kind() {
        ValueKind::Bool => arg
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true"),
        ValueKind::Int => arg.num_args(1).allow_negative_numbers(true),
        ValueKind::String | ValueKind::Path => arg
            .num_args(1)
            .value_name(flag.value.kind().as_str().to_uppercase()),
    }
}
