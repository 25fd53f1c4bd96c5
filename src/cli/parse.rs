//! CLI parse: clap types for cmdext. No behavior beyond host switch scanning.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const SKIP_EXTENSIONS: &str = "skip-extensions";
pub const SHOW_EXTENSIONS_ERROR: &str = "show-extensions-error";

/// cmdext - CLI with commands loaded at runtime from declarative definitions
#[derive(Parser, Debug)]
#[command(name = "cmdext", version)]
#[command(about = "Run commands defined by extension records in an external store")]
#[command(disable_help_flag = true, disable_help_subcommand = true)]
pub struct Cli {
    // Missing when only help was asked for
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Print help, including the loaded extension commands
    #[arg(long, short = 'h')]
    pub help: bool,

    /// Configuration file path (layered over the global config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub switches: HostSwitches,

    /// Enable verbose logging (debug level)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,
}

/// Extension switches recognized anywhere on the command line.
#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostSwitches {
    /// Skip fetching extensions from the store
    #[arg(long = SKIP_EXTENSIONS, global = true)]
    pub skip_extensions: bool,

    /// Print the full error when fetching extensions fails
    #[arg(long = SHOW_EXTENSIONS_ERROR, global = true)]
    pub show_extensions_error: bool,
}

impl HostSwitches {
    /// Take switches that trail an extension command out of its arguments.
    /// clap hands those over unparsed inside the external subcommand's
    /// arguments. Returns the updated switches and the remaining arguments.
    pub fn split_trailing(mut self, args: &[String]) -> (Self, Vec<String>) {
        let mut rest = Vec::with_capacity(args.len());
        let mut iter = args.iter().peekable();
        while let Some(arg) = iter.next() {
            if arg == "--" {
                rest.push(arg.clone());
                rest.extend(iter.cloned());
                break;
            }
            let Some((name, inline)) = switch_name(arg) else {
                rest.push(arg.clone());
                continue;
            };
            let value = match inline {
                Some(text) => parse_switch_value(text).unwrap_or(false),
                None => match iter.peek().and_then(|next| parse_switch_value(next)) {
                    Some(value) => {
                        iter.next();
                        value
                    }
                    None => true,
                },
            };
            if name == SKIP_EXTENSIONS {
                self.skip_extensions = value;
            } else {
                self.show_extensions_error = value;
            }
        }
        (self, rest)
    }
}

/// Recognize `--<switch>` or `--<switch>=<value>`.
fn switch_name(arg: &str) -> Option<(&'static str, Option<&str>)> {
    let body = arg.strip_prefix("--")?;
    let (name, inline) = match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    };
    [SKIP_EXTENSIONS, SHOW_EXTENSIONS_ERROR]
        .into_iter()
        .find(|switch| *switch == name)
        .map(|switch| (switch, inline))
}

fn parse_switch_value(text: &str) -> Option<bool> {
    match text {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect the extensions available to this run
    Extensions {
        #[command(subcommand)]
        command: ExtensionsCommands,
    },
    /// List registered action ids
    Actions,
    /// Print help for cmdext or one of its commands
    Help {
        /// Command path, e.g. `extensions list` or an extension name
        command: Vec<String>,
    },
    /// Any other command is looked up among the loaded extensions
    #[command(external_subcommand)]
    External(Vec<String>),
}

#[derive(Subcommand, Debug)]
pub enum ExtensionsCommands {
    /// List extensions that loaded successfully
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Load and validate every extension record, printing all problems
    Validate,
}
