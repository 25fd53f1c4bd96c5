//! CLI route: single route table and run context. Dispatches built-in commands
//! and hands everything else to the extension command tree.

use crate::cli::help::{command_name, help_path, is_builtin};
use crate::cli::parse::{Cli, Commands, ExtensionsCommands, HostSwitches};
use crate::cli::presentation::{
    format_action_list_text, format_extension_list_json, format_extension_list_text,
    format_validation_report,
};
use crate::config::CliConfig;
use crate::error::{CliError, RunError};
use crate::extension::source::open_source;
use crate::extension::{
    ActionRegistry, ExtensionPipeline, ExtensionSource, LoadedExtension, PipelineOptions,
};
use clap::error::ErrorKind;
use clap::{Command, CommandFactory};
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

/// Name of the clap root the extension tree is rendered under.
const BIN_NAME: &str = "cmdext";

/// Runtime context for CLI execution: configuration, registered actions and
/// the extension store.
pub struct RunContext {
    config: CliConfig,
    registry: ActionRegistry,
    source: Option<Box<dyn ExtensionSource>>,
    cancel: CancellationToken,
}

impl RunContext {
    /// Create run context from an already loaded configuration. The store is
    /// opened lazily from `config.extensions` unless one is set with
    /// [`with_source`](Self::with_source).
    pub fn new(config: CliConfig, registry: ActionRegistry, cancel: CancellationToken) -> Self {
        Self {
            config,
            registry,
            source: None,
            cancel,
        }
    }

    /// Use `source` instead of the store named in configuration.
    pub fn with_source(mut self, source: Box<dyn ExtensionSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Execute a parsed command. Command output and rendered help go to `out`,
    /// extension warnings to `err`. Help never prints warnings.
    pub async fn execute(
        &self,
        cli: &Cli,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<(), CliError> {
        let span = info_span!("command", name = %command_name(cli.command.as_ref()));
        self.dispatch(cli, out, err).instrument(span).await
    }

    async fn dispatch(
        &self,
        cli: &Cli,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<(), CliError> {
        let command = match &cli.command {
            Some(command) if !cli.help => command,
            other => {
                let topic = other.as_ref().map(help_path).unwrap_or_default();
                return self.show_help(cli.switches, &topic, out).await;
            }
        };

        match command {
            Commands::Extensions { command } => match command {
                ExtensionsCommands::List { format } => {
                    let (extensions, pipeline) = self.load_extensions(cli.switches).await;
                    pipeline.display_warnings(err)?;
                    let text = if format == "json" {
                        format_extension_list_json(&extensions)
                    } else {
                        format_extension_list_text(&extensions)
                    };
                    writeln!(out, "{}", text)?;
                    Ok(())
                }
                ExtensionsCommands::Validate => {
                    let switches = HostSwitches {
                        skip_extensions: false,
                        ..cli.switches
                    };
                    let (extensions, pipeline) = self.load_extensions(switches).await;
                    writeln!(
                        out,
                        "{}",
                        format_validation_report(&extensions, pipeline.errors())
                    )?;
                    if pipeline.errors().is_empty() {
                        Ok(())
                    } else {
                        Err(CliError::ExtensionsInvalid(pipeline.errors().len()))
                    }
                }
            },
            Commands::Actions => {
                writeln!(out, "{}", format_action_list_text(&self.registry))?;
                Ok(())
            }
            Commands::Help { command } => self.show_help(cli.switches, command, out).await,
            Commands::External(args) => self.run_extension(cli.switches, args, out, err).await,
        }
    }

    /// Render help for `topic`, a command path below the root. Extension
    /// commands are listed in the root help and rendered from their own tree.
    async fn show_help(
        &self,
        switches: HostSwitches,
        topic: &[String],
        out: &mut dyn Write,
    ) -> Result<(), CliError> {
        let (extensions, _) = self.load_extensions(switches).await;
        let mut root = match topic.first() {
            Some(name) if extensions.iter().any(|e| e.command.name() == name.as_str()) => {
                extension_root(&extensions)
            }
            _ => host_root(&extensions),
        };
        root.build();

        let mut command = &mut root;
        for name in topic {
            command = match command.find_subcommand_mut(name) {
                Some(sub) => sub,
                None => return Err(RunError::UnknownCommand(name.clone()).into()),
            };
        }
        write!(out, "{}", command.render_help())?;
        Ok(())
    }

    async fn run_extension(
        &self,
        switches: HostSwitches,
        args: &[String],
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<(), CliError> {
        let (switches, args) = switches.split_trailing(args);
        let (extensions, pipeline) = self.load_extensions(switches).await;

        let root = extension_root(&extensions);
        let argv = std::iter::once(BIN_NAME.to_string()).chain(args);
        let parsed = root.try_get_matches_from(argv);
        if let Err(e) = &parsed {
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                write!(out, "{}", e.render())?;
                return Ok(());
            }
        }
        pipeline.display_warnings(err)?;
        let matches = parsed.map_err(CliError::Usage)?;

        let Some((name, sub_matches)) = matches.subcommand() else {
            return Err(RunError::UnknownCommand(String::new()).into());
        };
        let extension = extensions
            .iter()
            .find(|e| e.command.name() == name)
            .ok_or_else(|| RunError::UnknownCommand(name.to_string()))?;

        info!(command = name, configmap = %extension.provenance, "Running extension command");
        extension.command.execute(sub_matches, out)?;
        Ok(())
    }

    /// Run the extension pipeline for this invocation.
    async fn load_extensions(
        &self,
        switches: HostSwitches,
    ) -> (Vec<LoadedExtension>, ExtensionPipeline) {
        let options = PipelineOptions {
            skip_extensions: switches.skip_extensions,
            show_extensions_error: switches.show_extensions_error,
            data_key: self.config.extensions.data_key.clone(),
            fetch_timeout: self.config.extensions.fetch_timeout(),
        };
        let mut pipeline = ExtensionPipeline::new(options);
        if switches.skip_extensions {
            return (Vec::new(), pipeline);
        }

        let opened: Box<dyn ExtensionSource>;
        let source: &dyn ExtensionSource = match &self.source {
            Some(source) => source.as_ref(),
            None => match open_source(&self.config.extensions) {
                Ok(Some(source)) => {
                    opened = source;
                    opened.as_ref()
                }
                Ok(None) => {
                    debug!("No extension source configured");
                    return (Vec::new(), pipeline);
                }
                Err(e) => {
                    pipeline.record_fetch_error(e);
                    return (Vec::new(), pipeline);
                }
            },
        };

        let mut extensions = pipeline.build(source, &self.registry, &self.cancel).await;
        extensions.retain(|extension| {
            let shadowed = is_builtin(extension.command.name());
            if shadowed {
                warn!(
                    command = extension.command.name(),
                    configmap = %extension.provenance,
                    "Extension shadowed by a built-in command"
                );
            }
            !shadowed
        });
        (extensions, pipeline)
    }
}

/// Host command tree with a summary entry per extension, for the root help.
fn host_root(extensions: &[LoadedExtension]) -> Command {
    let mut root = Cli::command();
    for extension in extensions {
        let metadata = extension.command.metadata();
        root = root.subcommand(
            Command::new(metadata.name.clone()).about(metadata.description.clone()),
        );
    }
    root
}

/// The clap root that extension commands are parsed under.
fn extension_root(extensions: &[LoadedExtension]) -> Command {
    let mut root = Command::new(BIN_NAME).subcommand_required(true);
    for extension in extensions {
        root = root.subcommand(extension.command.to_clap());
    }
    root
}
