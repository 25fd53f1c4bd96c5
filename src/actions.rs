//! Built-in actions registered by the `cmdext` binary.
//!
//! Both are side-effect free so extensions can be exercised without a cluster.

use crate::extension::{Action, ActionError, ActionRegistry, ConfigNode};
use serde::Deserialize;
use std::io::Write;

pub const CONFIG_PRINT: &str = "config_print";
pub const MESSAGE_PRINT: &str = "message_print";

/// Registry with every built-in action.
pub fn builtin_registry() -> ActionRegistry {
    ActionRegistry::new()
        .with(CONFIG_PRINT, || -> Box<dyn Action> { Box::new(ConfigPrint) })
        .with(MESSAGE_PRINT, || -> Box<dyn Action> { Box::new(MessagePrint) })
}

/// Writes the final config tree, as JSON or (with `output: yaml`) YAML.
pub struct ConfigPrint;

impl Action for ConfigPrint {
    fn run(&self, config: &ConfigNode, out: &mut dyn Write) -> Result<(), ActionError> {
        let as_yaml = config.get_path("output").and_then(|n| n.as_str()) == Some("yaml");
        let rendered = if as_yaml {
            serde_yaml::to_string(config).map_err(|e| ActionError::Failed(e.to_string()))?
        } else {
            let mut text = serde_json::to_string_pretty(config)
                .map_err(|e| ActionError::Failed(e.to_string()))?;
            text.push('\n');
            text
        };
        out.write_all(rendered.as_bytes())?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct MessageConfig {
    message: Option<String>,
    #[serde(default)]
    prefix: String,
}

/// Writes `prefix` followed by `message`.
pub struct MessagePrint;

impl Action for MessagePrint {
    fn run(&self, config: &ConfigNode, out: &mut dyn Write) -> Result<(), ActionError> {
        let parsed: MessageConfig = config
            .decode()
            .map_err(|e| ActionError::InvalidConfig(e.to_string()))?;
        let message = parsed
            .message
            .ok_or_else(|| ActionError::InvalidConfig("missing 'message'".to_string()))?;
        writeln!(out, "{}{}", parsed.prefix, message)?;
        Ok(())
    }
}
