//! Declarative extension schema, as stored in the external store.

use crate::extension::config_tree::{ConfigNode, Scalar};
use crate::extension::value::ValueKind;
use serde::{Deserialize, Deserializer, Serialize};

/// Display metadata of a command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_long: String,
}

/// Declared parameter type. Unknown names are kept so validation can report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParamType {
    Known(ValueKind),
    Unknown(String),
}

impl ParamType {
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            ParamType::Known(kind) => Some(*kind),
            ParamType::Unknown(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ParamType::Known(kind) => kind.as_str(),
            ParamType::Unknown(name) => name,
        }
    }
}

impl Default for ParamType {
    fn default() -> Self {
        ParamType::Unknown(String::new())
    }
}

impl From<String> for ParamType {
    fn from(name: String) -> Self {
        match ValueKind::parse(&name) {
            Some(kind) => ParamType::Known(kind),
            None => ParamType::Unknown(name),
        }
    }
}

impl From<ParamType> for String {
    fn from(param_type: ParamType) -> Self {
        param_type.name().to_string()
    }
}

impl From<ValueKind> for ParamType {
    fn from(kind: ValueKind) -> Self {
        ParamType::Known(kind)
    }
}

/// A named flag bound to a config path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagDefinition {
    #[serde(rename = "type", default)]
    pub param_type: ParamType,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub shorthand: String,
    #[serde(default)]
    pub config_path: String,
    /// Default text, parsed with the flag's type at build time.
    #[serde(
        rename = "default",
        default,
        deserialize_with = "scalar_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_value: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// The single positional argument of a command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgsDefinition {
    #[serde(rename = "type", default)]
    pub param_type: ParamType,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub config_path: String,
}

/// One command and its subcommands.
///
/// An empty `uses` makes the node a plain group without behavior of its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uses: String,
    #[serde(default)]
    pub flags: Vec<FlagDefinition>,
    #[serde(default)]
    pub args: Option<ArgsDefinition>,
    #[serde(default)]
    pub config: Option<ConfigNode>,
    #[serde(default)]
    pub sub_commands: Vec<Definition>,
}

impl Definition {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// The action id, `None` for group nodes.
    pub fn action_id(&self) -> Option<&str> {
        if self.uses.is_empty() {
            None
        } else {
            Some(&self.uses)
        }
    }

    /// Seed config for the node; an empty mapping when none was declared.
    pub fn seed_config(&self) -> ConfigNode {
        self.config.clone().unwrap_or_default()
    }
}

/// Accept any scalar for a text field: `default: 3` reads as "3". Null and
/// empty text mean no default.
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let scalar = Option::<Scalar>::deserialize(deserializer)?;
    Ok(scalar
        .filter(|s| !matches!(s, Scalar::Null))
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty()))
}
