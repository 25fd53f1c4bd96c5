//! Config tree handed to actions, and the dotted-path binder that fills it.
//!
//! A definition's `config` mapping seeds the tree. Flag and argument values
//! are written into it at their config paths right before the action runs.

use crate::error::BindError;
use crate::extension::value::TypedValue;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Leaf value of the config tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

/// Node of the config tree.
///
/// Sequences are carried through from the seed config untouched; the binder
/// treats them like any other non-mapping value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigNode {
    Mapping(BTreeMap<String, ConfigNode>),
    Sequence(Vec<ConfigNode>),
    Scalar(Scalar),
}

impl Default for ConfigNode {
    fn default() -> Self {
        ConfigNode::Mapping(BTreeMap::new())
    }
}

impl From<Scalar> for ConfigNode {
    fn from(scalar: Scalar) -> Self {
        ConfigNode::Scalar(scalar)
    }
}

impl ConfigNode {
    /// Empty root mapping.
    pub fn mapping() -> Self {
        Self::default()
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, ConfigNode>> {
        match self {
            ConfigNode::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigNode::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Node at `path`, if every segment resolves through mappings.
    pub fn get_path(&self, path: &str) -> Option<&ConfigNode> {
        let segments = split_path(path).ok()?;
        let mut node = self;
        for segment in segments {
            node = node.as_mapping()?.get(segment)?;
        }
        Some(node)
    }

    /// Write `value` at the dotted `path`, creating missing mappings on the way.
    ///
    /// An existing value at the exact path is replaced. A non-mapping value at
    /// an intermediate segment is a [`BindError::Conflict`].
    pub fn set_path(&mut self, path: &str, value: impl Into<ConfigNode>) -> Result<(), BindError> {
        let segments = split_path(path)?;
        let Some((leaf, parents)) = segments.split_last() else {
            return Err(BindError::EmptyPath);
        };

        let ConfigNode::Mapping(root) = self else {
            return Err(BindError::RootNotMapping {
                path: path.to_string(),
            });
        };

        let mut current = root;
        for segment in parents {
            let next = current
                .entry(segment.to_string())
                .or_insert_with(ConfigNode::mapping);
            current = match next {
                ConfigNode::Mapping(map) => map,
                _ => {
                    return Err(BindError::Conflict {
                        path: path.to_string(),
                        segment: segment.to_string(),
                    })
                }
            };
        }
        current.insert(leaf.to_string(), value.into());
        Ok(())
    }

    /// Write a typed value at its config path. Unset values leave the tree untouched.
    pub fn bind(&mut self, value: &TypedValue) -> Result<(), BindError> {
        match value.value() {
            Some(scalar) => self.set_path(value.config_path(), scalar),
            None => Ok(()),
        }
    }

    /// Decode the tree into an action's own config type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::to_value(self).and_then(serde_json::from_value)
    }
}

/// Split a dotted path into segments. One leading `.` is accepted.
fn split_path(path: &str) -> Result<Vec<&str>, BindError> {
    let trimmed = path.strip_prefix('.').unwrap_or(path);
    if trimmed.is_empty() {
        return Err(BindError::EmptyPath);
    }
    let segments: Vec<&str> = trimmed.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(BindError::EmptySegment(path.to_string()));
    }
    Ok(segments)
}
