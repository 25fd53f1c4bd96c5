//! Typed values: one scalar of a declared kind bound to a config path.

use crate::error::ValueError;
use crate::extension::config_tree::Scalar;
use std::path::Path;

/// Declared kind of a flag or positional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Path,
    Int,
    Bool,
}

impl ValueKind {
    pub const ALL: [ValueKind; 4] = [
        ValueKind::String,
        ValueKind::Path,
        ValueKind::Int,
        ValueKind::Bool,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Path => "path",
            ValueKind::Int => "int",
            ValueKind::Bool => "bool",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parameter value of one kind, unset until text is parsed into it.
///
/// `Path` values hold the *content* of the named file, read synchronously
/// when the text is set.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    String {
        value: Option<String>,
        config_path: String,
    },
    Path {
        value: Option<String>,
        config_path: String,
    },
    Int {
        value: Option<i64>,
        config_path: String,
    },
    Bool {
        value: Option<bool>,
        config_path: String,
    },
}

impl TypedValue {
    /// Create an unset value of `kind` bound to `config_path`.
    pub fn new(kind: ValueKind, config_path: impl Into<String>) -> Self {
        let config_path = config_path.into();
        match kind {
            ValueKind::String => TypedValue::String {
                value: None,
                config_path,
            },
            ValueKind::Path => TypedValue::Path {
                value: None,
                config_path,
            },
            ValueKind::Int => TypedValue::Int {
                value: None,
                config_path,
            },
            ValueKind::Bool => TypedValue::Bool {
                value: None,
                config_path,
            },
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            TypedValue::String { .. } => ValueKind::String,
            TypedValue::Path { .. } => ValueKind::Path,
            TypedValue::Int { .. } => ValueKind::Int,
            TypedValue::Bool { .. } => ValueKind::Bool,
        }
    }

    pub fn config_path(&self) -> &str {
        match self {
            TypedValue::String { config_path, .. }
            | TypedValue::Path { config_path, .. }
            | TypedValue::Int { config_path, .. }
            | TypedValue::Bool { config_path, .. } => config_path,
        }
    }

    /// Parse `text` into the value. On failure the previous payload is kept.
    pub fn set_from_text(&mut self, text: &str) -> Result<(), ValueError> {
        match self {
            TypedValue::String { value, .. } => {
                *value = Some(text.to_string());
            }
            TypedValue::Path { value, .. } => {
                let content = std::fs::read_to_string(Path::new(text)).map_err(|source| {
                    ValueError::ReadFile {
                        path: text.into(),
                        source,
                    }
                })?;
                *value = Some(content);
            }
            TypedValue::Int { value, .. } => {
                let parsed = text
                    .parse::<i64>()
                    .map_err(|source| ValueError::InvalidInt {
                        text: text.to_string(),
                        source,
                    })?;
                *value = Some(parsed);
            }
            TypedValue::Bool { value, .. } => {
                *value = Some(parse_bool(text)?);
            }
        }
        Ok(())
    }

    /// Current payload, `None` when never set.
    pub fn value(&self) -> Option<Scalar> {
        match self {
            TypedValue::String { value, .. } | TypedValue::Path { value, .. } => {
                value.clone().map(Scalar::String)
            }
            TypedValue::Int { value, .. } => value.map(Scalar::Int),
            TypedValue::Bool { value, .. } => value.map(Scalar::Bool),
        }
    }

    pub fn is_set(&self) -> bool {
        match self {
            TypedValue::String { value, .. } | TypedValue::Path { value, .. } => value.is_some(),
            TypedValue::Int { value, .. } => value.is_some(),
            TypedValue::Bool { value, .. } => value.is_some(),
        }
    }
}

/// Canonical boolean spellings: 1, t, T, TRUE, true, True and their false forms.
fn parse_bool(text: &str) -> Result<bool, ValueError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ValueError::InvalidBool(text.to_string())),
    }
}
