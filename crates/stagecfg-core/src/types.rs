use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between segments of a configuration key.
pub const KEY_SEPARATOR: char = '.';

/// Name used when no stage is selected explicitly.
pub const DEFAULT_STAGE: &str = "default";

/// Closed set of target types a raw string can be converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    Url,
    /// Conversion is performed by a caller-supplied converter.
    Custom,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Bool => "bool",
            ValueKind::Int32 => "int32",
            ValueKind::Int64 => "int64",
            ValueKind::Float32 => "float32",
            ValueKind::Float64 => "float64",
            ValueKind::Url => "url",
            ValueKind::Custom => "custom",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Join a prefix and a child segment into a dotted key.
pub fn join_key(prefix: &str, child: &str) -> String {
    if prefix.is_empty() {
        return child.to_string();
    }
    format!("{prefix}{KEY_SEPARATOR}{child}")
}
