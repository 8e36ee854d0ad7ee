//! Declared tool parameters and their primitive JSON types.

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::CONTEXT_VARIABLES;

/// Primitive JSON type advertised for a parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParameterType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Null,
}

impl ParameterType {
    /// Map a declared type annotation to a JSON type.
    ///
    /// Accepts Rust spellings (`i64`, `Vec<String>`, `HashMap<..>`) as well as
    /// the short dynamic-language names (`int`, `list`, `dict`). Returns `None`
    /// for anything else.
    pub fn from_annotation(annotation: &str) -> Option<Self> {
        let annotation = annotation.trim();
        let head = annotation
            .split('<')
            .next()
            .unwrap_or(annotation)
            .rsplit("::")
            .next()
            .unwrap_or(annotation)
            .trim_start_matches('&')
            .trim();
        let ty = match head {
            "str" | "String" | "string" | "char" => Self::String,
            "int" | "integer" | "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8"
            | "u16" | "u32" | "u64" | "u128" | "usize" => Self::Integer,
            "float" | "number" | "f32" | "f64" => Self::Number,
            "bool" | "boolean" => Self::Boolean,
            "list" | "array" | "Vec" | "VecDeque" | "tuple" => Self::Array,
            "dict" | "object" | "Map" | "HashMap" | "BTreeMap" | "Value" => Self::Object,
            "None" | "NoneType" | "null" | "()" => Self::Null,
            _ => return None,
        };
        Some(ty)
    }
}

/// One declared parameter of a tool.
#[derive(Debug, Clone, Builder, PartialEq)]
pub struct ToolParameter {
    #[builder(into)]
    pub name: String,
    /// Declared type, if any. Unknown or missing annotations advertise `string`.
    #[builder(into)]
    pub annotation: Option<String>,
    /// Default value; parameters without one are required.
    pub default_value: Option<serde_json::Value>,
    #[builder(into)]
    pub description: Option<String>,
}

impl ToolParameter {
    /// A required parameter with the given type annotation.
    pub fn required(name: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self::builder().name(name).annotation(annotation).build()
    }

    /// An optional parameter falling back to `default`.
    pub fn optional(
        name: impl Into<String>,
        annotation: impl Into<String>,
        default: serde_json::Value,
    ) -> Self {
        Self::builder()
            .name(name)
            .annotation(annotation)
            .default_value(default)
            .build()
    }

    /// The reserved context parameter.
    pub fn context_variables() -> Self {
        Self::builder()
            .name(CONTEXT_VARIABLES)
            .annotation("dict")
            .build()
    }

    /// Advertised JSON type.
    pub fn json_type(&self) -> ParameterType {
        self.annotation
            .as_deref()
            .and_then(ParameterType::from_annotation)
            .unwrap_or(ParameterType::String)
    }

    pub fn is_required(&self) -> bool {
        self.default_value.is_none()
    }

    pub fn is_context_variables(&self) -> bool {
        self.name == CONTEXT_VARIABLES
    }
}
