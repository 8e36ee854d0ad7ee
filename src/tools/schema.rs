//! Function-call schema generation from a tool's declared parameters.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::tool::Tool;
use crate::error::SwarmError;

/// Tool definition sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionDefinition,
}

/// Name, description and JSON Schema parameters of a callable tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Describe `tool` as a function-call schema.
///
/// Every declared parameter becomes a property typed from its annotation;
/// parameters without a default are listed as required. The reserved context
/// parameter is left out of both.
pub fn function_to_schema(tool: &dyn Tool) -> Result<ToolDefinition, SwarmError> {
    let name = tool.name();
    if name.trim().is_empty() {
        return Err(SwarmError::Schema {
            tool_name: name.to_string(),
            message: "tool name is empty".to_string(),
        });
    }

    let mut seen = HashSet::new();
    let mut properties = Map::new();
    let mut required = Vec::new();
    for param in tool.parameters() {
        if param.name.trim().is_empty() {
            return Err(SwarmError::Schema {
                tool_name: name.to_string(),
                message: "parameter with empty name".to_string(),
            });
        }
        if !seen.insert(param.name.as_str()) {
            return Err(SwarmError::Schema {
                tool_name: name.to_string(),
                message: format!("duplicate parameter '{}'", param.name),
            });
        }
        if param.is_context_variables() {
            continue;
        }

        let mut property = Map::new();
        property.insert("type".into(), json!(param.json_type().to_string()));
        if let Some(description) = &param.description {
            property.insert("description".into(), json!(description));
        }
        properties.insert(param.name.clone(), Value::Object(property));
        if param.is_required() {
            required.push(param.name.clone());
        }
    }

    Ok(ToolDefinition {
        kind: "function".to_string(),
        function: FunctionDefinition {
            name: name.to_string(),
            description: tool.description().to_string(),
            parameters: json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        },
    })
}
