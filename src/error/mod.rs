//! Error types for swarm.

pub mod category;

pub use category::ErrorCategory;

use thiserror::Error;

/// Primary error type for all swarm operations.
///
/// Backend failures keep their own variants (`Network`, `Api`, `Stream`, ...)
/// so callers see exactly what the model service reported.
#[derive(Error, Debug)]
pub enum SwarmError {
    #[error("Failed to generate schema for tool '{tool_name}': {message}")]
    Schema { tool_name: String, message: String },

    #[error(
        "Failed to cast response to string: {value}. Make sure agent functions return a string or ToolResult. Tool: {tool_name}"
    )]
    ResultCoercion { tool_name: String, value: String },

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[cfg(feature = "openai")]
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl SwarmError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a tool execution error.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Schema { .. } => ErrorCategory::Schema,
            Self::ResultCoercion { .. } => ErrorCategory::ResultCoercion,
            Self::ToolExecution { .. } | Self::InvalidArgument(_) => ErrorCategory::ToolExecution,
            Self::Configuration(_) | Self::Io(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                _ => ErrorCategory::Backend,
            },
            #[cfg(feature = "openai")]
            Self::Network(_) => ErrorCategory::Backend,
            Self::Stream(_) => ErrorCategory::Backend,
        }
    }

    /// Whether retrying the same run could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            #[cfg(feature = "openai")]
            Self::Network(_) => true,
            _ => false,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SwarmError>;
