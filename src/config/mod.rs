//! Configuration (layered: code > env > TOML file).

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SwarmError;

/// Model used when neither the run nor the agent names one.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Explicit orchestrator configuration.
///
/// Passed to [`Swarm`](crate::agent_loop::Swarm) at construction; nothing is
/// read from the environment after that point.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Fallback model identifier.
    pub default_model: String,
    /// API key for the built-in OpenAI backend.
    pub api_key: Option<String>,
    /// Base URL override for the built-in OpenAI backend.
    pub base_url: Option<String>,
    /// Execute the tool calls of one batch concurrently.
    pub concurrent_tools: bool,
    /// Force the debug channel on for every run.
    pub debug: bool,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: None,
            concurrent_tools: false,
            debug: false,
        }
    }
}

impl fmt::Debug for SwarmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwarmConfig")
            .field("default_model", &self.default_model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("concurrent_tools", &self.concurrent_tools)
            .field("debug", &self.debug)
            .finish()
    }
}

impl SwarmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables, reading `.env` first if present.
    ///
    /// Recognized: `SWARM_DEFAULT_MODEL` (or `DEFAULT_MODEL`), `OPENAI_API_KEY`,
    /// `OPENAI_BASE_URL`, `SWARM_CONCURRENT_TOOLS`, `SWARM_DEBUG`.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, SwarmError> {
        toml::from_str(raw)
            .map_err(|e| SwarmError::Configuration(format!("invalid config file: {e}")))
    }

    /// Load a TOML file, then apply environment overrides on top.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SwarmError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let _ = dotenvy::dotenv();
        Ok(Self::from_toml_str(&raw)?.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply overrides from an environment-like lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(model) = lookup("SWARM_DEFAULT_MODEL").or_else(|| lookup("DEFAULT_MODEL")) {
            self.default_model = model;
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.base_url = Some(url);
        }
        if let Some(flag) = lookup("SWARM_CONCURRENT_TOOLS") {
            self.concurrent_tools = parse_flag(&flag);
        }
        if let Some(flag) = lookup("SWARM_DEBUG") {
            self.debug = parse_flag(&flag);
        }
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_concurrent_tools(mut self, enabled: bool) -> Self {
        self.concurrent_tools = enabled;
        self
    }

    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn overrides_follow_env_lookup() {
        let env: HashMap<&str, &str> = [
            ("DEFAULT_MODEL", "gpt-4"),
            ("OPENAI_API_KEY", "sk-test"),
            ("SWARM_CONCURRENT_TOOLS", "true"),
            ("SWARM_DEBUG", "0"),
        ]
        .into_iter()
        .collect();
        let config = SwarmConfig::default().with_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.default_model, "gpt-4");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert!(config.concurrent_tools);
        assert!(!config.debug);
        assert_eq!(config.base_url, None);
    }

    #[test]
    fn swarm_specific_model_wins_over_generic() {
        let config = SwarmConfig::default().with_overrides(|key| match key {
            "SWARM_DEFAULT_MODEL" => Some("gpt-4o-mini".into()),
            "DEFAULT_MODEL" => Some("gpt-4".into()),
            _ => None,
        });
        assert_eq!(config.default_model, "gpt-4o-mini");
    }

    #[test]
    fn toml_keeps_defaults_for_missing_keys() {
        let config = SwarmConfig::from_toml_str("base_url = \"http://localhost:8080/v1\"\n").unwrap();
        assert_eq!(config.default_model, "gpt-4");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/v1"));
        assert!(matches!(
            SwarmConfig::from_toml_str("debug = \"maybe\""),
            Err(SwarmError::Configuration(_))
        ));
    }

    #[test]
    fn load_reads_file_then_applies_env() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("swarm.toml");
        let raw = "default_model = \"local-model\"\nconcurrent_tools = true\n";
        std::fs::write(&path, raw).unwrap();

        let config = SwarmConfig::load(&path).unwrap();
        let from_file = SwarmConfig::from_toml_str(raw).unwrap();
        assert_eq!(config, from_file.clone().with_overrides(|key| std::env::var(key).ok()));
        if std::env::var("SWARM_DEFAULT_MODEL").is_err() && std::env::var("DEFAULT_MODEL").is_err() {
            assert_eq!(config.default_model, "local-model");
        }
        assert_ne!(from_file, SwarmConfig::default());
        assert!(matches!(
            SwarmConfig::load(dir.path().join("missing.toml")),
            Err(SwarmError::Io(_))
        ));
    }

    #[test]
    fn debug_output_redacts_key() {
        let config = SwarmConfig::new().with_api_key("sk-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
