//! Scout configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main Scout configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Workflow controller limits
    pub agent: AgentConfig,

    /// Flight/hotel search credentials and endpoints
    pub search: SearchConfig,

    /// Calendar integration
    pub calendar: CalendarConfig,

    /// Trip store location
    pub storage: StorageConfig,
}

impl Config {
    /// Validate configuration before a run starts
    ///
    /// Only the LLM key is required; search and calendar credentials
    /// degrade per-tool at call time instead of blocking the session.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "Missing required configuration: {}. Set it in your environment or .env file.",
                self.llm.api_key_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: .scout.yml
        let local_config = PathBuf::from(".scout.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/scout/scout.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("scout").join("scout.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier
    pub model: String,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 4096,
            timeout_ms: 120_000,
        }
    }
}

/// Workflow controller limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum research/tools cycles before forcing comparison
    #[serde(rename = "max-tool-rounds")]
    pub max_tool_rounds: u32,

    /// Tools the workflow may use; empty means all registered tools.
    /// A name with no registered tool fails the run at startup.
    pub tools: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: 5,
            tools: Vec::new(),
        }
    }
}

/// Flight/hotel search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Environment variable holding the SerpApi key (flights)
    #[serde(rename = "serpapi-key-env")]
    pub serpapi_key_env: String,

    /// SerpApi endpoint
    #[serde(rename = "serpapi-base-url")]
    pub serpapi_base_url: String,

    /// Environment variable holding the Skyscanner key (hotels)
    #[serde(rename = "skyscanner-key-env")]
    pub skyscanner_key_env: String,

    /// Per-request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            serpapi_key_env: "SERPAPI_API_KEY".to_string(),
            serpapi_base_url: "https://serpapi.com/search".to_string(),
            skyscanner_key_env: "SKYSCANNER_API_KEY".to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// Calendar integration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Path to the stored Google OAuth token
    #[serde(rename = "token-path")]
    pub token_path: PathBuf,

    /// Calendar API endpoint
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        let token_path = dirs::config_dir()
            .map(|d| d.join("scout").join("token.json"))
            .unwrap_or_else(|| PathBuf::from("token.json"));
        Self {
            token_path,
            base_url: "https://www.googleapis.com/calendar/v3".to_string(),
        }
    }
}

/// Trip store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database path
    #[serde(rename = "db-path")]
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = dirs::data_dir()
            .map(|d| d.join("scout").join("scout.db"))
            .unwrap_or_else(|| PathBuf::from("scout.db"));
        Self { db_path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.api_key_env, "ANTHROPIC_API_KEY");
        assert!(config.llm.model.contains("sonnet"));
        assert_eq!(config.agent.max_tool_rounds, 5);
        assert!(config.agent.tools.is_empty());
        assert_eq!(config.search.serpapi_key_env, "SERPAPI_API_KEY");
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  model: claude-opus-4
  api-key-env: MY_API_KEY
  max-tokens: 2048
  timeout-ms: 60000

agent:
  max-tool-rounds: 3
  tools:
    - search_flights
    - search_hotels

search:
  serpapi-key-env: MY_SERP_KEY
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.llm.model, "claude-opus-4");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.agent.max_tool_rounds, 3);
        assert_eq!(config.agent.tools, vec!["search_flights", "search_hotels"]);
        assert_eq!(config.search.serpapi_key_env, "MY_SERP_KEY");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: claude-haiku
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.llm.model, "claude-haiku");
        assert_eq!(config.llm.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.agent.max_tool_rounds, 5);
    }

    #[test]
    fn test_validate_missing_key() {
        let mut config = Config::default();
        config.llm.api_key_env = "SCOUT_TEST_DEFINITELY_UNSET_KEY".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SCOUT_TEST_DEFINITELY_UNSET_KEY"));
    }
}
