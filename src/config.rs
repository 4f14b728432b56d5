use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_rust_log")]
    pub rust_log: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Connection URL; the sentinel "memory" selects the in-process store
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Blob root directory; the sentinel "memory" selects the in-process store
    #[serde(default = "default_storage_root")]
    pub root: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// OpenAI-compatible API base URL
    #[serde(default = "default_llm_api_base")]
    pub api_base: String,

    /// API key; "mock" selects the scripted in-process client
    #[serde(default = "default_llm_api_key")]
    pub api_key: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// Metadata extraction attempt budget (initial call + corrective retries)
    #[serde(default = "default_llm_max_attempts")]
    pub max_attempts: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_rust_log() -> String {
    "info,paperdock=debug".to_string()
}
fn default_database_url() -> String {
    "memory".to_string()
}
fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    2
}
fn default_connect_timeout() -> u64 {
    30
}
fn default_storage_root() -> String {
    "data/blobs".to_string()
}
fn default_llm_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_llm_api_key() -> String {
    "mock".to_string()
}
fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_llm_timeout() -> u64 {
    60
}
fn default_llm_max_attempts() -> u32 {
    2
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            rust_log: default_rust_log(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_llm_api_base(),
            api_key: default_llm_api_key(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
            max_attempts: default_llm_max_attempts(),
        }
    }
}

impl AppConfig {
    /// Load configuration from optional files and environment variables
    ///
    /// E.g. `APP__SERVER__PORT=8081` sets `server.port`.
    pub fn build() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "memory");
        assert_eq!(config.llm.max_attempts, 2);
    }
}
