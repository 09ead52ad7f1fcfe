//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (optional): PostgreSQL connection string. Without it the
///   service keeps API keys in memory and loses them on restart.
/// - `DATABASE_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `GITHUB_API_URL` (optional): GitHub REST base URL
/// - `OPENAI_API_KEY` (optional): enables the repository summarizer
/// - `OPENAI_BASE_URL` / `OPENAI_MODEL` (optional): summarizer endpoint and model
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    #[serde(default)]
    pub openai_api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if environment variable values cannot be parsed into expected types.
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names are automatically converted: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }

    /// Whether a usable summarizer key was configured.
    pub fn summarizer_enabled(&self) -> bool {
        self.openai_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_variables_are_missing() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();

        assert!(config.database_url.is_none());
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.github_api_url, "https://api.github.com");
        assert_eq!(config.openai_model, "gpt-3.5-turbo");
        assert!(!config.summarizer_enabled());
    }

    #[test]
    fn reads_explicit_values() {
        let vars = vec![
            ("DATABASE_URL".to_string(), "postgres://localhost/keys".to_string()),
            ("SERVER_PORT".to_string(), "8080".to_string()),
            ("OPENAI_API_KEY".to_string(), "sk-test".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/keys"));
        assert_eq!(config.server_port, 8080);
        assert!(config.summarizer_enabled());
    }

    #[test]
    fn blank_openai_key_disables_summarizer() {
        let vars = vec![("OPENAI_API_KEY".to_string(), "  ".to_string())];
        let config: Config = envy::from_iter(vars).unwrap();

        assert!(!config.summarizer_enabled());
    }
}
