use std::env;
use std::path::PathBuf;

use crate::errors::ConfigError;

/// Runtime environment used by the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    fn from_str(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

/// Global configuration shared across the workspace.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory holding timeline documents for the file store.
    pub data_dir: PathBuf,
    /// Postgres connection string, required only by the Postgres store.
    pub database_url: Option<String>,
    pub environment: Environment,
    pub node_name: String,
}

impl CoreConfig {
    /// Loads configuration from `COVENANT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env_with_prefix("COVENANT_")
    }

    /// Loads configuration from env vars carrying the provided prefix.
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        let key = |suffix: &str| format!("{}{}", prefix, suffix);

        let data_dir = env::var(key("DATA_DIR"))
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());

        let database_url = env::var(key("DATABASE_URL")).ok();

        let environment = env::var(key("ENV"))
            .map(|raw| Environment::from_str(&raw))
            .unwrap_or_default();

        let node_name =
            env::var(key("NODE_NAME")).unwrap_or_else(|_| "covenant-node".to_string());

        Ok(Self {
            data_dir,
            database_url,
            environment,
            node_name,
        })
    }

    /// Returns the Postgres URL, failing when it was never configured.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("COVENANT_DATABASE_URL".to_string()))
    }

    /// Whether the process is running in production.
    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".covenant").join("data"))
        .unwrap_or_else(|| PathBuf::from(".covenant/data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_environment() {
        std::env::remove_var("COVENANT_ENV");
        let cfg = CoreConfig::from_env().expect("config should load");
        assert_eq!(cfg.environment, Environment::Development);
        assert_eq!(cfg.node_name, "covenant-node");
    }

    #[test]
    fn database_url_is_required_lazily() {
        std::env::remove_var("COVENANT_DATABASE_URL");
        let cfg = CoreConfig::from_env().expect("config should load");
        assert!(cfg.database_url().is_err());
    }

    #[test]
    fn prefix_selects_the_variable_set() {
        std::env::set_var("SESSION_DATA_DIR", "/tmp/covenant-test-data");
        let cfg = CoreConfig::from_env_with_prefix("SESSION_").expect("config should load");
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/covenant-test-data"));
        std::env::remove_var("SESSION_DATA_DIR");
    }
}
