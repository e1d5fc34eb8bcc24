use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;
use crate::core::{DuplicatePolicy, EngineOptions};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub appwrite: AppwriteSettings,
    pub collection: CollectionSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    pub user_profiles: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
    #[serde(default = "default_notification_page_size")]
    pub notification_page_size: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::default(),
            operation_timeout_ms: default_operation_timeout_ms(),
            notification_page_size: default_notification_page_size(),
        }
    }
}

impl EngineSettings {
    pub fn options(&self) -> EngineOptions {
        EngineOptions {
            duplicate_policy: self.duplicate_policy,
            operation_timeout: Duration::from_millis(self.operation_timeout_ms),
            notification_page_size: self.notification_page_size,
        }
    }
}

fn default_operation_timeout_ms() -> u64 { 5000 }
fn default_notification_page_size() -> usize { 50 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with LUME_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., LUME__ENGINE__DUPLICATE_POLICY -> engine.duplicate_policy
            .add_source(
                Environment::with_prefix("LUME")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }
}

/// Apply the well-known environment variables that do not follow the
/// LUME__ naming scheme
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    // DATABASE_URL wins over everything else when present
    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(redis_url) = env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", redis_url)?;
    }

    let appwrite_overrides = [
        ("APPWRITE_ENDPOINT", "appwrite.endpoint"),
        ("APPWRITE_API_KEY", "appwrite.api_key"),
        ("APPWRITE_PROJECT_ID", "appwrite.project_id"),
        ("APPWRITE_DATABASE_ID", "appwrite.database_id"),
    ];
    for (var, key) in appwrite_overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    const MINIMAL: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 8080

        [appwrite]
        endpoint = "http://localhost/v1"
        api_key = "key"
        project_id = "project"
        database_id = "db"

        [collection]
        user_profiles = "profiles"

        [database]
        url = "postgres://localhost/lume"

        [cache]
        ttl_secs = 60
    "#;

    #[test]
    fn test_engine_defaults() {
        let engine = EngineSettings::default();
        assert_eq!(engine.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(engine.operation_timeout_ms, 5000);
        assert_eq!(engine.notification_page_size, 50);
        assert_eq!(engine.options().operation_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_minimal_config_fills_optional_sections() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(MINIMAL, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.collection.user_profiles, "profiles");
        assert!(settings.cache.redis_url.is_none());
        assert_eq!(settings.engine.duplicate_policy, DuplicatePolicy::Reject);
    }

    #[test]
    fn test_duplicate_policy_from_config() {
        let source = format!("{}\n[engine]\nduplicate_policy = \"ignore\"\n", MINIMAL);
        let settings: Settings = Config::builder()
            .add_source(File::from_str(&source, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.engine.duplicate_policy, DuplicatePolicy::Ignore);
        assert_eq!(settings.engine.operation_timeout_ms, 5000);
    }
}
