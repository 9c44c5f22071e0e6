use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::logging::LogLevel;

pub const API_BASE_URL_VAR: &str = "NEXT_PUBLIC_API_BASE_URL";
pub const API_TOKEN_VAR: &str = "NEXT_PUBLIC_API_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub storage: StorageConfig,
    pub services: ServicesConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub default_ttl_seconds: u64,
    pub company_ttl_seconds: u64,
    pub brands_ttl_seconds: u64,
    pub dashboard_ttl_seconds: u64,
    pub prompts_ttl_seconds: u64,
    pub visibility_ttl_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
    pub quota_bytes: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Http,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    pub company_source: DataSource,
    pub mock_dashboard: bool,
    pub scan_delay_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON when stdout is not a terminal, pretty otherwise.
    Auto,
    Json,
    Pretty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001/api".to_string(),
            token: None,
            timeout_seconds: 30,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: 5 * 60,
            company_ttl_seconds: 10 * 60,
            brands_ttl_seconds: 5 * 60,
            dashboard_ttl_seconds: 5 * 60,
            prompts_ttl_seconds: 10 * 60,
            visibility_ttl_seconds: 60 * 60,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_dir: PathBuf::from("./data"),
            quota_bytes: None,
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            company_source: DataSource::Local,
            mock_dashboard: true,
            scan_delay_ms: 1500,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::for_build(),
            format: LogFormat::Auto,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }

    pub fn company_ttl(&self) -> Duration {
        Duration::from_secs(self.company_ttl_seconds)
    }

    pub fn brands_ttl(&self) -> Duration {
        Duration::from_secs(self.brands_ttl_seconds)
    }

    pub fn dashboard_ttl(&self) -> Duration {
        Duration::from_secs(self.dashboard_ttl_seconds)
    }

    pub fn prompts_ttl(&self) -> Duration {
        Duration::from_secs(self.prompts_ttl_seconds)
    }

    pub fn visibility_ttl(&self) -> Duration {
        Duration::from_secs(self.visibility_ttl_seconds)
    }
}

impl ServicesConfig {
    pub fn scan_delay(&self) -> Duration {
        Duration::from_millis(self.scan_delay_ms)
    }
}

impl AppConfig {
    /// Defaults, then `geoiq.toml` if present, then `GEOIQ__SECTION__KEY`
    /// variables, then the `NEXT_PUBLIC_API_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Path::new("geoiq.toml");
        Self::load_from(path.exists().then_some(path))
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("GEOIQ")
                .separator("__")
                .try_parsing(true),
        );

        let mut app_config: AppConfig = builder.build()?.try_deserialize()?;
        app_config.apply_public_env(|name| std::env::var(name).ok());
        app_config.validate()?;

        Ok(app_config)
    }

    /// Applies the browser-era `NEXT_PUBLIC_API_*` overrides.
    pub fn apply_public_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(API_BASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = base_url;
        }
        if let Some(token) = lookup(API_TOKEN_VAR).filter(|v| !v.trim().is_empty()) {
            self.api.token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Message(
                "API base URL cannot be empty".to_string(),
            ));
        }

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(ConfigError::Message(format!(
                "API base URL must be http(s): {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "API timeout must be greater than 0".to_string(),
            ));
        }

        let ttls = [
            ("default", self.cache.default_ttl_seconds),
            ("company", self.cache.company_ttl_seconds),
            ("brands", self.cache.brands_ttl_seconds),
            ("dashboard", self.cache.dashboard_ttl_seconds),
            ("prompts", self.cache.prompts_ttl_seconds),
            ("visibility", self.cache.visibility_ttl_seconds),
        ];
        if let Some((name, _)) = ttls.iter().find(|(_, ttl)| *ttl == 0) {
            return Err(ConfigError::Message(format!(
                "Cache TTL '{}' must be greater than 0",
                name
            )));
        }

        if self.storage.backend == StorageBackend::File
            && self.storage.data_dir.as_os_str().is_empty()
        {
            return Err(ConfigError::Message(
                "Storage data directory cannot be empty".to_string(),
            ));
        }

        if self.storage.quota_bytes == Some(0) {
            return Err(ConfigError::Message(
                "Storage quota must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }

    pub fn create_directories(&self) -> Result<(), std::io::Error> {
        if self.storage.backend == StorageBackend::File {
            std::fs::create_dir_all(&self.storage.data_dir)?;
        }
        Ok(())
    }
}
