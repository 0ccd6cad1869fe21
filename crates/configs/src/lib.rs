use anyhow::anyhow;
use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".into(), port: 5000, worker_threads: Some(4) }
    }
}

/// Which backing medium the object store flushes to.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: StorageBackend::File, path: String::new() }
    }
}

/// What request handlers do with attributes an entity does not declare.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldsMode {
    #[default]
    Ignore,
    Reject,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub unknown_fields: UnknownFieldsMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_log_format() -> String { "compact".into() }

pub const DEFAULT_STORAGE_PATH: &str = "data/file.json";

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content).with_context(|| format!("invalid config file {path}"))
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map_or(false, |io| io.kind() == std::io::ErrorKind::NotFound)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

/// Build a config purely from `HBNB_*` environment variables.
pub fn from_env() -> AppConfig {
    let mut cfg = AppConfig::default();
    if let Ok(host) = std::env::var("HBNB_API_HOST") {
        cfg.server.host = host;
    }
    if let Some(port) = std::env::var("HBNB_API_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
        cfg.server.port = port;
    }
    if let Ok(backend) = std::env::var("HBNB_STORAGE_BACKEND") {
        if backend.eq_ignore_ascii_case("memory") {
            cfg.storage.backend = StorageBackend::Memory;
        }
    }
    cfg
}

impl AppConfig {
    /// `config.toml` if present, otherwise environment only; then normalized.
    ///
    /// A config file that exists but cannot be read or parsed is an error.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => from_env(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.normalize_from_env();
        self.storage.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "0.0.0.0".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn normalize_from_env(&mut self) {
        if self.path.trim().is_empty() {
            self.path = std::env::var("HBNB_STORAGE_PATH")
                .unwrap_or_else(|_| DEFAULT_STORAGE_PATH.to_string());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend == StorageBackend::File && self.path.trim().is_empty() {
            return Err(anyhow!("storage.path is empty; set it in config.toml or HBNB_STORAGE_PATH"));
        }
        if self.path.ends_with('/') {
            return Err(anyhow!("storage.path must name a file, got directory {}", self.path));
        }
        Ok(())
    }
}
