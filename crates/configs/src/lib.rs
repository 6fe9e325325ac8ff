use std::str::FromStr;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub worker_threads: Option<usize>,
    pub frontend_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            worker_threads: Some(4),
            frontend_dir: "frontend".into(),
        }
    }
}

/// Which backing store the email table lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Dynamo,
    File,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dynamo" | "dynamodb" => Ok(Self::Dynamo),
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!("unknown store backend `{other}`; expected dynamo, file or memory")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub table_name: String,
    /// Endpoint override for DynamoDB Local or LocalStack.
    pub endpoint_url: Option<String>,
    /// Directory holding `<table_name>.json` for the file backend.
    pub data_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            table_name: String::new(),
            endpoint_url: None,
            data_dir: "data".into(),
        }
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (if present), overlay process environment, then validate.
    ///
    /// A missing table name is fatal: callers are expected to abort startup on `Err`.
    pub fn load_and_validate() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path).map_err(|e| anyhow!("failed to read {path}: {e}"))?
        } else {
            AppConfig::default()
        };
        cfg.apply_env_overrides_with(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay environment variables using the supplied lookup.
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TABLE_NAME") {
            self.store.table_name = v;
        }
        if let Some(v) = lookup("STORE_BACKEND") {
            self.store.backend = v.parse()?;
        }
        if let Some(v) = lookup("DYNAMODB_ENDPOINT") {
            self.store.endpoint_url = Some(v);
        }
        if let Some(v) = lookup("DATA_DIR") {
            self.store.data_dir = v;
        }
        if let Some(v) = lookup("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("SERVER_PORT") {
            self.server.port = v
                .parse()
                .map_err(|_| anyhow!("SERVER_PORT must be an integer in 1..=65535, got `{v}`"))?;
        }
        if let Some(v) = lookup("FRONTEND_DIR") {
            self.server.frontend_dir = v;
        }
        if let Some(v) = lookup("TOKIO_WORKER_THREADS") {
            let threads = v
                .parse::<usize>()
                .map_err(|_| anyhow!("TOKIO_WORKER_THREADS must be a positive integer, got `{v}`"))?;
            self.server.worker_threads = Some(threads);
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.normalize();
        self.store.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl StoreConfig {
    fn normalize(&mut self) {
        self.table_name = self.table_name.trim().to_string();
        if self.endpoint_url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            self.endpoint_url = None;
        }
        if self.data_dir.trim().is_empty() {
            self.data_dir = "data".into();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.table_name.is_empty() {
            return Err(anyhow!("TABLE_NAME is not set; provide it in the environment or as store.table_name in config.toml"));
        }
        // DynamoDB naming rules; the file backend also uses the name as a file stem
        let len = self.table_name.len();
        if !(3..=255).contains(&len) {
            return Err(anyhow!("table name must be 3..=255 characters, got {len}"));
        }
        if !self
            .table_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(anyhow!("table name may only contain [A-Za-z0-9_.-]: `{}`", self.table_name));
        }
        Ok(())
    }
}
