use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, ServerError};

/// Environment variable naming an optional YAML config file.
pub const CONFIG_ENV: &str = "REELSERVE_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
    pub movie_api: MovieApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory all asset paths are resolved against
    pub root: PathBuf,
    /// Page served (relative to `root`) when a resource cannot be produced
    pub not_found_page: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MovieApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:35000".to_string(),
            read_timeout_ms: 5_000,
            write_timeout_ms: 5_000,
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("public"),
            not_found_page: "notFound.html".to_string(),
        }
    }
}

impl Default for MovieApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://www.omdbapi.com/".to_string(),
            api_key: None,
            connect_timeout_ms: 5_000,
            request_timeout_ms: 10_000,
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

impl MovieApiConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Loads configuration using `lookup` to read environment variables.
    ///
    /// The YAML file named by `REELSERVE_CONFIG` is read first (defaults are
    /// used when it is unset), then `LISTEN`, `REELSERVE_PUBLIC_DIR` and
    /// `OMDB_API_KEY` override the matching fields.
    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_ENV) {
            Some(path) => {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    ServerError::Config(format!("cannot read {}: {}", path, e))
                })?;
                Self::from_yaml_str(&content)?
            }
            None => Self::default(),
        };

        if let Some(listen_addr) = lookup("LISTEN") {
            config.server.listen_addr = listen_addr;
        }
        if let Some(root) = lookup("REELSERVE_PUBLIC_DIR") {
            config.static_files.root = PathBuf::from(root);
        }
        if let Some(api_key) = lookup("OMDB_API_KEY") {
            config.movie_api.api_key = Some(api_key);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parses a YAML document; missing fields take their defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.listen_addr.trim().is_empty() {
            return Err(ServerError::Config("server.listen_addr is empty".into()));
        }
        if self.server.read_timeout_ms == 0 || self.server.write_timeout_ms == 0 {
            return Err(ServerError::Config("server timeouts must be non-zero".into()));
        }
        if self.movie_api.connect_timeout_ms == 0 || self.movie_api.request_timeout_ms == 0 {
            return Err(ServerError::Config("movie_api timeouts must be non-zero".into()));
        }
        if self.static_files.not_found_page.is_empty() {
            return Err(ServerError::Config("static_files.not_found_page is empty".into()));
        }

        let url = url::Url::parse(&self.movie_api.base_url)
            .map_err(|e| ServerError::Config(format!("movie_api.base_url: {}", e)))?;
        if url.scheme() != "http" {
            return Err(ServerError::Config(format!(
                "movie_api.base_url: unsupported scheme {}",
                url.scheme()
            )));
        }

        Ok(())
    }
}
