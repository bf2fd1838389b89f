use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    pub format: String, // "json" or "text"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: String, // "s3" or "local"
    pub bucket: String,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub local_root: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "127.0.0.1:8080".to_string(),
            },
            database: DatabaseConfig {
                path: "data/notebridge.db".to_string(),
                max_connections: 10,
                connection_timeout_secs: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            storage: StorageConfig {
                backend: "local".to_string(),
                bucket: "notebridge-files".to_string(),
                region: None,
                endpoint_url: None,
                local_root: "data/blobs".to_string(),
                max_upload_bytes: 10 * 1024 * 1024,
            },
            chat: ChatConfig {
                default_page_size: 20,
                max_page_size: 100,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            // Start with default values
            .add_source(Config::try_from(&Self::default())?)
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix, e.g. NOTEBRIDGE__STORAGE__BACKEND=s3
            .add_source(Environment::with_prefix("NOTEBRIDGE").prefix_separator("__").separator("__"))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {}", e))?;

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(anyhow::anyhow!("Invalid bind address: {}", self.server.bind_addr));
        }

        // Validate database config
        if self.database.path.trim().is_empty() {
            return Err(anyhow::anyhow!("database path cannot be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!("max_connections must be greater than 0"));
        }
        if self.database.connection_timeout_secs == 0 {
            return Err(anyhow::anyhow!("connection_timeout_secs must be greater than 0"));
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        // Validate storage config
        let valid_backends = ["s3", "local"];
        if !valid_backends.contains(&self.storage.backend.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid storage backend: {}. Must be one of: {:?}",
                self.storage.backend,
                valid_backends
            ));
        }
        if self.storage.backend == "s3" && self.storage.bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("storage bucket is required for the s3 backend"));
        }
        if self.storage.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("max_upload_bytes must be greater than 0"));
        }

        // Validate chat config
        if self.chat.max_page_size == 0 {
            return Err(anyhow::anyhow!("max_page_size must be greater than 0"));
        }
        if self.chat.default_page_size == 0 || self.chat.default_page_size > self.chat.max_page_size {
            return Err(anyhow::anyhow!(
                "default_page_size must be between 1 and max_page_size ({})",
                self.chat.max_page_size
            ));
        }

        Ok(())
    }
}
