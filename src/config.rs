use base64::engine::general_purpose;
use base64::Engine;
use config::{Config, ConfigError as BaseConfigError, File};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::DEFAULT_IOS_STORE_URL;
use crate::client_ip::TrustedProxies;
use crate::server::constants::{
    MAX_MAX_UPLOAD_BYTES, MAX_SESSION_AGE_HOURS, MIN_MAX_UPLOAD_BYTES, MIN_SESSION_SECRET_BYTES,
};
use crate::uploads::DEFAULT_MAX_UPLOAD_BYTES;

/// Loopback only: a reverse proxy on the same host.
const DEFAULT_TRUSTED_PROXIES: &str = "127.0.0.1/32,::1/128";

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct StorageConfig {
    /// Directory holding the installer files named by the catalog.
    pub root: PathBuf,
    pub max_upload_bytes: u64,
    /// Landing page assets served for any path the router does not handle.
    pub public_root: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct SecurityConfig {
    pub admin_password: Option<String>,
    pub session_secret: Option<String>,
    pub cookie_secure: bool,
    /// Proxy addresses or CIDR blocks allowed to set `X-Forwarded-For`.
    pub trusted_proxies: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub max_age_hours: u64,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct CatalogConfig {
    pub ios_store_url: String,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct UiConfig {
    pub brand_name: String,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
    pub session: SessionConfig,
    pub catalog: CatalogConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Config(#[from] BaseConfigError),
    #[error("Storage directory error: {0}")]
    StorageDir(String),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let mut settings = Config::builder();

        settings = settings.add_source(config::Config::try_from(&AppConfig::default())?);
        settings = settings.add_source(File::with_name("config").required(false));

        settings = settings
            .set_override(
                "server.bind_addr",
                std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            )?
            .set_override(
                "server.port",
                std::env::var("PORT")
                    .unwrap_or_else(|_| "5001".to_string())
                    .parse::<u16>()
                    .unwrap_or(5001),
            )?
            .set_override(
                "storage.root",
                std::env::var("DOWNLOADS_DIR").unwrap_or_else(|_| "./downloads".to_string()),
            )?
            .set_override(
                "storage.max_upload_bytes",
                std::env::var("MAX_UPLOAD_BYTES")
                    .ok()
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            )?
            .set_override("storage.public_root", std::env::var("PUBLIC_DIR").ok())?
            .set_override(
                "security.admin_password",
                std::env::var("ADMIN_PASSWORD").ok(),
            )?
            .set_override(
                "security.session_secret",
                std::env::var("SESSION_SECRET").ok(),
            )?
            .set_override(
                "security.cookie_secure",
                std::env::var("COOKIE_SECURE")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse::<bool>()
                    .unwrap_or(false),
            )?
            .set_override(
                "security.trusted_proxies",
                std::env::var("TRUSTED_PROXIES")
                    .unwrap_or_else(|_| DEFAULT_TRUSTED_PROXIES.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<String>>(),
            )?
            .set_override(
                "session.cookie_name",
                std::env::var("SESSION_COOKIE_NAME")
                    .unwrap_or_else(|_| "soporte_remoto_sid".to_string()),
            )?
            .set_override(
                "session.max_age_hours",
                std::env::var("SESSION_MAX_AGE_HOURS")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse::<u64>()
                    .unwrap_or(2),
            )?
            .set_override(
                "catalog.ios_store_url",
                std::env::var("IOS_STORE_URL")
                    .unwrap_or_else(|_| DEFAULT_IOS_STORE_URL.to_string()),
            )?
            .set_override(
                "ui.brand_name",
                std::env::var("UI_BRAND_NAME").unwrap_or_else(|_| "Soporte Remoto".to_string()),
            )?;

        let settings = settings.build()?;

        let mut config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.storage.max_upload_bytes < MIN_MAX_UPLOAD_BYTES {
            return Err(ConfigError::Validation(
                "MAX_UPLOAD_BYTES must be at least 1MB".to_string(),
            ));
        }
        if self.storage.max_upload_bytes > MAX_MAX_UPLOAD_BYTES {
            return Err(ConfigError::Validation(
                "MAX_UPLOAD_BYTES cannot exceed 5GB".to_string(),
            ));
        }

        if let Err(e) = fs::create_dir_all(&self.storage.root) {
            return Err(ConfigError::StorageDir(format!(
                "Cannot create storage directory {}: {}",
                self.storage.root.display(),
                e
            )));
        }

        // Empty values from the environment mean "not configured".
        if self
            .security
            .admin_password
            .as_deref()
            .is_some_and(str::is_empty)
        {
            self.security.admin_password = None;
        }
        if self
            .security
            .session_secret
            .as_deref()
            .is_some_and(str::is_empty)
        {
            self.security.session_secret = None;
        }

        if let Some(secret) = self.security.session_secret.as_deref() {
            let secret_len = decode_secret(secret)?.len();
            if secret_len < MIN_SESSION_SECRET_BYTES {
                return Err(ConfigError::Validation(format!(
                    "SESSION_SECRET must be at least {MIN_SESSION_SECRET_BYTES} bytes"
                )));
            }
        }

        if let Err(err) = TrustedProxies::parse(&self.security.trusted_proxies) {
            return Err(ConfigError::Validation(format!("TRUSTED_PROXIES: {err}")));
        }

        if self.session.max_age_hours < 1 || self.session.max_age_hours > MAX_SESSION_AGE_HOURS {
            return Err(ConfigError::Validation(format!(
                "SESSION_MAX_AGE_HOURS must be between 1 and {MAX_SESSION_AGE_HOURS}"
            )));
        }

        let store_url = self.catalog.ios_store_url.trim();
        if !(store_url.starts_with("https://") || store_url.starts_with("http://")) {
            return Err(ConfigError::Validation(
                "IOS_STORE_URL must be an http(s) URL".to_string(),
            ));
        }

        Ok(())
    }

    /// Raw bytes of the configured session secret, if any.
    pub fn session_secret_bytes(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        self.security
            .session_secret
            .as_deref()
            .map(decode_secret)
            .transpose()
    }
}

/// Secrets may be given verbatim or as `base64:<encoded bytes>`.
fn decode_secret(secret: &str) -> Result<Vec<u8>, ConfigError> {
    match secret.strip_prefix("base64:") {
        Some(encoded) => general_purpose::STANDARD.decode(encoded).map_err(|e| {
            ConfigError::Validation(format!("Invalid base64 for SESSION_SECRET: {}", e))
        }),
        None => Ok(secret.as_bytes().to_vec()),
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "0.0.0.0".to_string(),
                port: 5001,
            },
            storage: StorageConfig {
                root: PathBuf::from("./downloads"),
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
                public_root: None,
            },
            security: SecurityConfig {
                admin_password: None, // Admin panel disabled until provided
                session_secret: None, // Random per process when absent
                cookie_secure: false,
                trusted_proxies: DEFAULT_TRUSTED_PROXIES
                    .split(',')
                    .map(str::to_string)
                    .collect(),
            },
            session: SessionConfig {
                cookie_name: "soporte_remoto_sid".to_string(),
                max_age_hours: 2,
            },
            catalog: CatalogConfig {
                ios_store_url: DEFAULT_IOS_STORE_URL.to_string(),
            },
            ui: UiConfig {
                brand_name: "Soporte Remoto".to_string(),
            },
        }
    }
}
