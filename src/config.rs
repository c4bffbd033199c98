use anyhow::Result;
use serde::Deserialize;
use std::env;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

/// Connection details for the remote analysis backend.
///
/// When `url` or `api_key` is missing the service runs in offline mode and
/// both gateway operations are satisfied locally with no network traffic.
/// The mode is decided once at startup and never changes afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub max_upload_bytes: u64,
}

impl BackendConfig {
    pub fn is_offline(&self) -> bool {
        self.url.is_none() || self.api_key.is_none()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
            },
            backend: BackendConfig {
                url: env::var("ANALYSIS_BACKEND_URL").ok().filter(|s| !s.is_empty()),
                api_key: env::var("ANALYSIS_BACKEND_KEY").ok().filter(|s| !s.is_empty()),
                max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                    .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
                    .parse()?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_when_credentials_missing() {
        let backend = BackendConfig {
            url: None,
            api_key: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        };
        assert!(backend.is_offline());

        let url_only = BackendConfig {
            url: Some("https://backend.example".to_string()),
            api_key: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        };
        assert!(url_only.is_offline());

        let configured = BackendConfig {
            url: Some("https://backend.example".to_string()),
            api_key: Some("service-key".to_string()),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        };
        assert!(!configured.is_offline());
    }
}
