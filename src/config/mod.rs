//! Configuration module for the caravan backend.
//!
//! All configuration is loaded from environment variables with development fallbacks.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

/// Default upload cap: 10 MiB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend project identifier, reported by the health and revision endpoints
    pub project_id: String,
    /// Pre-shared key guarding the admin routes
    pub admin_api_key: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Directory uploaded media is written to
    pub media_dir: PathBuf,
    /// Public origin used to build media URLs
    pub public_base_url: String,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    /// Largest accepted upload body in bytes
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let project_id =
            env::var("CARAVAN_PROJECT_ID").unwrap_or_else(|_| "caravan-site-dev".to_string());

        let admin_api_key = env::var("CARAVAN_ADMIN_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let db_path = env::var("CARAVAN_DB_PATH")
            .unwrap_or_else(|_| "./data/caravan.sqlite".to_string())
            .into();

        let media_dir = env::var("CARAVAN_MEDIA_DIR")
            .unwrap_or_else(|_| "./data/media".to_string())
            .into();

        let public_base_url = env::var("CARAVAN_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        let bind_addr = env::var("CARAVAN_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid CARAVAN_BIND_ADDR: {}", e)))?;

        let log_level = env::var("CARAVAN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("CARAVAN_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw).ok_or_else(|| {
                AppError::Internal(format!("Invalid CARAVAN_LOG_FORMAT: {}", raw))
            })?,
            Err(_) => LogFormat::Pretty,
        };

        let max_upload_bytes = match env::var("CARAVAN_MAX_UPLOAD_BYTES") {
            Ok(raw) => raw.trim().parse().map_err(|e| {
                AppError::Internal(format!("Invalid CARAVAN_MAX_UPLOAD_BYTES: {}", e))
            })?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            project_id,
            admin_api_key,
            db_path,
            media_dir,
            public_base_url,
            bind_addr,
            log_level,
            log_format,
            max_upload_bytes,
        })
    }
}
