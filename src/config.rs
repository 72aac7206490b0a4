//! Environment-variable based configuration

use std::env;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    #[allow(dead_code)]
    pub cors_origins: Vec<String>,
    pub room: RoomConfig,
    pub reaper: ReaperConfig,
    pub log_level: String,
}

/// Room configuration
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Name of the permanent default room, present from startup.
    pub default_name: String,
}

/// Presence reaper configuration
#[derive(Debug, Clone)]
pub struct ReaperConfig {
    pub interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            room: RoomConfig {
                default_name: env::var("DEFAULT_ROOM").unwrap_or_else(|_| "global".to_string()),
            },
            reaper: ReaperConfig {
                interval_secs: env::var("REAP_INTERVAL_SECS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .unwrap_or(300),
            },
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "127.0.0.1".to_string(),
            cors_origins: vec![],
            room: RoomConfig {
                default_name: "global".to_string(),
            },
            reaper: ReaperConfig { interval_secs: 300 },
            log_level: "info".to_string(),
        }
    }
}
