//! Configuration module

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Anomaly score above which an unmatched connection is blocked
    pub block_threshold: f64,

    /// Anomaly score at or above which an unmatched connection raises an alert
    pub alert_threshold: f64,

    /// Budget for one anomaly-scorer call, in milliseconds
    pub scorer_timeout_ms: u64,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            block_threshold: env::var("BLOCK_THRESHOLD")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(0.8),

            alert_threshold: env::var("ALERT_THRESHOLD")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(0.5),

            scorer_timeout_ms: env::var("SCORER_TIMEOUT_MS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(2000),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            block_threshold: 0.8,
            alert_threshold: 0.5,
            scorer_timeout_ms: 2000,
            environment: "development".to_string(),
        }
    }
}
