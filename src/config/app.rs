//! # Application Configuration Loader
//!
//! Provides a unified configuration loader for the database and the
//! application clock.
//!
//! Automatically loads `.env` files for non-production environments.
//! It checks for a custom `DOTENV_FILE` path first, then falls back to
//! `.env.{APP_ENV}` or `.env`.
//!
//! # Environment Variables
//! | Variable | Description | Default |
//! |-----------|-------------|----------|
//! | `APP_ENV` | Current environment (`development`, `production`, etc.) | `"development"` |
//! | `DOTENV_FILE` | Optional path to a custom dotenv file | *none* |
//! | `APP_TIMEZONE` | Zone of the system clock | `Local` |
//! | `DATABASE_URL` | MySQL connection URL | *required for pools* |
//! | `DATABASE_MAX_CONN` | Maximum pool size | *driver default* |
//! | `SQL_DEBUG` | Extra diagnostics on failed queries | `false` |
//!
//! # Example
//! ```rust,no_run
//! use wzs_date::config::app::AppConfig;
//! use wzs_date::time::Clock;
//!
//! let cfg = AppConfig::from_env();
//! println!("today = {}", cfg.time.clock().today());
//! ```

use std::env;

use tracing::debug;

use crate::config::{db::DbConfig, time::TimeConfig};

/// Top-level application configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Database configuration.
    pub db: DbConfig,
    /// Clock zone configuration.
    pub time: TimeConfig,
}

impl AppConfig {
    /// Loads application configuration from environment variables.
    ///
    /// ## Behavior
    /// - Reads `APP_ENV` (defaults to `"development"`).
    /// - Loads `.env` or `.env.{APP_ENV}` for non-production environments.
    /// - Parses all supported environment variables and falls back to defaults.
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        if app_env != "production" {
            if let Ok(path) = env::var("DOTENV_FILE") {
                if let Err(e) = dotenvy::from_filename(&path) {
                    debug!(path = %path, "dotenv file not loaded: {e}");
                }
            } else {
                let candidate = format!(".env.{}", app_env);
                dotenvy::from_filename(&candidate)
                    .or_else(|_| dotenvy::dotenv())
                    .ok();
            }
        }

        AppConfig {
            db: DbConfig::from_env(),
            time: TimeConfig::from_env(),
        }
    }
}
