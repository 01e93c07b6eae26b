//! # Database Configuration and Pool Factory
//!
//! Provides database connection configuration (`DbConfig`) and a helper
//! to create a reusable MySQL connection pool (`DbPool`).
//!
//! The connection URL, maximum pool size and diagnostics flag are loaded from
//! environment variables (`DATABASE_URL`, `DATABASE_MAX_CONN`, `SQL_DEBUG`).
//!
//! # Examples
//! ```rust,no_run
//! use wzs_date::config::db::{DbConfig, create_pool};
//! use wzs_date::db::mysql_adapter::MySqlDb;
//!
//! let cfg = DbConfig::from_env();
//! if cfg.is_valid() {
//!     let pool = create_pool(&cfg).expect("failed to create pool");
//!     let db = MySqlDb::new(pool).with_sql_debug(cfg.sql_debug);
//! }
//! ```

use std::{env, sync::Arc};

use anyhow::Context;
use mysql::{Opts, OptsBuilder, Pool, PoolConstraints, PoolOpts};

use crate::config::env::{read_flag, read_u32_opt};

/// Lower bound kept by the pool when `DATABASE_MAX_CONN` allows it.
const MIN_POOL_CONNECTIONS: usize = 10;

/// Database connection configuration.
///
/// Reads from environment variables:
/// - `DATABASE_URL`: MySQL connection URL
/// - `DATABASE_MAX_CONN`: optional maximum pool size
/// - `SQL_DEBUG`: log the connected user and database after a failed query
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DbConfig {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub sql_debug: bool,
}

impl DbConfig {
    /// Builds a [`DbConfig`] from environment variables.
    pub fn from_env() -> Self {
        let url = env::var("DATABASE_URL").ok();
        let max_connections = read_u32_opt("DATABASE_MAX_CONN");
        Self {
            url,
            max_connections,
            sql_debug: read_flag("SQL_DEBUG", false),
        }
    }

    /// Returns `true` if `DATABASE_URL` is present.
    pub fn is_valid(&self) -> bool {
        self.url.is_some()
    }
}

/// Shared database pool type alias (`Arc<mysql::Pool>`).
pub type DbPool = Arc<Pool>;

/// Creates a new [`DbPool`] using the given configuration.
///
/// # Errors
/// Returns an error if:
/// - `DATABASE_URL` is missing
/// - the URL is invalid
/// - `DATABASE_MAX_CONN` is zero
/// - the pool cannot be created
pub fn create_pool(cfg: &DbConfig) -> anyhow::Result<DbPool> {
    let url = cfg
        .url
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;
    let mut opts = Opts::from_url(url).context("invalid DATABASE_URL")?;

    if let Some(max) = cfg.max_connections {
        let max = max as usize;
        let constraints = PoolConstraints::new(max.min(MIN_POOL_CONNECTIONS), max)
            .ok_or_else(|| anyhow::anyhow!("invalid DATABASE_MAX_CONN: {max}"))?;
        opts = OptsBuilder::from_opts(opts)
            .pool_opts(PoolOpts::default().with_constraints(constraints))
            .into();
    }

    let pool = Pool::new(opts).context("failed to create MySQL pool")?;
    Ok(Arc::new(pool))
}
