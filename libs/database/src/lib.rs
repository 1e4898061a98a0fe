//! PostgreSQL connectivity for the registry services.
//!
//! - [`postgres`]: pool configuration, connect-with-retry, migrations, health probe
//! - [`common`]: the shared error type and the retry helper
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::postgres::{PostgresConfig, connect_from_config_with_retry, run_migrations};
//!
//! let config = PostgresConfig::from_env()?;
//! let db = connect_from_config_with_retry(config, None).await?;
//! run_migrations::<migration::Migrator>(&db, "registry_api").await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult, RetryConfig};
