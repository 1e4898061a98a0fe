use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_parse, server::ServerConfig};
use database::postgres::PostgresConfig;
use domain_users::{TokenConfig, ValidationConfig};

pub use core_config::Environment;

/// Registry service configuration, composed from the shared config pieces.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub validation: ValidationConfig,
    pub tokens: TokenConfig,
    /// Apply pending migrations before serving (`RUN_MIGRATIONS`, default true)
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?; // DATABASE_URL is required
        let server = ServerConfig::from_env()?; // HOST=0.0.0.0, PORT=8080
        let validation = ValidationConfig::from_env()?;
        let tokens = TokenConfig::from_env()?; // JWT_SECRET is required

        Ok(Self {
            app: app_info!(),
            database,
            server,
            environment,
            validation,
            tokens,
            run_migrations: env_parse("RUN_MIGRATIONS", true)?,
        })
    }
}
