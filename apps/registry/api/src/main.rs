use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{connect_from_config_with_retry, run_migrations};
use domain_users::{PgUserRepository, TokenIssuer, UserService, ValidationRules};
use migration::Migrator;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Before any fallible operation so startup errors get the colored report
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    let db = connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    if config.run_migrations {
        run_migrations::<Migrator>(&db, config.app.name)
            .await
            .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;
    }

    let rules = ValidationRules::from_config(&config.validation)?;
    let tokens = TokenIssuer::new(&config.tokens);
    let service = UserService::new(PgUserRepository::new(db.clone()), rules, tokens);

    // create_router nests these under /api and adds docs and middleware
    let router = create_router::<openapi::ApiDoc>(api::routes(service))?;

    // /health: liveness with app name/version
    // /ready: readiness with a database probe
    let app = router
        .merge(health_router(config.app))
        .merge(api::ready_router(db.clone()));

    info!(
        app = config.app.name,
        version = config.app.version,
        "Starting registry API"
    );

    create_production_app(
        app,
        &config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing database connections");
            match db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Registry API shutdown complete");
    Ok(())
}
