use axum::{Router, routing::get};
use database::postgres::DatabaseConnection;
use domain_users::{PgUserRepository, UserService, handlers};

pub mod health;

/// API routes without the `/api` prefix, which `create_router` adds.
pub fn routes(service: UserService<PgUserRepository>) -> Router {
    handlers::router(service)
}

/// `/ready` with a live database probe. Merged next to the stateless router.
pub fn ready_router(db: DatabaseConnection) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(db)
}
