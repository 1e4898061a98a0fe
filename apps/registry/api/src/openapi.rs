use utoipa::openapi::OpenApi as OpenApiDoc;
use utoipa::{Modify, OpenApi};

/// Pulls the user registry paths and schemas into the service document.
struct RegistryPaths;

impl Modify for RegistryPaths {
    fn modify(&self, openapi: &mut OpenApiDoc) {
        openapi.merge(domain_users::handlers::ApiDoc::openapi());
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&RegistryPaths),
    components(
        schemas(axum_helpers::ErrorResponse, axum_helpers::ErrorCode)
    ),
    info(
        title = "Registry API",
        version = "0.1.0",
        description = "User registration, lifecycle management and audit trail"
    ),
    servers(
        (url = "/api", description = "API base path")
    )
)]
pub struct ApiDoc;
