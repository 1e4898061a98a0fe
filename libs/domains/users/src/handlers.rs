use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post, put},
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::models::{
    AuditAction, CreateUserRequest, CreatedUser, ListUsersQuery, LogQuery, MessageResponse, Page,
    PhoneInput, PhoneResponse, UpdateUserRequest, UserLogResponse, UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;

const USERS_TAG: &str = "users";
const LOGS_TAG: &str = "logs";

/// OpenAPI documentation for the user registry
#[derive(OpenApi)]
#[openapi(
    paths(
        create_user,
        list_users,
        get_user_by_email,
        update_user,
        deactivate_user,
        reactivate_user,
        list_logs,
    ),
    components(
        schemas(
            CreateUserRequest,
            UpdateUserRequest,
            PhoneInput,
            CreatedUser,
            UserResponse,
            PhoneResponse,
            UserLogResponse,
            AuditAction,
            MessageResponse,
        ),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = USERS_TAG, description = "User registration and lifecycle"),
        (name = LOGS_TAG, description = "Audit trail of user changes")
    )
)]
pub struct ApiDoc;

/// Create the registry router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/email/{email}", get(get_user_by_email))
        .route("/users/{id}", put(update_user).delete(deactivate_user))
        .route("/users/{id}/activate", patch(reactivate_user))
        .route("/logs", get(list_logs))
        .with_state(shared_service)
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = USERS_TAG,
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = CreatedUser),
        (status = 400, response = BadRequestResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateUserRequest>,
) -> UserResult<impl IntoResponse> {
    let created = service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List users, one page at a time
#[utoipa::path(
    get,
    path = "/users",
    tag = USERS_TAG,
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Page of users", body = Page<UserResponse>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Query(query): Query<ListUsersQuery>,
) -> UserResult<Json<Page<UserResponse>>> {
    let page = service.list_users(query).await?;
    Ok(Json(page))
}

/// Look a user up by email
#[utoipa::path(
    get,
    path = "/users/email/{email}",
    tag = USERS_TAG,
    params(
        ("email" = String, Path, description = "Email address, matched ignoring case")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user_by_email<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(email): Path<String>,
) -> UserResult<Json<UserResponse>> {
    let user = service.get_by_email(&email).await?;
    Ok(Json(user))
}

/// Apply a partial update to an active user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = USERS_TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateUserRequest>,
) -> UserResult<Json<UserResponse>> {
    let user = service.update_user(id, input).await?;
    Ok(Json(user))
}

/// Deactivate a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = USERS_TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deactivated", body = MessageResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn deactivate_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
) -> UserResult<Json<MessageResponse>> {
    service.deactivate_user(id).await?;
    Ok(Json(MessageResponse {
        message: "User deactivated".to_string(),
    }))
}

/// Reactivate a deactivated user
#[utoipa::path(
    patch,
    path = "/users/{id}/activate",
    tag = USERS_TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User activated", body = MessageResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn reactivate_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
) -> UserResult<Json<MessageResponse>> {
    service.reactivate_user(id).await?;
    Ok(Json(MessageResponse {
        message: "User activated".to_string(),
    }))
}

/// List audit entries, optionally for a single user
#[utoipa::path(
    get,
    path = "/logs",
    tag = LOGS_TAG,
    params(LogQuery),
    responses(
        (status = 200, description = "Page of audit entries", body = Page<UserLogResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_logs<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Query(query): Query<LogQuery>,
) -> UserResult<Json<Page<UserLogResponse>>> {
    let page = service.list_logs(query).await?;
    Ok(Json(page))
}
