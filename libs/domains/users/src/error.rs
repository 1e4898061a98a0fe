use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("{0}")]
    InvalidFormat(String),

    #[error("{0}")]
    EmptyList(String),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("{0}")]
    NotFound(String),

    #[error("User {0} is inactive and cannot be modified")]
    InactiveRecord(Uuid),

    #[error("User {0} is already active")]
    AlreadyActive(Uuid),

    #[error("User {0} is already inactive")]
    AlreadyInactive(Uuid),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    pub fn not_found_id(id: Uuid) -> Self {
        UserError::NotFound(format!("User not found with id: {}", id))
    }

    pub fn not_found_email(email: &str) -> Self {
        UserError::NotFound(format!("User not found with email: {}", email))
    }
}

/// Phone field named in a [`PhoneListError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneField {
    Number,
    CityCode,
    CountryCode,
}

impl fmt::Display for PhoneField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PhoneField::Number => "number",
            PhoneField::CityCode => "city code",
            PhoneField::CountryCode => "country code",
        })
    }
}

/// First violation found in a phone list. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneListError {
    #[error("At least one phone is required")]
    Empty,

    #[error("Phone {field} at position {position} is required")]
    Missing { position: usize, field: PhoneField },

    #[error("{}", malformed_message(.position, .field))]
    Malformed { position: usize, field: PhoneField },
}

fn malformed_message(position: &usize, field: &PhoneField) -> String {
    match field {
        PhoneField::Number => format!(
            "Phone number at position {} must contain only digits and be 7 to 8 characters long",
            position
        ),
        _ => format!(
            "Phone {} at position {} must contain only digits",
            field, position
        ),
    }
}

impl From<PhoneListError> for UserError {
    fn from(err: PhoneListError) -> Self {
        match err {
            PhoneListError::Empty => UserError::EmptyList(err.to_string()),
            _ => UserError::InvalidFormat(err.to_string()),
        }
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidFormat(msg) | UserError::EmptyList(msg) => AppError::BadRequest(msg),
            UserError::NotFound(msg) => AppError::NotFound(msg),
            UserError::DuplicateEmail(_)
            | UserError::InactiveRecord(_)
            | UserError::AlreadyActive(_)
            | UserError::AlreadyInactive(_) => AppError::Conflict(err.to_string()),
            UserError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
