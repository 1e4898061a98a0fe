//! Users Domain
//!
//! The user registry lifecycle: registration, lookup, partial updates,
//! deactivation and reactivation, each state change paired with an audit
//! entry and a freshly issued access token.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Lifecycle rules, validation, merge, tokens, audit
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Reads + unit of work (in-memory and Postgres)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Records, requests, projections
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use core_config::FromEnv;
//! use domain_users::{
//!     handlers, InMemoryUserRepository, TokenConfig, TokenIssuer, UserService,
//!     ValidationConfig, ValidationRules,
//! };
//!
//! # fn main() -> Result<(), core_config::ConfigError> {
//! let rules = ValidationRules::from_config(&ValidationConfig::from_env()?)?;
//! let tokens = TokenIssuer::new(&TokenConfig::from_env()?);
//! let service = UserService::new(InMemoryUserRepository::new(), rules, tokens);
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod merge;
pub mod models;
pub mod password;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod token;
pub mod validation;

// Re-export commonly used types
pub use config::{TokenConfig, ValidationConfig};
pub use error::{PhoneField, PhoneListError, UserError, UserResult};
pub use models::{
    AuditAction, CreateUserRequest, CreatedUser, ListUsersQuery, LogQuery, MessageResponse, Page,
    PageRequest, PhoneInput, PhoneResponse, SortField, UpdateUserRequest, User, UserLog,
    UserLogResponse, UserResponse,
};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UnitOfWork, UserRepository};
pub use service::UserService;
pub use token::TokenIssuer;
pub use validation::ValidationRules;
