use chrono::Utc;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::audit::AuditRecorder;
use crate::error::{UserError, UserResult};
use crate::merge::{merge_basic_info, merge_phones};
use crate::models::{
    AuditAction, CreateUserRequest, CreatedUser, ListUsersQuery, LogQuery, NewPhone, NewUser,
    Page, PageRequest, SortField, StatusFilter, UpdateUserRequest, User, UserLogResponse,
    UserResponse,
};
use crate::password::PasswordHasher;
use crate::repository::UserRepository;
use crate::token::TokenIssuer;
use crate::validation::{ValidationRules, validate_phone_list, validate_user_is_active};

/// Service layer for the user lifecycle
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    rules: ValidationRules,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R, rules: ValidationRules, tokens: TokenIssuer) -> Self {
        Self {
            repository: Arc::new(repository),
            rules,
            hasher: PasswordHasher::new(),
            tokens,
        }
    }

    /// Registers a new active user and returns its summary with a fresh token.
    pub async fn create_user(&self, request: CreateUserRequest) -> UserResult<CreatedUser> {
        tracing::info!(email = %request.email, "Creating user");

        self.rules.validate_email(&request.email)?;
        self.rules.validate_password(&request.password)?;
        validate_phone_list(&request.phones)?;

        if self.repository.exists_by_email(&request.email).await? {
            tracing::warn!(email = %request.email, "Email already registered");
            return Err(UserError::DuplicateEmail(request.email));
        }

        let now = Utc::now();
        let new_user = NewUser {
            password_hash: self.hasher.hash(&request.password)?,
            name: request.name,
            email: request.email,
            created_at: now,
            updated_at: now,
            last_login: now,
            is_active: true,
            phones: request
                .phones
                .into_iter()
                .map(|p| NewPhone {
                    number: p.number.unwrap_or_default(),
                    city_code: p.citycode.unwrap_or_default(),
                    country_code: p.countrycode.unwrap_or_default(),
                })
                .collect(),
        };

        let mut uow = self.repository.begin().await?;
        let mut user = uow.insert_user(new_user).await?;
        user.token = Some(self.tokens.issue(&user)?);
        let user = uow.save_user(&user).await?;

        let mut audit = AuditRecorder::new();
        audit.record(uow.as_mut(), AuditAction::Created, &user).await?;
        uow.commit().await?;
        audit.publish();

        tracing::info!(user_id = %user.id, "Created user");
        Ok(CreatedUser {
            id: user.id,
            created: user.created_at,
            modified: user.updated_at,
            last_login: user.last_login,
            token: user.token.unwrap_or_default(),
            isactive: user.is_active,
        })
    }

    pub async fn get_by_email(&self, email: &str) -> UserResult<UserResponse> {
        self.rules.validate_email(email)?;

        let user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or_else(|| UserError::not_found_email(email))?;

        Ok(user.into())
    }

    /// One page of users. The status filter trims the fetched page only, so
    /// `total_elements` always reports the unfiltered store total.
    pub async fn list_users(&self, query: ListUsersQuery) -> UserResult<Page<UserResponse>> {
        let request = PageRequest::from_query(query.page, query.size);

        let sort = match query.sort.as_deref().map(str::trim) {
            None | Some("") => SortField::default(),
            Some(raw) => SortField::from_str(raw)
                .map_err(|_| UserError::InvalidFormat(format!("Unknown sort field: {}", raw)))?,
        };
        let status = StatusFilter::parse(query.status.as_deref());

        let mut page = self.repository.find_page(request, sort).await?;
        if let Some(status) = status {
            page.content.retain(|user| status.matches(user));
        }

        Ok(page.map(UserResponse::from))
    }

    pub async fn update_user(
        &self,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> UserResult<UserResponse> {
        tracing::info!(user_id = %id, "Updating user");

        let mut user = self.find_user(id).await?;
        if let Err(e) = validate_user_is_active(&user) {
            tracing::warn!(user_id = %id, "Rejected update of inactive user");
            return Err(e);
        }

        merge_basic_info(&mut user, &request, &self.rules, &self.hasher)?;
        merge_phones(&mut user, request.phones.as_deref());

        let now = Utc::now();
        user.token = Some(self.tokens.issue(&user)?);
        user.updated_at = now;
        user.last_login = now;

        let user = self.persist(&user, AuditAction::Updated).await?;
        Ok(user.into())
    }

    pub async fn deactivate_user(&self, id: Uuid) -> UserResult<()> {
        let mut user = self.find_user(id).await?;
        if !user.is_active {
            tracing::warn!(user_id = %id, "User already inactive");
            return Err(UserError::AlreadyInactive(id));
        }

        user.is_active = false;
        user.updated_at = Utc::now();

        self.persist(&user, AuditAction::Deactivated).await?;
        Ok(())
    }

    pub async fn reactivate_user(&self, id: Uuid) -> UserResult<()> {
        let mut user = self.find_user(id).await?;
        if user.is_active {
            tracing::warn!(user_id = %id, "User already active");
            return Err(UserError::AlreadyActive(id));
        }

        let now = Utc::now();
        user.is_active = true;
        user.updated_at = now;
        user.last_login = now;
        user.token = Some(self.tokens.issue(&user)?);

        self.persist(&user, AuditAction::Reactivated).await?;
        Ok(())
    }

    pub async fn list_logs(&self, query: LogQuery) -> UserResult<Page<UserLogResponse>> {
        let request = PageRequest::from_query(query.page, query.size);
        let page = self.repository.find_logs(request, query.user_id).await?;
        Ok(page.map(UserLogResponse::from))
    }

    async fn find_user(&self, id: Uuid) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| UserError::not_found_id(id))
    }

    /// Saves `user` and its audit entry in one unit of work.
    async fn persist(&self, user: &User, action: AuditAction) -> UserResult<User> {
        let mut uow = self.repository.begin().await?;
        let saved = uow.save_user(user).await?;

        let mut audit = AuditRecorder::new();
        audit.record(uow.as_mut(), action, &saved).await?;
        uow.commit().await?;
        audit.publish();

        tracing::info!(user_id = %saved.id, action = %action, "User changed");
        Ok(saved)
    }
}
