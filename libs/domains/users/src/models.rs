use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Shape check applied to incoming phone numbers on create.
///
/// Looser than the 7 to 8 digit rule in [`crate::validation::validate_phone_list`],
/// which runs afterwards and has the final say.
static PHONE_NUMBER_SHAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{7,10}$").unwrap());

fn validate_phone_number_shape(number: &str) -> Result<(), validator::ValidationError> {
    if !PHONE_NUMBER_SHAPE.is_match(number) {
        return Err(validator::ValidationError::new("invalid_phone_number"));
    }
    Ok(())
}

fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Domain records
// ---------------------------------------------------------------------------

/// A registered user with its owned phone list.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub is_active: bool,
    pub token: Option<String>,
    pub phones: Vec<Phone>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Phone {
    pub id: Uuid,
    pub user_id: Uuid,
    pub number: String,
    pub city_code: String,
    pub country_code: String,
}

/// A user that has not been stored yet. The store assigns every id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub is_active: bool,
    pub phones: Vec<NewPhone>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPhone {
    pub number: String,
    pub city_code: String,
    pub country_code: String,
}

impl NewUser {
    /// Attach store-assigned ids.
    pub fn into_user(self, id: Uuid) -> User {
        let phones = self
            .phones
            .into_iter()
            .map(|p| Phone {
                id: Uuid::now_v7(),
                user_id: id,
                number: p.number,
                city_code: p.city_code,
                country_code: p.country_code,
            })
            .collect();

        User {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
            last_login: self.last_login,
            is_active: self.is_active,
            token: None,
            phones,
        }
    }
}

/// Audit vocabulary. Stored and serialised lowercase.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuditAction {
    Created,
    Updated,
    Deactivated,
    Reactivated,
}

impl AuditAction {
    /// Dotted name used for structured audit events.
    pub fn event_name(&self) -> &'static str {
        match self {
            AuditAction::Created => "user.created",
            AuditAction::Updated => "user.updated",
            AuditAction::Deactivated => "user.deactivated",
            AuditAction::Reactivated => "user.reactivated",
        }
    }
}

/// Immutable audit entry.
#[derive(Debug, Clone, PartialEq)]
pub struct UserLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: AuditAction,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Phone entry as supplied by clients. Fields are optional so that missing
/// values reach the list validation with their position.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct PhoneInput {
    #[validate(custom(function = "validate_phone_number_shape"))]
    #[schema(example = "1234567")]
    pub number: Option<String>,
    #[schema(example = "1")]
    pub citycode: Option<String>,
    #[schema(example = "56")]
    pub countrycode: Option<String>,
}

impl PhoneInput {
    pub fn new(number: &str, citycode: &str, countrycode: &str) -> Self {
        Self {
            number: Some(number.to_string()),
            citycode: Some(citycode.to_string()),
            countrycode: Some(countrycode.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Juan Rodriguez")]
    pub name: String,
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "juan@rodriguez.org")]
    pub email: String,
    #[validate(length(min = 8))]
    #[schema(example = "Hunter22")]
    pub password: String,
    #[serde(default)]
    #[validate(nested)]
    pub phones: Vec<PhoneInput>,
}

/// Partial update. Absent or blank fields leave the stored value untouched.
///
/// Carries no shape rules: phones are merged as given, without the checks
/// applied on create.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phones: Option<Vec<PhoneInput>>,
}

/// Query string for the user listing.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// 1-based page number (default 1)
    pub page: Option<i64>,
    /// Page size (default 10)
    pub size: Option<i64>,
    /// created, modified, last_login, name or email (default created)
    #[serde(alias = "orden")]
    pub sort: Option<String>,
    /// active or inactive; anything else disables filtering
    #[serde(alias = "estado")]
    pub status: Option<String>,
}

/// Query string for the audit log listing.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LogQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    #[serde(alias = "userId")]
    pub user_id: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Paging and sorting
// ---------------------------------------------------------------------------

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Resolved paging request. `page` is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
}

impl PageRequest {
    /// Pages below 1 fall back to the first page, sizes below 1 to
    /// [`DEFAULT_PAGE_SIZE`]. Sizes are capped at [`MAX_PAGE_SIZE`] and the
    /// page is clamped so the row offset fits in an `i64`.
    pub fn from_query(page: Option<i64>, size: Option<i64>) -> Self {
        let size = match size {
            Some(s) if s >= 1 => (s as u64).min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        };
        let last_page = i64::MAX as u64 / size;
        let page = match page {
            Some(p) if p >= 1 => ((p - 1) as u64).min(last_page),
            _ => 0,
        };
        Self { page, size }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::from_query(None, None)
    }
}

/// Sortable user columns. Sorting is ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SortField {
    #[default]
    #[strum(to_string = "created", serialize = "creationDate", serialize = "created_at")]
    Created,
    #[strum(to_string = "modified", serialize = "updateDate", serialize = "updated_at")]
    Modified,
    #[strum(to_string = "last_login", serialize = "lastLogin")]
    LastLogin,
    Name,
    Email,
}

/// Status filter applied to an already fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Active,
    Inactive,
}

impl StatusFilter {
    /// Unrecognised values mean "no filter".
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw?.trim().to_lowercase().as_str() {
            "active" | "activos" => Some(Self::Active),
            "inactive" | "inactivos" => Some(Self::Inactive),
            _ => None,
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        match self {
            Self::Active => user.is_active,
            Self::Inactive => !user.is_active,
        }
    }
}

/// One page of results. `page` is reported 1-based.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            page: request.page + 1,
            size: request.size,
            total_elements,
            total_pages: total_elements.div_ceil(request.size.max(1)),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Summary returned after creating a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedUser {
    pub id: Uuid,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub token: String,
    pub isactive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PhoneResponse {
    pub number: String,
    pub citycode: String,
    pub countrycode: String,
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phones: Vec<PhoneResponse>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub token: Option<String>,
    pub isactive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserLogResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: AuditAction,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl From<&Phone> for PhoneResponse {
    fn from(phone: &Phone) -> Self {
        Self {
            number: phone.number.clone(),
            citycode: phone.city_code.clone(),
            countrycode: phone.country_code.clone(),
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            phones: user.phones.iter().map(PhoneResponse::from).collect(),
            name: user.name,
            email: user.email,
            created: user.created_at,
            modified: user.updated_at,
            last_login: user.last_login,
            token: user.token,
            isactive: user.is_active,
        }
    }
}

impl From<UserLog> for UserLogResponse {
    fn from(log: UserLog) -> Self {
        Self {
            id: log.id,
            user_id: log.user_id,
            action: log.action,
            created: log.created_at,
        }
    }
}
