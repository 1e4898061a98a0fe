//! Stateless checks run before any write.

use core_config::ConfigError;
use regex::{Regex, RegexSet};
use std::sync::LazyLock;

use crate::config::ValidationConfig;
use crate::error::{PhoneField, PhoneListError, UserError, UserResult};
use crate::models::{PhoneInput, User};

static PHONE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{7,8}$").unwrap());
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

/// Compiled email and password patterns.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    email: Regex,
    password: RegexSet,
}

impl ValidationRules {
    /// Compiles both patterns. The email pattern must match the whole
    /// address. `password_regex` is split on `&&`; a password must match
    /// every part.
    pub fn from_config(config: &ValidationConfig) -> Result<Self, ConfigError> {
        let anchored = format!("^(?:{})$", config.email_regex);
        let email = Regex::new(&anchored).map_err(|e| ConfigError::ParseError {
            key: "EMAIL_REGEX".to_string(),
            details: e.to_string(),
        })?;

        let password =
            RegexSet::new(config.password_regex.split("&&")).map_err(|e| {
                ConfigError::ParseError {
                    key: "PASSWORD_REGEX".to_string(),
                    details: e.to_string(),
                }
            })?;

        Ok(Self { email, password })
    }

    pub fn validate_email(&self, email: &str) -> UserResult<()> {
        if !self.email.is_match(email) {
            return Err(UserError::InvalidFormat(format!(
                "Invalid email format: {}",
                email
            )));
        }
        Ok(())
    }

    pub fn validate_password(&self, password: &str) -> UserResult<()> {
        if !self.password.matches(password).matched_all() {
            return Err(UserError::InvalidFormat(
                "Password does not meet the strength requirements".to_string(),
            ));
        }
        Ok(())
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Walks the list in order and reports the first violation.
///
/// Per entry: number (required, 7 to 8 digits), then city code (required,
/// digits), then country code (required, digits).
pub fn validate_phone_list(phones: &[PhoneInput]) -> Result<(), PhoneListError> {
    if phones.is_empty() {
        return Err(PhoneListError::Empty);
    }

    for (index, phone) in phones.iter().enumerate() {
        let position = index + 1;
        let checks = [
            (PhoneField::Number, &phone.number, &*PHONE_NUMBER),
            (PhoneField::CityCode, &phone.citycode, &*DIGITS),
            (PhoneField::CountryCode, &phone.countrycode, &*DIGITS),
        ];

        for (field, value, pattern) in checks {
            let value = present(value).ok_or(PhoneListError::Missing { position, field })?;
            if !pattern.is_match(value) {
                return Err(PhoneListError::Malformed { position, field });
            }
        }
    }

    Ok(())
}

pub fn validate_user_is_active(user: &User) -> UserResult<()> {
    if !user.is_active {
        return Err(UserError::InactiveRecord(user.id));
    }
    Ok(())
}
