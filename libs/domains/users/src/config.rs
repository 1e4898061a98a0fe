//! Environment configuration for the user lifecycle.

use core_config::{ConfigError, FromEnv, env_or_default, env_parse, env_required};

pub const DEFAULT_EMAIL_REGEX: &str = r"^[\w.-]+@[\w-]+\.[a-z]{2,}$";

/// Every `&&`-separated pattern must match.
pub const DEFAULT_PASSWORD_REGEX: &str = r"[A-Z]&&[a-z]&&\d&&^.{6,}$";

const MIN_SECRET_LEN: usize = 32;

/// Patterns used by [`crate::validation::ValidationRules`].
///
/// - `EMAIL_REGEX` (default [`DEFAULT_EMAIL_REGEX`])
/// - `PASSWORD_REGEX` (default [`DEFAULT_PASSWORD_REGEX`])
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationConfig {
    pub email_regex: String,
    pub password_regex: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            email_regex: DEFAULT_EMAIL_REGEX.to_string(),
            password_regex: DEFAULT_PASSWORD_REGEX.to_string(),
        }
    }
}

impl FromEnv for ValidationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            email_regex: env_or_default("EMAIL_REGEX", DEFAULT_EMAIL_REGEX),
            password_regex: env_or_default("PASSWORD_REGEX", DEFAULT_PASSWORD_REGEX),
        })
    }
}

/// Token signing settings.
///
/// - `JWT_SECRET` (required, at least 32 characters)
/// - `JWT_EXPIRATION_MONTHS` (default 1)
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub expiration_months: u32,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, expiration_months: u32) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least {} characters (got {})",
                    MIN_SECRET_LEN,
                    secret.len()
                ),
            });
        }

        Ok(Self {
            secret,
            expiration_months,
        })
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("expiration_months", &self.expiration_months)
            .finish()
    }
}

impl FromEnv for TokenConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        let expiration_months = env_parse("JWT_EXPIRATION_MONTHS", 1u32)?;
        Self::new(secret, expiration_months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_validation_config_defaults() {
        temp_env::with_vars_unset(["EMAIL_REGEX", "PASSWORD_REGEX"], || {
            let config = ValidationConfig::from_env().unwrap();
            assert_eq!(config, ValidationConfig::default());
        });
    }

    #[test]
    fn test_validation_config_override() {
        temp_env::with_var("EMAIL_REGEX", Some(r"^.+@corp\.cl$"), || {
            let config = ValidationConfig::from_env().unwrap();
            assert_eq!(config.email_regex, r"^.+@corp\.cl$");
            assert_eq!(config.password_regex, DEFAULT_PASSWORD_REGEX);
        });
    }

    #[test]
    fn test_token_config_from_env() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some(SECRET)),
                ("JWT_EXPIRATION_MONTHS", Some("3")),
            ],
            || {
                let config = TokenConfig::from_env().unwrap();
                assert_eq!(config.expiration_months, 3);
            },
        );
    }

    #[test]
    fn test_token_config_default_expiration() {
        temp_env::with_vars(
            [("JWT_SECRET", Some(SECRET)), ("JWT_EXPIRATION_MONTHS", None)],
            || {
                assert_eq!(TokenConfig::from_env().unwrap().expiration_months, 1);
            },
        );
    }

    #[test]
    fn test_token_config_rejects_short_secret() {
        temp_env::with_var("JWT_SECRET", Some("short"), || {
            let err = TokenConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("JWT_SECRET"));
        });
    }

    #[test]
    fn test_token_config_missing_secret() {
        temp_env::with_var_unset("JWT_SECRET", || {
            assert!(matches!(
                TokenConfig::from_env(),
                Err(ConfigError::MissingEnvVar(_))
            ));
        });
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = TokenConfig::new(SECRET, 1).unwrap();
        assert!(!format!("{:?}", config).contains(SECRET));
    }
}
