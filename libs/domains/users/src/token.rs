use chrono::{DateTime, Months, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TokenConfig;
use crate::error::{UserError, UserResult};
use crate::models::User;

/// Claims embedded in every issued access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Signs HS256 access tokens bound to a user record.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    expiration: Months,
}

impl TokenIssuer {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            key: EncodingKey::from_secret(config.secret.as_bytes()),
            expiration: Months::new(config.expiration_months),
        }
    }

    pub fn issue(&self, user: &User) -> UserResult<String> {
        self.issue_at(user, Utc::now())
    }

    fn issue_at(&self, user: &User, now: DateTime<Utc>) -> UserResult<String> {
        let exp = now
            .checked_add_months(self.expiration)
            .ok_or_else(|| UserError::Internal("Token expiration out of range".to_string()))?;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| UserError::Internal(format!("Token signing failed: {}", e)))
    }
}
