//! Applies partial updates onto a stored user.

use uuid::Uuid;

use crate::error::UserResult;
use crate::models::{Phone, PhoneInput, UpdateUserRequest, User};
use crate::password::PasswordHasher;
use crate::repository::same_email;
use crate::validation::ValidationRules;

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

/// Overwrites name, email and password with the present, non-blank values of
/// `request`. An email equal to the stored one (ignoring case) is not
/// re-validated or rewritten.
pub fn merge_basic_info(
    user: &mut User,
    request: &UpdateUserRequest,
    rules: &ValidationRules,
    hasher: &PasswordHasher,
) -> UserResult<()> {
    if let Some(name) = non_blank(request.name.as_ref()) {
        user.name = name.to_string();
    }

    if let Some(email) = non_blank(request.email.as_ref()) {
        if !same_email(email, &user.email) {
            rules.validate_email(email)?;
            user.email = email.to_string();
        }
    }

    if let Some(password) = non_blank(request.password.as_ref()) {
        rules.validate_password(password)?;
        user.password_hash = hasher.hash(password)?;
    }

    Ok(())
}

/// Reconciles the incoming phones with the stored list. Phones are matched by
/// number; a match gets its codes overwritten, anything else is appended.
/// Stored phones are never removed.
pub fn merge_phones(user: &mut User, incoming: Option<&[PhoneInput]>) {
    let Some(incoming) = incoming else {
        return;
    };

    for input in incoming {
        let number = input.number.clone().unwrap_or_default();
        let city_code = input.citycode.clone().unwrap_or_default();
        let country_code = input.countrycode.clone().unwrap_or_default();

        match user.phones.iter_mut().find(|p| p.number == number) {
            Some(existing) => {
                existing.city_code = city_code;
                existing.country_code = country_code;
            }
            None => user.phones.push(Phone {
                id: Uuid::now_v7(),
                user_id: user.id,
                number,
                city_code,
                country_code,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use crate::error::UserError;
    use chrono::Utc;

    fn rules() -> ValidationRules {
        ValidationRules::from_config(&ValidationConfig::default()).unwrap()
    }

    fn stored_user() -> User {
        let now = Utc::now();
        let id = Uuid::now_v7();
        User {
            id,
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password_hash: "original-hash".into(),
            created_at: now,
            updated_at: now,
            last_login: now,
            is_active: true,
            token: Some("token".into()),
            phones: vec![
                Phone {
                    id: Uuid::now_v7(),
                    user_id: id,
                    number: "1234567".into(),
                    city_code: "1".into(),
                    country_code: "56".into(),
                },
                Phone {
                    id: Uuid::now_v7(),
                    user_id: id,
                    number: "7654321".into(),
                    city_code: "2".into(),
                    country_code: "56".into(),
                },
            ],
        }
    }

    #[test]
    fn test_blank_and_absent_fields_are_skipped() {
        let mut user = stored_user();
        let before = user.clone();
        let request = UpdateUserRequest {
            name: Some("   ".into()),
            email: Some(String::new()),
            password: None,
            phones: None,
        };

        merge_basic_info(&mut user, &request, &rules(), &PasswordHasher::new()).unwrap();
        assert_eq!(user, before);
    }

    #[test]
    fn test_overwrites_present_fields() {
        let mut user = stored_user();
        let hasher = PasswordHasher::new();
        let request = UpdateUserRequest {
            name: Some("Ana Maria".into()),
            email: Some("ana.maria@example.com".into()),
            password: Some("NewPassword1".into()),
            phones: None,
        };

        merge_basic_info(&mut user, &request, &rules(), &hasher).unwrap();
        assert_eq!(user.name, "Ana Maria");
        assert_eq!(user.email, "ana.maria@example.com");
        assert!(hasher.verify("NewPassword1", &user.password_hash).unwrap());
    }

    #[test]
    fn test_same_email_ignoring_case_is_not_revalidated() {
        let config = ValidationConfig {
            email_regex: r"^never-matches$".to_string(),
            ..ValidationConfig::default()
        };
        let rules = ValidationRules::from_config(&config).unwrap();
        let mut user = stored_user();
        let request = UpdateUserRequest {
            email: Some("ANA@EXAMPLE.COM".into()),
            ..Default::default()
        };

        merge_basic_info(&mut user, &request, &rules, &PasswordHasher::new()).unwrap();
        assert_eq!(user.email, "ana@example.com");

        user.email = "ángel@example.com".into();
        let request = UpdateUserRequest {
            email: Some("ÁNGEL@example.com".into()),
            ..Default::default()
        };
        merge_basic_info(&mut user, &request, &rules, &PasswordHasher::new()).unwrap();
        assert_eq!(user.email, "ángel@example.com");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut user = stored_user();
        let request = UpdateUserRequest {
            email: Some("nope".into()),
            ..Default::default()
        };
        assert!(matches!(
            merge_basic_info(&mut user, &request, &rules(), &PasswordHasher::new()),
            Err(UserError::InvalidFormat(_))
        ));

        let request = UpdateUserRequest {
            password: Some("weak".into()),
            ..Default::default()
        };
        assert!(matches!(
            merge_basic_info(&mut user, &request, &rules(), &PasswordHasher::new()),
            Err(UserError::InvalidFormat(_))
        ));
        assert_eq!(user.password_hash, "original-hash");
    }

    #[test]
    fn test_phones_absent_or_empty_is_noop() {
        let mut user = stored_user();
        let before = user.phones.clone();

        merge_phones(&mut user, None);
        merge_phones(&mut user, Some(&[]));
        assert_eq!(user.phones, before);
    }

    #[test]
    fn test_matching_number_updates_in_place() {
        let mut user = stored_user();
        let original_id = user.phones[0].id;

        merge_phones(&mut user, Some(&[PhoneInput::new("1234567", "9", "1")]));

        assert_eq!(user.phones.len(), 2);
        assert_eq!(user.phones[0].id, original_id);
        assert_eq!(user.phones[0].city_code, "9");
        assert_eq!(user.phones[0].country_code, "1");
        assert_eq!(user.phones[1].city_code, "2");
    }

    #[test]
    fn test_unseen_number_is_appended() {
        let mut user = stored_user();

        merge_phones(&mut user, Some(&[PhoneInput::new("5550001", "3", "54")]));

        assert_eq!(user.phones.len(), 3);
        let added = &user.phones[2];
        assert_eq!(added.number, "5550001");
        assert_eq!(added.user_id, user.id);
    }
}
