//! Integration tests for the Users domain
//!
//! These tests use real PostgreSQL via testcontainers to ensure:
//! - Queries and paging work against the real schema
//! - The case-insensitive email index is enforced
//! - Units of work roll back when dropped uncommitted
//! - Audit rows keep their users alive

use chrono::Utc;
use domain_users::models::{NewPhone, NewUser};
use domain_users::*;
use sea_orm::ConnectionTrait;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

const SECRET: &str = "integration-test-secret-0123456789abcdef";

fn service(repo: PgUserRepository) -> UserService<PgUserRepository> {
    UserService::new(
        repo,
        ValidationRules::from_config(&ValidationConfig::default()).unwrap(),
        TokenIssuer::new(&TokenConfig::new(SECRET, 1).unwrap()),
    )
}

fn create_request(email: &str, phones: Vec<PhoneInput>) -> CreateUserRequest {
    CreateUserRequest {
        name: "Juan Rodriguez".to_string(),
        email: email.to_string(),
        password: "Password1".to_string(),
        phones,
    }
}

fn new_user(email: &str) -> NewUser {
    let now = Utc::now();
    NewUser {
        name: "Raw Insert".to_string(),
        email: email.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        created_at: now,
        updated_at: now,
        last_login: now,
        is_active: true,
        phones: vec![NewPhone {
            number: "1234567".to_string(),
            city_code: "1".to_string(),
            country_code: "56".to_string(),
        }],
    }
}

// ============================================================================
// Repository Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_get_user_with_phones() {
    let db = TestDatabase::new().await;
    let svc = service(PgUserRepository::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("create_and_get");
    let email = builder.email("juan");

    let phones = vec![
        PhoneInput::new(&builder.phone_number(0), "1", "56"),
        PhoneInput::new(&builder.phone_number(1), "2", "57"),
    ];
    let created = svc.create_user(create_request(&email, phones)).await.unwrap();

    let user = svc.get_by_email(&email.to_uppercase()).await.unwrap();
    assert_eq!(user.id, created.id);
    assert_eq!(user.token.as_deref(), Some(created.token.as_str()));
    assert_eq!(user.phones.len(), 2);
    assert_eq!(user.phones[0].number, builder.phone_number(0));
    assert_eq!(user.phones[1].countrycode, "57");
}

#[tokio::test]
async fn test_email_index_is_case_insensitive() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    let mut uow = repo.begin().await.unwrap();
    uow.insert_user(new_user("Case@Example.com")).await.unwrap();
    uow.commit().await.unwrap();

    assert!(repo.exists_by_email("case@example.COM").await.unwrap());

    let mut uow = repo.begin().await.unwrap();
    let result = uow.insert_user(new_user("CASE@example.com")).await;
    assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
}

#[tokio::test]
async fn test_dropped_unit_of_work_rolls_back() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    {
        let mut uow = repo.begin().await.unwrap();
        let user = uow.insert_user(new_user("ghost@example.com")).await.unwrap();
        uow.append_log(user.id, AuditAction::Created).await.unwrap();
    }

    assert!(!repo.exists_by_email("ghost@example.com").await.unwrap());
    let logs = repo.find_logs(PageRequest::default(), None).await.unwrap();
    assert_eq!(logs.total_elements, 0);
}

#[tokio::test]
async fn test_update_upserts_phones_in_order() {
    let db = TestDatabase::new().await;
    let svc = service(PgUserRepository::new(db.connection()));

    let created = svc
        .create_user(create_request(
            "phones@example.com",
            vec![PhoneInput::new("1111111", "1", "56")],
        ))
        .await
        .unwrap();

    let update = UpdateUserRequest {
        phones: Some(vec![
            PhoneInput::new("2222222", "2", "56"),
            PhoneInput::new("1111111", "9", "1"),
        ]),
        ..Default::default()
    };
    svc.update_user(created.id, update).await.unwrap();

    let user = svc.get_by_email("phones@example.com").await.unwrap();
    let phones: Vec<_> = user
        .phones
        .iter()
        .map(|p| (p.number.as_str(), p.citycode.as_str(), p.countrycode.as_str()))
        .collect();
    assert_eq!(phones, [("1111111", "9", "1"), ("2222222", "2", "56")]);
}

#[tokio::test]
async fn test_update_email_collision_keeps_row() {
    let db = TestDatabase::new().await;
    let svc = service(PgUserRepository::new(db.connection()));

    svc.create_user(create_request(
        "taken@example.com",
        vec![PhoneInput::new("1234567", "1", "56")],
    ))
    .await
    .unwrap();
    let other = svc
        .create_user(create_request(
            "other@example.com",
            vec![PhoneInput::new("7654321", "1", "56")],
        ))
        .await
        .unwrap();

    let update = UpdateUserRequest {
        email: Some("Taken@Example.com".into()),
        ..Default::default()
    };
    let result = svc.update_user(other.id, update).await;
    assert!(matches!(result, Err(UserError::DuplicateEmail(_))));

    let user = svc.get_by_email("other@example.com").await.unwrap();
    assert_eq!(user.token.as_deref(), Some(other.token.as_str()));
}

#[tokio::test]
async fn test_lifecycle_writes_audit_trail() {
    let db = TestDatabase::new().await;
    let svc = service(PgUserRepository::new(db.connection()));

    let created = svc
        .create_user(create_request(
            "audit@example.com",
            vec![PhoneInput::new("1234567", "1", "56")],
        ))
        .await
        .unwrap();
    svc.deactivate_user(created.id).await.unwrap();
    assert!(matches!(
        svc.deactivate_user(created.id).await,
        Err(UserError::AlreadyInactive(_))
    ));
    svc.reactivate_user(created.id).await.unwrap();

    let logs = svc
        .list_logs(LogQuery {
            user_id: Some(created.id),
            ..Default::default()
        })
        .await
        .unwrap();
    let actions: Vec<_> = logs.content.iter().map(|l| l.action).collect();
    assert_eq!(
        actions,
        [
            AuditAction::Created,
            AuditAction::Deactivated,
            AuditAction::Reactivated
        ]
    );
}

#[tokio::test]
async fn test_list_users_paging_and_sort() {
    let db = TestDatabase::new().await;
    let svc = service(PgUserRepository::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("paging");

    for (i, name) in ["Carla", "Ana", "Bruno"].iter().enumerate() {
        let mut request = create_request(
            &builder.email(&format!("u{}", i)),
            vec![PhoneInput::new(&builder.phone_number(i as u64), "1", "56")],
        );
        request.name = name.to_string();
        svc.create_user(request).await.unwrap();
    }

    let page = svc
        .list_users(ListUsersQuery {
            page: Some(1),
            size: Some(2),
            sort: Some("name".into()),
            status: None,
        })
        .await
        .unwrap();
    assert_page_counts(page.content.len(), page.total_elements, 2, 3);
    assert_eq!(page.total_pages, 2);
    let names: Vec<_> = page.content.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["Ana", "Bruno"]);

    let second = svc
        .list_users(ListUsersQuery {
            page: Some(2),
            size: Some(2),
            sort: Some("name".into()),
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(second.content.len(), 1);
    assert_eq!(second.content[0].name, "Carla");
    assert_eq!(second.content[0].phones.len(), 1);
}

#[tokio::test]
async fn test_audited_user_cannot_be_deleted() {
    let db = TestDatabase::new().await;
    let svc = service(PgUserRepository::new(db.connection()));

    let created = svc
        .create_user(create_request(
            "keep@example.com",
            vec![PhoneInput::new("1234567", "1", "56")],
        ))
        .await
        .unwrap();

    let result = db
        .connection
        .execute_unprepared(&format!("DELETE FROM users WHERE id = '{}'", created.id))
        .await;
    assert!(result.is_err(), "audit rows must block user deletion");

    let user = assert_some(
        PgUserRepository::new(db.connection())
            .get_by_id(created.id)
            .await
            .unwrap(),
        "user should survive",
    );
    assert_eq!(user.email, "keep@example.com");
}
