//! Lifecycle tests for the Users domain
//!
//! These run the full service against the in-memory store:
//! - uniqueness of emails across creates
//! - additive phone merges and blank-skipping updates
//! - deactivate/reactivate guards
//! - one audit entry per successful state change

use domain_users::*;
use test_utils::{TestDataBuilder, assertions::*};
use uuid::Uuid;

const SECRET: &str = "lifecycle-test-secret-0123456789abcdef";

fn service(repo: InMemoryUserRepository) -> UserService<InMemoryUserRepository> {
    UserService::new(
        repo,
        ValidationRules::from_config(&ValidationConfig::default()).unwrap(),
        TokenIssuer::new(&TokenConfig::new(SECRET, 1).unwrap()),
    )
}

fn create_request(email: &str) -> CreateUserRequest {
    CreateUserRequest {
        name: "Juan Rodriguez".to_string(),
        email: email.to_string(),
        password: "Password1".to_string(),
        phones: vec![PhoneInput::new("1234567", "1", "56")],
    }
}

async fn logs_for(svc: &UserService<InMemoryUserRepository>, user_id: Uuid) -> Vec<AuditAction> {
    let page = svc
        .list_logs(LogQuery {
            page: None,
            size: Some(100),
            user_id: Some(user_id),
        })
        .await
        .unwrap();
    page.content.into_iter().map(|log| log.action).collect()
}

async fn user_count(svc: &UserService<InMemoryUserRepository>) -> u64 {
    svc.list_users(ListUsersQuery::default())
        .await
        .unwrap()
        .total_elements
}

#[tokio::test]
async fn test_create_then_duplicate_email() {
    let svc = service(InMemoryUserRepository::new());

    let created = svc.create_user(create_request("a@b.com")).await.unwrap();
    assert!(created.isactive);
    assert!(!created.token.is_empty());
    assert_eq!(logs_for(&svc, created.id).await, [AuditAction::Created]);

    let second = svc.create_user(create_request("A@B.com")).await;
    assert!(matches!(second, Err(UserError::DuplicateEmail(_))));
    assert_eq!(user_count(&svc).await, 1);

    let all_logs = svc.list_logs(LogQuery::default()).await.unwrap();
    assert_eq!(all_logs.total_elements, 1);
}

#[tokio::test]
async fn test_created_user_is_readable_by_email() {
    let svc = service(InMemoryUserRepository::new());
    let created = svc.create_user(create_request("ana@example.com")).await.unwrap();

    let user = svc.get_by_email("ANA@example.com").await.unwrap();
    assert_eq!(user.id, created.id);
    assert_eq!(user.token.as_deref(), Some(created.token.as_str()));
    assert_eq!(
        user.phones,
        [PhoneResponse {
            number: "1234567".into(),
            citycode: "1".into(),
            countrycode: "56".into(),
        }]
    );
}

#[tokio::test]
async fn test_get_by_email_rejects_malformed_and_unknown() {
    let svc = service(InMemoryUserRepository::new());

    assert!(matches!(
        svc.get_by_email("nope").await,
        Err(UserError::InvalidFormat(_))
    ));
    assert!(matches!(
        svc.get_by_email("ghost@example.com").await,
        Err(UserError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_invalid_phone_list_reports_position() {
    let svc = service(InMemoryUserRepository::new());
    let mut request = create_request("phones@example.com");
    request.phones = vec![
        PhoneInput::new("1234567", "1", "56"),
        PhoneInput::new("7654321", "", "56"),
    ];

    let err = svc.create_user(request).await.unwrap_err();
    assert_eq!(err.to_string(), "Phone city code at position 2 is required");
    assert_eq!(user_count(&svc).await, 0);
}

#[tokio::test]
async fn test_phone_merge_is_additive() {
    let svc = service(InMemoryUserRepository::new());
    let mut request = create_request("merge@example.com");
    request.phones = vec![
        PhoneInput::new("1111111", "1", "56"),
        PhoneInput::new("2222222", "2", "56"),
    ];
    let created = svc.create_user(request).await.unwrap();

    let update = UpdateUserRequest {
        phones: Some(vec![
            PhoneInput::new("2222222", "9", "1"),
            PhoneInput::new("3333333", "3", "54"),
        ]),
        ..Default::default()
    };
    let updated = svc.update_user(created.id, update).await.unwrap();

    let phones: Vec<_> = updated
        .phones
        .iter()
        .map(|p| (p.number.as_str(), p.citycode.as_str(), p.countrycode.as_str()))
        .collect();
    assert_eq!(
        phones,
        [
            ("1111111", "1", "56"),
            ("2222222", "9", "1"),
            ("3333333", "3", "54"),
        ]
    );
}

#[tokio::test]
async fn test_blank_update_only_refreshes_token_and_timestamps() {
    let svc = service(InMemoryUserRepository::new());
    let created = svc.create_user(create_request("blank@example.com")).await.unwrap();

    let update = UpdateUserRequest {
        name: Some("  ".into()),
        email: Some(String::new()),
        password: None,
        phones: Some(vec![]),
    };
    let updated = svc.update_user(created.id, update).await.unwrap();

    assert_eq!(updated.name, "Juan Rodriguez");
    assert_eq!(updated.email, "blank@example.com");
    assert_eq!(updated.phones.len(), 1);
    assert_ne!(updated.token.as_deref(), Some(created.token.as_str()));
    assert!(updated.modified >= created.modified);
    assert!(updated.last_login >= created.last_login);
    assert_eq!(updated.created, created.created);

    assert_eq!(
        logs_for(&svc, created.id).await,
        [AuditAction::Created, AuditAction::Updated]
    );
}

#[tokio::test]
async fn test_update_email_collision_is_duplicate() {
    let svc = service(InMemoryUserRepository::new());
    svc.create_user(create_request("taken@example.com")).await.unwrap();
    let other = svc.create_user(create_request("other@example.com")).await.unwrap();

    let update = UpdateUserRequest {
        email: Some("TAKEN@example.com".into()),
        ..Default::default()
    };
    let result = svc.update_user(other.id, update).await;
    assert!(matches!(result, Err(UserError::DuplicateEmail(_))));

    let unchanged = svc.get_by_email("other@example.com").await.unwrap();
    assert_eq!(unchanged.id, other.id);
    assert_eq!(logs_for(&svc, other.id).await, [AuditAction::Created]);
}

#[tokio::test]
async fn test_deactivated_user_cannot_be_updated() {
    let svc = service(InMemoryUserRepository::new());
    let created = svc.create_user(create_request("a@b.com")).await.unwrap();

    svc.deactivate_user(created.id).await.unwrap();

    let update = UpdateUserRequest {
        name: Some("Changed".into()),
        ..Default::default()
    };
    let result = svc.update_user(created.id, update).await;
    assert!(matches!(result, Err(UserError::InactiveRecord(_))));

    let user = svc.get_by_email("a@b.com").await.unwrap();
    assert_eq!(user.name, "Juan Rodriguez");
    assert!(!user.isactive);
}

#[tokio::test]
async fn test_lifecycle_guards_do_not_audit() {
    let svc = service(InMemoryUserRepository::new());
    let created = svc.create_user(create_request("guard@example.com")).await.unwrap();

    assert!(matches!(
        svc.reactivate_user(created.id).await,
        Err(UserError::AlreadyActive(_))
    ));

    svc.deactivate_user(created.id).await.unwrap();
    assert!(matches!(
        svc.deactivate_user(created.id).await,
        Err(UserError::AlreadyInactive(_))
    ));

    svc.reactivate_user(created.id).await.unwrap();

    assert_eq!(
        logs_for(&svc, created.id).await,
        [
            AuditAction::Created,
            AuditAction::Deactivated,
            AuditAction::Reactivated
        ]
    );
}

#[tokio::test]
async fn test_reactivation_refreshes_login_and_token() {
    let svc = service(InMemoryUserRepository::new());
    let created = svc.create_user(create_request("back@example.com")).await.unwrap();

    svc.deactivate_user(created.id).await.unwrap();
    svc.reactivate_user(created.id).await.unwrap();

    let user = svc.get_by_email("back@example.com").await.unwrap();
    assert!(user.isactive);
    assert!(user.last_login >= created.last_login);
    assert_ne!(user.token.as_deref(), Some(created.token.as_str()));
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let svc = service(InMemoryUserRepository::new());
    let id = Uuid::now_v7();

    assert!(matches!(
        svc.update_user(id, UpdateUserRequest::default()).await,
        Err(UserError::NotFound(_))
    ));
    assert!(matches!(
        svc.deactivate_user(id).await,
        Err(UserError::NotFound(_))
    ));
    assert!(matches!(
        svc.reactivate_user(id).await,
        Err(UserError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_pagination_defaults_are_equivalent() {
    let svc = service(InMemoryUserRepository::new());
    let builder = TestDataBuilder::from_test_name("pagination_defaults");
    for i in 0..12 {
        svc.create_user(create_request(&builder.email(&format!("user{}", i))))
            .await
            .unwrap();
    }

    let absent = svc.list_users(ListUsersQuery::default()).await.unwrap();
    let degenerate = svc
        .list_users(ListUsersQuery {
            page: Some(0),
            size: Some(-5),
            sort: Some("   ".into()),
            status: None,
        })
        .await
        .unwrap();

    let ids = |page: &Page<UserResponse>| page.content.iter().map(|u| u.id).collect::<Vec<_>>();
    assert_eq!(ids(&absent), ids(&degenerate));
    assert_eq!(absent.page, 1);
    assert_eq!(absent.size, 10);
    assert_page_counts(absent.content.len(), absent.total_elements, 10, 12);
    assert_eq!(absent.total_pages, 2);

    let created: Vec<_> = absent.content.iter().map(|u| u.created).collect();
    assert!(created.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_status_filter_applies_to_fetched_page() {
    let svc = service(InMemoryUserRepository::new());
    let builder = TestDataBuilder::from_test_name("status_filter");

    let mut ids = Vec::new();
    for i in 0..4 {
        let created = svc
            .create_user(create_request(&builder.email(&format!("s{}", i))))
            .await
            .unwrap();
        ids.push(created.id);
    }
    svc.deactivate_user(ids[1]).await.unwrap();

    let inactive = svc
        .list_users(ListUsersQuery {
            status: Some("INACTIVOS".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_page_counts(inactive.content.len(), inactive.total_elements, 1, 4);
    assert_eq!(inactive.content[0].id, ids[1]);

    let unfiltered = svc
        .list_users(ListUsersQuery {
            status: Some("everyone".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(unfiltered.content.len(), 4);
}

#[tokio::test]
async fn test_list_users_by_name() {
    let svc = service(InMemoryUserRepository::new());
    for (name, email) in [("Zoe", "z@example.com"), ("Ana", "a@example.com")] {
        let mut request = create_request(email);
        request.name = name.into();
        svc.create_user(request).await.unwrap();
    }

    let page = svc
        .list_users(ListUsersQuery {
            sort: Some("name".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let names: Vec<_> = page.content.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["Ana", "Zoe"]);
}

#[tokio::test]
async fn test_logs_are_paged() {
    let svc = service(InMemoryUserRepository::new());
    let created = svc.create_user(create_request("logs@example.com")).await.unwrap();
    svc.deactivate_user(created.id).await.unwrap();
    svc.reactivate_user(created.id).await.unwrap();

    let page = svc
        .list_logs(LogQuery {
            page: Some(2),
            size: Some(2),
            user_id: None,
        })
        .await
        .unwrap();

    assert_eq!(page.page, 2);
    assert_eq!(page.total_elements, 3);
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].action, AuditAction::Reactivated);
}

#[tokio::test]
async fn test_oversized_pages_are_capped() {
    let svc = service(InMemoryUserRepository::new());
    svc.create_user(create_request("cap@example.com")).await.unwrap();

    let users = svc
        .list_users(ListUsersQuery {
            page: Some(4),
            size: Some(i64::MAX),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(users.page, 4);
    assert_eq!(users.size, 100);
    assert_eq!(users.total_elements, 1);
    assert!(users.content.is_empty());

    let logs = svc
        .list_logs(LogQuery {
            page: Some(i64::MAX),
            size: Some(i64::MAX),
            user_id: None,
        })
        .await
        .unwrap();
    assert_eq!(logs.size, 100);
    assert_eq!(logs.total_elements, 1);
    assert!(logs.content.is_empty());
}
