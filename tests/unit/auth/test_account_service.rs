// Unit tests for AccountService over the shared mocks

use crate::common::*;
use certificate_registry::api::UserStore;
use certificate_registry::auth::audit_logger::AuditLogger;
use certificate_registry::auth::password::{Password, PasswordHasher};
use certificate_registry::auth::service::AccountService;
use certificate_registry::auth::token::TokenIssuer;
use certificate_registry::core::errors::ServiceError;
use std::sync::Arc;

fn account_service(users: Arc<MockUserStore>) -> AccountService {
    AccountService::new(
        users,
        PasswordHasher::new(4),
        Arc::new(TokenIssuer::from_secret_str(TEST_JWT_SECRET)),
        Arc::new(AuditLogger::new(None)),
    )
}

#[tokio::test]
async fn test_register_stores_hash_not_password() {
    let users = Arc::new(MockUserStore::default());
    let service = account_service(users.clone());

    service
        .register("Asha", "asha@example.com", &Password::new("hunter22"))
        .await
        .unwrap();

    let stored = users.find_by_email("asha@example.com").await.unwrap().unwrap();
    assert_ne!(stored.password_hash.as_str(), "hunter22");
    assert!(stored.password_hash.as_str().starts_with("$2"));
    assert_eq!(stored.name, "Asha");
}

#[tokio::test]
async fn test_login_token_carries_user_id() {
    let users = Arc::new(MockUserStore::default());
    let service = account_service(users.clone());

    let user_id = service
        .register("", "asha@example.com", &Password::new("hunter22"))
        .await
        .unwrap();
    let token = service
        .login("asha@example.com", &Password::new("hunter22"))
        .await
        .unwrap();

    let claims = TokenIssuer::from_secret_str(TEST_JWT_SECRET).verify(&token).unwrap();
    assert_eq!(claims.user_id, user_id);
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn test_duplicate_registration_keeps_first_account() {
    let users = Arc::new(MockUserStore::default());
    let service = account_service(users.clone());

    service
        .register("First", "asha@example.com", &Password::new("first-pass"))
        .await
        .unwrap();
    let second = service
        .register("Second", "asha@example.com", &Password::new("second-pass"))
        .await;

    assert!(matches!(second, Err(ServiceError::DuplicateEmail)));
    assert_eq!(users.users.lock().unwrap().len(), 1);
    assert!(service
        .login("asha@example.com", &Password::new("first-pass"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_login_with_storage_down_is_not_credentials_error() {
    let users = Arc::new(MockUserStore {
        should_fail: true,
        ..Default::default()
    });
    let service = account_service(users);

    let result = service
        .login("asha@example.com", &Password::new("hunter22"))
        .await;

    assert!(matches!(result, Err(ServiceError::StorageError(_))));
}
