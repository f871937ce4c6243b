// Common test utilities and helpers for all test modules
#![allow(dead_code)]

use certificate_registry::api::*;
use certificate_registry::auth::audit_logger::AuditLogger;
use certificate_registry::auth::auth_middleware::AuthState;
use certificate_registry::auth::password::PasswordHasher;
use certificate_registry::auth::service::AccountService;
use certificate_registry::auth::token::TokenIssuer;
use certificate_registry::certificate::qr::QrEncoder;
use certificate_registry::certificate::service::CertificateService;
use certificate_registry::config::Config;
use certificate_registry::core::errors::ServiceError;
use certificate_registry::core::models::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";
pub const BOUNDARY: &str = "certificate-registry-boundary";

/// Mock StudentStore implementation for testing
#[derive(Default)]
pub struct MockStudentStore {
    pub records: Mutex<Vec<StudentRecord>>,
    pub should_fail: bool,
}

#[async_trait::async_trait]
impl StudentStore for MockStudentStore {
    async fn insert(&self, record: &StudentRecord) -> Result<(), ServiceError> {
        if self.should_fail {
            return Err(ServiceError::StorageError("Database error".to_string()));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<StudentRecord>, ServiceError> {
        if self.should_fail {
            return Err(ServiceError::StorageError("Database error".to_string()));
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn find_by_certificate_id(
        &self,
        certificate_id: &str,
    ) -> Result<Option<StudentRecord>, ServiceError> {
        if self.should_fail {
            return Err(ServiceError::StorageError("Database error".to_string()));
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.certificate_id == certificate_id)
            .cloned())
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        if self.should_fail {
            return Err(ServiceError::StorageError("Database error".to_string()));
        }
        Ok(())
    }
}

/// Mock UserStore implementation with unique-email enforcement
#[derive(Default)]
pub struct MockUserStore {
    pub users: Mutex<HashMap<String, User>>,
    pub should_fail: bool,
}

#[async_trait::async_trait]
impl UserStore for MockUserStore {
    async fn create_user(&self, user: NewUser) -> Result<User, ServiceError> {
        if self.should_fail {
            return Err(ServiceError::StorageError("Database error".to_string()));
        }
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.email) {
            return Err(ServiceError::DuplicateEmail);
        }
        let stored = User {
            id: uuid::Uuid::new_v4(),
            name: user.name,
            email: user.email.clone(),
            password_hash: user.password_hash,
        };
        users.insert(user.email, stored.clone());
        Ok(stored)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        if self.should_fail {
            return Err(ServiceError::StorageError("Database error".to_string()));
        }
        Ok(self.users.lock().unwrap().get(email).cloned())
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// Mock UploadStore that records what it was given
#[derive(Default)]
pub struct MockUploadStore {
    pub stored: Mutex<Vec<String>>,
    pub should_fail: bool,
}

#[async_trait::async_trait]
impl UploadStore for MockUploadStore {
    async fn store(&self, upload: &Upload) -> Result<String, ServiceError> {
        if self.should_fail {
            return Err(ServiceError::UploadError("disk full".to_string()));
        }
        let reference = format!("uploads/{}", upload.file_name);
        self.stored.lock().unwrap().push(reference.clone());
        Ok(reference)
    }

    async fn remove(&self, reference: &str) -> Result<(), ServiceError> {
        self.stored.lock().unwrap().retain(|r| r != reference);
        Ok(())
    }
}

/// Handles to the mocks behind a test AppState
pub struct TestHarness {
    pub app_state: AppState,
    pub auth_state: Arc<AuthState>,
    pub students: Arc<MockStudentStore>,
    pub users: Arc<MockUserStore>,
    pub uploads: Arc<MockUploadStore>,
}

/// Build AppState over fresh mocks using the given configuration
pub fn create_test_harness_with_config(config: Config) -> TestHarness {
    let students = Arc::new(MockStudentStore::default());
    let users = Arc::new(MockUserStore::default());
    let uploads = Arc::new(MockUploadStore::default());

    let token_issuer = Arc::new(TokenIssuer::from_secret_str(TEST_JWT_SECRET));
    let audit_logger = Arc::new(AuditLogger::new(None));

    let certificates = Arc::new(CertificateService::new(
        students.clone(),
        uploads.clone(),
        QrEncoder::default(),
        config.verification_base_url.clone(),
    ));
    let accounts = Arc::new(AccountService::new(
        users.clone(),
        PasswordHasher::new(config.bcrypt_cost),
        token_issuer.clone(),
        audit_logger.clone(),
    ));

    let auth_state = Arc::new(AuthState {
        token_issuer,
        audit_logger,
    });

    TestHarness {
        app_state: AppState {
            certificates,
            accounts,
            config: Arc::new(config),
        },
        auth_state,
        students,
        users,
        uploads,
    }
}

pub fn create_test_harness() -> TestHarness {
    create_test_harness_with_config(Config::test_config())
}

/// Router over fresh mocks, ready for `oneshot`
pub fn create_test_app() -> axum::Router {
    let harness = create_test_harness();
    create_router(&harness.app_state, harness.auth_state.clone()).with_state(harness.app_state)
}

/// Build a multipart/form-data body from text fields and an optional file
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n",
                file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

/// Submitted fields for a typical certificate
pub fn sample_student_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("studentName", "Asha Rao"),
        ("courseName", "Rust Fundamentals"),
        ("certificateNumber", "CERT-0042"),
        ("passingYear", "2024"),
        ("courseDuration", "3 months"),
        ("skills", "ownership, async"),
    ]
}
