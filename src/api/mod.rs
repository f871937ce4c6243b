// Axum web server layer

use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    BoxError, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;

pub mod handlers;
pub mod middleware;
pub mod responses;

use crate::auth::auth_middleware::{auth_middleware, AuthState};
use crate::auth::service::AccountService;
use crate::certificate::service::CertificateService;
use crate::core::errors::ServiceError;
use crate::core::models::{NewUser, StudentRecord, Upload, User};

/// Application state containing all shared dependencies
///
/// All components are wrapped in Arc for shared ownership across async tasks.
#[derive(Clone)]
pub struct AppState {
    pub certificates: Arc<CertificateService>,
    pub accounts: Arc<AccountService>,
    pub config: Arc<Config>,
}

/// Trait for certificate record persistence
#[async_trait::async_trait]
pub trait StudentStore: Send + Sync {
    async fn insert(&self, record: &StudentRecord) -> Result<(), ServiceError>;
    async fn list(&self) -> Result<Vec<StudentRecord>, ServiceError>;
    async fn find_by_certificate_id(&self, certificate_id: &str) -> Result<Option<StudentRecord>, ServiceError>;
    async fn ping(&self) -> Result<(), ServiceError>;
}

/// Trait for account persistence
///
/// Implementations must reject a second account with the same email with
/// `ServiceError::DuplicateEmail` and leave the first untouched.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, ServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError>;
    async fn ping(&self) -> Result<(), ServiceError>;
}

/// Trait for uploaded image storage
///
/// `store` returns a reference unique to that call; `remove` takes it back.
#[async_trait::async_trait]
pub trait UploadStore: Send + Sync {
    async fn store(&self, upload: &Upload) -> Result<String, ServiceError>;
    async fn remove(&self, reference: &str) -> Result<(), ServiceError>;
}

// Re-export Config from config module
pub use crate::config::Config;

/// Create the Axum router with all routes and middleware
///
/// Middleware stack (outermost to innermost):
/// - CORS (tower-http::cors) - permissive, browser clients call from other origins
/// - Tracing (tower-http::trace) - one span per request
/// - Request timeout (tower::timeout) - configurable global timeout
/// - Body size limit (tower-http::limit + axum DefaultBodyLimit for multipart)
/// - Auth middleware - bearer token check, protected routes only
///
/// `POST /api/students` is only protected when `require_auth_for_create` is set.
pub fn create_router(app_state: &AppState, auth_state: Arc<AuthState>) -> Router<AppState> {
    let create_student = if app_state.config.require_auth_for_create {
        post(handlers::create_student_handler)
            .route_layer(from_fn_with_state(auth_state.clone(), auth_middleware))
    } else {
        post(handlers::create_student_handler)
    };

    let router = Router::new()
        .route(
            "/api/students",
            create_student.get(handlers::list_students_handler),
        )
        .route("/api/students/:id", get(handlers::get_student_handler))
        .route("/api/register", post(handlers::register_handler))
        .route("/api/login", post(handlers::login_handler))
        .route(
            "/api/protected",
            get(handlers::protected_handler)
                .route_layer(from_fn_with_state(auth_state, auth_middleware)),
        )
        .route("/health", get(handlers::health_handler));

    // Order matters: the last layer added wraps outermost
    let body_limit = app_state.config.body_size_limit_bytes;
    let timeout_secs = app_state.config.request_timeout_secs;

    let router = router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::body_size_limit_layer(body_limit));

    // HandleErrorLayer must come BEFORE timeout to catch the timeout error
    let timeout_stack = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|e: BoxError| async move {
            let status = if e.is::<tower::timeout::error::Elapsed>() {
                StatusCode::REQUEST_TIMEOUT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            responses::ApiError::new(status, status.canonical_reason().unwrap_or("Error").to_string())
        }))
        .timeout(Duration::from_secs(timeout_secs))
        .into_inner();

    router
        .layer(timeout_stack)
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer())
}
