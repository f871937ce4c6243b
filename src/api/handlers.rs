// Request handlers for API endpoints

use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    Extension,
};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::api::responses::{ApiError, HealthResponse, MessageResponse, TokenResponse};
use crate::api::AppState;
use crate::auth::password::Password;
use crate::core::errors::ServiceError;
use crate::core::models::{AuthenticatedUser, NewStudent, StudentRecord, Upload};

/// Multipart field carrying the certificate image
const IMAGE_FIELD: &str = "image";

/// Registration body. Not `Debug`: holds the plaintext password.
#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login body. Not `Debug`: holds the plaintext password.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Caller-supplied `x-request-id`, echoed back on errors
fn request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Log server-side faults and convert to an HTTP error
fn to_api_error(err: ServiceError, request_id: Option<String>) -> ApiError {
    if err.is_infrastructure() {
        error!(
            error = %err,
            request_id = request_id.as_deref().unwrap_or("-"),
            "Request failed"
        );
    }
    match request_id {
        Some(id) => ApiError::from_service_error_with_id(err, id),
        None => ApiError::from_service_error(err),
    }
}

/// Create a certificate record
///
/// POST /api/students (multipart/form-data)
///
/// Text fields: studentName, courseName, certificateNumber, passingYear,
/// courseDuration, skills. Optional file field `image`. Unknown fields are
/// ignored; missing text fields are stored empty.
pub async fn create_student_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<StudentRecord>, ApiError> {
    let request_id = request_id(&headers);
    let mut fields = NewStudent::default();
    let mut image: Option<Upload> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!(error = %e, "Malformed multipart body");
        ApiError::new(e.status(), e.body_text())
    })? {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(|e| ApiError::new(e.status(), e.body_text()))?;

            // An empty file input still arrives as a part; treat it as no upload
            if !file_name.is_empty() || !bytes.is_empty() {
                image = Some(Upload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field.text().await.map_err(|e| ApiError::new(e.status(), e.body_text()))?;
        if !fields.set_field(&name, value) {
            debug!(field = %name, "Ignoring unknown form field");
        }
    }

    let record = app_state
        .certificates
        .create(fields, image)
        .await
        .map_err(|e| to_api_error(e, request_id))?;

    Ok(Json(record))
}

/// List all certificate records
///
/// GET /api/students
pub async fn list_students_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<StudentRecord>>, ApiError> {
    let records = app_state
        .certificates
        .list()
        .await
        .map_err(|e| to_api_error(e, request_id(&headers)))?;

    Ok(Json(records))
}

/// Fetch one certificate record by its generated id
///
/// GET /api/students/:id
pub async fn get_student_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(certificate_id): Path<String>,
) -> Result<Json<StudentRecord>, ApiError> {
    let record = app_state
        .certificates
        .get(&certificate_id)
        .await
        .map_err(|e| to_api_error(e, request_id(&headers)))?;

    Ok(Json(record))
}

/// Register an account
///
/// POST /api/register
pub async fn register_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let password = Password::from(request.password);

    app_state
        .accounts
        .register(&request.name, &request.email, &password)
        .await
        .map_err(|e| to_api_error(e, request_id(&headers)))?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// Log in and receive a bearer token
///
/// POST /api/login
pub async fn login_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let password = Password::from(request.password);

    let token = app_state
        .accounts
        .login(&request.email, &password)
        .await
        .map_err(|e| to_api_error(e, request_id(&headers)))?;

    Ok(Json(TokenResponse { token }))
}

/// Example route behind the auth middleware
///
/// GET /api/protected
pub async fn protected_handler(
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<MessageResponse> {
    debug!(user_id = %user.user_id, "Protected route accessed");
    Json(MessageResponse::new("This is a protected route"))
}

/// Health check handler
///
/// GET /health
///
/// Always 200 while the process is serving; `database` reports whether the
/// store answered a ping.
pub async fn health_handler(State(app_state): State<AppState>) -> Json<HealthResponse> {
    let database = match tokio::time::timeout(
        std::time::Duration::from_millis(800),
        app_state.certificates.ping(),
    )
    .await
    {
        Ok(Ok(())) => "connected".to_string(),
        Ok(Err(e)) => {
            warn!(error = %e, "Database ping failed");
            "unavailable".to_string()
        }
        Err(_) => {
            debug!("Database ping timed out in health check");
            "slow: timeout".to_string()
        }
    };

    let status = if database == "connected" { "healthy" } else { "degraded" };
    debug!(status = %status, "Health check");

    Json(HealthResponse {
        status: status.to_string(),
        database,
    })
}
