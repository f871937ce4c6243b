// Axum authentication middleware

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use crate::api::responses::ApiError;
use crate::auth::audit_logger::{AuditLogger, AuthEvent};
use crate::auth::token::TokenIssuer;
use crate::core::errors::ServiceError;
use crate::core::models::AuthenticatedUser;

/// Authentication state containing all dependencies
#[derive(Clone)]
pub struct AuthState {
    pub token_issuer: Arc<TokenIssuer>,
    pub audit_logger: Arc<AuditLogger>,
}

/// Authentication middleware function
///
/// Reads the bearer token from the `authorization` header, verifies it and
/// sets `AuthenticatedUser` in request extensions for handlers to use.
/// Outcomes: proceed, 401 "No token provided", or 401 "Unauthorized".
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    // 1. Extract token from header
    let Some(token) = extract_token(request.headers()) else {
        auth_state.audit_logger.log_auth_event(
            AuthEvent::TokenMissing,
            extract_ip_address(&request).as_deref(),
            extract_user_agent(&request).as_deref(),
        );
        return ApiError::from(ServiceError::MissingToken).into_response();
    };

    // 2. Verify signature and expiry
    let claims = match auth_state.token_issuer.verify(&token) {
        Ok(claims) => claims,
        Err(_) => {
            auth_state.audit_logger.log_auth_event(
                AuthEvent::TokenRejected,
                extract_ip_address(&request).as_deref(),
                extract_user_agent(&request).as_deref(),
            );
            return ApiError::from(ServiceError::Unauthorized).into_response();
        }
    };

    // 3. Set extensions for handler
    request.extensions_mut().insert(AuthenticatedUser {
        user_id: claims.user_id,
    });

    next.run(request).await
}

/// Extract token from the authorization header
///
/// Accepts the bare token as well as `Bearer <token>`. Blank values count
/// as missing.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?
        .trim();

    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Extract IP address from request headers
///
/// Checks `X-Forwarded-For` first (for proxied requests), then `X-Real-IP`.
fn extract_ip_address(request: &Request) -> Option<String> {
    request.headers()
        .get("X-Forwarded-For")
        .or_else(|| request.headers().get("X-Real-IP"))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Extract user agent from request headers
fn extract_user_agent(request: &Request) -> Option<String> {
    request.headers()
        .get("User-Agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
