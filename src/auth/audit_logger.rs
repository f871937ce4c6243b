// Security event logging

use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

/// Authentication event type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    Registered { user_id: String },
    LoginSuccess { user_id: String },
    LoginFailure,
    TokenMissing,
    TokenRejected,
}

impl AuthEvent {
    /// Stable identifier stored in the audit table
    pub fn event_type(&self) -> &'static str {
        match self {
            AuthEvent::Registered { .. } => "REGISTERED",
            AuthEvent::LoginSuccess { .. } => "LOGIN_SUCCESS",
            AuthEvent::LoginFailure => "LOGIN_FAILURE",
            AuthEvent::TokenMissing => "TOKEN_MISSING",
            AuthEvent::TokenRejected => "TOKEN_REJECTED",
        }
    }

    fn user_id(&self) -> Option<&str> {
        match self {
            AuthEvent::Registered { user_id } | AuthEvent::LoginSuccess { user_id } => {
                Some(user_id.as_str())
            }
            _ => None,
        }
    }
}

/// Audit logger for security events
///
/// Never receives passwords, hashes or tokens; only the event kind, the
/// account id when known, and request metadata.
pub struct AuditLogger {
    db_pool: Option<Arc<PgPool>>,
}

impl AuditLogger {
    /// Create a new audit logger
    ///
    /// If `db_pool` is `None`, only structured logging will be used (no database persistence).
    pub fn new(db_pool: Option<Arc<PgPool>>) -> Self {
        Self { db_pool }
    }

    /// Log an authentication event
    ///
    /// The structured log line is written immediately. The database insert,
    /// when enabled, is fire-and-forget: failures are logged and never affect
    /// the request.
    pub fn log_auth_event(
        &self,
        event: AuthEvent,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) {
        match event {
            AuthEvent::Registered { ref user_id } => {
                info!(user_id = %user_id, ip_address = ?ip_address, "Account registered");
            }
            AuthEvent::LoginSuccess { ref user_id } => {
                info!(user_id = %user_id, ip_address = ?ip_address, "Login successful");
            }
            AuthEvent::LoginFailure => {
                warn!(ip_address = ?ip_address, user_agent = ?user_agent, "Login failed");
            }
            AuthEvent::TokenMissing => {
                warn!(ip_address = ?ip_address, user_agent = ?user_agent, "Request without token");
            }
            AuthEvent::TokenRejected => {
                warn!(ip_address = ?ip_address, user_agent = ?user_agent, "Token rejected");
            }
        }

        let Some(pool) = self.db_pool.clone() else {
            return;
        };

        let event_type = event.event_type();
        let user_id = event.user_id().map(|s| s.to_string());
        let ip = ip_address.map(|s| s.to_string());
        let ua = user_agent.map(|s| s.to_string());

        tokio::spawn(async move {
            if let Err(e) = sqlx::query(
                "INSERT INTO auth_audit_log (event_type, user_id, ip_address, user_agent, created_at)
                 VALUES ($1, $2, $3, $4, NOW())",
            )
            .bind(event_type)
            .bind(&user_id)
            .bind(&ip)
            .bind(&ua)
            .execute(pool.as_ref())
            .await
            {
                warn!(error = %e, "Failed to write audit log to database");
            }
        });
    }
}
