// Registration and login

use crate::api::UserStore;
use crate::auth::audit_logger::{AuditLogger, AuthEvent};
use crate::auth::password::{Password, PasswordHasher, MAX_PASSWORD_BYTES};
use crate::auth::token::TokenIssuer;
use crate::core::errors::ServiceError;
use crate::core::models::NewUser;
use std::sync::Arc;
use tracing::{error, info};

/// Account lifecycle: register, then log in for a bearer token
pub struct AccountService {
    users: Arc<dyn UserStore + Send + Sync>,
    hasher: PasswordHasher,
    tokens: Arc<TokenIssuer>,
    audit: Arc<AuditLogger>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserStore + Send + Sync>,
        hasher: PasswordHasher,
        tokens: Arc<TokenIssuer>,
        audit: Arc<AuditLogger>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            audit,
        }
    }

    /// Hash the password and persist the account
    ///
    /// Returns the new account id. Nothing derived from the password is
    /// returned or logged.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &Password,
    ) -> Result<String, ServiceError> {
        if email.trim().is_empty() {
            return Err(ServiceError::ValidationError("Email is required".to_string()));
        }
        if password.is_empty() {
            return Err(ServiceError::ValidationError("Password is required".to_string()));
        }
        if password.is_too_long() {
            return Err(ServiceError::ValidationError(format!(
                "Password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }

        let password_hash = self.hasher.hash(password).await?;

        let user = self
            .users
            .create_user(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await
            .map_err(|e| {
                if e.is_infrastructure() {
                    error!(error = %e, "Failed to persist account");
                } else {
                    info!("Registration rejected: email already in use");
                }
                e
            })?;

        let user_id = user.id.to_string();
        self.audit.log_auth_event(
            AuthEvent::Registered { user_id: user_id.clone() },
            None,
            None,
        );
        Ok(user_id)
    }

    /// Check credentials and issue a signed token
    ///
    /// Unknown email and wrong password fail with the same
    /// `ServiceError::InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &Password) -> Result<String, ServiceError> {
        let user = match self.users.find_by_email(email).await? {
            Some(user) => user,
            None => {
                // Same bcrypt work as a wrong password
                self.hasher.verify_absent(password).await?;
                self.audit.log_auth_event(AuthEvent::LoginFailure, None, None);
                return Err(ServiceError::InvalidCredentials);
            }
        };

        if !self.hasher.verify(password, &user.password_hash).await? {
            self.audit.log_auth_event(AuthEvent::LoginFailure, None, None);
            return Err(ServiceError::InvalidCredentials);
        }

        let user_id = user.id.to_string();
        let token = self.tokens.issue(&user_id)?;

        self.audit.log_auth_event(AuthEvent::LoginSuccess { user_id }, None, None);
        Ok(token)
    }
}
