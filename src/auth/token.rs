// Bearer token issuance and verification (HS256 JWT)

use crate::core::errors::ServiceError;
use crate::core::models::TokenClaims;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, Secret};
use std::fmt;

/// Fixed validity window for issued tokens (1 hour)
pub const TOKEN_VALIDITY_SECS: i64 = 3600;

/// Signs and verifies session tokens with a server-held secret
///
/// Tokens are not persisted; there is no revocation list. A token is valid
/// exactly while its signature checks out and `now < exp`.
pub struct TokenIssuer {
    secret: Secret<String>,
}

impl TokenIssuer {
    pub fn new(secret: Secret<String>) -> Self {
        Self { secret }
    }

    /// Convenience constructor for tests and tooling
    pub fn from_secret_str(secret: &str) -> Self {
        Self::new(Secret::new(secret.to_string()))
    }

    /// Issue a token for `user_id`, valid for one hour from now
    pub fn issue(&self, user_id: &str) -> Result<String, ServiceError> {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `issued_at` (unix seconds)
    pub fn issue_at(&self, user_id: &str, issued_at: i64) -> Result<String, ServiceError> {
        let claims = TokenClaims {
            user_id: user_id.to_string(),
            iat: issued_at,
            exp: issued_at + TOKEN_VALIDITY_SECS,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|e| ServiceError::CryptoError(format!("Failed to sign token: {}", e)))
    }

    /// Verify a token against the current time
    pub fn verify(&self, token: &str) -> Result<TokenClaims, ServiceError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify signature, algorithm and expiry relative to `now` (unix seconds)
    ///
    /// Every failure collapses to `ServiceError::Unauthorized` so callers
    /// cannot tell an expired token from a forged one.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<TokenClaims, ServiceError> {
        // Expiry is checked below against the supplied clock, without leeway
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &validation,
        )
        .map_err(|_| ServiceError::Unauthorized)?;

        if data.claims.exp <= now {
            return Err(ServiceError::Unauthorized);
        }

        Ok(data.claims)
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"<REDACTED>")
            .finish()
    }
}
