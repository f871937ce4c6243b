// Unit tests for token validity windows

use certificate_registry::auth::token::{TokenIssuer, TOKEN_VALIDITY_SECS};
use certificate_registry::core::errors::ServiceError;

const ISSUED_AT: i64 = 1_700_000_000;

#[test]
fn test_token_valid_within_window() {
    let issuer = TokenIssuer::from_secret_str("unit-secret");
    let token = issuer.issue_at("user-1", ISSUED_AT).unwrap();

    let claims = issuer.verify_at(&token, ISSUED_AT + 30 * 60).unwrap();

    assert_eq!(claims.user_id, "user-1");
    assert_eq!(claims.iat, ISSUED_AT);
    assert_eq!(claims.exp, ISSUED_AT + TOKEN_VALIDITY_SECS);
}

#[test]
fn test_token_rejected_after_window() {
    let issuer = TokenIssuer::from_secret_str("unit-secret");
    let token = issuer.issue_at("user-1", ISSUED_AT).unwrap();

    let result = issuer.verify_at(&token, ISSUED_AT + 61 * 60);

    assert!(matches!(result, Err(ServiceError::Unauthorized)));
}

#[test]
fn test_tokens_from_other_issuers_rejected() {
    let ours = TokenIssuer::from_secret_str("unit-secret");
    let theirs = TokenIssuer::from_secret_str("other-secret");
    let token = theirs.issue_at("user-1", ISSUED_AT).unwrap();

    assert!(matches!(
        ours.verify_at(&token, ISSUED_AT + 1),
        Err(ServiceError::Unauthorized)
    ));
}

#[test]
fn test_empty_token_rejected() {
    let issuer = TokenIssuer::from_secret_str("unit-secret");
    assert!(matches!(
        issuer.verify_at("", ISSUED_AT),
        Err(ServiceError::Unauthorized)
    ));
}
