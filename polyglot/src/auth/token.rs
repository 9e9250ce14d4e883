//! Signed, expiring bearer tokens (HS256 JWT).

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Serialize, de::DeserializeOwned};

use super::errors::{AuthError, AuthResult};

/// Lifetime of a token when none is given
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Longest lifetime a configured token may have (one year)
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 3600;

#[derive(Serialize)]
struct Claims<'a, P> {
    #[serde(flatten)]
    payload: &'a P,
    iat: i64,
    exp: i64,
}

/// Issues and verifies tokens with a secret held by the server.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service with the default one hour lifetime
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::seconds(DEFAULT_TOKEN_TTL_SECS))
    }

    /// Create a token service with a custom default lifetime
    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the verifier's clock as-is.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Default lifetime of issued tokens
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign `payload` into a token expiring after the default lifetime
    pub fn issue<P: Serialize>(&self, payload: &P) -> AuthResult<String> {
        self.issue_with_ttl(payload, self.ttl)
    }

    /// Sign `payload` into a token expiring `ttl` from now
    ///
    /// The payload must serialize to a JSON object and must not use the
    /// `iat` or `exp` keys.
    ///
    /// # Errors
    ///
    /// * `AuthError::TokenLifetime` - `now + ttl` is not a representable time
    pub fn issue_with_ttl<P: Serialize>(&self, payload: &P, ttl: Duration) -> AuthResult<String> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(AuthError::TokenLifetime(ttl.num_seconds()))?;
        let claims = Claims {
            payload,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Recover the payload of a valid token
    ///
    /// Returns `None` for a bad signature, a malformed token, an expired
    /// token, or a payload that does not match `P`.
    pub fn verify<P: DeserializeOwned>(&self, token: &str) -> Option<P> {
        match decode::<P>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                log::debug!("Token rejected: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::SessionClaims;
    use serde::Deserialize;
    use uuid::Uuid;

    const SECRET: &str = "test_secret_key_for_testing_only_0123456789";

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        sub: String,
        scope: Vec<String>,
    }

    #[test]
    fn test_issue_then_verify_returns_payload() {
        let service = TokenService::new(SECRET);
        let payload = Payload {
            sub: "user-1".to_string(),
            scope: vec!["read".to_string()],
        };

        let token = service.issue(&payload).unwrap();
        assert_eq!(service.verify::<Payload>(&token), Some(payload));
    }

    #[test]
    fn test_session_claims_round_trip() {
        let service = TokenService::new(SECRET);
        let claims = SessionClaims { sub: Uuid::new_v4() };
        let token = service.issue(&claims).unwrap();
        assert_eq!(service.verify::<SessionClaims>(&token), Some(claims));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = TokenService::new(SECRET);
        let claims = SessionClaims { sub: Uuid::new_v4() };
        let token = service
            .issue_with_ttl(&claims, Duration::seconds(-60))
            .unwrap();
        assert_eq!(service.verify::<SessionClaims>(&token), None);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = TokenService::new(SECRET);
        let verifier = TokenService::new("another_secret_key_for_testing_only_98765");
        let token = issuer.issue(&SessionClaims { sub: Uuid::new_v4() }).unwrap();
        assert_eq!(verifier.verify::<SessionClaims>(&token), None);
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let service = TokenService::new(SECRET);
        let token = service.issue(&SessionClaims { sub: Uuid::new_v4() }).unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let other = service.issue(&SessionClaims { sub: Uuid::new_v4() }).unwrap();
        // Swap in another token's payload while keeping the first signature.
        parts[1] = other.split('.').nth(1).unwrap().to_string();
        let forged = parts.join(".");

        assert_eq!(service.verify::<SessionClaims>(&forged), None);
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        let service = TokenService::new(SECRET);
        assert_eq!(service.verify::<SessionClaims>(""), None);
        assert_eq!(service.verify::<SessionClaims>("not.a.token"), None);
        assert_eq!(service.verify::<SessionClaims>("garbage"), None);
    }

    #[test]
    fn test_payload_shape_mismatch_is_rejected() {
        let service = TokenService::new(SECRET);
        let token = service
            .issue(&Payload {
                sub: "not-a-uuid".to_string(),
                scope: vec![],
            })
            .unwrap();
        assert_eq!(service.verify::<SessionClaims>(&token), None);
    }

    #[test]
    fn test_overflowing_lifetime_is_an_error() {
        let service = TokenService::with_ttl(SECRET, Duration::seconds(1_000_000_000_000_000));
        let err = service
            .issue(&SessionClaims { sub: Uuid::new_v4() })
            .unwrap_err();
        assert!(matches!(err, AuthError::TokenLifetime(1_000_000_000_000_000)));
    }

    #[test]
    fn test_longest_allowed_lifetime_issues() {
        let service = TokenService::with_ttl(SECRET, Duration::seconds(MAX_TOKEN_TTL_SECS));
        let claims = SessionClaims { sub: Uuid::new_v4() };
        let token = service.issue(&claims).unwrap();
        assert_eq!(service.verify::<SessionClaims>(&token), Some(claims));
    }

    #[test]
    fn test_default_ttl_is_one_hour() {
        assert_eq!(TokenService::new(SECRET).ttl(), Duration::seconds(3600));
    }
}
