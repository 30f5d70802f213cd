//! Stateless session tokens.
//!
//! A token is an HS256-signed claim set carrying the holder's identity, admin
//! flag and an absolute expiry. Validation needs nothing but the signing
//! secret, so there is no server-side session store and no revocation: a
//! token issued before an account change (or deletion) stays nominally valid
//! until its embedded expiry. That staleness window is a documented property
//! of the design, not an oversight.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, UserError};

/// The identity payload embedded in a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub id: String,
    pub admin: bool,
    /// Absolute expiry as unix seconds.
    pub expire: i64,
}

/// Issues and validates signed session tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &str, lifetime_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::days(lifetime_days),
        }
    }

    /// Seconds until a freshly issued token expires.
    pub fn lifetime_seconds(&self) -> i64 {
        self.lifetime.num_seconds()
    }

    /// Sign a token for the given identity, expiring `lifetime` from now.
    pub fn issue(&self, id: &str, username: &str, admin: bool) -> Result<String> {
        let claims = Claims {
            username: username.to_string(),
            id: id.to_string(),
            admin,
            expire: (Utc::now() + self.lifetime).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| UserError::InvalidToken)
    }

    /// Verify signature and expiry, yielding the embedded claims.
    ///
    /// A bad signature, a malformed token and an expired one all count as
    /// unauthenticated; the expired case keeps its own variant for logging.
    pub fn validate(&self, token: &str) -> Result<Claims> {
        // Expiry lives in the custom `expire` claim, so the built-in `exp`
        // handling is turned off and the check is done against `expire` below.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                UserError::InvalidToken
            })?;

        if data.claims.expire < Utc::now().timestamp() {
            return Err(UserError::ExpiredToken);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", 1)
    }

    #[test]
    fn issued_token_validates_and_carries_identity() {
        let svc = service();
        let token = svc.issue("u1", "alice", true).unwrap();
        let claims = svc.validate(&token).unwrap();
        assert_eq!(claims.id, "u1");
        assert_eq!(claims.username, "alice");
        assert!(claims.admin);
    }

    #[test]
    fn expiry_is_exactly_one_day_out() {
        let svc = service();
        let before = Utc::now().timestamp();
        let token = svc.issue("u1", "alice", false).unwrap();
        let after = Utc::now().timestamp();
        let claims = svc.validate(&token).unwrap();
        assert!(claims.expire >= before + 86_400);
        assert!(claims.expire <= after + 86_400);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = service().issue("u1", "alice", false).unwrap();
        let other = TokenService::new("another-secret", 1);
        assert!(matches!(
            other.validate(&token),
            Err(UserError::InvalidToken)
        ));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let svc = service();
        let mut token = svc.issue("u1", "alice", false).unwrap();
        token.push('x');
        assert!(svc.validate(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected_even_with_valid_signature() {
        // Zero-day lifetime puts `expire` in the past immediately.
        let svc = TokenService::new("test-secret", 0);
        let token = {
            let claims = Claims {
                username: "alice".into(),
                id: "u1".into(),
                admin: false,
                expire: Utc::now().timestamp() - 10,
            };
            jsonwebtoken::encode(
                &Header::new(Algorithm::HS256),
                &claims,
                &EncodingKey::from_secret(b"test-secret"),
            )
            .unwrap()
        };
        assert!(matches!(
            svc.validate(&token),
            Err(UserError::ExpiredToken)
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(service().validate("not.a.token").is_err());
    }
}
