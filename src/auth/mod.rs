use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{SecurityConfig, MAX_JWT_EXPIRY_HOURS};

pub mod password;

/// Verified claim set extracted from a credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
        }
    }
}

/// Signed, time-limited token handed out on login. Never persisted.
#[derive(Debug, Clone)]
pub struct Credential {
    token: String,
    expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn into_string(self) -> String {
        self.token
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not match")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token generation failed: {0}")]
    Generation(String),
}

/// Issues and verifies HS256 credentials with a secret fixed at construction.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub const DEFAULT_TTL_HOURS: i64 = 24;

    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiration is exact; no grace period past `exp`
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        let hours = i64::try_from(security.jwt_expiry_hours.min(MAX_JWT_EXPIRY_HOURS))
            .unwrap_or(Self::DEFAULT_TTL_HOURS);
        Self::new(security.jwt_secret.as_bytes(), Duration::hours(hours))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, identity: &Identity) -> Result<Credential, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a credential as if the current time were `issued_at`.
    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<Credential, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Generation("expiration is out of range".to_string()))?;
        let claims = Claims {
            user_id: identity.user_id,
            email: identity.email.clone(),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))?;

        Ok(Credential { token, expires_at })
    }

    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            },
        )?;

        Ok(token_data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(secret.as_bytes(), Duration::hours(24))
    }

    fn identity() -> Identity {
        Identity {
            user_id: 7,
            email: "test@example.com".to_string(),
        }
    }

    #[test]
    fn issue_then_verify_round_trips() {
        let tokens = service("unit-test-secret");
        let credential = tokens.issue(&identity()).unwrap();

        assert_eq!(tokens.verify(credential.as_str()).unwrap(), identity());
    }

    #[test]
    fn credentials_expire_after_ttl() {
        let tokens = service("unit-test-secret");
        let now = Utc::now();
        let credential = tokens.issue_at(&identity(), now).unwrap();

        assert_eq!(credential.expires_at(), now + Duration::hours(24));
    }

    #[test]
    fn expired_credentials_fail() {
        let tokens = service("unit-test-secret");
        let issued_at = Utc::now() - Duration::hours(25);
        let credential = tokens.issue_at(&identity(), issued_at).unwrap();

        assert_eq!(tokens.verify(credential.as_str()), Err(TokenError::Expired));
    }

    #[test]
    fn foreign_secret_is_bad_signature() {
        let credential = service("secret-a").issue(&identity()).unwrap();

        assert_eq!(
            service("secret-b").verify(credential.as_str()),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let tokens = service("unit-test-secret");
        for token in ["", "invalid-token", "a.b", "a.b.c", "...."] {
            assert_eq!(tokens.verify(token), Err(TokenError::Malformed), "{:?}", token);
        }
    }

    #[test]
    fn any_mutated_byte_fails_verification() {
        let tokens = service("unit-test-secret");
        let token = tokens.issue(&identity()).unwrap().into_string();

        for (i, original) in token.char_indices() {
            let replacement = if original == 'A' { 'B' } else { 'A' };
            let mut tampered = token.clone();
            tampered.replace_range(i..i + original.len_utf8(), &replacement.to_string());

            assert!(
                tokens.verify(&tampered).is_err(),
                "mutation at byte {} still verified",
                i
            );
        }
    }

    #[test]
    fn ttl_comes_from_config() {
        let security = SecurityConfig {
            jwt_secret: "from-config".to_string(),
            jwt_secret_is_default: false,
            jwt_expiry_hours: 2,
            default_user_password: "password123".to_string(),
        };
        assert_eq!(TokenService::from_config(&security).ttl(), Duration::hours(2));
    }

    #[test]
    fn ttl_from_config_is_capped() {
        let security = SecurityConfig {
            jwt_secret: "from-config".to_string(),
            jwt_secret_is_default: false,
            jwt_expiry_hours: u64::MAX,
            default_user_password: "password123".to_string(),
        };
        let tokens = TokenService::from_config(&security);
        assert_eq!(tokens.ttl(), Duration::hours(MAX_JWT_EXPIRY_HOURS as i64));
        assert!(tokens.issue(&identity()).is_ok());
    }

    #[test]
    fn overflowing_expiration_is_a_generation_error() {
        let tokens = TokenService::new(b"unit-test-secret", Duration::hours(100_000_000_000));
        assert!(matches!(tokens.issue(&identity()), Err(TokenError::Generation(_))));
    }
}
