//! JWT issuance and validation.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::domain::{Role, User};

/// Tokens are valid for a day.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Claims carried in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub exp: i64,
}

/// HS256 key pair derived from the configured secret.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token for a freshly authenticated user.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let exp = Utc::now().timestamp() + TOKEN_LIFETIME.as_secs() as i64;
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            exp,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(AuthError::Encode)
    }

    /// Validate a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(err),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: "user-1".to_owned(),
            email: "a@example.com".to_owned(),
            password_hash: "$2b$10$hash".to_owned(),
            name: "테스터".to_owned(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let keys = TokenKeys::new("test-secret");
        let token = keys.issue(&user(Role::Admin)).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = TokenKeys::new("secret-a").issue(&user(Role::User)).unwrap();
        let err = TokenKeys::new("secret-b").verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn garbage_is_rejected() {
        let keys = TokenKeys::new("test-secret");
        assert!(keys.verify("not.a.token").is_err());
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let keys = TokenKeys::new("test-secret");
        let claims = Claims {
            sub: "user-1".to_owned(),
            email: "a@example.com".to_owned(),
            role: Role::User,
            exp: Utc::now().timestamp() - 120,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert!(matches!(keys.verify(&token).unwrap_err(), AuthError::Expired));
    }
}
