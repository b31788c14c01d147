//! Password hashing and token issuance.

mod password;
mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenKeys, TOKEN_LIFETIME};

/// Errors from the authentication layer.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),

    #[error("token encoding failed: {0}")]
    Encode(jsonwebtoken::errors::Error),
}
