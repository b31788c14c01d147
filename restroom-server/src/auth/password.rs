//! bcrypt password hashing.

use super::AuthError;

const BCRYPT_COST: u32 = 10;

pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    Ok(bcrypt::hash(plain, BCRYPT_COST)?)
}

pub fn verify_password(plain: &str, hash: &str) -> Result<bool, AuthError> {
    Ok(bcrypt::verify(plain, hash)?)
}
