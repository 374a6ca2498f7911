use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::ErrorMessage;

/// Maximum allowed password length in characters
///
/// Argon2 is intentionally slow, so unbounded input would let a client burn CPU.
pub const MAX_PASSWORD_LENGTH: usize = 64;

/// Hash a password using Argon2id with a fresh random salt.
///
/// The output is a PHC string that carries algorithm, parameters and salt:
/// ```text
/// $argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>
/// ```
/// Only this string is stored; the same password hashes differently each call.
pub fn hash(password: impl Into<String>) -> Result<String, ErrorMessage> {
    let password = password.into();

    if password.is_empty() {
        return Err(ErrorMessage::EmptyPassword);
    }

    if password.chars().count() > MAX_PASSWORD_LENGTH {
        return Err(ErrorMessage::ExceededMaxPasswordLength(MAX_PASSWORD_LENGTH));
    }

    let salt = SaltString::generate(&mut OsRng);

    let hashed_password = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| ErrorMessage::HashingError)?
        .to_string();

    Ok(hashed_password)
}

/// Check a candidate password against a stored digest.
///
/// Never fails: a malformed digest, an empty or oversized candidate all
/// verify as `false`, so callers treat every non-match as a bad login.
pub fn verify(digest: &str, password: &str) -> bool {
    if password.is_empty() || password.chars().count() > MAX_PASSWORD_LENGTH {
        return false;
    }

    let Ok(parsed_hash) = PasswordHash::new(digest) else {
        tracing::warn!("stored password digest is not a valid PHC string");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
