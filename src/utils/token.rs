//! Signed session tokens. The session cookie carries one of these; the
//! signature is what stops a client from claiming another user's id.
use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::{Error, ErrorKind},
};
use serde::{Deserialize, Serialize};

use crate::models::UserId;

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    // sub => user id, iat => issued at, exp => expiration
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn create_token(
    user_id: UserId,
    secret: &[u8],
    expires_in_seconds: i64,
) -> Result<String, Error> {
    let now = Utc::now();
    let iat = now.timestamp() as usize;
    let exp = (now + Duration::seconds(expires_in_seconds)).timestamp() as usize;
    let claims = TokenClaims {
        sub: user_id.to_string(),
        iat,
        exp,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
}

/// Returns the user id in `sub`. Expiry is checked by `Validation`.
pub fn decode_token(token: &str, secret: &[u8]) -> Result<UserId, Error> {
    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    )?;

    data.claims
        .sub
        .parse::<UserId>()
        .map_err(|_| ErrorKind::InvalidSubject.into())
}
