//! Identity & session management.
//!
//! A [`Session`] is the per-client authenticated identity. It is resolved
//! from the signed `session` cookie once per request (see
//! `middleware::session`), handed explicitly to every operation that needs
//! the actor, and written back to the cookie jar when it changes.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::instrument;

use crate::{
    config::Config,
    db::UserExt,
    error::{AuthError, ErrorMessage, HttpError, RegistrationError},
    models::UserId,
    utils::{password, token},
};

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    actor: Option<UserId>,
}

impl Session {
    pub fn anonymous() -> Self {
        Session { actor: None }
    }

    pub fn authenticated(user_id: UserId) -> Self {
        Session {
            actor: Some(user_id),
        }
    }

    /// The logged-in user, or `None` for an anonymous visitor.
    pub fn current_actor(&self) -> Option<UserId> {
        self.actor
    }

    pub fn is_authenticated(&self) -> bool {
        self.actor.is_some()
    }

    fn establish(&mut self, user_id: UserId) {
        self.actor = Some(user_id);
    }
}

/// Create an account and log the new user in.
///
/// Only the email is checked up front. Username uniqueness is left to the
/// store's UNIQUE constraint, which is also what settles two concurrent
/// registrations racing past the email check.
#[instrument(skip_all, fields(username = %username, email = %email))]
pub async fn register<S: UserExt>(
    store: &S,
    session: &mut Session,
    username: &str,
    email: &str,
    password: &str,
) -> Result<UserId, RegistrationError> {
    if store.get_user(None, None, Some(email)).await?.is_some() {
        tracing::warn!("Registration with an existing email");
        return Err(RegistrationError::DuplicateEmail);
    }

    let digest = password::hash(password).map_err(|e| {
        tracing::error!("Password hashing error: {}", e);
        RegistrationError::Password(e)
    })?;

    let user = store.save_user(username, email, digest.as_str()).await?;

    session.establish(user.id);
    tracing::info!(user_id = user.id, "Register Successful");
    Ok(user.id)
}

/// Log in with email and password. The session is left untouched on failure.
#[instrument(skip_all, fields(email = %email))]
pub async fn authenticate<S: UserExt>(
    store: &S,
    session: &mut Session,
    email: &str,
    password: &str,
) -> Result<UserId, AuthError> {
    let user = store
        .get_user(None, None, Some(email))
        .await?
        .ok_or_else(|| {
            tracing::warn!("Login with unknown email");
            AuthError::UnknownEmail
        })?;

    if !password::verify(&user.password, password) {
        tracing::warn!(user_id = user.id, "password mismatch");
        return Err(AuthError::BadPassword);
    }

    session.establish(user.id);
    tracing::info!(user_id = user.id, "Login Successful");
    Ok(user.id)
}

pub fn logout(session: &mut Session) {
    if let Some(user_id) = session.actor.take() {
        tracing::info!(user_id, "Logout");
    }
}

pub fn current_actor(session: &Session) -> Option<UserId> {
    session.current_actor()
}

/// Replace the logged-in user's password after re-checking the current one.
#[instrument(skip_all)]
pub async fn change_password<S: UserExt>(
    store: &S,
    session: &Session,
    current_password: &str,
    new_password: &str,
) -> Result<(), AuthError> {
    let user_id = session.current_actor().ok_or(AuthError::NotAuthenticated)?;

    let user = store
        .get_user(Some(user_id), None, None)
        .await?
        .ok_or_else(|| {
            tracing::warn!(user_id, "Session refers to a missing user");
            AuthError::NotAuthenticated
        })?;

    if !password::verify(&user.password, current_password) {
        return Err(AuthError::BadPassword);
    }

    let digest = password::hash(new_password).map_err(AuthError::Password)?;
    store.update_user_password(user.id, digest).await?;

    tracing::info!(user_id, "Password changed");
    Ok(())
}

// ============================================================================
// Cookie persistence
// ============================================================================

/// Read the session from the request cookies.
///
/// A missing, expired, tampered or malformed cookie is simply an anonymous session.
pub fn read_session(jar: &CookieJar, secret: &[u8]) -> Session {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Session::anonymous();
    };

    match token::decode_token(cookie.value(), secret) {
        Ok(user_id) => Session::authenticated(user_id),
        Err(e) => {
            tracing::debug!("Ignoring invalid session cookie: {}", e);
            Session::anonymous()
        }
    }
}

/// Persist `session` into the jar: a signed cookie when logged in, a removal cookie otherwise.
pub fn write_session(
    jar: CookieJar,
    session: &Session,
    config: &Config,
) -> Result<CookieJar, HttpError> {
    let Some(user_id) = session.current_actor() else {
        return Ok(jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/")));
    };

    let session_token = token::create_token(
        user_id,
        config.app_secret_key.as_bytes(),
        config.session_maxage,
    )
    .map_err(|e| {
        tracing::error!("Session token creation error: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    let cookie = Cookie::build((SESSION_COOKIE, session_token))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(config.session_maxage))
        .build();

    Ok(jar.add(cookie))
}
