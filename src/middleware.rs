use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    AppState,
    error::{AccessError, HttpError},
    models::{ADMIN_USER_ID, UserId},
    session::{self, Session},
};

/// Resolve the client's session from its cookie and attach it to the request.
///
/// Applied to every API route. Never rejects: a visitor without a valid
/// cookie continues as anonymous. Handlers read it back with
/// `Extension(session): Extension<Session>`.
pub async fn session(
    cookie_jar: CookieJar,
    State(app_state): State<AppState>,
    mut req: Request,
    next: Next,
) -> impl IntoResponse {
    let session = session::read_session(&cookie_jar, app_state.env.app_secret_key.as_bytes());
    req.extensions_mut().insert(session);
    next.run(req).await
}

/// Proof that the authorization gate was passed.
///
/// Only [`require_admin`] builds one, so any function taking `&Admin`
/// cannot run for anyone but the administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admin {
    id: UserId,
}

impl Admin {
    pub fn id(&self) -> UserId {
        self.id
    }
}

/// The authorization gate: authenticated AND id equal to the administrator id.
pub fn require_admin(actor: Option<UserId>) -> Result<Admin, AccessError> {
    match actor {
        Some(id) if id == ADMIN_USER_ID => Ok(Admin { id }),
        _ => Err(AccessError::Forbidden),
    }
}

/// Any authenticated user.
pub fn require_user(actor: Option<UserId>) -> Result<UserId, AccessError> {
    actor.ok_or(AccessError::NotAuthenticated)
}

/// Route layer running the gate before the handler.
///
/// Must sit inside the `session` layer. A rejected request gets 403 without
/// its body being read and without the handler (or the store) being reached.
pub async fn admin_only(mut req: Request, next: Next) -> Result<impl IntoResponse, HttpError> {
    let actor = req
        .extensions()
        .get::<Session>()
        .and_then(Session::current_actor);

    let admin = require_admin(actor).map_err(|e| {
        tracing::warn!(actor = ?actor, "Admin-only route refused");
        HttpError::from(e)
    })?;

    req.extensions_mut().insert(admin);
    Ok(next.run(req).await)
}
