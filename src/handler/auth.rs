use crate::{
    AppState,
    dtos::{
        LoginUserDto, RegisterUserDto, Response, SessionResponseDto, UserPasswordUpdateDto,
        ViewerDto,
    },
    error::HttpError,
    session::{self, Session},
};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;
use validator::Validate;

/// Router for authentication endpoints
pub fn auth_handler() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/password", put(change_password))
}

/// Register new user account and log it in
#[instrument(skip_all, fields(username = %body.username, email = %body.email))]
pub async fn register(
    State(app_state): State<AppState>,
    Extension(mut session): Extension<Session>,
    cookie_jar: CookieJar,
    Json(body): Json<RegisterUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid register input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    session::register(
        &app_state.db_client,
        &mut session,
        &body.username,
        &body.email,
        &body.password,
    )
    .await?;

    let cookie_jar = session::write_session(cookie_jar, &session, &app_state.env)?;

    Ok((
        StatusCode::CREATED,
        cookie_jar,
        Json(SessionResponseDto {
            status: "success".to_string(),
            viewer: ViewerDto::from_session(&session),
        }),
    ))
}

/// Login with email and password
#[instrument(skip_all, fields(email = %body.email))]
pub async fn login(
    State(app_state): State<AppState>,
    Extension(mut session): Extension<Session>,
    cookie_jar: CookieJar,
    Json(body): Json<LoginUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid login input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    session::authenticate(&app_state.db_client, &mut session, &body.email, &body.password)
        .await?;

    let cookie_jar = session::write_session(cookie_jar, &session, &app_state.env)?;

    Ok((
        cookie_jar,
        Json(SessionResponseDto {
            status: "success".to_string(),
            viewer: ViewerDto::from_session(&session),
        }),
    ))
}

/// Clear the session. Succeeds for anonymous visitors too.
#[instrument(skip_all)]
pub async fn logout(
    State(app_state): State<AppState>,
    Extension(mut session): Extension<Session>,
    cookie_jar: CookieJar,
) -> Result<impl IntoResponse, HttpError> {
    session::logout(&mut session);
    let cookie_jar = session::write_session(cookie_jar, &session, &app_state.env)?;

    Ok((
        cookie_jar,
        Json(SessionResponseDto {
            status: "success".to_string(),
            viewer: ViewerDto::from_session(&session),
        }),
    ))
}

/// The current actor, if any
pub async fn me(Extension(session): Extension<Session>) -> impl IntoResponse {
    Json(SessionResponseDto {
        status: "success".to_string(),
        viewer: ViewerDto::from_session(&session),
    })
}

/// Change the logged-in user's password
#[instrument(skip_all, fields(actor = ?session.current_actor()))]
pub async fn change_password(
    State(app_state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<UserPasswordUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid change_password input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    session::change_password(
        &app_state.db_client,
        &session,
        &body.current_password,
        &body.new_password,
    )
    .await?;

    Ok(Json(Response {
        status: "success",
        message: "Password has been changed.".to_string(),
    }))
}
