use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error body sent to clients
///
/// `message` is the flash notice shown to the visitor. `redirect` is set when
/// the client is expected to move somewhere else, e.g. to the login form after
/// an anonymous comment attempt.
///
/// ```json
/// { "status": "fail", "message": "Sorry, but you are not logged in!", "redirect": "/api/auth/login" }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => write!(f, "{}", s),
            Err(_) => Err(fmt::Error),
        }
    }
}

/// User-facing flash messages.
///
/// PartialEq allows comparing variants in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorMessage {
    // Credential store
    EmptyPassword,
    ExceededMaxPasswordLength(usize),
    HashingError,

    // Registration
    DuplicateEmail,
    DuplicateUsername,

    // Authentication
    UnknownEmail,
    BadPassword,
    UserNotAuthenticated,

    // Authorization
    PermissionDenied,

    // Content
    PostNotFound,
    UserNotFound,
    DuplicateTitle,

    //Else
    ServerError,
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ErrorMessage::EmptyPassword => "Password cannot be empty".to_string(),
            ErrorMessage::ExceededMaxPasswordLength(max_length) => {
                format!("Password must not be more than {} characters", max_length)
            }
            ErrorMessage::HashingError => "Error while hashing password".to_string(),
            ErrorMessage::DuplicateEmail => {
                "An account with this email already exists. Log in instead.".to_string()
            }
            ErrorMessage::DuplicateUsername => "This username is already taken".to_string(),
            ErrorMessage::UnknownEmail => "This email does not exist!".to_string(),
            ErrorMessage::BadPassword => "The user or the password might be wrong".to_string(),
            ErrorMessage::UserNotAuthenticated => "Sorry, but you are not logged in!".to_string(),
            ErrorMessage::PermissionDenied => {
                "You are not allowed to perform this action".to_string()
            }
            ErrorMessage::PostNotFound => "Post not found".to_string(),
            ErrorMessage::UserNotFound => "User not found".to_string(),
            ErrorMessage::DuplicateTitle => "A post with this title already exists".to_string(),
            ErrorMessage::ServerError => "Server Error. Please try again later".to_string(),
        };
        write!(f, "{}", message)
    }
}

/// Internal HTTP error type returned by handlers and middleware.
///
/// Axum turns `Err(HttpError)` into a JSON response through `IntoResponse`.
#[derive(Debug, Clone)]
pub struct HttpError {
    pub message: String,
    pub status: StatusCode,
    pub redirect: Option<String>,
}

impl HttpError {
    pub fn new(message: impl Into<String>, status: StatusCode) -> Self {
        HttpError {
            message: message.into(),
            status,
            redirect: None,
        }
    }

    /// 500. Use for storage faults; the detail goes to the log, not the client.
    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// 400. Invalid input.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::BAD_REQUEST)
    }

    /// 409. Unique email, username or title already taken.
    pub fn unique_constraint_violation(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::CONFLICT)
    }

    /// 401. Note: 401 means "unauthenticated", not "unauthorized".
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::UNAUTHORIZED)
    }

    /// 403. Authenticated (or not) but not the administrator.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::FORBIDDEN)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::NOT_FOUND)
    }

    /// Attach the path the client should navigate to next.
    pub fn with_redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    pub fn into_http_response(self) -> Response {
        let json_response = Json(ErrorResponse {
            status: "fail".to_string(),
            message: self.message,
            redirect: self.redirect,
        });

        (self.status, json_response).into_response()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HttpError: message: {}, status: {}",
            self.message, self.status
        )
    }
}

impl std::error::Error for HttpError {}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

// ============================================================================
// Domain errors
// ============================================================================

/// Column guarded by a storage-level UNIQUE constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
    Title,
    Other,
}

impl UniqueField {
    /// Map a Postgres constraint name (default `<table>_<column>_key`) to the column.
    pub fn from_constraint(constraint: Option<&str>) -> Self {
        match constraint {
            Some("users_email_key") => UniqueField::Email,
            Some("users_username_key") => UniqueField::Username,
            Some("posts_title_key") => UniqueField::Title,
            _ => UniqueField::Other,
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UniqueField::Email => "email",
            UniqueField::Username => "username",
            UniqueField::Title => "title",
            UniqueField::Other => "unknown column",
        };
        write!(f, "{}", name)
    }
}

/// Column whose FOREIGN KEY constraint rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignField {
    /// `posts.author_id` or `comments.author_id`
    Author,
    /// `comments.post_id`
    Post,
    Other,
}

impl ForeignField {
    /// Map a Postgres constraint name (default `<table>_<column>_fkey`) to the column.
    pub fn from_constraint(constraint: Option<&str>) -> Self {
        match constraint {
            Some("posts_author_id_fkey") | Some("comments_author_id_fkey") => ForeignField::Author,
            Some("comments_post_id_fkey") => ForeignField::Post,
            _ => ForeignField::Other,
        }
    }
}

impl fmt::Display for ForeignField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ForeignField::Author => "author",
            ForeignField::Post => "post",
            ForeignField::Other => "unknown column",
        };
        write!(f, "{}", name)
    }
}

/// Failures reported by the store traits in `crate::db`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated on {0}")]
    UniqueViolation(UniqueField),

    #[error("referenced {0} does not exist")]
    ForeignKeyViolation(ForeignField),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation(UniqueField::from_constraint(
                    db_err.constraint(),
                ));
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation(ForeignField::from_constraint(
                    db_err.constraint(),
                ));
            }
        }
        StoreError::Database(err)
    }
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("email already registered")]
    DuplicateEmail,

    /// Only the storage constraint catches this; the registration check looks at email alone.
    #[error("username already registered")]
    DuplicateUsername,

    #[error("{0}")]
    Password(ErrorMessage),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(UniqueField::Email) => RegistrationError::DuplicateEmail,
            StoreError::UniqueViolation(UniqueField::Username) => {
                RegistrationError::DuplicateUsername
            }
            other => RegistrationError::Store(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no user with this email")]
    UnknownEmail,

    #[error("password does not match")]
    BadPassword,

    #[error("no authenticated user")]
    NotAuthenticated,

    #[error("{0}")]
    Password(ErrorMessage),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of the authorization gate and of the "must be logged in" check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("administrator only")]
    Forbidden,

    #[error("authentication required")]
    NotAuthenticated,
}

/// What a `ContentError::NotFound` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Post,
    User,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Post => write!(f, "post"),
            Resource::User => write!(f, "user"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("{0} not found")]
    NotFound(Resource),

    #[error("post title already used")]
    DuplicateTitle,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ContentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(UniqueField::Title) => ContentError::DuplicateTitle,
            other => ContentError::Store(other),
        }
    }
}

// ============================================================================
// Domain error -> HTTP
// ============================================================================

pub const LOGIN_PATH: &str = "/api/auth/login";

fn store_failure(err: &StoreError) -> HttpError {
    tracing::error!("DB error: {}", err);
    HttpError::server_error(ErrorMessage::ServerError.to_string())
}

impl From<RegistrationError> for HttpError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::DuplicateEmail => {
                HttpError::unique_constraint_violation(ErrorMessage::DuplicateEmail.to_string())
            }
            RegistrationError::DuplicateUsername => {
                HttpError::unique_constraint_violation(ErrorMessage::DuplicateUsername.to_string())
            }
            RegistrationError::Password(msg) => HttpError::bad_request(msg.to_string()),
            RegistrationError::Store(e) => store_failure(&e),
        }
    }
}

impl From<AuthError> for HttpError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UnknownEmail => {
                HttpError::unauthorized(ErrorMessage::UnknownEmail.to_string())
            }
            AuthError::BadPassword => HttpError::unauthorized(ErrorMessage::BadPassword.to_string()),
            AuthError::NotAuthenticated => {
                HttpError::unauthorized(ErrorMessage::UserNotAuthenticated.to_string())
                    .with_redirect(LOGIN_PATH)
            }
            AuthError::Password(msg) => HttpError::bad_request(msg.to_string()),
            AuthError::Store(e) => store_failure(&e),
        }
    }
}

impl From<AccessError> for HttpError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Forbidden => {
                HttpError::forbidden(ErrorMessage::PermissionDenied.to_string())
            }
            AccessError::NotAuthenticated => {
                HttpError::unauthorized(ErrorMessage::UserNotAuthenticated.to_string())
                    .with_redirect(LOGIN_PATH)
            }
        }
    }
}

impl From<ContentError> for HttpError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::Access(access) => access.into(),
            ContentError::NotFound(Resource::Post) => {
                HttpError::not_found(ErrorMessage::PostNotFound.to_string())
            }
            ContentError::NotFound(Resource::User) => {
                HttpError::not_found(ErrorMessage::UserNotFound.to_string())
            }
            ContentError::DuplicateTitle => {
                HttpError::unique_constraint_violation(ErrorMessage::DuplicateTitle.to_string())
            }
            ContentError::Store(e) => store_failure(&e),
        }
    }
}
