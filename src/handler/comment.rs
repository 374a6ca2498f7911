use crate::AppState;
use crate::content;
use crate::dtos::{CommentListResponse, InputCommentDto, SingleCommentResponse};
use crate::error::HttpError;
use crate::models::PostId;
use crate::session::{self, Session};
use axum::Extension;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use tracing::instrument;
use validator::Validate;

/// Router for comment endpoints nested under /posts/{post_id}/comments
pub fn comment_handler() -> Router<AppState> {
    Router::new()
        // GET / - Comments of a post (public)
        // POST / - Add a comment (anonymous visitors are sent to login)
        .route("/", get(get_comments).post(create_comment))
}

#[instrument(skip(app_state))]
pub async fn get_comments(
    Path(post_id): Path<PostId>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let comments = content::list_comments_for_post(&app_state.db_client, post_id).await?;

    Ok(Json(CommentListResponse {
        status: "success".to_string(),
        data: comments,
    }))
}

/// Returns 201 Created with the new comment.
#[instrument(skip(app_state, session, body), fields(actor = ?session.current_actor()))]
pub async fn create_comment(
    Path(post_id): Path<PostId>,
    State(app_state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<InputCommentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid create_comment input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let comment = content::add_comment(
        &app_state.db_client,
        session::current_actor(&session),
        post_id,
        &body.text,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(SingleCommentResponse {
            status: "success".to_string(),
            data: comment,
        }),
    ))
}
