use crate::AppState;
use crate::content;
use crate::dtos::{
    EditPostDto, InputPostDto, PostDetailDto, PostDetailResponseDto, PostListResponseDto,
    PostResponseDto, ViewerDto,
};
use crate::error::{ContentError, HttpError, Resource};
use crate::handler::comment::comment_handler;
use crate::middleware::{Admin, admin_only};
use crate::models::PostId;
use crate::session::Session;
use axum::Extension;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post, put};
use axum::{Router, middleware};
use tracing::instrument;
use validator::Validate;

/// Reading is public; creating, editing and deleting sit behind the admin gate.
pub fn post_handler() -> Router<AppState> {
    Router::new()
        .route("/", get(get_posts))
        .route(
            "/",
            post(create_post).route_layer(middleware::from_fn(admin_only)),
        )
        .route("/{post_id}", get(get_post))
        .route(
            "/{post_id}",
            put(edit_post)
                .delete(delete_post)
                .route_layer(middleware::from_fn(admin_only)),
        )
        .nest("/{post_id}/comments", comment_handler())
}

#[instrument(skip_all)]
pub async fn get_posts(
    State(app_state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, HttpError> {
    let posts = content::list_posts(&app_state.db_client).await?;

    Ok(Json(PostListResponseDto {
        status: "success".to_string(),
        data: posts,
        viewer: ViewerDto::from_session(&session),
    }))
}

/// A post with its comments. Unknown ids are a 404.
#[instrument(skip(app_state, session))]
pub async fn get_post(
    Path(post_id): Path<PostId>,
    State(app_state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, HttpError> {
    let post = content::get_post(&app_state.db_client, post_id)
        .await?
        .ok_or(ContentError::NotFound(Resource::Post))?;

    let comments = content::list_comments_for_post(&app_state.db_client, post_id).await?;

    Ok(Json(PostDetailResponseDto {
        status: "success".to_string(),
        data: PostDetailDto { post, comments },
        viewer: ViewerDto::from_session(&session),
    }))
}

#[instrument(skip(app_state, admin, body), fields(title = %body.title))]
pub async fn create_post(
    State(app_state): State<AppState>,
    Extension(admin): Extension<Admin>,
    Json(body): Json<InputPostDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid create_post input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let post = content::create_post(&app_state.db_client, &admin, body.into_fields()).await?;

    Ok((
        StatusCode::CREATED,
        Json(PostResponseDto {
            status: "success".to_string(),
            data: post,
        }),
    ))
}

#[instrument(skip(app_state, admin, body))]
pub async fn edit_post(
    Path(post_id): Path<PostId>,
    State(app_state): State<AppState>,
    Extension(admin): Extension<Admin>,
    Json(body): Json<EditPostDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(|e| {
        tracing::error!("Invalid edit_post input: {}", e);
        HttpError::bad_request(e.to_string())
    })?;

    let post = content::update_post(
        &app_state.db_client,
        &admin,
        post_id,
        body.author_id,
        body.post.into_fields(),
    )
    .await?;

    Ok(Json(PostResponseDto {
        status: "success".to_string(),
        data: post,
    }))
}

#[instrument(skip(app_state, admin))]
pub async fn delete_post(
    Path(post_id): Path<PostId>,
    State(app_state): State<AppState>,
    Extension(admin): Extension<Admin>,
) -> Result<impl IntoResponse, HttpError> {
    content::delete_post(&app_state.db_client, &admin, post_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
