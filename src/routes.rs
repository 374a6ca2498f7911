use axum::{Json, Router, middleware, response::IntoResponse, routing::get};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    dtos::Response,
    handler::{auth::auth_handler, post::post_handler},
    middleware::session,
};

pub fn create_router(app_state: AppState) -> Router {
    let api_route = Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_handler())
        .nest("/posts", post_handler())
        // outermost: every route (and the admin gate inside it) sees the resolved session
        .layer(middleware::from_fn_with_state(app_state.clone(), session))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Router::new().nest("/api", api_route)
}

async fn health() -> impl IntoResponse {
    Json(Response {
        status: "success",
        message: "ok".to_string(),
    })
}
