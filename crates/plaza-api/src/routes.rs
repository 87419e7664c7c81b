use axum::{
    Json, Router,
    routing::{get, patch, post},
};
use serde_json::{Value, json};

use crate::{AppState, comments, likes, posts, tips, users};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/posts", get(posts::list_posts).post(posts::create_post))
        .route("/api/posts/{id}", get(posts::get_post).delete(posts::delete_post))
        .route("/api/posts/{id}/comments", get(comments::list_comments))
        .route("/api/posts/{id}/likes", get(likes::list_likes))
        .route("/api/posts/{id}/tips", get(tips::list_tips))
        .route("/api/comments", post(comments::create_comment))
        .route("/api/likes", post(likes::create_like))
        .route("/api/tips", post(tips::create_tip))
        .route("/api/users", post(users::create_user))
        .route("/api/users/{address}", get(users::get_user))
        .route("/api/users/{address}/profile", patch(users::update_profile))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
