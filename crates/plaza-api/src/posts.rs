use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use plaza_db::PostCursor;
use plaza_types::insert::{InsertPost, Insertable};
use plaza_types::models::Post;
use plaza_types::validate::Fields;

use crate::error::ApiError;
use crate::extract::{JsonBody, QueryParams};
use crate::{AppState, convert, ingest_status, run_blocking};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub author: Option<String>,
    /// Cursor: pass the `createdAt` and `id` of the oldest post from the
    /// previous page to fetch older posts.
    pub before: Option<DateTime<Utc>>,
    pub before_id: Option<String>,
}

pub(crate) fn default_limit() -> u32 {
    50
}

pub(crate) const MAX_LIMIT: u32 = 200;

pub async fn list_posts(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PostQuery>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let limit = query.limit.min(MAX_LIMIT);
    let before = query.before.as_ref().map(convert::to_sqlite);
    let before_id = query.before_id;
    let author = query.author;

    let rows = run_blocking(&state, move |db| {
        let cursor = before.as_deref().map(|created_at| PostCursor {
            created_at,
            id: before_id.as_deref(),
        });
        db.list_posts(limit, author.as_deref(), cursor)
    })
    .await?;

    Ok(Json(rows.into_iter().map(convert::post).collect()))
}

pub async fn create_post(
    State(state): State<AppState>,
    JsonBody(fields): JsonBody<Fields>,
) -> Result<impl IntoResponse, ApiError> {
    let insert = InsertPost::from_fields(&fields)?;

    let (outcome, row) = run_blocking(&state, move |db| {
        let outcome = db.insert_post(&insert)?;
        let row = db
            .get_post(outcome.id())?
            .ok_or_else(|| anyhow!("post {} missing after insert", outcome.id()))?;
        Ok((outcome, row))
    })
    .await?;

    Ok((ingest_status(&outcome), Json(convert::post(row))))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let lookup = id.clone();
    let row = run_blocking(&state, move |db| db.get_post(&lookup))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("post not found: {}", id)))?;

    Ok(Json(convert::post(row)))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let lookup = id.clone();
    let deleted = run_blocking(&state, move |db| db.delete_post(&lookup)).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("post not found: {}", id)))
    }
}
