use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;

use plaza_types::api::IngestResponse;
use plaza_types::insert::{InsertComment, Insertable};
use plaza_types::models::Comment;
use plaza_types::validate::Fields;

use crate::error::ApiError;
use crate::extract::{JsonBody, QueryParams};
use crate::posts::{MAX_LIMIT, default_limit};
use crate::{AppState, convert, ingest_status, run_blocking};

#[derive(Debug, Deserialize)]
pub struct ChildQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

pub async fn create_comment(
    State(state): State<AppState>,
    JsonBody(fields): JsonBody<Fields>,
) -> Result<impl IntoResponse, ApiError> {
    let insert = InsertComment::from_fields(&fields)?;

    let (outcome, post) = run_blocking(&state, move |db| {
        let outcome = db.insert_comment(&insert)?;
        let post = db
            .get_post(&insert.post_id)?
            .ok_or_else(|| anyhow!("post {} missing after comment", insert.post_id))?;
        Ok((outcome, post))
    })
    .await?;

    Ok((
        ingest_status(&outcome),
        Json(IngestResponse {
            id: outcome.id().to_string(),
            created: outcome.is_created(),
            post: convert::post(post),
        }),
    ))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    QueryParams(query): QueryParams<ChildQuery>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let limit = query.limit.min(MAX_LIMIT);
    let lookup = post_id.clone();

    let rows = run_blocking(&state, move |db| {
        if db.get_post(&lookup)?.is_none() {
            return Ok(None);
        }
        db.get_comments(&lookup, limit).map(Some)
    })
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("post not found: {}", post_id)))?;

    Ok(Json(rows.into_iter().map(convert::comment).collect()))
}
