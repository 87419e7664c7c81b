use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use plaza_types::api::IngestResponse;
use plaza_types::insert::{InsertTip, Insertable};
use plaza_types::models::Tip;
use plaza_types::validate::Fields;

use crate::comments::ChildQuery;
use crate::error::ApiError;
use crate::extract::{JsonBody, QueryParams};
use crate::posts::MAX_LIMIT;
use crate::{AppState, convert, ingest_status, run_blocking};

pub async fn create_tip(
    State(state): State<AppState>,
    JsonBody(fields): JsonBody<Fields>,
) -> Result<impl IntoResponse, ApiError> {
    let insert = InsertTip::from_fields(&fields)?;

    let (outcome, post) = run_blocking(&state, move |db| {
        let outcome = db.insert_tip(&insert)?;
        let post = db
            .get_post(&insert.post_id)?
            .ok_or_else(|| anyhow!("post {} missing after tip", insert.post_id))?;
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

pub async fn list_tips(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    QueryParams(query): QueryParams<ChildQuery>,
) -> Result<Json<Vec<Tip>>, ApiError> {
    let limit = query.limit.min(MAX_LIMIT);
    let lookup = post_id.clone();

    let rows = run_blocking(&state, move |db| {
        if db.get_post(&lookup)?.is_none() {
            return Ok(None);
        }
        db.get_tips(&lookup, limit).map(Some)
    })
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("post not found: {}", post_id)))?;

    Ok(Json(rows.into_iter().map(convert::tip).collect()))
}
