use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use plaza_types::api::UpdateUserProfile;
use plaza_types::insert::{InsertUser, Insertable};
use plaza_types::models::User;
use plaza_types::validate::Fields;

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::{AppState, convert, ingest_status, run_blocking};

pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(fields): JsonBody<Fields>,
) -> Result<impl IntoResponse, ApiError> {
    let insert = InsertUser::from_fields(&fields)?;

    let (outcome, row) = run_blocking(&state, move |db| {
        let outcome = db.insert_user(&insert)?;
        let row = db
            .get_user_by_address(&insert.address)?
            .ok_or_else(|| anyhow!("user {} missing after insert", insert.address))?;
        Ok((outcome, row))
    })
    .await?;

    Ok((ingest_status(&outcome), Json(convert::user(row))))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<User>, ApiError> {
    let lookup = address.clone();
    let row = run_blocking(&state, move |db| db.get_user_by_address(&lookup))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user not found: {}", address)))?;

    Ok(Json(convert::user(row)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(address): Path<String>,
    JsonBody(fields): JsonBody<Fields>,
) -> Result<Json<User>, ApiError> {
    let update = UpdateUserProfile::from_fields(&fields)?;

    let lookup = address.clone();
    let row = run_blocking(&state, move |db| db.update_user_profile(&lookup, &update))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user not found: {}", address)))?;

    Ok(Json(convert::user(row)))
}
