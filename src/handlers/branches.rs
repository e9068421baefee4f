use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{common::error::AppError, config::AppState};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BranchPayload {
    #[validate(length(min = 1, message = "지점명을 입력해주세요"))]
    pub branch_name: String,

    #[validate(length(min = 2, message = "별칭은 2자 이상이어야 합니다"))]
    pub alias: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub directions: String,
}

// GET /api/branches
pub async fn list_branches(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let branches = app_state.branch_repo.get_all_branches().await?;
    Ok(Json(branches))
}

// GET /api/branches/options: slim rows for the header selector
pub async fn branch_options(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let options = app_state.branch_repo.get_branches_for_select().await?;
    Ok(Json(options))
}

// GET /api/branches/{seq}
pub async fn get_branch(
    State(app_state): State<AppState>,
    Path(seq): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let branch = app_state.branch_repo.get_branch_by_seq(seq).await?;
    Ok(Json(branch))
}

// POST /api/branches
pub async fn create_branch(
    State(app_state): State<AppState>,
    Json(payload): Json<BranchPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let seq = app_state
        .branch_repo
        .insert_branch(
            &payload.branch_name,
            &payload.alias,
            &payload.address,
            &payload.directions,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "seq": seq }))))
}

// PUT /api/branches/{seq}
pub async fn update_branch(
    State(app_state): State<AppState>,
    Path(seq): Path<i32>,
    Json(payload): Json<BranchPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state
        .branch_repo
        .update_branch(
            seq,
            &payload.branch_name,
            &payload.alias,
            &payload.address,
            &payload.directions,
        )
        .await?;

    Ok(Json(json!({ "message": "지점 정보가 수정되었습니다" })))
}

// DELETE /api/branches/{seq}
pub async fn delete_branch(
    State(app_state): State<AppState>,
    Path(seq): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.branch_repo.delete_branch(seq).await?;
    Ok(Json(json!({ "message": "지점이 삭제되었습니다" })))
}
