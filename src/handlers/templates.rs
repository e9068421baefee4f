use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{common::error::AppError, config::AppState};

/// Template endpoints are keyed by branch alias, the external lookup key;
/// the alias is resolved to the internal seq up front.
#[derive(Debug, Deserialize)]
pub struct BranchAliasQuery {
    pub branch: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePayload {
    pub branch: String,

    #[validate(length(min = 1, message = "템플릿 이름을 입력해주세요"))]
    pub template_name: String,

    #[serde(default)]
    pub message_context: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSmsConfigPayload {
    pub branch: String,
    pub template_seq: i32,
    #[serde(default)]
    pub sender_number: String,
    #[serde(default)]
    pub auto_send: bool,
}

// GET /api/message-templates?branch=alias
pub async fn list_templates(
    State(app_state): State<AppState>,
    Query(query): Query<BranchAliasQuery>,
) -> Result<impl IntoResponse, AppError> {
    let branch_seq = app_state
        .branch_repo
        .get_branch_seq_by_alias(&query.branch)
        .await?;
    let templates = app_state
        .template_repo
        .get_templates_by_branch(branch_seq)
        .await?;
    Ok(Json(templates))
}

// POST /api/message-templates
pub async fn create_template(
    State(app_state): State<AppState>,
    Json(payload): Json<TemplatePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let branch_seq = app_state
        .branch_repo
        .get_branch_seq_by_alias(&payload.branch)
        .await?;
    let seq = app_state
        .template_repo
        .save_template(
            branch_seq,
            &payload.template_name,
            &payload.message_context,
            &payload.description,
            payload.is_active,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "seq": seq }))))
}

// PUT /api/message-templates/{seq}
pub async fn update_template(
    State(app_state): State<AppState>,
    Path(seq): Path<i32>,
    Json(payload): Json<TemplatePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let branch_seq = app_state
        .branch_repo
        .get_branch_seq_by_alias(&payload.branch)
        .await?;
    app_state
        .template_repo
        .update_template(
            branch_seq,
            seq,
            &payload.template_name,
            &payload.message_context,
            &payload.description,
            payload.is_active,
        )
        .await?;

    Ok(Json(json!({ "message": "템플릿이 수정되었습니다" })))
}

// DELETE /api/message-templates/{seq}?branch=alias
pub async fn delete_template(
    State(app_state): State<AppState>,
    Path(seq): Path<i32>,
    Query(query): Query<BranchAliasQuery>,
) -> Result<impl IntoResponse, AppError> {
    let branch_seq = app_state
        .branch_repo
        .get_branch_seq_by_alias(&query.branch)
        .await?;
    app_state.template_repo.delete_template(branch_seq, seq).await?;
    Ok(Json(json!({ "message": "템플릿이 삭제되었습니다" })))
}

// POST /api/message-templates/{seq}/set-default?branch=alias
pub async fn set_default_template(
    State(app_state): State<AppState>,
    Path(seq): Path<i32>,
    Query(query): Query<BranchAliasQuery>,
) -> Result<impl IntoResponse, AppError> {
    let branch_seq = app_state
        .branch_repo
        .get_branch_seq_by_alias(&query.branch)
        .await?;
    app_state
        .template_repo
        .set_default_template(branch_seq, seq)
        .await?;
    Ok(Json(json!({ "message": "기본 템플릿이 설정되었습니다" })))
}

// GET /api/placeholders
pub async fn list_placeholders(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let placeholders = app_state.template_repo.get_placeholders().await?;
    Ok(Json(placeholders))
}

// GET /api/reservation-sms-config?branch=alias
pub async fn get_reservation_sms_config(
    State(app_state): State<AppState>,
    Query(query): Query<BranchAliasQuery>,
) -> Result<impl IntoResponse, AppError> {
    let branch_seq = app_state
        .branch_repo
        .get_branch_seq_by_alias(&query.branch)
        .await?;
    let config = app_state.reservation_repo.get_sms_config(branch_seq).await?;
    Ok(Json(config))
}

// POST /api/reservation-sms-config
pub async fn save_reservation_sms_config(
    State(app_state): State<AppState>,
    Json(payload): Json<ReservationSmsConfigPayload>,
) -> Result<impl IntoResponse, AppError> {
    let branch_seq = app_state
        .branch_repo
        .get_branch_seq_by_alias(&payload.branch)
        .await?;
    app_state
        .reservation_repo
        .save_sms_config(
            branch_seq,
            payload.template_seq,
            &payload.sender_number,
            payload.auto_send,
        )
        .await?;
    Ok(Json(json!({ "message": "예약 SMS 설정이 저장되었습니다" })))
}
