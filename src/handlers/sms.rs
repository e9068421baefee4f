use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    services::sms::{MessageKind, SendRequest},
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendSmsPayload {
    pub branch_seq: i32,

    #[validate(length(min = 1, message = "수신번호를 입력해주세요"))]
    pub receiver_phone: String,

    #[validate(length(min = 1, message = "메시지를 입력해주세요"))]
    pub message: String,

    pub subject: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveSmsConfigPayload {
    pub branch_seq: i32,

    #[validate(length(min = 1, message = "계정 아이디를 입력해주세요"))]
    pub account_id: String,

    #[validate(length(min = 1, message = "비밀번호를 입력해주세요"))]
    pub password: String,

    #[serde(default)]
    pub callback_number: String,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsConfigQuery {
    pub branch_seq: i32,
}

// POST /api/sms/send
pub async fn send_sms(
    State(app_state): State<AppState>,
    Json(payload): Json<SendSmsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let Some(config) = app_state.sms_repo.get_config(payload.branch_seq).await? else {
        return Err(AppError::BadRequest(
            "SMS 연동이 설정되지 않았습니다.".to_string(),
        ));
    };
    if !config.is_active {
        return Err(AppError::BadRequest(
            "SMS 연동이 비활성화 상태입니다.".to_string(),
        ));
    }

    let response = app_state
        .sms_service
        .send(SendRequest {
            account_id: config.account_id,
            password: config.password,
            sender_phone: config.callback_number.unwrap_or_default(),
            receiver_phone: payload.receiver_phone,
            message: payload.message,
            subject: payload.subject,
        })
        .await?;

    if response.success {
        let kind = if response.msg_type == "LMS" {
            MessageKind::Lms
        } else {
            MessageKind::Sms
        };
        app_state
            .sms_service
            .record_remaining(payload.branch_seq, kind, &response.remaining)
            .await;
    }

    Ok(Json(response))
}

// GET /api/sms/config?branchSeq=: password never serialized
pub async fn get_sms_config(
    State(app_state): State<AppState>,
    Query(query): Query<SmsConfigQuery>,
) -> Result<impl IntoResponse, AppError> {
    let config = app_state.sms_repo.get_config(query.branch_seq).await?;
    Ok(Json(config))
}

// POST /api/sms/config: saves the account, then refreshes the remaining
// counts as a best-effort credential check
pub async fn save_sms_config(
    State(app_state): State<AppState>,
    Json(payload): Json<SaveSmsConfigPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let callback = if payload.callback_number.is_empty() {
        None
    } else {
        Some(payload.callback_number.as_str())
    };
    app_state
        .sms_repo
        .save_config(
            payload.branch_seq,
            &payload.account_id,
            &payload.password,
            callback,
            payload.is_active,
        )
        .await?;

    match app_state
        .sms_service
        .check_remaining(&payload.account_id, &payload.password)
        .await
    {
        Ok((sms_count, lms_count)) => {
            app_state
                .sms_service
                .record_remaining(payload.branch_seq, MessageKind::Sms, &sms_count.to_string())
                .await;
            app_state
                .sms_service
                .record_remaining(payload.branch_seq, MessageKind::Lms, &lms_count.to_string())
                .await;
        }
        Err(e) => tracing::error!("잔여건수 조회 실패 (설정은 저장됨): {}", e),
    }

    Ok(Json(json!({ "message": "SMS 설정이 저장되었습니다" })))
}

// GET /api/sms/remaining?branchSeq=
pub async fn check_remaining(
    State(app_state): State<AppState>,
    Query(query): Query<SmsConfigQuery>,
) -> Result<impl IntoResponse, AppError> {
    let Some(config) = app_state.sms_repo.get_config(query.branch_seq).await? else {
        return Err(AppError::BadRequest(
            "SMS 연동이 설정되지 않았습니다.".to_string(),
        ));
    };

    let (sms_count, lms_count) = app_state
        .sms_service
        .check_remaining(&config.account_id, &config.password)
        .await?;

    app_state
        .sms_service
        .record_remaining(query.branch_seq, MessageKind::Sms, &sms_count.to_string())
        .await;
    app_state
        .sms_service
        .record_remaining(query.branch_seq, MessageKind::Lms, &lms_count.to_string())
        .await;

    Ok(Json(json!({ "sms": sms_count, "lms": lms_count })))
}
