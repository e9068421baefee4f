use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use serde::Deserialize;
use serde_json::json;

use crate::{
    common::error::AppError,
    config::AppState,
    models::customer::ad_source,
    services::kakao::{source, OAuthState},
};

const LANDING_CALLBACK_PATH: &str = "/ad/kakao/callback";

#[derive(Debug, Deserialize)]
pub struct KakaoLoginQuery {
    /// Branch seq as a string; absent means the Kakao default branch.
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KakaoCallbackQuery {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
}

/// Query contract fixed by the external ad platform; `reading` is the ad
/// name and `writing` the platform name.
#[derive(Debug, Deserialize)]
pub struct ExternalCustomerQuery {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub reading: String,
    #[serde(default)]
    pub writing: String,
}

// GET /ad/kakao/login
pub async fn kakao_login(
    State(app_state): State<AppState>,
    Query(query): Query<KakaoLoginQuery>,
) -> Result<impl IntoResponse, AppError> {
    let state = OAuthState::new(source::LANDING, query.branch.as_deref()).encode()?;
    let redirect_uri = app_state.kakao_service.redirect_uri_for(LANDING_CALLBACK_PATH);
    let auth_url = app_state
        .kakao_service
        .authorize_url(&redirect_uri, &state, "name,phone_number")?;
    Ok(Redirect::to(&auth_url))
}

// GET /ad/kakao/callback: errors redirect to /ad/error, the landing page
// never sees a raw failure
pub async fn kakao_callback(
    State(app_state): State<AppState>,
    Query(query): Query<KakaoCallbackQuery>,
) -> impl IntoResponse {
    match handle_landing_callback(&app_state, &query).await {
        Ok(customer_name) => {
            let encoded = URL_SAFE.encode(customer_name.as_bytes());
            Redirect::to(&format!("/ad/success?data={}", encoded))
        }
        Err(e) => {
            tracing::error!("카카오 랜딩 콜백 처리 실패: {}", e);
            Redirect::to("/ad/error")
        }
    }
}

async fn handle_landing_callback(
    app_state: &AppState,
    query: &KakaoCallbackQuery,
) -> Result<String, AppError> {
    if query.code.is_empty() || query.state.is_empty() {
        return Err(AppError::KakaoError("code 또는 state 누락".to_string()));
    }

    let state = OAuthState::decode(&query.state)?;
    state.validate(source::LANDING, chrono::Utc::now().timestamp())?;

    let redirect_uri = app_state.kakao_service.redirect_uri_for(LANDING_CALLBACK_PATH);
    let token = app_state
        .kakao_service
        .get_token(&query.code, &redirect_uri)
        .await?;
    let user_info = app_state
        .kakao_service
        .get_user_info(&token.access_token)
        .await?;

    let customer_name = user_info.display_name();
    let seq = app_state
        .customer_repo
        .upsert_kakao_customer(
            state.branch_seq_or_default(),
            user_info.id,
            &customer_name,
            &user_info.kakao_account.phone_number,
        )
        .await?;

    tracing::info!("카카오 랜딩 고객 등록 완료 - seq: {}, 이름: {}", seq, customer_name);
    Ok(customer_name)
}

// GET /ad/success?data=base64(name)
pub async fn kakao_success(Query(query): Query<SuccessQuery>) -> impl IntoResponse {
    let name = URL_SAFE
        .decode(&query.data)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_default();
    Json(json!({
        "message": "카카오 인증이 완료되었습니다",
        "name": name,
    }))
}

// GET /ad/error
pub async fn kakao_error() -> impl IntoResponse {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "error": "카카오 인증에 실패했습니다. 다시 시도해주세요." })),
    )
}

// POST /consultation/submit: consultation customers start unassigned;
// an admin routes them to a branch later
pub async fn submit_consultation(
    State(app_state): State<AppState>,
    Json(payload): Json<ConsultationPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("이름을 입력해주세요.".to_string()));
    }
    let phone = payload.phone_number.trim();
    if !is_valid_phone(phone) {
        return Err(AppError::BadRequest(
            "올바른 전화번호 형식이 아닙니다.".to_string(),
        ));
    }

    let seq = app_state
        .customer_repo
        .create_customer(None, payload.name.trim(), phone, "", ad_source::CONSULTATION)
        .await?;

    tracing::info!("상담 신청 완료 - seq: {}, 이름: {}", seq, payload.name.trim());
    Ok((
        StatusCode::CREATED,
        Json(json!({ "seq": seq, "message": "상담 신청이 접수되었습니다" })),
    ))
}

// GET /api/external/customers: ad-platform callback; GET with query
// params is the contract the platform ships with
pub async fn register_external_customer(
    State(app_state): State<AppState>,
    Query(query): Query<ExternalCustomerQuery>,
) -> Result<impl IntoResponse, AppError> {
    if query.name.is_empty() || query.phone.is_empty() {
        return Err(AppError::BadRequest(
            "이름과 전화번호는 필수입니다.".to_string(),
        ));
    }

    let branch_seq = app_state
        .branch_repo
        .get_branch_seq_by_alias(&query.location)
        .await
        .map_err(|_| AppError::BadRequest("해당 위치의 지점을 찾을 수 없습니다.".to_string()))?;

    let seq = app_state
        .customer_repo
        .insert_external_customer(
            branch_seq,
            &query.name,
            &query.phone,
            &query.job,
            &query.writing,
            &query.reading,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "seq": seq }))))
}

/// Digits and hyphens only, 10 or 11 digits once hyphens are stripped.
fn is_valid_phone(phone: &str) -> bool {
    if phone.is_empty() || !phone.chars().all(|c| c.is_ascii_digit() || c == '-') {
        return false;
    }
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    (10..=11).contains(&digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_hyphenated_numbers() {
        assert!(is_valid_phone("01012345678"));
        assert!(is_valid_phone("010-1234-5678"));
        assert!(is_valid_phone("02-1234-5678"));
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(!is_valid_phone(""));
        assert!(!is_valid_phone("010 1234 5678"));
        assert!(!is_valid_phone("0101234"));
        assert!(!is_valid_phone("010123456789"));
    }
}
