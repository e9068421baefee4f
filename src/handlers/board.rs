use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    common::{error::AppError, paging::Page},
    config::AppState,
    services::kakao::{source, OAuthState},
};

const BOARD_CALLBACK_PATH: &str = "/board/kakao/callback";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardListQuery {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub search_keyword: String,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct KakaoLoginQuery {
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KakaoCallbackQuery {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
}

// GET /board/notices: public listing across all branches
pub async fn list_notices(
    State(app_state): State<AppState>,
    Query(query): Query<BoardListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = Page::new(query.page, query.per_page);

    let notices = app_state
        .notice_repo
        .get_notices(0, &query.category, &query.search_keyword, page)
        .await?;
    let total_count = app_state
        .notice_repo
        .get_notices_count(0, &query.category, &query.search_keyword)
        .await?;

    Ok(Json(json!({
        "notices": notices,
        "totalCount": total_count,
    })))
}

// GET /board/notices/{seq}
pub async fn get_notice(
    State(app_state): State<AppState>,
    Path(seq): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.notice_repo.increment_view_count(seq).await;
    let notice = app_state.notice_repo.get_notice_by_seq(seq).await?;
    Ok(Json(notice))
}

// GET /board/kakao/login
pub async fn kakao_login(
    State(app_state): State<AppState>,
    Query(query): Query<KakaoLoginQuery>,
) -> Result<impl IntoResponse, AppError> {
    let state = OAuthState::new(source::BOARD, query.branch.as_deref()).encode()?;
    let redirect_uri = app_state.kakao_service.redirect_uri_for(BOARD_CALLBACK_PATH);
    let auth_url = app_state
        .kakao_service
        .authorize_url(&redirect_uri, &state, "profile_nickname")?;
    Ok(Redirect::to(&auth_url))
}

// GET /board/kakao/callback
pub async fn kakao_callback(
    State(app_state): State<AppState>,
    Query(query): Query<KakaoCallbackQuery>,
) -> Result<impl IntoResponse, AppError> {
    if query.code.is_empty() || query.state.is_empty() {
        return Err(AppError::KakaoError("code 또는 state 누락".to_string()));
    }

    let state = OAuthState::decode(&query.state)?;
    state.validate(source::BOARD, chrono::Utc::now().timestamp())?;

    let redirect_uri = app_state.kakao_service.redirect_uri_for(BOARD_CALLBACK_PATH);
    let token = app_state
        .kakao_service
        .get_token(&query.code, &redirect_uri)
        .await?;
    let user_info = app_state
        .kakao_service
        .get_user_info(&token.access_token)
        .await?;

    let member_name = user_info.display_name();
    let member_seq = app_state
        .customer_repo
        .upsert_kakao_customer(
            state.branch_seq_or_default(),
            user_info.id,
            &member_name,
            &user_info.kakao_account.phone_number,
        )
        .await?;

    tracing::info!("카카오 회원 로그인 성공 - seq: {}, 이름: {}", member_seq, member_name);
    Ok(Json(json!({
        "memberSeq": member_seq,
        "name": member_name,
    })))
}

// GET /board/mypage/{seq}
pub async fn mypage(
    State(app_state): State<AppState>,
    Path(seq): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let member = app_state.customer_repo.get_customer_by_seq(seq).await?;
    Ok(Json(member))
}

// DELETE /board/withdraw/{seq}: membership withdrawal removes the
// customer row; reservations survive with a detached customer
pub async fn withdraw(
    State(app_state): State<AppState>,
    Path(seq): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.customer_repo.get_customer_by_seq(seq).await?;
    app_state.customer_repo.delete_customer_by_seq(seq).await?;

    tracing::info!("회원 탈퇴 완료 - seq: {}", seq);
    Ok(Json(json!({ "message": "회원 탈퇴가 완료되었습니다" })))
}
