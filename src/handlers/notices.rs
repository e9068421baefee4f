use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    common::{error::AppError, paging::Page},
    config::AppState,
    models::notice::category,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeListQuery {
    /// 0 = all branches.
    #[serde(default)]
    pub branch_seq: i32,
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

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NoticePayload {
    pub branch_seq: i32,

    #[validate(length(min = 1, message = "제목을 입력해주세요"))]
    pub title: String,

    #[validate(length(min = 1, message = "내용을 입력해주세요"))]
    pub content: String,

    pub category: String,

    #[serde(default)]
    pub is_pinned: bool,

    pub event_start_date: Option<NaiveDate>,
    pub event_end_date: Option<NaiveDate>,

    #[serde(default)]
    pub created_by: String,
}

fn validate_category(value: &str) -> Result<(), AppError> {
    if value != category::NOTICE && value != category::EVENT {
        return Err(AppError::BadRequest(format!(
            "알 수 없는 카테고리입니다: {}",
            value
        )));
    }
    Ok(())
}

// GET /api/notices
pub async fn list_notices(
    State(app_state): State<AppState>,
    Query(query): Query<NoticeListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = Page::new(query.page, query.per_page);

    let notices = app_state
        .notice_repo
        .get_notices(query.branch_seq, &query.category, &query.search_keyword, page)
        .await?;
    let total_count = app_state
        .notice_repo
        .get_notices_count(query.branch_seq, &query.category, &query.search_keyword)
        .await?;

    Ok(Json(json!({
        "notices": notices,
        "totalCount": total_count,
    })))
}

// GET /api/notices/{seq}: bumps the view counter as a non-critical side
// effect before loading the row
pub async fn get_notice(
    State(app_state): State<AppState>,
    Path(seq): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.notice_repo.increment_view_count(seq).await;
    let notice = app_state.notice_repo.get_notice_by_seq(seq).await?;
    Ok(Json(notice))
}

// POST /api/notices
pub async fn create_notice(
    State(app_state): State<AppState>,
    Json(payload): Json<NoticePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    validate_category(&payload.category)?;

    let seq = app_state
        .notice_repo
        .insert_notice(
            payload.branch_seq,
            &payload.title,
            &payload.content,
            &payload.category,
            payload.is_pinned,
            payload.event_start_date,
            payload.event_end_date,
            Some(payload.created_by.as_str()),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "seq": seq }))))
}

// PUT /api/notices/{seq}
pub async fn update_notice(
    State(app_state): State<AppState>,
    Path(seq): Path<i32>,
    Json(payload): Json<NoticePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    validate_category(&payload.category)?;

    app_state
        .notice_repo
        .update_notice(
            seq,
            &payload.title,
            &payload.content,
            &payload.category,
            payload.is_pinned,
            payload.event_start_date,
            payload.event_end_date,
        )
        .await?;

    Ok(Json(json!({ "message": "게시글이 수정되었습니다" })))
}

// DELETE /api/notices/{seq}: soft delete
pub async fn delete_notice(
    State(app_state): State<AppState>,
    Path(seq): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.notice_repo.delete_notice(seq).await?;
    Ok(Json(json!({ "message": "게시글이 삭제되었습니다" })))
}
