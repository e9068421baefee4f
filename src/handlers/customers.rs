use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    common::{error::AppError, paging::Page},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        customer::{ad_source, status},
        stats::CALLERS,
        template::{fill_placeholders, PlaceholderValues},
    },
    services::{calendar, sms},
};

const INTERVIEW_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Interview times arrive as KST wall-clock values.
const KST_OFFSET_HOURS: i64 = 9;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerListQuery {
    /// 0 = no branch selected, returns an empty page.
    #[serde(default)]
    pub branch_seq: i32,
    #[serde(default)]
    pub filter: String,
    #[serde(default)]
    pub search_type: String,
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
    20
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    pub branch_seq: Option<i32>,

    #[validate(length(min = 1, message = "이름을 입력해주세요"))]
    pub name: String,

    #[validate(length(min = 1, message = "전화번호를 입력해주세요"))]
    pub phone_number: String,

    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentPayload {
    pub customer_seq: i32,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNamePayload {
    pub customer_seq: i32,
    #[validate(length(min = 1, message = "이름을 입력해주세요"))]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusPayload {
    pub customer_seq: i32,
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessCallPayload {
    pub customer_seq: i32,
    pub branch_seq: i32,
    pub caller: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationPayload {
    pub branch_seq: i32,
    pub customer_seq: i32,
    pub caller: String,
    /// "YYYY-MM-DD HH:MM:SS", KST.
    pub interview_date: String,
}

// GET /api/customers
pub async fn list_customers(
    State(app_state): State<AppState>,
    Query(query): Query<CustomerListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = Page::new(query.page, query.per_page);

    let customers = app_state
        .customer_repo
        .get_customers_by_branch(
            query.branch_seq,
            &query.filter,
            &query.search_type,
            &query.search_keyword,
            page,
        )
        .await?;
    let total_count = app_state
        .customer_repo
        .get_customers_count_by_branch(
            query.branch_seq,
            &query.filter,
            &query.search_type,
            &query.search_keyword,
        )
        .await?;

    Ok(Json(json!({
        "customers": customers,
        "totalCount": total_count,
    })))
}

// POST /api/customers
pub async fn create_customer(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let seq = app_state
        .customer_repo
        .create_customer(
            payload.branch_seq,
            &payload.name,
            &payload.phone_number,
            &payload.comment,
            ad_source::WALK_IN,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "seq": seq }))))
}

// PATCH /api/customers/comment
pub async fn update_comment(
    State(app_state): State<AppState>,
    Json(payload): Json<UpdateCommentPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .customer_repo
        .update_comment(payload.customer_seq, &payload.comment)
        .await?;
    Ok(Json(json!({ "message": "코멘트가 저장되었습니다" })))
}

// PATCH /api/customers/name
pub async fn update_name(
    State(app_state): State<AppState>,
    Json(payload): Json<UpdateNamePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state
        .customer_repo
        .update_name(payload.customer_seq, &payload.name)
        .await?;
    Ok(Json(json!({ "message": "이름이 수정되었습니다" })))
}

// PATCH /api/customers/status
pub async fn update_status(
    State(app_state): State<AppState>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let known = [
        status::NEW,
        status::IN_PROGRESS,
        status::CONFIRMED,
        status::REFUSED,
        status::CALL_LIMIT,
    ];
    if !known.contains(&payload.status.as_str()) {
        return Err(AppError::BadRequest(format!(
            "알 수 없는 상태값입니다: {}",
            payload.status
        )));
    }

    app_state
        .customer_repo
        .update_status(payload.customer_seq, &payload.status)
        .await?;
    Ok(Json(json!({ "message": "상태가 변경되었습니다" })))
}

// POST /api/customers/process-call: caller selection + call counter bump
pub async fn process_call(
    State(app_state): State<AppState>,
    Json(payload): Json<ProcessCallPayload>,
) -> Result<impl IntoResponse, AppError> {
    if !CALLERS.contains(&payload.caller.as_str()) {
        return Err(AppError::BadRequest(format!(
            "유효하지 않은 CALLER 값입니다: {}",
            payload.caller
        )));
    }

    let result = app_state
        .customer_repo
        .process_call(payload.customer_seq, payload.branch_seq, &payload.caller)
        .await?;
    Ok(Json(result))
}

// DELETE /api/customers/{seq}
pub async fn delete_customer(
    State(app_state): State<AppState>,
    Path(seq): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.customer_repo.delete_customer_by_seq(seq).await?;
    Ok(Json(json!({ "message": "고객이 삭제되었습니다" })))
}

// POST /api/customers/reservation
//
// Creates the reservation, then best-effort side effects: a Google
// Calendar link in the response and, when the branch opted in, a
// confirmation message to the customer. Side-effect failures are logged
// and never fail the reservation.
pub async fn create_reservation(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateReservationPayload>,
) -> Result<impl IntoResponse, AppError> {
    if !CALLERS.contains(&payload.caller.as_str()) {
        return Err(AppError::BadRequest(format!(
            "유효하지 않은 CALLER 값입니다: {}",
            payload.caller
        )));
    }

    let interview_kst = NaiveDateTime::parse_from_str(&payload.interview_date, INTERVIEW_DATE_FORMAT)
        .map_err(|_| AppError::BadRequest("날짜 형식이 올바르지 않습니다.".to_string()))?;
    let interview_utc = Utc.from_utc_datetime(&(interview_kst - chrono::Duration::hours(KST_OFFSET_HOURS)));

    let reservation_seq = app_state
        .reservation_repo
        .create_reservation(
            payload.branch_seq,
            payload.customer_seq,
            user.seq,
            &payload.caller,
            interview_utc,
        )
        .await?;

    let customer = app_state
        .customer_repo
        .get_customer_detail(payload.customer_seq)
        .await?;

    let branch_alias = match app_state.branch_repo.get_branch_by_seq(payload.branch_seq).await {
        Ok(branch) => Some(branch.alias),
        Err(e) => {
            tracing::error!("지점 조회 실패 - seq: {}: {}", payload.branch_seq, e);
            None
        }
    };

    let calendar_req = calendar::CalendarEventRequest {
        customer_name: customer.name.clone(),
        phone_number: customer.phone_number.clone(),
        interview_date: interview_kst,
        duration_minutes: 0,
        caller: Some(payload.caller.clone()),
        call_count: customer.call_count,
        commercial_name: customer.commercial_name.clone(),
        ad_source: customer.ad_source.clone(),
        comment: customer.comment.clone(),
        branch_alias,
    };
    let calendar_link = match calendar::build_event_link(&calendar_req) {
        Ok(link) => {
            tracing::info!("캘린더 이벤트 링크 생성 완료");
            Some(link)
        }
        Err(e) => {
            tracing::error!("캘린더 이벤트 링크 생성 실패: {}", e);
            None
        }
    };

    if let Err(e) = send_reservation_sms(
        &app_state,
        payload.branch_seq,
        &customer.name,
        &customer.phone_number,
        interview_kst,
    )
    .await
    {
        tracing::error!("예약 확인 메시지 발송 실패: {}", e);
    }

    let mut response = json!({
        "reservationId": reservation_seq,
        "message": "예약이 생성되었습니다",
    });
    if let Some(link) = calendar_link {
        response["calendarLink"] = json!(link);
        response["message"] = json!("예약이 생성되고 구글 캘린더 링크가 준비되었습니다");
    }

    Ok((StatusCode::CREATED, Json(response)))
}

/// Sends the templated confirmation message when the branch enabled
/// auto-send and has a working gateway account.
async fn send_reservation_sms(
    app_state: &AppState,
    branch_seq: i32,
    customer_name: &str,
    phone_number: &str,
    interview_kst: NaiveDateTime,
) -> Result<(), AppError> {
    let Some(config) = app_state.reservation_repo.get_sms_config(branch_seq).await? else {
        return Ok(());
    };
    if !config.auto_send {
        return Ok(());
    }

    let template = app_state
        .template_repo
        .get_template_by_seq(config.template_seq)
        .await?;
    let Some(body) = template.message_context.filter(|b| !b.is_empty()) else {
        tracing::info!("자동 발송 템플릿 본문이 비어 있어 발송 생략 - 지점: {}", branch_seq);
        return Ok(());
    };

    let Some(gateway) = app_state.sms_repo.get_config(branch_seq).await? else {
        tracing::info!("SMS 연동 미설정으로 자동 발송 생략 - 지점: {}", branch_seq);
        return Ok(());
    };
    if !gateway.is_active {
        return Ok(());
    }

    let branch = app_state.branch_repo.get_branch_by_seq(branch_seq).await?;
    let date = interview_kst.format("%Y-%m-%d").to_string();
    let time = interview_kst.format("%H:%M").to_string();
    let message = fill_placeholders(
        &body,
        &PlaceholderValues {
            name: customer_name,
            date: &date,
            time: &time,
            branch_name: &branch.branch_name,
            phone_number,
        },
    );

    let sender = if config.sender_number.is_empty() {
        gateway.callback_number.clone().unwrap_or_default()
    } else {
        config.sender_number.clone()
    };

    let response = app_state
        .sms_service
        .send(sms::SendRequest {
            account_id: gateway.account_id.clone(),
            password: gateway.password.clone(),
            sender_phone: sender,
            receiver_phone: phone_number.to_string(),
            message,
            subject: Some("예약 안내".to_string()),
        })
        .await?;

    if response.success {
        app_state
            .sms_service
            .record_remaining(branch_seq, classify_kind(response.msg_type), &response.remaining)
            .await;
        tracing::info!("예약 확인 메시지 발송 완료 - 지점: {}", branch_seq);
    } else {
        tracing::error!("예약 확인 메시지 발송 실패 - 코드: {}", response.code);
    }
    Ok(())
}

fn classify_kind(msg_type: &str) -> sms::MessageKind {
    if msg_type == "LMS" {
        sms::MessageKind::Lms
    } else {
        sms::MessageKind::Sms
    }
}
