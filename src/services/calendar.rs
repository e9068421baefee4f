use chrono::{Duration, NaiveDateTime, Utc};

use crate::common::error::AppError;

const RENDER_URL: &str = "https://calendar.google.com/calendar/render";
const DEFAULT_DURATION_MINUTES: i64 = 60;
/// Interview times are Asia/Seoul wall-clock values.
const KST_OFFSET_HOURS: i64 = 9;

/// Input for a Google Calendar "add event" link. No authenticated API
/// call is made, the link opens a prefilled event form.
#[derive(Debug, Clone)]
pub struct CalendarEventRequest {
    pub customer_name: String,
    pub phone_number: String,
    /// KST wall-clock time.
    pub interview_date: NaiveDateTime,
    /// 0 means the 60-minute default.
    pub duration_minutes: i64,
    pub caller: Option<String>,
    pub call_count: i32,
    pub commercial_name: Option<String>,
    pub ad_source: Option<String>,
    pub comment: Option<String>,
    pub branch_alias: Option<String>,
}

pub fn build_event_link(req: &CalendarEventRequest) -> Result<String, AppError> {
    let today_kst = Utc::now() + Duration::hours(KST_OFFSET_HOURS);
    render(req, &today_kst.format("%d").to_string())
}

fn render(req: &CalendarEventRequest, reservation_day: &str) -> Result<String, AppError> {
    if req.customer_name.is_empty() {
        return Err(AppError::BadRequest("고객 이름이 비어있습니다.".to_string()));
    }
    if req.phone_number.is_empty() {
        return Err(AppError::BadRequest("전화번호가 비어있습니다.".to_string()));
    }
    if req.duration_minutes < 0 {
        return Err(AppError::BadRequest(
            "소요시간은 0보다 커야 합니다.".to_string(),
        ));
    }

    let duration = if req.duration_minutes == 0 {
        DEFAULT_DURATION_MINUTES
    } else {
        req.duration_minutes
    };

    // KST wall time to UTC instants for the dates= parameter.
    let start_utc = req.interview_date - Duration::hours(KST_OFFSET_HOURS);
    let end_utc = start_utc + Duration::minutes(duration);
    let dates = format!(
        "{}/{}",
        start_utc.format("%Y%m%dT%H%M%SZ"),
        end_utc.format("%Y%m%dT%H%M%SZ")
    );

    // (일 참석) CALLER+통화횟수 고객명 전화번호
    let caller_info = match req.caller.as_deref() {
        Some(c) if !c.is_empty() => format!("{}{}", c, req.call_count),
        _ => String::new(),
    };
    let title = format!(
        "({} 참석) {} {} {}",
        reservation_day, caller_info, req.customer_name, req.phone_number
    );

    let mut description = String::new();
    if let Some(name) = req.commercial_name.as_deref().filter(|s| !s.is_empty()) {
        description.push_str(&format!("광고명: {}", name));
    }
    if let Some(source) = req.ad_source.as_deref().filter(|s| !s.is_empty()) {
        if !description.is_empty() {
            description.push('\n');
        }
        description.push_str(&format!("광고 출처: {}", source));
    }
    if let Some(comment) = req.comment.as_deref().filter(|s| !s.is_empty()) {
        if !description.is_empty() {
            description.push_str("\n\n");
        }
        description.push_str(comment);
    }

    let url = reqwest::Url::parse_with_params(
        RENDER_URL,
        &[
            ("action", "TEMPLATE"),
            ("text", title.as_str()),
            ("dates", dates.as_str()),
            ("details", description.as_str()),
            ("location", req.branch_alias.as_deref().unwrap_or("")),
        ],
    )
    .map_err(|e| AppError::BadRequest(format!("캘린더 URL 생성 실패: {}", e)))?;

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request() -> CalendarEventRequest {
        CalendarEventRequest {
            customer_name: "김미영".to_string(),
            phone_number: "01099321967".to_string(),
            interview_date: NaiveDate::from_ymd_opt(2026, 3, 2)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap(),
            duration_minutes: 0,
            caller: Some("H".to_string()),
            call_count: 1,
            commercial_name: Some("봄 이벤트".to_string()),
            ad_source: Some("카카오".to_string()),
            comment: Some("재방문 고객".to_string()),
            branch_alias: Some("gangnam".to_string()),
        }
    }

    #[test]
    fn converts_kst_to_utc_with_default_duration() {
        let link = render(&request(), "02").unwrap();
        // 14:00 KST = 05:00 UTC, 60분 기본
        assert!(link.contains("dates=20260302T050000Z%2F20260302T060000Z"));
    }

    #[test]
    fn explicit_duration_moves_end_time() {
        let mut req = request();
        req.duration_minutes = 90;
        let link = render(&req, "02").unwrap();
        assert!(link.contains("20260302T063000Z"));
    }

    #[test]
    fn title_includes_caller_and_day() {
        let link = render(&request(), "02").unwrap();
        assert!(link.contains("text=%2802+%EC%B0%B8%EC%84%9D%29+H1+"));
    }

    #[test]
    fn caller_is_omitted_when_absent() {
        let mut req = request();
        req.caller = None;
        let link = render(&req, "02").unwrap();
        assert!(!link.contains("H1"));
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut req = request();
        req.customer_name.clear();
        assert!(render(&req, "02").is_err());
    }

    #[test]
    fn location_carries_branch_alias() {
        let link = render(&request(), "02").unwrap();
        assert!(link.contains("location=gangnam"));
    }
}
