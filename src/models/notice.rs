use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

pub mod category {
    pub const NOTICE: &str = "공지사항";
    pub const EVENT: &str = "이벤트";
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub seq: i32,
    pub branch_seq: i32,
    pub branch_name: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub is_pinned: bool,
    pub is_active: bool,
    pub view_count: i32,
    pub event_start_date: Option<NaiveDate>,
    pub event_end_date: Option<NaiveDate>,
    pub created_by: Option<String>,
    pub created_date: DateTime<Utc>,
    pub last_update_date: Option<DateTime<Utc>>,
}
