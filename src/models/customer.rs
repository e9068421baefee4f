use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Customer lifecycle states. Stored as plain text in the legacy schema, so
/// these are constants rather than a database enum.
pub mod status {
    pub const NEW: &str = "신규";
    pub const IN_PROGRESS: &str = "진행중";
    pub const CONFIRMED: &str = "예약확정";
    pub const REFUSED: &str = "전화상거절";
    pub const CALL_LIMIT: &str = "콜수초과";
}

/// Acquisition sources worth naming in code; anything else is free text.
pub mod ad_source {
    pub const WALK_IN: &str = "walk_in";
    pub const KAKAO: &str = "카카오";
    pub const CONSULTATION: &str = "상담신청";
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub seq: i32,
    pub branch_seq: Option<i32>,
    pub name: String,
    pub phone_number: String,
    pub comment: Option<String>,
    pub commercial_name: Option<String>,
    pub ad_source: Option<String>,
    pub call_count: i32,
    pub status: String,
    pub kakao_id: Option<i64>,
    pub created_date: DateTime<Utc>,
    pub last_update_date: Option<DateTime<Utc>>,
}

/// Customer as seen from the public portal (Kakao login / mypage).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct KakaoCustomer {
    pub seq: i32,
    pub branch_seq: Option<i32>,
    pub branch_name: Option<String>,
    pub name: String,
    pub phone_number: String,
    pub kakao_id: Option<i64>,
    pub created_date: DateTime<Utc>,
}

/// Result of a caller-selection call: the post-increment counter and the
/// contact timestamp the UI shows next to it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallResult {
    pub call_count: i32,
    pub last_update_date: DateTime<Utc>,
}

/// Phone numbers are stored digits-only; formatting is a presentation concern.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::normalize_phone;

    #[test]
    fn strips_separators_from_phone_numbers() {
        assert_eq!(normalize_phone("010-1234-5678"), "01012345678");
        assert_eq!(normalize_phone("+82 10 1234 5678"), "821012345678");
    }

    #[test]
    fn plain_digits_pass_through() {
        assert_eq!(normalize_phone("01012345678"), "01012345678");
    }

    #[test]
    fn non_digits_only_yields_empty() {
        assert_eq!(normalize_phone("unknown"), "");
    }
}
