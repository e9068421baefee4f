use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MessageTemplate {
    pub seq: i32,
    pub branch_seq: i32,
    pub template_name: String,
    pub message_context: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub is_default: bool,
    pub created_date: DateTime<Utc>,
    pub last_update_date: DateTime<Utc>,
}

/// Substitution context for the reservation-confirmation message.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderValues<'a> {
    pub name: &'a str,
    pub date: &'a str,
    pub time: &'a str,
    pub branch_name: &'a str,
    pub phone_number: &'a str,
}

/// Replaces the named placeholders in a template body. Unknown
/// placeholders are left as-is.
pub fn fill_placeholders(template: &str, values: &PlaceholderValues) -> String {
    template
        .replace("{이름}", values.name)
        .replace("{날짜}", values.date)
        .replace("{시간}", values.time)
        .replace("{지점명}", values.branch_name)
        .replace("{전화번호}", values.phone_number)
}

/// Catalogue entry for the named placeholders templates may contain
/// (`{이름}`, `{날짜}`, ...). Read-only reference data for the editor.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    pub name: String,
    pub value: String,
    pub comment: Option<String>,
    pub examples: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_known_placeholders() {
        let values = PlaceholderValues {
            name: "김미영",
            date: "2026-03-02",
            time: "14:00",
            branch_name: "강남점",
            phone_number: "01012345678",
        };
        let rendered = fill_placeholders("{이름}님, {날짜} {시간} {지점명} 예약 안내드립니다.", &values);
        assert_eq!(rendered, "김미영님, 2026-03-02 14:00 강남점 예약 안내드립니다.");
    }

    #[test]
    fn unknown_placeholders_survive() {
        let values = PlaceholderValues::default();
        assert_eq!(fill_placeholders("{담당자} 확인", &values), "{담당자} 확인");
    }
}
