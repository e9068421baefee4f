use serde::Serialize;
use sqlx::FromRow;

/// Per-branch binding of a default template + sender number to reservation
/// confirmation. At most one row per branch.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSmsConfig {
    pub seq: i32,
    pub branch_seq: i32,
    pub template_seq: i32,
    pub template_name: String,
    pub sender_number: String,
    pub auto_send: bool,
}
