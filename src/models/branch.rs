use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub seq: i32,
    pub branch_name: String,
    /// URL-safe code used by public-facing flows; seq stays internal.
    pub alias: String,
    pub address: Option<String>,
    pub directions: Option<String>,
    pub created_date: DateTime<Utc>,
    pub last_update_date: DateTime<Utc>,
}

/// Slim row for the header branch selector.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BranchOption {
    pub seq: i32,
    pub alias: String,
    pub branch_name: String,
}
