use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Staff account for the admin surface.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub seq: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub branch_seq: Option<i32>,
    pub created_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User seq.
    pub sub: i32,
    pub username: String,
    pub branch_seq: Option<i32>,
    pub exp: i64,
}
