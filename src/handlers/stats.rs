use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{common::error::AppError, config::AppState, models::stats::Period};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatsQuery {
    /// 0 aggregates across all branches.
    #[serde(default)]
    pub branch_seq: i32,
    #[serde(default = "default_days")]
    pub days: i32,
}

fn default_days() -> i32 {
    7
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerStatsQuery {
    #[serde(default)]
    pub branch_seq: i32,
    #[serde(default)]
    pub period: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayStatsQuery {
    #[serde(default)]
    pub branch_seq: i32,
}

// GET /api/stats/daily
pub async fn daily_stats(
    State(app_state): State<AppState>,
    Query(query): Query<DailyStatsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let days = query.days.clamp(1, 90);
    let stats = app_state
        .stats_repo
        .get_daily_customer_stats(query.branch_seq, days)
        .await?;
    Ok(Json(stats))
}

// GET /api/stats/callers: one row per caller slot A-P, zero activity included
pub async fn caller_stats(
    State(app_state): State<AppState>,
    Query(query): Query<CallerStatsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let period = Period::parse(&query.period);
    let stats = app_state
        .stats_repo
        .get_caller_stats(query.branch_seq, period)
        .await?;
    Ok(Json(stats))
}

// GET /api/stats/today: dashboard summary card
pub async fn today_stats(
    State(app_state): State<AppState>,
    Query(query): Query<TodayStatsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let total = app_state
        .stats_repo
        .get_today_total_customers(query.branch_seq)
        .await?;
    let walk_in = app_state
        .stats_repo
        .get_today_walk_in_customers(query.branch_seq)
        .await?;
    let by_ad_source = app_state
        .stats_repo
        .get_today_customers_by_ad_source(query.branch_seq)
        .await?;

    Ok(Json(json!({
        "totalCustomers": total,
        "walkInCustomers": walk_in,
        "byAdSource": by_ad_source,
    })))
}
