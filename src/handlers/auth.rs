use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[validate(length(min = 4, message = "아이디는 4자 이상이어야 합니다"))]
    pub username: String,

    #[validate(length(min = 8, message = "비밀번호는 8자 이상이어야 합니다"))]
    pub password: String,

    pub branch_seq: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "아이디를 입력해주세요"))]
    pub username: String,

    #[validate(length(min = 1, message = "비밀번호를 입력해주세요"))]
    pub password: String,
}

// POST /api/auth/register
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let token = app_state
        .auth_service
        .register_user(&payload.username, &payload.password, payload.branch_seq)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "token": token }))))
}

// POST /api/auth/login
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let token = app_state
        .auth_service
        .login_user(&payload.username, &payload.password)
        .await?;

    Ok(Json(json!({ "token": token })))
}

// GET /api/auth/me: the default branch is the user's own, or the first
// registered branch for head-office accounts without one
pub async fn get_me(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let default_branch_alias = match user.branch_seq {
        Some(seq) => app_state.branch_repo.get_branch_by_seq(seq).await?.alias,
        None => app_state
            .branch_repo
            .get_first_branch_alias()
            .await
            .unwrap_or_default(),
    };

    Ok(Json(json!({
        "user": user,
        "defaultBranchAlias": default_branch_alias,
    })))
}
