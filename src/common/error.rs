use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("입력값 검증 실패")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}을(를) 찾을 수 없습니다")]
    NotFound(&'static str),

    #[error("이미 사용 중인 아이디입니다")]
    UsernameAlreadyExists,

    #[error("아이디 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials,

    #[error("인증 토큰이 없거나 유효하지 않습니다")]
    InvalidToken,

    #[error("다른 지점의 리소스입니다")]
    BranchMismatch,

    // Upstream failure message shown to the user, never the raw gateway text.
    #[error("SMS 발송 실패: {0}")]
    SmsError(String),

    #[error("카카오 인증 실패: {0}")]
    KakaoError(String),

    #[error("데이터베이스 오류")]
    DatabaseError(#[from] sqlx::Error),

    #[error("외부 서비스 요청 실패")]
    HttpError(#[from] reqwest::Error),

    #[error("Bcrypt 오류: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT 오류: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("내부 서버 오류")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Return every field-level validation detail.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "하나 이상의 입력값이 올바르지 않습니다.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::BadRequest(ref msg) => {
                let body = Json(json!({ "error": msg }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::NotFound(what) => {
                let body = Json(json!({ "error": format!("{what}을(를) 찾을 수 없습니다.") }));
                return (StatusCode::NOT_FOUND, body).into_response();
            }
            AppError::UsernameAlreadyExists => {
                (StatusCode::CONFLICT, "이미 사용 중인 아이디입니다.")
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "아이디 또는 비밀번호가 올바르지 않습니다.")
            }
            AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "인증 토큰이 없거나 유효하지 않습니다.")
            }
            AppError::BranchMismatch => {
                (StatusCode::FORBIDDEN, "다른 지점의 리소스에는 접근할 수 없습니다.")
            }
            AppError::SmsError(ref msg) => {
                tracing::error!("SMS 발송 실패: {}", msg);
                let body = Json(json!({ "error": format!("SMS 발송에 실패했습니다: {msg}") }));
                return (StatusCode::BAD_GATEWAY, body).into_response();
            }
            AppError::KakaoError(ref msg) => {
                tracing::error!("카카오 인증 실패: {}", msg);
                (StatusCode::BAD_GATEWAY, "카카오 로그인 처리 중 오류가 발생했습니다.")
            }
            // Everything else (database, HTTP plumbing, unexpected) is a 500.
            ref e => {
                tracing::error!("내부 서버 오류: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "예기치 않은 오류가 발생했습니다.")
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
