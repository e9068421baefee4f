use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use rand::{distr::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use crate::{common::error::AppError, config::KakaoSettings};

const AUTH_URL: &str = "https://kauth.kakao.com/oauth/authorize";
const TOKEN_URL: &str = "https://kauth.kakao.com/oauth/token";
const USER_INFO_URL: &str = "https://kapi.kakao.com/v2/user/me";

/// A state older than this is replayed or stale and gets rejected.
pub const STATE_MAX_AGE_SECS: i64 = 600;

/// Branch assigned to Kakao sign-ins that arrive without one.
pub const KAKAO_DEFAULT_BRANCH: i32 = 99999;

/// Which surface started the OAuth round trip. The callback checks this
/// tag so a code minted for one flow cannot finish another.
pub mod source {
    pub const LANDING: &str = "ad";
    pub const BOARD: &str = "board";
}

/// CSRF state carried through the OAuth redirect, URL-safe base64 of
/// this struct as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthState {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_seq: Option<String>,
    pub timestamp: i64,
    pub random: String,
}

impl OAuthState {
    pub fn new(source: &str, branch_seq: Option<&str>) -> Self {
        let random: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        Self {
            source: source.to_string(),
            branch_seq: branch_seq.map(str::to_string),
            timestamp: chrono::Utc::now().timestamp(),
            random,
        }
    }

    pub fn encode(&self) -> Result<String, AppError> {
        let json = serde_json::to_vec(self)
            .map_err(|e| AppError::KakaoError(format!("state 생성 실패: {}", e)))?;
        Ok(URL_SAFE.encode(json))
    }

    pub fn decode(raw: &str) -> Result<Self, AppError> {
        let bytes = URL_SAFE
            .decode(raw)
            .map_err(|e| AppError::KakaoError(format!("state base64 디코딩 실패: {}", e)))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| AppError::KakaoError(format!("state JSON 파싱 실패: {}", e)))
    }

    /// Checks the source tag and the freshness window.
    pub fn validate(&self, expected_source: &str, now_unix: i64) -> Result<(), AppError> {
        if self.source != expected_source {
            return Err(AppError::KakaoError(format!(
                "잘못된 state source: {}",
                self.source
            )));
        }
        if now_unix - self.timestamp > STATE_MAX_AGE_SECS {
            return Err(AppError::KakaoError(
                "요청이 만료되었습니다. 다시 시도해주세요.".to_string(),
            ));
        }
        Ok(())
    }

    pub fn branch_seq_or_default(&self) -> i32 {
        self.branch_seq
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(KAKAO_DEFAULT_BRANCH)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KakaoTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub scope: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KakaoUserInfo {
    pub id: i64,
    #[serde(default)]
    pub connected_at: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub kakao_account: KakaoAccount,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KakaoAccount {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub has_phone_number: bool,
    #[serde(default)]
    pub phone_number_needs_agreement: bool,
}

impl KakaoUserInfo {
    /// Real name when consented, else profile nickname, else a fixed
    /// placeholder.
    pub fn display_name(&self) -> String {
        if !self.kakao_account.name.is_empty() {
            return self.kakao_account.name.clone();
        }
        if let Some(nickname) = self.properties.get("nickname").and_then(|v| v.as_str()) {
            if !nickname.is_empty() {
                return nickname.to_string();
            }
        }
        "카카오 사용자".to_string()
    }
}

#[derive(Clone)]
pub struct KakaoService {
    client: reqwest::Client,
    settings: KakaoSettings,
}

impl KakaoService {
    pub fn new(settings: KakaoSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    /// Swaps the path of the configured redirect URI so each surface
    /// gets its own callback endpoint.
    pub fn redirect_uri_for(&self, path: &str) -> String {
        match reqwest::Url::parse(&self.settings.redirect_uri) {
            Ok(mut url) => {
                url.set_path(path);
                url.to_string()
            }
            Err(_) => format!("http://localhost:8080{}", path),
        }
    }

    pub fn authorize_url(
        &self,
        redirect_uri: &str,
        state: &str,
        scope: &str,
    ) -> Result<String, AppError> {
        let url = reqwest::Url::parse_with_params(
            AUTH_URL,
            &[
                ("client_id", self.settings.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("state", state),
                ("scope", scope),
            ],
        )
        .map_err(|e| AppError::KakaoError(format!("인증 URL 생성 실패: {}", e)))?;
        Ok(url.to_string())
    }

    pub async fn get_token(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<KakaoTokenResponse, AppError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("code", code),
        ];

        let resp = self
            .client
            .post(TOKEN_URL)
            .timeout(Duration::from_secs(10))
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::KakaoError(format!(
                "카카오 토큰 요청 실패: {}",
                body
            )));
        }

        resp.json::<KakaoTokenResponse>()
            .await
            .map_err(|e| AppError::KakaoError(format!("카카오 토큰 응답 파싱 실패: {}", e)))
    }

    pub async fn get_user_info(&self, access_token: &str) -> Result<KakaoUserInfo, AppError> {
        let resp = self
            .client
            .get(USER_INFO_URL)
            .timeout(Duration::from_secs(10))
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::KakaoError(format!(
                "사용자 정보 요청 실패: {}",
                body
            )));
        }

        resp.json::<KakaoUserInfo>()
            .await
            .map_err(|e| AppError::KakaoError(format!("사용자 정보 응답 파싱 실패: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trip() {
        let state = OAuthState::new(source::BOARD, Some("3"));
        let encoded = state.encode().unwrap();
        let decoded = OAuthState::decode(&encoded).unwrap();
        assert_eq!(decoded.source, "board");
        assert_eq!(decoded.branch_seq.as_deref(), Some("3"));
        assert_eq!(decoded.random, state.random);
    }

    #[test]
    fn stale_state_is_rejected() {
        let mut state = OAuthState::new(source::LANDING, None);
        let now = state.timestamp;
        assert!(state.validate(source::LANDING, now + 599).is_ok());
        state.timestamp = now - STATE_MAX_AGE_SECS - 1;
        assert!(state.validate(source::LANDING, now).is_err());
    }

    #[test]
    fn wrong_source_is_rejected() {
        let state = OAuthState::new(source::LANDING, None);
        assert!(state.validate(source::BOARD, state.timestamp).is_err());
    }

    #[test]
    fn garbage_state_fails_to_decode() {
        assert!(OAuthState::decode("not-base64-json!!").is_err());
    }

    #[test]
    fn branch_defaults_when_missing_or_invalid() {
        let state = OAuthState::new(source::BOARD, None);
        assert_eq!(state.branch_seq_or_default(), KAKAO_DEFAULT_BRANCH);

        let state = OAuthState::new(source::BOARD, Some("abc"));
        assert_eq!(state.branch_seq_or_default(), KAKAO_DEFAULT_BRANCH);

        let state = OAuthState::new(source::BOARD, Some("7"));
        assert_eq!(state.branch_seq_or_default(), 7);
    }

    #[test]
    fn display_name_falls_back_to_nickname() {
        let mut info = KakaoUserInfo {
            id: 1,
            connected_at: String::new(),
            properties: serde_json::Map::new(),
            kakao_account: KakaoAccount::default(),
        };
        assert_eq!(info.display_name(), "카카오 사용자");

        info.properties
            .insert("nickname".to_string(), serde_json::json!("길동이"));
        assert_eq!(info.display_name(), "길동이");

        info.kakao_account.name = "홍길동".to_string();
        assert_eq!(info.display_name(), "홍길동");
    }
}
