use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String) -> Self {
        Self {
            user_repo,
            jwt_secret,
        }
    }

    pub async fn register_user(
        &self,
        username: &str,
        password: &str,
        branch_seq: Option<i32>,
    ) -> Result<String, AppError> {
        let password_owned = password.to_owned();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_owned, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("해시 작업 실패: {}", e))??;

        let user = self
            .user_repo
            .create_user(username, &hashed_password, branch_seq)
            .await?;

        tracing::info!("신규 직원 계정 생성: {}", user.username);
        self.create_token(&user)
    }

    pub async fn login_user(&self, username: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_owned = password.to_owned();
        let hash_owned = user.hashed_password.clone();

        // bcrypt is CPU-bound, keep it off the async workers.
        let is_valid = tokio::task::spawn_blocking(move || verify(&password_owned, &hash_owned))
            .await
            .map_err(|e| anyhow::anyhow!("비밀번호 검증 작업 실패: {}", e))??;

        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(&user)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_seq(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        let expires_at = Utc::now() + chrono::Duration::hours(24);

        let claims = Claims {
            sub: user.seq,
            username: user.username.clone(),
            branch_seq: user.branch_seq,
            exp: expires_at.timestamp(),
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
