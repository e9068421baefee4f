use sqlx::PgPool;

use crate::common::error::AppError;

/// Per-branch SMS gateway account, the typed replacement for the legacy
/// untyped third-party-integration mapping.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SmsConfig {
    pub seq: i32,
    pub branch_seq: i32,
    pub account_id: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub callback_number: Option<String>,
    pub is_active: bool,
    pub remaining_sms: i32,
    pub remaining_lms: i32,
}

#[derive(Clone)]
pub struct SmsRepository {
    pool: PgPool,
}

impl SmsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// None when the branch has no SMS integration configured; that is a
    /// normal state, not an error.
    pub async fn get_config(&self, branch_seq: i32) -> Result<Option<SmsConfig>, AppError> {
        let config = sqlx::query_as::<_, SmsConfig>(
            r#"
            SELECT seq, branch_seq, account_id, password, callback_number,
                   is_active, remaining_sms, remaining_lms
            FROM sms_config
            WHERE branch_seq = $1
            "#,
        )
        .bind(branch_seq)
        .fetch_optional(&self.pool)
        .await?;
        Ok(config)
    }

    /// One row per branch, enforced by UNIQUE(branch_seq); saving is a
    /// native upsert.
    pub async fn save_config(
        &self,
        branch_seq: i32,
        account_id: &str,
        password: &str,
        callback_number: Option<&str>,
        is_active: bool,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO sms_config (branch_seq, account_id, password, callback_number, is_active)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (branch_seq)
            DO UPDATE SET
                account_id = EXCLUDED.account_id,
                password = EXCLUDED.password,
                callback_number = EXCLUDED.callback_number,
                is_active = EXCLUDED.is_active,
                last_update_date = now()
            "#,
        )
        .bind(branch_seq)
        .bind(account_id)
        .bind(password)
        .bind(callback_number)
        .bind(is_active)
        .execute(&self.pool)
        .await?;

        tracing::info!("SMS 설정 저장 완료 - 지점: {}", branch_seq);
        Ok(())
    }

    /// Records the remaining-call count the gateway reported after a send.
    pub async fn update_remaining_count(
        &self,
        branch_seq: i32,
        msg_type: &str,
        remaining: i32,
    ) -> Result<(), AppError> {
        let column = if msg_type.eq_ignore_ascii_case("lms") {
            "remaining_lms"
        } else {
            "remaining_sms"
        };
        let sql = format!(
            "UPDATE sms_config SET {column} = $1, last_update_date = now() WHERE branch_seq = $2"
        );

        sqlx::query(&sql)
            .bind(remaining)
            .bind(branch_seq)
            .execute(&self.pool)
            .await?;

        tracing::info!(
            "잔여건수 업데이트 - 지점: {}, 타입: {}, 잔여: {}",
            branch_seq,
            msg_type,
            remaining
        );
        Ok(())
    }
}
