use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::{customer::status, reservation::ReservationSmsConfig},
};

#[derive(Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the reservation and flips the customer to 예약확정 in one
    /// transaction; either both land or neither does.
    pub async fn create_reservation(
        &self,
        branch_seq: i32,
        customer_seq: i32,
        user_seq: i32,
        caller: &str,
        interview_date: DateTime<Utc>,
    ) -> Result<i32, AppError> {
        let mut tx = self.pool.begin().await?;

        let seq: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO reservation_info
                (branch_seq, customer_id, user_seq, caller, interview_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING seq
            "#,
        )
        .bind(branch_seq)
        .bind(customer_seq)
        .bind(user_seq)
        .bind(caller)
        .bind(interview_date)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE customers SET status = $1 WHERE seq = $2")
            .bind(status::CONFIRMED)
            .bind(customer_seq)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "예약 생성 완료 - seq: {}, 고객: {}, 상태: 예약확정",
            seq,
            customer_seq
        );
        Ok(seq)
    }

    pub async fn get_sms_config(
        &self,
        branch_seq: i32,
    ) -> Result<Option<ReservationSmsConfig>, AppError> {
        let config = sqlx::query_as::<_, ReservationSmsConfig>(
            r#"
            SELECT rs.seq, rs.branch_seq, rs.template_seq,
                   COALESCE(mt.template_name, '') AS template_name,
                   rs.sender_number, rs.auto_send
            FROM reservation_sms_config rs
            LEFT JOIN message_templates mt ON rs.template_seq = mt.seq
            WHERE rs.branch_seq = $1
            "#,
        )
        .bind(branch_seq)
        .fetch_optional(&self.pool)
        .await?;
        Ok(config)
    }

    /// Insert-or-update keyed on the branch: the existence check decides,
    /// and UNIQUE(branch_seq) keeps the row count at one.
    pub async fn save_sms_config(
        &self,
        branch_seq: i32,
        template_seq: i32,
        sender_number: &str,
        auto_send: bool,
    ) -> Result<(), AppError> {
        let existing: Option<i32> =
            sqlx::query_scalar("SELECT seq FROM reservation_sms_config WHERE branch_seq = $1")
                .bind(branch_seq)
                .fetch_optional(&self.pool)
                .await?;

        match existing {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO reservation_sms_config (branch_seq, template_seq, sender_number, auto_send)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(branch_seq)
                .bind(template_seq)
                .bind(sender_number)
                .bind(auto_send)
                .execute(&self.pool)
                .await?;
                tracing::info!("예약 SMS 설정 신규 생성 - 지점: {}", branch_seq);
            }
            Some(seq) => {
                sqlx::query(
                    r#"
                    UPDATE reservation_sms_config
                    SET template_seq = $1, sender_number = $2, auto_send = $3
                    WHERE seq = $4
                    "#,
                )
                .bind(template_seq)
                .bind(sender_number)
                .bind(auto_send)
                .bind(seq)
                .execute(&self.pool)
                .await?;
                tracing::info!("예약 SMS 설정 업데이트 - 지점: {}", branch_seq);
            }
        }
        Ok(())
    }
}
