use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::template::{MessageTemplate, Placeholder},
};

const TEMPLATE_COLUMNS: &str = "seq, branch_seq, template_name, message_context, description, \
     is_active, is_default, created_date, last_update_date";

#[derive(Clone)]
pub struct TemplateRepository {
    pool: PgPool,
}

impl TemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Templates of one branch, default first, then most recently edited.
    pub async fn get_templates_by_branch(
        &self,
        branch_seq: i32,
    ) -> Result<Vec<MessageTemplate>, AppError> {
        let templates = sqlx::query_as::<_, MessageTemplate>(&format!(
            r#"
            SELECT {TEMPLATE_COLUMNS}
            FROM message_templates
            WHERE branch_seq = $1
            ORDER BY is_default DESC, last_update_date DESC
            "#
        ))
        .bind(branch_seq)
        .fetch_all(&self.pool)
        .await?;

        tracing::info!("템플릿 목록 조회 - 지점: {}, {}건", branch_seq, templates.len());
        Ok(templates)
    }

    pub async fn get_template_by_seq(&self, seq: i32) -> Result<MessageTemplate, AppError> {
        sqlx::query_as::<_, MessageTemplate>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM message_templates WHERE seq = $1"
        ))
        .bind(seq)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("메시지 템플릿"))
    }

    /// New templates are never default; 기본 지정 is a separate operation.
    pub async fn save_template(
        &self,
        branch_seq: i32,
        name: &str,
        content: &str,
        description: &str,
        is_active: bool,
    ) -> Result<i32, AppError> {
        let seq: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO message_templates
                (branch_seq, template_name, message_context, description, is_active, is_default)
            VALUES ($1, $2, $3, $4, $5, FALSE)
            RETURNING seq
            "#,
        )
        .bind(branch_seq)
        .bind(name)
        .bind(content)
        .bind(description)
        .bind(is_active)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("템플릿 저장 완료 - seq: {}, 이름: {}", seq, name);
        Ok(seq)
    }

    pub async fn update_template(
        &self,
        branch_seq: i32,
        seq: i32,
        name: &str,
        content: &str,
        description: &str,
        is_active: bool,
    ) -> Result<(), AppError> {
        self.assert_template_owner(branch_seq, seq).await?;

        sqlx::query(
            r#"
            UPDATE message_templates
            SET template_name = $1, message_context = $2, description = $3,
                is_active = $4, last_update_date = now()
            WHERE seq = $5
            "#,
        )
        .bind(name)
        .bind(content)
        .bind(description)
        .bind(is_active)
        .bind(seq)
        .execute(&self.pool)
        .await?;

        tracing::info!("템플릿 수정 완료 - seq: {}", seq);
        Ok(())
    }

    pub async fn delete_template(&self, branch_seq: i32, seq: i32) -> Result<(), AppError> {
        self.assert_template_owner(branch_seq, seq).await?;

        sqlx::query("DELETE FROM message_templates WHERE seq = $1")
            .bind(seq)
            .execute(&self.pool)
            .await?;

        tracing::info!("템플릿 삭제 완료 - seq: {}", seq);
        Ok(())
    }

    /// Makes `seq` the branch's only default template. Clearing the old
    /// default and setting the new one happen in one transaction: observers
    /// never see zero or two defaults.
    pub async fn set_default_template(&self, branch_seq: i32, seq: i32) -> Result<(), AppError> {
        self.assert_template_owner(branch_seq, seq).await?;

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE message_templates SET is_default = FALSE WHERE branch_seq = $1")
            .bind(branch_seq)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE message_templates SET is_default = TRUE WHERE seq = $1")
            .bind(seq)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("기본 템플릿 지정 완료 - 지점: {}, seq: {}", branch_seq, seq);
        Ok(())
    }

    /// Placeholder catalogue for the template editor.
    pub async fn get_placeholders(&self) -> Result<Vec<Placeholder>, AppError> {
        let placeholders = sqlx::query_as::<_, Placeholder>(
            "SELECT name, value, comment, examples FROM placeholders ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(placeholders)
    }

    async fn assert_template_owner(&self, branch_seq: i32, seq: i32) -> Result<(), AppError> {
        let owner: Option<i32> =
            sqlx::query_scalar("SELECT branch_seq FROM message_templates WHERE seq = $1")
                .bind(seq)
                .fetch_optional(&self.pool)
                .await?;

        match owner {
            None => Err(AppError::NotFound("메시지 템플릿")),
            Some(owner_seq) if owner_seq != branch_seq => {
                tracing::warn!(
                    "템플릿 접근 거부 - seq: {}, 요청 지점: {}, 소유 지점: {}",
                    seq,
                    branch_seq,
                    owner_seq
                );
                Err(AppError::BranchMismatch)
            }
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing;

    // Live-database test, see db::testing.

    #[tokio::test]
    #[ignore]
    async fn set_default_leaves_exactly_one_default_per_branch() {
        let pool = testing::pool().await;
        let branch_seq = testing::create_branch(&pool).await;
        let repo = TemplateRepository::new(pool.clone());

        let first = repo
            .save_template(branch_seq, "첫번째", "{이름}님 안내드립니다.", "", true)
            .await
            .unwrap();
        let second = repo
            .save_template(branch_seq, "두번째", "{이름}님 예약 안내입니다.", "", true)
            .await
            .unwrap();

        repo.set_default_template(branch_seq, first).await.unwrap();
        repo.set_default_template(branch_seq, second).await.unwrap();

        let templates = repo.get_templates_by_branch(branch_seq).await.unwrap();
        let defaults: Vec<_> = templates.iter().filter(|t| t.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].seq, second);

        for t in &templates {
            repo.delete_template(branch_seq, t.seq).await.unwrap();
        }
        testing::delete_branch(&pool, branch_seq).await;
    }
}
