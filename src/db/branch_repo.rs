use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::branch::{Branch, BranchOption},
};

const BRANCH_COLUMNS: &str =
    "seq, branch_name, alias, address, directions, created_date, last_update_date";

#[derive(Clone)]
pub struct BranchRepository {
    pool: PgPool,
}

impl BranchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_branch(
        &self,
        name: &str,
        alias: &str,
        address: &str,
        directions: &str,
    ) -> Result<i32, AppError> {
        let seq: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO branches (branch_name, alias, address, directions)
            VALUES ($1, $2, $3, $4)
            RETURNING seq
            "#,
        )
        .bind(name)
        .bind(alias)
        .bind(address)
        .bind(directions)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("지점 등록 완료 - seq: {}, 이름: {}, alias: {}", seq, name, alias);
        Ok(seq)
    }

    pub async fn update_branch(
        &self,
        seq: i32,
        name: &str,
        alias: &str,
        address: &str,
        directions: &str,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE branches
            SET branch_name = $1, alias = $2, address = $3, directions = $4,
                last_update_date = now()
            WHERE seq = $5
            "#,
        )
        .bind(name)
        .bind(alias)
        .bind(address)
        .bind(directions)
        .bind(seq)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("지점"));
        }
        tracing::info!("지점 수정 완료 - seq: {}", seq);
        Ok(())
    }

    pub async fn delete_branch(&self, seq: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM branches WHERE seq = $1")
            .bind(seq)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("지점"));
        }
        tracing::info!("지점 삭제 완료 - seq: {}", seq);
        Ok(())
    }

    pub async fn get_branch_by_seq(&self, seq: i32) -> Result<Branch, AppError> {
        sqlx::query_as::<_, Branch>(&format!(
            "SELECT {BRANCH_COLUMNS} FROM branches WHERE seq = $1"
        ))
        .bind(seq)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("지점"))
    }

    pub async fn get_all_branches(&self) -> Result<Vec<Branch>, AppError> {
        let branches = sqlx::query_as::<_, Branch>(&format!(
            "SELECT {BRANCH_COLUMNS} FROM branches ORDER BY created_date DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(branches)
    }

    /// Header selector rows, oldest branch first.
    pub async fn get_branches_for_select(&self) -> Result<Vec<BranchOption>, AppError> {
        let branches = sqlx::query_as::<_, BranchOption>(
            "SELECT seq, alias, branch_name FROM branches ORDER BY seq ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(branches)
    }

    pub async fn get_first_branch_alias(&self) -> Result<String, AppError> {
        sqlx::query_scalar("SELECT alias FROM branches ORDER BY seq ASC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("지점"))
    }

    /// Alias is the external lookup key; matching ignores case.
    pub async fn get_branch_seq_by_alias(&self, alias: &str) -> Result<i32, AppError> {
        sqlx::query_scalar("SELECT seq FROM branches WHERE LOWER(alias) = LOWER($1)")
            .bind(alias)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("지점"))
    }
}
