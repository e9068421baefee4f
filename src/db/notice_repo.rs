use chrono::NaiveDate;
use sqlx::PgPool;

use crate::{
    common::{error::AppError, paging::Page},
    models::notice::Notice,
};

const NOTICE_COLUMNS: &str = "n.seq, n.branch_seq, b.branch_name, n.title, n.content, \
     n.category, n.is_pinned, n.is_active, n.view_count, n.event_start_date, \
     n.event_end_date, n.created_by, n.created_date, n.last_update_date";

/// Bound filter values for the dynamically assembled WHERE clause. The clause
/// text is caller-controlled; every user-supplied value goes through here.
enum Filter {
    Branch(i32),
    Text(String),
}

/// Shared WHERE fragment for listing and counting. Soft-deleted rows
/// (is_active = false) never show up in reads.
fn filter_clause(branch_seq: i32, category: &str, search_keyword: &str) -> (String, Vec<Filter>) {
    let mut conditions = vec!["n.is_active = TRUE".to_string()];
    let mut filters: Vec<Filter> = Vec::new();

    // branch_seq 0 means all branches here, unlike the customer listing.
    if branch_seq > 0 {
        conditions.push(format!("n.branch_seq = ${}", filters.len() + 1));
        filters.push(Filter::Branch(branch_seq));
    }

    if !category.is_empty() && category != "all" {
        conditions.push(format!("n.category = ${}", filters.len() + 1));
        filters.push(Filter::Text(category.to_string()));
    }

    if !search_keyword.is_empty() {
        let p = filters.len() + 1;
        conditions.push(format!("(n.title ILIKE ${p} OR n.content ILIKE ${p})"));
        filters.push(Filter::Text(format!("%{search_keyword}%")));
    }

    (format!("WHERE {}", conditions.join(" AND ")), filters)
}

#[derive(Clone)]
pub struct NoticeRepository {
    pool: PgPool,
}

impl NoticeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pinned notices first, then newest first.
    pub async fn get_notices(
        &self,
        branch_seq: i32,
        category: &str,
        search_keyword: &str,
        page: Page,
    ) -> Result<Vec<Notice>, AppError> {
        let (where_clause, filters) = filter_clause(branch_seq, category, search_keyword);
        let limit_param = filters.len() + 1;
        let sql = format!(
            r#"
            SELECT {NOTICE_COLUMNS}
            FROM notices n
            JOIN branches b ON n.branch_seq = b.seq
            {where_clause}
            ORDER BY n.is_pinned DESC, n.created_date DESC
            LIMIT ${limit_param} OFFSET ${}
            "#,
            limit_param + 1
        );

        let mut query = sqlx::query_as::<_, Notice>(&sql);
        for filter in &filters {
            query = match filter {
                Filter::Branch(seq) => query.bind(*seq),
                Filter::Text(value) => query.bind(value.clone()),
            };
        }
        let notices = query
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(notices)
    }

    pub async fn get_notices_count(
        &self,
        branch_seq: i32,
        category: &str,
        search_keyword: &str,
    ) -> Result<i64, AppError> {
        let (where_clause, filters) = filter_clause(branch_seq, category, search_keyword);
        let sql = format!("SELECT COUNT(*) FROM notices n {where_clause}");

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for filter in &filters {
            query = match filter {
                Filter::Branch(seq) => query.bind(*seq),
                Filter::Text(value) => query.bind(value.clone()),
            };
        }
        Ok(query.fetch_one(&self.pool).await?)
    }

    pub async fn get_notice_by_seq(&self, seq: i32) -> Result<Notice, AppError> {
        sqlx::query_as::<_, Notice>(&format!(
            r#"
            SELECT {NOTICE_COLUMNS}
            FROM notices n
            JOIN branches b ON n.branch_seq = b.seq
            WHERE n.seq = $1 AND n.is_active = TRUE
            "#
        ))
        .bind(seq)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("공지사항"))
    }

    /// Fire-and-forget view counter. A failure here must not fail the page
    /// view, so the error is logged and swallowed.
    pub async fn increment_view_count(&self, seq: i32) {
        let result = sqlx::query("UPDATE notices SET view_count = view_count + 1 WHERE seq = $1")
            .bind(seq)
            .execute(&self.pool)
            .await;
        if let Err(e) = result {
            tracing::error!("조회수 증가 실패 - seq: {}, error: {}", seq, e);
        }
    }

    pub async fn insert_notice(
        &self,
        branch_seq: i32,
        title: &str,
        content: &str,
        category: &str,
        is_pinned: bool,
        event_start_date: Option<NaiveDate>,
        event_end_date: Option<NaiveDate>,
        created_by: Option<&str>,
    ) -> Result<i32, AppError> {
        let seq: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO notices
                (branch_seq, title, content, category, is_pinned,
                 event_start_date, event_end_date, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NULLIF($8, ''))
            RETURNING seq
            "#,
        )
        .bind(branch_seq)
        .bind(title)
        .bind(content)
        .bind(category)
        .bind(is_pinned)
        .bind(event_start_date)
        .bind(event_end_date)
        .bind(created_by.unwrap_or(""))
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("공지 등록 완료 - seq: {}, 제목: {}, 분류: {}", seq, title, category);
        Ok(seq)
    }

    pub async fn update_notice(
        &self,
        seq: i32,
        title: &str,
        content: &str,
        category: &str,
        is_pinned: bool,
        event_start_date: Option<NaiveDate>,
        event_end_date: Option<NaiveDate>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE notices
            SET title = $1, content = $2, category = $3, is_pinned = $4,
                event_start_date = $5, event_end_date = $6, last_update_date = now()
            WHERE seq = $7
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(category)
        .bind(is_pinned)
        .bind(event_start_date)
        .bind(event_end_date)
        .bind(seq)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("공지사항"));
        }
        tracing::info!("공지 수정 완료 - seq: {}", seq);
        Ok(())
    }

    /// Soft delete: kept for audit, excluded from every read.
    pub async fn delete_notice(&self, seq: i32) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE notices SET is_active = FALSE WHERE seq = $1")
            .bind(seq)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("공지사항"));
        }
        tracing::info!("공지 삭제(비활성화) 완료 - seq: {}", seq);
        Ok(())
    }
}
