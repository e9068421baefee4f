use chrono::NaiveDate;
use sqlx::PgPool;

use crate::{
    common::{error::AppError, paging::Page},
    models::customer::{ad_source, normalize_phone, status, CallResult, Customer, KakaoCustomer},
};

const CUSTOMER_COLUMNS: &str = "seq, branch_seq, name, phone_number, comment, commercial_name, \
     ad_source, call_count, status, kakao_id, created_date, last_update_date";

/// Appended to list/count queries for the "new" filter: customers still in
/// play, i.e. under the call limit and without a confirmed reservation.
const NEW_FILTER_CONDITION: &str = " AND call_count < 5 AND NOT EXISTS \
     (SELECT 1 FROM reservation_info r WHERE r.customer_id = customers.seq)";

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a walk-in customer. An empty comment is stored as NULL so
    /// "no comment" stays distinguishable from an empty one.
    pub async fn create_customer(
        &self,
        branch_seq: Option<i32>,
        name: &str,
        phone_number: &str,
        comment: &str,
        ad_source: &str,
    ) -> Result<i32, AppError> {
        let comment = if comment.is_empty() { None } else { Some(comment) };

        let seq: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO customers
                (branch_seq, name, phone_number, comment, commercial_name, ad_source, call_count, status)
            VALUES ($1, $2, $3, $4, '-', $5, 0, $6)
            RETURNING seq
            "#,
        )
        .bind(branch_seq)
        .bind(name)
        .bind(normalize_phone(phone_number))
        .bind(comment)
        .bind(ad_source)
        .bind(status::NEW)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("고객 등록 완료 - seq: {}, 이름: {}", seq, name);
        Ok(seq)
    }

    /// Consultation / ad-platform registration. Extra acquisition context is
    /// kept as a JSON comment, as the legacy external API did.
    pub async fn insert_external_customer(
        &self,
        branch_seq: i32,
        name: &str,
        phone_number: &str,
        job: &str,
        ad_platform: &str,
        ad_name: &str,
    ) -> Result<i32, AppError> {
        let info = serde_json::json!({
            "job": job,
            "ad_platform": ad_platform,
            "ad_name": ad_name,
        });

        let seq: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO customers
                (branch_seq, name, phone_number, comment, commercial_name, ad_source, call_count, status)
            VALUES ($1, $2, $3, $4, $5, $6, 0, $7)
            RETURNING seq
            "#,
        )
        .bind(branch_seq)
        .bind(name)
        .bind(normalize_phone(phone_number))
        .bind(info.to_string())
        .bind(ad_name)
        .bind(ad_platform)
        .bind(status::NEW)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            "외부 고객 등록 완료 - seq: {}, 지점: {}, 출처: {}",
            seq,
            branch_seq,
            ad_platform
        );
        Ok(seq)
    }

    /// Branch-scoped customer listing.
    ///
    /// `branch_seq == 0` is the "no branch selected" sentinel and returns an
    /// empty list, not all branches. Ordered by creation date then seq, both
    /// descending, so same-timestamp rows keep a stable order.
    pub async fn get_customers_by_branch(
        &self,
        branch_seq: i32,
        filter: &str,
        search_type: &str,
        search_keyword: &str,
        page: Page,
    ) -> Result<Vec<Customer>, AppError> {
        if branch_seq == 0 {
            tracing::debug!("고객 목록 조회 - 지점 미선택, 빈 목록 반환");
            return Ok(Vec::new());
        }

        let mut sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE branch_seq = $1"
        );
        let mut next_param = 2;

        if filter == "new" {
            sql.push_str(NEW_FILTER_CONDITION);
        }

        let condition = search_condition(search_type, search_keyword)?;
        if let Some(cond) = &condition {
            sql.push_str(&cond.sql(next_param));
            next_param += 1;
        }

        sql.push_str(" ORDER BY created_date DESC, seq DESC");
        sql.push_str(&format!(" LIMIT ${} OFFSET ${}", next_param, next_param + 1));

        let mut query = sqlx::query_as::<_, Customer>(&sql).bind(branch_seq);
        match &condition {
            Some(SearchCondition::Pattern { pattern, .. }) => query = query.bind(pattern.clone()),
            Some(SearchCondition::Date { date, .. }) => query = query.bind(*date),
            None => {}
        }
        let customers = query
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        tracing::info!(
            "고객 목록 조회 완료 - 지점: {}, {}건",
            branch_seq,
            customers.len()
        );
        Ok(customers)
    }

    /// Count matching the same sentinel and filters as the listing query.
    pub async fn get_customers_count_by_branch(
        &self,
        branch_seq: i32,
        filter: &str,
        search_type: &str,
        search_keyword: &str,
    ) -> Result<i64, AppError> {
        if branch_seq == 0 {
            return Ok(0);
        }

        let mut sql = String::from("SELECT COUNT(*) FROM customers WHERE branch_seq = $1");
        if filter == "new" {
            sql.push_str(NEW_FILTER_CONDITION);
        }

        let condition = search_condition(search_type, search_keyword)?;
        if let Some(cond) = &condition {
            sql.push_str(&cond.sql(2));
        }

        let mut query = sqlx::query_scalar::<_, i64>(&sql).bind(branch_seq);
        match &condition {
            Some(SearchCondition::Pattern { pattern, .. }) => query = query.bind(pattern.clone()),
            Some(SearchCondition::Date { date, .. }) => query = query.bind(*date),
            None => {}
        }
        Ok(query.fetch_one(&self.pool).await?)
    }

    pub async fn update_comment(&self, customer_seq: i32, comment: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE customers SET comment = $1 WHERE seq = $2")
            .bind(comment)
            .bind(customer_seq)
            .execute(&self.pool)
            .await?;
        tracing::info!("고객 코멘트 업데이트 완료 - seq: {}", customer_seq);
        Ok(())
    }

    pub async fn update_name(&self, customer_seq: i32, name: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE customers SET name = $1 WHERE seq = $2")
            .bind(name)
            .bind(customer_seq)
            .execute(&self.pool)
            .await?;
        tracing::info!("고객 이름 업데이트 완료 - seq: {}, 이름: {}", customer_seq, name);
        Ok(())
    }

    pub async fn update_status(&self, customer_seq: i32, new_status: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE customers SET status = $1 WHERE seq = $2")
            .bind(new_status)
            .bind(customer_seq)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("고객"));
        }
        tracing::info!("고객 상태 업데이트 완료 - seq: {}, 상태: {}", customer_seq, new_status);
        Ok(())
    }

    /// Records a caller selection and bumps the call counter in one
    /// transaction. The counter mutates via a single `call_count + 1` UPDATE;
    /// atomicity under concurrent calls is the database's job, and the
    /// returned values are read from that same statement so they always
    /// reflect the post-increment state.
    pub async fn process_call(
        &self,
        customer_seq: i32,
        branch_seq: i32,
        caller: &str,
    ) -> Result<CallResult, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO caller_selection_history (customer_id, caller, branch_seq, selected_date)
            VALUES ($1, $2, $3, now())
            "#,
        )
        .bind(customer_seq)
        .bind(caller)
        .bind(branch_seq)
        .execute(&mut *tx)
        .await?;

        // At 5 calls the customer drops out of the "new" pool; otherwise an
        // untouched status moves to 진행중, terminal statuses are kept.
        let row: Option<(i32, chrono::DateTime<chrono::Utc>)> = sqlx::query_as(
            r#"
            UPDATE customers
            SET call_count = call_count + 1,
                last_update_date = now(),
                status = CASE
                    WHEN call_count + 1 >= 5 THEN $2
                    WHEN status NOT IN ($3, $4, $2) THEN $5
                    ELSE status
                END
            WHERE seq = $1
            RETURNING call_count, last_update_date
            "#,
        )
        .bind(customer_seq)
        .bind(status::CALL_LIMIT)
        .bind(status::CONFIRMED)
        .bind(status::REFUSED)
        .bind(status::IN_PROGRESS)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((call_count, last_update_date)) = row else {
            // Rolls back on drop.
            return Err(AppError::NotFound("고객"));
        };

        tx.commit().await?;

        if call_count >= 5 {
            tracing::info!("콜 횟수 5회 도달 - 상태 콜수초과 전환 - seq: {}", customer_seq);
        }
        tracing::info!(
            "콜 처리 완료 - seq: {}, caller: {}, call_count: {}",
            customer_seq,
            caller,
            call_count
        );
        Ok(CallResult {
            call_count,
            last_update_date,
        })
    }

    pub async fn get_customer_by_kakao_id(
        &self,
        kakao_id: i64,
    ) -> Result<Option<KakaoCustomer>, AppError> {
        let customer = sqlx::query_as::<_, KakaoCustomer>(
            r#"
            SELECT c.seq, c.branch_seq, b.branch_name, c.name, c.phone_number,
                   c.kakao_id, c.created_date
            FROM customers c
            LEFT JOIN branches b ON c.branch_seq = b.seq
            WHERE c.kakao_id = $1
            "#,
        )
        .bind(kakao_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(customer)
    }

    /// Mypage lookup by internal seq.
    pub async fn get_customer_by_seq(&self, seq: i32) -> Result<KakaoCustomer, AppError> {
        sqlx::query_as::<_, KakaoCustomer>(
            r#"
            SELECT c.seq, c.branch_seq, b.branch_name, c.name, c.phone_number,
                   c.kakao_id, c.created_date
            FROM customers c
            LEFT JOIN branches b ON c.branch_seq = b.seq
            WHERE c.seq = $1
            "#,
        )
        .bind(seq)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("고객"))
    }

    /// Full row, used when composing reservation side effects.
    pub async fn get_customer_detail(&self, seq: i32) -> Result<Customer, AppError> {
        sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE seq = $1"
        ))
        .bind(seq)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("고객"))
    }

    /// Registers or refreshes a customer on Kakao login, keyed on the Kakao
    /// numeric id. Check-then-act: the UNIQUE constraint on kakao_id is the
    /// backstop for the race window, and a losing insert falls back to the
    /// update path instead of failing the login.
    pub async fn upsert_kakao_customer(
        &self,
        branch_seq: i32,
        kakao_id: i64,
        name: &str,
        phone_number: &str,
    ) -> Result<i32, AppError> {
        let clean_phone = normalize_phone(phone_number);

        if let Some(existing) = self.get_customer_by_kakao_id(kakao_id).await? {
            self.refresh_kakao_customer(kakao_id, name, &clean_phone).await?;
            tracing::info!("카카오 고객 업데이트 - seq: {}, 이름: {}", existing.seq, name);
            return Ok(existing.seq);
        }

        let inserted: Result<i32, sqlx::Error> = sqlx::query_scalar(
            r#"
            INSERT INTO customers (branch_seq, name, phone_number, ad_source, kakao_id, call_count, status)
            VALUES ($1, $2, $3, $4, $5, 0, $6)
            RETURNING seq
            "#,
        )
        .bind(branch_seq)
        .bind(name)
        .bind(&clean_phone)
        .bind(ad_source::KAKAO)
        .bind(kakao_id)
        .bind(status::NEW)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(seq) => {
                tracing::info!("카카오 고객 신규 등록 - seq: {}, kakao_id: {}", seq, kakao_id);
                Ok(seq)
            }
            Err(e) => {
                let lost_race = e
                    .as_database_error()
                    .is_some_and(|db_err| db_err.is_unique_violation());
                if !lost_race {
                    return Err(e.into());
                }
                // Someone registered the same Kakao id between our check and
                // insert; treat it as the update case.
                self.refresh_kakao_customer(kakao_id, name, &clean_phone).await?;
                let existing = self
                    .get_customer_by_kakao_id(kakao_id)
                    .await?
                    .ok_or(AppError::NotFound("고객"))?;
                Ok(existing.seq)
            }
        }
    }

    async fn refresh_kakao_customer(
        &self,
        kakao_id: i64,
        name: &str,
        clean_phone: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE customers SET name = $1, phone_number = $2, last_update_date = now() WHERE kakao_id = $3",
        )
        .bind(name)
        .bind(clean_phone)
        .bind(kakao_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Hard delete. Dependent reservations are detached, not removed: the
    /// schema's ON DELETE SET NULL nulls their customer_id.
    pub async fn delete_customer_by_seq(&self, seq: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM customers WHERE seq = $1")
            .bind(seq)
            .execute(&self.pool)
            .await?;
        tracing::info!(
            "고객 삭제 완료 - seq: {}, 삭제 건수: {}",
            seq,
            result.rows_affected()
        );
        Ok(())
    }
}

/// Search predicate for customer listings. Name and phone match as ILIKE
/// patterns; the three date types compare against the Asia/Seoul calendar
/// date since timestamps are stored in UTC.
#[derive(Debug, PartialEq)]
enum SearchCondition {
    Pattern { column: &'static str, pattern: String },
    Date { kind: DateSearch, date: NaiveDate },
}

#[derive(Debug, PartialEq)]
enum DateSearch {
    Registered,
    Contacted,
    Reserved,
}

impl SearchCondition {
    /// SQL fragment for the condition, bound at `$param`. Reservation-date
    /// search reuses `$1` (the branch) so a reservation for the same customer
    /// at another branch does not match.
    fn sql(&self, param: usize) -> String {
        match self {
            SearchCondition::Pattern { column, .. } => format!(" AND {column} ILIKE ${param}"),
            SearchCondition::Date { kind: DateSearch::Registered, .. } => {
                format!(" AND (created_date AT TIME ZONE 'Asia/Seoul')::date = ${param}")
            }
            SearchCondition::Date { kind: DateSearch::Contacted, .. } => {
                format!(" AND (last_update_date AT TIME ZONE 'Asia/Seoul')::date = ${param}")
            }
            SearchCondition::Date { kind: DateSearch::Reserved, .. } => format!(
                " AND seq IN (SELECT customer_id FROM reservation_info \
                 WHERE (interview_date AT TIME ZONE 'Asia/Seoul')::date = ${param} \
                 AND branch_seq = $1)"
            ),
        }
    }
}

fn search_condition(
    search_type: &str,
    search_keyword: &str,
) -> Result<Option<SearchCondition>, AppError> {
    if search_keyword.is_empty() {
        return Ok(None);
    }
    let date_kind = match search_type {
        "name" => {
            return Ok(Some(SearchCondition::Pattern {
                column: "name",
                pattern: format!("%{search_keyword}%"),
            }))
        }
        "phone" => {
            return Ok(Some(SearchCondition::Pattern {
                column: "phone_number",
                pattern: format!("%{search_keyword}%"),
            }))
        }
        "register_date" => DateSearch::Registered,
        "contact_date" => DateSearch::Contacted,
        "reservation_date" => DateSearch::Reserved,
        _ => {
            return Err(AppError::BadRequest(
                "지원하지 않는 검색 유형입니다.".to_string(),
            ))
        }
    };
    let date = NaiveDate::parse_from_str(search_keyword, "%Y-%m-%d").map_err(|_| {
        AppError::BadRequest("검색 날짜 형식이 올바르지 않습니다. (YYYY-MM-DD)".to_string())
    })?;
    Ok(Some(SearchCondition::Date {
        kind: date_kind,
        date,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_and_phone_searches_build_like_patterns() {
        let cond = search_condition("name", "김철수").unwrap().unwrap();
        assert_eq!(cond.sql(2), " AND name ILIKE $2");
        assert!(matches!(cond, SearchCondition::Pattern { pattern, .. } if pattern == "%김철수%"));

        let cond = search_condition("phone", "1234").unwrap().unwrap();
        assert_eq!(cond.sql(3), " AND phone_number ILIKE $3");
    }

    #[test]
    fn date_search_types_build_date_predicates() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        for (search_type, column) in [
            ("register_date", "created_date"),
            ("contact_date", "last_update_date"),
        ] {
            let cond = search_condition(search_type, "2026-03-02").unwrap().unwrap();
            assert!(matches!(&cond, SearchCondition::Date { date, .. } if *date == expected));
            assert!(cond.sql(2).contains(column), "{search_type}");
        }

        let cond = search_condition("reservation_date", "2026-03-02").unwrap().unwrap();
        let sql = cond.sql(2);
        assert!(sql.contains("interview_date"));
        assert!(sql.contains("branch_seq = $1"));
    }

    #[test]
    fn malformed_search_date_is_rejected() {
        let err = search_condition("register_date", "2026-3-2").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        let err = search_condition("register_date", "오늘").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn unknown_search_type_is_rejected() {
        let err = search_condition("email", "foo@example.com").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn empty_keyword_means_no_condition() {
        assert_eq!(search_condition("register_date", "").unwrap(), None);
        assert_eq!(search_condition("name", "").unwrap(), None);
    }

    // Live-database test, see db::testing.

    #[tokio::test]
    #[ignore]
    async fn kakao_upsert_keeps_the_seq_and_refreshes_the_profile() {
        let pool = crate::db::testing::pool().await;
        let branch_seq = crate::db::testing::create_branch(&pool).await;
        let repo = CustomerRepository::new(pool.clone());

        let kakao_id = chrono::Utc::now().timestamp_micros();

        let first = repo
            .upsert_kakao_customer(branch_seq, kakao_id, "홍길동", "010-1234-5678")
            .await
            .unwrap();
        let second = repo
            .upsert_kakao_customer(branch_seq, kakao_id, "홍길순", "010-8765-4321")
            .await
            .unwrap();
        assert_eq!(first, second);

        // Last write wins on the profile fields, phone stored digits-only.
        let customer = repo
            .get_customer_by_kakao_id(kakao_id)
            .await
            .unwrap()
            .expect("등록된 카카오 고객");
        assert_eq!(customer.seq, first);
        assert_eq!(customer.name, "홍길순");
        assert_eq!(customer.phone_number, "01087654321");

        repo.delete_customer_by_seq(first).await.unwrap();
        crate::db::testing::delete_branch(&pool, branch_seq).await;
    }
}
