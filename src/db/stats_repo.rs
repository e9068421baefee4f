use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::stats::{confirm_rate, AdSourceStats, CallerStats, DailyCustomerStats, Period, CALLERS},
};

#[derive(Clone)]
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Daily customer/reservation creation counts over the trailing `days`
    /// calendar days, today included. A generate_series date spine guarantees
    /// exactly `days` rows; days with no activity come back as zeros.
    /// branch_seq 0 aggregates across all branches.
    pub async fn get_daily_customer_stats(
        &self,
        branch_seq: i32,
        days: i32,
    ) -> Result<Vec<DailyCustomerStats>, AppError> {
        let branch_filter = if branch_seq > 0 { " AND branch_seq = $2" } else { "" };
        let sql = format!(
            r#"
            SELECT d.day::date AS date,
                   COALESCE(c.count, 0) AS customer_count,
                   COALESCE(r.count, 0) AS reservation_count
            FROM generate_series(
                     CURRENT_DATE - ($1::int - 1),
                     CURRENT_DATE,
                     INTERVAL '1 day'
                 ) AS d(day)
            LEFT JOIN (
                SELECT created_date::date AS day, COUNT(*) AS count
                FROM customers
                WHERE created_date::date >= CURRENT_DATE - ($1::int - 1){branch_filter}
                GROUP BY 1
            ) c ON d.day::date = c.day
            LEFT JOIN (
                SELECT created_date::date AS day, COUNT(*) AS count
                FROM reservation_info
                WHERE created_date::date >= CURRENT_DATE - ($1::int - 1){branch_filter}
                GROUP BY 1
            ) r ON d.day::date = r.day
            ORDER BY 1 ASC
            "#
        );

        let mut query = sqlx::query_as::<_, DailyCustomerStats>(&sql).bind(days);
        if branch_seq > 0 {
            query = query.bind(branch_seq);
        }
        let stats = query.fetch_all(&self.pool).await?;

        tracing::info!(
            "일별 고객 통계 조회 완료 - 지점: {}, {}일",
            branch_seq,
            stats.len()
        );
        Ok(stats)
    }

    /// Per-caller performance over the fixed A–P alphabet. Every slot gets a
    /// row even with zero activity. The confirmation rate is not
    /// confirmed/total-customers: it is confirmed selections over how often
    /// the caller was picked, taken from the selection history log.
    pub async fn get_caller_stats(
        &self,
        branch_seq: i32,
        period: Period,
    ) -> Result<Vec<CallerStats>, AppError> {
        let date_condition = period.date_condition("r.created_date");
        let branch_filter = if branch_seq > 0 { " AND r.branch_seq = $2" } else { "" };
        let sql = format!(
            r#"
            SELECT COUNT(DISTINCT c.seq) AS total_customers,
                   COUNT(DISTINCT r.seq) AS reservation_confirm
            FROM (SELECT 1) dummy
            LEFT JOIN reservation_info r
                   ON r.caller = $1 AND {date_condition}{branch_filter}
            LEFT JOIN customers c ON r.customer_id = c.seq
            "#
        );

        let mut stats = Vec::with_capacity(CALLERS.len());
        for caller in CALLERS {
            let mut query = sqlx::query_as::<_, (i64, i64)>(&sql).bind(caller);
            if branch_seq > 0 {
                query = query.bind(branch_seq);
            }
            let (total_customers, reservation_confirm) = query.fetch_one(&self.pool).await?;

            let selection_count = self
                .get_caller_selection_count(branch_seq, caller, period)
                .await?;

            stats.push(CallerStats {
                caller: caller.to_string(),
                total_customers,
                reservation_confirm,
                confirm_rate: confirm_rate(reservation_confirm, selection_count),
                selection_count,
            });
        }

        tracing::info!(
            "CALLER 통계 조회 완료 - 지점: {}, {}개 슬롯",
            branch_seq,
            stats.len()
        );
        Ok(stats)
    }

    /// How often a caller slot was picked within the period.
    pub async fn get_caller_selection_count(
        &self,
        branch_seq: i32,
        caller: &str,
        period: Period,
    ) -> Result<i64, AppError> {
        let date_condition = period.date_condition("selected_date");
        let branch_filter = if branch_seq > 0 { " AND branch_seq = $2" } else { "" };
        let sql = format!(
            "SELECT COUNT(*) FROM caller_selection_history WHERE caller = $1 AND {date_condition}{branch_filter}"
        );

        let mut query = sqlx::query_scalar::<_, i64>(&sql).bind(caller);
        if branch_seq > 0 {
            query = query.bind(branch_seq);
        }
        Ok(query.fetch_one(&self.pool).await?)
    }

    /// Customers created today. branch_seq 0 means all branches.
    pub async fn get_today_total_customers(&self, branch_seq: i32) -> Result<i64, AppError> {
        let branch_filter = if branch_seq > 0 { " AND branch_seq = $1" } else { "" };
        let sql = format!(
            "SELECT COUNT(*) FROM customers WHERE created_date::date = CURRENT_DATE{branch_filter}"
        );

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if branch_seq > 0 {
            query = query.bind(branch_seq);
        }
        Ok(query.fetch_one(&self.pool).await?)
    }

    /// Today's acquisition breakdown; a missing ad_source shows as 미지정.
    pub async fn get_today_customers_by_ad_source(
        &self,
        branch_seq: i32,
    ) -> Result<Vec<AdSourceStats>, AppError> {
        let branch_filter = if branch_seq > 0 { " AND branch_seq = $1" } else { "" };
        let sql = format!(
            r#"
            SELECT COALESCE(ad_source, '미지정') AS ad_source, COUNT(*) AS count
            FROM customers
            WHERE created_date::date = CURRENT_DATE{branch_filter}
            GROUP BY ad_source
            ORDER BY count DESC
            "#
        );

        let mut query = sqlx::query_as::<_, AdSourceStats>(&sql);
        if branch_seq > 0 {
            query = query.bind(branch_seq);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    pub async fn get_today_walk_in_customers(&self, branch_seq: i32) -> Result<i64, AppError> {
        let branch_filter = if branch_seq > 0 { " AND branch_seq = $1" } else { "" };
        let sql = format!(
            "SELECT COUNT(*) FROM customers \
             WHERE created_date::date = CURRENT_DATE AND ad_source = 'walk_in'{branch_filter}"
        );

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if branch_seq > 0 {
            query = query.bind(branch_seq);
        }
        Ok(query.fetch_one(&self.pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing;

    // Live-database tests, see db::testing.

    #[tokio::test]
    #[ignore]
    async fn daily_stats_spine_covers_every_day() {
        let pool = testing::pool().await;
        let branch_seq = testing::create_branch(&pool).await;
        let repo = StatsRepository::new(pool.clone());

        // A branch with no activity still gets one row per day, zero counts.
        let stats = repo.get_daily_customer_stats(branch_seq, 7).await.unwrap();
        assert_eq!(stats.len(), 7);
        for day in &stats {
            assert_eq!(day.customer_count, 0);
            assert_eq!(day.reservation_count, 0);
        }
        for pair in stats.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }

        testing::delete_branch(&pool, branch_seq).await;
    }

    #[tokio::test]
    #[ignore]
    async fn caller_stats_always_report_all_sixteen_slots() {
        let pool = testing::pool().await;
        let branch_seq = testing::create_branch(&pool).await;
        let repo = StatsRepository::new(pool.clone());

        let stats = repo.get_caller_stats(branch_seq, Period::Week).await.unwrap();
        assert_eq!(stats.len(), CALLERS.len());
        for (slot, expected) in stats.iter().zip(CALLERS) {
            assert_eq!(slot.caller, *expected);
            assert!((0.0..=100.0).contains(&slot.confirm_rate));
            assert_eq!(slot.confirm_rate, 0.0);
        }

        testing::delete_branch(&pool, branch_seq).await;
    }
}
