pub mod branch_repo;
pub mod customer_repo;
pub mod notice_repo;
pub mod reservation_repo;
pub mod sms_repo;
pub mod stats_repo;
pub mod template_repo;
pub mod user_repo;

pub use branch_repo::BranchRepository;
pub use customer_repo::CustomerRepository;
pub use notice_repo::NoticeRepository;
pub use reservation_repo::ReservationRepository;
pub use sms_repo::SmsRepository;
pub use stats_repo::StatsRepository;
pub use template_repo::TemplateRepository;
pub use user_repo::UserRepository;

/// Helpers for the live-database tests. Those tests are #[ignore]d; run them
/// against a disposable database with:
///
///   DATABASE_URL=postgres://... cargo test -- --ignored
#[cfg(test)]
pub(crate) mod testing {
    use sqlx::PgPool;

    pub async fn pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let pool = PgPool::connect(&url).await.expect("데이터베이스 연결 실패");
        sqlx::migrate!().run(&pool).await.expect("마이그레이션 실패");
        pool
    }

    /// Inserts a branch with a unique alias and returns its seq.
    pub async fn create_branch(pool: &PgPool) -> i32 {
        let alias = format!("테스트지점-{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default());
        sqlx::query_scalar(
            "INSERT INTO branches (branch_name, alias) VALUES ($1, $1) RETURNING seq",
        )
        .bind(alias)
        .fetch_one(pool)
        .await
        .expect("지점 생성 실패")
    }

    pub async fn delete_branch(pool: &PgPool, seq: i32) {
        sqlx::query("DELETE FROM branches WHERE seq = $1")
            .bind(seq)
            .execute(pool)
            .await
            .expect("지점 삭제 실패");
    }
}
