use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        BranchRepository, CustomerRepository, NoticeRepository, ReservationRepository,
        SmsRepository, StatsRepository, TemplateRepository, UserRepository,
    },
    services::{auth::AuthService, kakao::KakaoService, sms::SmsService},
};

/// SMS gateway settings. One typed struct per integration instead of a
/// dynamic config map.
#[derive(Clone)]
pub struct SmsSettings {
    pub api_base_url: String,
    pub sms_endpoint: String,
    pub lms_endpoint: String,
    /// local/test environments skip the network and return a canned success.
    pub mock_mode: bool,
}

#[derive(Clone)]
pub struct KakaoSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

// Shared state handed to every handler. Repositories and services are
// constructed once here and cloned cheaply (they only hold pool handles).
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,

    pub branch_repo: BranchRepository,
    pub customer_repo: CustomerRepository,
    pub reservation_repo: ReservationRepository,
    pub notice_repo: NoticeRepository,
    pub template_repo: TemplateRepository,
    pub sms_repo: SmsRepository,
    pub stats_repo: StatsRepository,

    pub auth_service: AuthService,
    pub sms_service: SmsService,
    pub kakao_service: KakaoService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;

        // Bounded pool: 25 open / 5 idle, matching the legacy deployment.
        // A failed connect here is a hard startup error; main aborts.
        let db_pool = PgPoolOptions::new()
            .max_connections(25)
            .min_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("데이터베이스 연결 성공");

        let sms_settings = SmsSettings {
            api_base_url: env::var("SMS_API_BASE_URL")
                .unwrap_or_else(|_| "https://www.mymunja.co.kr".to_string()),
            sms_endpoint: env::var("SMS_SEND_ENDPOINT")
                .unwrap_or_else(|_| "/Remote/RemoteSms.html".to_string()),
            lms_endpoint: env::var("LMS_SEND_ENDPOINT")
                .unwrap_or_else(|_| "/Remote/RemoteMms.html".to_string()),
            mock_mode: matches!(env::var("APP_ENV").as_deref(), Ok("local") | Ok("test")),
        };

        let kakao_settings = KakaoSettings {
            client_id: env::var("KAKAO_CLIENT_ID").unwrap_or_default(),
            client_secret: env::var("KAKAO_CLIENT_SECRET").unwrap_or_default(),
            redirect_uri: env::var("KAKAO_REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:8080/ad/kakao/callback".to_string()),
        };

        let user_repo = UserRepository::new(db_pool.clone());
        let sms_repo = SmsRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, jwt_secret);
        let sms_service = SmsService::new(sms_settings, sms_repo.clone());
        let kakao_service = KakaoService::new(kakao_settings);

        Ok(Self {
            branch_repo: BranchRepository::new(db_pool.clone()),
            customer_repo: CustomerRepository::new(db_pool.clone()),
            reservation_repo: ReservationRepository::new(db_pool.clone()),
            notice_repo: NoticeRepository::new(db_pool.clone()),
            template_repo: TemplateRepository::new(db_pool.clone()),
            sms_repo,
            stats_repo: StatsRepository::new(db_pool.clone()),
            auth_service,
            sms_service,
            kakao_service,
            db_pool,
        })
    }
}
