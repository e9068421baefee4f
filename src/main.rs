use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tokio::net::TcpListener;

mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_middleware;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new()
        .await
        .expect("애플리케이션 상태 초기화 실패");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("데이터베이스 마이그레이션 실패");

    tracing::info!("데이터베이스 마이그레이션 완료");

    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route(
            "/me",
            get(handlers::auth::get_me).layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                auth_middleware,
            )),
        );

    let branch_routes = Router::new()
        .route(
            "/",
            get(handlers::branches::list_branches).post(handlers::branches::create_branch),
        )
        .route("/options", get(handlers::branches::branch_options))
        .route(
            "/{seq}",
            get(handlers::branches::get_branch)
                .put(handlers::branches::update_branch)
                .delete(handlers::branches::delete_branch),
        );

    let customer_routes = Router::new()
        .route(
            "/",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route("/comment", patch(handlers::customers::update_comment))
        .route("/name", patch(handlers::customers::update_name))
        .route("/status", patch(handlers::customers::update_status))
        .route("/process-call", post(handlers::customers::process_call))
        .route("/reservation", post(handlers::customers::create_reservation))
        .route("/{seq}", delete(handlers::customers::delete_customer));

    let notice_routes = Router::new()
        .route(
            "/",
            get(handlers::notices::list_notices).post(handlers::notices::create_notice),
        )
        .route(
            "/{seq}",
            get(handlers::notices::get_notice)
                .put(handlers::notices::update_notice)
                .delete(handlers::notices::delete_notice),
        );

    let template_routes = Router::new()
        .route(
            "/",
            get(handlers::templates::list_templates).post(handlers::templates::create_template),
        )
        .route(
            "/{seq}",
            axum::routing::put(handlers::templates::update_template)
                .delete(handlers::templates::delete_template),
        )
        .route(
            "/{seq}/set-default",
            post(handlers::templates::set_default_template),
        );

    let sms_routes = Router::new()
        .route("/send", post(handlers::sms::send_sms))
        .route(
            "/config",
            get(handlers::sms::get_sms_config).post(handlers::sms::save_sms_config),
        )
        .route("/remaining", get(handlers::sms::check_remaining));

    let stats_routes = Router::new()
        .route("/daily", get(handlers::stats::daily_stats))
        .route("/callers", get(handlers::stats::caller_stats))
        .route("/today", get(handlers::stats::today_stats));

    // Admin API surface, everything behind the bearer-token guard.
    let admin_api = Router::new()
        .nest("/branches", branch_routes)
        .nest("/customers", customer_routes)
        .nest("/notices", notice_routes)
        .nest("/message-templates", template_routes)
        .nest("/sms", sms_routes)
        .nest("/stats", stats_routes)
        .route("/placeholders", get(handlers::templates::list_placeholders))
        .route(
            "/reservation-sms-config",
            get(handlers::templates::get_reservation_sms_config)
                .post(handlers::templates::save_reservation_sms_config),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    // Public surfaces: ad landing, consultation, external ad-platform
    // callback, public board.
    let landing_routes = Router::new()
        .route("/kakao/login", get(handlers::landing::kakao_login))
        .route("/kakao/callback", get(handlers::landing::kakao_callback))
        .route("/success", get(handlers::landing::kakao_success))
        .route("/error", get(handlers::landing::kakao_error));

    let board_routes = Router::new()
        .route("/notices", get(handlers::board::list_notices))
        .route("/notices/{seq}", get(handlers::board::get_notice))
        .route("/kakao/login", get(handlers::board::kakao_login))
        .route("/kakao/callback", get(handlers::board::kakao_callback))
        .route("/mypage/{seq}", get(handlers::board::mypage))
        .route("/withdraw/{seq}", delete(handlers::board::withdraw));

    let app = Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", admin_api)
        .nest("/ad", landing_routes)
        .nest("/board", board_routes)
        .route(
            "/consultation/submit",
            post(handlers::landing::submit_consultation),
        )
        .route(
            "/api/external/customers",
            get(handlers::landing::register_external_customer),
        )
        .with_state(app_state);

    let listener = TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("8080 포트 바인딩 실패");

    tracing::info!("서버 시작 - http://0.0.0.0:8080");

    axum::serve(listener, app).await.expect("서버 실행 실패");
}
