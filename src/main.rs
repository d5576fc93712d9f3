// src/main.rs

use std::{net::SocketAddr, sync::Arc, time::Duration};

use dotenvy::dotenv;
use quiz_reports::{
    config::Config, routes, state::AppState, store::PgDocumentStore, utils::jwt::JwtVerifier,
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_BACKOFF: Duration = Duration::from_secs(2);

/// Stdout plus a daily-rolling `logs/quiz_reports.log`.
/// The returned guard must live as long as the process.
fn init_tracing(config: &Config) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily("logs", "quiz_reports.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::new(&config.rust_log))
        .with(fmt::layer().with_writer(std::io::stdout).with_target(false))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();

    guard
}

/// The database container may come up after us; retry a few times.
async fn connect_with_retry(database_url: &str) -> PgPool {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let result = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await;

        match result {
            Ok(pool) => return pool,
            Err(e) if attempt >= CONNECT_ATTEMPTS => {
                panic!("Database unreachable after {} attempts: {}", attempt, e);
            }
            Err(e) => {
                tracing::warn!(
                    "Database not ready (attempt {}/{}): {}",
                    attempt,
                    CONNECT_ATTEMPTS,
                    e
                );
                tokio::time::sleep(CONNECT_BACKOFF).await;
            }
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config);

    let pool = connect_with_retry(&config.database_url).await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Document store ready");

    if config.admin_emails.is_empty() {
        tracing::warn!("ADMIN_EMAILS is empty; report endpoints will reject every caller");
    }
    if let Some(domain) = &config.allowed_email_domain {
        tracing::info!("Answer submission limited to @{} accounts", domain);
    }

    let state = AppState {
        store: Arc::new(PgDocumentStore::new(pool)),
        verifier: Arc::new(JwtVerifier::new(config.jwt_secret.clone())),
        config: config.clone(),
    };
    let app = routes::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {}: {}", addr, e));
    tracing::info!("Quiz reports backend listening on {}", addr);

    axum::serve(listener, app).await.expect("Server error");
}
