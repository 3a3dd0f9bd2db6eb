use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use taskbuddy_api::devices;
use taskbuddy_api::state::AppState;
use taskbuddy_api::webhook;
use taskbuddy_push::{Dispatcher, ExpoRelay};

const DEFAULT_PUSH_URL: &str = "https://exp.host/--/api/v2/push/send";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskbuddy=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let host = std::env::var("TASKBUDDY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("TASKBUDDY_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let db_path = std::env::var("TASKBUDDY_DB_PATH").unwrap_or_else(|_| "taskbuddy.db".into());
    let push_url = std::env::var("TASKBUDDY_PUSH_URL").unwrap_or_else(|_| DEFAULT_PUSH_URL.into());
    let push_timeout_secs: u64 = std::env::var("TASKBUDDY_PUSH_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);
    let push_concurrency: usize = std::env::var("TASKBUDDY_PUSH_CONCURRENCY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(16);

    // Init device registry
    let db = Arc::new(taskbuddy_db::Database::open(&PathBuf::from(&db_path))?);

    // Push relay + fan-out dispatcher
    let timeout = Duration::from_secs(push_timeout_secs);
    let relay = ExpoRelay::new(push_url.clone(), timeout)?;
    let dispatcher = Dispatcher::new(relay, push_concurrency, timeout);
    info!(push_url, push_concurrency, "push dispatcher ready");

    let state = AppState { db, dispatcher };

    // Routes
    let app = Router::new()
        .route("/tasksInsert", post(webhook::tasks_insert))
        .route("/devices/{token}", put(devices::bind_device))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("TaskBuddy notification server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
