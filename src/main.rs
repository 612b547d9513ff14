mod analysis;
mod app;
mod artworks;
mod catalog;
mod config;
mod matching;
mod search;
mod state;
mod vision;

use crate::analysis::{repo, worker::WorkerPool};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "atelie_match=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&app_state.db).await {
        tracing::warn!(error = %e, "migrations failed; continuing");
    }

    match repo::requeue_stale(&app_state.db).await {
        Ok(0) => {}
        Ok(n) => tracing::info!(requeued = n, "requeued analyses left in processing"),
        Err(e) => tracing::warn!(error = %e, "failed to requeue stale analyses"),
    }

    let addr = app_state.config.bind_addr()?;
    let workers = WorkerPool::spawn(app_state.clone());
    let app = app::build_app(app_state);
    let served = app::serve(app, addr, app::shutdown_signal()).await;

    workers.shutdown().await;
    served
}
