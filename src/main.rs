mod config;
mod domain;
mod middleware;
mod services;
mod state;
mod store;
mod time_utils;
mod web;

use crate::config::Config;
use crate::services::weather::WeatherClient;
use crate::state::SharedState;
use crate::store::{MemoryReportStore, PgReportStore, ReportStore};
use crate::time_utils::now_millis;
use axum::Router;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let mut listener_task = None;
    let store: Arc<dyn ReportStore> = match config.database_url.as_deref() {
        Some(url) => {
            let store = PgReportStore::connect(url, config.db_max_connections).await?;
            listener_task = Some(store.spawn_listener());
            store as Arc<dyn ReportStore>
        }
        None => {
            tracing::warn!("DATABASE_URL not set, reports are kept in memory only");
            Arc::new(MemoryReportStore::new())
        }
    };

    let weather = WeatherClient::new(&config.weather_api_url, config.weather_timeout)?;
    let prune_schedule = config.prune_schedule.clone();
    let bind_addr = config.bind_addr.clone();
    let shared: SharedState = Arc::new(state::AppState::new(config, store.clone(), weather));

    // The process-wide board follows the store for as long as the server runs.
    let board_feed = shared.board.attach(store.subscribe());

    let mut scheduler = JobScheduler::new().await?;

    let shared_for_prune = shared.clone();
    scheduler
        .add(Job::new_async(prune_schedule.as_str(), move |_uuid, _l| {
            let state = shared_for_prune.clone();
            Box::pin(async move {
                let expired = state.board.prune(now_millis()).await;
                if expired > 0 {
                    tracing::info!("Pruned {} expired reports", expired);
                }
            })
        })?)
        .await?;

    // Housekeeping - rate limiter buckets and idle driver sessions, hourly
    let shared_for_cleanup = shared.clone();
    scheduler
        .add(Job::new_async("0 0 * * * *", move |_uuid, _l| {
            let state = shared_for_cleanup.clone();
            Box::pin(async move {
                let buckets = state.report_limiter.cleanup().await;
                let sessions = state.expire_sessions(now_millis()).await;
                if buckets > 0 || sessions > 0 {
                    tracing::info!(
                        "Cleaned up {} rate limit buckets and {} idle sessions",
                        buckets,
                        sessions
                    );
                }
            })
        })?)
        .await?;

    scheduler.start().await?;
    tracing::info!("Scheduler started:");
    tracing::info!("  - Report pruning: {}", prune_schedule);
    tracing::info!("  - Session cleanup: hourly");

    let app = Router::new()
        .merge(web::routes(shared.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Listening on {bind_addr} ({} store)", store.backend());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down");
    scheduler.shutdown().await?;
    board_feed.shutdown().await;
    if let Some(task) = listener_task {
        task.abort();
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
