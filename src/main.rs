use std::sync::Arc;

use anyhow::Context;
use axum::extract::Request;
use axum::ServiceExt;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::normalize_path::NormalizePath;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use hr_backend::config::Config;
use hr_backend::db::memory::MemoryRepository;
use hr_backend::db::pool::get_db_pool;
use hr_backend::db::postgres::PgRepository;
use hr_backend::db::repository::SharedRepository;
use hr_backend::AppState;

/// Console logging, plus a daily rolling file when `LOG_DIR` is set. The
/// returned guard must live as long as the process.
fn init_tracing(config: &Config) -> anyhow::Result<Option<WorkerGuard>> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_target(true);

    match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::daily(dir, "app.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            builder.with_ansi(false).with_writer(non_blocking).init();
            Ok(Some(guard))
        }
        None => {
            builder.init();
            Ok(None)
        }
    }
}

async fn build_repository(config: &Config) -> anyhow::Result<SharedRepository> {
    match &config.database_url {
        Some(url) => {
            let pool = get_db_pool(url, config.max_connections)
                .await
                .context("Failed to connect to the database")?;
            Ok(Arc::new(PgRepository::new(pool)))
        }
        None => {
            warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            Ok(Arc::new(MemoryRepository::new()))
        }
    }
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down..."),
        Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;
    let _guard = init_tracing(&config)?;

    if config.auth_disabled {
        warn!("AUTH_DISABLED is set, every caller is treated as an administrator");
    }
    info!("Employee IDs use the {:?} strategy", config.employee_id_strategy);

    let repo = build_repository(&config).await?;
    let addr = config.bind_addr;
    let app = hr_backend::app(AppState::new(repo, config));
    let app = NormalizePath::trim_trailing_slash(app);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server encountered an error")?;

    info!("Shutdown complete.");
    Ok(())
}
