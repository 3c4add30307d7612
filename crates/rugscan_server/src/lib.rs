//! HTTP surface for rugscan: report, download, news and client config routes.

mod error;
mod limiter;
mod routes;
mod state;

pub use error::ApiError;
pub use limiter::RateLimiter;
pub use routes::{caller_id, router, ReportResponse, ScanParams, API_KEY_HEADER};
pub use state::AppState;

use rugscan::RugscanConfig;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("client: {0}")]
    Client(#[from] rugscan::FetchError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Bind `config.bind` and serve until ctrl-c.
pub async fn serve(config: &RugscanConfig) -> Result<(), ServeError> {
    if config.uses_default_secret() {
        warn!("CLIENT_SERVER_API_KEY not set; using the built-in development secret");
    }
    let state = Arc::new(AppState::from_config(config)?);
    spawn_limiter_sweep(state.clone(), config.rate_limit_window());

    let listener = TcpListener::bind(&config.bind).await?;
    info!(addr = %listener.local_addr()?, "rugscan listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}

fn spawn_limiter_sweep(state: Arc<AppState>, every: Duration) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every.max(Duration::from_secs(1)));
        loop {
            tick.tick().await;
            let dropped = state.limiter.purge_at(Instant::now());
            let expired = state.cache.purge_expired();
            if dropped + expired > 0 {
                tracing::debug!(dropped, expired, "swept limiter and cache");
            }
        }
    });
}
