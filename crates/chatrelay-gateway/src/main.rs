//! chatrelay gateway
//!
//! - WebSocket endpoint: `gateway.ws_path` (default `/ws`)
//! - Presence + broadcast relay in one process, in memory
//! - Graceful shutdown on Ctrl-C / SIGTERM

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chatrelay_core::error::{RelayError, Result};
use chatrelay_gateway::{app_state, config, router};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load_from_env()?;
    let listen = cfg.gateway.listen_addr()?;
    let ws_path = cfg.gateway.ws_path.clone();

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| RelayError::Internal(format!("bind {listen} failed: {e}")))?;

    tracing::info!(%listen, %ws_path, "chatrelay-gateway starting");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| RelayError::Internal(format!("server failed: {e}")))?;

    tracing::info!("chatrelay-gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
