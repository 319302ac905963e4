mod error;
mod handlers;
mod models;
mod router;
mod state;

use anyhow::{anyhow, Context};
use handlers::ws::WsHub;
use market_data::ObserverSink;
use persistence::{replay, Wal};
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_WS_PORT: u16 = 9002;
const WAL_PATH: &str = "./data/wal.jsonl";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Positional args: [http_port=8080] [ws_port=9002]
    let args: Vec<String> = std::env::args().collect();
    let http_port: u16 = match args.get(1) {
        Some(arg) => arg.parse().context("invalid http port")?,
        None => DEFAULT_HTTP_PORT,
    };
    let ws_port: u16 = match args.get(2) {
        Some(arg) => arg.parse().context("invalid ws port")?,
        None => DEFAULT_WS_PORT,
    };

    let wal_path = PathBuf::from(WAL_PATH);
    info!(path = %wal_path.display(), "replaying event log");
    let replayed = replay(&wal_path).map_err(|e| anyhow!("WAL replay failed: {e}"))?;
    let wal = Wal::open(&wal_path).map_err(|e| anyhow!("cannot open WAL: {e}"))?;

    let hub = Arc::new(WsHub::new());
    let sink: Arc<dyn ObserverSink> = hub.clone();
    let engine = Arc::new(engine::recover(wal, sink, replayed));
    let app_state = AppState::new(engine.clone(), hub);

    let http_addr = SocketAddr::from(([0, 0, 0, 0], http_port));
    let ws_addr = SocketAddr::from(([0, 0, 0, 0], ws_port));
    let http_listener = TcpListener::bind(http_addr).await?;
    let ws_listener = TcpListener::bind(ws_addr).await?;

    info!(%http_addr, "HTTP API listening");
    info!(%ws_addr, "observer WebSocket listening");

    let ws_app = router::create_ws_router(app_state.clone());
    let ws_server = tokio::spawn(async move {
        axum::serve(ws_listener, ws_app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    });

    let app = router::create_router(app_state);
    axum::serve(http_listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The request boundary is closed; drain fan-out and the WAL
    ws_server.await??;
    engine.shutdown();
    info!("clean shutdown");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}
