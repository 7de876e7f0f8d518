//! Server lifecycle — bind, serve, shut down.
//!
//! `serve` runs the router in the foreground until ctrl-c (the binary's
//! path); `start_server` spawns it in a background task and returns a handle
//! with a shutdown channel (the tests' path).

use std::net::SocketAddr;

use tokio::sync::oneshot;

use crate::api::router::app_router;
use crate::api::types::ApiContext;

/// Handle to a background server instance.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Shut down the server gracefully. Safe to call twice.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("server shutdown signal sent");
        }
    }
}

/// Serve in the foreground until ctrl-c.
pub async fn serve(ctx: ApiContext, addr: SocketAddr) -> Result<(), String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {addr}: {e}"))?;

    let local = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;
    tracing::info!(addr = %local, "ECG report service listening");

    axum::serve(listener, app_router(ctx))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await
        .map_err(|e| format!("Server error: {e}"))
}

/// Bind and serve in a background task; returns a handle for shutdown.
pub async fn start_server(ctx: ApiContext, addr: SocketAddr) -> Result<ApiServer, String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {addr}: {e}"))?;

    let local = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("server received shutdown signal");
        };

        tracing::info!(addr = %local, "ECG report service started");

        if let Err(e) = axum::serve(listener, app_router(ctx))
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("server error: {e}");
        }

        tracing::info!("server stopped");
    });

    Ok(ApiServer {
        addr: local,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::inference::MockDiagnoser;
    use crate::models::{ClassificationResult, DiagnosisLabel};
    use crate::narrative::MockNarrator;

    fn test_ctx(upload_dir: &std::path::Path) -> ApiContext {
        let upload_dir = upload_dir.display().to_string();
        let config = Config::from_vars(|key| match key {
            "GEMINI_API_KEY" => Some("test-key".to_string()),
            "ECG_UPLOAD_DIR" => Some(upload_dir.clone()),
            _ => None,
        })
        .unwrap();
        ApiContext::new(
            Arc::new(config),
            Arc::new(MockDiagnoser::returning(ClassificationResult {
                label: DiagnosisLabel::Normal,
                confidence: 97.5,
            })),
            Arc::new(MockNarrator::returning("All clear.")),
        )
    }

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let spool = tempfile::tempdir().unwrap();
        let mut server = start_server(test_ctx(spool.path()), loopback())
            .await
            .expect("server should start");
        assert!(server.addr.port() > 0);

        let url = format!("http://{}/", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert!(!resp.text().await.unwrap().is_empty());

        server.shutdown();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn unknown_route_returns_404_over_http() {
        let spool = tempfile::tempdir().unwrap();
        let mut server = start_server(test_ctx(spool.path()), loopback())
            .await
            .expect("server should start");

        let url = format!("http://{}/nonexistent", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

        server.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let spool = tempfile::tempdir().unwrap();
        let mut server = start_server(test_ctx(spool.path()), loopback())
            .await
            .expect("server should start");

        server.shutdown();
        server.shutdown();
    }
}
