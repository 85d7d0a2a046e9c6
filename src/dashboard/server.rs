use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::api::{self, AppState};
use crate::config::{DEFAULT_DASHBOARD_HOST, DEFAULT_DASHBOARD_PORT, DEFAULT_DB_PATH};
use crate::memory::MemoryBank;
use crate::ui::output;

/// Configuration for the dashboard server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Open the dashboard in the default browser once bound.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DASHBOARD_HOST.to_string(),
            port: DEFAULT_DASHBOARD_PORT,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            open_browser: false,
        }
    }
}

/// Build the dashboard router around an existing store.
pub fn build_router(bank: MemoryBank) -> Router {
    let state = Arc::new(AppState {
        db_label: bank.path().display().to_string(),
        bank,
    });
    api::api_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the dashboard and serve until Ctrl-C.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let bank = MemoryBank::open(&config.db_path).context("Failed to open memory bank")?;
    let app = build_router(bank);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let url = format!("http://{}", listener.local_addr()?);
    tracing::info!(%url, db = %config.db_path.display(), "dashboard listening");
    output::info(&format!("Dashboard running at {}", url));
    output::info("Press Ctrl+C to stop");

    if config.open_browser {
        if let Err(e) = open::that(&url) {
            output::warning(&format!("Could not open browser: {}", e));
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    output::info("Dashboard stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::db::test_bank;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert_eq!(config.db_path, PathBuf::from("memory_bank.db"));
        assert!(!config.open_browser);
    }

    #[tokio::test]
    async fn test_router_serves_health_with_trace_layer() {
        let (_dir, bank) = test_bank();
        let app = build_router(bank);
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (_dir, bank) = test_bank();
        let app = build_router(bank);
        let request = Request::builder()
            .uri("/api/stories")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_start_requires_existing_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ServerConfig {
            port: 0,
            db_path: dir.path().join("missing.db"),
            ..ServerConfig::default()
        };
        let err = start_server(config).await.unwrap_err();
        assert!(format!("{err:#}").contains("clide init"));
    }
}
