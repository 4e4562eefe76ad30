//! Dashboard HTTP servers
//!
//! Both dashboard variants are axum applications over one shared, swappable
//! event log. The minimal variant serves headline metrics; the enhanced
//! variant adds bottleneck, pattern and conformance panels, a process map and
//! CSV or XES upload.

pub mod pages;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::core::constants::{dataset, defaults};
use crate::core::error::{EpmError, Result};
use crate::core::types::DashboardVariant;
use crate::dataset::resolve_dashboard_source;
use crate::render::GraphvizRenderer;
use crate::reporting::logging;

// Re-export commonly used items
pub use routes::router;
pub use state::{AppState, LoadedLog, SharedState};

/// How to start one dashboard.
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub variant: DashboardVariant,
    /// Defaults to the variant's fixed port
    pub port: Option<u16>,
    pub host: String,
    /// Dataset directory or CSV log
    pub data: Option<String>,
    pub dot_binary: String,
}

impl DashboardOptions {
    pub fn new(variant: DashboardVariant) -> Self {
        Self {
            variant,
            port: None,
            host: "127.0.0.1".to_string(),
            data: None,
            dot_binary: defaults::DOT_BINARY.to_string(),
        }
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.variant.port())
    }
}

/// Load the dashboard's data and build its state. Load errors end up on the
/// page, never here.
pub fn build_state(options: &DashboardOptions) -> SharedState {
    let source = resolve_dashboard_source(
        options.data.as_deref(),
        std::env::var(dataset::DATA_ENV_VAR).ok(),
    );
    let loaded = LoadedLog::load(&source);
    if loaded.error.is_none() {
        logging::log_dashboard_data(options.variant.name(), source.path(), loaded.log.len());
    }
    // The process map is always SVG; the render format only applies to the pipeline
    let renderer = GraphvizRenderer::new(&options.dot_binary, "svg");
    AppState::new(options.variant, options.port(), renderer, loaded)
}

pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    let addr = format!("{host}:{port}");
    TcpListener::bind(&addr)
        .await
        .map_err(|e| EpmError::Server(format!("Could not bind {addr}: {e}")))
}

/// Serve a dashboard on an already bound listener until Ctrl-C.
pub async fn serve(listener: TcpListener, state: SharedState) -> Result<()> {
    let app = router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| EpmError::Server(e.to_string()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        logging::log_error("Could not listen for Ctrl-C", Some(&e));
        std::future::pending::<()>().await;
    }
}

/// Bind, announce and serve one dashboard.
pub async fn run_dashboard(options: &DashboardOptions) -> Result<()> {
    let state = build_state(options);
    let listener = bind(&options.host, options.port()).await?;
    let addr: SocketAddr = listener.local_addr()?;
    println!(
        "{} dashboard running at http://{addr} (Ctrl-C to stop)",
        options.variant
    );
    serve(listener, state).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default_port() {
        let mut options = DashboardOptions::new(DashboardVariant::Enhanced);
        assert_eq!(options.port(), 8502);
        options.port = Some(9000);
        assert_eq!(options.port(), 9000);
        assert_eq!(DashboardOptions::new(DashboardVariant::Minimal).port(), 8501);
    }

    #[test]
    fn test_build_state_records_load_error() {
        let mut options = DashboardOptions::new(DashboardVariant::Minimal);
        options.data = Some("/nonexistent/epm.csv".to_string());
        let state = build_state(&options);
        assert_eq!(state.port, 8501);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let data = runtime.block_on(async { state.data().await.clone() });
        assert!(data.error.is_some());
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let listener = bind("127.0.0.1", 0).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
