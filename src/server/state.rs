use std::sync::Arc;

use tokio::sync::RwLock;

use crate::core::types::DashboardVariant;
use crate::dataset::{DataSource, EventLog, EventLogFormat};
use crate::render::GraphvizRenderer;
use crate::reporting::logging;

/// The event log a dashboard currently serves.
///
/// A failed load leaves an empty log and keeps the message for the page.
/// Cloning shares the log, so handlers can take a snapshot and release the
/// lock before computing.
#[derive(Debug, Clone, Default)]
pub struct LoadedLog {
    pub log: Arc<EventLog>,
    /// Path or `upload`
    pub source: String,
    pub error: Option<String>,
}

impl LoadedLog {
    pub fn load(source: &DataSource) -> Self {
        let label = source.path().display().to_string();
        match source.load() {
            Ok(log) => Self {
                log: Arc::new(log),
                source: label,
                error: None,
            },
            Err(e) => {
                logging::log_warning(&format!("Could not load {label}: {e}"));
                Self {
                    log: Arc::default(),
                    source: label,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Parse an uploaded CSV or XES body, picking the format from the
    /// content type or the body itself.
    pub fn from_upload(body: &str, content_type: Option<&str>) -> crate::core::Result<Self> {
        let format = EventLogFormat::detect(content_type, body);
        Ok(Self {
            log: Arc::new(format.parse(body)?),
            source: "upload".to_string(),
            error: None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}

/// Shared state of one dashboard server.
pub struct AppState {
    pub variant: DashboardVariant,
    pub port: u16,
    pub renderer: GraphvizRenderer,
    data: RwLock<LoadedLog>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        variant: DashboardVariant,
        port: u16,
        renderer: GraphvizRenderer,
        data: LoadedLog,
    ) -> SharedState {
        Arc::new(Self {
            variant,
            port,
            renderer,
            data: RwLock::new(data),
        })
    }

    pub async fn data(&self) -> tokio::sync::RwLockReadGuard<'_, LoadedLog> {
        self.data.read().await
    }

    /// The current log, with the lock already released.
    pub async fn snapshot(&self) -> LoadedLog {
        self.data.read().await.clone()
    }

    /// Swap in a new log; readers see either the old or the new one.
    pub async fn replace(&self, data: LoadedLog) {
        *self.data.write().await = data;
    }
}
