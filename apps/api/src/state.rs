use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::PipelineHandle;
use crate::storage::Storage;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Repository backend chosen at startup (in-memory or PostgreSQL).
    pub storage: Arc<dyn Storage>,
    /// Enqueue side of the bounded processing pool.
    pub pipeline: PipelineHandle,
    pub config: Config,
}
