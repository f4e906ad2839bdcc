use std::sync::Arc;

use crate::engine::DocumentEngine;

/// Shared application state, one per server, cloned into every worker.
#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<DocumentEngine>,
    pub config: Arc<AppConfig>,
}

/// Service knobs read from the environment at startup. Host and port are
/// read separately in `main`, they never travel with the state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub max_payload_bytes: usize,
    pub fetch_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            max_payload_bytes: 2_097_152, // 2MB of JSON is far beyond any real request
            fetch_timeout_ms: 10_000,
        }
    }
}

impl ApiState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let engine = DocumentEngine::with_http_fetcher(config.fetch_timeout_ms)?;
        Ok(ApiState { engine: Arc::new(engine), config: Arc::new(config) })
    }

    /// State over a caller-supplied engine, used by handler tests to swap in
    /// a stub image fetcher.
    pub fn with_engine(engine: DocumentEngine, config: AppConfig) -> Self {
        ApiState { engine: Arc::new(engine), config: Arc::new(config) }
    }
}
