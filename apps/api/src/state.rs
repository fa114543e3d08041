use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The configured model client. A trait object so tests can swap in a stub.
    pub llm: Arc<dyn TextGenerator>,
    pub config: Config,
}
