use std::sync::Arc;

use themis_chat::ChatOrchestrator;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The orchestrator is cheap to clone; its caches and storage handles are shared.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub chat: ChatOrchestrator,
}

impl AppState {
    pub fn new(config: Config, chat: ChatOrchestrator) -> Self {
        Self {
            config: Arc::new(config),
            chat,
        }
    }
}
