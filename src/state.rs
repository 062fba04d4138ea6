use std::sync::Arc;

use crate::{config::AppConfig, store::memory::MemoryStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            config,
        }
    }
}
