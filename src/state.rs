use std::sync::Arc;

use crate::store::RecordStore;

/// Shared handler state. The store is chosen once at startup (Postgres or fixture) and
/// handed to every request through axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: impl RecordStore + 'static) -> Self {
        Self { store: Arc::new(store) }
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").field("store", &self.store.kind()).finish()
    }
}
