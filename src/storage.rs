use std::sync::Arc;

use crate::config::{BackendKind, StorageConfig};

// Re-export core storage types so callers only need crate::storage::*
pub use spendlog_core::storage::{StorageBackend, StorageError};
pub use spendlog_memory::InMemoryStorage;
pub use spendlog_sqlite::SqliteStorage;

/// Opens the configured backend. The returned handle owns the connection until dropped.
pub fn open_storage(config: &StorageConfig) -> Result<Arc<dyn StorageBackend>, StorageError> {
    match config.backend {
        BackendKind::Sqlite => {
            tracing::info!(path = %config.path, "Opening SQLite expense store");
            Ok(Arc::new(SqliteStorage::new(&config.path)?))
        }
        BackendKind::Memory => {
            tracing::info!("Using in-memory expense store");
            let storage = InMemoryStorage::new();
            storage.initialize()?;
            Ok(Arc::new(storage))
        }
    }
}
