use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::info;

use crate::config::ServerConfig;
use crate::services::chunk_store::ChunkStore;
use crate::services::storage::StorageBackend;

pub fn setup_storage(db: DatabaseConnection, config: &ServerConfig) -> Arc<dyn StorageBackend> {
    info!(
        "🧱 Chunk store ready ({} KiB chunks)",
        config.chunk_size / 1024
    );
    Arc::new(ChunkStore::new(db, config.chunk_size))
}
