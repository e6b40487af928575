use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

use crate::models::FileRecord;

/// Chunk stream produced by a read handle.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("no file stored under id {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("file {id} lost chunk {seq} mid-read")]
    MissingChunk { id: String, seq: i32 },
}

/// Sink side of one in-flight upload. Bytes are persisted chunk by chunk as
/// they arrive; the record becomes visible only after `finish` returns.
#[async_trait]
pub trait WriteHandle: Send {
    /// Identifier the record will be stored under.
    fn id(&self) -> &str;

    /// Append bytes, flushing full chunks to the backing store.
    async fn write(&mut self, data: &[u8]) -> Result<(), StorageError>;

    /// Flush the tail chunk and finalize the record (length, checksum,
    /// upload date). This is the visibility point.
    async fn finish(self: Box<Self>) -> Result<FileRecord, StorageError>;

    /// Discard everything staged so far. Dropping an unfinished handle has
    /// the same effect, best-effort.
    async fn abort(self: Box<Self>) -> Result<(), StorageError>;
}

/// Source side of one retrieval: the record plus its content stream.
pub struct ReadHandle {
    pub record: FileRecord,
    pub stream: ByteStream,
}

/// The storage seam. Everything above it talks records and byte streams;
/// how content is chunked and persisted stays behind this trait.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Allocate an identifier and open a sink for a new file.
    async fn open_write(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<Box<dyn WriteHandle>, StorageError>;

    /// Open a chunk stream for a stored file, `NotFound` if absent.
    async fn open_read(&self, id: &str) -> Result<ReadHandle, StorageError>;

    async fn exists(&self, id: &str) -> Result<bool, StorageError>;

    /// Record metadata without the content, `NotFound` if absent.
    async fn get_metadata(&self, id: &str) -> Result<FileRecord, StorageError>;

    /// All finalized records, in no particular order.
    async fn list(&self) -> Result<Vec<FileRecord>, StorageError>;

    /// Remove the record and its chunks, `NotFound` if absent. Safe against
    /// concurrent reads of the same id: those finish or fail cleanly.
    async fn delete(&self, id: &str) -> Result<(), StorageError>;
}
