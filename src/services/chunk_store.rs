use async_stream::try_stream;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

use crate::entities::{prelude::*, *};
use crate::models::FileRecord;
use crate::services::storage::{ReadHandle, StorageBackend, StorageError, WriteHandle};

/// Chunked blob store on top of the relational backend. Content lives in
/// fixed-size `file_chunks` rows; the `files` metadata row is written last,
/// so readers never see a file that is still streaming in.
pub struct ChunkStore {
    db: DatabaseConnection,
    chunk_size: usize,
}

impl ChunkStore {
    pub fn new(db: DatabaseConnection, chunk_size: usize) -> Self {
        Self {
            db,
            // The `files.chunk_size` column is i32; anything past that would
            // wrap when the record is written.
            chunk_size: chunk_size.clamp(1, i32::MAX as usize),
        }
    }
}

#[async_trait]
impl StorageBackend for ChunkStore {
    async fn open_write(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<Box<dyn WriteHandle>, StorageError> {
        Ok(Box::new(ChunkWriter {
            db: self.db.clone(),
            id: Uuid::new_v4().to_string(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            chunk_size: self.chunk_size,
            buf: Vec::with_capacity(self.chunk_size),
            seq: 0,
            length: 0,
            hasher: Sha256::new(),
            done: false,
        }))
    }

    async fn open_read(&self, id: &str) -> Result<ReadHandle, StorageError> {
        let model = Files::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        let total_chunks = if model.length == 0 {
            0
        } else {
            (model.length - 1) / model.chunk_size as i64 + 1
        };

        let db = self.db.clone();
        let file_id = model.id.clone();
        let stream = try_stream! {
            for seq in 0..total_chunks {
                let chunk = FileChunks::find_by_id((file_id.clone(), seq as i32))
                    .one(&db)
                    .await?
                    .ok_or_else(|| {
                        // Deleted out from under the reader; fail the stream
                        // rather than hand back a truncated file.
                        warn!("file {} lost chunk {} mid-read", file_id, seq);
                        StorageError::MissingChunk {
                            id: file_id.clone(),
                            seq: seq as i32,
                        }
                    })?;
                yield Bytes::from(chunk.data);
            }
        };

        Ok(ReadHandle {
            record: model.into(),
            stream: Box::pin(stream),
        })
    }

    async fn exists(&self, id: &str) -> Result<bool, StorageError> {
        Ok(Files::find_by_id(id).one(&self.db).await?.is_some())
    }

    async fn get_metadata(&self, id: &str) -> Result<FileRecord, StorageError> {
        Files::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Into::into)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn list(&self) -> Result<Vec<FileRecord>, StorageError> {
        let models = Files::find().all(&self.db).await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let txn = self.db.begin().await?;

        let res = Files::delete_by_id(id).exec(&txn).await?;
        if res.rows_affected == 0 {
            txn.rollback().await?;
            return Err(StorageError::NotFound(id.to_string()));
        }

        FileChunks::delete_many()
            .filter(file_chunks::Column::FileId.eq(id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }
}

/// One in-flight upload. Buffers up to `chunk_size`, persists each full
/// chunk as a row, and keeps a running hash and byte count.
struct ChunkWriter {
    db: DatabaseConnection,
    id: String,
    filename: String,
    content_type: String,
    chunk_size: usize,
    buf: Vec<u8>,
    seq: i32,
    length: i64,
    hasher: Sha256,
    done: bool,
}

impl ChunkWriter {
    async fn flush_chunk(&mut self) -> Result<(), StorageError> {
        let data = std::mem::replace(&mut self.buf, Vec::with_capacity(self.chunk_size));
        file_chunks::ActiveModel {
            file_id: Set(self.id.clone()),
            seq: Set(self.seq),
            data: Set(data),
        }
        .insert(&self.db)
        .await?;
        self.seq += 1;
        Ok(())
    }

    async fn discard_chunks(db: &DatabaseConnection, id: &str) -> Result<(), StorageError> {
        FileChunks::delete_many()
            .filter(file_chunks::Column::FileId.eq(id))
            .exec(db)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl WriteHandle for ChunkWriter {
    fn id(&self) -> &str {
        &self.id
    }

    async fn write(&mut self, mut data: &[u8]) -> Result<(), StorageError> {
        self.hasher.update(data);
        self.length += data.len() as i64;

        while !data.is_empty() {
            let room = self.chunk_size - self.buf.len();
            let take = room.min(data.len());
            self.buf.extend_from_slice(&data[..take]);
            data = &data[take..];

            if self.buf.len() == self.chunk_size {
                self.flush_chunk().await?;
            }
        }
        Ok(())
    }

    async fn finish(mut self: Box<Self>) -> Result<FileRecord, StorageError> {
        if !self.buf.is_empty() {
            self.flush_chunk().await?;
        }

        let hasher = std::mem::take(&mut self.hasher);
        let model = files::ActiveModel {
            id: Set(self.id.clone()),
            filename: Set(self.filename.clone()),
            content_type: Set(self.content_type.clone()),
            length: Set(self.length),
            chunk_size: Set(self.chunk_size as i32),
            upload_date: Set(Utc::now()),
            checksum: Set(hex::encode(hasher.finalize())),
        }
        .insert(&self.db)
        .await?;

        self.done = true;
        Ok(model.into())
    }

    async fn abort(mut self: Box<Self>) -> Result<(), StorageError> {
        self.done = true;
        Self::discard_chunks(&self.db, &self.id).await
    }
}

impl Drop for ChunkWriter {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        // Client went away mid-upload; reclaim staged chunks off-task. The
        // record was never written, so nothing is visible either way.
        let db = self.db.clone();
        let id = self.id.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(err) = ChunkWriter::discard_chunks(&db, &id).await {
                    warn!("failed to reclaim staged chunks for {}: {}", id, err);
                }
            });
        }
    }
}
