pub mod chunk_store;
pub mod events;
pub mod storage;
