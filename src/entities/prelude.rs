pub use super::file_chunks::Entity as FileChunks;
pub use super::files::Entity as Files;
