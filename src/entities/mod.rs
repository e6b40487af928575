pub mod prelude;

pub mod file_chunks;
pub mod files;
