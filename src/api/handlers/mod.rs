pub mod download;
pub mod events;
pub mod files;
pub mod health;
pub mod upload;
