use std::env;
use std::path::PathBuf;

/// Runtime configuration for the file store
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Backing store connection URL (default: local SQLite file)
    pub database_url: String,

    /// Root directory holding the staging directories (default: ".")
    pub workspace_dir: PathBuf,

    /// Chunk size for the backing store in bytes (default: 255 KiB)
    pub chunk_size: usize,

    /// Maximum accepted upload body size in bytes (default: 256 MB)
    pub max_upload_size: usize,

    /// Broadcast buffer per observer in events (default: 256)
    pub event_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://blobcast.db?mode=rwc".to_string(),
            workspace_dir: PathBuf::from("."),
            chunk_size: 255 * 1024, // 255 KiB
            max_upload_size: 256 * 1024 * 1024, // 256 MB
            event_buffer: 256,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),

            workspace_dir: env::var("WORKSPACE_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.workspace_dir),

            chunk_size: env::var("CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default.chunk_size),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),

            event_buffer: env::var("EVENT_BUFFER")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default.event_buffer),
        }
    }

    /// Create config for development and tests (small chunks so multi-chunk
    /// paths are exercised with small payloads)
    pub fn development() -> Self {
        Self {
            chunk_size: 64 * 1024,
            ..Self::default()
        }
    }

    /// Directory staging in-flight uploads
    pub fn upload_dir(&self) -> PathBuf {
        self.workspace_dir.join("uploads")
    }

    /// Directory staging in-flight downloads
    pub fn download_dir(&self) -> PathBuf {
        self.workspace_dir.join("downloads")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.chunk_size, 255 * 1024);
        assert_eq!(config.max_upload_size, 256 * 1024 * 1024);
        assert_eq!(config.event_buffer, 256);
        assert!(config.database_url.starts_with("sqlite://"));
    }

    #[test]
    fn test_development_config() {
        let config = ServerConfig::development();
        assert_eq!(config.chunk_size, 64 * 1024);
        assert_eq!(config.max_upload_size, ServerConfig::default().max_upload_size);
    }

    #[test]
    fn test_staging_dirs_under_workspace() {
        let config = ServerConfig {
            workspace_dir: PathBuf::from("/tmp/blobcast-test"),
            ..ServerConfig::default()
        };
        assert_eq!(config.upload_dir(), PathBuf::from("/tmp/blobcast-test/uploads"));
        assert_eq!(config.download_dir(), PathBuf::from("/tmp/blobcast-test/downloads"));
    }
}
