use anyhow::Context;
use std::io::ErrorKind;
use tokio::fs;
use tracing::info;

use crate::config::ServerConfig;

/// Wipe and recreate the staging directories. Runs once, before anything is
/// served; whatever a previous process left behind is discarded wholesale.
pub async fn prepare_workspace(config: &ServerConfig) -> anyhow::Result<()> {
    for dir in [config.upload_dir(), config.download_dir()] {
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("wiping staging directory {}", dir.display()));
            }
        }

        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("creating staging directory {}", dir.display()))?;
    }

    info!(
        "🧹 Staging directories ready under {}",
        config.workspace_dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn workspace_config(dir: &Path) -> ServerConfig {
        ServerConfig {
            workspace_dir: dir.to_path_buf(),
            ..ServerConfig::development()
        }
    }

    fn dir_is_empty(path: &Path) -> bool {
        std::fs::read_dir(path).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_creates_missing_staging_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let config = workspace_config(dir.path());

        prepare_workspace(&config).await.unwrap();

        assert!(config.upload_dir().is_dir());
        assert!(config.download_dir().is_dir());
    }

    #[tokio::test]
    async fn test_wipes_leftover_staging_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = workspace_config(dir.path());

        let stale = config.upload_dir().join("stale");
        std::fs::create_dir_all(&stale).unwrap();
        std::fs::write(stale.join("half-upload.bin"), b"junk").unwrap();
        std::fs::write(config.upload_dir().join("leftover"), b"junk").unwrap();

        prepare_workspace(&config).await.unwrap();

        assert!(dir_is_empty(&config.upload_dir()));
        assert!(dir_is_empty(&config.download_dir()));
    }

    #[tokio::test]
    async fn test_fails_when_workspace_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();

        let config = workspace_config(&file);

        assert!(prepare_workspace(&config).await.is_err());
    }
}
