//! File Storage - 文件系统音频存储实现
//!
//! 实现 AudioStoragePort trait

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::SystemTime;
use tokio::fs;

use crate::application::ports::{AudioStorageError, AudioStoragePort};
use crate::config::NamingMode;
use crate::domain::chat::{ArtifactId, AudioArtifact};

/// 文件存储配置
#[derive(Debug, Clone)]
pub struct FileAudioStorageConfig {
    /// 存储根目录
    pub base_dir: PathBuf,
    /// 公开 URL 前缀
    pub url_prefix: String,
    /// 产物命名方式
    pub naming: NamingMode,
    /// per_request 模式下保留的最大文件数
    pub max_artifacts: usize,
}

/// 文件系统音频存储
pub struct FileAudioStorage {
    config: FileAudioStorageConfig,
}

impl FileAudioStorage {
    /// 创建新的文件存储（目录在首次写入时创建）
    pub fn new(config: FileAudioStorageConfig) -> Self {
        Self { config }
    }

    async fn ensure_dir(&self) -> Result<(), AudioStorageError> {
        fs::create_dir_all(&self.config.base_dir)
            .await
            .map_err(|e| AudioStorageError::IoError(e.to_string()))
    }
}

#[async_trait]
impl AudioStoragePort for FileAudioStorage {
    fn allocate(&self, extension: &str) -> AudioArtifact {
        let id = match self.config.naming {
            NamingMode::Fixed => ArtifactId::Fixed,
            NamingMode::PerRequest => ArtifactId::unique(),
        };
        AudioArtifact::new(id, extension)
    }

    fn path_of(&self, file_name: &str) -> PathBuf {
        self.config.base_dir.join(file_name)
    }

    fn url_of(&self, file_name: &str) -> String {
        format!(
            "{}/{}",
            self.config.url_prefix.trim_end_matches('/'),
            file_name
        )
    }

    async fn write(&self, file_name: &str, data: &[u8]) -> Result<PathBuf, AudioStorageError> {
        self.ensure_dir().await?;

        let path = self.path_of(file_name);
        fs::write(&path, data)
            .await
            .map_err(|e| AudioStorageError::IoError(e.to_string()))?;

        tracing::debug!("Saved audio: file={}, size={} bytes", file_name, data.len());

        Ok(path)
    }

    async fn promote(&self, from: &str, to: &str) -> Result<PathBuf, AudioStorageError> {
        let source = self.path_of(from);
        let target = self.path_of(to);
        fs::rename(&source, &target).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AudioStorageError::FileNotFound(source.to_string_lossy().to_string())
            } else {
                AudioStorageError::IoError(e.to_string())
            }
        })?;

        Ok(target)
    }

    async fn remove(&self, file_name: &str) -> Result<(), AudioStorageError> {
        match fs::remove_file(self.path_of(file_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AudioStorageError::IoError(e.to_string())),
        }
    }

    async fn prune(&self) -> Result<u64, AudioStorageError> {
        // 固定命名只有一个槽位，无需清理
        if self.config.naming == NamingMode::Fixed {
            return Ok(0);
        }

        let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
        let mut entries = match fs::read_dir(&self.config.base_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(AudioStorageError::IoError(e.to_string())),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AudioStorageError::IoError(e.to_string()))?
        {
            let path = entry.path();
            let is_partial = path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().contains(".partial."));
            if is_partial {
                continue;
            }

            if let Ok(metadata) = entry.metadata().await {
                if metadata.is_file() {
                    let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                    files.push((modified, path));
                }
            }
        }

        if files.len() <= self.config.max_artifacts {
            return Ok(0);
        }

        // 最旧的排在前面
        files.sort_by(|a, b| a.0.cmp(&b.0));
        let excess = files.len() - self.config.max_artifacts;

        let mut deleted = 0u64;
        for (_, path) in files.into_iter().take(excess) {
            match fs::remove_file(&path).await {
                Ok(()) => deleted += 1,
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to delete audio"),
            }
        }

        tracing::info!("Pruned audio artifacts: deleted={}", deleted);

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage(dir: &TempDir, naming: NamingMode, max_artifacts: usize) -> FileAudioStorage {
        FileAudioStorage::new(FileAudioStorageConfig {
            base_dir: dir.path().join("nested/audio"),
            url_prefix: "/audio/".to_string(),
            naming,
            max_artifacts,
        })
    }

    #[tokio::test]
    async fn test_write_creates_directory_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir, NamingMode::Fixed, 4);

        let path = storage.write("speech.mp3", b"first").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"first");

        storage.write("speech.mp3", b"second").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn test_url_of_joins_prefix() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir, NamingMode::Fixed, 4);
        assert_eq!(storage.url_of("speech.mp3"), "/audio/speech.mp3");
    }

    #[test]
    fn test_allocate_follows_naming_mode() {
        let dir = TempDir::new().unwrap();
        let fixed = storage(&dir, NamingMode::Fixed, 4);
        assert_eq!(fixed.allocate("mp3").raw_file_name(), "speech.mp3");

        let unique = storage(&dir, NamingMode::PerRequest, 4);
        assert!(unique.allocate("wav").is_unique());
    }

    #[tokio::test]
    async fn test_promote_replaces_target() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir, NamingMode::Fixed, 4);

        storage.write("final.mp3", b"old").await.unwrap();
        storage.write("final.partial.mp3", b"new").await.unwrap();
        let target = storage.promote("final.partial.mp3", "final.mp3").await.unwrap();

        assert_eq!(std::fs::read(target).unwrap(), b"new");
        assert!(!storage.path_of("final.partial.mp3").exists());
    }

    #[tokio::test]
    async fn test_promote_missing_source() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir, NamingMode::Fixed, 4);
        let result = storage.promote("missing.mp3", "final.mp3").await;
        assert!(matches!(result, Err(AudioStorageError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir, NamingMode::Fixed, 4);
        assert!(storage.remove("nothing.mp3").await.is_ok());
    }

    #[tokio::test]
    async fn test_prune_keeps_newest() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir, NamingMode::PerRequest, 2);

        for name in ["a.mp3", "b.mp3", "c.mp3"] {
            storage.write(name, name.as_bytes()).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        storage.write("d.partial.mp3", b"tmp").await.unwrap();

        let deleted = storage.prune().await.unwrap();
        assert_eq!(deleted, 1);
        assert!(!storage.path_of("a.mp3").exists());
        assert!(storage.path_of("b.mp3").exists());
        assert!(storage.path_of("c.mp3").exists());
        assert!(storage.path_of("d.partial.mp3").exists());
    }

    #[tokio::test]
    async fn test_prune_without_directory_is_noop() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir, NamingMode::PerRequest, 2);
        assert_eq!(storage.prune().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_prune_is_noop_for_fixed_naming() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir, NamingMode::Fixed, 1);
        storage.write("speech.mp3", b"x").await.unwrap();
        storage.write("speech_processed.mp3", b"y").await.unwrap();

        assert_eq!(storage.prune().await.unwrap(), 0);
    }
}
