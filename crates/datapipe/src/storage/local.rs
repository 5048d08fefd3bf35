use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, instrument};

use super::{clean_path, Backend, LocalFile, StorageObject};

/// Serves a directory tree on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let clean = clean_path(path);
        self.root.join(clean.trim_start_matches('/'))
    }
}

#[async_trait]
impl Backend for LocalBackend {
    #[instrument(skip(self))]
    async fn list(&self, dir: &str) -> Result<Vec<StorageObject>> {
        let dir = clean_path(dir);
        let full = self.resolve(&dir);

        let mut entries = tokio::fs::read_dir(&full)
            .await
            .context(format!("Failed to read directory: {}", full.display()))?;

        let mut objects = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .context(format!("Failed to read entry in: {}", full.display()))?
        {
            let metadata = entry
                .metadata()
                .await
                .context(format!("Failed to stat: {}", entry.path().display()))?;
            let name = entry.file_name().to_string_lossy().into_owned();

            objects.push(if metadata.is_dir() {
                StorageObject::directory(dir.clone(), name)
            } else {
                StorageObject::file(dir.clone(), name, metadata.len())
            });
        }

        objects.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = objects.len(), "Listed local directory");

        Ok(objects)
    }

    async fn fetch(&self, path: &str) -> Result<LocalFile> {
        let full = self.resolve(path);
        if !tokio::fs::try_exists(&full)
            .await
            .context(format!("Failed to stat: {}", full.display()))?
        {
            anyhow::bail!("File not found: {}", full.display());
        }
        Ok(LocalFile::borrowed(full))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_sorts_and_flags_directories() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("ftp/Refresh")).unwrap();
        std::fs::write(root.path().join("ftp/b.zip"), b"12345").unwrap();
        std::fs::write(root.path().join("ftp/a.zip"), b"1").unwrap();

        let backend = LocalBackend::new(root.path());
        let objects = backend.list("/ftp/").await.unwrap();

        let names: Vec<_> = objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Refresh", "a.zip", "b.zip"]);
        assert!(objects[0].is_directory);
        assert_eq!(objects[2].size, 5);
        assert_eq!(objects[2].path(), "/ftp/b.zip");
    }

    #[tokio::test]
    async fn test_fetch_missing_file_fails() {
        let root = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(root.path());
        assert!(backend.fetch("/ftp/none.zip").await.is_err());
    }
}
