//! Partner file stores
//!
//! A [`Backend`] lists directories and hands out local copies of files.
//! Paths are always `/`-rooted and relative to the backend root, so the
//! same classifier rules apply to a local mirror and to a bucket.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod config;
pub mod local;
pub mod s3;

pub use config::{StorageConfig, DEFAULT_LOCAL_PATH};
pub use local::LocalBackend;
pub use s3::S3Backend;

/// One listed entry of a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageObject {
    pub dir: String,
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
}

impl StorageObject {
    pub fn file(dir: impl Into<String>, name: impl Into<String>, size: u64) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
            size,
            is_directory: false,
        }
    }

    pub fn directory(dir: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
            size: 0,
            is_directory: true,
        }
    }

    pub fn path(&self) -> String {
        join_path(&self.dir, &self.name)
    }

    /// Lowercased extension of the name, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}

/// A file readable from the local filesystem. Downloaded copies are removed
/// when this is dropped.
#[derive(Debug)]
pub struct LocalFile {
    path: PathBuf,
    _temp: Option<tempfile::TempPath>,
}

impl LocalFile {
    pub fn borrowed(path: PathBuf) -> Self {
        Self { path, _temp: None }
    }

    pub fn temporary(temp: tempfile::TempPath) -> Self {
        Self {
            path: temp.to_path_buf(),
            _temp: Some(temp),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
pub trait Backend: Send + Sync + std::fmt::Debug {
    /// Entries directly below `dir`, sorted by name.
    async fn list(&self, dir: &str) -> Result<Vec<StorageObject>>;

    async fn fetch(&self, path: &str) -> Result<LocalFile>;
}

pub async fn open_backend(config: &StorageConfig) -> Result<Arc<dyn Backend>> {
    match config {
        StorageConfig::Local { path } => Ok(Arc::new(LocalBackend::new(path.clone()))),
        StorageConfig::S3 { .. } => Ok(Arc::new(S3Backend::new(config).await?)),
    }
}

/// Normalize to the `/`-rooted clean form: `ftp//a/./b/../c/` becomes `/ftp/a/c`.
pub fn clean_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {},
            ".." => {
                parts.pop();
            },
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}

pub fn join_path(dir: &str, name: &str) -> String {
    clean_path(&format!("{}/{}", dir, name))
}

/// Parent of a path in clean form; the parent of `/` is `/`.
pub fn parent_path(path: &str) -> String {
    let path = clean_path(path);
    match path.rsplit_once('/') {
        Some(("", _)) | None => "/".to_string(),
        Some((parent, _)) => parent.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path("ftp//a/./b/../c/"), "/ftp/a/c");
        assert_eq!(clean_path("/"), "/");
        assert_eq!(clean_path(""), "/");
        assert_eq!(clean_path("/../ftp"), "/ftp");
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path("/ftp/Refresh/A.zip"), "/ftp/Refresh");
        assert_eq!(parent_path("/ftp"), "/");
        assert_eq!(parent_path("/"), "/");
    }

    #[test]
    fn test_object_path_and_extension() {
        let object = StorageObject::file("/ftp/Refresh/", "REFRESH_TAXASSESSOR_0002.ZIP", 10);
        assert_eq!(object.path(), "/ftp/Refresh/REFRESH_TAXASSESSOR_0002.ZIP");
        assert_eq!(object.extension().as_deref(), Some("zip"));

        let dir = StorageObject::directory("/", "ftp");
        assert_eq!(dir.path(), "/ftp");
        assert_eq!(dir.extension(), None);
    }
}
