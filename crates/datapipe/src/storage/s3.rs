use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    Client,
};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use super::{clean_path, Backend, LocalFile, StorageConfig, StorageObject};

/// Serves partner files from a bucket. Keys map to paths by prefixing `/`.
#[derive(Clone)]
pub struct S3Backend {
    client: Client,
    bucket: String,
}

impl std::fmt::Debug for S3Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Backend").field("bucket", &self.bucket).finish()
    }
}

impl S3Backend {
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        let StorageConfig::S3 {
            endpoint,
            region,
            bucket,
            access_key,
            secret_key,
            path_style,
        } = config
        else {
            return Err(anyhow!("S3 backend requires an s3 storage config"));
        };

        let mut builder = aws_sdk_s3::Config::builder()
            .region(Region::new(region.clone()))
            .force_path_style(*path_style);

        if access_key.is_empty() {
            let shared = aws_config::load_from_env().await;
            if let Some(provider) = shared.credentials_provider() {
                builder = builder.credentials_provider(provider);
            }
        } else {
            builder = builder.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "datapipe-storage",
            ));
        }

        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(builder.build());

        info!(bucket = %bucket, "Storage client initialized");

        Ok(Self {
            client,
            bucket: bucket.clone(),
        })
    }

    fn key(path: &str) -> String {
        clean_path(path).trim_start_matches('/').to_string()
    }
}

#[async_trait]
impl Backend for S3Backend {
    #[instrument(skip(self))]
    async fn list(&self, dir: &str) -> Result<Vec<StorageObject>> {
        let dir = clean_path(dir);
        let prefix = match Self::key(&dir) {
            k if k.is_empty() => String::new(),
            k => format!("{}/", k),
        };

        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let response = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&prefix)
                .delimiter("/")
                .set_continuation_token(continuation.take())
                .send()
                .await
                .context(format!("Failed to list s3://{}/{}", self.bucket, prefix))?;

            for common in response.common_prefixes() {
                if let Some(p) = common.prefix() {
                    let name = p.trim_start_matches(prefix.as_str()).trim_end_matches('/');
                    if !name.is_empty() {
                        objects.push(StorageObject::directory(dir.clone(), name));
                    }
                }
            }

            for object in response.contents() {
                if let Some(key) = object.key() {
                    let name = key.trim_start_matches(prefix.as_str());
                    if !name.is_empty() && !name.contains('/') {
                        let size = object.size().unwrap_or(0).max(0) as u64;
                        objects.push(StorageObject::file(dir.clone(), name, size));
                    }
                }
            }

            match response.next_continuation_token() {
                Some(token) if response.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                },
                _ => break,
            }
        }

        objects.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = objects.len(), "Listed bucket prefix");

        Ok(objects)
    }

    #[instrument(skip(self))]
    async fn fetch(&self, path: &str) -> Result<LocalFile> {
        let key = Self::key(path);

        let mut response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .context(format!("Failed to download from S3: {}", key))?;

        let temp = tempfile::NamedTempFile::new()
            .context("Failed to create temporary file")?
            .into_temp_path();
        let mut file = tokio::fs::File::create(&temp)
            .await
            .context("Failed to open temporary file")?;

        let mut written = 0u64;
        while let Some(chunk) = response
            .body
            .try_next()
            .await
            .context("Failed to read S3 response body")?
        {
            written += chunk.len() as u64;
            file.write_all(&chunk).await.context("Failed to write temporary file")?;
        }
        file.flush().await.context("Failed to flush temporary file")?;

        debug!(bytes = written, key = %key, "Downloaded object");

        Ok(LocalFile::temporary(temp))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_key_strips_root() {
        assert_eq!(S3Backend::key("/ftp/Refresh/a.zip"), "ftp/Refresh/a.zip");
        assert_eq!(S3Backend::key("/"), "");
    }

    #[tokio::test]
    async fn test_new_rejects_local_config() {
        let config = StorageConfig::Local {
            path: std::path::PathBuf::from("."),
        };
        assert!(S3Backend::new(&config).await.is_err());
    }
}
