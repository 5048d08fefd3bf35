use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Directory served by the local backend when `STORAGE_LOCAL_PATH` is unset.
pub const DEFAULT_LOCAL_PATH: &str = "./data";

pub const DEFAULT_S3_REGION: &str = "us-east-1";

/// Where partner files are read from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    Local {
        path: PathBuf,
    },
    S3 {
        endpoint: Option<String>,
        region: String,
        bucket: String,
        #[serde(skip_serializing)]
        access_key: String,
        #[serde(skip_serializing)]
        secret_key: String,
        path_style: bool,
    },
}

impl StorageConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = env::var("STORAGE_BACKEND").unwrap_or_else(|_| "local".to_string());

        match backend.to_lowercase().as_str() {
            "local" => Ok(Self::Local {
                path: env::var("STORAGE_LOCAL_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOCAL_PATH)),
            }),
            "s3" => {
                let bucket = env::var("S3_BUCKET")
                    .map_err(|_| anyhow::anyhow!("S3_BUCKET must be set for the s3 storage backend"))?;

                Ok(Self::S3 {
                    endpoint: env::var("S3_ENDPOINT").ok(),
                    region: env::var("S3_REGION").unwrap_or_else(|_| DEFAULT_S3_REGION.to_string()),
                    bucket,
                    access_key: env::var("S3_ACCESS_KEY")
                        .or_else(|_| env::var("AWS_ACCESS_KEY_ID"))
                        .unwrap_or_default(),
                    secret_key: env::var("S3_SECRET_KEY")
                        .or_else(|_| env::var("AWS_SECRET_ACCESS_KEY"))
                        .unwrap_or_default(),
                    path_style: env::var("S3_PATH_STYLE")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(false),
                })
            },
            other => anyhow::bail!("Unknown storage backend '{}', expected 'local' or 's3'", other),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_from_env_s3() {
        env::set_var("STORAGE_BACKEND", "S3");
        env::remove_var("S3_BUCKET");
        assert!(StorageConfig::from_env().is_err());

        env::set_var("S3_BUCKET", "partner-files");
        env::set_var("S3_ENDPOINT", "http://localhost:9000");
        env::set_var("S3_PATH_STYLE", "true");
        match StorageConfig::from_env().unwrap() {
            StorageConfig::S3 {
                endpoint,
                region,
                bucket,
                path_style,
                ..
            } => {
                assert_eq!(endpoint.as_deref(), Some("http://localhost:9000"));
                assert_eq!(region, DEFAULT_S3_REGION);
                assert_eq!(bucket, "partner-files");
                assert!(path_style);
            },
            other => panic!("unexpected config {:?}", other),
        }

        for key in ["STORAGE_BACKEND", "S3_BUCKET", "S3_ENDPOINT", "S3_PATH_STYLE"] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_local_default() {
        env::remove_var("STORAGE_BACKEND");
        env::set_var("STORAGE_LOCAL_PATH", "/srv/partners");

        match StorageConfig::from_env().unwrap() {
            StorageConfig::Local { path } => assert_eq!(path, PathBuf::from("/srv/partners")),
            other => panic!("unexpected config {:?}", other),
        }

        env::remove_var("STORAGE_LOCAL_PATH");
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_unknown_backend() {
        env::set_var("STORAGE_BACKEND", "ftp");
        assert!(StorageConfig::from_env().is_err());
        env::remove_var("STORAGE_BACKEND");
    }
}
