//! Shared helpers for datapipe integration tests
//!
//! Database tests run against a PostGIS container started through
//! testcontainers, with migrations applied. They need Docker and are marked
//! `#[ignore]`:
//!
//! ```bash
//! cargo test -p datapipe --test loader_db_tests -- --ignored --nocapture
//! ```

#![allow(dead_code)]

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::time::Duration;
use testcontainers::{core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tracing::{debug, info};

use datapipe::request::Request;

/// Pool key used by every test request
pub const TEST_POOL_KEY: &str = "datapipe";

/// Postgres with PostGIS, required by `fa_df_address.location`
pub const POSTGIS_IMAGE: &str = "postgis/postgis";
pub const POSTGIS_TAG: &str = "16-3.4-alpine";

/// PostGIS test container with migrations applied
pub struct TestPostgres {
    container: ContainerAsync<Postgres>,
    pool: PgPool,
    connection_string: String,
}

impl TestPostgres {
    pub async fn start() -> Result<Self> {
        info!("Starting PostGIS test container...");

        let container = Postgres::default()
            .with_name(POSTGIS_IMAGE)
            .with_tag(POSTGIS_TAG)
            .start()
            .await
            .context("Failed to start PostGIS container")?;

        let host = container
            .get_host()
            .await
            .context("Failed to get container host")?;
        let port = container
            .get_host_port_ipv4(5432.tcp())
            .await
            .context("Failed to get container port")?;

        let connection_string = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);
        debug!(connection = %connection_string, "PostGIS container ready");

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&connection_string)
            .await
            .context("Failed to connect to PostGIS")?;

        datapipe::db::migrate(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            container,
            pool,
            connection_string,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// A fresh request over this database
    pub fn request(&self) -> Request {
        Request::builder().pool(TEST_POOL_KEY, self.pool.clone()).build()
    }
}

/// Write `contents` at `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, contents: &[u8]) {
    let path = root.join(relative.trim_start_matches('/'));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create test directory");
    }
    std::fs::write(&path, contents).expect("Failed to write test file");
}

/// Write a zip archive at `root/relative` holding `members` in order.
pub fn write_zip(root: &Path, relative: &str, members: &[(&str, &[u8])]) {
    use std::io::Write;

    let path = root.join(relative.trim_start_matches('/'));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create test directory");
    }

    let file = std::fs::File::create(&path).expect("Failed to create archive");
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, contents) in members {
        zip.start_file(*name, options).expect("Failed to start archive member");
        zip.write_all(contents).expect("Failed to write archive member");
    }
    zip.finish().expect("Failed to finish archive");
}

/// Initialize test tracing
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,datapipe=debug,sqlx=warn,testcontainers=info")),
        )
        .with_test_writer()
        .try_init();
}
