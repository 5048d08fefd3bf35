//! Datapipe - partner data ingest and address indexing

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use datapipe::config::Config;
use datapipe::db;
use datapipe::partners::PartnerName;
use datapipe::request::Request;
use datapipe::scheduler::Scheduler;
use datapipe::search::{Indexer, SearchClient};
use datapipe::storage;
use datapipe_common::logging::{init_logging, LogConfig, LogLevel};

#[derive(Parser, Debug)]
#[command(name = "datapipe")]
#[command(author, version, about = "Partner data ingest and address indexing")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk a partner store and load its data files
    Ingest {
        /// Partner whose store is walked
        #[arg(short, long, value_enum)]
        partner: PartnerName,

        /// Walk root, defaults to the partner's root
        #[arg(long, env = "INGEST_ROOT")]
        root: Option<String>,

        /// Records committed per transaction
        #[arg(long, env = "INGEST_BATCH_SIZE")]
        batch_size: Option<usize>,

        /// Priority groups dispatched at the same time
        #[arg(long, env = "INGEST_FILE_BUFFER_SIZE")]
        file_buffer_size: Option<usize>,
    },

    /// Index addresses into the search cluster
    Index {
        /// Alias the versioned indices sit behind
        #[arg(long, env = "INDEX_ALIAS")]
        alias: Option<String>,

        /// Only index this county
        #[arg(long, env = "INDEX_FIPS")]
        fips: Option<String>,

        /// Only index this ZIP code
        #[arg(long, env = "INDEX_ZIP5")]
        zip5: Option<String>,

        /// Addresses read per page
        #[arg(long, env = "INDEX_BATCH_SIZE")]
        batch_size: Option<usize>,
    },

    /// Apply database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("datapipe".to_string())
        .filter_directives("datapipe=debug,sqlx=warn".to_string())
        .build();

    // Environment variables take precedence
    let log_config = log_config.merge_env().context("Invalid logging configuration")?;
    let _guard = init_logging(&log_config)?;

    let mut config = Config::load().context("Failed to load configuration")?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, canceling");
                cancel.cancel();
            }
        }
    });

    match cli.command {
        Command::Ingest {
            partner,
            root,
            batch_size,
            file_buffer_size,
        } => {
            if let Some(root) = root {
                config.ingest.root = Some(root);
            }
            if let Some(batch_size) = batch_size {
                config.ingest.batch_size = batch_size;
            }
            if let Some(file_buffer_size) = file_buffer_size {
                config.ingest.file_buffer_size = file_buffer_size;
            }
            config.validate()?;
            ingest(&config, partner, cancel).await?;
        },
        Command::Index {
            alias,
            fips,
            zip5,
            batch_size,
        } => {
            if let Some(alias) = alias {
                config.index.alias = alias;
            }
            if fips.is_some() {
                config.index.fips = fips;
            }
            if zip5.is_some() {
                config.index.zip5 = zip5;
            }
            if let Some(batch_size) = batch_size {
                config.index.batch_size = batch_size;
            }
            config.validate()?;
            index(&config, cancel).await?;
        },
        Command::Migrate => {
            let pool = db::create_pool(&config.database).await?;
            db::migrate(&pool).await?;
        },
    }

    Ok(())
}

async fn ingest(config: &Config, partner: PartnerName, cancel: CancellationToken) -> Result<()> {
    info!(partner = %partner, "Starting ingest");

    let pool = db::create_pool(&config.database).await?;
    db::health_check(&pool).await?;

    let backend = storage::open_backend(&config.storage)
        .await
        .context("Failed to open partner store")?;
    let partner = partner.build(config.ingest.root.as_deref())?;

    let request = Request::builder()
        .pool(&config.pool_keys.datapipe, pool)
        .cancel(cancel)
        .build();

    let scheduler = Scheduler::new(request, &config.pool_keys.datapipe, backend, (&config.ingest).into());
    let summary = scheduler
        .run(partner.as_ref())
        .await
        .context("Ingest failed")?;

    info!(
        loaded_files = summary.loaded_files,
        failed_files = summary.failed_files,
        "Ingest complete"
    );
    Ok(())
}

async fn index(config: &Config, cancel: CancellationToken) -> Result<()> {
    info!(alias = %config.index.alias, "Starting indexer");

    let pool = db::create_pool(&config.database).await?;
    let client = SearchClient::new(&config.search).context("Failed to build search client")?;

    let request = Request::builder()
        .pool(&config.pool_keys.datapipe, pool)
        .search(&config.pool_keys.search, client)
        .cancel(cancel)
        .build();

    let indexer = Indexer::new(
        request,
        &config.pool_keys.datapipe,
        &config.pool_keys.search,
        (&config.index).into(),
    );
    let summary = indexer.run().await.context("Indexing failed")?;

    info!(
        index = %summary.index,
        fips_total = summary.fips_total,
        fips_failed = summary.fips_failed,
        documents = summary.documents,
        "Indexing complete"
    );
    Ok(())
}
