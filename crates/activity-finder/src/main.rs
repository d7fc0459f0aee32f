//! Activity finder CLI - watches activity listings and emails digests.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use activity_finder::digest::{DryRunNotifier, EmailSender, Notifier};
use activity_finder::listing::HttpListingSource;
use activity_finder::{FileSeenSetStore, Pipeline, PrivateConfig, PublicConfig, Scheduler};

/// Activity finder - email digests of newly available activities.
#[derive(Parser)]
#[command(name = "activity-finder")]
#[command(about = "Watches activity listings and emails digests of new matches")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Public configuration (rule groups, email template)
    #[arg(long, env = "ACTIVITY_FINDER_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Private configuration (SMTP credentials)
    #[arg(long, env = "ACTIVITY_FINDER_SECRETS", default_value = "secrets.json")]
    secrets: PathBuf,

    /// Directory holding the per-rule seen-set files
    #[arg(long, default_value = ".")]
    cache_dir: PathBuf,

    /// Seconds to sleep between cycles
    #[arg(long, default_value = "3600")]
    interval_secs: u64,

    /// Run a single cycle and exit (for cron use)
    #[arg(long)]
    once: bool,

    /// Log digests instead of sending email
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("activity_finder=debug,info")
    } else {
        EnvFilter::new("activity_finder=info,warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %format!("{e:#}"), "Activity finder stopped");
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = PublicConfig::load(&cli.config).context("Failed to load public configuration")?;
    let registry = config.build_registry();
    tracing::info!(
        config = %cli.config.display(),
        rule_groups = config.rules.len(),
        rules = ?registry.names(),
        "Loaded configuration"
    );

    let notifier: Arc<dyn Notifier> = if cli.dry_run {
        tracing::info!("Dry run: digests will be logged, not sent");
        Arc::new(DryRunNotifier)
    } else {
        let secrets =
            PrivateConfig::load(&cli.secrets).context("Failed to load private configuration")?;
        tracing::info!(username = %secrets.email_username, "Loaded SMTP credentials");
        Arc::new(EmailSender::new(secrets))
    };

    let source = Arc::new(HttpListingSource::new().context("Failed to create HTTP client")?);
    let store = Arc::new(FileSeenSetStore::new(&cli.cache_dir));
    let cache_dir = store.dir().to_path_buf();

    let pipeline = Pipeline::new(config, registry, source, store, notifier)
        .context("Invalid rule configuration")?;

    let scheduler = Scheduler::new(Duration::from_secs(cli.interval_secs));
    let scheduler = if cli.once {
        scheduler.with_max_cycles(1)
    } else {
        scheduler
    };

    tracing::info!(
        interval_secs = scheduler.interval().as_secs(),
        once = cli.once,
        cache_dir = %cache_dir.display(),
        "Starting activity finder"
    );
    scheduler.run(&pipeline).await.context("Cycle failed")?;

    Ok(())
}
