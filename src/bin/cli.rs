//! Slot Alert CLI
//!
//! Local and cron execution entry point. For AWS Lambda, use
//! `slot-alert-lambda`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use slot_alert::{
    error::Result,
    models::{Config, TelegramCredentials},
    pipeline,
    services::{Notifier, TelegramNotifier},
};

/// slot-alert - ICAI Course Slot Checker
#[derive(Parser, Debug)]
#[command(
    name = "slot-alert",
    version,
    about = "Checks ICAI course batch availability and sends Telegram alerts"
)]

struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one availability pass over the configured courses
    Check,

    /// Validate the configuration file and show the effective values
    Validate,

    /// Send a test message through the notification channel
    TestNotify,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("Slot Alert starting...");

    let config = Config::load_or_default(&cli.config);
    log::info!("Loaded configuration from {}", cli.config.display());

    let config = Arc::new(config);

    match cli.command {
        Command::Check => {
            let report = pipeline::run_check(Arc::clone(&config)).await?;
            if report.notified.is_empty() {
                log::info!("No alerts sent this run");
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            log::info!("✓ Config OK");
            log::info!("  site.url: {}", config.site.url);
            log::info!("  site.region: {}", config.site.region);
            log::info!("  site.pou: {}", config.site.pou);
            log::info!("  site.courses: {}", config.site.courses.len());
            for course in &config.site.courses {
                log::info!("    - {course}");
            }
            log::info!("  webdriver.server_url: {}", config.webdriver.server_url);
            log::info!(
                "  checker.no_batch_markers: {}",
                config.checker.no_batch_markers.len()
            );
            log::info!("  notify.api_base: {}", config.notify.api_base);
        }

        Command::TestNotify => {
            config.validate()?;
            let credentials = TelegramCredentials::from_env()?;
            let notifier = TelegramNotifier::new(
                config.notify.clone(),
                credentials,
                config.site.pou.clone(),
            )?;

            notifier.notify("test message, ignore").await?;
            log::info!("Test notification sent");
        }
    }

    log::info!("Done!");

    Ok(())
}
