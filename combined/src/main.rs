//! Charity desk - application entry point
//!
//! Opens the records document, checks the session and dispatches the
//! subcommand. The document is saved once per command.

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth_service_lib::config::AuthServiceConfig;
use auth_service_lib::service::AuthService;
use charity_desk::{
    cli::{Cli, Commands},
    commands::{self, Context},
    output,
};
use common::{AppError, LoggingConfig, StorageConfig};
use records_service_lib::config::RecordsServiceConfig;
use records_service_lib::service::{ServiceContainer, Services};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing (verbose mode sets debug level)
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {}", e);
        eprintln!("{}", e.user_message());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let storage = storage_config(&cli);
    let config = RecordsServiceConfig::from_env().with_storage(storage.clone());
    tracing::debug!(data_dir = %storage.data_dir.display(), "Configuration loaded");

    let services = records_service_lib::open(config).await?;
    let auth = auth_service_lib::authenticator(
        services.store(),
        &AuthServiceConfig::from_storage(&storage),
    );

    let is_auto_backup = matches!(cli.command, Commands::AutoBackup);
    let ctx = Context::new(&services, &auth);
    let result = commands::execute(cli.command, &ctx).await;

    // Changes made before a failure are still kept
    persist(&services).await;

    let value = result?;
    output::print(&value)?;

    if !is_auto_backup {
        auto_backup(&services, &auth).await;
    }
    Ok(())
}

/// Flags override the environment, which overrides the defaults.
fn storage_config(cli: &Cli) -> StorageConfig {
    let mut storage = StorageConfig::from_env();
    if let Some(dir) = &cli.data_dir {
        storage.data_dir = dir.clone();
    }
    if let Some(dir) = &cli.backup_dir {
        storage.backup_dir = dir.clone();
    }
    storage
}

async fn persist(services: &Services) {
    if let Err(e) = services.save().await {
        tracing::error!(error = %e, "Failed to save the document");
    }
}

/// Runs only with a session. Never fails the command.
async fn auto_backup(services: &Services, auth: &dyn AuthService) {
    if auth.current_user().await.is_err() {
        return;
    }
    match services.backups().auto_backup(Utc::now()).await {
        Ok(Some(path)) => tracing::info!(path = %path.display(), "Automatic backup written"),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Automatic backup failed"),
    }
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        LoggingConfig::default().with_verbose(true).log_level
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| LoggingConfig::from_env().log_level)
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
