//! Mongoprov - declarative MongoDB replica set provisioning
//!
//! Validates a declared member list, then initiates or reconfigures the
//! target replica set and waits for it to report a healthy status.

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mongodb::options::ClientOptions;
use mongodb::Client;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mongoprov_core::config::MongoprovConfig;
use mongoprov_core::member::MemberSpec;
use mongoprov_core::validate::{seed_hosts, validate_members};
use mongoprov_replset::{
    member_document, MongoAdmin, ReconcileSettings, Reconciler, ReplSetAdmin, WaitOutcome,
};

#[derive(Parser)]
#[command(name = "mongoprov")]
#[command(version = mongoprov_core::VERSION)]
#[command(about = "Declarative MongoDB replica set provisioning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// MongoDB connection string
    #[arg(long, env = "MONGOPROV_URI")]
    uri: Option<String>,

    /// Replica set name
    #[arg(long, env = "MONGOPROV_REPLICA_SET")]
    replica_set: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "MONGOPROV_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the declared members and apply them to the replica set
    Apply,

    /// Validate the declared members and print the planned configuration
    Check,

    /// Query the replica set status once and print the reply
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();

    // Load or create config
    let mut config = if let Some(config_path) = &cli.config {
        MongoprovConfig::from_file(config_path)?
    } else {
        MongoprovConfig::from_env()
    };

    // Override with CLI args
    if let Some(uri) = cli.uri {
        config.connection.uri = uri;
    }
    if let Some(name) = cli.replica_set {
        config.replica_set.name = name;
    }

    match cli.command {
        Commands::Apply => apply(&config).await,
        Commands::Check => check(&config),
        Commands::Status => status(&config).await,
    }
}

async fn apply(config: &MongoprovConfig) -> anyhow::Result<()> {
    config.ensure_named()?;
    let members = validate_members(&config.replica_set.name, &config.replica_set.members)?;

    let admin = MongoAdmin::new(connect(config, &members).await?);
    let settings = ReconcileSettings {
        status_retries: config.reconcile.status_retries,
        retry_interval: Duration::from_secs(config.reconcile.retry_interval_secs),
    };

    let reconciler = Reconciler::with_settings(admin, settings);
    match reconciler
        .reconcile(&config.replica_set.name, &members)
        .await?
    {
        WaitOutcome::Healthy => {
            info!("Replica set '{}' is healthy", config.replica_set.name);
        }
        WaitOutcome::RetriesExhausted => {
            warn!(
                "Replica set '{}' did not report a successful status before the retry budget ran out",
                config.replica_set.name
            );
        }
    }

    Ok(())
}

fn check(config: &MongoprovConfig) -> anyhow::Result<()> {
    config.ensure_named()?;
    let members = validate_members(&config.replica_set.name, &config.replica_set.members)?;

    for member in &members {
        println!("{}", member_document(member));
    }

    Ok(())
}

async fn status(config: &MongoprovConfig) -> anyhow::Result<()> {
    config.ensure_named()?;
    let members = validate_members(&config.replica_set.name, &config.replica_set.members)?;

    let admin = MongoAdmin::new(connect(config, &members).await?);
    let reply = admin
        .run_command(bson::doc! { "replSetGetStatus": 1 })
        .await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&reply).context("failed to render status reply")?
    );

    Ok(())
}

/// Connect with the configured URI, falling back to the first declared
/// member as a direct-connection seed.
async fn connect(config: &MongoprovConfig, members: &[MemberSpec]) -> anyhow::Result<Client> {
    let uri = if config.connection.uri.is_empty() {
        let seeds = seed_hosts(members);
        let seed = seeds.first().context("at least one member is required")?;
        format!("mongodb://{}/?directConnection=true", seed)
    } else {
        config.connection.uri.clone()
    };

    let mut options = ClientOptions::parse(&uri)
        .await
        .with_context(|| format!("failed to parse MongoDB URI '{}'", uri))?;
    options.connect_timeout = Some(Duration::from_secs(config.connection.connect_timeout_secs));
    options.server_selection_timeout = Some(Duration::from_secs(
        config.connection.server_selection_timeout_secs,
    ));

    Client::with_options(options).context("failed to create MongoDB client")
}
