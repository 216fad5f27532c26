mod intent_file;

use clap::{Parser, Subcommand};
use intent_file::IntentFile;
use polis_core::{ControllerConfig, Logger};
use polis_metrics::MetricSourceRegistry;
use polis_orchestrator::{InMemoryIntentStore, InMemoryWorkloadAdapter, IntentStore, ReconcilerManager};
use polis_policy::PolicyRegistry;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "polis", about = "Horizontal autoscaling reconciliation controller")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the reconciler manager against a config file and an
    /// intent-source file, running until interrupted.
    Run {
        #[arg(short, long, default_value = "polis.yaml")]
        config: String,
        #[arg(short, long)]
        intents: String,
    },
    /// Load and validate a config file, an intent-source file, or both,
    /// without starting the reconciler.
    Validate {
        #[arg(short, long)]
        config: Option<String>,
        #[arg(short, long)]
        intents: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, intents } => run(&config, &intents).await,
        Commands::Validate { config, intents } => validate(config.as_deref(), intents.as_deref()),
    };

    if let Err(err) = result {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

async fn run(config_path: &str, intents_path: &str) -> Result<(), String> {
    let config = ControllerConfig::load_from_file(config_path).map_err(|e| e.to_string())?;
    config.validate().map_err(|e| e.to_string())?;

    Logger::new(config.log_level.clone(), None)
        .init()
        .map_err(|e| e.to_string())?;

    let intent_file = IntentFile::load_from_file(intents_path).map_err(|e| e.to_string())?;
    intent_file.validate()?;
    let intents = intent_file.into_intents();

    let store = Arc::new(InMemoryIntentStore::new());
    for intent in intents {
        store.put(intent).await;
    }

    let workload = Arc::new(InMemoryWorkloadAdapter::new());
    for intent in store.list().await {
        workload.seed(intent.spec.target.clone(), intent.spec.min_replicas).await;
    }

    let mut metric_registry = MetricSourceRegistry::new();
    polis_metrics::register_defaults(&mut metric_registry);
    let mut policy_registry = PolicyRegistry::new();
    polis_policy::register_defaults(&mut policy_registry);

    let manager = Arc::new(ReconcilerManager::new(
        store.clone(),
        workload,
        Arc::new(metric_registry),
        Arc::new(policy_registry),
    ));
    manager.sync().await;
    info!(
        intents = manager.active_intent_count().await,
        "reconciler manager started"
    );

    // The in-process store only changes when this CLI itself calls
    // `put`/`remove`, so today this channel never fires; it's wired up
    // so a future file-watching intent source needs no reconciler change.
    let mut watch = store.watch();
    let sync_manager = manager.clone();
    let resync = tokio::spawn(async move {
        while watch.changed().await.is_ok() {
            sync_manager.sync().await;
        }
    });

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => error!(error = %err, "failed to listen for shutdown signal"),
    }

    resync.abort();
    manager.shutdown().await;
    info!("reconciler manager stopped");

    Ok(())
}

fn validate(config_path: Option<&str>, intents_path: Option<&str>) -> Result<(), String> {
    if config_path.is_none() && intents_path.is_none() {
        return Err("validate requires --config, --intents, or both".to_string());
    }

    if let Some(path) = config_path {
        let config = ControllerConfig::load_from_file(path).map_err(|e| e.to_string())?;
        config.validate().map_err(|e| e.to_string())?;
        println!("{}: config valid", path);
    }

    if let Some(path) = intents_path {
        let intent_file = IntentFile::load_from_file(path).map_err(|e| e.to_string())?;
        intent_file.validate()?;
        println!("{}: {} intent(s) valid", path, intent_file.intents.len());
    }

    Ok(())
}
