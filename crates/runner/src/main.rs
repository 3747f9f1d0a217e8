//! Deferred Activation - Host harness entry point
//! Wires the SQLite adapters into the coordinator and runs activation cycles

mod config;

use activation_core::application::coordinator::constants::PROCESS_LABEL;
use activation_core::application::{ActivationCoordinator, ActivationOutcome, SkipReason};
use activation_core::port::time_provider::SystemTimeProvider;
use activation_core::port::PayloadReader;
use activation_infra_sqlite::{create_pool, run_migrations, SqliteContentRepository, SqliteTaskStore};
use anyhow::{Context, Result};
use clap::Parser;
use config::{Cli, Commands};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    init_logging()?;

    let cli = Cli::parse();
    info!(
        process = PROCESS_LABEL,
        core_version = activation_core::VERSION,
        "Deferred Activation v{} starting...",
        VERSION
    );

    // 2. Initialize database
    let db_path = cli.database_path();
    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create {}", parent.display()))?;
        }
    }

    info!(db_path = %db_path, "Initializing database...");
    let pool = create_pool(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 3. Setup dependencies (DI wiring)
    let activation_config = cli.activation_config();
    let time_provider = Arc::new(SystemTimeProvider);
    let content_repo = Arc::new(SqliteContentRepository::with_content_node(
        pool.clone(),
        time_provider.clone(),
        cli.content_node.clone(),
    ));
    let task_store = Arc::new(SqliteTaskStore::new(pool.clone(), time_provider.clone()));

    let coordinator = ActivationCoordinator::new(
        content_repo.clone(),
        task_store.clone(),
        time_provider,
        activation_config,
    );

    // 4. Run command
    match cli.command {
        Commands::Activate { task_ids } => {
            let mut tasks = Vec::with_capacity(task_ids.len());
            for id in &task_ids {
                let task = task_store
                    .find_task(id)
                    .await
                    .with_context(|| format!("Failed to load task {}", id))?
                    .with_context(|| format!("Task {} not found", id))?;
                tasks.push(task);
            }

            info!(
                tasks = tasks.len(),
                mode = %coordinator.mode(),
                "Running activation cycles"
            );
            let report = coordinator.activate_all(&tasks).await;

            for outcome in &report.completed {
                print_outcome(outcome);
            }
            if let Some((task_id, e)) = report.failure {
                error!(task_id = %task_id, stage = %e.failed_at(), "Activation stopped");
                pool.close().await;
                return Err(anyhow::Error::new(e)
                    .context(format!("Activation failed for task {}", task_id)));
            }
        }
        Commands::Show { task_id } => {
            let task = task_store
                .find_task(&task_id)
                .await
                .with_context(|| format!("Failed to load task {}", task_id))?
                .with_context(|| format!("Task {} not found", task_id))?;
            let exists = content_repo
                .node_exists(&task.payload)
                .await
                .with_context(|| format!("Failed to read payload {}", task.payload))?;
            println!(
                "{}: content node {} {}",
                task_id,
                content_repo.content_path(&task.payload),
                if exists { "exists" } else { "is missing" }
            );

            let metadata = task_store
                .metadata_of(&task_id)
                .await
                .with_context(|| format!("Failed to read metadata of task {}", task_id))?;

            if metadata.is_empty() {
                println!("{}: no metadata", task_id);
            }
            for (key, value) in &metadata {
                println!("{}: {} = {}", task_id, key, value);
            }
        }
    }

    pool.close().await;
    Ok(())
}

/// Pretty output by default, JSON lines with `ACTIVATION_LOG_FORMAT=json`
fn init_logging() -> Result<()> {
    let log_format =
        std::env::var("ACTIVATION_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("activation=info,deferred_activation=info"))
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

fn print_outcome(outcome: &ActivationOutcome) {
    match outcome {
        ActivationOutcome::Written {
            task_id,
            key,
            value,
            source,
        } => println!("{}: {} = {} ({:?})", task_id, key, value, source),
        ActivationOutcome::Skipped {
            task_id,
            reason: SkipReason::ContentNodeMissing { path },
        } => println!("{}: skipped, content node {} does not exist", task_id, path),
    }
}
