//! Stagehand CLI - drives the temporary-upload lifecycle against local directories.
//!
//! Configuration comes from the environment (or a `.env` file): TEMP_UPLOAD_DIR,
//! AUDIO_STORAGE_DIR, FFPROBE_PATH, PROBE_TIMEOUT_SECS, TEMP_FILE_TTL_SECS and
//! CLEANUP_INTERVAL_SECS.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use stagehand_cli::{init_tracing, upload_name, ErrorBody};
use stagehand_core::LogLevel;
use stagehand_services::{AppError, AudioStagingService, ErrorMetadata, StagingConfig};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "stagehand", about = "Stage, analyze and promote audio uploads")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage a local file as a temporary upload
    Stage {
        /// Path to the file to stage
        file: std::path::PathBuf,
    },
    /// Extract audio metadata from a staged upload
    Analyze {
        /// Temporary file id returned by `stage`
        id: String,
    },
    /// Move a staged upload into permanent storage
    Promote {
        /// Temporary file id returned by `stage`
        id: String,
        /// File name inside the storage directory
        name: String,
    },
    /// Delete expired temporary files once
    Sweep,
    /// Run the cleanup loop until Ctrl-C
    Janitor,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

async fn run(command: Commands, service: AudioStagingService) -> Result<(), AppError> {
    match command {
        Commands::Stage { file } => {
            let data = tokio::fs::read(&file).await.map_err(|e| {
                AppError::InvalidInput(format!("Cannot read {}: {}", file.display(), e))
            })?;
            let id = service.save_temp_file(&data, &upload_name(&file)).await?;
            print_json(&serde_json::json!({ "tempFileId": id, "sizeBytes": data.len() }))?;
        }
        Commands::Analyze { id } => {
            let metadata = service.analyze_audio(&id).await?;
            print_json(&metadata)?;
        }
        Commands::Promote { id, name } => {
            let path = service.persist_temp_file(&id, &name).await?;
            print_json(&serde_json::json!({ "tempFileId": id, "path": path }))?;
        }
        Commands::Sweep => {
            let report = service.cleanup_expired().await?;
            print_json(&report)?;
        }
        Commands::Janitor => {
            let janitor = Arc::new(service.janitor());
            tracing::info!(ttl_secs = janitor.ttl().as_secs(), "Janitor started");
            let handle = janitor.start();

            tokio::signal::ctrl_c()
                .await
                .map_err(|e| AppError::Internal(format!("Failed to listen for Ctrl-C: {}", e)))?;

            tracing::info!("Shutting down janitor");
            handle.abort();
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = StagingConfig::from_env().context("Invalid staging configuration")?;
    init_tracing(config.is_production());
    let service = AudioStagingService::from_config(&config);

    if let Err(err) = run(cli.command, service).await {
        match err.log_level() {
            LogLevel::Debug => tracing::debug!(error = %err, "Command failed"),
            LogLevel::Warn => tracing::warn!(error = %err, "Command failed"),
            LogLevel::Error => tracing::error!(error = %err.detailed_message(), "Command failed"),
        }
        print_json(&ErrorBody::from_app_error(&err))?;
        std::process::exit(1);
    }

    Ok(())
}
