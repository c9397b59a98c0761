// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Twin BIM Worker - background tasks of the digital twin service.
//!
//! Runs one task per invocation and prints its result document to stdout.
//! Progress updates go to the log.
//!
//! # Tasks
//!
//! - `process-file <path> [--user-id <id>]` - Build and export the model of an IFC file
//! - `sensor <sensor-id> <json>` - Accept a sensor reading
//! - `report <type> [<json>]` - Produce a report location
//! - `health` - Liveness check

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

mod config;
mod error;
mod progress;
mod tasks;
mod types;

use config::Config;
use progress::ProgressReporter;

#[derive(Parser)]
#[command(name = "twin-bim-worker")]
#[command(about = "Background task worker for the digital twin service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process an IFC file and export its model as JSON
    ProcessFile {
        /// Path to the IFC file
        file_path: String,
        /// User who uploaded the file
        #[arg(long)]
        user_id: Option<String>,
    },
    /// Process one sensor reading
    Sensor {
        /// Sensor identifier
        sensor_id: String,
        /// Reading as a JSON object
        #[arg(value_parser = parse_json)]
        data: Value,
    },
    /// Generate a report
    Report {
        /// Report type, e.g. "energy"
        report_type: String,
        /// Report parameters as a JSON object
        #[arg(value_parser = parse_json)]
        parameters: Option<Value>,
    },
    /// Report service health
    Health,
}

fn parse_json(raw: &str) -> std::result::Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env();

    tracing::info!(
        output_dir = %config.output_dir.display(),
        worker_threads = config.worker_threads,
        task_time_limit_secs = config.task_time_limit_secs,
        task_soft_time_limit_secs = config.task_soft_time_limit_secs,
        parallel_elements = config.parallel_elements,
        "Starting Twin BIM Worker"
    );

    // Initialize rayon thread pool
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build_global()
    {
        tracing::warn!(error = %e, "Failed to configure rayon thread pool, using default");
    }

    let success = match cli.command {
        Commands::ProcessFile { file_path, user_id } => {
            let progress = ProgressReporter::new("process_file");
            let result = tasks::process_file(&config, file_path, user_id, &progress).await;
            print_json(&result)?;
            result.is_success()
        }
        Commands::Sensor { sensor_id, data } => {
            let progress = ProgressReporter::new("process_sensor_reading");
            let result = tasks::process_sensor_reading(sensor_id, data, &progress).await;
            print_json(&result)?;
            result.is_success()
        }
        Commands::Report {
            report_type,
            parameters,
        } => {
            let progress = ProgressReporter::new("generate_report");
            let result = tasks::generate_report(&config, report_type, parameters, &progress).await;
            print_json(&result)?;
            result.is_success()
        }
        Commands::Health => {
            print_json(&tasks::health_check())?;
            true
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

/// Logs go to stderr so stdout carries only the result document.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("info,twin_bim_worker=debug,twin_bim_processing=debug")
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.pretty().init(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
