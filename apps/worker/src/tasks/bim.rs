// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BIM file processing task.

use std::path::{Path, PathBuf};

use twin_bim_processing::{BimProcessor, Phase, StepKernel};

use crate::config::Config;
use crate::error::{Result, TaskError};
use crate::progress::ProgressReporter;
use crate::types::{FileTask, ProcessFileResult, ProcessedFile, TaskResult};

const TASK: &str = "process_file";

/// Process one IFC file and write `processed_{name}.json` to the output
/// directory.
pub async fn process_file(
    config: &Config,
    file_path: String,
    user_id: Option<String>,
    progress: &ProgressReporter,
) -> ProcessFileResult {
    tracing::info!(file_path = %file_path, user_id = ?user_id, "Starting BIM file processing");

    let result = run(config, &file_path, user_id.clone(), progress).await;
    match &result {
        Ok(done) => tracing::info!(
            file_path = %file_path,
            output_path = %done.output_path,
            elements = done.statistics.total_elements,
            "BIM file processing completed"
        ),
        Err(e) => tracing::error!(file_path = %file_path, error = %e, "Error processing BIM file"),
    }

    TaskResult::from_result(result, FileTask { file_path, user_id })
}

async fn run(
    config: &Config,
    file_path: &str,
    user_id: Option<String>,
    progress: &ProgressReporter,
) -> Result<ProcessedFile> {
    progress.report(0, "Loading BIM file...");

    let output_path = output_path(&config.output_dir, file_path)?;
    let settings = config.processor_settings();
    let input = PathBuf::from(file_path);
    let output = output_path.clone();
    let reporter = progress.clone();

    let statistics = super::run_limited(TASK, config.time_limits(), move || {
        let observer = |phase: Phase| match phase {
            Phase::MetadataExtracted => reporter.report(25, "Processing BIM elements..."),
            Phase::AggregationComplete => reporter.report(75, "Generating statistics..."),
            Phase::ExportComplete => reporter.report(100, "Completed"),
            Phase::Loaded | Phase::ElementsExtracted => {}
        };

        let processor = BimProcessor::new(StepKernel, settings)?;
        let processed = processor.process_file(&input, &observer)?;
        if !processed.diagnostics.is_clean() {
            tracing::warn!(
                skipped = processed.diagnostics.skipped_entities.len(),
                degraded = processed.diagnostics.degraded_elements.len(),
                category_failures = processed.diagnostics.category_failures.len(),
                "model built with degraded data"
            );
        }

        let statistics = processor.statistics(&processed.model);
        processor.export(&processed.model, &output, &observer)?;
        Ok(statistics)
    })
    .await?;

    Ok(ProcessedFile {
        file_path: file_path.to_string(),
        output_path: output_path.display().to_string(),
        statistics,
        user_id,
    })
}

fn output_path(output_dir: &Path, file_path: &str) -> Result<PathBuf> {
    let name = Path::new(file_path)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| TaskError::InvalidInput(format!("'{file_path}' does not name a file")))?;
    Ok(output_dir.join(format!("processed_{name}.json")))
}
