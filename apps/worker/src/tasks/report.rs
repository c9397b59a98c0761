// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Report generation task.

use serde_json::Value;

use crate::config::Config;
use crate::error::{Result, TaskError};
use crate::progress::ProgressReporter;
use crate::types::{GeneratedReport, ReportResult, ReportTask, TaskResult};

/// Produce the report location for `report_type`.
///
/// `parameters`, when given, must be a JSON object and is echoed back.
pub async fn generate_report(
    config: &Config,
    report_type: String,
    parameters: Option<Value>,
    progress: &ProgressReporter,
) -> ReportResult {
    tracing::info!(report_type = %report_type, "Generating report");

    let result = run(config, &report_type, parameters, progress);
    match &result {
        Ok(report) => tracing::info!(
            report_type = %report_type,
            report_url = %report.report_url,
            "Report generation completed"
        ),
        Err(e) => tracing::error!(report_type = %report_type, error = %e, "Error generating report"),
    }

    TaskResult::from_result(result, ReportTask { report_type })
}

fn run(
    config: &Config,
    report_type: &str,
    parameters: Option<Value>,
    progress: &ProgressReporter,
) -> Result<GeneratedReport> {
    progress.report(0, format!("Generating {report_type} report..."));

    let valid_name = !report_type.is_empty()
        && report_type
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid_name {
        return Err(TaskError::InvalidInput(format!(
            "report type '{report_type}' must be non-empty and use only letters, digits, '_' or '-'"
        )));
    }
    if let Some(params) = &parameters {
        if !params.is_object() {
            return Err(TaskError::InvalidInput("report parameters must be a JSON object".into()));
        }
    }

    progress.report(50, "Compiling data...");
    let report_url = format!(
        "{}/{}_{}.pdf",
        config.report_base_url,
        report_type,
        chrono::Utc::now().timestamp()
    );

    progress.report(100, "Report ready");
    Ok(GeneratedReport {
        report_type: report_type.to_string(),
        parameters,
        report_url,
    })
}
