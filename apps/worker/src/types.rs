// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Task result documents.

use serde::Serialize;
use serde_json::Value;
use twin_bim_processing::Statistics;

use crate::error::TaskError;

/// Outcome of one task, tagged by `status`.
///
/// `SUCCESS` carries the payload fields; `ERROR` carries the message and
/// the identifiers the task was called with.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskResult<T, I> {
    Success(T),
    Error(TaskFailure<I>),
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskFailure<I> {
    #[serde(flatten)]
    pub identifiers: I,
    pub error: String,
}

impl<T, I> TaskResult<T, I> {
    pub fn from_result(result: Result<T, TaskError>, identifiers: I) -> Self {
        match result {
            Ok(payload) => TaskResult::Success(payload),
            Err(e) => TaskResult::Error(TaskFailure {
                identifiers,
                error: e.to_string(),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskResult::Success(_))
    }
}

// process-file

#[derive(Debug, Clone, Serialize)]
pub struct ProcessedFile {
    pub file_path: String,
    pub output_path: String,
    pub statistics: Statistics,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileTask {
    pub file_path: String,
    pub user_id: Option<String>,
}

pub type ProcessFileResult = TaskResult<ProcessedFile, FileTask>;

// sensor

#[derive(Debug, Clone, Serialize)]
pub struct ProcessedReading {
    pub sensor_id: String,
    pub processed_data: Value,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SensorTask {
    pub sensor_id: String,
}

pub type SensorResult = TaskResult<ProcessedReading, SensorTask>;

// report

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedReport {
    pub report_type: String,
    pub parameters: Option<Value>,
    pub report_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportTask {
    pub report_type: String,
}

pub type ReportResult = TaskResult<GeneratedReport, ReportTask>;

// health

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: f64,
    pub service: &'static str,
}
