// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor reading task.

use serde_json::Value;

use crate::error::{Result, TaskError};
use crate::progress::ProgressReporter;
use crate::types::{ProcessedReading, SensorResult, SensorTask, TaskResult};

/// Accept one sensor reading. `data` must be a JSON object.
pub async fn process_sensor_reading(
    sensor_id: String,
    data: Value,
    progress: &ProgressReporter,
) -> SensorResult {
    tracing::info!(sensor_id = %sensor_id, "Processing sensor data");

    let result = run(&sensor_id, data, progress);
    match &result {
        Ok(_) => tracing::info!(sensor_id = %sensor_id, "Sensor data processing completed"),
        Err(e) => tracing::error!(sensor_id = %sensor_id, error = %e, "Error processing sensor data"),
    }

    TaskResult::from_result(result, SensorTask { sensor_id })
}

fn run(sensor_id: &str, data: Value, progress: &ProgressReporter) -> Result<ProcessedReading> {
    progress.report(0, "Processing sensor data...");

    if sensor_id.trim().is_empty() {
        return Err(TaskError::InvalidInput("sensor id is empty".into()));
    }
    if !data.is_object() {
        return Err(TaskError::InvalidInput(format!(
            "sensor data must be a JSON object, got {}",
            json_kind(&data)
        )));
    }

    progress.report(50, "Storing data...");
    tracing::debug!(sensor_id, fields = data.as_object().map_or(0, |o| o.len()), "reading accepted");

    progress.report(100, "Completed");
    Ok(ProcessedReading {
        sensor_id: sensor_id.to_string(),
        processed_data: data,
        timestamp: super::unix_timestamp(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
