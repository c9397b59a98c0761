// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Worker tasks.
//!
//! Each task returns a [`TaskResult`](crate::types::TaskResult) and never
//! an error: failures become `ERROR` results carrying the task's
//! identifiers.

pub mod bim;
pub mod health;
pub mod report;
pub mod sensor;

pub use bim::process_file;
pub use health::health_check;
pub use report::generate_report;
pub use sensor::process_sensor_reading;

use std::time::Instant;

use crate::config::TimeLimits;
use crate::error::{Result, TaskError};

/// Run blocking work on the blocking pool under the task time limits.
///
/// Crossing the soft limit logs a warning; crossing the hard limit fails
/// the task. The blocking thread itself cannot be interrupted and is left
/// to finish on its own.
pub(crate) async fn run_limited<T, F>(task: &'static str, limits: TimeLimits, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let start = Instant::now();
    let mut handle = tokio::task::spawn_blocking(work);

    let soft = tokio::time::sleep(limits.soft);
    let hard = tokio::time::sleep(limits.hard);
    tokio::pin!(soft);
    tokio::pin!(hard);
    let mut warned = false;

    loop {
        tokio::select! {
            joined = &mut handle => {
                tracing::debug!(task, elapsed_ms = start.elapsed().as_millis() as u64, "blocking work finished");
                return joined?;
            }
            _ = &mut soft, if !warned => {
                warned = true;
                tracing::warn!(
                    task,
                    soft_limit_secs = limits.soft.as_secs(),
                    "task passed its soft time limit"
                );
            }
            _ = &mut hard => {
                tracing::error!(task, limit_secs = limits.hard.as_secs(), "task timed out");
                return Err(TaskError::TimedOut {
                    task,
                    limit_secs: limits.hard.as_secs(),
                });
            }
        }
    }
}

/// Seconds since the Unix epoch with millisecond precision
pub(crate) fn unix_timestamp() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
