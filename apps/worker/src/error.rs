// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for worker tasks.

use thiserror::Error;

/// Task error types.
///
/// Never leaves a task: every variant ends up as the `error` message of an
/// `ERROR` result.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Processing error: {0}")]
    Processing(#[from] twin_bim_processing::Error),

    #[error("Task {task} exceeded its time limit of {limit_secs}s")]
    TimedOut { task: &'static str, limit_secs: u64 },

    #[error("Task panicked or was cancelled: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, TaskError>;
