// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Task progress reporting.

use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

/// One progress update of a running task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: u32,
    pub total: u32,
    pub status: String,
}

/// Publishes progress of one task run.
///
/// Updates are always logged; when a listener is attached they are also
/// forwarded to it. Cheap to clone and usable from blocking threads.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    task: &'static str,
    task_id: Uuid,
    listener: Option<mpsc::UnboundedSender<Progress>>,
}

impl ProgressReporter {
    pub const TOTAL: u32 = 100;

    /// Reporter that only logs
    pub fn new(task: &'static str) -> Self {
        Self {
            task,
            task_id: Uuid::new_v4(),
            listener: None,
        }
    }

    /// Reporter that also forwards every update to the returned receiver
    pub fn channel(task: &'static str) -> (Self, mpsc::UnboundedReceiver<Progress>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let reporter = Self {
            listener: Some(tx),
            ..Self::new(task)
        };
        (reporter, rx)
    }

    pub fn report(&self, current: u32, status: impl Into<String>) {
        let progress = Progress {
            current: current.min(Self::TOTAL),
            total: Self::TOTAL,
            status: status.into(),
        };
        tracing::info!(
            task = self.task,
            task_id = %self.task_id,
            current = progress.current,
            total = progress.total,
            status = %progress.status,
            "progress"
        );
        if let Some(listener) = &self.listener {
            // Nobody listening any more is fine
            let _ = listener.send(progress);
        }
    }
}
