// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Worker configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use twin_bim_processing::{FloorAreaRule, ProcessorSettings};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory processed model documents are written to.
    pub output_dir: PathBuf,
    /// Prefix of generated report URLs.
    pub report_base_url: String,
    /// Hard wall-clock limit per task in seconds.
    pub task_time_limit_secs: u64,
    /// Soft limit in seconds; crossing it only logs a warning.
    pub task_soft_time_limit_secs: u64,
    /// Number of threads in the global rayon pool.
    pub worker_threads: usize,
    /// Extract elements of one category in parallel.
    pub parallel_elements: bool,
    /// Floor area credited per shaped slab.
    pub slab_placeholder_area: f64,
}

/// Hard and soft wall-clock limits of one task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeLimits {
    pub soft: Duration,
    pub hard: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            output_dir: std::env::var("OUTPUT_DIR")
                .unwrap_or_else(|_| ".".into())
                .into(),
            report_base_url: std::env::var("REPORT_BASE_URL")
                .unwrap_or_else(|_| "/reports".into())
                .trim_end_matches('/')
                .to_string(),
            task_time_limit_secs: std::env::var("TASK_TIME_LIMIT_SECS")
                .unwrap_or_else(|_| "1800".into())
                .parse()
                .unwrap_or(1800),
            task_soft_time_limit_secs: std::env::var("TASK_SOFT_TIME_LIMIT_SECS")
                .unwrap_or_else(|_| "1500".into())
                .parse()
                .unwrap_or(1500),
            worker_threads: std::env::var("WORKER_THREADS")
                .unwrap_or_else(|_| num_cpus::get().to_string())
                .parse()
                .unwrap_or_else(|_| num_cpus::get()),
            parallel_elements: std::env::var("PARALLEL_ELEMENTS")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            slab_placeholder_area: std::env::var("SLAB_PLACEHOLDER_AREA")
                .unwrap_or_else(|_| FloorAreaRule::DEFAULT_SLAB_AREA.to_string())
                .parse()
                .ok()
                .filter(|area: &f64| area.is_finite() && *area >= 0.0)
                .unwrap_or(FloorAreaRule::DEFAULT_SLAB_AREA),
        }
    }

    /// Settings for one processor instance
    pub fn processor_settings(&self) -> ProcessorSettings {
        ProcessorSettings::default()
            .with_parallel_elements(self.parallel_elements)
            .with_floor_area(FloorAreaRule::PlaceholderPerSlab {
                area_per_slab: self.slab_placeholder_area,
            })
    }

    pub fn time_limits(&self) -> TimeLimits {
        TimeLimits {
            soft: Duration::from_secs(self.task_soft_time_limit_secs),
            hard: Duration::from_secs(self.task_time_limit_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
