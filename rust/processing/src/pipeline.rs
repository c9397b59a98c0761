// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Processing pipeline
//!
//! open -> metadata -> elements -> bounding box -> (export). Each stage
//! completes before the next starts and reports a [`Phase`] to the
//! caller's observer.

use std::path::Path;
use std::sync::mpsc;
use std::time::Instant;

use serde::Serialize;

use crate::bounds::bounding_box;
use crate::error::{Error, Result};
use crate::export::ModelExporter;
use crate::extract::{ElementExtractor, MetadataExtractor};
use crate::kernel::{FileHandle, IfcKernel};
use crate::model::{BimModel, Statistics};
use crate::outcome::Diagnostics;
use crate::settings::ProcessorSettings;
use crate::statistics::statistics;

/// Pipeline checkpoints, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loaded,
    MetadataExtracted,
    ElementsExtracted,
    AggregationComplete,
    ExportComplete,
}

/// Receives phase-completion signals
pub trait PhaseObserver {
    fn on_phase(&self, phase: Phase);
}

impl<F: Fn(Phase)> PhaseObserver for F {
    fn on_phase(&self, phase: Phase) {
        self(phase)
    }
}

impl PhaseObserver for mpsc::Sender<Phase> {
    fn on_phase(&self, phase: Phase) {
        // A dropped receiver just stops listening
        let _ = self.send(phase);
    }
}

/// Observer that ignores every phase
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PhaseObserver for NoopObserver {
    fn on_phase(&self, _phase: Phase) {}
}

/// A built model and what degraded while building it
#[derive(Debug, Clone)]
pub struct ProcessedModel {
    pub model: BimModel,
    pub diagnostics: Diagnostics,
}

/// Runs the extraction pipeline against one kernel
///
/// Holds no state between invocations; one instance can process many files,
/// from several threads at once.
pub struct BimProcessor<K: IfcKernel> {
    kernel: K,
    settings: ProcessorSettings,
}

impl<K: IfcKernel> BimProcessor<K> {
    /// Create a processor, failing if the kernel cannot be used
    pub fn new(kernel: K, settings: ProcessorSettings) -> Result<Self> {
        kernel.probe().map_err(|e| Error::KernelUnavailable {
            kernel: kernel.name().to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(kernel = kernel.name(), categories = settings.categories.len(), "processor ready");
        Ok(Self { kernel, settings })
    }

    pub fn settings(&self) -> &ProcessorSettings {
        &self.settings
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Open `path` and build its model
    pub fn process_file<O>(&self, path: impl AsRef<Path>, observer: &O) -> Result<ProcessedModel>
    where
        O: PhaseObserver + ?Sized,
    {
        let path = path.as_ref();
        let start = Instant::now();
        tracing::info!(path = %path.display(), "processing IFC file");

        let file = self.kernel.open(path).map_err(|source| Error::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(load_time_ms = start.elapsed().as_millis() as u64, "file loaded");
        observer.on_phase(Phase::Loaded);

        Ok(self.process_handle(&file, observer))
    }

    /// Build the model of an already opened file
    pub fn process_handle<O>(&self, file: &K::File, observer: &O) -> ProcessedModel
    where
        O: PhaseObserver + ?Sized,
    {
        let start = Instant::now();

        let metadata = MetadataExtractor::new(&self.settings).extract(file);
        observer.on_phase(Phase::MetadataExtracted);

        let extraction = ElementExtractor::new(&self.settings).extract(file);
        observer.on_phase(Phase::ElementsExtracted);

        let bounding_box = bounding_box(&extraction.elements);
        let model = BimModel {
            id: metadata.metadata.project_name.clone(),
            name: metadata.metadata.project_name.clone(),
            version: file.schema_version(),
            elements: extraction.elements,
            metadata: metadata.metadata,
            bounding_box,
        };
        let diagnostics = Diagnostics {
            skipped_entities: extraction.skipped_entities,
            degraded_elements: extraction.degraded_elements,
            category_failures: extraction.category_failures,
            metadata_fields: metadata.degraded_fields,
        };
        observer.on_phase(Phase::AggregationComplete);

        tracing::info!(
            elements = model.elements.len(),
            skipped = diagnostics.skipped_entities.len(),
            degraded = diagnostics.degraded_elements.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "model built"
        );
        ProcessedModel { model, diagnostics }
    }

    /// Write the model document; the model stays valid if this fails
    pub fn export<O>(&self, model: &BimModel, path: impl AsRef<Path>, observer: &O) -> Result<()>
    where
        O: PhaseObserver + ?Sized,
    {
        ModelExporter::write(model, path)?;
        observer.on_phase(Phase::ExportComplete);
        Ok(())
    }

    pub fn statistics(&self, model: &BimModel) -> Statistics {
        statistics(model)
    }
}
