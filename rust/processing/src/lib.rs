// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Twin BIM Processing
//!
//! Turns an IFC file into a normalized building model: metadata, one record
//! per building element (geometry, properties, material, location), the
//! model bounding box and per-type statistics, exportable as JSON.
//!
//! ## Overview
//!
//! - **Kernel traits**: [`IfcKernel`], [`FileHandle`], [`EntityHandle`]
//! - **STEP kernel**: [`StepKernel`] over `twin-bim-core` and `twin-bim-geometry`
//! - **Pipeline**: [`BimProcessor`] with [`Phase`] signals
//! - **Outcomes**: per-field [`FieldOutcome`]s collected in [`Diagnostics`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use twin_bim_processing::{BimProcessor, NoopObserver, ProcessorSettings, StepKernel};
//!
//! let processor = BimProcessor::new(StepKernel, ProcessorSettings::default())?;
//! let processed = processor.process_file("building.ifc", &NoopObserver)?;
//! processor.export(&processed.model, "building.json", &NoopObserver)?;
//! println!("{:?}", processor.statistics(&processed.model));
//! ```

pub mod bounds;
pub mod category;
pub mod error;
pub mod export;
pub mod extract;
pub mod kernel;
pub mod model;
pub mod outcome;
pub mod pipeline;
pub mod settings;
pub mod statistics;
pub mod step;

pub use bounds::bounding_box;
pub use category::ElementCategory;
pub use error::{Error, ErrorKind, Result};
pub use export::ModelExporter;
pub use extract::{ElementExtractor, MetadataExtractor};
pub use kernel::{
    EntityHandle, FileHandle, IfcKernel, KernelError, KernelResult, MaterialData, MaterialSelect,
    PlacementNode, PropertySetData, ShapeBuffers, Value,
};
pub use model::{
    BimModel, BoundingBox, Element, Geometry, GeometryKind, Location, Material, Metadata,
    ModelSize, PropertyValue, Statistics,
};
pub use outcome::{
    CategoryFailure, Diagnostics, ElementDiagnostics, Field, FieldOutcome, FieldStatus,
    SkippedEntity,
};
pub use pipeline::{BimProcessor, NoopObserver, Phase, PhaseObserver, ProcessedModel};
pub use settings::{FloorAreaRule, ProcessorSettings, ShapeSettings};
pub use statistics::statistics;
pub use step::{StepEntity, StepFile, StepKernel};
