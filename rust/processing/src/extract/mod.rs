// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extractors
//!
//! Field-level extractors (geometry, properties, material, location) return
//! a [`crate::FieldOutcome`]; [`ElementExtractor`] and [`MetadataExtractor`]
//! assemble them into model records.

mod element;
mod geometry;
mod material;
mod metadata;
mod placement;
mod properties;

pub use element::{ElementExtraction, ElementExtractor};
pub use geometry::{extract_geometry, reshape};
pub use material::extract_material;
pub use metadata::{MetadataExtraction, MetadataExtractor};
pub use placement::{extract_location, world_origin};
pub use properties::{extract_properties, PropertyMap};
