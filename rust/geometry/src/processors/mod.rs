// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry processors, one per family of representation items

mod boolean;
mod brep;
mod curve;
mod extrusion;
mod mapped;
mod tessellated;

pub use boolean::BooleanResultProcessor;
pub use brep::{FacetedBrepProcessor, SurfaceModelProcessor};
pub use curve::PolylineProcessor;
pub use extrusion::ExtrudedAreaSolidProcessor;
pub use mapped::MappedItemProcessor;
pub use tessellated::{PolygonalFaceSetProcessor, TriangulatedFaceSetProcessor};
