// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Twin BIM Geometry
//!
//! Turns the representation of an IFC product into a flat mesh: earcutr
//! triangulation for faces and profiles, nalgebra for placements.
//!
//! ```rust,ignore
//! use twin_bim_geometry::{ShapeGenerator, ShapeOptions};
//!
//! let generator = ShapeGenerator::new(ShapeOptions { unit_scale: 0.001, ..Default::default() });
//! let mut decoder = model.decoder();
//! let wall = decoder.decode_by_id(wall_id)?;
//! let mesh = generator.generate(&wall, &mut decoder)?;
//! ```

pub mod error;
pub mod mesh;
pub mod processors;
pub mod profile;
pub mod router;
pub mod transform;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector3};

pub use error::{Error, Result};
pub use mesh::Mesh;
pub use profile::Profile2D;
pub use router::{GeometryProcessor, ItemContext, ShapeGenerator, ShapeOptions};
pub use transform::{axis_placement_matrix, MAX_PLACEMENT_DEPTH};
