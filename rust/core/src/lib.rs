// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Twin BIM Core
//!
//! STEP/IFC parser built with [nom](https://docs.rs/nom), plus the entity
//! model the extraction pipeline runs on.
//!
//! - **Tokenization**: zero-copy parsing of entity instances
//! - **Entity Scanning**: [memchr](https://docs.rs/memchr) based discovery of instances
//! - **Lazy Decoding**: attributes are parsed on demand from byte offsets
//! - **Schema tables**: canonical names, subtype checks and attribute names
//!   for the building subset of IFC2X3 and IFC4
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use twin_bim_core::StepModel;
//!
//! let model = StepModel::open("tower.ifc")?;
//! for id in model.entities_of_type("IfcWall") {
//!     let wall = model.decode(id)?;
//!     println!("#{} {:?}", id, wall.get_string(2));
//! }
//! ```

pub mod decoder;
pub mod error;
pub mod header;
pub mod model;
pub mod parser;
pub mod schema;
pub mod units;
pub mod value;

pub use decoder::{build_entity_index, EntityDecoder, EntityIndex};
pub use error::{Error, Result};
pub use header::{parse_header, SchemaVersion, StepHeader};
pub use model::StepModel;
pub use parser::{parse_entity, EntityScanner, Token};
pub use units::LengthUnit;
pub use value::{AttributeValue, DecodedEntity};
