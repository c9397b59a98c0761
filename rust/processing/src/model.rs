// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model document types
//!
//! These are the records written by [`crate::ModelExporter`]; field names
//! are the JSON keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    #[default]
    Unknown,
    Mesh,
}

/// Normalized element geometry
///
/// With `kind == Mesh` every face and edge index is a valid vertex index.
/// The default (all empty, `Unknown`) stands for missing geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<[u32; 3]>,
    pub edges: Vec<[u32; 2]>,
    #[serde(rename = "type")]
    pub kind: GeometryKind,
}

impl Geometry {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Property map value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

// JSON has no NaN or infinity; those reals are written as strings
impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropertyValue::Boolean(b) => serializer.serialize_bool(*b),
            PropertyValue::Integer(i) => serializer.serialize_i64(*i),
            PropertyValue::Real(r) if r.is_finite() => serializer.serialize_f64(*r),
            PropertyValue::Real(r) => serializer.collect_str(r),
            PropertyValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Kernel id as a string
    pub id: String,
    pub name: String,
    /// Schema type name, e.g. `IfcWallStandardCase`
    #[serde(rename = "type")]
    pub element_type: String,
    pub global_id: String,
    pub geometry: Geometry,
    pub properties: BTreeMap<String, PropertyValue>,
    pub material: Option<Material>,
    pub location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub schema_version: String,
    pub project_name: String,
    pub project_description: String,
    pub building_name: String,
    pub building_description: String,
    pub floor_count: usize,
    pub total_area: f64,
    /// `total_area` comes from a per-slab constant, not measured geometry
    pub total_area_is_placeholder: bool,
    pub units: String,
}

impl Metadata {
    pub const DEFAULT_PROJECT_NAME: &'static str = "Unknown Project";
    pub const DEFAULT_BUILDING_NAME: &'static str = "Unknown Building";
    pub const DEFAULT_UNITS: &'static str = "meters";
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            schema_version: String::new(),
            project_name: Self::DEFAULT_PROJECT_NAME.to_string(),
            project_description: String::new(),
            building_name: Self::DEFAULT_BUILDING_NAME.to_string(),
            building_description: String::new(),
            floor_count: 0,
            total_area: 0.0,
            total_area_is_placeholder: false,
            units: Self::DEFAULT_UNITS.to_string(),
        }
    }
}

/// Axis-aligned box over all element vertices; zero box when there are none
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
    pub size: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BimModel {
    pub id: String,
    pub name: String,
    /// Schema version string
    pub version: String,
    pub elements: Vec<Element>,
    pub metadata: Metadata,
    pub bounding_box: BoundingBox,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSize {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_elements: usize,
    pub element_types: BTreeMap<String, usize>,
    pub unique_types: usize,
    pub model_size: ModelSize,
}
