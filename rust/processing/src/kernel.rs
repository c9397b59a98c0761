// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Kernel interface
//!
//! The pipeline never parses IFC or tessellates geometry itself. It talks to
//! a schema/geometry kernel through the three traits below: [`IfcKernel`]
//! opens files, [`FileHandle`] answers type queries and generates shapes,
//! and [`EntityHandle`] exposes attribute reflection and the relationships
//! extraction walks (property definitions, material associations,
//! containment and the placement chain).
//!
//! [`crate::step::StepKernel`] is the implementation shipped with the crate.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::settings::ShapeSettings;

pub type KernelResult<T> = std::result::Result<T, KernelError>;

/// Failure reported by a kernel call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    #[error("kernel unavailable: {0}")]
    Unavailable(String),

    #[error("cannot open {path}: {message}")]
    Open { path: PathBuf, message: String },

    #[error("attribute '{attribute}' of #{entity}: {message}")]
    Attribute {
        entity: u32,
        attribute: String,
        message: String,
    },

    #[error("relationship traversal from #{entity} failed: {message}")]
    Relationship { entity: u32, message: String },

    #[error("shape generation for #{entity} failed: {message}")]
    Shape { entity: u32, message: String },
}

/// Attribute value as seen through kernel reflection
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Enum(String),
    /// Reference to another entity by kernel id
    Reference(u32),
    List(Vec<Value>),
    /// Defined-type wrapper such as `IFCLABEL('x')`
    Typed { type_name: String, value: Box<Value> },
}

impl Value {
    /// Value with defined-type wrappers removed
    pub fn unwrapped(&self) -> &Value {
        match self {
            Value::Typed { value, .. } => value.unwrapped(),
            other => other,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self.unwrapped() {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// String form used for direct attributes in the property map
///
/// Reals keep a decimal point (`3.0`), booleans read `True`/`False`,
/// references print as `#id` and lists as `(a, b)`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) | Value::Enum(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{:?}", r),
            Value::Boolean(true) => f.write_str("True"),
            Value::Boolean(false) => f.write_str("False"),
            Value::Reference(id) => write!(f, "#{}", id),
            Value::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
            Value::Typed { value, .. } => write!(f, "{}", value),
        }
    }
}

/// Flat shape buffers as produced by the geometry kernel
///
/// `verts` holds xyz triples, `faces` index triples and `edges` index pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeBuffers {
    pub verts: Vec<f64>,
    pub faces: Vec<u32>,
    pub edges: Vec<u32>,
}

/// One property set attached through IsDefinedBy
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySetData {
    pub name: Option<String>,
    /// Single-value properties in declaration order; `None` when the
    /// nominal value is unset
    pub properties: Vec<(String, Option<Value>)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialData {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// Target of a material association
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialSelect {
    Material(MaterialData),
    /// Layer sets, profile sets, constituent sets and lists
    Other { type_name: String },
}

/// One IfcLocalPlacement in an element's placement chain
///
/// Coordinates are in metres.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementNode {
    pub location: Option<[f64; 3]>,
    pub axis: Option<[f64; 3]>,
    pub ref_direction: Option<[f64; 3]>,
    pub relative_to: Option<Box<PlacementNode>>,
}

/// Entry point of a kernel implementation
pub trait IfcKernel: Send + Sync {
    type File: FileHandle;

    fn name(&self) -> &str;

    /// Check that the kernel can be used at all
    fn probe(&self) -> KernelResult<()>;

    fn open(&self, path: &Path) -> KernelResult<Self::File>;
}

/// An opened IFC file
pub trait FileHandle: Send + Sync {
    type Entity: EntityHandle;

    /// Schema identifier such as `IFC4`
    fn schema_version(&self) -> String;

    /// All instances of `type_name` and its subtypes, in file order
    fn entities_of_type(&self, type_name: &str) -> KernelResult<Vec<Self::Entity>>;

    fn generate_shape(
        &self,
        settings: &ShapeSettings,
        entity: &Self::Entity,
    ) -> KernelResult<ShapeBuffers>;

    /// Name of the project length unit, e.g. `millimeters`
    fn length_unit_name(&self) -> Option<String> {
        None
    }
}

/// Reflection over a single entity
pub trait EntityHandle: Clone + Send + Sync {
    /// Kernel-assigned numeric id
    fn id(&self) -> u32;

    /// Schema type name, e.g. `IfcWallStandardCase`
    fn type_name(&self) -> &str;

    fn is_a(&self, type_name: &str) -> bool;

    /// Whether the entity's schema declares `name`
    fn has_attribute(&self, name: &str) -> bool;

    /// Declared attribute names in schema order
    fn attribute_names(&self) -> Vec<String>;

    /// Value of a declared attribute; `Ok(None)` when unset
    ///
    /// Asking for an attribute the schema does not declare is an error.
    fn attribute(&self, name: &str) -> KernelResult<Option<Value>>;

    fn property_sets(&self) -> KernelResult<Vec<PropertySetData>>;

    fn material_associations(&self) -> KernelResult<Vec<MaterialSelect>>;

    /// Local placement chain; `None` when there is no IfcLocalPlacement
    fn object_placement(&self) -> KernelResult<Option<PlacementNode>>;

    /// Elements contained in this spatial structure element
    fn contained_elements(&self) -> KernelResult<Vec<Self>>;

    /// Read an optional text attribute
    ///
    /// Undeclared attributes and unset values yield `None`; a value of any
    /// other kind is an error.
    fn text_attribute(&self, name: &str) -> KernelResult<Option<String>> {
        if !self.has_attribute(name) {
            return Ok(None);
        }
        match self.attribute(name)? {
            None => Ok(None),
            Some(value) => match value.as_text() {
                Some(text) => Ok(Some(text.to_string())),
                None => Err(KernelError::Attribute {
                    entity: self.id(),
                    attribute: name.to_string(),
                    message: format!("expected text, found {}", value),
                }),
            },
        }
    }
}
