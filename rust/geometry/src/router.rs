// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shape generation - dispatch of representation items to processors
//!
//! An element's IfcProductDefinitionShape is walked representation by
//! representation; each item is routed to the processor registered for its
//! type and the resulting meshes are merged, placed and scaled.

use std::sync::Arc;

use crate::processors::{
    BooleanResultProcessor, ExtrudedAreaSolidProcessor, FacetedBrepProcessor,
    MappedItemProcessor, PolygonalFaceSetProcessor, PolylineProcessor,
    SurfaceModelProcessor, TriangulatedFaceSetProcessor,
};
use crate::transform::object_placement;
use crate::{Error, Mesh, Result};
use rustc_hash::FxHashMap;
use twin_bim_core::{DecodedEntity, EntityDecoder};

/// Nesting limit for mapped items and boolean operands
pub const MAX_ITEM_DEPTH: usize = 16;

/// Representation identifiers treated as solid body geometry
const BODY_IDENTIFIERS: &[&str] = &["Body", "Facetation", "Body-FallBack", "Mesh"];
/// Representation identifiers and types treated as curves
const CURVE_REPRESENTATIONS: &[&str] = &["Axis", "FootPrint", "Curve", "Curve2D", "Curve3D"];

/// Options controlling shape generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeOptions {
    /// Apply the element's placement chain (world coordinates)
    pub world_coords: bool,
    /// Emit edges for curve items and curve representations
    pub include_curves: bool,
    /// Multiplier from file units to metres
    pub unit_scale: f64,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self {
            world_coords: true,
            include_curves: true,
            unit_scale: 1.0,
        }
    }
}

/// Per-call state handed to processors
pub struct ItemContext<'g> {
    pub generator: &'g ShapeGenerator,
    pub depth: usize,
}

impl ItemContext<'_> {
    /// Process a nested item one level deeper
    pub fn process_nested(&self, item: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Mesh> {
        if self.depth >= MAX_ITEM_DEPTH {
            return Err(Error::geometry(format!(
                "item nesting at #{} exceeds {} levels",
                item.id, MAX_ITEM_DEPTH
            )));
        }
        self.generator.process_item(item, decoder, self.depth + 1)
    }
}

/// Geometry processor trait
/// Each processor handles one family of IFC representation items
pub trait GeometryProcessor: Send + Sync {
    /// Process a representation item into a mesh in its local coordinates
    fn process(
        &self,
        item: &DecodedEntity,
        decoder: &mut EntityDecoder,
        ctx: &ItemContext<'_>,
    ) -> Result<Mesh>;

    /// Upper-case type keywords handled by this processor
    fn supported_types(&self) -> &'static [&'static str];
}

/// Shape generator - routes representation items to processors
pub struct ShapeGenerator {
    processors: FxHashMap<&'static str, Arc<dyn GeometryProcessor>>,
    options: ShapeOptions,
}

impl ShapeGenerator {
    /// Create a generator with the default processors
    pub fn new(options: ShapeOptions) -> Self {
        let mut generator = Self {
            processors: FxHashMap::default(),
            options,
        };
        generator.register(Arc::new(ExtrudedAreaSolidProcessor));
        generator.register(Arc::new(TriangulatedFaceSetProcessor));
        generator.register(Arc::new(PolygonalFaceSetProcessor));
        generator.register(Arc::new(FacetedBrepProcessor));
        generator.register(Arc::new(SurfaceModelProcessor));
        generator.register(Arc::new(MappedItemProcessor));
        generator.register(Arc::new(BooleanResultProcessor));
        generator.register(Arc::new(PolylineProcessor));
        generator
    }

    /// Register a processor for every type it supports
    pub fn register(&mut self, processor: Arc<dyn GeometryProcessor>) {
        for type_name in processor.supported_types() {
            self.processors.insert(*type_name, Arc::clone(&processor));
        }
    }

    pub fn options(&self) -> &ShapeOptions {
        &self.options
    }

    /// Generate the mesh of a product
    ///
    /// Representation is attribute 6 of IfcProduct. The mesh is placed with
    /// the object placement when `world_coords` is set and always scaled to
    /// metres.
    pub fn generate(&self, product: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Mesh> {
        let shape = decoder
            .resolve_attr(product, 6)?
            .ok_or(Error::NoRepresentation(product.id))?;

        // IfcProductDefinitionShape: 0 Name, 1 Description, 2 Representations
        let representations = match shape.get(2) {
            Some(reps) => decoder.resolve_ref_list(reps)?,
            None => Vec::new(),
        };

        let mut mesh = Mesh::new();
        let mut first_error = None;
        for representation in representations {
            if !self.accepts_representation(&representation) {
                continue;
            }
            match self.process_representation(&representation, decoder, 0) {
                Ok(part) => mesh.merge(&part),
                Err(e) => {
                    tracing::debug!(
                        product = product.id,
                        representation = representation.id,
                        error = %e,
                        "representation skipped"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        if mesh.is_empty() {
            return Err(first_error.unwrap_or_else(|| {
                Error::EmptyMesh(format!("#{} produced no geometry", product.id))
            }));
        }

        if self.options.world_coords {
            let placement = object_placement(product, decoder)?;
            mesh.transform(&placement);
        }
        mesh.scale(self.options.unit_scale);
        Ok(mesh)
    }

    /// IfcShapeRepresentation: 0 ContextOfItems, 1 RepresentationIdentifier,
    /// 2 RepresentationType, 3 Items
    fn accepts_representation(&self, representation: &DecodedEntity) -> bool {
        let identifier = representation.get_string(1);
        let kind = representation.get_string(2);

        let is_curve = [identifier, kind]
            .into_iter()
            .flatten()
            .any(|s| CURVE_REPRESENTATIONS.contains(&s));
        if is_curve {
            return self.options.include_curves;
        }
        match identifier {
            Some(identifier) => BODY_IDENTIFIERS.contains(&identifier),
            None => true,
        }
    }

    /// Process all items of a shape representation and merge them
    pub fn process_representation(
        &self,
        representation: &DecodedEntity,
        decoder: &mut EntityDecoder,
        depth: usize,
    ) -> Result<Mesh> {
        let items = match representation.get(3) {
            Some(items) => decoder.resolve_ref_list(items)?,
            None => Vec::new(),
        };

        let mut mesh = Mesh::new();
        let mut first_error = None;
        for item in items {
            match self.process_item(&item, decoder, depth) {
                Ok(part) => mesh.merge(&part),
                Err(e) => {
                    tracing::debug!(item = item.id, kind = %item.type_name, error = %e, "item skipped");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if mesh.is_empty() => Err(e),
            _ => Ok(mesh),
        }
    }

    /// Route a single representation item to its processor
    pub fn process_item(
        &self,
        item: &DecodedEntity,
        decoder: &mut EntityDecoder,
        depth: usize,
    ) -> Result<Mesh> {
        let processor = self
            .processors
            .get(item.type_name.as_str())
            .ok_or_else(|| Error::UnsupportedItem(item.type_name.clone()))?;

        let mesh = processor.process(item, decoder, &ItemContext { generator: self, depth })?;
        if !self.options.include_curves && mesh.indices.is_empty() {
            // Curve-only output is dropped when curves are disabled
            return Ok(Mesh::new());
        }
        Ok(mesh)
    }
}

impl Default for ShapeGenerator {
    fn default() -> Self {
        Self::new(ShapeOptions::default())
    }
}
