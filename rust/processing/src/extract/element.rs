// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element extraction
//!
//! Categories are queried in settings order and entities in kernel order.
//! An entity matched by an earlier category (type queries include
//! subtypes) is not emitted again.

use rayon::prelude::*;
use rustc_hash::FxHashSet;

use super::geometry::extract_geometry;
use super::material::extract_material;
use super::placement::extract_location;
use super::properties::extract_properties;
use crate::kernel::{EntityHandle, FileHandle, KernelError};
use crate::model::{Element, Geometry};
use crate::outcome::{CategoryFailure, ElementDiagnostics, Field, SkippedEntity};
use crate::settings::ProcessorSettings;

/// Output of one extraction pass
#[derive(Debug, Default)]
pub struct ElementExtraction {
    pub elements: Vec<Element>,
    pub skipped_entities: Vec<SkippedEntity>,
    pub degraded_elements: Vec<ElementDiagnostics>,
    pub category_failures: Vec<CategoryFailure>,
}

type EntityResult = Result<(Element, ElementDiagnostics), SkippedEntity>;

pub struct ElementExtractor<'s> {
    settings: &'s ProcessorSettings,
}

impl<'s> ElementExtractor<'s> {
    pub fn new(settings: &'s ProcessorSettings) -> Self {
        Self { settings }
    }

    pub fn extract<F: FileHandle>(&self, file: &F) -> ElementExtraction {
        let mut extraction = ElementExtraction::default();
        let mut seen: FxHashSet<u32> = FxHashSet::default();

        for category in &self.settings.categories {
            let entities = match file.entities_of_type(category.ifc_type()) {
                Ok(entities) => entities,
                Err(e) => {
                    tracing::warn!(category = %category, error = %e, "category query failed");
                    extraction.category_failures.push(CategoryFailure {
                        category: category.to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let fresh: Vec<F::Entity> = entities.into_iter().filter(|e| seen.insert(e.id())).collect();
            tracing::debug!(category = %category, entities = fresh.len(), "extracting category");

            // Indexed collect keeps kernel order
            let results: Vec<EntityResult> = if self.settings.parallel_elements {
                fresh.par_iter().map(|entity| self.extract_entity(file, entity)).collect()
            } else {
                fresh.iter().map(|entity| self.extract_entity(file, entity)).collect()
            };

            for result in results {
                match result {
                    Ok((element, diagnostics)) => {
                        if diagnostics.is_degraded() {
                            extraction.degraded_elements.push(diagnostics);
                        }
                        extraction.elements.push(element);
                    }
                    Err(skipped) => extraction.skipped_entities.push(skipped),
                }
            }
        }

        extraction
    }

    /// Build one element; only an unreadable identity skips the entity
    pub fn extract_entity<F: FileHandle>(&self, file: &F, entity: &F::Entity) -> EntityResult {
        let id = entity.id();
        let element_type = entity.type_name().to_string();

        let (name, global_id) = match read_identity(entity) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(entity = id, kind = %element_type, error = %e, "skipping entity");
                return Err(SkippedEntity {
                    entity_id: id,
                    entity_type: element_type,
                    reason: e.to_string(),
                });
            }
        };

        let mut diagnostics = ElementDiagnostics::new(id, element_type.as_str());

        let geometry = extract_geometry(file, entity, &self.settings.shape);
        diagnostics.record(Field::Geometry, geometry.status());
        let properties = extract_properties(entity);
        diagnostics.record(Field::Properties, properties.status());
        let material = extract_material(entity);
        diagnostics.record(Field::Material, material.status());
        let location = extract_location(entity, &self.settings.shape);
        diagnostics.record(Field::Location, location.status());

        let element = Element {
            id: id.to_string(),
            name: name.unwrap_or_else(|| format!("{}_{}", element_type, id)),
            element_type,
            global_id: global_id.unwrap_or_default(),
            geometry: geometry.into_value_or(Geometry::default()),
            properties: properties.into_value(),
            material: material.ok(),
            location: location.ok(),
        };
        Ok((element, diagnostics))
    }
}

fn read_identity<E: EntityHandle>(entity: &E) -> Result<(Option<String>, Option<String>), KernelError> {
    let name = entity.text_attribute("Name")?;
    let global_id = entity.text_attribute("GlobalId")?;
    Ok((name, global_id))
}
