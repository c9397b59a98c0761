// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Metadata extraction
//!
//! Project and building information come from the first IfcProject and
//! IfcBuilding. Floor count and area are computed over every
//! IfcBuildingStorey. Each field degrades on its own: a failed lookup leaves
//! that field at its default and is reported, the rest still extract.

use super::geometry::extract_geometry;
use crate::kernel::{EntityHandle, FileHandle, KernelResult};
use crate::model::{GeometryKind, Metadata};
use crate::outcome::{Field, FieldOutcome, FieldStatus};
use crate::settings::{FloorAreaRule, ProcessorSettings};

pub struct MetadataExtraction {
    pub metadata: Metadata,
    /// Fields that fell back to their default after a failure
    pub degraded_fields: Vec<(Field, FieldStatus)>,
}

pub struct MetadataExtractor<'s> {
    settings: &'s ProcessorSettings,
}

impl<'s> MetadataExtractor<'s> {
    pub fn new(settings: &'s ProcessorSettings) -> Self {
        Self { settings }
    }

    pub fn extract<F: FileHandle>(&self, file: &F) -> MetadataExtraction {
        let mut metadata = Metadata {
            schema_version: file.schema_version(),
            units: file
                .length_unit_name()
                .unwrap_or_else(|| Metadata::DEFAULT_UNITS.to_string()),
            total_area_is_placeholder: self.settings.floor_area.is_placeholder(),
            ..Metadata::default()
        };
        let mut degraded = Vec::new();

        let (name, description) = describe_first(file, "IfcProject");
        note(&mut degraded, Field::ProjectName, &name);
        note(&mut degraded, Field::ProjectDescription, &description);
        if let FieldOutcome::Ok(name) = name {
            metadata.project_name = name;
        }
        metadata.project_description = description.into_value();

        let (name, description) = describe_first(file, "IfcBuilding");
        note(&mut degraded, Field::BuildingName, &name);
        note(&mut degraded, Field::BuildingDescription, &description);
        if let FieldOutcome::Ok(name) = name {
            metadata.building_name = name;
        }
        metadata.building_description = description.into_value();

        match file.entities_of_type("IfcBuildingStorey") {
            Ok(storeys) => {
                metadata.floor_count = storeys.len();
                let area = self.total_area(file, &storeys);
                note(&mut degraded, Field::TotalArea, &area);
                metadata.total_area = area.into_value();
            }
            Err(e) => {
                let failed: FieldOutcome<()> = FieldOutcome::skipped(&e);
                note(&mut degraded, Field::FloorCount, &failed);
                note(&mut degraded, Field::TotalArea, &failed);
            }
        }

        tracing::debug!(
            project = %metadata.project_name,
            building = %metadata.building_name,
            floors = metadata.floor_count,
            total_area = metadata.total_area,
            "metadata extracted"
        );
        MetadataExtraction {
            metadata,
            degraded_fields: degraded,
        }
    }

    /// Sum of floor areas; a storey whose containment cannot be read
    /// contributes nothing and marks the total as skipped
    fn total_area<F: FileHandle>(&self, file: &F, storeys: &[F::Entity]) -> FieldOutcome<f64> {
        let mut total = 0.0;
        let mut failures = Vec::new();
        for storey in storeys {
            match self.floor_area(file, storey) {
                Ok(area) => total += area,
                Err(e) => failures.push(format!("#{}: {}", storey.id(), e)),
            }
        }
        if failures.is_empty() {
            FieldOutcome::Ok(total)
        } else {
            FieldOutcome::Skipped(failures.join("; "))
        }
    }

    pub fn floor_area<F: FileHandle>(&self, file: &F, storey: &F::Entity) -> KernelResult<f64> {
        match self.settings.floor_area {
            FloorAreaRule::PlaceholderPerSlab { area_per_slab } => {
                let mut area = 0.0;
                for element in storey.contained_elements()? {
                    if !element.is_a("IfcSlab") {
                        continue;
                    }
                    let shape = extract_geometry(file, &element, &self.settings.shape);
                    if matches!(&shape, FieldOutcome::Ok(g) if g.kind == GeometryKind::Mesh) {
                        area += area_per_slab;
                    }
                }
                Ok(area)
            }
        }
    }
}

fn note<T>(degraded: &mut Vec<(Field, FieldStatus)>, field: Field, outcome: &FieldOutcome<T>) {
    if let FieldOutcome::Skipped(reason) = outcome {
        tracing::warn!(field = %field, %reason, "metadata field degraded");
        degraded.push((field, FieldStatus::Skipped(reason.clone())));
    }
}

/// Name and description of the first instance of `type_name`
fn describe_first<F: FileHandle>(file: &F, type_name: &str) -> (FieldOutcome<String>, FieldOutcome<String>) {
    let first = match file.entities_of_type(type_name) {
        Ok(entities) => entities.into_iter().next(),
        Err(e) => return (FieldOutcome::skipped(&e), FieldOutcome::skipped(&e)),
    };
    let Some(entity) = first else {
        return (FieldOutcome::Default, FieldOutcome::Default);
    };
    (text_field(&entity, "Name"), text_field(&entity, "Description"))
}

fn text_field<E: EntityHandle>(entity: &E, attribute: &str) -> FieldOutcome<String> {
    match entity.text_attribute(attribute) {
        Ok(Some(text)) => FieldOutcome::Ok(text),
        Ok(None) => FieldOutcome::Default,
        Err(e) => FieldOutcome::skipped(e),
    }
}
