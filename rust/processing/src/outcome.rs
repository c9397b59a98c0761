// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-field extraction outcomes and run diagnostics
//!
//! Every sub-extractor returns a [`FieldOutcome`]. The element extractor
//! resolves it to the field value (or its default) and keeps the status so
//! callers can see which fields degraded and why.

use std::fmt;

use serde::Serialize;

/// Result of extracting one field of one element
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome<T> {
    Ok(T),
    /// Source data absent; the documented default applies
    Default,
    /// Extraction failed; the documented default applies
    Skipped(String),
}

impl<T> FieldOutcome<T> {
    pub fn skipped(reason: impl ToString) -> Self {
        FieldOutcome::Skipped(reason.to_string())
    }

    pub fn status(&self) -> FieldStatus {
        match self {
            FieldOutcome::Ok(_) => FieldStatus::Ok,
            FieldOutcome::Default => FieldStatus::Default,
            FieldOutcome::Skipped(reason) => FieldStatus::Skipped(reason.clone()),
        }
    }

    /// Value, or `default` for `Default`/`Skipped`
    pub fn into_value_or(self, default: T) -> T {
        match self {
            FieldOutcome::Ok(value) => value,
            _ => default,
        }
    }

    /// Value as an option; absence and failure both map to `None`
    pub fn ok(self) -> Option<T> {
        match self {
            FieldOutcome::Ok(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: Default> FieldOutcome<T> {
    pub fn into_value(self) -> T {
        self.into_value_or(T::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum FieldStatus {
    Ok,
    Default,
    Skipped(String),
}

impl FieldStatus {
    pub fn is_skipped(&self) -> bool {
        matches!(self, FieldStatus::Skipped(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Geometry,
    Properties,
    Material,
    Location,
    ProjectName,
    ProjectDescription,
    BuildingName,
    BuildingDescription,
    FloorCount,
    TotalArea,
    Units,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Geometry => "geometry",
            Field::Properties => "properties",
            Field::Material => "material",
            Field::Location => "location",
            Field::ProjectName => "project_name",
            Field::ProjectDescription => "project_description",
            Field::BuildingName => "building_name",
            Field::BuildingDescription => "building_description",
            Field::FloorCount => "floor_count",
            Field::TotalArea => "total_area",
            Field::Units => "units",
        };
        f.write_str(name)
    }
}

/// Field statuses of one element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementDiagnostics {
    pub element_id: u32,
    pub entity_type: String,
    pub fields: Vec<(Field, FieldStatus)>,
}

impl ElementDiagnostics {
    pub fn new(element_id: u32, entity_type: impl Into<String>) -> Self {
        Self {
            element_id,
            entity_type: entity_type.into(),
            fields: Vec::with_capacity(4),
        }
    }

    pub fn record(&mut self, field: Field, status: FieldStatus) {
        self.fields.push((field, status));
    }

    pub fn status(&self, field: Field) -> Option<&FieldStatus> {
        self.fields.iter().find(|(f, _)| *f == field).map(|(_, s)| s)
    }

    pub fn is_degraded(&self) -> bool {
        self.fields.iter().any(|(_, s)| s.is_skipped())
    }
}

/// Entity dropped because its identity could not be read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEntity {
    pub entity_id: u32,
    pub entity_type: String,
    pub reason: String,
}

/// Category whose type query failed as a whole
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryFailure {
    pub category: String,
    pub reason: String,
}

/// Everything that degraded during one run
///
/// Returned next to the model; not part of the model document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub skipped_entities: Vec<SkippedEntity>,
    /// Elements with at least one skipped field
    pub degraded_elements: Vec<ElementDiagnostics>,
    pub category_failures: Vec<CategoryFailure>,
    /// Metadata fields that fell back after a failure
    pub metadata_fields: Vec<(Field, FieldStatus)>,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.skipped_entities.is_empty()
            && self.degraded_elements.is_empty()
            && self.category_failures.is_empty()
            && self.metadata_fields.is_empty()
    }

    pub fn element(&self, element_id: u32) -> Option<&ElementDiagnostics> {
        self.degraded_elements.iter().find(|d| d.element_id == element_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_resolution() {
        assert_eq!(FieldOutcome::Ok(3).into_value(), 3);
        assert_eq!(FieldOutcome::<i32>::Default.into_value(), 0);
        let skipped: FieldOutcome<Vec<u8>> = FieldOutcome::skipped("boom");
        assert_eq!(skipped.status(), FieldStatus::Skipped("boom".into()));
        assert!(skipped.into_value().is_empty());
        assert_eq!(FieldOutcome::<u8>::Default.ok(), None);
    }

    #[test]
    fn test_element_diagnostics() {
        let mut diag = ElementDiagnostics::new(5, "IfcWall");
        diag.record(Field::Geometry, FieldStatus::Ok);
        assert!(!diag.is_degraded());
        diag.record(Field::Material, FieldStatus::Skipped("bad".into()));
        assert!(diag.is_degraded());
        assert_eq!(diag.status(Field::Geometry), Some(&FieldStatus::Ok));
    }
}
