// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory STEP model
//!
//! Holds the file content, the entity index, a file-ordered type table and
//! inverse indexes for the relationships used by extraction
//! (IsDefinedBy, HasAssociations, ContainsElements).

use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::decoder::{build_entity_index, decode_instance, EntityDecoder, EntityIndex};
use crate::error::{Error, Result};
use crate::header::{parse_header, SchemaVersion, StepHeader};
use crate::parser::EntityScanner;
use crate::schema;
use crate::units::{extract_length_unit, LengthUnit};
use crate::value::DecodedEntity;

/// Relationship -> (related objects attribute, relating attribute)
const INVERSE_RELATIONSHIPS: &[(&str, usize, usize)] = &[
    ("IFCRELDEFINESBYPROPERTIES", 4, 5),
    ("IFCRELASSOCIATESMATERIAL", 4, 5),
    ("IFCRELCONTAINEDINSPATIALSTRUCTURE", 4, 5),
];

#[derive(Debug, Default)]
struct InverseIndex {
    /// object id -> IfcRelDefinesByProperties ids
    defined_by: FxHashMap<u32, Vec<u32>>,
    /// object id -> IfcRelAssociatesMaterial ids
    associations: FxHashMap<u32, Vec<u32>>,
    /// spatial structure id -> contained element ids
    contains: FxHashMap<u32, Vec<u32>>,
}

/// Parsed STEP file with lookup tables
pub struct StepModel {
    content: Arc<str>,
    index: Arc<EntityIndex>,
    /// (id, upper-case type keyword) in file order
    entities: Vec<(u32, String)>,
    header: StepHeader,
    inverse: InverseIndex,
    length_unit: LengthUnit,
}

impl std::fmt::Debug for StepModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepModel")
            .field("entities", &self.entities.len())
            .field("schema", &self.header.schema)
            .field("length_unit", &self.length_unit)
            .finish()
    }
}

impl StepModel {
    /// Read and index a STEP file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_content(content)
    }

    /// Index STEP content already in memory
    pub fn from_content(content: impl Into<String>) -> Result<Self> {
        let content: Arc<str> = Arc::from(content.into());
        let header = parse_header(&content)?;
        let index = Arc::new(build_entity_index(&content));

        let mut entities = Vec::with_capacity(index.len());
        let mut scanner = EntityScanner::new(&content);
        while let Some((id, type_name, _, _)) = scanner.next_entity() {
            entities.push((id, type_name.to_ascii_uppercase()));
        }

        let mut model = Self {
            content,
            index,
            entities,
            header,
            inverse: InverseIndex::default(),
            length_unit: LengthUnit::default(),
        };
        model.inverse = model.build_inverse_index();
        model.length_unit = model.read_length_unit();

        tracing::debug!(
            entities = model.entities.len(),
            schema = ?model.header.schema,
            unit = %model.length_unit.name,
            "indexed STEP model"
        );
        Ok(model)
    }

    fn build_inverse_index(&self) -> InverseIndex {
        let mut inverse = InverseIndex::default();

        for (id, type_name) in &self.entities {
            let Some(&(_, related_attr, relating_attr)) = INVERSE_RELATIONSHIPS
                .iter()
                .find(|(rel, _, _)| *rel == type_name.as_str())
            else {
                continue;
            };

            let rel = match self.decode(*id) {
                Ok(rel) => rel,
                Err(e) => {
                    tracing::warn!(rel = id, error = %e, "skipping undecodable relationship");
                    continue;
                }
            };
            let related = rel.get_refs(related_attr);

            match type_name.as_str() {
                "IFCRELDEFINESBYPROPERTIES" => {
                    for object in related {
                        inverse.defined_by.entry(object).or_default().push(*id);
                    }
                }
                "IFCRELASSOCIATESMATERIAL" => {
                    for object in related {
                        inverse.associations.entry(object).or_default().push(*id);
                    }
                }
                _ => {
                    if let Some(structure) = rel.get_ref(relating_attr) {
                        inverse.contains.entry(structure).or_default().extend(related);
                    }
                }
            }
        }

        inverse
    }

    fn read_length_unit(&self) -> LengthUnit {
        let Some(project_id) = self.entities_of_type("IfcProject").first().copied() else {
            return LengthUnit::default();
        };
        let mut decoder = self.decoder();
        let unit = decoder
            .decode_by_id(project_id)
            .and_then(|project| extract_length_unit(&mut decoder, &project));
        match unit {
            Ok(unit) => unit,
            Err(e) => {
                tracing::warn!(error = %e, "could not read project length unit, assuming meters");
                LengthUnit::default()
            }
        }
    }

    /// Raw file content
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn header(&self) -> &StepHeader {
        &self.header
    }

    /// Declared schema; `Other("unknown")` when FILE_SCHEMA is missing
    pub fn schema_version(&self) -> SchemaVersion {
        self.header
            .schema
            .clone()
            .unwrap_or_else(|| SchemaVersion::Other("unknown".to_string()))
    }

    pub fn length_unit(&self) -> &LengthUnit {
        &self.length_unit
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Shared entity index for building per-thread decoders
    pub fn index(&self) -> Arc<EntityIndex> {
        Arc::clone(&self.index)
    }

    /// New decoder over this model sharing its index
    pub fn decoder(&self) -> EntityDecoder<'_> {
        EntityDecoder::with_arc_index(&self.content, self.index())
    }

    /// Decode a single entity
    pub fn decode(&self, id: u32) -> Result<DecodedEntity> {
        let (start, end) = self
            .index
            .get(&id)
            .copied()
            .ok_or(Error::EntityNotFound(id))?;
        decode_instance(&self.content[start..end], start)
    }

    /// Upper-case type keyword of an entity
    pub fn type_of(&self, id: u32) -> Option<&str> {
        let (start, end) = self.index.get(&id).copied()?;
        let text = &self.content[start..end];
        let eq = text.find('=')?;
        let rest = text[eq + 1..].trim_start();
        let end = rest.find(|c: char| c == '(' || c.is_whitespace())?;
        Some(&rest[..end])
    }

    /// Ids of all instances of `type_name` or its subtypes, in file order
    ///
    /// Matching is case-insensitive on the type keyword.
    pub fn entities_of_type(&self, type_name: &str) -> Vec<u32> {
        self.entities
            .iter()
            .filter(|(_, t)| schema::is_subtype_of(t, type_name))
            .map(|(id, _)| *id)
            .collect()
    }

    /// IfcRelDefinesByProperties relationships that reference `id`
    pub fn defined_by(&self, id: u32) -> &[u32] {
        self.inverse.defined_by.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// IfcRelAssociatesMaterial relationships that reference `id`
    pub fn material_associations(&self, id: u32) -> &[u32] {
        self.inverse.associations.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Elements contained in the spatial structure `id`
    pub fn contained_elements(&self, id: u32) -> &[u32] {
        self.inverse.contains.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n\
#1=IFCPROJECT('0YvctVUKr0kugbFTf53O9L',$,'Tower',$,$,$,$,$,#2);\n\
#2=IFCUNITASSIGNMENT((#3));\n\
#3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);\n\
#10=IFCBUILDINGSTOREY('s1',$,'Level 1',$,$,$,$,$,.ELEMENT.,0.);\n\
#20=IFCWALLSTANDARDCASE('w1',$,'Wall A',$,$,$,$,$,$);\n\
#21=IFCWALL('w2',$,'Wall B',$,$,$,$,$,$);\n\
#22=IFCSLAB('s',$,'Slab',$,$,$,$,$,.FLOOR.);\n\
#30=IFCRELCONTAINEDINSPATIALSTRUCTURE('r1',$,$,$,(#20,#22),#10);\n\
#31=IFCMATERIAL('Concrete',$,$);\n\
#32=IFCRELASSOCIATESMATERIAL('r2',$,$,$,(#20,#21),#31);\n\
ENDSEC;\nEND-ISO-10303-21;\n";

    #[test]
    fn test_model_tables() {
        let model = StepModel::from_content(CONTENT).unwrap();
        assert_eq!(model.schema_version(), SchemaVersion::Ifc4);
        assert_eq!(model.length_unit().name, "millimeters");
        assert_eq!(model.entity_count(), 10);

        assert_eq!(model.entities_of_type("IfcWall"), vec![20, 21]);
        assert_eq!(model.entities_of_type("ifcwallstandardcase"), vec![20]);
        assert_eq!(model.contained_elements(10), &[20, 22]);
        assert_eq!(model.material_associations(21), &[32]);
        assert!(model.defined_by(20).is_empty());
        assert_eq!(model.type_of(22), Some("IFCSLAB"));
    }

    #[test]
    fn test_open_missing_file() {
        let err = StepModel::open("/definitely/not/here.ifc").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_open_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.ifc");
        std::fs::write(&path, CONTENT).unwrap();
        let model = StepModel::open(&path).unwrap();
        assert_eq!(model.decode(31).unwrap().get_string(0), Some("Concrete"));
    }

    #[test]
    fn test_rejects_non_step() {
        assert!(matches!(
            StepModel::from_content("hello world"),
            Err(Error::MissingHeader)
        ));
    }
}
