// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP kernel
//!
//! Implements the kernel traits over [`twin_bim_core::StepModel`] for schema
//! access and [`twin_bim_geometry::ShapeGenerator`] for shapes. Lengths are
//! reported in metres.

use std::path::Path;
use std::sync::Arc;

use twin_bim_core::schema::{self, attribute_index, attribute_names, canonical_name};
use twin_bim_core::{AttributeValue, DecodedEntity, SchemaVersion, StepModel};
use twin_bim_geometry::{ShapeGenerator, ShapeOptions, MAX_PLACEMENT_DEPTH};

use crate::kernel::{
    EntityHandle, FileHandle, IfcKernel, KernelError, KernelResult, MaterialData, MaterialSelect,
    PlacementNode, PropertySetData, ShapeBuffers, Value,
};
use crate::settings::ShapeSettings;

/// Kernel backed by the in-crate STEP parser and geometry processors
#[derive(Debug, Clone, Copy, Default)]
pub struct StepKernel;

impl IfcKernel for StepKernel {
    type File = StepFile;

    fn name(&self) -> &str {
        "step"
    }

    fn probe(&self) -> KernelResult<()> {
        Ok(())
    }

    fn open(&self, path: &Path) -> KernelResult<StepFile> {
        let model = StepModel::open(path).map_err(|e| KernelError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(StepFile::from_model(model))
    }
}

/// Opened STEP file
#[derive(Debug, Clone)]
pub struct StepFile {
    model: Arc<StepModel>,
    schema: SchemaVersion,
}

impl StepFile {
    pub fn from_model(model: StepModel) -> Self {
        let schema = model.schema_version();
        Self {
            model: Arc::new(model),
            schema,
        }
    }

    /// Index STEP content held in memory
    pub fn from_content(content: impl Into<String>) -> KernelResult<Self> {
        let model = StepModel::from_content(content).map_err(|e| KernelError::Open {
            path: "<memory>".into(),
            message: e.to_string(),
        })?;
        Ok(Self::from_model(model))
    }

    pub fn model(&self) -> &StepModel {
        &self.model
    }

    /// Handle for entity `id`
    ///
    /// An entity that fails to decode still yields a handle; its attribute
    /// reads report the decode error.
    pub fn entity(&self, id: u32) -> StepEntity {
        StepEntity::new(Arc::clone(&self.model), self.schema.clone(), id)
    }
}

impl FileHandle for StepFile {
    type Entity = StepEntity;

    fn schema_version(&self) -> String {
        self.schema.to_string()
    }

    fn entities_of_type(&self, type_name: &str) -> KernelResult<Vec<StepEntity>> {
        Ok(self
            .model
            .entities_of_type(type_name)
            .into_iter()
            .map(|id| self.entity(id))
            .collect())
    }

    fn generate_shape(&self, settings: &ShapeSettings, entity: &StepEntity) -> KernelResult<ShapeBuffers> {
        let product = entity.decoded().map_err(|message| KernelError::Shape {
            entity: entity.id,
            message: message.to_string(),
        })?;

        let generator = ShapeGenerator::new(ShapeOptions {
            world_coords: settings.use_world_coords,
            include_curves: settings.include_curves,
            unit_scale: self.model.length_unit().scale,
        });
        let mut decoder = self.model.decoder();
        let mesh = generator
            .generate(product, &mut decoder)
            .map_err(|e| KernelError::Shape {
                entity: entity.id,
                message: e.to_string(),
            })?;

        Ok(ShapeBuffers {
            verts: mesh.positions,
            faces: mesh.indices,
            edges: mesh.edges,
        })
    }

    fn length_unit_name(&self) -> Option<String> {
        Some(self.model.length_unit().name.clone())
    }
}

/// Entity of a [`StepFile`]
#[derive(Debug, Clone)]
pub struct StepEntity {
    model: Arc<StepModel>,
    schema: SchemaVersion,
    id: u32,
    /// Upper-case type keyword
    keyword: String,
    type_name: String,
    decoded: Result<Arc<DecodedEntity>, String>,
}

impl StepEntity {
    fn new(model: Arc<StepModel>, schema: SchemaVersion, id: u32) -> Self {
        let keyword = model.type_of(id).unwrap_or_default().to_ascii_uppercase();
        let type_name = canonical_name(&keyword).to_string();
        let decoded = model.decode(id).map(Arc::new).map_err(|e| e.to_string());
        if let Err(e) = &decoded {
            tracing::warn!(entity = id, error = %e, "entity failed to decode");
        }
        Self {
            model,
            schema,
            id,
            keyword,
            type_name,
            decoded,
        }
    }

    fn decoded(&self) -> Result<&DecodedEntity, &str> {
        self.decoded.as_deref().map_err(String::as_str)
    }

    fn relationship_error(&self, message: impl ToString) -> KernelError {
        KernelError::Relationship {
            entity: self.id,
            message: message.to_string(),
        }
    }

    /// Attribute position; declared names first, then `AttributeN`
    fn attribute_position(&self, name: &str) -> Option<usize> {
        let declared = attribute_names(&self.keyword, &self.schema);
        if let Some(index) = declared.iter().position(|n| *n == name) {
            return Some(index);
        }
        let index: usize = name.strip_prefix("Attribute")?.parse().ok()?;
        (index >= declared.len() && index < self.attribute_count()).then_some(index)
    }

    fn attribute_count(&self) -> usize {
        self.decoded().map(|e| e.attributes.len()).unwrap_or(0)
    }

    fn decode_related(&self, id: u32) -> KernelResult<DecodedEntity> {
        self.model.decode(id).map_err(|e| self.relationship_error(e))
    }

    fn placement_node(&self, placement: &DecodedEntity, depth: usize) -> KernelResult<PlacementNode> {
        if depth > MAX_PLACEMENT_DEPTH {
            return Err(self.relationship_error(format!(
                "placement chain at #{} exceeds {} levels",
                placement.id, MAX_PLACEMENT_DEPTH
            )));
        }

        // IfcLocalPlacement: 0 PlacementRelTo, 1 RelativePlacement
        let mut node = PlacementNode::default();
        if let Some(relative_id) = placement.get_ref(1) {
            let relative = self.decode_related(relative_id)?;
            let scale = self.model.length_unit().scale;
            node.location = match relative.get_ref(0) {
                Some(point_id) => self
                    .point(point_id)?
                    .map(|[x, y, z]| [x * scale, y * scale, z * scale]),
                None => None,
            };
            if relative.is_type("IFCAXIS2PLACEMENT3D") {
                node.axis = self.direction(relative.get_ref(1))?;
                node.ref_direction = self.direction(relative.get_ref(2))?;
            } else {
                node.ref_direction = self.direction(relative.get_ref(1))?;
            }
        }

        if let Some(parent_id) = placement.get_ref(0) {
            let parent = self.decode_related(parent_id)?;
            if parent.is_type("IFCLOCALPLACEMENT") {
                node.relative_to = Some(Box::new(self.placement_node(&parent, depth + 1)?));
            }
        }
        Ok(node)
    }

    fn point(&self, id: u32) -> KernelResult<Option<[f64; 3]>> {
        let point = self.decode_related(id)?;
        Ok(ratios(&point))
    }

    fn direction(&self, id: Option<u32>) -> KernelResult<Option<[f64; 3]>> {
        match id {
            Some(id) => {
                let direction = self.decode_related(id)?;
                Ok(ratios(&direction))
            }
            None => Ok(None),
        }
    }
}

/// Coordinates/DirectionRatios list of a point or direction, z padded to 0
fn ratios(entity: &DecodedEntity) -> Option<[f64; 3]> {
    let values: Vec<f64> = entity
        .get_list(0)?
        .iter()
        .filter_map(AttributeValue::as_float)
        .collect();
    match values.as_slice() {
        [x, y] => Some([*x, *y, 0.0]),
        [x, y, z, ..] => Some([*x, *y, *z]),
        _ => None,
    }
}

/// Kernel value of a decoded attribute; unset and derived are `None`
fn to_value(attribute: &AttributeValue) -> Option<Value> {
    let value = match attribute {
        AttributeValue::EntityRef(id) => Value::Reference(*id),
        AttributeValue::String(s) => Value::Text(s.clone()),
        AttributeValue::Integer(i) => Value::Integer(*i),
        AttributeValue::Float(f) => Value::Real(*f),
        AttributeValue::Enum(e) => match e.as_str() {
            "T" | "TRUE" => Value::Boolean(true),
            "F" | "FALSE" => Value::Boolean(false),
            _ => Value::Enum(e.clone()),
        },
        AttributeValue::List(items) => Value::List(items.iter().filter_map(to_value).collect()),
        AttributeValue::Typed(type_name, inner) => Value::Typed {
            type_name: canonical_name(type_name).to_string(),
            value: Box::new(to_value(inner)?),
        },
        AttributeValue::Null | AttributeValue::Derived => return None,
    };
    Some(value)
}

impl EntityHandle for StepEntity {
    fn id(&self) -> u32 {
        self.id
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn is_a(&self, type_name: &str) -> bool {
        schema::is_subtype_of(&self.keyword, type_name)
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attribute_position(name).is_some()
    }

    fn attribute_names(&self) -> Vec<String> {
        let declared = attribute_names(&self.keyword, &self.schema);
        let mut names: Vec<String> = declared.iter().map(|n| n.to_string()).collect();
        names.extend((declared.len()..self.attribute_count()).map(|i| format!("Attribute{}", i)));
        names
    }

    fn attribute(&self, name: &str) -> KernelResult<Option<Value>> {
        let error = |message: &str| KernelError::Attribute {
            entity: self.id,
            attribute: name.to_string(),
            message: message.to_string(),
        };
        let entity = self.decoded().map_err(error)?;
        let index = self
            .attribute_position(name)
            .ok_or_else(|| error(&format!("not an attribute of {}", self.type_name)))?;
        Ok(entity.get(index).and_then(to_value))
    }

    fn property_sets(&self) -> KernelResult<Vec<PropertySetData>> {
        let mut sets = Vec::new();
        for rel_id in self.model.defined_by(self.id) {
            // IfcRelDefinesByProperties: 5 RelatingPropertyDefinition
            let rel = self.decode_related(*rel_id)?;
            let Some(definition_id) = rel.get_ref(5) else {
                continue;
            };
            let definition = self.decode_related(definition_id)?;
            if !definition.is_a("IfcPropertySet") {
                continue;
            }

            // IfcPropertySet: 2 Name, 4 HasProperties
            let mut properties = Vec::new();
            for property_id in definition.get_refs(4) {
                let property = self.decode_related(property_id)?;
                if !property.is_type("IFCPROPERTYSINGLEVALUE") {
                    continue;
                }
                // IfcPropertySingleValue: 0 Name, 2 NominalValue
                let Some(name) = property.get_string(0) else {
                    continue;
                };
                properties.push((name.to_string(), property.get(2).and_then(to_value)));
            }

            sets.push(PropertySetData {
                name: definition.get_string(2).map(str::to_string),
                properties,
            });
        }
        Ok(sets)
    }

    fn material_associations(&self) -> KernelResult<Vec<MaterialSelect>> {
        let mut selects = Vec::new();
        for rel_id in self.model.material_associations(self.id) {
            // IfcRelAssociatesMaterial: 5 RelatingMaterial
            let rel = self.decode_related(*rel_id)?;
            let Some(material_id) = rel.get_ref(5) else {
                continue;
            };
            let material = self.decode_related(material_id)?;
            if material.is_type("IFCMATERIAL") {
                let text = |attribute: &str| {
                    attribute_index("IfcMaterial", &self.schema, attribute)
                        .and_then(|i| material.get_string(i))
                        .map(str::to_string)
                };
                selects.push(MaterialSelect::Material(MaterialData {
                    name: text("Name"),
                    description: text("Description"),
                    category: text("Category"),
                }));
            } else {
                selects.push(MaterialSelect::Other {
                    type_name: canonical_name(&material.type_name).to_string(),
                });
            }
        }
        Ok(selects)
    }

    fn object_placement(&self) -> KernelResult<Option<PlacementNode>> {
        let Some(index) = attribute_index(&self.keyword, &self.schema, "ObjectPlacement") else {
            return Ok(None);
        };
        let entity = self.decoded().map_err(|e| self.relationship_error(e))?;
        let Some(placement_id) = entity.get_ref(index) else {
            return Ok(None);
        };
        let placement = self.decode_related(placement_id)?;
        if !placement.is_type("IFCLOCALPLACEMENT") {
            return Ok(None);
        }
        self.placement_node(&placement, 0).map(Some)
    }

    fn contained_elements(&self) -> KernelResult<Vec<StepEntity>> {
        Ok(self
            .model
            .contained_elements(self.id)
            .iter()
            .map(|id| StepEntity::new(Arc::clone(&self.model), self.schema.clone(), *id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = "ISO-10303-21;\nHEADER;\nFILE_DESCRIPTION((''),'2;1');\n\
FILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n\
#1=IFCPROJECT('2O2Fr$t4X7Zf8NOew3FLOH',$,'Depot',$,$,$,$,$,$);\n\
#2=IFCCARTESIANPOINT((1.,2.,3.));\n\
#3=IFCAXIS2PLACEMENT3D(#2,$,$);\n\
#4=IFCLOCALPLACEMENT($,#3);\n\
#5=IFCCARTESIANPOINT((0.5,0.,0.));\n\
#6=IFCAXIS2PLACEMENT3D(#5,$,$);\n\
#7=IFCLOCALPLACEMENT(#4,#6);\n\
#10=IFCWALL('1hOSvn6df7F8_7GcBWlRGQ',$,'North wall',$,$,#7,$,'T-1',.SOLIDWALL.);\n\
#11=IFCMATERIALLAYERSET((),'Layers',$);\n\
#12=IFCMATERIAL('Brick','Clay brick','Masonry');\n\
#13=IFCRELASSOCIATESMATERIAL('r1',$,$,$,(#10),#11);\n\
#14=IFCRELASSOCIATESMATERIAL('r2',$,$,$,(#10),#12);\n\
#20=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.T.),$);\n\
#21=IFCPROPERTYSINGLEVALUE('Width',$,IFCLENGTHMEASURE(0.3),$);\n\
#22=IFCPROPERTYENUMERATEDVALUE('Status',$,(IFCLABEL('NEW')),$);\n\
#23=IFCPROPERTYSET('p1',$,'Pset_WallCommon',$,(#20,#21,#22));\n\
#24=IFCRELDEFINESBYPROPERTIES('r3',$,$,$,(#10),#23);\n\
ENDSEC;\nEND-ISO-10303-21;\n";

    fn wall() -> StepEntity {
        StepFile::from_content(CONTENT).unwrap().entity(10)
    }

    #[test]
    fn test_reflection() {
        let wall = wall();
        assert_eq!(wall.type_name(), "IfcWall");
        assert!(wall.is_a("IfcElement"));
        assert!(wall.has_attribute("PredefinedType"));
        assert!(!wall.has_attribute("LongName"));
        assert_eq!(wall.text_attribute("Name").unwrap().as_deref(), Some("North wall"));
        assert_eq!(wall.attribute("Description").unwrap(), None);
        assert_eq!(
            wall.attribute("PredefinedType").unwrap(),
            Some(Value::Enum("SOLIDWALL".into()))
        );
        assert_eq!(wall.attribute("ObjectPlacement").unwrap(), Some(Value::Reference(7)));
        assert!(wall.attribute("Elevation").is_err());
    }

    #[test]
    fn test_property_sets_keep_single_values() {
        let sets = wall().property_sets().unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name.as_deref(), Some("Pset_WallCommon"));
        let names: Vec<_> = sets[0].properties.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["IsExternal", "Width"]);
        let (_, is_external) = &sets[0].properties[0];
        assert_eq!(
            is_external.as_ref().map(Value::unwrapped),
            Some(&Value::Boolean(true))
        );
    }

    #[test]
    fn test_material_associations_in_order() {
        let selects = wall().material_associations().unwrap();
        assert_eq!(
            selects,
            vec![
                MaterialSelect::Other {
                    type_name: "IfcMaterialLayerSet".into()
                },
                MaterialSelect::Material(MaterialData {
                    name: Some("Brick".into()),
                    description: Some("Clay brick".into()),
                    category: Some("Masonry".into()),
                }),
            ]
        );
    }

    #[test]
    fn test_placement_chain() {
        let node = wall().object_placement().unwrap().unwrap();
        assert_eq!(node.location, Some([0.5, 0.0, 0.0]));
        let parent = node.relative_to.as_deref().unwrap();
        assert_eq!(parent.location, Some([1.0, 2.0, 3.0]));
        assert!(parent.relative_to.is_none());
    }

    #[test]
    fn test_project_without_placement_attribute() {
        let file = StepFile::from_content(CONTENT).unwrap();
        let project = file.entity(1);
        assert_eq!(project.object_placement().unwrap(), None);
        assert_eq!(file.schema_version(), "IFC4");
    }
}
