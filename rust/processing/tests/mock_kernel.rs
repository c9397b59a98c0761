// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline behaviour against a scripted in-memory kernel: partial failure
//! handling, ordering, property precedence, floor area and phase signals.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use twin_bim_processing::{
    BimProcessor, ElementCategory, EntityHandle, ErrorKind, Field, FieldStatus, FileHandle,
    FloorAreaRule, GeometryKind, IfcKernel, KernelError, KernelResult, MaterialData,
    MaterialSelect, ModelExporter, NoopObserver, Phase, PlacementNode, ProcessorSettings,
    PropertySetData, PropertyValue, ShapeBuffers, ShapeSettings, Value,
};

#[derive(Debug, Clone)]
enum Shape {
    Buffers(ShapeBuffers),
    Fail(&'static str),
    Panic,
}

#[derive(Debug, Clone)]
struct MockEntity {
    id: u32,
    type_name: &'static str,
    supertypes: Vec<&'static str>,
    attributes: Vec<(&'static str, Option<Value>)>,
    property_sets: Vec<PropertySetData>,
    materials: Vec<MaterialSelect>,
    placement: Option<PlacementNode>,
    contained: Vec<MockEntity>,
    shape: Shape,
}

impl MockEntity {
    fn new(id: u32, type_name: &'static str) -> Self {
        Self {
            id,
            type_name,
            supertypes: Vec::new(),
            attributes: vec![
                ("GlobalId", Some(text(&format!("guid-{}", id)))),
                ("OwnerHistory", None),
                ("Name", None),
                ("Description", None),
            ],
            property_sets: Vec::new(),
            materials: Vec::new(),
            placement: None,
            contained: Vec::new(),
            shape: Shape::Fail("no representation"),
        }
    }

    fn named(mut self, name: &str) -> Self {
        self.set("Name", Some(text(name)));
        self
    }

    fn set(&mut self, attribute: &'static str, value: Option<Value>) {
        match self.attributes.iter_mut().find(|(n, _)| *n == attribute) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((attribute, value)),
        }
    }

    fn with_supertypes(mut self, supertypes: &[&'static str]) -> Self {
        self.supertypes = supertypes.to_vec();
        self
    }

    fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    fn with_vertices(self, vertices: &[[f64; 3]]) -> Self {
        let verts = vertices.iter().flatten().copied().collect();
        self.with_shape(Shape::Buffers(ShapeBuffers {
            verts,
            faces: Vec::new(),
            edges: Vec::new(),
        }))
    }
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

impl EntityHandle for MockEntity {
    fn id(&self) -> u32 {
        self.id
    }

    fn type_name(&self) -> &str {
        self.type_name
    }

    fn is_a(&self, type_name: &str) -> bool {
        self.type_name == type_name || self.supertypes.iter().any(|s| *s == type_name)
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|(n, _)| *n == name)
    }

    fn attribute_names(&self) -> Vec<String> {
        self.attributes.iter().map(|(n, _)| n.to_string()).collect()
    }

    fn attribute(&self, name: &str) -> KernelResult<Option<Value>> {
        self.attributes
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| KernelError::Attribute {
                entity: self.id,
                attribute: name.to_string(),
                message: "undeclared".into(),
            })
    }

    fn property_sets(&self) -> KernelResult<Vec<PropertySetData>> {
        Ok(self.property_sets.clone())
    }

    fn material_associations(&self) -> KernelResult<Vec<MaterialSelect>> {
        Ok(self.materials.clone())
    }

    fn object_placement(&self) -> KernelResult<Option<PlacementNode>> {
        Ok(self.placement.clone())
    }

    fn contained_elements(&self) -> KernelResult<Vec<Self>> {
        Ok(self.contained.clone())
    }
}

#[derive(Debug, Clone, Default)]
struct MockFile {
    schema: &'static str,
    entities: Vec<MockEntity>,
    failing_queries: Vec<&'static str>,
}

impl FileHandle for MockFile {
    type Entity = MockEntity;

    fn schema_version(&self) -> String {
        self.schema.to_string()
    }

    fn entities_of_type(&self, type_name: &str) -> KernelResult<Vec<MockEntity>> {
        if self.failing_queries.iter().any(|q| *q == type_name) {
            return Err(KernelError::Unavailable(format!("query {} failed", type_name)));
        }
        let mut found: Vec<MockEntity> = self.entities.iter().filter(|e| e.is_a(type_name)).cloned().collect();
        for entity in &self.entities {
            found.extend(entity.contained.iter().filter(|e| e.is_a(type_name)).cloned());
        }
        Ok(found)
    }

    fn generate_shape(&self, _settings: &ShapeSettings, entity: &MockEntity) -> KernelResult<ShapeBuffers> {
        match &entity.shape {
            Shape::Buffers(buffers) => Ok(buffers.clone()),
            Shape::Fail(message) => Err(KernelError::Shape {
                entity: entity.id,
                message: message.to_string(),
            }),
            Shape::Panic => panic!("tessellator blew up on #{}", entity.id),
        }
    }
}

#[derive(Default)]
struct MockKernel {
    unavailable: bool,
    files: HashMap<PathBuf, MockFile>,
}

impl MockKernel {
    fn with_file(path: &str, file: MockFile) -> Self {
        let mut files = HashMap::new();
        files.insert(PathBuf::from(path), file);
        Self {
            unavailable: false,
            files,
        }
    }
}

impl IfcKernel for MockKernel {
    type File = MockFile;

    fn name(&self) -> &str {
        "mock"
    }

    fn probe(&self) -> KernelResult<()> {
        if self.unavailable {
            Err(KernelError::Unavailable("library not installed".into()))
        } else {
            Ok(())
        }
    }

    fn open(&self, path: &Path) -> KernelResult<MockFile> {
        self.files.get(path).cloned().ok_or_else(|| KernelError::Open {
            path: path.to_path_buf(),
            message: "no such file".into(),
        })
    }
}

fn processor(file: MockFile) -> BimProcessor<MockKernel> {
    BimProcessor::new(MockKernel::with_file("model.ifc", file), ProcessorSettings::default()).unwrap()
}

fn project_file(entities: Vec<MockEntity>) -> MockFile {
    let mut all = vec![MockEntity::new(1, "IfcProject").named("Harbour Office")];
    all.extend(entities);
    MockFile {
        schema: "IFC4",
        entities: all,
        failing_queries: Vec::new(),
    }
}

#[test]
fn test_unavailable_kernel_is_reported_at_construction() {
    let kernel = MockKernel {
        unavailable: true,
        ..Default::default()
    };
    let err = BimProcessor::new(kernel, ProcessorSettings::default()).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::KernelUnavailable);
}

#[test]
fn test_missing_file_is_a_file_open_failure() {
    let processor = processor(MockFile::default());
    let err = processor.process_file("other.ifc", &NoopObserver).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileOpen);
}

#[test]
fn test_empty_file_uses_metadata_defaults_and_zero_box() {
    let processed = processor(MockFile {
        schema: "IFC2X3",
        ..Default::default()
    })
    .process_file("model.ifc", &NoopObserver)
    .unwrap();

    let model = &processed.model;
    assert_eq!(model.version, "IFC2X3");
    assert_eq!(model.metadata.project_name, "Unknown Project");
    assert_eq!(model.metadata.building_name, "Unknown Building");
    assert_eq!(model.metadata.floor_count, 0);
    assert_eq!(model.metadata.total_area, 0.0);
    assert_eq!(model.metadata.units, "meters");
    assert_eq!(model.id, "Unknown Project");
    assert!(model.elements.is_empty());
    assert_eq!(model.bounding_box.min, [0.0; 3]);
    assert_eq!(model.bounding_box.size, [0.0; 3]);
    assert!(processed.diagnostics.is_clean());
}

#[test]
fn test_failed_shape_keeps_element_with_unknown_geometry() {
    let wall = MockEntity::new(10, "IfcWall")
        .named("Core wall")
        .with_shape(Shape::Fail("boolean operation failed"));
    let processed = processor(project_file(vec![wall]))
        .process_file("model.ifc", &NoopObserver)
        .unwrap();

    let element = &processed.model.elements[0];
    assert_eq!(element.id, "10");
    assert_eq!(element.name, "Core wall");
    assert_eq!(element.element_type, "IfcWall");
    assert_eq!(element.global_id, "guid-10");
    assert_eq!(element.geometry.kind, GeometryKind::Unknown);
    assert!(element.geometry.vertices.is_empty());
    assert!(element.geometry.faces.is_empty());
    assert!(element.geometry.edges.is_empty());

    let diag = processed.diagnostics.element(10).unwrap();
    assert!(matches!(diag.status(Field::Geometry), Some(FieldStatus::Skipped(r)) if r.contains("boolean")));
    assert_eq!(diag.status(Field::Properties), Some(&FieldStatus::Ok));
}

#[test]
fn test_kernel_panic_is_contained_to_the_geometry_field() {
    let walls = vec![
        MockEntity::new(10, "IfcWall").with_shape(Shape::Panic),
        MockEntity::new(11, "IfcWall").with_vertices(&[[1.0, 1.0, 1.0]]),
    ];
    let processed = processor(project_file(walls))
        .process_file("model.ifc", &NoopObserver)
        .unwrap();

    assert_eq!(processed.model.elements.len(), 2);
    assert_eq!(processed.model.elements[0].geometry.kind, GeometryKind::Unknown);
    assert_eq!(processed.model.elements[1].geometry.kind, GeometryKind::Mesh);
    let diag = processed.diagnostics.element(10).unwrap();
    assert!(matches!(diag.status(Field::Geometry), Some(FieldStatus::Skipped(r)) if r.contains("panicked")));
}

#[test]
fn test_name_falls_back_to_type_and_id() {
    let mut door = MockEntity::new(42, "IfcDoor");
    door.set("GlobalId", None);
    let processed = processor(project_file(vec![door]))
        .process_file("model.ifc", &NoopObserver)
        .unwrap();

    let element = &processed.model.elements[0];
    assert_eq!(element.name, "IfcDoor_42");
    assert_eq!(element.global_id, "");
}

#[test]
fn test_unreadable_identity_skips_only_that_entity() {
    let mut broken = MockEntity::new(20, "IfcBeam");
    broken.set("Name", Some(Value::Integer(7)));
    let fine = MockEntity::new(21, "IfcBeam").named("B2");

    let processed = processor(project_file(vec![broken, fine]))
        .process_file("model.ifc", &NoopObserver)
        .unwrap();

    let ids: Vec<&str> = processed.model.elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["21"]);
    let skipped = &processed.diagnostics.skipped_entities;
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].entity_id, 20);
    assert_eq!(skipped[0].entity_type, "IfcBeam");
}

#[test]
fn test_property_sets_override_direct_attributes_in_order() {
    let mut wall = MockEntity::new(10, "IfcWall").named("A");
    wall.set("PredefinedType", Some(Value::Enum("SOLIDWALL".into())));
    wall.set("Tag", Some(Value::Real(3.0)));
    wall.property_sets = vec![
        PropertySetData {
            name: Some("Pset_First".into()),
            properties: vec![
                ("Name".into(), Some(text("B"))),
                ("FireRating".into(), Some(text("REI60"))),
                ("Unset".into(), None),
            ],
        },
        PropertySetData {
            name: Some("Pset_Second".into()),
            properties: vec![
                ("FireRating".into(), Some(text("REI90"))),
                (
                    "IsExternal".into(),
                    Some(Value::Typed {
                        type_name: "IfcBoolean".into(),
                        value: Box::new(Value::Boolean(true)),
                    }),
                ),
                ("Width".into(), Some(Value::Real(0.25))),
            ],
        },
    ];

    let processed = processor(project_file(vec![wall]))
        .process_file("model.ifc", &NoopObserver)
        .unwrap();
    let props = &processed.model.elements[0].properties;

    assert_eq!(props["Name"], PropertyValue::from("B"));
    assert_eq!(props["FireRating"], PropertyValue::from("REI90"));
    assert_eq!(props["IsExternal"], PropertyValue::Boolean(true));
    assert_eq!(props["Width"], PropertyValue::Real(0.25));
    assert_eq!(props["PredefinedType"], PropertyValue::from("SOLIDWALL"));
    assert_eq!(props["Tag"], PropertyValue::from("3.0"));
    assert_eq!(props["GlobalId"], PropertyValue::from("guid-10"));
    assert!(!props.contains_key("Description"));
    assert!(!props.contains_key("Unset"));
    assert!(!props.contains_key("id"));
    // The element name itself is not touched by property sets
    assert_eq!(processed.model.elements[0].name, "A");
}

#[test]
fn test_material_takes_first_single_material() {
    let mut slab = MockEntity::new(30, "IfcSlab");
    slab.materials = vec![
        MaterialSelect::Other {
            type_name: "IfcMaterialLayerSetUsage".into(),
        },
        MaterialSelect::Material(MaterialData {
            name: Some("Concrete C30/37".into()),
            description: None,
            category: Some("Concrete".into()),
        }),
        MaterialSelect::Material(MaterialData {
            name: Some("Screed".into()),
            ..Default::default()
        }),
    ];
    let composite_only = {
        let mut e = MockEntity::new(31, "IfcSlab");
        e.materials = vec![MaterialSelect::Other {
            type_name: "IfcMaterialLayerSet".into(),
        }];
        e
    };

    let processed = processor(project_file(vec![slab, composite_only]))
        .process_file("model.ifc", &NoopObserver)
        .unwrap();

    let material = processed.model.elements[0].material.as_ref().unwrap();
    assert_eq!(material.name, "Concrete C30/37");
    assert_eq!(material.description, "");
    assert_eq!(material.category, "Concrete");
    assert!(processed.model.elements[1].material.is_none());
}

#[test]
fn test_location_absent_is_distinct_from_origin() {
    let mut at_origin = MockEntity::new(40, "IfcColumn");
    at_origin.placement = Some(PlacementNode {
        location: Some([0.0, 0.0, 0.0]),
        ..Default::default()
    });
    let mut no_location = MockEntity::new(41, "IfcColumn");
    no_location.placement = Some(PlacementNode::default());
    let mut nested = MockEntity::new(42, "IfcColumn");
    nested.placement = Some(PlacementNode {
        location: Some([1.0, 0.0, 0.0]),
        relative_to: Some(Box::new(PlacementNode {
            location: Some([0.0, 5.0, 3.0]),
            ..Default::default()
        })),
        ..Default::default()
    });

    let processed = processor(project_file(vec![at_origin, no_location, nested]))
        .process_file("model.ifc", &NoopObserver)
        .unwrap();
    let elements = &processed.model.elements;

    let origin = elements[0].location.unwrap();
    assert_eq!((origin.x, origin.y, origin.z), (0.0, 0.0, 0.0));
    assert!(elements[1].location.is_none());
    let placed = elements[2].location.unwrap();
    assert_eq!((placed.x, placed.y, placed.z), (1.0, 5.0, 3.0));
}

#[test]
fn test_local_coordinates_report_relative_location() {
    let mut column = MockEntity::new(40, "IfcColumn");
    column.placement = Some(PlacementNode {
        location: Some([1.0, 0.0, 0.0]),
        relative_to: Some(Box::new(PlacementNode {
            location: Some([0.0, 5.0, 3.0]),
            ..Default::default()
        })),
        ..Default::default()
    });
    let settings = ProcessorSettings::default().with_shape(ShapeSettings {
        use_world_coords: false,
        ..Default::default()
    });
    let processor = BimProcessor::new(MockKernel::with_file("model.ifc", project_file(vec![column])), settings).unwrap();
    let processed = processor.process_file("model.ifc", &NoopObserver).unwrap();

    let location = processed.model.elements[0].location.unwrap();
    assert_eq!((location.x, location.y, location.z), (1.0, 0.0, 0.0));
}

#[test]
fn test_output_follows_category_then_kernel_order_without_duplicates() {
    let entities = vec![
        MockEntity::new(5, "IfcWindow"),
        MockEntity::new(3, "IfcWallStandardCase").with_supertypes(&["IfcWall"]),
        MockEntity::new(9, "IfcSanitaryTerminal").with_supertypes(&[
            "IfcFlowTerminal",
            "IfcDistributionFlowElement",
            "IfcDistributionElement",
        ]),
        MockEntity::new(2, "IfcWall"),
        MockEntity::new(7, "IfcLightFixture").with_supertypes(&[
            "IfcFlowTerminal",
            "IfcDistributionFlowElement",
            "IfcDistributionElement",
        ]),
        MockEntity::new(8, "IfcSpace"),
    ];
    let processed = processor(project_file(entities))
        .process_file("model.ifc", &NoopObserver)
        .unwrap();

    let ids: Vec<&str> = processed.model.elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["3", "2", "5", "9", "7"]);
    assert_eq!(processed.model.elements[0].element_type, "IfcWallStandardCase");
}

#[test]
fn test_parallel_extraction_preserves_order() {
    let entities: Vec<MockEntity> = (100..164)
        .map(|id| MockEntity::new(id, "IfcFurnishingElement").with_vertices(&[[id as f64, 0.0, 0.0]]))
        .collect();
    let expected: Vec<String> = (100..164).map(|id: u32| id.to_string()).collect();

    let settings = ProcessorSettings::default().with_parallel_elements(true);
    let processor = BimProcessor::new(MockKernel::with_file("model.ifc", project_file(entities)), settings).unwrap();
    let processed = processor.process_file("model.ifc", &NoopObserver).unwrap();

    let ids: Vec<String> = processed.model.elements.iter().map(|e| e.id.clone()).collect();
    assert_eq!(ids, expected);
    assert_eq!(processed.model.bounding_box.max, [163.0, 0.0, 0.0]);
}

#[test]
fn test_failing_category_query_does_not_stop_other_categories() {
    let mut file = project_file(vec![MockEntity::new(2, "IfcWall"), MockEntity::new(3, "IfcSlab")]);
    file.failing_queries = vec!["IfcWall"];

    let processed = processor(file).process_file("model.ifc", &NoopObserver).unwrap();

    let ids: Vec<&str> = processed.model.elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["3"]);
    assert_eq!(processed.diagnostics.category_failures.len(), 1);
    assert_eq!(processed.diagnostics.category_failures[0].category, "IfcWall");
}

#[test]
fn test_two_walls_aggregate_box_and_statistics() {
    let walls = vec![
        MockEntity::new(1001, "IfcWall").with_vertices(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]),
        MockEntity::new(1002, "IfcWall").with_vertices(&[[2.0, 2.0, 2.0], [3.0, 3.0, 3.0]]),
    ];
    let processor = processor(project_file(walls));
    let processed = processor.process_file("model.ifc", &NoopObserver).unwrap();
    let model = &processed.model;

    assert_eq!(model.bounding_box.min, [0.0, 0.0, 0.0]);
    assert_eq!(model.bounding_box.max, [3.0, 3.0, 3.0]);
    assert_eq!(model.bounding_box.size, [3.0, 3.0, 3.0]);

    let stats = processor.statistics(model);
    assert_eq!(stats.total_elements, 2);
    assert_eq!(stats.element_types.get("IfcWall"), Some(&2));
    assert_eq!(stats.unique_types, 1);
    assert_eq!(stats.model_size.width, 3.0);
}

#[test]
fn test_metadata_counts_placeholder_area_per_generatable_slab() {
    let slab = |id: u32, shape: Shape| MockEntity::new(id, "IfcSlab").with_shape(shape);
    let mut ground = MockEntity::new(50, "IfcBuildingStorey").named("Ground");
    ground.contained = vec![
        slab(51, Shape::Buffers(ShapeBuffers::default())),
        slab(52, Shape::Buffers(ShapeBuffers::default())),
        MockEntity::new(53, "IfcWall"),
    ];
    let mut roof = MockEntity::new(60, "IfcBuildingStorey").named("Roof");
    roof.contained = vec![slab(61, Shape::Fail("degenerate")), slab(62, Shape::Panic)];

    let mut building = MockEntity::new(2, "IfcBuilding").named("Block A");
    building.set("Description", Some(text("Offices")));
    let file = project_file(vec![building, ground, roof]);

    let processed = processor(file).process_file("model.ifc", &NoopObserver).unwrap();
    let metadata = &processed.model.metadata;

    assert_eq!(metadata.project_name, "Harbour Office");
    assert_eq!(metadata.building_name, "Block A");
    assert_eq!(metadata.building_description, "Offices");
    assert_eq!(metadata.floor_count, 2);
    assert_eq!(metadata.total_area, 2.0 * FloorAreaRule::DEFAULT_SLAB_AREA);
    assert!(metadata.total_area_is_placeholder);
    assert_eq!(processed.model.name, "Harbour Office");
}

#[test]
fn test_metadata_degrades_per_field() {
    let mut project = MockEntity::new(1, "IfcProject");
    project.set("Name", Some(Value::Real(1.5)));
    project.set("Description", Some(text("Retrofit")));
    let file = MockFile {
        schema: "IFC4",
        entities: vec![project],
        failing_queries: vec!["IfcBuildingStorey"],
    };

    let processed = processor(file).process_file("model.ifc", &NoopObserver).unwrap();
    let metadata = &processed.model.metadata;

    assert_eq!(metadata.project_name, "Unknown Project");
    assert_eq!(metadata.project_description, "Retrofit");
    assert_eq!(metadata.floor_count, 0);
    let fields: Vec<Field> = processed.diagnostics.metadata_fields.iter().map(|(f, _)| *f).collect();
    assert_eq!(fields, [Field::ProjectName, Field::FloorCount, Field::TotalArea]);
}

#[test]
fn test_phases_are_signalled_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("model.json");
    let processor = processor(project_file(vec![MockEntity::new(2, "IfcRoof")]));

    let (tx, rx) = mpsc::channel();
    let processed = processor.process_file("model.ifc", &tx).unwrap();
    processor.export(&processed.model, &out, &tx).unwrap();
    drop(tx);

    let phases: Vec<Phase> = rx.iter().collect();
    assert_eq!(
        phases,
        [
            Phase::Loaded,
            Phase::MetadataExtracted,
            Phase::ElementsExtracted,
            Phase::AggregationComplete,
            Phase::ExportComplete,
        ]
    );
}

#[test]
fn test_export_failure_leaves_model_usable() {
    let dir = tempfile::tempdir().unwrap();
    let processor = processor(project_file(vec![MockEntity::new(2, "IfcStair")]));
    let processed = processor.process_file("model.ifc", &NoopObserver).unwrap();

    let bad_path = dir.path().join("missing").join("model.json");
    let phases = std::cell::RefCell::new(Vec::new());
    let err = processor
        .export(&processed.model, &bad_path, &|p: Phase| phases.borrow_mut().push(p))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Export);
    assert!(phases.borrow().is_empty());

    let good_path = dir.path().join("model.json");
    processor.export(&processed.model, &good_path, &NoopObserver).unwrap();
    let reread = ModelExporter::read(&good_path).unwrap();
    assert_eq!(reread, processed.model);
}

#[test]
fn test_only_configured_categories_are_extracted() {
    let settings = ProcessorSettings::default().with_categories([ElementCategory::Door]);
    let file = project_file(vec![MockEntity::new(2, "IfcWall"), MockEntity::new(3, "IfcDoor")]);
    let processor = BimProcessor::new(MockKernel::with_file("model.ifc", file), settings).unwrap();
    let processed = processor.process_file("model.ifc", &NoopObserver).unwrap();

    assert_eq!(processed.model.elements.len(), 1);
    assert_eq!(processed.model.elements[0].element_type, "IfcDoor");
}
