// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Full pipeline over a small millimetre IFC4 file using the STEP kernel.

use std::fs;

use approx::assert_relative_eq;
use twin_bim_processing::{
    BimProcessor, ErrorKind, GeometryKind, ModelExporter, NoopObserver, ProcessedModel,
    ProcessorSettings, PropertyValue, StepKernel,
};

const CLINIC: &str = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_NAME('clinic.ifc','2024-03-01T09:00:00',(''),(''),'','','');
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCPROJECT('2O2Fr$t4X7Zf8NOew3FLOH',$,'Riverside Clinic','Outpatient wing',$,$,$,$,#2);
#2=IFCUNITASSIGNMENT((#3));
#3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);
#4=IFCBUILDING('0yf_M5JZv9QQXly4dq_zvI',$,'Main Building','Three storeys',$,#12,$,$,.ELEMENT.,$,$,$);
#5=IFCBUILDINGSTOREY('2RGlQk4xH47RHK93zcTzUL',$,'Level 0',$,$,#12,$,$,.ELEMENT.,0.);
#6=IFCBUILDINGSTOREY('3Lf7tkdFT1KvvbVYgWS6kP',$,'Level 1',$,$,$,$,$,.ELEMENT.,3000.);
#10=IFCCARTESIANPOINT((0.,0.,0.));
#11=IFCAXIS2PLACEMENT3D(#10,$,$);
#12=IFCLOCALPLACEMENT($,#11);
#13=IFCCARTESIANPOINT((1000.,2000.,0.));
#14=IFCAXIS2PLACEMENT3D(#13,$,$);
#15=IFCLOCALPLACEMENT(#12,#14);
#20=IFCRECTANGLEPROFILEDEF(.AREA.,$,$,4000.,200.);
#21=IFCDIRECTION((0.,0.,1.));
#22=IFCEXTRUDEDAREASOLID(#20,$,#21,3000.);
#23=IFCSHAPEREPRESENTATION($,'Body','SweptSolid',(#22));
#24=IFCPRODUCTDEFINITIONSHAPE($,$,(#23));
#30=IFCWALL('1hqIFTRjfV6AWq_bMtnZwI',$,'Wall 01',$,$,#15,#24,$,.STANDARD.);
#31=IFCWALL('0DWgwt6o1FOx7466fPk$jl',$,$,$,$,$,$,$,.STANDARD.);
#40=IFCRECTANGLEPROFILEDEF(.AREA.,$,$,5000.,5000.);
#41=IFCEXTRUDEDAREASOLID(#40,$,#21,200.);
#42=IFCSHAPEREPRESENTATION($,'Body','SweptSolid',(#41));
#43=IFCPRODUCTDEFINITIONSHAPE($,$,(#42));
#44=IFCSLAB('1wAj$J2Az2V8wnBiVYd3bU',$,'Floor slab',$,$,#12,#43,$,.FLOOR.);
#50=IFCRELCONTAINEDINSPATIALSTRUCTURE('0Ct1eRTGX0MfQLaQkz5rYi',$,$,$,(#30,#31,#44),#5);
#60=IFCMATERIAL('Concrete','Cast in place','Concrete');
#61=IFCRELASSOCIATESMATERIAL('2Dd4M0pWT5AOaKmJ_tU$Kx',$,$,$,(#30,#44),#60);
#70=IFCPROPERTYSINGLEVALUE('FireRating',$,IFCLABEL('REI90'),$);
#71=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.T.),$);
#72=IFCPROPERTYSINGLEVALUE('Name',$,IFCLABEL('Wall 01 (pset)'),$);
#73=IFCPROPERTYSET('1CJQ4K5Uz3qA9E8rHhBJQ2',$,'Pset_WallCommon',$,(#70,#71,#72));
#74=IFCRELDEFINESBYPROPERTIES('3ZYW59sxj8lei475l7EhLU',$,$,$,(#30),#73);
ENDSEC;
END-ISO-10303-21;
"#;

fn process(content: &str) -> ProcessedModel {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clinic.ifc");
    fs::write(&path, content).unwrap();
    let processor = BimProcessor::new(StepKernel, ProcessorSettings::default()).unwrap();
    processor.process_file(&path, &NoopObserver).unwrap()
}

#[test]
fn test_metadata_from_project_building_and_storeys() {
    let processed = process(CLINIC);
    let model = &processed.model;

    assert_eq!(model.id, "Riverside Clinic");
    assert_eq!(model.version, "IFC4");
    assert_eq!(model.metadata.schema_version, "IFC4");
    assert_eq!(model.metadata.project_description, "Outpatient wing");
    assert_eq!(model.metadata.building_name, "Main Building");
    assert_eq!(model.metadata.building_description, "Three storeys");
    assert_eq!(model.metadata.floor_count, 2);
    assert_eq!(model.metadata.total_area, 100.0);
    assert_eq!(model.metadata.units, "millimeters");
}

#[test]
fn test_elements_in_category_order() {
    let processed = process(CLINIC);
    let ids: Vec<&str> = processed.model.elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["30", "31", "44"]);

    let types: Vec<&str> = processed.model.elements.iter().map(|e| e.element_type.as_str()).collect();
    assert_eq!(types, ["IfcWall", "IfcWall", "IfcSlab"]);
}

#[test]
fn test_wall_fields() {
    let processed = process(CLINIC);
    let wall = &processed.model.elements[0];

    assert_eq!(wall.name, "Wall 01");
    assert_eq!(wall.global_id, "1hqIFTRjfV6AWq_bMtnZwI");
    assert_eq!(wall.geometry.kind, GeometryKind::Mesh);
    assert_eq!(wall.geometry.faces.len(), 12);

    let props = &wall.properties;
    assert_eq!(props["Name"], PropertyValue::from("Wall 01 (pset)"));
    assert_eq!(props["FireRating"], PropertyValue::from("REI90"));
    assert_eq!(props["IsExternal"], PropertyValue::Boolean(true));
    assert_eq!(props["PredefinedType"], PropertyValue::from("STANDARD"));
    assert_eq!(props["ObjectPlacement"], PropertyValue::from("#15"));
    assert!(!props.contains_key("Tag"));

    let material = wall.material.as_ref().unwrap();
    assert_eq!(material.name, "Concrete");
    assert_eq!(material.description, "Cast in place");
    assert_eq!(material.category, "Concrete");

    let location = wall.location.unwrap();
    assert_relative_eq!(location.x, 1.0, epsilon = 1e-9);
    assert_relative_eq!(location.y, 2.0, epsilon = 1e-9);
    assert_relative_eq!(location.z, 0.0, epsilon = 1e-9);
}

#[test]
fn test_wall_without_shape_or_name_is_kept() {
    let processed = process(CLINIC);
    let wall = &processed.model.elements[1];

    assert_eq!(wall.name, "IfcWall_31");
    assert_eq!(wall.geometry.kind, GeometryKind::Unknown);
    assert!(wall.geometry.vertices.is_empty());
    assert!(wall.material.is_none());
    assert!(wall.location.is_none());
    assert!(processed.diagnostics.element(31).is_some());
}

#[test]
fn test_bounding_box_spans_wall_and_slab() {
    let processed = process(CLINIC);
    let bbox = processed.model.bounding_box;

    let expected_min = [-2.5, -2.5, 0.0];
    let expected_max = [3.0, 2.5, 3.0];
    for axis in 0..3 {
        assert_relative_eq!(bbox.min[axis], expected_min[axis], epsilon = 1e-9);
        assert_relative_eq!(bbox.max[axis], expected_max[axis], epsilon = 1e-9);
        assert_eq!(bbox.size[axis], bbox.max[axis] - bbox.min[axis]);
    }
}

#[test]
fn test_export_round_trip_keeps_ids_and_box() {
    let processed = process(CLINIC);
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("processed_clinic.json");
    let processor = BimProcessor::new(StepKernel, ProcessorSettings::default()).unwrap();
    processor.export(&processed.model, &out, &NoopObserver).unwrap();

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("{\n  \"id\": \"Riverside Clinic\""));

    let reread = ModelExporter::read(&out).unwrap();
    assert_eq!(reread.elements.len(), processed.model.elements.len());
    let ids: Vec<&str> = reread.elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["30", "31", "44"]);
    assert_eq!(reread.bounding_box, processed.model.bounding_box);
}

#[test]
fn test_non_step_file_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.ifc");
    fs::write(&path, "just some text").unwrap();
    let processor = BimProcessor::new(StepKernel, ProcessorSettings::default()).unwrap();
    let err = processor.process_file(&path, &NoopObserver).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileOpen);

    let err = processor
        .process_file(dir.path().join("absent.ifc"), &NoopObserver)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileOpen);
}

#[test]
fn test_malformed_non_ascii_wall_is_skipped() {
    let content = format!(
        "ISO-10303-21;\nHEADER;\nFILE_DESCRIPTION((''),'2;1');\nFILE_NAME('mixed.ifc','2024-03-01T09:00:00',(''),(''),'','','');\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n\
#1=IFCWALL('w1',$,'Good',$,$,$,$,$,.STANDARD.);\n\
#5=IFCWALL('g',$,'a{}',$,$,$,$,@);\n\
ENDSEC;\nEND-ISO-10303-21;\n",
        "é".repeat(60)
    );
    let processed = process(&content);

    let ids: Vec<&str> = processed.model.elements.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["1"]);
    assert_eq!(processed.model.elements[0].name, "Good");

    let skipped = &processed.diagnostics.skipped_entities;
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].entity_id, 5);
}

#[test]
fn test_out_of_range_instance_id_does_not_hide_later_walls() {
    let content = "ISO-10303-21;\nHEADER;\nFILE_DESCRIPTION((''),'2;1');\nFILE_NAME('mixed.ifc','2024-03-01T09:00:00',(''),(''),'','','');\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n\
#4294967296=IFCWALL('x',$,'Lost',$,$,$,$,$,.STANDARD.);\n\
#2=IFCWALL('w2',$,'After',$,$,$,$,$,.STANDARD.);\n\
ENDSEC;\nEND-ISO-10303-21;\n";
    let processed = process(content);

    let names: Vec<&str> = processed.model.elements.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["After"]);
}
