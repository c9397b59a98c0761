// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC Schema Tables
//!
//! A hand-maintained subset of the IFC2X3/IFC4 EXPRESS schemas: canonical
//! entity names, the supertype chain and positional attribute names. Types
//! missing from the table are still decoded; they just expose positional
//! attributes only and match no supertype but themselves.

use crate::header::SchemaVersion;

struct TypeInfo {
    name: &'static str,
    supertype: Option<&'static str>,
    /// IFC4 / IFC4X3 attribute names, None to inherit from the supertype
    ifc4: Option<&'static [&'static str]>,
    /// IFC2X3 override, None to use `ifc4` (or inherit)
    ifc2x3: Option<&'static [&'static str]>,
}

const ROOT: &[&str] = &["GlobalId", "OwnerHistory", "Name", "Description"];
const OBJECT: &[&str] = &["GlobalId", "OwnerHistory", "Name", "Description", "ObjectType"];
const PRODUCT: &[&str] = &[
    "GlobalId", "OwnerHistory", "Name", "Description", "ObjectType", "ObjectPlacement",
    "Representation",
];
const ELEMENT: &[&str] = &[
    "GlobalId", "OwnerHistory", "Name", "Description", "ObjectType", "ObjectPlacement",
    "Representation", "Tag",
];
const ELEMENT_PREDEFINED: &[&str] = &[
    "GlobalId", "OwnerHistory", "Name", "Description", "ObjectType", "ObjectPlacement",
    "Representation", "Tag", "PredefinedType",
];
const ELEMENT_SHAPE: &[&str] = &[
    "GlobalId", "OwnerHistory", "Name", "Description", "ObjectType", "ObjectPlacement",
    "Representation", "Tag", "ShapeType",
];
const PROXY_2X3: &[&str] = &[
    "GlobalId", "OwnerHistory", "Name", "Description", "ObjectType", "ObjectPlacement",
    "Representation", "Tag", "CompositionType",
];
const DOOR: &[&str] = &[
    "GlobalId", "OwnerHistory", "Name", "Description", "ObjectType", "ObjectPlacement",
    "Representation", "Tag", "OverallHeight", "OverallWidth", "PredefinedType",
    "OperationType", "UserDefinedOperationType",
];
const WINDOW: &[&str] = &[
    "GlobalId", "OwnerHistory", "Name", "Description", "ObjectType", "ObjectPlacement",
    "Representation", "Tag", "OverallHeight", "OverallWidth", "PredefinedType",
    "PartitioningType", "UserDefinedPartitioningType",
];
const OPENING_2X3: &[&str] = &[
    "GlobalId", "OwnerHistory", "Name", "Description", "ObjectType", "ObjectPlacement",
    "Representation", "Tag", "OverallHeight", "OverallWidth",
];
const PROJECT: &[&str] = &[
    "GlobalId", "OwnerHistory", "Name", "Description", "ObjectType", "LongName", "Phase",
    "RepresentationContexts", "UnitsInContext",
];
const SITE: &[&str] = &[
    "GlobalId", "OwnerHistory", "Name", "Description", "ObjectType", "ObjectPlacement",
    "Representation", "LongName", "CompositionType", "RefLatitude", "RefLongitude",
    "RefElevation", "LandTitleNumber", "SiteAddress",
];
const BUILDING: &[&str] = &[
    "GlobalId", "OwnerHistory", "Name", "Description", "ObjectType", "ObjectPlacement",
    "Representation", "LongName", "CompositionType", "ElevationOfRefHeight",
    "ElevationOfTerrain", "BuildingAddress",
];
const STOREY: &[&str] = &[
    "GlobalId", "OwnerHistory", "Name", "Description", "ObjectType", "ObjectPlacement",
    "Representation", "LongName", "CompositionType", "Elevation",
];
const SPACE: &[&str] = &[
    "GlobalId", "OwnerHistory", "Name", "Description", "ObjectType", "ObjectPlacement",
    "Representation", "LongName", "CompositionType", "PredefinedType",
    "ElevationWithFlooring",
];
const SPACE_2X3: &[&str] = &[
    "GlobalId", "OwnerHistory", "Name", "Description", "ObjectType", "ObjectPlacement",
    "Representation", "LongName", "CompositionType", "InteriorOrExteriorSpace",
    "ElevationWithFlooring",
];
const REL_DEFINES: &[&str] = &[
    "GlobalId", "OwnerHistory", "Name", "Description", "RelatedObjects",
    "RelatingPropertyDefinition",
];
const REL_MATERIAL: &[&str] = &[
    "GlobalId", "OwnerHistory", "Name", "Description", "RelatedObjects", "RelatingMaterial",
];
const REL_CONTAINED: &[&str] = &[
    "GlobalId", "OwnerHistory", "Name", "Description", "RelatedElements",
    "RelatingStructure",
];
const REL_AGGREGATES: &[&str] = &[
    "GlobalId", "OwnerHistory", "Name", "Description", "RelatingObject", "RelatedObjects",
];
const PROPERTY_SET: &[&str] = &["GlobalId", "OwnerHistory", "Name", "Description", "HasProperties"];
const PROPERTY_SINGLE: &[&str] = &["Name", "Description", "NominalValue", "Unit"];
const MATERIAL: &[&str] = &["Name", "Description", "Category"];
const MATERIAL_2X3: &[&str] = &["Name"];
const LOCAL_PLACEMENT: &[&str] = &["PlacementRelTo", "RelativePlacement"];
const AXIS2_3D: &[&str] = &["Location", "Axis", "RefDirection"];
const AXIS2_2D: &[&str] = &["Location", "RefDirection"];
const CARTESIAN_POINT: &[&str] = &["Coordinates"];

macro_rules! types {
    ($( $name:literal : $sup:expr => $ifc4:expr, $ifc2x3:expr; )*) => {
        &[ $( TypeInfo { name: $name, supertype: $sup, ifc4: $ifc4, ifc2x3: $ifc2x3 }, )* ]
    };
}

static TYPES: &[TypeInfo] = types! {
    "IfcRoot": None => Some(ROOT), None;
    "IfcObjectDefinition": Some("IfcRoot") => None, None;
    "IfcObject": Some("IfcObjectDefinition") => Some(OBJECT), None;
    "IfcContext": Some("IfcObjectDefinition") => Some(PROJECT), None;
    "IfcProject": Some("IfcContext") => None, None;
    "IfcProduct": Some("IfcObject") => Some(PRODUCT), None;
    "IfcElement": Some("IfcProduct") => Some(ELEMENT), None;
    "IfcSpatialElement": Some("IfcProduct") => None, None;
    "IfcSpatialStructureElement": Some("IfcSpatialElement") => None, None;
    "IfcSite": Some("IfcSpatialStructureElement") => Some(SITE), None;
    "IfcBuilding": Some("IfcSpatialStructureElement") => Some(BUILDING), None;
    "IfcBuildingStorey": Some("IfcSpatialStructureElement") => Some(STOREY), None;
    "IfcSpace": Some("IfcSpatialStructureElement") => Some(SPACE), Some(SPACE_2X3);

    "IfcBuildingElement": Some("IfcElement") => None, None;
    "IfcBuiltElement": Some("IfcElement") => None, None;
    "IfcWall": Some("IfcBuildingElement") => Some(ELEMENT_PREDEFINED), Some(ELEMENT);
    "IfcWallStandardCase": Some("IfcWall") => None, None;
    "IfcWallElementedCase": Some("IfcWall") => None, None;
    "IfcSlab": Some("IfcBuildingElement") => Some(ELEMENT_PREDEFINED), None;
    "IfcSlabStandardCase": Some("IfcSlab") => None, None;
    "IfcSlabElementedCase": Some("IfcSlab") => None, None;
    "IfcBeam": Some("IfcBuildingElement") => Some(ELEMENT_PREDEFINED), Some(ELEMENT);
    "IfcBeamStandardCase": Some("IfcBeam") => None, None;
    "IfcColumn": Some("IfcBuildingElement") => Some(ELEMENT_PREDEFINED), Some(ELEMENT);
    "IfcColumnStandardCase": Some("IfcColumn") => None, None;
    "IfcMember": Some("IfcBuildingElement") => Some(ELEMENT_PREDEFINED), Some(ELEMENT);
    "IfcMemberStandardCase": Some("IfcMember") => None, None;
    "IfcPlate": Some("IfcBuildingElement") => Some(ELEMENT_PREDEFINED), Some(ELEMENT);
    "IfcPlateStandardCase": Some("IfcPlate") => None, None;
    "IfcDoor": Some("IfcBuildingElement") => Some(DOOR), Some(OPENING_2X3);
    "IfcDoorStandardCase": Some("IfcDoor") => None, None;
    "IfcWindow": Some("IfcBuildingElement") => Some(WINDOW), Some(OPENING_2X3);
    "IfcWindowStandardCase": Some("IfcWindow") => None, None;
    "IfcRoof": Some("IfcBuildingElement") => Some(ELEMENT_PREDEFINED), Some(ELEMENT_SHAPE);
    "IfcStair": Some("IfcBuildingElement") => Some(ELEMENT_PREDEFINED), Some(ELEMENT_SHAPE);
    "IfcStairFlight": Some("IfcBuildingElement") => None, None;
    "IfcRamp": Some("IfcBuildingElement") => Some(ELEMENT_PREDEFINED), Some(ELEMENT_SHAPE);
    "IfcRampFlight": Some("IfcBuildingElement") => None, None;
    "IfcCovering": Some("IfcBuildingElement") => Some(ELEMENT_PREDEFINED), None;
    "IfcRailing": Some("IfcBuildingElement") => Some(ELEMENT_PREDEFINED), None;
    "IfcFooting": Some("IfcBuildingElement") => Some(ELEMENT_PREDEFINED), None;
    "IfcCurtainWall": Some("IfcBuildingElement") => Some(ELEMENT_PREDEFINED), Some(ELEMENT);
    "IfcBuildingElementProxy": Some("IfcBuildingElement") => Some(ELEMENT_PREDEFINED), Some(PROXY_2X3);
    "IfcOpeningElement": Some("IfcElement") => Some(ELEMENT_PREDEFINED), Some(ELEMENT);

    "IfcFurnishingElement": Some("IfcElement") => Some(ELEMENT), None;
    "IfcFurniture": Some("IfcFurnishingElement") => Some(ELEMENT_PREDEFINED), None;
    "IfcSystemFurnitureElement": Some("IfcFurnishingElement") => Some(ELEMENT_PREDEFINED), None;

    "IfcDistributionElement": Some("IfcElement") => Some(ELEMENT), None;
    "IfcDistributionFlowElement": Some("IfcDistributionElement") => None, None;
    "IfcDistributionControlElement": Some("IfcDistributionElement") => None, None;
    "IfcElectricalElement": Some("IfcElement") => Some(ELEMENT), None;
    "IfcFlowTerminal": Some("IfcDistributionFlowElement") => None, None;
    "IfcFlowSegment": Some("IfcDistributionFlowElement") => None, None;
    "IfcFlowFitting": Some("IfcDistributionFlowElement") => None, None;
    "IfcFlowController": Some("IfcDistributionFlowElement") => None, None;
    "IfcFlowMovingDevice": Some("IfcDistributionFlowElement") => None, None;
    "IfcFlowStorageDevice": Some("IfcDistributionFlowElement") => None, None;
    "IfcFlowTreatmentDevice": Some("IfcDistributionFlowElement") => None, None;
    "IfcEnergyConversionDevice": Some("IfcDistributionFlowElement") => None, None;
    "IfcSanitaryTerminal": Some("IfcFlowTerminal") => Some(ELEMENT_PREDEFINED), None;
    "IfcAirTerminal": Some("IfcFlowTerminal") => Some(ELEMENT_PREDEFINED), None;
    "IfcLightFixture": Some("IfcFlowTerminal") => Some(ELEMENT_PREDEFINED), None;
    "IfcLamp": Some("IfcFlowTerminal") => Some(ELEMENT_PREDEFINED), None;
    "IfcOutlet": Some("IfcFlowTerminal") => Some(ELEMENT_PREDEFINED), None;
    "IfcElectricAppliance": Some("IfcFlowTerminal") => Some(ELEMENT_PREDEFINED), None;
    "IfcFireSuppressionTerminal": Some("IfcFlowTerminal") => Some(ELEMENT_PREDEFINED), None;
    "IfcWasteTerminal": Some("IfcFlowTerminal") => Some(ELEMENT_PREDEFINED), None;
    "IfcPipeSegment": Some("IfcFlowSegment") => Some(ELEMENT_PREDEFINED), None;
    "IfcDuctSegment": Some("IfcFlowSegment") => Some(ELEMENT_PREDEFINED), None;
    "IfcCableSegment": Some("IfcFlowSegment") => Some(ELEMENT_PREDEFINED), None;
    "IfcPipeFitting": Some("IfcFlowFitting") => Some(ELEMENT_PREDEFINED), None;
    "IfcDuctFitting": Some("IfcFlowFitting") => Some(ELEMENT_PREDEFINED), None;
    "IfcValve": Some("IfcFlowController") => Some(ELEMENT_PREDEFINED), None;
    "IfcSwitchingDevice": Some("IfcFlowController") => Some(ELEMENT_PREDEFINED), None;
    "IfcPump": Some("IfcFlowMovingDevice") => Some(ELEMENT_PREDEFINED), None;
    "IfcFan": Some("IfcFlowMovingDevice") => Some(ELEMENT_PREDEFINED), None;
    "IfcSensor": Some("IfcDistributionControlElement") => Some(ELEMENT_PREDEFINED), None;
    "IfcActuator": Some("IfcDistributionControlElement") => Some(ELEMENT_PREDEFINED), None;

    "IfcRelationship": Some("IfcRoot") => None, None;
    "IfcRelDefinesByProperties": Some("IfcRelationship") => Some(REL_DEFINES), None;
    "IfcRelAssociatesMaterial": Some("IfcRelationship") => Some(REL_MATERIAL), None;
    "IfcRelContainedInSpatialStructure": Some("IfcRelationship") => Some(REL_CONTAINED), None;
    "IfcRelAggregates": Some("IfcRelationship") => Some(REL_AGGREGATES), None;
    "IfcPropertySet": Some("IfcRoot") => Some(PROPERTY_SET), None;
    "IfcPropertySingleValue": None => Some(PROPERTY_SINGLE), None;
    "IfcMaterial": None => Some(MATERIAL), Some(MATERIAL_2X3);
    "IfcMaterialLayerSet": None => None, None;
    "IfcMaterialLayerSetUsage": None => None, None;
    "IfcMaterialList": None => None, None;
    "IfcMaterialConstituentSet": None => None, None;
    "IfcMaterialProfileSet": None => None, None;
    "IfcLocalPlacement": None => Some(LOCAL_PLACEMENT), None;
    "IfcAxis2Placement3D": None => Some(AXIS2_3D), None;
    "IfcAxis2Placement2D": None => Some(AXIS2_2D), None;
    "IfcCartesianPoint": None => Some(CARTESIAN_POINT), None;
};

fn lookup(type_name: &str) -> Option<&'static TypeInfo> {
    TYPES.iter().find(|t| t.name.eq_ignore_ascii_case(type_name))
}

/// Canonical CamelCase name for a type keyword (`IFCWALL` -> `IfcWall`)
///
/// Unknown keywords are returned unchanged.
pub fn canonical_name(type_name: &str) -> &str {
    lookup(type_name).map(|t| t.name).unwrap_or(type_name)
}

/// Whether `type_name` equals `ancestor` or derives from it
pub fn is_subtype_of(type_name: &str, ancestor: &str) -> bool {
    if type_name.eq_ignore_ascii_case(ancestor) {
        return true;
    }
    let mut current = lookup(type_name);
    while let Some(info) = current {
        match info.supertype {
            Some(sup) if sup.eq_ignore_ascii_case(ancestor) => return true,
            Some(sup) => current = lookup(sup),
            None => return false,
        }
    }
    false
}

/// Positional attribute names of a type, walking up the supertype chain
/// until a table entry is found. Empty for unknown types.
pub fn attribute_names(type_name: &str, schema: &SchemaVersion) -> &'static [&'static str] {
    let mut current = lookup(type_name);
    while let Some(info) = current {
        let names = match schema {
            SchemaVersion::Ifc2x3 => info.ifc2x3.or(info.ifc4),
            _ => info.ifc4,
        };
        if let Some(names) = names {
            return names;
        }
        current = info.supertype.and_then(lookup);
    }
    &[]
}

/// Position of a named attribute
pub fn attribute_index(type_name: &str, schema: &SchemaVersion, attribute: &str) -> Option<usize> {
    attribute_names(type_name, schema)
        .iter()
        .position(|name| *name == attribute)
}
