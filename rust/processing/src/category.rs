// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

/// Element type categories queried by the element extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementCategory {
    Wall,
    Slab,
    Beam,
    Column,
    Door,
    Window,
    Roof,
    Stair,
    Ramp,
    Furnishing,
    SanitaryTerminal,
    FlowTerminal,
    DistributionElement,
    ElectricalElement,
}

impl ElementCategory {
    /// Default iteration order
    pub const ALL: [ElementCategory; 14] = [
        ElementCategory::Wall,
        ElementCategory::Slab,
        ElementCategory::Beam,
        ElementCategory::Column,
        ElementCategory::Door,
        ElementCategory::Window,
        ElementCategory::Roof,
        ElementCategory::Stair,
        ElementCategory::Ramp,
        ElementCategory::Furnishing,
        ElementCategory::SanitaryTerminal,
        ElementCategory::FlowTerminal,
        ElementCategory::DistributionElement,
        ElementCategory::ElectricalElement,
    ];

    /// IFC entity type queried for this category
    pub fn ifc_type(self) -> &'static str {
        match self {
            ElementCategory::Wall => "IfcWall",
            ElementCategory::Slab => "IfcSlab",
            ElementCategory::Beam => "IfcBeam",
            ElementCategory::Column => "IfcColumn",
            ElementCategory::Door => "IfcDoor",
            ElementCategory::Window => "IfcWindow",
            ElementCategory::Roof => "IfcRoof",
            ElementCategory::Stair => "IfcStair",
            ElementCategory::Ramp => "IfcRamp",
            ElementCategory::Furnishing => "IfcFurnishingElement",
            ElementCategory::SanitaryTerminal => "IfcSanitaryTerminal",
            ElementCategory::FlowTerminal => "IfcFlowTerminal",
            ElementCategory::DistributionElement => "IfcDistributionElement",
            ElementCategory::ElectricalElement => "IfcElectricalElement",
        }
    }

    /// Look up a category by its IFC type name (case-insensitive)
    pub fn from_ifc_type(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.ifc_type().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ifc_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(
            ElementCategory::from_ifc_type("IFCFLOWTERMINAL"),
            Some(ElementCategory::FlowTerminal)
        );
        assert_eq!(ElementCategory::from_ifc_type("IfcSpace"), None);
        assert_eq!(ElementCategory::Furnishing.to_string(), "IfcFurnishingElement");
    }
}
