// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MappedItem processor - geometry instancing.

use crate::router::{GeometryProcessor, ItemContext, MAX_ITEM_DEPTH};
use crate::transform::{parse_axis2_placement, parse_transformation_operator};
use crate::{Error, Mesh, Result};
use nalgebra::Matrix4;
use twin_bim_core::{DecodedEntity, EntityDecoder};

/// Handles IfcMappedItem
///
/// 0 MappingSource (IfcRepresentationMap: 0 MappingOrigin,
/// 1 MappedRepresentation), 1 MappingTarget. The mapped representation is
/// processed through the generator and placed by `target * origin`.
pub struct MappedItemProcessor;

impl GeometryProcessor for MappedItemProcessor {
    fn process(&self, entity: &DecodedEntity, decoder: &mut EntityDecoder, ctx: &ItemContext<'_>) -> Result<Mesh> {
        if ctx.depth >= MAX_ITEM_DEPTH {
            return Err(Error::geometry(format!("mapped item #{} nested too deeply", entity.id)));
        }

        let source = decoder
            .resolve_attr(entity, 0)?
            .ok_or_else(|| Error::geometry(format!("#{} missing MappingSource", entity.id)))?;
        let representation = decoder
            .resolve_attr(&source, 1)?
            .ok_or_else(|| Error::geometry(format!("#{} missing MappedRepresentation", source.id)))?;

        let origin = match decoder.resolve_attr(&source, 0)? {
            Some(origin) => parse_axis2_placement(&origin, decoder)?,
            None => Matrix4::identity(),
        };
        let target = match decoder.resolve_attr(entity, 1)? {
            Some(target) => parse_transformation_operator(&target, decoder)?,
            None => Matrix4::identity(),
        };

        let mut mesh = ctx
            .generator
            .process_representation(&representation, decoder, ctx.depth + 1)?;
        mesh.transform(&(target * origin));
        Ok(mesh)
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["IFCMAPPEDITEM"]
    }
}

#[cfg(test)]
mod tests {
    use crate::processors::test_support::process;

    #[test]
    fn test_mapped_item_is_translated() {
        let content = "DATA;\n\
#1=IFCCARTESIANPOINTLIST3D(((0.,0.,0.),(1.,0.,0.),(0.,1.,0.)));\n\
#2=IFCTRIANGULATEDFACESET(#1,$,.T.,((1,2,3)),$);\n\
#3=IFCSHAPEREPRESENTATION($,'Body','Tessellation',(#2));\n\
#4=IFCCARTESIANPOINT((0.,0.,0.));\n\
#5=IFCAXIS2PLACEMENT3D(#4,$,$);\n\
#6=IFCREPRESENTATIONMAP(#5,#3);\n\
#7=IFCCARTESIANPOINT((5.,0.,0.));\n\
#8=IFCCARTESIANTRANSFORMATIONOPERATOR3D($,$,#7,2.,$);\n\
#9=IFCMAPPEDITEM(#6,#8);\n";
        let mesh = process(content, 9).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(&mesh.positions[3..6], &[7.0, 0.0, 0.0]);
    }
}
