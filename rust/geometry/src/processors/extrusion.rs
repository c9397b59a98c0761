// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ExtrudedAreaSolid processor - extrusion of 2D profiles.

use crate::profile::{parse_profile, Profile2D};
use crate::router::{GeometryProcessor, ItemContext};
use crate::transform::{parse_axis2_placement, parse_direction};
use crate::triangulation::triangulate_polygon;
use crate::{Error, Mesh, Point3, Result, Vector3};
use twin_bim_core::{DecodedEntity, EntityDecoder};

/// Extrude a profile along `direction * depth`
///
/// Produces bottom and top caps plus one quad per boundary segment.
pub fn extrude_profile(profile: &Profile2D, direction: Vector3<f64>, depth: f64) -> Result<Mesh> {
    let cap = triangulate_polygon(&profile.outer, &profile.holes)?;
    let offset = direction * depth;

    let loops: Vec<&Vec<_>> = std::iter::once(&profile.outer)
        .chain(profile.holes.iter().filter(|h| h.len() >= 3))
        .collect();
    let ring: Vec<Point3<f64>> = loops
        .iter()
        .flat_map(|l| l.iter().map(|p| Point3::new(p.x, p.y, 0.0)))
        .collect();
    let n = ring.len() as u32;

    let mut mesh = Mesh::with_capacity(ring.len() * 2, cap.len() / 3 * 2 + ring.len() * 2);
    for p in &ring {
        mesh.add_vertex(*p);
    }
    for p in &ring {
        mesh.add_vertex(*p + offset);
    }

    // Caps: bottom faces down, top faces up
    for tri in cap.chunks_exact(3) {
        let (a, b, c) = (tri[0] as u32, tri[1] as u32, tri[2] as u32);
        mesh.add_triangle(a, c, b);
        mesh.add_triangle(a + n, b + n, c + n);
    }

    // Sides
    let mut start = 0u32;
    for l in loops {
        let len = l.len() as u32;
        for i in 0..len {
            let a = start + i;
            let b = start + (i + 1) % len;
            mesh.add_triangle(a, b, b + n);
            mesh.add_triangle(a, b + n, a + n);
        }
        start += len;
    }
    Ok(mesh)
}

/// Handles IfcExtrudedAreaSolid
///
/// Attributes: 0 SweptArea, 1 Position, 2 ExtrudedDirection, 3 Depth
pub struct ExtrudedAreaSolidProcessor;

impl GeometryProcessor for ExtrudedAreaSolidProcessor {
    fn process(&self, entity: &DecodedEntity, decoder: &mut EntityDecoder, _ctx: &ItemContext<'_>) -> Result<Mesh> {
        let swept_area = decoder
            .resolve_attr(entity, 0)?
            .ok_or_else(|| Error::geometry(format!("#{} missing SweptArea", entity.id)))?;
        let profile = parse_profile(&swept_area, decoder)?;

        let direction = match decoder.resolve_attr(entity, 2)? {
            Some(direction) => parse_direction(&direction)?,
            None => Vector3::z(),
        };
        if direction.norm() < 1e-12 {
            return Err(Error::geometry(format!("#{} has a zero extrusion direction", entity.id)));
        }
        let depth = entity
            .get_float(3)
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or_else(|| Error::geometry(format!("#{} has no positive Depth", entity.id)))?;

        let mut mesh = extrude_profile(&profile, direction.normalize(), depth)?;
        if let Some(position) = decoder.resolve_attr(entity, 1)? {
            mesh.transform(&parse_axis2_placement(&position, decoder)?);
        }
        Ok(mesh)
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["IFCEXTRUDEDAREASOLID"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::test_support::process;
    use approx::assert_relative_eq;

    #[test]
    fn test_extruded_box() {
        let content = "DATA;\n\
#1=IFCRECTANGLEPROFILEDEF(.AREA.,$,$,4.,2.);\n\
#2=IFCDIRECTION((0.,0.,1.));\n\
#3=IFCCARTESIANPOINT((0.,0.,1.));\n\
#4=IFCAXIS2PLACEMENT3D(#3,$,$);\n\
#5=IFCEXTRUDEDAREASOLID(#1,#4,#2,3.);\n";
        let mesh = process(content, 5).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        // 2 triangles per cap, 2 per side
        assert_eq!(mesh.triangle_count(), 2 * 2 + 4 * 2);
        let (min, max) = mesh.bounds().unwrap();
        assert_relative_eq!(min, Point3::new(-2.0, -1.0, 1.0));
        assert_relative_eq!(max, Point3::new(2.0, 1.0, 4.0));
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let content = "DATA;\n\
#1=IFCRECTANGLEPROFILEDEF(.AREA.,$,$,4.,2.);\n\
#2=IFCDIRECTION((0.,0.,1.));\n\
#5=IFCEXTRUDEDAREASOLID(#1,$,#2,0.);\n";
        assert!(process(content, 5).is_err());
    }
}
