// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary representation processors
//!
//! IfcFacetedBrep and the face/shell based surface models all bottom out in
//! IfcConnectedFaceSet → IfcFace → IfcPolyLoop.

use crate::processors::tessellated::triangulate_indexed_face;
use crate::router::{GeometryProcessor, ItemContext};
use crate::transform::point_from_entity;
use crate::{Error, Mesh, Point3, Result};
use twin_bim_core::{AttributeValue, DecodedEntity, EntityDecoder};

/// Append all faces of a connected face set (CfsFaces, attribute 0)
fn append_face_set(mesh: &mut Mesh, shell: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<()> {
    let faces = match shell.get(0) {
        Some(faces) => decoder.resolve_ref_list(faces)?,
        None => return Err(Error::geometry(format!("#{} missing CfsFaces", shell.id))),
    };

    for face in faces {
        if let Err(e) = append_face(mesh, &face, decoder) {
            tracing::debug!(face = face.id, error = %e, "face skipped");
        }
    }
    Ok(())
}

/// IfcFace: 0 Bounds. IfcFaceBound / IfcFaceOuterBound: 0 Bound, 1 Orientation.
fn append_face(mesh: &mut Mesh, face: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<()> {
    let bounds = match face.get(0) {
        Some(bounds) => decoder.resolve_ref_list(bounds)?,
        None => return Ok(()),
    };

    let mut outer: Option<Vec<Point3<f64>>> = None;
    let mut holes = Vec::new();
    for bound in &bounds {
        let Some(polyloop) = decoder.resolve_attr(bound, 0)? else {
            continue;
        };
        if !polyloop.is_type("IFCPOLYLOOP") {
            return Err(Error::UnsupportedItem(format!("face bound {}", polyloop.type_name)));
        }
        let mut points = Vec::new();
        for point in decoder.resolve_ref_list(polyloop.get(0).unwrap_or(&AttributeValue::Null))? {
            points.push(point_from_entity(&point)?);
        }
        if bound.get(1).and_then(|v| v.as_bool()) == Some(false) {
            points.reverse();
        }

        if bound.is_type("IFCFACEOUTERBOUND") && outer.is_none() {
            outer = Some(points);
        } else {
            holes.push(points);
        }
    }
    // Without an explicit outer bound the first bound is the outer one
    let outer = match outer {
        Some(outer) => outer,
        None if !holes.is_empty() => holes.remove(0),
        None => return Ok(()),
    };

    let mut all_points = outer.clone();
    let outer_idx: Vec<u32> = (0..outer.len() as u32).collect();
    let mut hole_idx = Vec::with_capacity(holes.len());
    for hole in holes {
        let start = all_points.len() as u32;
        hole_idx.push((start..start + hole.len() as u32).collect::<Vec<u32>>());
        all_points.extend(hole);
    }

    let mut face_mesh = Mesh::with_capacity(all_points.len(), all_points.len());
    for p in &all_points {
        face_mesh.add_vertex(*p);
    }
    triangulate_indexed_face(&mut face_mesh, &all_points, &outer_idx, &hole_idx)?;
    mesh.merge(&face_mesh);
    Ok(())
}

/// Handles IfcFacetedBrep (0 Outer: IfcClosedShell); voids of
/// IfcFacetedBrepWithVoids are ignored
pub struct FacetedBrepProcessor;

impl GeometryProcessor for FacetedBrepProcessor {
    fn process(&self, entity: &DecodedEntity, decoder: &mut EntityDecoder, _ctx: &ItemContext<'_>) -> Result<Mesh> {
        let shell = decoder
            .resolve_attr(entity, 0)?
            .ok_or_else(|| Error::geometry(format!("#{} missing Outer shell", entity.id)))?;
        let mut mesh = Mesh::new();
        append_face_set(&mut mesh, &shell, decoder)?;
        Ok(mesh)
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["IFCFACETEDBREP", "IFCFACETEDBREPWITHVOIDS"]
    }
}

/// Handles IfcFaceBasedSurfaceModel (0 FbsmFaces) and
/// IfcShellBasedSurfaceModel (0 SbsmBoundary)
pub struct SurfaceModelProcessor;

impl GeometryProcessor for SurfaceModelProcessor {
    fn process(&self, entity: &DecodedEntity, decoder: &mut EntityDecoder, _ctx: &ItemContext<'_>) -> Result<Mesh> {
        let shells = match entity.get(0) {
            Some(shells) => decoder.resolve_ref_list(shells)?,
            None => Vec::new(),
        };
        let mut mesh = Mesh::new();
        for shell in shells {
            append_face_set(&mut mesh, &shell, decoder)?;
        }
        Ok(mesh)
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["IFCFACEBASEDSURFACEMODEL", "IFCSHELLBASEDSURFACEMODEL"]
    }
}
