// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tessellated geometry processors - pre-tessellated/polygon meshes.
//!
//! Handles IfcTriangulatedFaceSet (explicit triangle meshes) and
//! IfcPolygonalFaceSet (polygon meshes requiring triangulation).

use crate::router::{GeometryProcessor, ItemContext};
use crate::triangulation::{plane_basis, polygon_normal, project_to_plane, triangulate_polygon};
use crate::{Error, Mesh, Point3, Result};
use twin_bim_core::{AttributeValue, DecodedEntity, EntityDecoder};

/// Read the coordinate list behind attribute 0 (IfcCartesianPointList3D)
fn read_coordinates(entity: &DecodedEntity, decoder: &mut EntityDecoder) -> Result<Vec<Point3<f64>>> {
    let list = decoder
        .resolve_attr(entity, 0)?
        .ok_or_else(|| Error::geometry(format!("#{} missing Coordinates", entity.id)))?;
    let coords = list
        .get_list(0)
        .ok_or_else(|| Error::geometry(format!("#{} missing CoordList", list.id)))?;
    Ok(AttributeValue::parse_coordinate_list(coords)
        .into_iter()
        .map(Point3::from)
        .collect())
}

/// Optional PnIndex remapping (1-based indices into the point list)
fn read_pn_index(entity: &DecodedEntity, index: usize) -> Option<Vec<u32>> {
    let list = entity.get_list(index)?;
    list.iter()
        .map(|v| v.as_int().filter(|i| *i >= 1).map(|i| (i - 1) as u32))
        .collect()
}

/// Map face-local indices through PnIndex and bounds-check them
fn resolve_indices(raw: &[u32], pn_index: Option<&[u32]>, vertex_count: usize, id: u32) -> Result<Vec<u32>> {
    raw.iter()
        .map(|&i| {
            let resolved = match pn_index {
                Some(map) => *map.get(i as usize).ok_or_else(|| {
                    Error::geometry(format!("#{} PnIndex has no entry {}", id, i + 1))
                })?,
                None => i,
            };
            if (resolved as usize) < vertex_count {
                Ok(resolved)
            } else {
                Err(Error::geometry(format!("#{} index {} out of range", id, resolved + 1)))
            }
        })
        .collect()
}

fn mesh_from_points(points: &[Point3<f64>]) -> Mesh {
    let mut mesh = Mesh::with_capacity(points.len(), 0);
    for p in points {
        mesh.add_vertex(*p);
    }
    mesh
}

/// Handles IfcTriangulatedFaceSet
///
/// Attributes: 0 Coordinates, 1 Normals, 2 Closed, 3 CoordIndex, 4 PnIndex
pub struct TriangulatedFaceSetProcessor;

impl GeometryProcessor for TriangulatedFaceSetProcessor {
    fn process(&self, entity: &DecodedEntity, decoder: &mut EntityDecoder, _ctx: &ItemContext<'_>) -> Result<Mesh> {
        let points = read_coordinates(entity, decoder)?;
        let faces = entity
            .get_list(3)
            .ok_or_else(|| Error::geometry(format!("#{} missing CoordIndex", entity.id)))?;
        let pn_index = read_pn_index(entity, 4);

        let mut mesh = mesh_from_points(&points);
        for face in AttributeValue::parse_index_list(faces) {
            if face.len() != 3 {
                return Err(Error::geometry(format!("#{} face is not a triangle", entity.id)));
            }
            let idx = resolve_indices(&face, pn_index.as_deref(), points.len(), entity.id)?;
            mesh.add_triangle(idx[0], idx[1], idx[2]);
        }
        Ok(mesh)
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["IFCTRIANGULATEDFACESET", "IFCTRIANGULATEDIRREGULARNETWORK"]
    }
}

/// Handles IfcPolygonalFaceSet
///
/// Attributes: 0 Coordinates, 1 Closed, 2 Faces, 3 PnIndex. Faces are
/// IfcIndexedPolygonalFace (CoordIndex) or the WithVoids variant which adds
/// InnerCoordIndices.
pub struct PolygonalFaceSetProcessor;

impl GeometryProcessor for PolygonalFaceSetProcessor {
    fn process(&self, entity: &DecodedEntity, decoder: &mut EntityDecoder, _ctx: &ItemContext<'_>) -> Result<Mesh> {
        let points = read_coordinates(entity, decoder)?;
        let pn_index = read_pn_index(entity, 3);
        let faces = match entity.get(2) {
            Some(faces) => decoder.resolve_ref_list(faces)?,
            None => Vec::new(),
        };

        let mut mesh = mesh_from_points(&points);
        for face in faces {
            let outer = one_based(face.get_list(0).unwrap_or(&[]));
            let outer = resolve_indices(&outer, pn_index.as_deref(), points.len(), face.id)?;
            let mut holes = Vec::new();
            if let Some(inner) = face.get_list(1) {
                for hole in AttributeValue::parse_index_list(inner) {
                    holes.push(resolve_indices(&hole, pn_index.as_deref(), points.len(), face.id)?);
                }
            }
            triangulate_indexed_face(&mut mesh, &points, &outer, &holes)?;
        }
        Ok(mesh)
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["IFCPOLYGONALFACESET"]
    }
}

fn one_based(list: &[AttributeValue]) -> Vec<u32> {
    list.iter()
        .filter_map(|v| v.as_int())
        .filter(|i| *i >= 1)
        .map(|i| (i - 1) as u32)
        .collect()
}

/// Triangulate a planar face given as indices into `points`, writing
/// triangles that reference the mesh's existing vertices
pub(crate) fn triangulate_indexed_face(
    mesh: &mut Mesh,
    points: &[Point3<f64>],
    outer: &[u32],
    holes: &[Vec<u32>],
) -> Result<()> {
    if outer.len() < 3 {
        return Ok(());
    }
    let gather = |indices: &[u32]| -> Vec<Point3<f64>> {
        indices.iter().map(|&i| points[i as usize]).collect()
    };

    let outer_points = gather(outer);
    let basis = plane_basis(&polygon_normal(&outer_points));
    let outer_2d = project_to_plane(&outer_points, &outer_points[0], &basis);
    let holes_2d: Vec<_> = holes
        .iter()
        .map(|h| project_to_plane(&gather(h), &outer_points[0], &basis))
        .collect();

    let lookup: Vec<u32> = outer
        .iter()
        .chain(holes.iter().filter(|h| h.len() >= 3).flatten())
        .copied()
        .collect();
    for tri in triangulate_polygon(&outer_2d, &holes_2d)?.chunks_exact(3) {
        mesh.add_triangle(lookup[tri[0]], lookup[tri[1]], lookup[tri[2]]);
    }
    Ok(())
}
