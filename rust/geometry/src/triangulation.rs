// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Wrapper around earcutr for planar polygons with holes, plus the
//! projection helpers needed to triangulate 3D faces.

use crate::{Error, Point2, Point3, Result, Vector3};

/// Triangulate a polygon with optional holes
///
/// Returns triangle indices into the concatenation of `outer` and every hole
/// with at least three points (in order).
pub fn triangulate_polygon(outer: &[Point2<f64>], holes: &[Vec<Point2<f64>>]) -> Result<Vec<usize>> {
    let n = outer.len();
    if n < 3 {
        return Err(Error::TriangulationError(format!(
            "Need at least 3 points to triangulate, got {}",
            n
        )));
    }

    let holes: Vec<&Vec<Point2<f64>>> = holes.iter().filter(|h| h.len() >= 3).collect();

    // Triangles and simple quads need no ear clipping
    if holes.is_empty() && n == 3 {
        return Ok(vec![0, 1, 2]);
    }
    if holes.is_empty() && n == 4 && is_convex(outer) {
        return Ok(vec![0, 1, 2, 0, 2, 3]);
    }

    let total = n + holes.iter().map(|h| h.len()).sum::<usize>();
    let mut vertices = Vec::with_capacity(total * 2);
    vertices.extend(outer.iter().flat_map(|p| [p.x, p.y]));

    let mut hole_starts = Vec::with_capacity(holes.len());
    for hole in holes {
        hole_starts.push(vertices.len() / 2);
        vertices.extend(hole.iter().flat_map(|p| [p.x, p.y]));
    }

    earcutr::earcut(&vertices, &hole_starts, 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

fn is_convex(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    let mut sign = 0.0f64;
    for i in 0..n {
        let (p0, p1, p2) = (points[i], points[(i + 1) % n], points[(i + 2) % n]);
        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);
        if cross.abs() > 1e-10 {
            if sign != 0.0 && sign.signum() != cross.signum() {
                return false;
            }
            sign = cross;
        }
    }
    true
}

/// Polygon normal by Newell's method; +Z for degenerate input
pub fn polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut normal = Vector3::<f64>::zeros();
    for (i, current) in points.iter().enumerate() {
        let next = &points[(i + 1) % points.len()];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    if normal.norm() > 1e-10 {
        normal.normalize()
    } else {
        Vector3::z()
    }
}

/// Orthonormal (u, v) basis of the plane with the given normal
pub fn plane_basis(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    // Cross with the axis least parallel to the normal
    let (ax, ay, az) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
    let reference = if ax <= ay && ax <= az {
        Vector3::x()
    } else if ay <= az {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let u = normal.cross(&reference).normalize();
    let v = normal.cross(&u).normalize();
    (u, v)
}

/// Project points into a plane basis anchored at `origin`
pub fn project_to_plane(
    points: &[Point3<f64>],
    origin: &Point3<f64>,
    basis: &(Vector3<f64>, Vector3<f64>),
) -> Vec<Point2<f64>> {
    points
        .iter()
        .map(|p| {
            let d = p - origin;
            Point2::new(d.dot(&basis.0), d.dot(&basis.1))
        })
        .collect()
}
