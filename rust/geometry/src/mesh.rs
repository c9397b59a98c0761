// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use nalgebra::{Matrix4, Point3};

/// Triangle mesh with optional curve edges
///
/// Buffers are flat: three coordinates per vertex, three indices per
/// triangle and two indices per edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f64>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
    /// Edge indices (i0, i1), emitted for curve items
    pub edges: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices * 3),
            indices: Vec::with_capacity(triangles * 3),
            edges: Vec::new(),
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Append a vertex and return its index
    #[inline]
    pub fn add_vertex(&mut self, point: Point3<f64>) -> u32 {
        let index = self.vertex_count() as u32;
        self.positions.extend_from_slice(&[point.x, point.y, point.z]);
        index
    }

    #[inline]
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    #[inline]
    pub fn add_edge(&mut self, a: u32, b: u32) {
        self.edges.extend_from_slice(&[a, b]);
    }

    /// Append another mesh, offsetting its indices
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertex_count() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.indices.extend(other.indices.iter().map(|i| i + offset));
        self.edges.extend(other.edges.iter().map(|i| i + offset));
    }

    /// Apply an affine transform to all positions
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for chunk in self.positions.chunks_exact_mut(3) {
            let p = matrix.transform_point(&Point3::new(chunk[0], chunk[1], chunk[2]));
            chunk[0] = p.x;
            chunk[1] = p.y;
            chunk[2] = p.z;
        }
    }

    /// Uniformly scale all positions (unit conversion)
    pub fn scale(&mut self, factor: f64) {
        if factor != 1.0 {
            self.positions.iter_mut().for_each(|v| *v *= factor);
        }
    }

    /// Axis-aligned bounds, None for an empty mesh
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut chunks = self.positions.chunks_exact(3);
        let first = chunks.next()?;
        let mut min = Point3::new(first[0], first[1], first[2]);
        let mut max = min;
        for c in chunks {
            for axis in 0..3 {
                min[axis] = min[axis].min(c[axis]);
                max[axis] = max[axis].max(c[axis]);
            }
        }
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn triangle() -> Mesh {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_triangle(a, b, c);
        mesh
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut mesh = triangle();
        let mut line = Mesh::new();
        let a = line.add_vertex(Point3::new(0.0, 0.0, 1.0));
        let b = line.add_vertex(Point3::new(0.0, 0.0, 2.0));
        line.add_edge(a, b);

        mesh.merge(&line);
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.edges, vec![3, 4]);
    }

    #[test]
    fn test_transform_and_bounds() {
        let mut mesh = triangle();
        mesh.transform(&Matrix4::new_translation(&Vector3::new(10.0, 0.0, 5.0)));
        mesh.scale(0.5);
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Point3::new(5.0, 0.0, 2.5));
        assert_eq!(max, Point3::new(5.5, 0.5, 2.5));
        assert!(Mesh::new().bounds().is_none());
    }
}
