// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CSG (Constructive Solid Geometry) Operations
//!
//! Intersect and subtract triangle meshes through the csgrs BSP tree.
//!
//! Both operations take meshes expressed in one shared frame and return a
//! bare [`Mesh`] in that same frame. Meshes carry no placement, so a caller
//! that had its operand positioned somewhere must bake that translation into
//! the operand first and decide afterwards where the result goes.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::triangulation::{calculate_polygon_normal, project_to_2d, triangulate_polygon};
use nalgebra::{Point3, Vector3};

/// Which set operation to run on the BSP pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// Volume common to both operands
    Intersect,
    /// First operand minus the second operand's volume
    Subtract,
}

/// Mesh boolean processor
#[derive(Debug, Clone, Copy)]
pub struct SolidOps {
    /// Volumes at or below this are treated as degenerate
    pub epsilon: f64,
}

impl SolidOps {
    /// Create a new boolean processor
    pub fn new() -> Self {
        Self { epsilon: 1e-6 }
    }

    /// Volume common to `a` and `b`
    ///
    /// Failures are recovered as an empty mesh and logged; use
    /// [`SolidOps::try_intersect`] to observe them.
    pub fn intersect(&self, a: &Mesh, b: &Mesh) -> Mesh {
        self.recover(BooleanOp::Intersect, self.try_intersect(a, b))
    }

    /// `a` minus the volume of `b`
    pub fn subtract(&self, a: &Mesh, b: &Mesh) -> Mesh {
        self.recover(BooleanOp::Subtract, self.try_subtract(a, b))
    }

    /// Fallible intersection
    pub fn try_intersect(&self, a: &Mesh, b: &Mesh) -> Result<Mesh> {
        if self.is_degenerate(a) || self.is_degenerate(b) {
            return Ok(Mesh::new());
        }
        self.run(BooleanOp::Intersect, a, b)
    }

    /// Fallible subtraction
    pub fn try_subtract(&self, a: &Mesh, b: &Mesh) -> Result<Mesh> {
        if self.is_degenerate(a) {
            return Ok(Mesh::new());
        }
        if self.is_degenerate(b) {
            // Nothing to remove; still hand back freshly computed normals
            let mut result = a.clone();
            calculate_normals(&mut result);
            return Ok(result);
        }
        self.run(BooleanOp::Subtract, a, b)
    }

    /// Empty, or encloses no measurable volume
    pub fn is_degenerate(&self, mesh: &Mesh) -> bool {
        mesh.is_empty() || mesh.volume().abs() <= self.epsilon
    }

    fn recover(&self, op: BooleanOp, result: Result<Mesh>) -> Mesh {
        match result {
            Ok(mesh) => mesh,
            Err(err) => {
                tracing::warn!(?op, error = %err, "boolean operation failed, using empty result");
                Mesh::new()
            }
        }
    }

    fn run(&self, op: BooleanOp, a: &Mesh, b: &Mesh) -> Result<Mesh> {
        use csgrs::traits::CSG;

        let a_csg = Self::mesh_to_csgrs(a)?;
        let b_csg = Self::mesh_to_csgrs(b)?;

        let result_csg = match op {
            BooleanOp::Intersect => a_csg.intersection(&b_csg),
            BooleanOp::Subtract => a_csg.difference(&b_csg),
        };

        // BSP reconstruction does not preserve the input normals
        let mut result = Self::csgrs_to_mesh(&result_csg)?;
        calculate_normals(&mut result);
        Ok(result)
    }

    /// Convert our Mesh format to csgrs Mesh format
    fn mesh_to_csgrs(mesh: &Mesh) -> Result<csgrs::mesh::Mesh<()>> {
        use csgrs::mesh::{polygon::Polygon, vertex::Vertex, Mesh as CSGMesh};

        if !mesh.is_finite() {
            return Err(Error::geometry("mesh has non-finite positions"));
        }

        let mut polygons = Vec::with_capacity(mesh.triangle_count());

        for [v0, v1, v2] in mesh.triangles() {
            // Zero-area triangles would propagate NaN normals through the tree
            let face_normal = match (v1 - v0).cross(&(v2 - v0)).try_normalize(1e-10) {
                Some(n) => n,
                None => continue,
            };

            let vertices = vec![
                Vertex::new(v0, face_normal),
                Vertex::new(v1, face_normal),
                Vertex::new(v2, face_normal),
            ];

            polygons.push(Polygon::new(vertices, None));
        }

        if polygons.is_empty() {
            return Err(Error::EmptyMesh("no non-degenerate triangles".to_string()));
        }

        Ok(CSGMesh::from_polygons(&polygons, None))
    }

    /// Convert csgrs Mesh format back to our Mesh format
    fn csgrs_to_mesh(csg_mesh: &csgrs::mesh::Mesh<()>) -> Result<Mesh> {
        let mut mesh = Mesh::new();

        for polygon in &csg_mesh.polygons {
            let vertices = &polygon.vertices;
            if vertices.len() < 3 {
                continue;
            }

            let points_3d: Vec<Point3<f64>> = vertices
                .iter()
                .map(|v| Point3::new(v.pos[0], v.pos[1], v.pos[2]))
                .collect();

            let raw_normal = Vector3::new(
                vertices[0].normal[0],
                vertices[0].normal[1],
                vertices[0].normal[2],
            );
            let normal = match raw_normal.try_normalize(1e-10) {
                Some(n) if n.iter().all(|c| c.is_finite()) => n,
                _ => calculate_polygon_normal(&points_3d),
            };

            let indices = if points_3d.len() == 3 {
                vec![0, 1, 2]
            } else {
                let points_2d = project_to_2d(&points_3d, &normal);
                match triangulate_polygon(&points_2d) {
                    Ok(idx) => idx,
                    Err(_) => continue,
                }
            };

            let base_idx = mesh.vertex_count() as u32;
            for p in &points_3d {
                mesh.add_vertex(*p, normal);
            }

            for tri in indices.chunks_exact(3) {
                let (i0, mut i1, mut i2) = (tri[0], tri[1], tri[2]);
                // Keep the polygon's outward orientation whatever order earcut chose
                let winding = (points_3d[i1] - points_3d[i0]).cross(&(points_3d[i2] - points_3d[i0]));
                if winding.dot(&normal) < 0.0 {
                    std::mem::swap(&mut i1, &mut i2);
                }
                mesh.add_triangle(
                    base_idx + i0 as u32,
                    base_idx + i1 as u32,
                    base_idx + i2 as u32,
                );
            }
        }

        Ok(mesh)
    }
}

impl Default for SolidOps {
    fn default() -> Self {
        Self::new()
    }
}

/// Recompute vertex normals from face normals
///
/// Face normals are accumulated per vertex and normalized. BSP output never
/// shares vertices across polygons, so each polygon stays flat shaded.
pub fn calculate_normals(mesh: &mut Mesh) {
    let vertex_count = mesh.vertex_count();
    if vertex_count == 0 {
        return;
    }

    let mut normals = vec![Vector3::zeros(); vertex_count];

    for tri in mesh.indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let v0 = mesh.vertex(i0);
        let face_normal = (mesh.vertex(i1) - v0).cross(&(mesh.vertex(i2) - v0));

        normals[i0] += face_normal;
        normals[i1] += face_normal;
        normals[i2] += face_normal;
    }

    mesh.normals.clear();
    mesh.normals.reserve(vertex_count * 3);

    for normal in normals {
        let normalized = normal.try_normalize(1e-12).unwrap_or_else(Vector3::z);
        mesh.normals.push(normalized.x as f32);
        mesh.normals.push(normalized.y as f32);
        mesh.normals.push(normalized.z as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{aabb_to_mesh, box_mesh};

    fn unit_box_at(x: f64, y: f64, z: f64) -> Mesh {
        aabb_to_mesh(Point3::new(x, y, z), Point3::new(x + 1.0, y + 1.0, z + 1.0))
    }

    #[test]
    fn test_intersect_overlapping_boxes() {
        let ops = SolidOps::new();
        let a = aabb_to_mesh(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0));
        let b = aabb_to_mesh(Point3::new(1.0, 1.0, 1.0), Point3::new(3.0, 3.0, 3.0));

        let result = ops.intersect(&a, &b);
        assert!((result.volume() - 1.0).abs() < 1e-3);

        let (min, max) = result.bounds();
        assert!((min.x - 1.0).abs() < 1e-4 && (max.x - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_intersect_disjoint_is_empty_volume() {
        let ops = SolidOps::new();
        let result = ops.intersect(&unit_box_at(0.0, 0.0, 0.0), &unit_box_at(5.0, 5.0, 5.0));
        assert!(result.volume().abs() < 1e-6);
    }

    #[test]
    fn test_subtract_removes_overlap() {
        let ops = SolidOps::new();
        let a = aabb_to_mesh(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        let b = unit_box_at(1.0, 0.0, 0.0);

        let result = ops.subtract(&a, &b);
        assert!((result.volume() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_operands_yield_empty_volume() {
        let ops = SolidOps::new();
        let solid = box_mesh(2.0, 2.0, 2.0);
        let flat = box_mesh(2.0, 2.0, 0.0);

        assert!(ops.intersect(&solid, &flat).is_empty());
        assert!(ops.intersect(&flat, &solid).is_empty());
        assert!(ops.subtract(&flat, &solid).is_empty());
    }

    #[test]
    fn test_subtract_degenerate_cutter_keeps_host() {
        let ops = SolidOps::new();
        let solid = box_mesh(2.0, 2.0, 2.0);
        let result = ops.subtract(&solid, &Mesh::new());
        assert!((result.volume() - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_input_is_recovered() {
        let ops = SolidOps::new();
        let mut bad = box_mesh(1.0, 1.0, 1.0);
        bad.positions[0] = f32::NAN;

        assert!(ops.try_intersect(&box_mesh(2.0, 2.0, 2.0), &bad).is_err());
        assert!(ops.intersect(&box_mesh(2.0, 2.0, 2.0), &bad).is_empty());
    }

    #[test]
    fn test_result_normals_are_unit_length() {
        let ops = SolidOps::new();
        let result = ops.intersect(&box_mesh(2.0, 2.0, 2.0), &unit_box_at(0.0, 0.0, 0.0));
        assert_eq!(result.normals.len(), result.positions.len());
        for n in result.normals.chunks_exact(3) {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-4);
        }
    }
}
