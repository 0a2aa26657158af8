// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Box primitives
//!
//! Every solid in an assembly section starts life as an axis-aligned box:
//! sheets, frames, voids, unit cells, and the clipping volume itself.

use crate::mesh::Mesh;
use nalgebra::{Point3, Vector3};

/// Box centered on the origin, `width` along X, `height` along Y and
/// `depth` along Z.
///
/// A non-positive or non-finite dimension yields an empty mesh: a carved
/// element whose offsets consume its whole extent has no volume.
pub fn box_mesh(width: f64, height: f64, depth: f64) -> Mesh {
    let valid = |d: f64| d.is_finite() && d > 0.0;
    if !(valid(width) && valid(height) && valid(depth)) {
        return Mesh::new();
    }

    let half = Vector3::new(width / 2.0, height / 2.0, depth / 2.0);
    aabb_to_mesh(Point3::from(-half), Point3::from(half))
}

/// Create a box mesh from AABB min/max bounds
///
/// Four vertices per face so each face keeps a flat normal; 12 triangles.
pub fn aabb_to_mesh(min: Point3<f64>, max: Point3<f64>) -> Mesh {
    let mut mesh = Mesh::with_capacity(24, 36);

    let v0 = Point3::new(min.x, min.y, min.z); // 0: front-bottom-left
    let v1 = Point3::new(max.x, min.y, min.z); // 1: front-bottom-right
    let v2 = Point3::new(max.x, max.y, min.z); // 2: front-top-right
    let v3 = Point3::new(min.x, max.y, min.z); // 3: front-top-left
    let v4 = Point3::new(min.x, min.y, max.z); // 4: back-bottom-left
    let v5 = Point3::new(max.x, min.y, max.z); // 5: back-bottom-right
    let v6 = Point3::new(max.x, max.y, max.z); // 6: back-top-right
    let v7 = Point3::new(min.x, max.y, max.z); // 7: back-top-left

    // Corners listed counter-clockwise when viewed from outside
    let faces = [
        ([v0, v3, v2, v1], -Vector3::z()),
        ([v4, v5, v6, v7], Vector3::z()),
        ([v0, v4, v7, v3], -Vector3::x()),
        ([v1, v2, v6, v5], Vector3::x()),
        ([v0, v1, v5, v4], -Vector3::y()),
        ([v3, v7, v6, v2], Vector3::y()),
    ];

    for (corners, normal) in faces {
        let base = mesh.vertex_count() as u32;
        for corner in corners {
            mesh.add_vertex(corner, normal);
        }
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base, base + 2, base + 3);
    }

    mesh
}
