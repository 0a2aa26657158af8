// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Section Geometry
//!
//! Triangle mesh buffers, box primitives and BSP boolean operations used to
//! compile architectural assembly sections into solids. Booleans run through
//! csgrs; math comes from nalgebra.

pub mod csg;
pub mod error;
pub mod mesh;
pub mod primitives;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use csg::{calculate_normals, BooleanOp, SolidOps};
pub use error::{Error, Result};
pub use mesh::Mesh;
pub use primitives::{aabb_to_mesh, box_mesh};
pub use triangulation::triangulate_polygon;
