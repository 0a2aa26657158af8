// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Perspective camera, pointer coordinates and pick rays.

use nalgebra::{Isometry3, Perspective3, Point3, Vector3};

use crate::assembly::AssemblyFrame;

/// A half-line in world space. `direction` is always unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub direction: Vector3<f64>,
}

impl Ray {
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self {
            origin,
            direction: direction.try_normalize(1e-12).unwrap_or_else(Vector3::z),
        }
    }

    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }

    /// Distance to the triangle along the ray (Möller-Trumbore), ignoring
    /// hits behind the origin.
    pub fn intersect_triangle(&self, v0: &Point3<f64>, v1: &Point3<f64>, v2: &Point3<f64>) -> Option<f64> {
        const EPSILON: f64 = 1e-9;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = self.direction.cross(&edge2);
        let a = edge1.dot(&h);
        if a.abs() < EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = self.origin - v0;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * self.direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        (t > EPSILON).then_some(t)
    }

    /// Entry distance into an axis-aligned box (slab test); zero when the
    /// origin is inside.
    pub fn intersect_aabb(&self, min: &Point3<f64>, max: &Point3<f64>) -> Option<f64> {
        let mut t_near = f64::NEG_INFINITY;
        let mut t_far = f64::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let direction = self.direction[axis];
            if direction.abs() < 1e-15 {
                if origin < min[axis] || origin > max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / direction;
            let (t0, t1) = {
                let a = (min[axis] - origin) * inv;
                let b = (max[axis] - origin) * inv;
                if a < b { (a, b) } else { (b, a) }
            };
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        if t_far < 0.0 {
            return None;
        }
        Some(t_near.max(0.0))
    }
}

/// Pointer position in normalized device coordinates (`-1..=1`, +Y up).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
}

impl Pointer {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert client pixel coordinates (origin top-left) to NDC.
    pub fn from_client(client_x: f64, client_y: f64, width: f64, height: f64) -> Self {
        if width <= 0.0 || height <= 0.0 {
            return Self::default();
        }
        Self {
            x: client_x / width * 2.0 - 1.0,
            y: -(client_y / height) * 2.0 + 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f64>,
    pub target: Point3<f64>,
    pub up: Vector3<f64>,
    /// Vertical field of view.
    pub fov_degrees: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Camera {
    pub const DEFAULT_FOV: f64 = 30.0;
    pub const DEFAULT_NEAR: f64 = 0.1;
    pub const DEFAULT_FAR: f64 = 10_000.0;

    /// Default view of an assembly: off to the side and in front of the
    /// footprint, looking back at its vertical extent.
    pub fn framing(frame: &AssemblyFrame, aspect: f64) -> Self {
        Self {
            position: Point3::new(frame.width * 2.0, frame.height, frame.width * 2.0),
            target: Point3::new(0.0, frame.height, 0.0),
            up: Vector3::y(),
            fov_degrees: Self::DEFAULT_FOV,
            aspect: sanitize_aspect(aspect),
            near: Self::DEFAULT_NEAR,
            far: Self::DEFAULT_FAR,
        }
    }

    pub fn set_aspect(&mut self, aspect: f64) {
        self.aspect = sanitize_aspect(aspect);
    }

    /// World to camera transform.
    pub fn view(&self) -> Isometry3<f64> {
        Isometry3::look_at_rh(&self.position, &self.target, &self.up)
    }

    pub fn projection(&self) -> Perspective3<f64> {
        Perspective3::new(self.aspect, self.fov_degrees.to_radians(), self.near, self.far)
    }

    /// World-space point for a point in normalized device coordinates.
    pub fn unproject(&self, ndc: &Point3<f64>) -> Point3<f64> {
        let eye_space = self.projection().unproject_point(ndc);
        self.view().inverse_transform_point(&eye_space)
    }

    /// Pick ray from the camera through the pointer.
    pub fn ray(&self, pointer: &Pointer) -> Ray {
        let far_point = self.unproject(&Point3::new(pointer.x, pointer.y, 1.0));
        Ray::new(self.position, far_point - self.position)
    }
}

fn sanitize_aspect(aspect: f64) -> f64 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}
