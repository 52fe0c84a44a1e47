//! Vector math for the software renderer and the flight model
//!
//! Everything is double precision. Rotations are always composed as
//! X (pitch), then Y (yaw), then Z (roll).

use std::ops::{Add, Mul, Neg, Sub};
use serde::{Deserialize, Serialize};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };
    pub const FORWARD: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };
    pub const RIGHT: Vec3 = Vec3 { x: 1.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len_sq(self) -> f64 {
        self.dot(self)
    }

    pub fn len(self) -> f64 {
        self.len_sq().sqrt()
    }

    pub fn distance(self, other: Vec3) -> f64 {
        (self - other).len()
    }

    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        self.scale(1.0 / l)
    }

    pub fn scale(self, s: f64) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// Component of `self` along `onto` (zero if `onto` is the zero vector)
    pub fn project_onto(self, onto: Vec3) -> Vec3 {
        let denom = onto.len_sq();
        if denom == 0.0 {
            return Vec3::ZERO;
        }
        onto.scale(self.dot(onto) / denom)
    }

    /// Component of `self` lying in the plane with the given normal
    pub fn project_onto_plane(self, normal: Vec3) -> Vec3 {
        self - self.project_onto(normal)
    }

    pub fn rotate_x(self, angle: f64) -> Vec3 {
        let (s, c) = angle.sin_cos();
        Vec3 {
            x: self.x,
            y: self.y * c - self.z * s,
            z: self.y * s + self.z * c,
        }
    }

    pub fn rotate_y(self, angle: f64) -> Vec3 {
        let (s, c) = angle.sin_cos();
        Vec3 {
            x: self.x * c + self.z * s,
            y: self.y,
            z: -self.x * s + self.z * c,
        }
    }

    pub fn rotate_z(self, angle: f64) -> Vec3 {
        let (s, c) = angle.sin_cos();
        Vec3 {
            x: self.x * c - self.y * s,
            y: self.x * s + self.y * c,
            z: self.z,
        }
    }

    /// Rotate by an Euler angle: X first, then Y, then Z
    pub fn rotate_euler(self, angle: EulerAngle) -> Vec3 {
        self.rotate_x(angle.x).rotate_y(angle.y).rotate_z(angle.z)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f64) -> Vec3 {
        self.scale(s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

/// Pitch (x), yaw (y) and roll (z) in radians. Never normalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EulerAngle {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl EulerAngle {
    pub const ZERO: EulerAngle = EulerAngle { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { x: pitch, y: yaw, z: roll }
    }
}

impl Add for EulerAngle {
    type Output = EulerAngle;
    fn add(self, other: EulerAngle) -> EulerAngle {
        EulerAngle::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for EulerAngle {
    type Output = EulerAngle;
    fn sub(self, other: EulerAngle) -> EulerAngle {
        EulerAngle::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Neg for EulerAngle {
    type Output = EulerAngle;
    fn neg(self) -> EulerAngle {
        EulerAngle::new(-self.x, -self.y, -self.z)
    }
}

/// Infinite plane given by a normal and any point on it
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    pub normal: Vec3,
    pub point: Vec3,
}

impl Plane {
    pub fn new(normal: Vec3, point: Vec3) -> Self {
        Self { normal, point }
    }

    /// Positive on the side the normal points to
    pub fn signed_distance(&self, p: Vec3) -> f64 {
        self.normal.dot(p - self.point)
    }

    /// Intersection of the line `origin + t * direction` with the plane.
    /// Returns None when the line is parallel to the plane.
    pub fn intersect_ray(&self, origin: Vec3, direction: Vec3) -> Option<Vec3> {
        let denom = self.normal.dot(direction);
        if denom == 0.0 {
            return None;
        }
        let t = self.normal.dot(self.point - origin) / denom;
        Some(origin + direction * t)
    }
}

pub fn centroid(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    Vec3::new(
        (a.x + b.x + c.x) / 3.0,
        (a.y + b.y + c.y) / 3.0,
        (a.z + b.z + c.z) / 3.0,
    )
}

/// Unnormalized face normal from the triangle's edge vectors
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).len() < 1e-9
    }

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(b) - 32.0).abs() < 1e-12);
    }

    #[test]
    fn test_vec3_cross() {
        let c = Vec3::RIGHT.cross(Vec3::UP);
        assert!(approx(c, Vec3::FORWARD));
    }

    #[test]
    fn test_axis_rotations() {
        assert!(approx(Vec3::UP.rotate_x(FRAC_PI_2), Vec3::FORWARD));
        assert!(approx(Vec3::FORWARD.rotate_y(FRAC_PI_2), Vec3::RIGHT));
        assert!(approx(Vec3::RIGHT.rotate_z(FRAC_PI_2), Vec3::UP));
    }

    #[test]
    fn test_euler_order_is_x_then_y_then_z() {
        let v = Vec3::new(0.3, -1.2, 2.5);
        let angle = EulerAngle::new(0.4, -0.7, 1.1);
        let manual = v.rotate_x(0.4).rotate_y(-0.7).rotate_z(1.1);
        assert!(approx(v.rotate_euler(angle), manual));
    }

    #[test]
    fn test_projection_splits_vector() {
        let v = Vec3::new(3.0, 4.0, -2.0);
        let n = Vec3::new(0.0, 2.0, 0.0);
        let along = v.project_onto(n);
        let across = v.project_onto_plane(n);
        assert!(approx(along, Vec3::new(0.0, 4.0, 0.0)));
        assert!(approx(across, Vec3::new(3.0, 0.0, -2.0)));
        assert!(approx(along + across, v));
    }

    #[test]
    fn test_plane_intersection() {
        let plane = Plane::new(Vec3::FORWARD, Vec3::new(0.0, 0.0, 10.0));
        let hit = plane
            .intersect_ray(Vec3::ZERO, Vec3::new(2.0, 1.0, 20.0))
            .expect("ray is not parallel");
        assert!(approx(hit, Vec3::new(1.0, 0.5, 10.0)));
        assert!(plane.intersect_ray(Vec3::ZERO, Vec3::RIGHT).is_none());
        assert!(plane.signed_distance(Vec3::new(0.0, 0.0, 11.0)) > 0.0);
        assert!(plane.signed_distance(Vec3::ZERO) < 0.0);
    }
}
