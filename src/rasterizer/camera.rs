//! Camera and orbit follow controller
//!
//! The camera looks along `direction()`; triangles are projected onto a
//! render plane `plane_distance` units in front of it.

use serde::{Deserialize, Serialize};
use super::math::{Plane, Vec3};

/// Camera state for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Heading in degrees (rotation about Y)
    pub horizontal: f64,
    /// Elevation in degrees (positive looks up)
    pub vertical: f64,
    /// Triangles whose centroid is farther than this are skipped
    pub view_distance: f64,
    /// Distance from the camera to the render plane
    pub plane_distance: f64,
    /// Width of the render plane in world units
    pub render_plane_width: f64,
}

impl Camera {
    pub fn new(position: Vec3, view_distance: f64, plane_distance: f64, fov_degrees: f64) -> Self {
        Self {
            position,
            horizontal: 0.0,
            vertical: 0.0,
            view_distance,
            plane_distance,
            render_plane_width: 2.0 * plane_distance * (fov_degrees.to_radians() * 0.5).tan(),
        }
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_orientation(&mut self, horizontal: f64, vertical: f64) {
        self.horizontal = horizontal;
        self.vertical = vertical.clamp(-89.0, 89.0);
    }

    /// Unit view direction
    pub fn direction(&self) -> Vec3 {
        direction_from_angles(self.horizontal, self.vertical)
    }

    pub fn render_plane(&self) -> Plane {
        let normal = self.direction();
        Plane::new(normal, self.position + normal * self.plane_distance)
    }

    /// Where the view direction pierces the render plane
    pub fn center_point(&self) -> Vec3 {
        self.position + self.direction() * self.plane_distance
    }

    /// Rotate a point already centered on `center_point()` into the camera's
    /// local frame, where the render plane is the XY plane.
    pub fn to_local(&self, offset: Vec3) -> Vec3 {
        offset
            .rotate_y(-self.horizontal.to_radians())
            .rotate_x(self.vertical.to_radians())
    }
}

fn direction_from_angles(horizontal: f64, vertical: f64) -> Vec3 {
    Vec3::FORWARD
        .rotate_x(-vertical.to_radians())
        .rotate_y(horizontal.to_radians())
}

/// Keeps the camera orbiting a target at a fixed distance.
///
/// Mouse drag changes the orbit angles and the wheel changes the distance.
/// `track` is called by the frame loop once the target has moved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitController {
    pub distance: f64,
    pub horizontal: f64,
    pub vertical: f64,
    pub degrees_per_pixel: f64,
    pub zoom_step: f64,
    pub min_distance: f64,
}

impl OrbitController {
    pub fn new(distance: f64) -> Self {
        Self {
            distance,
            horizontal: 0.0,
            vertical: -10.0,
            degrees_per_pixel: 0.25,
            zoom_step: 50.0,
            min_distance: 100.0,
        }
    }

    pub fn rotate(&mut self, dx: f64, dy: f64) {
        self.horizontal += dx * self.degrees_per_pixel;
        self.vertical = (self.vertical - dy * self.degrees_per_pixel).clamp(-89.0, 89.0);
    }

    /// Positive steps move the camera closer
    pub fn zoom(&mut self, steps: f64) {
        self.distance = (self.distance - steps * self.zoom_step).max(self.min_distance);
    }

    pub fn track(&self, camera: &mut Camera, target: Vec3) {
        camera.set_orientation(self.horizontal, self.vertical);
        let back = camera.direction() * self.distance;
        camera.set_position(target - back);
    }
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new(1000.0)
    }
}
