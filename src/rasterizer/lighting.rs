//! Two-tone flat lighting
//!
//! Intensities are darkening amounts in color units: a face pointing straight
//! at the light is darkened by `light_intensity`, a face pointing straight
//! away by `shadow_intensity`, and everything else falls in between.

use serde::{Deserialize, Serialize};
use super::math::{face_normal, Vec3};
use super::types::Color;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Lighting {
    /// Direction the light travels in
    pub direction: Vec3,
    /// Darkening of fully illuminated faces
    pub light_intensity: f64,
    /// Darkening of faces turned away from the light
    pub shadow_intensity: f64,
}

impl Lighting {
    pub fn new(direction: Vec3, light_intensity: f64, shadow_intensity: f64) -> Self {
        Self {
            direction,
            light_intensity,
            shadow_intensity,
        }
    }

    /// Darkening for a face with the given (unnormalized) normal
    pub fn shade_amount(&self, normal: Vec3) -> f64 {
        let alignment = normal.normalize().dot(-self.direction.normalize());
        let t = ((alignment + 1.0) * 0.5).clamp(0.0, 1.0);
        self.shadow_intensity + (self.light_intensity - self.shadow_intensity) * t
    }

    pub fn lit_color(&self, base: Color, a: Vec3, b: Vec3, c: Vec3) -> Color {
        base.darken(self.shade_amount(face_normal(a, b, c)))
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self::new(Vec3::new(1.0, -1.0, 0.5), 30.0, 60.0)
    }
}
