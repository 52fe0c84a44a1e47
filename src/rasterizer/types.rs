//! Core types for the rasterizer

use serde::{Deserialize, Serialize};
use super::math::{centroid, face_normal, EulerAngle, Vec3};

/// RGB color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Subtract `amount` from every channel, saturating at 0 and 255
    pub fn darken(self, amount: f64) -> Self {
        let apply = |c: u8| (c as f64 - amount).clamp(0.0, 255.0) as u8;
        Self {
            r: apply(self.r),
            g: apply(self.g),
            b: apply(self.b),
        }
    }

    /// Pack as 0x00RRGGBB (framebuffer pixel format)
    pub fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    pub fn from_u32(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >> 8) & 0xFF) as u8,
            b: (rgb & 0xFF) as u8,
        }
    }
}

/// A world-space triangle.
///
/// There is no model space: moving, scaling or rotating an entity rewrites
/// these corners directly.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    /// Base color from the mesh/entity
    pub color: Color,
    /// Base color after lighting, refreshed by the scene
    pub lit_color: Color,
    /// Index of the owning entity in the scene
    pub owner: usize,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3, color: Color) -> Self {
        Self {
            a,
            b,
            c,
            color,
            lit_color: color,
            owner: 0,
        }
    }

    pub fn corners(&self) -> [Vec3; 3] {
        [self.a, self.b, self.c]
    }

    pub fn centroid(&self) -> Vec3 {
        centroid(self.a, self.b, self.c)
    }

    pub fn normal(&self) -> Vec3 {
        face_normal(self.a, self.b, self.c)
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.a = self.a + offset;
        self.b = self.b + offset;
        self.c = self.c + offset;
    }

    /// Scale about the world origin
    pub fn scale(&mut self, factor: f64) {
        self.a = self.a * factor;
        self.b = self.b * factor;
        self.c = self.c * factor;
    }

    /// Rotate every corner about `pivot`, X then Y then Z
    pub fn rotate_about(&mut self, pivot: Vec3, angle: EulerAngle) {
        self.a = (self.a - pivot).rotate_euler(angle) + pivot;
        self.b = (self.b - pivot).rotate_euler(angle) + pivot;
        self.c = (self.c - pivot).rotate_euler(angle) + pivot;
    }
}
