//! Scene entities
//!
//! An entity has no transform matrix. Its triangles live in world space and
//! every move, rotation or scale rewrites their corners in place, so `position`
//! and `orientation` are bookkeeping for relative edits only.

use crate::rasterizer::{Color, EulerAngle, Lighting, Triangle, Vec3};

/// Distance moved by the debug movement controls
const CONTROL_STEP: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct GameObject {
    pub name: String,
    pub color: Color,
    /// Lighting and fog apply only when set
    pub shading: bool,
    pub backface_cull: bool,
    position: Vec3,
    orientation: EulerAngle,
    triangles: Vec<Triangle>,
}

impl GameObject {
    /// Build from raw mesh corners. The initial rotation is baked into the
    /// geometry about the mesh origin and is not recorded as orientation.
    pub fn from_mesh(
        name: &str,
        mesh: &[[Vec3; 3]],
        color: Color,
        position: Vec3,
        orientation: EulerAngle,
        scale: f64,
    ) -> Self {
        let triangles = mesh
            .iter()
            .map(|&[a, b, c]| Triangle::new(a, b, c, color))
            .collect();
        let mut obj = Self::with_triangles(name, color, triangles);
        for tri in &mut obj.triangles {
            tri.rotate_about(Vec3::ZERO, orientation);
        }
        obj.scale_by(scale);
        obj.set_position(position);
        obj
    }

    /// Build from corners that each carry their own color
    pub fn from_colored(name: &str, mesh: Vec<([Vec3; 3], Color)>, color: Color) -> Self {
        let triangles = mesh
            .into_iter()
            .map(|([a, b, c], tint)| Triangle::new(a, b, c, tint))
            .collect();
        Self::with_triangles(name, color, triangles)
    }

    fn with_triangles(name: &str, color: Color, triangles: Vec<Triangle>) -> Self {
        Self {
            name: name.to_string(),
            color,
            shading: true,
            backface_cull: true,
            position: Vec3::ZERO,
            orientation: EulerAngle::ZERO,
            triangles,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn orientation(&self) -> EulerAngle {
        self.orientation
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Record the scene index on every triangle
    pub fn set_owner(&mut self, owner: usize) {
        for tri in &mut self.triangles {
            tri.owner = owner;
        }
    }

    pub fn translate(&mut self, offset: Vec3) {
        for tri in &mut self.triangles {
            tri.translate(offset);
        }
        self.position = self.position + offset;
    }

    pub fn set_position(&mut self, position: Vec3) {
        let offset = position - self.position;
        for tri in &mut self.triangles {
            tri.translate(offset);
        }
        self.position = position;
    }

    /// Scale about the entity position
    pub fn scale_by(&mut self, factor: f64) {
        let pivot = self.position;
        for tri in &mut self.triangles {
            tri.translate(-pivot);
            tri.scale(factor);
            tri.translate(pivot);
        }
    }

    /// Rotate by `delta` about the entity position (X, then Y, then Z)
    pub fn rotate_local(&mut self, delta: EulerAngle) {
        let pivot = self.position;
        for tri in &mut self.triangles {
            tri.rotate_about(pivot, delta);
        }
        self.orientation = self.orientation + delta;
    }

    /// Rotate about the entity position by whatever per-axis delta takes the
    /// recorded orientation to `angle`
    pub fn set_local_rotation(&mut self, angle: EulerAngle) {
        self.rotate_local(angle - self.orientation);
    }

    /// Like `set_local_rotation`, but pivots about the world origin
    pub fn set_global_rotation(&mut self, angle: EulerAngle) {
        let delta = angle - self.orientation;
        for tri in &mut self.triangles {
            tri.rotate_about(Vec3::ZERO, delta);
        }
        self.position = self.position.rotate_euler(delta);
        self.orientation = angle;
    }

    pub fn forward_control(&mut self) {
        self.translate(Vec3::new(0.0, 0.0, CONTROL_STEP));
    }

    pub fn backward_control(&mut self) {
        self.translate(Vec3::new(0.0, 0.0, -CONTROL_STEP));
    }

    pub fn left_control(&mut self) {
        self.translate(Vec3::new(-CONTROL_STEP, 0.0, 0.0));
    }

    pub fn right_control(&mut self) {
        self.translate(Vec3::new(CONTROL_STEP, 0.0, 0.0));
    }

    /// Refresh cached lit colors; unshaded entities keep their base colors
    pub fn recalculate_lighting(&mut self, lighting: &Lighting) {
        if !self.shading {
            return;
        }
        for tri in &mut self.triangles {
            tri.lit_color = lighting.lit_color(tri.color, tri.a, tri.b, tri.c);
        }
    }
}
