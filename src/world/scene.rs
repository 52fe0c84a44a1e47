//! Scene: every entity plus the light that shades them
//!
//! Membership is fixed once loading is done. The renderer never reads the
//! entities directly; it gets a `FrameSnapshot` copied at a frame boundary.

use crate::rasterizer::{EulerAngle, FrameSnapshot, Lighting, Vec3};
use super::entity::GameObject;

pub struct Scene {
    objects: Vec<GameObject>,
    lighting: Lighting,
}

impl Scene {
    pub fn new(lighting: Lighting) -> Self {
        Self {
            objects: Vec::new(),
            lighting,
        }
    }

    /// Add an entity and return its index (the owner id on its triangles)
    pub fn add_object(&mut self, mut object: GameObject) -> usize {
        let index = self.objects.len();
        object.set_owner(index);
        object.recalculate_lighting(&self.lighting);
        log::info!(
            "added object {:?} ({} triangles, base {:?}) as #{}",
            object.name,
            object.triangles().len(),
            object.color,
            index
        );
        self.objects.push(object);
        index
    }

    pub fn set_lighting(&mut self, lighting: Lighting) {
        self.lighting = lighting;
        for obj in &mut self.objects {
            obj.recalculate_lighting(&self.lighting);
        }
    }

    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    pub fn object(&self, index: usize) -> Option<&GameObject> {
        self.objects.get(index)
    }

    pub fn object_mut(&mut self, index: usize) -> Option<&mut GameObject> {
        self.objects.get_mut(index)
    }

    pub fn triangle_count(&self) -> usize {
        self.objects.iter().map(|o| o.triangles().len()).sum()
    }

    /// Write a simulated pose into an entity and refresh its lighting.
    /// Returns false if there is no entity at `index`.
    pub fn set_transform(&mut self, index: usize, position: Vec3, rotation: EulerAngle) -> bool {
        let lighting = self.lighting;
        match self.objects.get_mut(index) {
            Some(obj) => {
                obj.set_position(position);
                obj.set_local_rotation(rotation);
                obj.recalculate_lighting(&lighting);
                true
            }
            None => false,
        }
    }

    /// Copy the current world triangles into `snapshot`, reusing its storage
    pub fn snapshot_into(&self, snapshot: &mut FrameSnapshot) {
        snapshot.clear();
        snapshot.triangles.reserve(self.triangle_count());
        for obj in &self.objects {
            snapshot.triangles.extend_from_slice(obj.triangles());
            snapshot.shaded.push(obj.shading);
            snapshot.backface_cull.push(obj.backface_cull);
        }
    }
}
