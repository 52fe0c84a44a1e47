//! World module - entities, meshes and scene configuration
//!
//! - Entities keep their triangles in world space (no transform matrix)
//! - OBJ meshes and a procedural ground grid
//! - RON config describing the whole scene
//!
//! Only the config surface is re-exported; the frame loop reaches entities
//! and meshes through `SimConfig::build_scene`.

mod config;
mod entity;
mod mesh;
mod scene;

pub use config::*;
