//! Wavefront OBJ ingestion and procedural meshes
//!
//! Only positions matter: texture and normal indices on face tokens are
//! ignored. Quads are split along their 0-2 diagonal, larger polygons are
//! fanned from their first vertex.

use std::fs;
use std::path::Path;
use thiserror::Error;
use crate::rasterizer::{Color, Vec3};

/// Raw mesh: three world-space corners per triangle
pub type MeshTriangles = Vec<[Vec3; 3]>;

/// Error type for mesh loading
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: bad number {token:?}")]
    BadNumber { line: usize, token: String },
    #[error("line {line}: vertex needs 3 coordinates")]
    ShortVertex { line: usize },
    #[error("line {line}: face needs at least 3 vertices")]
    ShortFace { line: usize },
    #[error("line {line}: vertex index {index} out of range (have {count})")]
    BadIndex { line: usize, index: i64, count: usize },
}

/// Load an OBJ file from disk
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<MeshTriangles, MeshError> {
    let contents = fs::read_to_string(path)?;
    parse_obj(&contents)
}

/// Parse OBJ text
pub fn parse_obj(src: &str) -> Result<MeshTriangles, MeshError> {
    let mut vertices: Vec<Vec3> = Vec::new();
    let mut triangles = Vec::new();

    for (i, raw) in src.lines().enumerate() {
        let line = i + 1;
        let mut tokens = raw.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let mut coords = [0.0; 3];
                for slot in coords.iter_mut() {
                    let token = tokens.next().ok_or(MeshError::ShortVertex { line })?;
                    *slot = token.parse().map_err(|_| MeshError::BadNumber {
                        line,
                        token: token.to_string(),
                    })?;
                }
                vertices.push(Vec3::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let face = tokens
                    .map(|t| resolve_index(t, line, vertices.len()))
                    .collect::<Result<Vec<usize>, MeshError>>()?;
                if face.len() < 3 {
                    return Err(MeshError::ShortFace { line });
                }
                for k in 1..face.len() - 1 {
                    triangles.push([vertices[face[0]], vertices[face[k]], vertices[face[k + 1]]]);
                }
            }
            _ => {}
        }
    }

    Ok(triangles)
}

/// Turn an `i`, `i/t`, `i//n` or `i/t/n` token into a zero-based index
fn resolve_index(token: &str, line: usize, count: usize) -> Result<usize, MeshError> {
    let head = token.split('/').next().unwrap_or(token);
    let index: i64 = head.parse().map_err(|_| MeshError::BadNumber {
        line,
        token: token.to_string(),
    })?;
    // OBJ indices are 1-based; negative ones count back from the end
    let resolved = if index < 0 { count as i64 + index } else { index - 1 };
    if resolved < 0 || resolved >= count as i64 {
        return Err(MeshError::BadIndex { line, index, count });
    }
    Ok(resolved as usize)
}

/// Flat checkerboard ground in the XZ plane, centered on the origin.
/// Returns the triangles together with their per-cell colors.
pub fn ground_grid(half_size: f64, cells: usize, y: f64, color_a: Color, color_b: Color) -> Vec<([Vec3; 3], Color)> {
    let cells = cells.max(1);
    let step = half_size * 2.0 / cells as f64;
    let mut out = Vec::with_capacity(cells * cells * 2);
    for row in 0..cells {
        for col in 0..cells {
            let x0 = -half_size + col as f64 * step;
            let z0 = -half_size + row as f64 * step;
            let p00 = Vec3::new(x0, y, z0);
            let p10 = Vec3::new(x0 + step, y, z0);
            let p01 = Vec3::new(x0, y, z0 + step);
            let p11 = Vec3::new(x0 + step, y, z0 + step);
            let color = if (row + col) % 2 == 0 { color_a } else { color_b };
            // Wound so the face normal points up
            out.push(([p00, p01, p11], color));
            out.push(([p00, p11, p10], color));
        }
    }
    out
}
