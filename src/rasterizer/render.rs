//! Core rendering functions
//!
//! Per frame: order triangles far-to-near (painter's algorithm, no depth
//! buffer), cull by view distance and the near plane, project onto the
//! camera's render plane, shade/fog, then scanline-fill into the framebuffer.

use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use super::camera::Camera;
use super::math::{Plane, Vec3};
use super::types::{Color, Triangle};

/// Allowed overshoot of the render plane bounds before a corner counts as off-screen
const BOUNDS_MARGIN: f64 = 1.2;

/// Integer pixel coordinate (x = column, y = row, row 0 at the top)
pub type ScreenPoint = (i32, i32);

#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("framebuffer size {0}x{1} does not fit an image")]
    Size(usize, usize),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Framebuffer for software rendering, one 0x00RRGGBB value per pixel
pub struct Framebuffer {
    pub pixels: Vec<u32>,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height],
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color.to_u32());
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Fill the half-open run [min(x0, x1), max(x0, x1)) on row `y`.
    /// Out-of-range parts are clamped away.
    pub fn draw_hline(&mut self, x0: i32, x1: i32, y: i32, rgb: u32) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let w = self.width as i32;
        let start = x0.min(x1).clamp(0, w) as usize;
        let end = x0.max(x1).clamp(0, w) as usize;
        let row = y as usize * self.width;
        self.pixels[row + start..row + end].fill(rgb);
    }

    /// Solid scanline fill: top half (top -> middle vertex), then bottom
    /// half (middle -> bottom vertex). Rows with no height are skipped.
    pub fn fill_triangle(&mut self, p1: ScreenPoint, p2: ScreenPoint, p3: ScreenPoint, color: Color) {
        let rgb = color.to_u32();
        let mut pts = [p1, p2, p3];
        pts.sort_by_key(|p| p.1);
        let [top, mid, bot] = pts;
        let w = self.width as i32;
        let h = self.height as i32;

        if mid.1 != top.1 && bot.1 != top.1 {
            for y in top.1.max(0)..mid.1.min(h) {
                let e1 = edge_x(y, top, mid).clamp(0, w);
                let e2 = edge_x(y, top, bot).clamp(0, w);
                self.draw_hline(e1, e2, y, rgb);
            }
        }

        if bot.1 != mid.1 && bot.1 != top.1 {
            for y in mid.1.max(0)..bot.1.min(h) {
                let e1 = edge_x(y, bot, mid).clamp(0, w);
                let e2 = edge_x(y, bot, top).clamp(0, w);
                self.draw_hline(e1, e2, y, rgb);
            }
        }
    }

    /// Expand to RGBA bytes for presentation
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            let c = Color::from_u32(p);
            out.extend_from_slice(&[c.r, c.g, c.b, 255]);
        }
        out
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), ScreenshotError> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for &p in &self.pixels {
            let c = Color::from_u32(p);
            bytes.extend_from_slice(&[c.r, c.g, c.b]);
        }
        let img = image::RgbImage::from_raw(self.width as u32, self.height as u32, bytes)
            .ok_or(ScreenshotError::Size(self.width, self.height))?;
        img.save(path)?;
        Ok(())
    }
}

/// X where the edge `from -> to` crosses row `y`. Vertical edges return
/// their column directly so no slope is ever computed for them.
fn edge_x(y: i32, from: ScreenPoint, to: ScreenPoint) -> i32 {
    if to.0 == from.0 {
        return from.0;
    }
    let slope = (to.1 as f64 - from.1 as f64) / (to.0 as f64 - from.0 as f64);
    ((y as f64 - from.1 as f64) / slope + from.0 as f64) as i32
}

/// Distance fog with a quadratic ease toward `color`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FogSettings {
    pub start: f64,
    pub full: f64,
    pub color: Color,
}

impl FogSettings {
    pub fn blend(&self, lit: Color, distance: f64) -> Color {
        if distance <= self.start {
            return lit;
        }
        if distance >= self.full {
            return self.color;
        }
        let t = ((distance - self.start) / (self.full - self.start)).clamp(0.0, 1.0);
        let t2 = t * t;
        let mix = |l: u8, f: u8| {
            let delta = ((f as i32 - l as i32) as f64 * t2) as i32;
            (l as i32 + delta).clamp(0, 255) as u8
        };
        Color::new(
            mix(lit.r, self.color.r),
            mix(lit.g, self.color.g),
            mix(lit.b, self.color.b),
        )
    }
}

/// Rasterizer settings
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub background: Color,
    pub fog: Option<FogSettings>,
    pub fog_enabled: bool,
    /// Honor each entity's back-face flag
    pub cull_back_faces: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            background: Color::new(200, 220, 255),
            fog: None,
            fog_enabled: false,
            cull_back_faces: false,
        }
    }
}

/// World triangles handed from the simulation to the renderer at a frame
/// boundary, plus the per-entity flags the renderer needs.
#[derive(Debug, Clone, Default)]
pub struct FrameSnapshot {
    pub triangles: Vec<Triangle>,
    /// Indexed by `Triangle::owner`
    pub shaded: Vec<bool>,
    /// Indexed by `Triangle::owner`
    pub backface_cull: Vec<bool>,
}

impl FrameSnapshot {
    pub fn clear(&mut self) {
        self.triangles.clear();
        self.shaded.clear();
        self.backface_cull.clear();
    }

    pub fn is_shaded(&self, tri: &Triangle) -> bool {
        self.shaded.get(tri.owner).copied().unwrap_or(false)
    }

    fn culls_back_faces(&self, tri: &Triangle) -> bool {
        self.backface_cull.get(tri.owner).copied().unwrap_or(false)
    }
}

/// Counters for one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub considered: usize,
    pub culled_distance: usize,
    pub culled_plane: usize,
    pub culled_back: usize,
    pub culled_bounds: usize,
    pub drawn: usize,
    pub swaps: usize,
}

/// Outcome of projecting one triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Visible([ScreenPoint; 3]),
    /// At least one corner is not strictly in front of the render plane
    BehindPlane,
    /// No corner lands within the padded render plane bounds
    OutOfBounds,
}

/// Geometry shared by every triangle in a frame
struct View<'a> {
    camera: &'a Camera,
    plane: Plane,
    center: Vec3,
    pixels_per_unit: f64,
    half_w: f64,
    half_h: f64,
    width: usize,
    height: usize,
}

impl<'a> View<'a> {
    fn new(camera: &'a Camera, width: usize, height: usize) -> Self {
        let plane_w = camera.render_plane_width;
        Self {
            camera,
            plane: camera.render_plane(),
            center: camera.center_point(),
            pixels_per_unit: width as f64 / plane_w,
            half_w: plane_w * 0.5,
            half_h: plane_w * (height as f64 / width as f64) * 0.5,
            width,
            height,
        }
    }

    /// Returns the pixel and whether the corner is within the padded bounds
    fn project_corner(&self, corner: Vec3) -> Option<(ScreenPoint, bool)> {
        let cam = self.camera.position;
        let hit = self.plane.intersect_ray(cam, corner - cam)?;
        let local = self.camera.to_local(hit - self.center);
        let in_bounds = local.x.abs() < self.half_w * BOUNDS_MARGIN
            && local.y.abs() < self.half_h * BOUNDS_MARGIN;
        let x = ((self.width / 2) as f64 + local.x * self.pixels_per_unit) as i32;
        let y = ((self.height / 2) as f64 - local.y * self.pixels_per_unit) as i32;
        Some(((x, y), in_bounds))
    }

    fn project(&self, tri: &Triangle) -> Projection {
        let corners = tri.corners();
        if corners.iter().any(|&p| self.plane.signed_distance(p) <= 0.0) {
            return Projection::BehindPlane;
        }
        let mut screen = [(0, 0); 3];
        let mut any_in_bounds = false;
        for (slot, &corner) in screen.iter_mut().zip(corners.iter()) {
            match self.project_corner(corner) {
                Some((point, in_bounds)) => {
                    *slot = point;
                    any_in_bounds |= in_bounds;
                }
                None => return Projection::BehindPlane,
            }
        }
        if any_in_bounds {
            Projection::Visible(screen)
        } else {
            Projection::OutOfBounds
        }
    }
}

/// Projects a single triangle for a framebuffer of the given size
pub fn project_triangle(tri: &Triangle, camera: &Camera, width: usize, height: usize) -> Projection {
    View::new(camera, width, height).project(tri)
}

/// Painter's-algorithm renderer.
///
/// The draw order survives between frames, so the bubble passes only have
/// to repair the small changes caused by one tick of motion.
pub struct Renderer {
    pub settings: RenderSettings,
    order: Vec<usize>,
    distances: Vec<f64>,
}

impl Renderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            order: Vec::new(),
            distances: Vec::new(),
        }
    }

    /// Current draw order as indices into the last snapshot
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn toggle_fog(&mut self) -> bool {
        self.settings.fog_enabled = !self.settings.fog_enabled;
        self.settings.fog_enabled
    }

    /// Bubble passes until nothing moves: a shaded triangle swaps with its
    /// successor whenever it is strictly closer to the camera. Unshaded
    /// triangles are never compared against their successor.
    /// Returns the number of swaps.
    pub fn order_triangles(&mut self, snapshot: &FrameSnapshot, camera: &Camera) -> usize {
        let n = snapshot.triangles.len();
        if self.order.len() != n {
            self.order = (0..n).collect();
        }
        self.distances.clear();
        self.distances.extend(
            snapshot
                .triangles
                .iter()
                .map(|t| t.centroid().distance(camera.position)),
        );

        let mut swaps = 0;
        let mut changed = true;
        while changed {
            changed = false;
            for i in 0..n.saturating_sub(1) {
                let cur = self.order[i];
                let next = self.order[i + 1];
                if !snapshot.is_shaded(&snapshot.triangles[cur]) {
                    continue;
                }
                if self.distances[cur] < self.distances[next] {
                    self.order.swap(i, i + 1);
                    changed = true;
                    swaps += 1;
                }
            }
        }
        swaps
    }

    /// Color actually written for a triangle at `distance` from the camera
    pub fn triangle_color(&self, tri: &Triangle, shaded: bool, distance: f64) -> Color {
        if !shaded {
            return tri.color;
        }
        match (self.settings.fog_enabled, &self.settings.fog) {
            (true, Some(fog)) => fog.blend(tri.lit_color, distance),
            _ => tri.lit_color,
        }
    }

    pub fn render(&mut self, fb: &mut Framebuffer, snapshot: &FrameSnapshot, camera: &Camera) -> FrameStats {
        fb.clear(self.settings.background);

        let mut stats = FrameStats {
            swaps: self.order_triangles(snapshot, camera),
            ..Default::default()
        };
        if fb.width == 0 || fb.height == 0 {
            return stats;
        }

        let view = View::new(camera, fb.width, fb.height);
        for &idx in &self.order {
            let tri = &snapshot.triangles[idx];
            stats.considered += 1;

            let distance = self.distances[idx];
            if distance >= camera.view_distance {
                stats.culled_distance += 1;
                continue;
            }

            if self.settings.cull_back_faces
                && snapshot.culls_back_faces(tri)
                && tri.normal().dot(tri.centroid() - camera.position) >= 0.0
            {
                stats.culled_back += 1;
                continue;
            }

            match view.project(tri) {
                Projection::Visible([p1, p2, p3]) => {
                    let color = self.triangle_color(tri, snapshot.is_shaded(tri), distance);
                    fb.fill_triangle(p1, p2, p3, color);
                    stats.drawn += 1;
                }
                Projection::BehindPlane => stats.culled_plane += 1,
                Projection::OutOfBounds => stats.culled_bounds += 1,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Color = Color::new(10, 20, 30);

    fn camera() -> Camera {
        let mut cam = Camera::new(Vec3::ZERO, 1000.0, 1.0, 90.0);
        // tan(45deg) is not exact in floating point
        cam.render_plane_width = 2.0;
        cam
    }

    fn snapshot(tris: Vec<Triangle>, shaded: Vec<bool>) -> FrameSnapshot {
        let backface_cull = vec![false; shaded.len()];
        FrameSnapshot { triangles: tris, shaded, backface_cull }
    }

    fn facing_tri(z: f64, size: f64, owner: usize) -> Triangle {
        let mut t = Triangle::new(
            Vec3::new(-size, -size, z),
            Vec3::new(size, -size, z),
            Vec3::new(0.0, size, z),
            Color::new(200, 0, 0),
        );
        t.owner = owner;
        t
    }

    fn renderer() -> Renderer {
        Renderer::new(RenderSettings { background: BG, ..Default::default() })
    }

    #[test]
    fn test_fill_triangle_covers_interior() {
        let mut fb = Framebuffer::new(20, 20);
        fb.fill_triangle((2, 2), (18, 2), (2, 18), Color::WHITE);
        assert_eq!(fb.get(4, 4), Some(Color::WHITE.to_u32()));
        assert_eq!(fb.get(17, 17), Some(0));
    }

    #[test]
    fn test_flat_triangle_draws_nothing() {
        let mut fb = Framebuffer::new(10, 10);
        fb.fill_triangle((0, 5), (5, 5), (9, 5), Color::WHITE);
        assert!(fb.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_vertical_edges_do_not_divide_by_zero() {
        let mut fb = Framebuffer::new(10, 10);
        fb.fill_triangle((3, 0), (3, 9), (8, 9), Color::WHITE);
        assert_eq!(fb.get(3, 5), Some(Color::WHITE.to_u32()));
        assert_eq!(fb.get(2, 5), Some(0));
    }

    #[test]
    fn test_offscreen_coordinates_are_clamped() {
        let mut fb = Framebuffer::new(8, 8);
        fb.fill_triangle((-500, -400), (900, -300), (4, 800), Color::WHITE);
        assert!(fb.pixels.iter().any(|&p| p == Color::WHITE.to_u32()));
        fb.draw_hline(-10, 100, 50, 7);
        fb.draw_hline(-10, 100, -1, 7);
    }

    #[test]
    fn test_fog_endpoints_and_monotonic() {
        let fog = FogSettings { start: 100.0, full: 200.0, color: Color::new(200, 220, 255) };
        let lit = Color::new(40, 240, 0);
        assert_eq!(fog.blend(lit, 100.0), lit);
        assert_eq!(fog.blend(lit, 200.0), fog.color);
        assert_eq!(fog.blend(lit, 5000.0), fog.color);

        let mut prev = lit;
        for step in 0..=100 {
            let c = fog.blend(lit, 100.0 + step as f64);
            assert!(c.r >= prev.r, "red moves toward fog");
            assert!(c.g <= prev.g, "green moves toward fog");
            assert!(c.b >= prev.b, "blue moves toward fog");
            prev = c;
        }
    }

    #[test]
    fn test_fog_is_quadratic() {
        let fog = FogSettings { start: 0.0, full: 100.0, color: Color::new(200, 200, 200) };
        let c = fog.blend(Color::BLACK, 50.0);
        assert_eq!(c, Color::new(50, 50, 50));
    }

    #[test]
    fn test_ordering_is_farthest_first() {
        let tris = vec![
            facing_tri(10.0, 1.0, 0),
            facing_tri(50.0, 1.0, 0),
            facing_tri(30.0, 1.0, 0),
            facing_tri(80.0, 1.0, 0),
            facing_tri(20.0, 1.0, 0),
        ];
        let snap = snapshot(tris, vec![true]);
        let cam = camera();
        let mut r = renderer();
        let swaps = r.order_triangles(&snap, &cam);
        assert!(swaps > 0);
        let order = r.order().to_vec();
        for pair in order.windows(2) {
            let d0 = snap.triangles[pair[0]].centroid().distance(cam.position);
            let d1 = snap.triangles[pair[1]].centroid().distance(cam.position);
            assert!(d0 >= d1);
        }
        // Already sorted: the next frame needs no swaps
        assert_eq!(r.order_triangles(&snap, &cam), 0);
    }

    #[test]
    fn test_unshaded_triangles_are_not_compared() {
        let tris = vec![facing_tri(10.0, 1.0, 1), facing_tri(50.0, 1.0, 0)];
        let snap = snapshot(tris, vec![true, false]);
        let mut r = renderer();
        assert_eq!(r.order_triangles(&snap, &camera()), 0);
        assert_eq!(r.order(), &[0, 1]);
    }

    #[test]
    fn test_triangle_behind_camera_writes_nothing() {
        let snap = snapshot(vec![facing_tri(-20.0, 5.0, 0)], vec![true]);
        let mut fb = Framebuffer::new(64, 48);
        let stats = renderer().render(&mut fb, &snap, &camera());
        assert_eq!(stats.culled_plane, 1);
        assert_eq!(stats.drawn, 0);
        assert!(fb.pixels.iter().all(|&p| p == BG.to_u32()));
    }

    #[test]
    fn test_straddling_triangle_is_skipped_whole() {
        let mut t = facing_tri(20.0, 5.0, 0);
        t.c = Vec3::new(0.0, 5.0, 0.5);
        let cam = camera();
        assert_eq!(project_triangle(&t, &cam, 64, 48), Projection::BehindPlane);
    }

    #[test]
    fn test_far_triangle_is_distance_culled() {
        let snap = snapshot(vec![facing_tri(2000.0, 500.0, 0)], vec![true]);
        let mut fb = Framebuffer::new(64, 48);
        let stats = renderer().render(&mut fb, &snap, &camera());
        assert_eq!(stats.culled_distance, 1);
    }

    #[test]
    fn test_projection_centers_and_flips_rows() {
        let cam = camera();
        // Render plane is 2 units wide at z = 1, so 64 px wide -> 32 px per unit
        let t = Triangle::new(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(5.0, 0.0, 10.0),
            Vec3::new(0.0, 5.0, 10.0),
            Color::WHITE,
        );
        match project_triangle(&t, &cam, 64, 48) {
            Projection::Visible([a, b, c]) => {
                assert_eq!(a, (32, 24));
                assert_eq!(b, (48, 24));
                assert_eq!(c, (32, 8));
            }
            other => panic!("expected visible, got {:?}", other),
        }
    }

    #[test]
    fn test_unshaded_uses_base_color_and_shaded_uses_fog() {
        let mut r = renderer();
        r.settings.fog = Some(FogSettings { start: 10.0, full: 20.0, color: Color::WHITE });
        r.settings.fog_enabled = true;
        let mut t = facing_tri(30.0, 1.0, 0);
        t.lit_color = Color::new(1, 2, 3);
        assert_eq!(r.triangle_color(&t, false, 30.0), t.color);
        assert_eq!(r.triangle_color(&t, true, 30.0), Color::WHITE);
        assert!(!r.toggle_fog());
        assert_eq!(r.triangle_color(&t, true, 30.0), t.lit_color);
    }

    #[test]
    fn test_render_draws_visible_triangle() {
        let snap = snapshot(vec![facing_tri(10.0, 3.0, 0)], vec![false]);
        let mut fb = Framebuffer::new(64, 48);
        let stats = renderer().render(&mut fb, &snap, &camera());
        assert_eq!(stats.drawn, 1);
        assert_eq!(fb.get(32, 24), Some(Color::new(200, 0, 0).to_u32()));
    }

    // The test camera's render plane spans |x| < 1 and |y| < 0.75 at z = 1,
    // so a corner at (x, y, 10) lands at (x / 10, y / 10) in plane units.
    fn tri_at(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Triangle {
        Triangle::new(
            Vec3::new(a.0, a.1, 10.0),
            Vec3::new(b.0, b.1, 10.0),
            Vec3::new(c.0, c.1, 10.0),
            Color::WHITE,
        )
    }

    #[test]
    fn test_all_corners_off_plane_is_out_of_bounds() {
        let cam = camera();
        let t = tri_at((50.0, 0.0), (60.0, 0.0), (50.0, 5.0));
        assert_eq!(project_triangle(&t, &cam, 64, 48), Projection::OutOfBounds);

        let snap = snapshot(vec![t], vec![true]);
        let mut fb = Framebuffer::new(64, 48);
        let stats = renderer().render(&mut fb, &snap, &cam);
        assert_eq!(stats.culled_bounds, 1);
        assert_eq!(stats.drawn, 0);
        assert!(fb.pixels.iter().all(|&p| p == BG.to_u32()));
    }

    #[test]
    fn test_one_corner_on_plane_keeps_triangle() {
        let t = tri_at((0.0, 0.0), (60.0, 0.0), (50.0, 5.0));
        match project_triangle(&t, &camera(), 64, 48) {
            Projection::Visible([a, b, _]) => {
                assert_eq!(a, (32, 24));
                assert_eq!(b, (224, 24));
            }
            other => panic!("expected visible, got {:?}", other),
        }
    }

    #[test]
    fn test_bounds_margin_is_twenty_percent() {
        let cam = camera();
        // 1.1x the half-width is inside the padded bounds, 1.3x is not
        let inside = tri_at((11.0, 0.0), (30.0, 0.0), (30.0, 5.0));
        assert!(matches!(project_triangle(&inside, &cam, 64, 48), Projection::Visible(_)));
        let outside = tri_at((13.0, 0.0), (30.0, 0.0), (30.0, 5.0));
        assert_eq!(project_triangle(&outside, &cam, 64, 48), Projection::OutOfBounds);
        // Vertically the half-height is 0.75, padded to 0.9
        let low = tri_at((0.0, -8.5), (30.0, 0.0), (40.0, 0.0));
        assert!(matches!(project_triangle(&low, &cam, 64, 48), Projection::Visible(_)));
        let lower = tri_at((0.0, -9.5), (30.0, 0.0), (40.0, 0.0));
        assert_eq!(project_triangle(&lower, &cam, 64, 48), Projection::OutOfBounds);
    }

    fn backface_stats(cull_setting: bool, cull_entity: bool) -> FrameStats {
        // facing_tri winds so its normal points along +z, away from the camera
        let away = facing_tri(10.0, 3.0, 0);
        let toward = Triangle::new(away.a, away.c, away.b, away.color);
        let snap = FrameSnapshot {
            triangles: vec![away, toward],
            shaded: vec![false],
            backface_cull: vec![cull_entity],
        };
        let mut r = renderer();
        r.settings.cull_back_faces = cull_setting;
        let mut fb = Framebuffer::new(64, 48);
        r.render(&mut fb, &snap, &camera())
    }

    #[test]
    fn test_back_faces_culled_when_both_flags_set() {
        let stats = backface_stats(true, true);
        assert_eq!(stats.culled_back, 1);
        assert_eq!(stats.drawn, 1);
    }

    #[test]
    fn test_back_faces_drawn_unless_both_flags_set() {
        for (setting, entity) in [(false, true), (true, false), (false, false)] {
            let stats = backface_stats(setting, entity);
            assert_eq!(stats.culled_back, 0);
            assert_eq!(stats.drawn, 2);
        }
    }
}
