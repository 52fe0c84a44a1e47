//! Simulator configuration loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable config files. Every
//! field has a default, so a config file only needs the values it changes.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::flight::{AirplaneParams, PhysicsParams};
use crate::rasterizer::{Camera, Color, EulerAngle, FogSettings, Lighting, OrbitController, RenderSettings, Vec3, HEIGHT, WIDTH};
use super::entity::GameObject;
use super::mesh::{ground_grid, load_obj};
use super::scene::Scene;

/// Error type for config loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: usize,
    pub height: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Skyraster".to_string(),
            width: WIDTH,
            height: HEIGHT,
        }
    }
}

/// Tick periods in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub controls_ms: f64,
    pub physics_ms: f64,
    pub render_ms: f64,
    /// Upper bound on ticks run back-to-back after a stall
    pub max_catch_up: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            controls_ms: 5.0,
            physics_ms: 10.0,
            render_ms: 16.0,
            max_catch_up: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub view_distance: f64,
    pub plane_distance: f64,
    pub fov: f64,
    /// Follow the airplane with the orbit controller
    pub follow: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -1000.0),
            view_distance: 6000.0,
            plane_distance: 10.0,
            fov: 60.0,
            follow: true,
        }
    }
}

impl CameraConfig {
    pub fn build(&self) -> Camera {
        Camera::new(self.position, self.view_distance, self.plane_distance, self.fov)
    }
}

/// A mesh-backed scene entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectConfig {
    /// Defaults to the mesh file stem
    pub name: Option<String>,
    pub mesh: PathBuf,
    pub color: Color,
    pub position: Vec3,
    pub orientation: EulerAngle,
    pub scale: f64,
    pub shading: bool,
    pub backface_cull: bool,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            name: None,
            mesh: PathBuf::new(),
            color: Color::new(100, 100, 100),
            position: Vec3::ZERO,
            orientation: EulerAngle::ZERO,
            scale: 1.0,
            shading: true,
            backface_cull: true,
        }
    }
}

impl ObjectConfig {
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.mesh
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "object".to_string())
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AirplaneConfig {
    pub object: ObjectConfig,
    pub params: AirplaneParams,
    pub physics: PhysicsParams,
}

impl Default for AirplaneConfig {
    fn default() -> Self {
        Self {
            object: ObjectConfig {
                name: Some("Airplane".to_string()),
                mesh: PathBuf::from("plane_body.obj"),
                orientation: EulerAngle::new(0.0, std::f64::consts::FRAC_PI_2, 0.0),
                ..Default::default()
            },
            params: AirplaneParams::default(),
            physics: PhysicsParams::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub half_size: f64,
    pub cells: usize,
    pub color_a: Color,
    pub color_b: Color,
    pub shading: bool,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            half_size: 20000.0,
            cells: 40,
            color_a: Color::new(90, 140, 70),
            color_b: Color::new(110, 160, 80),
            shading: true,
        }
    }
}

/// Key names as macroquad `KeyCode` variant names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub throttle_up: String,
    pub throttle_down: String,
    pub pitch_up: String,
    pub pitch_down: String,
    pub roll_left: String,
    pub roll_right: String,
    pub yaw_left: String,
    pub yaw_right: String,
    pub brakes: String,
    pub toggle_fog: String,
    pub screenshot: String,
    /// Step the first extra scene object by one debug move
    pub nudge_forward: String,
    pub nudge_backward: String,
    pub nudge_left: String,
    pub nudge_right: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            throttle_up: "LeftShift".to_string(),
            throttle_down: "LeftControl".to_string(),
            pitch_up: "S".to_string(),
            pitch_down: "W".to_string(),
            roll_left: "A".to_string(),
            roll_right: "D".to_string(),
            yaw_left: "Q".to_string(),
            yaw_right: "E".to_string(),
            brakes: "B".to_string(),
            toggle_fog: "F".to_string(),
            screenshot: "F12".to_string(),
            nudge_forward: "Up".to_string(),
            nudge_backward: "Down".to_string(),
            nudge_left: "Left".to_string(),
            nudge_right: "Right".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Directory mesh paths are resolved against
    pub assets_dir: PathBuf,
    pub window: WindowConfig,
    pub timing: TimingConfig,
    pub camera: CameraConfig,
    pub orbit: OrbitController,
    pub lighting: Lighting,
    pub sky_color: Color,
    pub fog: Option<FogSettings>,
    pub cull_back_faces: bool,
    pub airplane: AirplaneConfig,
    pub objects: Vec<ObjectConfig>,
    pub ground: Option<GroundConfig>,
    pub keys: KeyBindings,
}

impl Default for SimConfig {
    fn default() -> Self {
        let sky = Color::new(200, 220, 255);
        Self {
            assets_dir: PathBuf::from("assets/models"),
            window: WindowConfig::default(),
            timing: TimingConfig::default(),
            camera: CameraConfig::default(),
            orbit: OrbitController::new(1000.0),
            lighting: Lighting::default(),
            sky_color: sky,
            fog: Some(FogSettings { start: 3000.0, full: 6000.0, color: sky }),
            cull_back_faces: false,
            airplane: AirplaneConfig::default(),
            objects: Vec::new(),
            ground: Some(GroundConfig::default()),
            keys: KeyBindings::default(),
        }
    }
}

/// Scene built from a config, with the index of the flown entity if it loaded
pub struct LoadedScene {
    pub scene: Scene,
    pub airplane: Option<usize>,
    /// Indices of the loaded `objects` entries, in config order
    pub props: Vec<usize>,
}

impl SimConfig {
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            background: self.sky_color,
            fog: self.fog,
            fog_enabled: self.fog.is_some(),
            cull_back_faces: self.cull_back_faces,
        }
    }

    fn load_object(&self, cfg: &ObjectConfig) -> Option<GameObject> {
        let name = cfg.display_name();
        let path = self.assets_dir.join(&cfg.mesh);
        match load_obj(&path) {
            Ok(mesh) => {
                let mut obj = GameObject::from_mesh(&name, &mesh, cfg.color, cfg.position, cfg.orientation, cfg.scale);
                obj.shading = cfg.shading;
                obj.backface_cull = cfg.backface_cull;
                Some(obj)
            }
            Err(e) => {
                log::error!("failed to load {:?} from {}: {}", name, path.display(), e);
                None
            }
        }
    }

    /// Load every entity. A mesh that fails to load is reported and left
    /// out; the rest of the scene still loads.
    pub fn build_scene(&self) -> LoadedScene {
        let mut scene = Scene::new(self.lighting);

        if let Some(ground) = &self.ground {
            let tris = ground_grid(
                ground.half_size,
                ground.cells,
                self.airplane.physics.ground_level,
                ground.color_a,
                ground.color_b,
            );
            let mut obj = GameObject::from_colored("ground", tris, ground.color_a);
            obj.shading = ground.shading;
            obj.backface_cull = false;
            scene.add_object(obj);
        }

        let props = self
            .objects
            .iter()
            .filter_map(|cfg| self.load_object(cfg))
            .map(|obj| scene.add_object(obj))
            .collect();

        let airplane = self
            .load_object(&self.airplane.object)
            .map(|obj| scene.add_object(obj));

        log::info!("scene ready: {} triangles", scene.triangle_count());
        LoadedScene { scene, airplane, props }
    }
}

/// Load a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SimConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Load a config from a RON string
pub fn load_config_from_str(s: &str) -> Result<SimConfig, ConfigError> {
    Ok(ron::from_str(s)?)
}

/// Save a config to a RON file
pub fn save_config<P: AsRef<Path>>(config: &SimConfig, path: P) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}
