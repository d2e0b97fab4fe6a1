//! Scene configuration.
//!
//! [`SceneConfig`] gathers every constant the showcase scene is built from:
//! asset locations, geometry resolution, material parameters, camera setup and
//! the per-frame animation step. The defaults reproduce the demo; the optional
//! material features (clearcoat, roughness map, ambient light) are off unless
//! switched on through the `with_*` builders.

use std::path::PathBuf;

use crate::scene::geometry::Geometry;

/// Native builds read next to the binary; the web build serves assets from
/// the site root.
#[cfg(not(target_arch = "wasm32"))]
pub const DEFAULT_ASSET_ROOT: &str = "assets";
#[cfg(target_arch = "wasm32")]
pub const DEFAULT_ASSET_ROOT: &str = "";

/// Directory that holds the grass texture set, relative to the asset root.
const GRASS_DIR: &str = "textures/Stylized_Grass_003_SD";

/// Relative paths of every image the scene requests.
#[derive(Clone, Debug)]
pub struct AssetPaths {
    pub environment: String,
    pub color: String,
    pub height: String,
    pub normal: String,
    pub ambient_occlusion: String,
    pub roughness: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            environment: "jodhpurEnv.jpg".to_string(),
            color: format!("{GRASS_DIR}/Stylized_Grass_003_basecolor.jpg"),
            height: format!("{GRASS_DIR}/Stylized_Grass_003_height.png"),
            normal: format!("{GRASS_DIR}/Stylized_Grass_003_normal.jpg"),
            ambient_occlusion: format!("{GRASS_DIR}/Stylized_Grass_003_ambientOcclusion.jpg"),
            roughness: format!("{GRASS_DIR}/Stylized_Grass_003_roughness.jpg"),
        }
    }
}

/// Scalar parameters of the shared physical material.
#[derive(Clone, Debug)]
pub struct MaterialConfig {
    pub metalness: f32,
    pub roughness: f32,
    pub ao_map_intensity: f32,
    pub displacement_scale: f32,
    /// How often the color map tiles across the uv range.
    pub color_repeat: [f32; 2],
    /// `None` leaves the clearcoat layer off.
    pub clearcoat: Option<f32>,
    pub use_roughness_map: bool,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            metalness: 1.0,
            roughness: 0.1,
            ao_map_intensity: 0.5,
            displacement_scale: 0.01,
            color_repeat: [3.0, 3.0],
            clearcoat: None,
            use_roughness_map: false,
        }
    }
}

/// Uniform light added on top of the environment lighting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            intensity: 2.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub damping_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 2000.0,
            position: [-1.25, 0.0, 0.0],
            target: [0.0, 0.0, 0.0],
            damping_factor: 0.05,
        }
    }
}

/// Everything the showcase scene is assembled from.
#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub title: String,
    /// Root directory (native) or url prefix (web) the asset paths are resolved against.
    pub asset_root: PathBuf,
    pub assets: AssetPaths,
    pub plane: Geometry,
    pub sphere: Geometry,
    pub torus: Geometry,
    pub sphere_offset: f32,
    pub torus_offset: f32,
    pub material: MaterialConfig,
    pub ambient_light: Option<AmbientLight>,
    pub camera: CameraConfig,
    /// Radians added to (or subtracted from) the mesh rotations every frame.
    pub rotation_step: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            title: "texture-scene".to_string(),
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            assets: AssetPaths::default(),
            plane: Geometry::Plane {
                width: 1.0,
                height: 1.0,
                width_segments: 200,
                height_segments: 200,
            },
            sphere: Geometry::Sphere {
                radius: 0.5,
                width_segments: 200,
                height_segments: 200,
            },
            torus: Geometry::Torus {
                radius: 0.35,
                tube: 0.15,
                radial_segments: 200,
                tubular_segments: 200,
            },
            sphere_offset: -1.5,
            torus_offset: 1.5,
            material: MaterialConfig::default(),
            ambient_light: None,
            camera: CameraConfig::default(),
            rotation_step: 0.003,
        }
    }
}

impl SceneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    pub fn with_assets(mut self, assets: AssetPaths) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_clearcoat(mut self, clearcoat: f32) -> Self {
        self.material.clearcoat = Some(clearcoat.clamp(0.0, 1.0));
        self
    }

    pub fn with_roughness_map(mut self, enabled: bool) -> Self {
        self.material.use_roughness_map = enabled;
        self
    }

    pub fn with_ambient_light(mut self, light: AmbientLight) -> Self {
        self.ambient_light = Some(light);
        self
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    /// Lower segment counts, mostly useful to keep tests fast.
    pub fn with_resolution(mut self, segments: u32) -> Self {
        self.plane = self.plane.with_segments(segments);
        self.sphere = self.sphere.with_segments(segments);
        self.torus = self.torus.with_segments(segments);
        self
    }
}
