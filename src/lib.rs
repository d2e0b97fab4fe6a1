//! texture-scene
//!
//! A textured, physically based showcase scene for native windows and the
//! web: a plane, a sphere and a torus share one metallic material whose color,
//! normal, ambient occlusion, height and roughness maps come from image files,
//! lit by an equirectangular environment that also serves as the background.
//! The meshes rotate every frame, orbit controls move the camera and a small
//! debug panel toggles visibility, wireframe and occlusion strength.
//!
//! High-level modules
//! - `config`: scene parameters and optional material features
//! - `resources`: texture loading with progress reporting
//! - `scene`: geometry, material and the scene description
//! - `camera`, `controls`, `viewport`: perspective camera, orbit controls and window size
//! - `panel`: debug controls bound to scene properties
//! - `state`, `frame`: application context and the render loop
//! - `context`, `render`, `pipelines`, `data_structures`: wgpu backend
//! - `flow`: the winit event loop tying it together
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod flow;
pub mod frame;
pub mod panel;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod state;
pub mod viewport;

pub use config::SceneConfig;
pub use flow::run;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    run(SceneConfig::default()).map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
