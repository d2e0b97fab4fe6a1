//! The application context shared by the resize handler and the render loop.

use cgmath::Point3;

use crate::{
    camera::PerspectiveCamera,
    config::SceneConfig,
    controls::OrbitControls,
    panel::DebugPanel,
    scene::{Scene, SceneHandles, build_scene},
    viewport::Sizes,
};

/// Everything that lives for the whole run: scene, camera, controls, panel and viewport size.
#[derive(Debug)]
pub struct AppContext {
    pub scene: Scene,
    pub handles: SceneHandles,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub panel: DebugPanel,
    pub sizes: Sizes,
    pub rotation_step: f32,
}

impl AppContext {
    pub fn new(config: &SceneConfig, sizes: Sizes) -> Self {
        let (scene, handles) = build_scene(config);

        let camera_config = &config.camera;
        let mut camera = PerspectiveCamera::new(
            cgmath::Deg(camera_config.fov_degrees),
            sizes.aspect(),
            camera_config.near,
            camera_config.far,
        );
        camera.position = camera_config.position.into();
        let target: Point3<f32> = camera_config.target.into();
        camera.look_at(target);

        let controls = OrbitControls::new(target).with_damping(camera_config.damping_factor);
        let panel = DebugPanel::for_scene(&handles);

        Self {
            scene,
            handles,
            camera,
            controls,
            panel,
            sizes,
            rotation_step: config.rotation_step,
        }
    }

    /// Window resize handler: updates the camera projection and the cached size.
    ///
    /// Zero sized reports (minimized windows) are ignored. Returns whether
    /// anything changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let sizes = Sizes::new(width, height);
        if sizes.is_empty() || sizes == self.sizes {
            return false;
        }
        self.camera.aspect = sizes.aspect();
        self.camera.update_projection_matrix();
        self.sizes = sizes;
        log::debug!("viewport resized to {}x{}", width, height);
        true
    }

    /// Fixed per-frame rotation of the showcase meshes.
    pub fn animate(&mut self) {
        let step = self.rotation_step;
        let SceneHandles {
            plane,
            sphere,
            torus,
            ..
        } = self.handles;

        self.scene.mesh_mut(sphere).transform.rotation.x -= step;
        self.scene.mesh_mut(torus).transform.rotation.x -= step;
        self.scene.mesh_mut(plane).transform.rotation.x -= step;

        self.scene.mesh_mut(torus).transform.rotation.y += step;
        self.scene.mesh_mut(plane).transform.rotation.y += step;
    }
}
