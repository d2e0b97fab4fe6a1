use std::path::{Path, PathBuf};

use texture_scene::{
    SceneConfig,
    camera::PerspectiveCamera,
    frame::{FrameScheduler, Renderer},
    resources::{MapSlot, TextureLibrary, TextureSource, material_sources, resolve},
    scene::Scene,
    viewport::Sizes,
};

/// Stands in for the window: counts frame requests instead of redrawing.
#[derive(Debug, Default)]
pub struct ManualStepper {
    requests: u32,
}

impl ManualStepper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> u32 {
        self.requests
    }
}

impl FrameScheduler for ManualStepper {
    fn request_next_frame(&mut self) {
        self.requests += 1;
    }
}

/// What a slot sampled during one frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Sampled {
    Image(String),
    Solid([u8; 4]),
}

impl From<TextureSource<'_>> for Sampled {
    fn from(source: TextureSource<'_>) -> Self {
        match source {
            TextureSource::Image(loaded) => Sampled::Image(loaded.url.clone()),
            TextureSource::Solid(texel) => Sampled::Solid(texel),
        }
    }
}

/// Background and first material maps of one frame, maps in bind order.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameTextures {
    pub background: Sampled,
    pub maps: [Sampled; 5],
}

/// Records what the render loop hands to the renderer.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    sizes: Vec<Sizes>,
    renders: u32,
    visible_meshes: Vec<usize>,
    library: TextureLibrary,
    frames: Vec<FrameTextures>,
    fail: bool,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `render` call fails, as a lost surface would.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Samples from `library`, resolving slots the way the GPU renderer does.
    pub fn with_library(library: TextureLibrary) -> Self {
        Self {
            library,
            ..Self::default()
        }
    }

    /// Where settled textures land between frames.
    pub fn library_mut(&mut self) -> &mut TextureLibrary {
        &mut self.library
    }

    pub fn frames(&self) -> &[FrameTextures] {
        &self.frames
    }

    pub fn sizes(&self) -> &[Sizes] {
        &self.sizes
    }

    pub fn renders(&self) -> u32 {
        self.renders
    }

    pub fn visible_meshes(&self) -> &[usize] {
        &self.visible_meshes
    }
}

impl Renderer for RecordingRenderer {
    fn set_size(&mut self, sizes: Sizes) {
        self.sizes.push(sizes);
    }

    fn render(&mut self, scene: &Scene, _camera: &PerspectiveCamera) -> anyhow::Result<()> {
        self.renders += 1;
        self.visible_meshes
            .push(scene.meshes().iter().filter(|m| m.visible).count());
        if let Some(material) = scene.materials().first() {
            self.frames.push(FrameTextures {
                background: resolve(&self.library, scene.background, MapSlot::Environment).into(),
                maps: material_sources(material, &self.library).map(Sampled::from),
            });
        }
        if self.fail {
            anyhow::bail!("surface lost");
        }
        Ok(())
    }
}

/// Default scene with coarse geometry.
pub fn small_config() -> SceneConfig {
    SceneConfig::default().with_resolution(4)
}

/// A fresh directory under the system temp dir, unique per test name.
pub fn fixture_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "texture-scene-{}-{}",
        name,
        std::process::id()
    ));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).unwrap();
    }
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Writes a small solid-colour image, creating parent directories. The
/// format follows the extension; RGB works for both png and jpeg.
pub fn write_image(root: &Path, file: &str, rgb: [u8; 3]) {
    let path = root.join(file);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = image::RgbImage::from_pixel(4, 2, image::Rgb(rgb));
    img.save(&path).unwrap();
}
