//! Asset loading.
//!
//! Images are requested concurrently and decoded on arrival. A
//! [`LoadingManager`] observes the batch and reports start, progress, error and
//! completion. Each request is identified by a [`TextureKey`] which the
//! material keeps referencing whether or not the load succeeded.

pub mod manager;
pub mod slot;
pub mod texture;

pub use manager::{LoadEvent, LoadingManager};
pub use slot::{MapSlot, TextureSource, material_sources, resolve};
pub use texture::{
    ColorSpace, LoadedTexture, Mapping, TextureLibrary, TextureLoader, TextureOutcome,
    TextureRequest, TextureSettings, Wrap, asset_path,
};

use crate::config::SceneConfig;

/// Names the texture slots of the showcase scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKey {
    Environment,
    Color,
    Height,
    Normal,
    AmbientOcclusion,
    Roughness,
}

impl TextureKey {
    pub const ALL: [TextureKey; 6] = [
        TextureKey::Environment,
        TextureKey::Color,
        TextureKey::Height,
        TextureKey::Normal,
        TextureKey::AmbientOcclusion,
        TextureKey::Roughness,
    ];
}

/// The six images the scene asks for. The roughness map is always fetched,
/// even when the material leaves it unbound.
pub fn texture_requests(config: &SceneConfig) -> Vec<TextureRequest> {
    let assets = &config.assets;
    let linear = TextureSettings::default();
    vec![
        TextureRequest {
            key: TextureKey::Environment,
            url: assets.environment.clone(),
            settings: TextureSettings {
                color_space: ColorSpace::Srgb,
                // the panorama wraps around horizontally
                wrap: Wrap::Repeat,
                mapping: Mapping::EquirectangularReflection,
                ..linear
            },
        },
        TextureRequest {
            key: TextureKey::Color,
            url: assets.color.clone(),
            settings: TextureSettings {
                color_space: ColorSpace::Srgb,
                wrap: Wrap::Repeat,
                repeat: config.material.color_repeat,
                ..linear
            },
        },
        TextureRequest {
            key: TextureKey::Height,
            url: assets.height.clone(),
            settings: linear,
        },
        TextureRequest {
            key: TextureKey::Normal,
            url: assets.normal.clone(),
            settings: linear,
        },
        TextureRequest {
            key: TextureKey::AmbientOcclusion,
            url: assets.ambient_occlusion.clone(),
            settings: linear,
        },
        TextureRequest {
            key: TextureKey::Roughness,
            url: assets.roughness.clone(),
            settings: linear,
        },
    ]
}

/// Loads every texture of the scene described by `config`, handing each one
/// to `on_settled` as soon as it is decoded or has failed.
pub async fn stream_scene_textures(
    config: &SceneConfig,
    manager: &LoadingManager,
    on_settled: impl FnMut(TextureOutcome),
) {
    let loader = TextureLoader::new(&config.asset_root, manager);
    loader.load_each(texture_requests(config), on_settled).await
}

/// Loads every texture of the scene described by `config`.
pub async fn load_scene_textures(
    config: &SceneConfig,
    manager: &LoadingManager,
) -> TextureLibrary {
    let loader = TextureLoader::new(&config.asset_root, manager);
    loader.load_all(texture_requests(config)).await
}
