//! What a shader slot samples: a decoded image or a neutral solid colour.

use crate::{
    resources::{ColorSpace, LoadedTexture, TextureKey, TextureLibrary},
    scene::material::PhysicalMaterial,
};

/// A texture binding point of the shaders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapSlot {
    Color,
    Normal,
    AmbientOcclusion,
    Displacement,
    Roughness,
    Environment,
}

impl MapSlot {
    /// Material slots in bind group order.
    pub const MATERIAL: [MapSlot; 5] = [
        MapSlot::Color,
        MapSlot::Normal,
        MapSlot::AmbientOcclusion,
        MapSlot::Displacement,
        MapSlot::Roughness,
    ];

    pub const ALL: [MapSlot; 6] = [
        MapSlot::Color,
        MapSlot::Normal,
        MapSlot::AmbientOcclusion,
        MapSlot::Displacement,
        MapSlot::Roughness,
        MapSlot::Environment,
    ];

    /// The texel sampled while the slot has no image. Each value leaves the
    /// shading term it feeds unchanged: white albedo, occlusion and
    /// roughness, zero height, an unperturbed normal.
    pub fn fallback_texel(self) -> [u8; 4] {
        match self {
            MapSlot::Color | MapSlot::AmbientOcclusion | MapSlot::Roughness => [255; 4],
            MapSlot::Normal => [127, 127, 255, 255],
            MapSlot::Displacement => [0, 0, 0, 255],
            MapSlot::Environment => [128, 128, 128, 255],
        }
    }

    pub fn color_space(self) -> ColorSpace {
        match self {
            MapSlot::Color | MapSlot::Environment => ColorSpace::Srgb,
            _ => ColorSpace::Linear,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextureSource<'a> {
    Image(&'a LoadedTexture),
    Solid([u8; 4]),
}

/// Picks what `slot` samples for `key`: the image once it has loaded,
/// otherwise the slot's fallback. Unbound, pending and failed keys all fall
/// back.
pub fn resolve(
    library: &TextureLibrary,
    key: Option<TextureKey>,
    slot: MapSlot,
) -> TextureSource<'_> {
    match key.and_then(|k| library.get(k)) {
        Some(loaded) => TextureSource::Image(loaded),
        None => TextureSource::Solid(slot.fallback_texel()),
    }
}

/// Sources of every material slot, in [`MapSlot::MATERIAL`] order.
pub fn material_sources<'a>(
    material: &PhysicalMaterial,
    library: &'a TextureLibrary,
) -> [TextureSource<'a>; 5] {
    let keys = [
        material.map,
        material.normal_map,
        material.ao_map,
        material.displacement_map,
        material.roughness_map,
    ];
    std::array::from_fn(|i| resolve(library, keys[i], MapSlot::MATERIAL[i]))
}
