//! The physically based material shared by the showcase meshes.

use crate::resources::TextureKey;

/// Which faces of a mesh are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
    Double,
}

/// Metalness/roughness material with optional texture maps.
///
/// Texture fields hold keys rather than GPU textures: a key stays bound even
/// when its image failed to load, and the renderer substitutes a neutral
/// fallback in that case.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicalMaterial {
    pub metalness: f32,
    pub roughness: f32,
    pub clearcoat: f32,
    pub side: Side,
    pub wireframe: bool,
    pub map: Option<TextureKey>,
    pub normal_map: Option<TextureKey>,
    pub ao_map: Option<TextureKey>,
    pub displacement_map: Option<TextureKey>,
    pub displacement_scale: f32,
    pub roughness_map: Option<TextureKey>,
    pub(crate) ao_map_intensity: f32,
}

impl Default for PhysicalMaterial {
    fn default() -> Self {
        Self {
            metalness: 0.0,
            roughness: 1.0,
            clearcoat: 0.0,
            side: Side::Front,
            wireframe: false,
            map: None,
            normal_map: None,
            ao_map: None,
            displacement_map: None,
            displacement_scale: 1.0,
            roughness_map: None,
            ao_map_intensity: 1.0,
        }
    }
}

impl PhysicalMaterial {
    pub fn ao_map_intensity(&self) -> f32 {
        self.ao_map_intensity
    }

    /// Sets how strongly the ambient occlusion map darkens the surface, clamped to `[0, 1]`.
    pub fn set_ao_map_intensity(&mut self, intensity: f32) {
        self.ao_map_intensity = if intensity.is_nan() {
            0.0
        } else {
            intensity.clamp(0.0, 1.0)
        };
    }

    /// Every texture this material samples.
    pub fn textures(&self) -> impl Iterator<Item = TextureKey> + '_ {
        [
            self.map,
            self.normal_map,
            self.ao_map,
            self.displacement_map,
            self.roughness_map,
        ]
        .into_iter()
        .flatten()
    }
}
