//! Scene description: meshes, the shared material and the environment.
//!
//! The scene is plain CPU data. Meshes refer to materials by [`MaterialId`]
//! so one material can be shared by several meshes and edited in one place;
//! the renderer turns the description into GPU resources.
//!
//! - `geometry` generates plane, sphere and torus vertex data
//! - `material` holds the physical material parameters
//! - `transform` holds per-mesh position, rotation and scale

pub mod geometry;
pub mod material;
pub mod transform;

use cgmath::Vector3;

use crate::{
    config::{AmbientLight, SceneConfig},
    resources::TextureKey,
    scene::{
        geometry::Geometry,
        material::{PhysicalMaterial, Side},
        transform::Transform,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(usize);

#[derive(Clone, Debug)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: MaterialId,
    pub transform: Transform,
    pub visible: bool,
}

impl Mesh {
    pub fn new(geometry: Geometry, material: MaterialId) -> Self {
        Self {
            geometry,
            material,
            transform: Transform::default(),
            visible: true,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub background: Option<TextureKey>,
    pub environment: Option<TextureKey>,
    pub ambient_light: Option<AmbientLight>,
    meshes: Vec<Mesh>,
    materials: Vec<PhysicalMaterial>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_material(&mut self, material: PhysicalMaterial) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn add(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn materials(&self) -> &[PhysicalMaterial] {
        &self.materials
    }

    /// Meshes paired with their ids, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (MeshId, &Mesh)> {
        self.meshes.iter().enumerate().map(|(i, m)| (MeshId(i), m))
    }

    pub fn mesh(&self, id: MeshId) -> &Mesh {
        &self.meshes[id.0]
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> &mut Mesh {
        &mut self.meshes[id.0]
    }

    pub fn material(&self, id: MaterialId) -> &PhysicalMaterial {
        &self.materials[id.0]
    }

    pub fn material_mut(&mut self, id: MaterialId) -> &mut PhysicalMaterial {
        &mut self.materials[id.0]
    }

    pub fn material_index(&self, id: MaterialId) -> usize {
        id.0
    }
}

/// Ids of the objects the render loop and debug panel touch after construction.
#[derive(Clone, Copy, Debug)]
pub struct SceneHandles {
    pub plane: MeshId,
    pub sphere: MeshId,
    pub torus: MeshId,
    pub material: MaterialId,
}

/// Builds the showcase: three primitives sharing one textured metallic material.
pub fn build_scene(config: &SceneConfig) -> (Scene, SceneHandles) {
    let mut scene = Scene::new();
    scene.background = Some(TextureKey::Environment);
    scene.environment = Some(TextureKey::Environment);
    scene.ambient_light = config.ambient_light;

    let mut material = PhysicalMaterial {
        metalness: config.material.metalness,
        roughness: config.material.roughness,
        clearcoat: config.material.clearcoat.unwrap_or(0.0),
        side: Side::Double,
        map: Some(TextureKey::Color),
        ao_map: Some(TextureKey::AmbientOcclusion),
        displacement_map: Some(TextureKey::Height),
        displacement_scale: config.material.displacement_scale,
        normal_map: Some(TextureKey::Normal),
        roughness_map: config
            .material
            .use_roughness_map
            .then_some(TextureKey::Roughness),
        ..Default::default()
    };
    material.set_ao_map_intensity(config.material.ao_map_intensity);
    let material = scene.add_material(material);

    let plane = scene.add(Mesh::new(config.plane, material));

    let mut sphere_mesh = Mesh::new(config.sphere, material);
    sphere_mesh.transform.position = Vector3::new(config.sphere_offset, 0.0, 0.0);
    let sphere = scene.add(sphere_mesh);

    let mut torus_mesh = Mesh::new(config.torus, material);
    torus_mesh.transform.position = Vector3::new(config.torus_offset, 0.0, 0.0);
    let torus = scene.add(torus_mesh);

    log::debug!("scene built with {} meshes", scene.meshes().len());
    (
        scene,
        SceneHandles {
            plane,
            sphere,
            torus,
            material,
        },
    )
}
