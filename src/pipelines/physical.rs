use crate::{
    config::AmbientLight,
    data_structures::{
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::{DepthMode, mk_render_pipeline, texture_layout_entries, uniform_layout_entry},
    scene::material::{PhysicalMaterial, Side},
};

/// Binding of the first texture in the material group. Each map takes a
/// texture slot followed by its sampler, in this order: color, normal,
/// ambient occlusion, displacement, roughness.
const FIRST_MAP_BINDING: u32 = 1;
pub const MAP_COUNT: u32 = 5;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    map_repeat: [f32; 2],
    metalness: f32,
    roughness: f32,
    ao_map_intensity: f32,
    displacement_scale: f32,
    clearcoat: f32,
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: f32,
    // rgb premultiplied by intensity
    ambient: [f32; 4],
}

impl MaterialUniform {
    pub fn new(
        material: &PhysicalMaterial,
        map_repeat: [f32; 2],
        ambient: Option<AmbientLight>,
    ) -> Self {
        let ambient = ambient
            .map(|light| {
                let [r, g, b] = light.color;
                [r * light.intensity, g * light.intensity, b * light.intensity, 1.0]
            })
            .unwrap_or([0.0; 4]);
        Self {
            map_repeat,
            metalness: material.metalness,
            roughness: material.roughness,
            ao_map_intensity: material.ao_map_intensity(),
            displacement_scale: if material.displacement_map.is_some() {
                material.displacement_scale
            } else {
                0.0
            },
            clearcoat: material.clearcoat,
            _padding: 0.0,
            ambient,
        }
    }
}

pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let stages = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
    let mut entries = vec![uniform_layout_entry(0)];
    for i in 0..MAP_COUNT {
        entries.extend(texture_layout_entries(FIRST_MAP_BINDING + 2 * i, stages));
    }
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &entries,
        label: Some("material_bind_group_layout"),
    })
}

/// Bind group entries for the material maps, in layout order.
pub fn map_entries<'a>(maps: [&'a Texture; MAP_COUNT as usize]) -> Vec<wgpu::BindGroupEntry<'a>> {
    maps.into_iter()
        .enumerate()
        .flat_map(|(i, texture)| {
            let binding = FIRST_MAP_BINDING + 2 * i as u32;
            [
                wgpu::BindGroupEntry {
                    binding,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: binding + 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ]
        })
        .collect()
}

/// Filled variants per [`Side`] plus a line list variant for wireframe.
#[derive(Debug)]
pub struct PhysicalPipelines {
    front: wgpu::RenderPipeline,
    back: wgpu::RenderPipeline,
    double: wgpu::RenderPipeline,
    wireframe: wgpu::RenderPipeline,
}

impl PhysicalPipelines {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        environment_bind_group_layout: &wgpu::BindGroupLayout,
        material_bind_group_layout: &wgpu::BindGroupLayout,
        model_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Physical Pipeline Layout"),
            bind_group_layouts: &[
                Some(camera_bind_group_layout),
                Some(environment_bind_group_layout),
                Some(material_bind_group_layout),
                Some(model_bind_group_layout),
            ],
            immediate_size: 0,
        });
        let mk = |topology, cull_mode, label| {
            let shader = wgpu::ShaderModuleDescriptor {
                label: Some("Physical Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("physical.wgsl").into()),
            };
            mk_render_pipeline(
                device,
                &layout,
                color_format,
                depth_format,
                DepthMode::Opaque,
                &[ModelVertex::desc()],
                wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                shader,
                label,
            )
        };
        Self {
            front: mk(
                wgpu::PrimitiveTopology::TriangleList,
                Some(wgpu::Face::Back),
                "Physical Pipeline (front)",
            ),
            back: mk(
                wgpu::PrimitiveTopology::TriangleList,
                Some(wgpu::Face::Front),
                "Physical Pipeline (back)",
            ),
            double: mk(
                wgpu::PrimitiveTopology::TriangleList,
                None,
                "Physical Pipeline (double)",
            ),
            // PolygonMode::Line is unavailable on WebGL, so edges are drawn as lines
            wireframe: mk(
                wgpu::PrimitiveTopology::LineList,
                None,
                "Physical Pipeline (wireframe)",
            ),
        }
    }

    pub fn select(&self, material: &PhysicalMaterial) -> &wgpu::RenderPipeline {
        if material.wireframe {
            return &self.wireframe;
        }
        match material.side {
            Side::Front => &self.front,
            Side::Back => &self.back,
            Side::Double => &self.double,
        }
    }
}
