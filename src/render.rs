//! wgpu implementation of [`Renderer`].
//!
//! [`GpuRenderer`] mirrors a [`Scene`] into GPU resources: one vertex/index
//! buffer set per mesh, one uniform and bind group per material and one
//! texture per loaded image. Per frame it only rewrites uniforms, so changes
//! made through the debug panel or the render loop show up on the next frame.
//!
//! Rendering starts before any image has arrived. Every slot without an image
//! samples a neutral 1x1 fallback; [`GpuRenderer::sync_textures`] uploads
//! images as they land in the [`TextureLibrary`] and rebinds whatever samples
//! them.

use std::{borrow::Cow, collections::HashMap, iter};

use image::GenericImageView;
use wgpu::util::DeviceExt;

use crate::{
    camera::{CameraUniform, PerspectiveCamera},
    context::Context,
    data_structures::{model::GpuMesh, texture::Texture},
    frame::Renderer,
    pipelines::{
        background::mk_background_pipeline,
        environment_layout,
        physical::{MaterialUniform, PhysicalPipelines, map_entries, material_layout},
        uniform_layout,
    },
    resources::{
        LoadedTexture, MapSlot, TextureKey, TextureLibrary, TextureSource, material_sources,
        resolve,
    },
    scene::{Scene, material::PhysicalMaterial},
    viewport::Sizes,
};

struct GpuMaterial {
    map_repeat: [f32; 2],
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct GpuObject {
    mesh: GpuMesh,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct GpuRenderer {
    ctx: Context,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    env_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    fallbacks: HashMap<MapSlot, Texture>,
    textures: HashMap<TextureKey, Texture>,
    background_bind_group: wgpu::BindGroup,
    environment_bind_group: wgpu::BindGroup,
    background_pipeline: wgpu::RenderPipeline,
    physical: PhysicalPipelines,
    materials: Vec<GpuMaterial>,
    objects: Vec<GpuObject>,
    clear_colour: wgpu::Color,
}

impl std::fmt::Debug for GpuRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuRenderer")
            .field("size", &self.ctx.size())
            .field("textures", &self.textures.keys().collect::<Vec<_>>())
            .field("materials", &self.materials.len())
            .field("objects", &self.objects.len())
            .finish()
    }
}

impl GpuRenderer {
    /// Builds every GPU resource of `scene`, binding whatever `library`
    /// already holds and fallbacks for the rest.
    pub fn new(ctx: Context, scene: &Scene, library: &TextureLibrary) -> Self {
        let device = &ctx.device;
        let queue = &ctx.queue;

        let fallbacks: HashMap<MapSlot, Texture> = MapSlot::ALL
            .into_iter()
            .map(|slot| {
                let label = format!("fallback {slot:?}");
                let texture = Texture::solid(
                    device,
                    queue,
                    slot.fallback_texel(),
                    slot.color_space(),
                    &label,
                );
                (slot, texture)
            })
            .collect();
        let textures = HashMap::new();

        let camera_layout = uniform_layout(device, "camera_bind_group_layout");
        let camera_uniform = CameraUniform::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let env_layout = environment_layout(device);
        let background_bind_group = env_bind_group(
            device,
            &env_layout,
            &fallbacks[&MapSlot::Environment],
            "background_bind_group",
        );
        let environment_bind_group = env_bind_group(
            device,
            &env_layout,
            &fallbacks[&MapSlot::Environment],
            "environment_bind_group",
        );

        let material_layout = material_layout(device);
        let materials = scene
            .materials()
            .iter()
            .enumerate()
            .map(|(i, material)| {
                let map_repeat = match material.map {
                    Some(key) => library.settings(key).repeat,
                    None => [1.0, 1.0],
                };
                let uniform = MaterialUniform::new(material, map_repeat, scene.ambient_light);
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Material {i} Buffer")),
                    contents: bytemuck::cast_slice(&[uniform]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let maps = MapSlot::MATERIAL.map(|slot| &fallbacks[&slot]);
                let bind_group = material_bind_group(device, &material_layout, &buffer, maps, i);
                GpuMaterial {
                    map_repeat,
                    buffer,
                    bind_group,
                }
            })
            .collect();

        let model_layout = uniform_layout(device, "model_bind_group_layout");
        let objects = scene
            .meshes()
            .iter()
            .map(|mesh| {
                let name = mesh.geometry.name();
                let gpu_mesh = GpuMesh::new(device, name, &mesh.geometry.build());
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{name} Transform Buffer")),
                    contents: bytemuck::cast_slice(&[mesh.transform.to_raw()]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &model_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                    label: Some(&format!("{name}_bind_group")),
                });
                GpuObject {
                    mesh: gpu_mesh,
                    buffer,
                    bind_group,
                }
            })
            .collect();

        let background_pipeline = mk_background_pipeline(
            device,
            ctx.config.format,
            Texture::DEPTH_FORMAT,
            &camera_layout,
            &env_layout,
        );
        let physical = PhysicalPipelines::new(
            device,
            ctx.config.format,
            Texture::DEPTH_FORMAT,
            &camera_layout,
            &env_layout,
            &material_layout,
            &model_layout,
        );

        let mut renderer = Self {
            ctx,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            env_layout,
            material_layout,
            fallbacks,
            textures,
            background_bind_group,
            environment_bind_group,
            background_pipeline,
            physical,
            materials,
            objects,
            clear_colour: wgpu::Color::BLACK,
        };
        renderer.sync_textures(scene, library);
        renderer
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Uploads images that arrived in `library` since the last call and
    /// rebinds the background, environment and materials that sample them.
    /// Returns the newly uploaded keys.
    pub fn sync_textures(&mut self, scene: &Scene, library: &TextureLibrary) -> Vec<TextureKey> {
        let arrived: Vec<TextureKey> = TextureKey::ALL
            .into_iter()
            .filter(|key| !self.textures.contains_key(key))
            .filter(|key| library.is_loaded(*key))
            .collect();
        for key in &arrived {
            if let Some(loaded) = library.get(*key) {
                let texture = self.upload(loaded);
                self.textures.insert(*key, texture);
                log::debug!("{:?} texture bound", key);
            }
        }
        if arrived.is_empty() {
            return arrived;
        }

        let samples = |key: Option<TextureKey>| key.is_some_and(|k| arrived.contains(&k));
        if samples(scene.background) {
            let source = resolve(library, scene.background, MapSlot::Environment);
            self.background_bind_group = env_bind_group(
                &self.ctx.device,
                &self.env_layout,
                pick(&self.textures, &self.fallbacks, MapSlot::Environment, source),
                "background_bind_group",
            );
        }
        if samples(scene.environment) {
            let source = resolve(library, scene.environment, MapSlot::Environment);
            self.environment_bind_group = env_bind_group(
                &self.ctx.device,
                &self.env_layout,
                pick(&self.textures, &self.fallbacks, MapSlot::Environment, source),
                "environment_bind_group",
            );
        }
        for (i, material) in scene.materials().iter().enumerate() {
            if !material.textures().any(|k| arrived.contains(&k)) {
                continue;
            }
            let Some(gpu) = self.materials.get(i) else {
                continue;
            };
            let bind_group = self.material_bind_group_for(material, library, &gpu.buffer, i);
            self.materials[i].bind_group = bind_group;
        }
        arrived
    }

    fn upload(&self, loaded: &LoadedTexture) -> Texture {
        let max_dimension = self.ctx.device.limits().max_texture_dimension_2d;
        let image = fit_to_limit(&loaded.image, max_dimension, &loaded.url);
        Texture::from_image(
            &self.ctx.device,
            &self.ctx.queue,
            &image,
            Some(loaded.url.as_str()),
            &loaded.settings,
        )
    }

    fn material_bind_group_for(
        &self,
        material: &PhysicalMaterial,
        library: &TextureLibrary,
        buffer: &wgpu::Buffer,
        index: usize,
    ) -> wgpu::BindGroup {
        let sources = material_sources(material, library);
        let maps: [&Texture; 5] = std::array::from_fn(|i| {
            pick(&self.textures, &self.fallbacks, MapSlot::MATERIAL[i], sources[i])
        });
        material_bind_group(&self.ctx.device, &self.material_layout, buffer, maps, index)
    }

    fn write_uniforms(&mut self, scene: &Scene, camera: &PerspectiveCamera) {
        self.camera_uniform.update_view_proj(camera);
        self.ctx.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
        for (material, gpu) in scene.materials().iter().zip(&self.materials) {
            let uniform = MaterialUniform::new(material, gpu.map_repeat, scene.ambient_light);
            self.ctx
                .queue
                .write_buffer(&gpu.buffer, 0, bytemuck::cast_slice(&[uniform]));
        }
        for (mesh, object) in scene.meshes().iter().zip(&self.objects) {
            self.ctx.queue.write_buffer(
                &object.buffer,
                0,
                bytemuck::cast_slice(&[mesh.transform.to_raw()]),
            );
        }
    }
}

impl Renderer for GpuRenderer {
    fn set_size(&mut self, sizes: Sizes) {
        if sizes != self.ctx.size() {
            self.ctx.resize(sizes);
        }
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> anyhow::Result<()> {
        self.write_uniforms(scene, camera);

        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            // Reconfigure the surface if it's lost or outdated and try again next frame
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                let size = self.ctx.size();
                self.ctx.resize(size);
                return Ok(());
            }
            e => anyhow::bail!("unable to acquire the next frame: {e:?}"),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            if scene.background.is_some() {
                render_pass.set_pipeline(&self.background_pipeline);
                render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
                render_pass.set_bind_group(1, &self.background_bind_group, &[]);
                render_pass.draw(0..3, 0..1);
            }

            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_bind_group(1, &self.environment_bind_group, &[]);
            for ((_, mesh), object) in scene.iter().zip(&self.objects) {
                if !mesh.visible {
                    continue;
                }
                let material: &PhysicalMaterial = scene.material(mesh.material);
                let gpu_material = &self.materials[scene.material_index(mesh.material)];
                render_pass.set_pipeline(self.physical.select(material));
                render_pass.set_bind_group(2, &gpu_material.bind_group, &[]);
                render_pass.set_bind_group(3, &object.bind_group, &[]);
                render_pass.set_vertex_buffer(0, object.mesh.vertex_buffer.slice(..));
                if material.wireframe {
                    render_pass.set_index_buffer(
                        object.mesh.wire_index_buffer.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    render_pass.draw_indexed(0..object.mesh.num_wire_elements, 0, 0..1);
                } else {
                    render_pass.set_index_buffer(
                        object.mesh.index_buffer.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    render_pass.draw_indexed(0..object.mesh.num_elements, 0, 0..1);
                }
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// GPU texture for a resolved source. Images that are not uploaded yet keep
/// the fallback.
fn pick<'a>(
    textures: &'a HashMap<TextureKey, Texture>,
    fallbacks: &'a HashMap<MapSlot, Texture>,
    slot: MapSlot,
    source: TextureSource<'_>,
) -> &'a Texture {
    match source {
        TextureSource::Image(loaded) => textures
            .get(&loaded.key)
            .unwrap_or_else(|| &fallbacks[&slot]),
        TextureSource::Solid(_) => &fallbacks[&slot],
    }
}

fn env_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
        label: Some(label),
    })
}

fn material_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    maps: [&Texture; 5],
    index: usize,
) -> wgpu::BindGroup {
    let mut entries = vec![wgpu::BindGroupEntry {
        binding: 0,
        resource: buffer.as_entire_binding(),
    }];
    entries.extend(map_entries(maps));
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &entries,
        label: Some(&format!("material_{index}_bind_group")),
    })
}

/// Downscales images the device cannot hold (WebGL caps textures at 2048 pixels).
fn fit_to_limit<'a>(
    image: &'a image::DynamicImage,
    max_dimension: u32,
    url: &str,
) -> Cow<'a, image::DynamicImage> {
    let (width, height) = image.dimensions();
    if width <= max_dimension && height <= max_dimension {
        return Cow::Borrowed(image);
    }
    log::warn!(
        "{url} is {width}x{height}, downscaling to fit {max_dimension} pixels"
    );
    Cow::Owned(image.resize(
        max_dimension,
        max_dimension,
        image::imageops::FilterType::Triangle,
    ))
}
