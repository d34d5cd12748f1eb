//! Frame composition.
//!
//! The [`Compositor`] owns every GPU resource of the fixed-size composite and
//! records one frame into a command encoder:
//!
//! 1. cells, one instanced draw into the HDR target with depth
//! 2. FXAA into a second HDR target
//! 3. bloom and the final composite into [`Texture::OUTPUT_FORMAT`]
//!
//! Presenting the result is separate: [`SurfaceFrame`] letterboxes it onto
//! the window surface, [`OffscreenFrame`] leaves it in the output texture
//! for readback.

use std::iter;

use crate::{
    camera::{CameraResources, Viewport},
    config::{BloomConfig, PuzzleConfig},
    context::Context,
    data_structures::{
        instance::InstanceRaw,
        model::{DrawModel, Mesh},
        scene_graph::SceneGraph,
        texture::{self, Texture},
    },
    frame::CompositeRenderer,
    pipelines::{
        basic::mk_cell_pipeline, blit::BlitPass, bloom::BloomPass, fxaa::FxaaPass,
        light::LightResources, material::MaterialResources,
    },
    puzzle::assembler::PuzzleScene,
    resources::mesh::upload_mesh,
};

pub struct Compositor {
    size: [u32; 2],
    clear_colour: wgpu::Color,

    camera: CameraResources,
    lights: LightResources,
    material: MaterialResources,
    cell_pipeline: wgpu::RenderPipeline,
    mesh: Mesh,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    instance_count: u32,

    hdr: Texture,
    depth: Texture,
    anti_aliased: Texture,
    output: Texture,
    fxaa: FxaaPass,
    bloom: BloomPass,
}

impl Compositor {
    pub fn new(device: &wgpu::Device, config: &PuzzleConfig, scene: &PuzzleScene) -> Self {
        let size = config.composite_size;
        let camera = CameraResources::new(device, config);
        let lights = LightResources::new(device, &scene.lights);
        let material = MaterialResources::new(device, &scene.material);
        let cell_pipeline = mk_cell_pipeline(
            device,
            &camera.bind_group_layout,
            &lights.bind_group_layout,
            &material.bind_group_layout,
        );
        let mesh = upload_mesh(device, "rounded cell", &scene.mesh);

        let instance_capacity = scene.cell_count().max(1);
        let instance_buffer = Self::create_instance_buffer(device, instance_capacity);

        let sampler = texture::create_linear_sampler(device, "composite_sampler");
        let hdr = Texture::create_render_target(device, size, Texture::HDR_FORMAT, "scene_hdr");
        let depth = Texture::create_depth_texture(device, size, "scene_depth");
        let anti_aliased =
            Texture::create_render_target(device, size, Texture::HDR_FORMAT, "scene_fxaa");
        let output =
            Texture::create_render_target(device, size, Texture::OUTPUT_FORMAT, "composite");
        let fxaa = FxaaPass::new(device, &hdr, &sampler);
        let bloom = BloomPass::new(device, &anti_aliased, &sampler, &config.bloom);

        log::info!(
            "compositor ready: {}x{} composite, {} cells",
            size[0],
            size[1],
            scene.cell_count()
        );

        Self {
            size,
            clear_colour: config.clear_colour,
            camera,
            lights,
            material,
            cell_pipeline,
            mesh,
            instance_buffer,
            instance_capacity,
            instance_count: 0,
            hdr,
            depth,
            anti_aliased,
            output,
            fxaa,
            bloom,
        }
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell Instance Buffer"),
            size: (capacity * std::mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    /// The composited image after the last [`Compositor::encode`].
    pub fn output(&self) -> &Texture {
        &self.output
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    pub fn set_bloom(&mut self, queue: &wgpu::Queue, params: &BloomConfig) {
        self.bloom.set_params(queue, params);
    }

    /// Uploads the cells' world transforms and records the full composite.
    /// World transforms must be current.
    pub fn encode(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        graph: &SceneGraph,
    ) {
        let raw: Vec<InstanceRaw> = graph
            .cell_world_transforms()
            .iter()
            .map(|instance| instance.to_raw())
            .collect();
        if raw.len() > self.instance_capacity {
            log::warn!(
                "cell count grew from {} to {}, reallocating instances",
                self.instance_capacity,
                raw.len()
            );
            self.instance_capacity = raw.len();
            self.instance_buffer = Self::create_instance_buffer(device, raw.len());
        }
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&raw));
        self.instance_count = raw.len() as u32;

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Cell Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.hdr.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if self.instance_count > 0 {
                render_pass.set_pipeline(&self.cell_pipeline);
                render_pass.draw_mesh_instanced(
                    &self.mesh,
                    &self.instance_buffer,
                    0..self.instance_count,
                    &[
                        &self.camera.bind_group,
                        &self.lights.bind_group,
                        &self.material.bind_group,
                    ],
                );
            }
        }

        self.fxaa.encode(encoder, &self.anti_aliased.view);
        self.bloom.encode(encoder, &self.output.view);
    }
}

/// Renders straight to the window: composite, letterbox, submit. The caller
/// presents the surface texture afterwards.
pub struct SurfaceFrame<'a> {
    pub ctx: &'a Context,
    pub compositor: &'a mut Compositor,
    pub blit: &'a mut BlitPass,
    pub viewport: &'a Viewport,
    pub target: &'a wgpu::TextureView,
    pub clear: wgpu::Color,
}

impl CompositeRenderer for SurfaceFrame<'_> {
    fn composite(&mut self, scene: &SceneGraph) -> anyhow::Result<()> {
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        self.compositor
            .encode(&self.ctx.device, &self.ctx.queue, &mut encoder, scene);
        self.blit.update_viewport(&self.ctx.queue, self.viewport);
        self.blit.encode(&mut encoder, self.target, self.clear);
        self.ctx.queue.submit(iter::once(encoder.finish()));
        Ok(())
    }
}

/// Renders the composite without a window; the image stays in
/// [`Compositor::output`].
pub struct OffscreenFrame<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub compositor: &'a mut Compositor,
}

impl CompositeRenderer for OffscreenFrame<'_> {
    fn composite(&mut self, scene: &SceneGraph) -> anyhow::Result<()> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Offscreen Encoder"),
            });
        self.compositor
            .encode(self.device, self.queue, &mut encoder, scene);
        self.queue.submit(iter::once(encoder.finish()));
        Ok(())
    }
}
