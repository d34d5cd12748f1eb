//! Presents the fixed-size composite on the window surface, letterboxed to
//! keep its aspect ratio.

use wgpu::util::DeviceExt;

use crate::{camera::Viewport, data_structures::texture::Texture};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LetterboxUniform {
    scale: [f32; 4],
}

impl From<&Viewport> for LetterboxUniform {
    fn from(viewport: &Viewport) -> Self {
        let [x, y] = viewport.letterbox_scale();
        Self {
            scale: [x, y, 0.0, 0.0],
        }
    }
}

pub struct BlitPass {
    pipeline: wgpu::RenderPipeline,
    source: wgpu::BindGroup,
    letterbox: wgpu::BindGroup,
    buffer: wgpu::Buffer,
    current: LetterboxUniform,
}

impl BlitPass {
    pub fn new(
        device: &wgpu::Device,
        composite: &Texture,
        sampler: &wgpu::Sampler,
        surface_format: wgpu::TextureFormat,
        viewport: &Viewport,
    ) -> Self {
        let texture_layout = super::texture_layout(device, 1, "blit_texture_layout");
        let uniform_layout = super::uniform_layout(device, "blit_uniform_layout");
        let current = LetterboxUniform::from(viewport);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Letterbox Buffer"),
            contents: bytemuck::bytes_of(&current),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let pipeline = super::mk_fullscreen_pipeline(
            device,
            "Blit Pipeline",
            &[&texture_layout, &uniform_layout],
            wgpu::ShaderModuleDescriptor {
                label: Some("Blit Shader"),
                source: wgpu::ShaderSource::Wgsl(
                    concat!(include_str!("fullscreen.wgsl"), include_str!("blit.wgsl")).into(),
                ),
            },
            surface_format,
            Some(wgpu::BlendState::REPLACE),
        );

        Self {
            pipeline,
            source: super::texture_bind_group(
                device,
                &texture_layout,
                &[&composite.view],
                sampler,
                "blit_source_bind_group",
            ),
            letterbox: super::uniform_bind_group(
                device,
                &uniform_layout,
                &buffer,
                "blit_letterbox_bind_group",
            ),
            buffer,
            current,
        }
    }

    /// Uploads the letterbox for `viewport` if it changed.
    pub fn update_viewport(&mut self, queue: &wgpu::Queue, viewport: &Viewport) {
        let next = LetterboxUniform::from(viewport);
        if next != self.current {
            queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&next));
            self.current = next;
        }
    }

    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        clear: wgpu::Color,
    ) {
        super::draw_fullscreen(
            encoder,
            "Blit Pass",
            target,
            wgpu::LoadOp::Clear(clear),
            &self.pipeline,
            &[&self.source, &self.letterbox],
        );
    }
}
