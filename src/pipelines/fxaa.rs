//! Fast approximate anti-aliasing over the HDR scene image.

use wgpu::util::DeviceExt;

use crate::data_structures::texture::Texture;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct FxaaUniform {
    /// xy: 1 / source size in pixels.
    texel_size: [f32; 4],
}

pub struct FxaaPass {
    pipeline: wgpu::RenderPipeline,
    source: wgpu::BindGroup,
    uniform: wgpu::BindGroup,
}

impl FxaaPass {
    /// Reads `source`, writes an image of the same format and size.
    pub fn new(device: &wgpu::Device, source: &Texture, sampler: &wgpu::Sampler) -> Self {
        let texture_layout = super::texture_layout(device, 1, "fxaa_texture_layout");
        let uniform_layout = super::uniform_layout(device, "fxaa_uniform_layout");

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("FXAA Uniform Buffer"),
            contents: bytemuck::cast_slice(&[FxaaUniform {
                texel_size: [
                    1.0 / source.size[0] as f32,
                    1.0 / source.size[1] as f32,
                    0.0,
                    0.0,
                ],
            }]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let pipeline = super::mk_fullscreen_pipeline(
            device,
            "FXAA Pipeline",
            &[&texture_layout, &uniform_layout],
            wgpu::ShaderModuleDescriptor {
                label: Some("FXAA Shader"),
                source: wgpu::ShaderSource::Wgsl(
                    concat!(include_str!("fullscreen.wgsl"), include_str!("fxaa.wgsl")).into(),
                ),
            },
            Texture::HDR_FORMAT,
            Some(wgpu::BlendState::REPLACE),
        );

        Self {
            pipeline,
            source: super::texture_bind_group(
                device,
                &texture_layout,
                &[&source.view],
                sampler,
                "fxaa_source_bind_group",
            ),
            uniform: super::uniform_bind_group(
                device,
                &uniform_layout,
                &buffer,
                "fxaa_uniform_bind_group",
            ),
        }
    }

    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        super::draw_fullscreen(
            encoder,
            "FXAA Pass",
            target,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            &self.pipeline,
            &[&self.source, &self.uniform],
        );
    }
}
