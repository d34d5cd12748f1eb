//! Mip-chain bloom and the final composite.
//!
//! 1. Prefilter: the anti-aliased image is luminance-masked into a
//!    half-resolution texture (mip 0).
//! 2. Downsample: each mip is filtered into one half its size.
//! 3. Upsample: from the coarsest level up, each level becomes
//!    `mix(down[i], tent(up[i + 1]), radius)`.
//! 4. Composite: `scene + bloom * intensity` into the output format.
//!
//! With `mipmap_blur` off, steps 2 and 3 are skipped and mip 0 is the bloom.
//! Every bind group is created once here; targets never change size.

use wgpu::util::DeviceExt;

use crate::{config::BloomConfig, data_structures::texture::Texture};

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PrefilterUniform {
    threshold: f32,
    smoothing: f32,
    _padding: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct UpsampleUniform {
    radius: f32,
    _padding: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CompositeUniform {
    intensity: f32,
    _padding: [f32; 3],
}

/// Sizes of the bloom mips for a `size` source: half resolution first, then
/// halving until `levels` are reached or a side would drop below 2 pixels.
pub fn mip_sizes(size: [u32; 2], levels: u32) -> Vec<[u32; 2]> {
    let mut sizes = Vec::with_capacity(levels as usize);
    let mut current = [(size[0] / 2).max(1), (size[1] / 2).max(1)];
    for _ in 0..levels.max(1) {
        sizes.push(current);
        if current[0] < 4 || current[1] < 4 {
            break;
        }
        current = [current[0] / 2, current[1] / 2];
    }
    sizes
}

fn shader(label: &'static str, body: &'static str) -> wgpu::ShaderModuleDescriptor<'static> {
    wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(
            format!("{}{}", include_str!("fullscreen.wgsl"), body).into(),
        ),
    }
}

pub struct BloomPass {
    prefilter_pipeline: wgpu::RenderPipeline,
    downsample_pipeline: wgpu::RenderPipeline,
    upsample_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,

    prefilter_buffer: wgpu::Buffer,
    upsample_buffer: wgpu::Buffer,
    composite_buffer: wgpu::Buffer,
    prefilter_uniform: wgpu::BindGroup,
    upsample_uniform: wgpu::BindGroup,
    composite_uniform: wgpu::BindGroup,

    down: Vec<Texture>,
    up: Vec<Texture>,
    prefilter_source: wgpu::BindGroup,
    /// `down_sources[i]` samples `down[i]` to produce `down[i + 1]`.
    down_sources: Vec<wgpu::BindGroup>,
    /// `up_sources[i]` samples `down[i]` and the next coarser level to
    /// produce `up[i]`.
    up_sources: Vec<wgpu::BindGroup>,
    composite_source: wgpu::BindGroup,
}

impl BloomPass {
    pub fn new(
        device: &wgpu::Device,
        scene: &Texture,
        sampler: &wgpu::Sampler,
        params: &BloomConfig,
    ) -> Self {
        let mut params = params.clone();
        params.sanitize();

        let single_layout = super::texture_layout(device, 1, "bloom_single_texture_layout");
        let pair_layout = super::texture_layout(device, 2, "bloom_texture_pair_layout");
        let uniform_layout = super::uniform_layout(device, "bloom_uniform_layout");

        let prefilter_pipeline = super::mk_fullscreen_pipeline(
            device,
            "Bloom Prefilter Pipeline",
            &[&single_layout, &uniform_layout],
            shader("Bloom Prefilter Shader", include_str!("bloom_prefilter.wgsl")),
            Texture::HDR_FORMAT,
            Some(wgpu::BlendState::REPLACE),
        );
        let downsample_pipeline = super::mk_fullscreen_pipeline(
            device,
            "Bloom Downsample Pipeline",
            &[&single_layout],
            shader("Bloom Downsample Shader", include_str!("bloom_downsample.wgsl")),
            Texture::HDR_FORMAT,
            Some(wgpu::BlendState::REPLACE),
        );
        let upsample_pipeline = super::mk_fullscreen_pipeline(
            device,
            "Bloom Upsample Pipeline",
            &[&pair_layout, &uniform_layout],
            shader("Bloom Upsample Shader", include_str!("bloom_upsample.wgsl")),
            Texture::HDR_FORMAT,
            Some(wgpu::BlendState::REPLACE),
        );
        let composite_pipeline = super::mk_fullscreen_pipeline(
            device,
            "Bloom Composite Pipeline",
            &[&pair_layout, &uniform_layout],
            shader("Bloom Composite Shader", include_str!("bloom_composite.wgsl")),
            Texture::OUTPUT_FORMAT,
            Some(wgpu::BlendState::REPLACE),
        );

        let uniform_buffer = |label: &str, contents: &[u8]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        };
        let prefilter_buffer = uniform_buffer(
            "Bloom Prefilter Uniform Buffer",
            bytemuck::bytes_of(&Self::prefilter_values(&params)),
        );
        let upsample_buffer = uniform_buffer(
            "Bloom Upsample Uniform Buffer",
            bytemuck::bytes_of(&Self::upsample_values(&params)),
        );
        let composite_buffer = uniform_buffer(
            "Bloom Composite Uniform Buffer",
            bytemuck::bytes_of(&Self::composite_values(&params)),
        );

        let levels = if params.mipmap_blur { params.levels } else { 1 };
        let sizes = mip_sizes(scene.size, levels);
        let down: Vec<Texture> = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| {
                Texture::create_render_target(
                    device,
                    *size,
                    Texture::HDR_FORMAT,
                    &format!("Bloom Down {}", i),
                )
            })
            .collect();
        // the coarsest level is its own upsampled result
        let up: Vec<Texture> = sizes
            .iter()
            .take(sizes.len().saturating_sub(1))
            .enumerate()
            .map(|(i, size)| {
                Texture::create_render_target(
                    device,
                    *size,
                    Texture::HDR_FORMAT,
                    &format!("Bloom Up {}", i),
                )
            })
            .collect();

        let prefilter_source = super::texture_bind_group(
            device,
            &single_layout,
            &[&scene.view],
            sampler,
            "bloom_prefilter_source",
        );
        let down_sources = down
            .iter()
            .take(down.len().saturating_sub(1))
            .map(|mip| {
                super::texture_bind_group(
                    device,
                    &single_layout,
                    &[&mip.view],
                    sampler,
                    "bloom_downsample_source",
                )
            })
            .collect();
        let up_sources = (0..up.len())
            .map(|i| {
                let coarser = up.get(i + 1).unwrap_or(&down[i + 1]);
                super::texture_bind_group(
                    device,
                    &pair_layout,
                    &[&down[i].view, &coarser.view],
                    sampler,
                    "bloom_upsample_source",
                )
            })
            .collect();
        let bloom = up.first().unwrap_or(&down[0]);
        let composite_source = super::texture_bind_group(
            device,
            &pair_layout,
            &[&scene.view, &bloom.view],
            sampler,
            "bloom_composite_source",
        );

        let uniform_group = |buffer: &wgpu::Buffer, label: &str| {
            super::uniform_bind_group(device, &uniform_layout, buffer, label)
        };
        let prefilter_uniform = uniform_group(&prefilter_buffer, "bloom_prefilter_uniform");
        let upsample_uniform = uniform_group(&upsample_buffer, "bloom_upsample_uniform");
        let composite_uniform = uniform_group(&composite_buffer, "bloom_composite_uniform");

        log::info!(
            "bloom: {} mip levels from {:?} down to {:?}",
            down.len(),
            sizes.first(),
            sizes.last()
        );

        Self {
            prefilter_pipeline,
            downsample_pipeline,
            upsample_pipeline,
            composite_pipeline,
            prefilter_buffer,
            upsample_buffer,
            composite_buffer,
            prefilter_uniform,
            upsample_uniform,
            composite_uniform,
            down,
            up,
            prefilter_source,
            down_sources,
            up_sources,
            composite_source,
        }
    }

    fn prefilter_values(params: &BloomConfig) -> PrefilterUniform {
        PrefilterUniform {
            threshold: params.luminance_threshold,
            smoothing: params.luminance_smoothing,
            _padding: [0.0; 2],
        }
    }

    fn upsample_values(params: &BloomConfig) -> UpsampleUniform {
        UpsampleUniform {
            radius: params.radius,
            _padding: [0.0; 3],
        }
    }

    fn composite_values(params: &BloomConfig) -> CompositeUniform {
        CompositeUniform {
            intensity: params.intensity,
            _padding: [0.0; 3],
        }
    }

    /// Updates threshold, smoothing, radius and intensity. The number of
    /// levels is fixed at construction.
    pub fn set_params(&mut self, queue: &wgpu::Queue, params: &BloomConfig) {
        let mut params = params.clone();
        params.sanitize();
        queue.write_buffer(
            &self.prefilter_buffer,
            0,
            bytemuck::bytes_of(&Self::prefilter_values(&params)),
        );
        queue.write_buffer(
            &self.upsample_buffer,
            0,
            bytemuck::bytes_of(&Self::upsample_values(&params)),
        );
        queue.write_buffer(
            &self.composite_buffer,
            0,
            bytemuck::bytes_of(&Self::composite_values(&params)),
        );
    }

    /// Records every bloom pass and the composite into `output`.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        let clear = wgpu::LoadOp::Clear(wgpu::Color::BLACK);

        super::draw_fullscreen(
            encoder,
            "Bloom Prefilter Pass",
            &self.down[0].view,
            clear,
            &self.prefilter_pipeline,
            &[&self.prefilter_source, &self.prefilter_uniform],
        );

        for (source, target) in self.down_sources.iter().zip(self.down.iter().skip(1)) {
            super::draw_fullscreen(
                encoder,
                "Bloom Downsample Pass",
                &target.view,
                clear,
                &self.downsample_pipeline,
                &[source],
            );
        }

        for (source, target) in self.up_sources.iter().zip(self.up.iter()).rev() {
            super::draw_fullscreen(
                encoder,
                "Bloom Upsample Pass",
                &target.view,
                clear,
                &self.upsample_pipeline,
                &[source, &self.upsample_uniform],
            );
        }

        super::draw_fullscreen(
            encoder,
            "Bloom Composite Pass",
            output,
            clear,
            &self.composite_pipeline,
            &[&self.composite_source, &self.composite_uniform],
        );
    }
}
