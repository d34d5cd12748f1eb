//! Area lights as the cell shader sees them.

use wgpu::util::DeviceExt;

use crate::puzzle::assembler::AimedLight;

pub const MAX_LIGHTS: usize = 8;

/// One rectangular panel. Every field is a `vec4` so the array needs no
/// extra padding in WGSL.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightRaw {
    /// xyz position, w unused.
    position: [f32; 4],
    /// Linear rgb, w intensity.
    colour: [f32; 4],
    /// Unit vector along the panel width, w half width.
    right: [f32; 4],
    /// Unit vector along the panel height, w half height.
    up: [f32; 4],
    /// Emission direction, w unused.
    forward: [f32; 4],
}

impl From<&AimedLight> for LightRaw {
    fn from(light: &AimedLight) -> Self {
        let [r, g, b] = light.colour;
        Self {
            position: [light.position.x, light.position.y, light.position.z, 1.0],
            colour: [r, g, b, light.intensity],
            right: [light.right.x, light.right.y, light.right.z, light.half_size[0]],
            up: [light.up.x, light.up.y, light.up.z, light.half_size[1]],
            forward: [light.forward.x, light.forward.y, light.forward.z, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    lights: [LightRaw; MAX_LIGHTS],
    /// x is the number of populated entries.
    count: [u32; 4],
}

impl LightUniform {
    /// Lights beyond [`MAX_LIGHTS`] are dropped with a warning.
    pub fn from_lights(lights: &[AimedLight]) -> Self {
        if lights.len() > MAX_LIGHTS {
            log::warn!(
                "{} active lights, only the first {} are used",
                lights.len(),
                MAX_LIGHTS
            );
        }
        let mut raw = [LightRaw::default(); MAX_LIGHTS];
        let used = lights.len().min(MAX_LIGHTS);
        for (slot, light) in raw.iter_mut().zip(lights) {
            *slot = LightRaw::from(light);
        }
        Self {
            lights: raw,
            count: [used as u32, 0, 0, 0],
        }
    }

    pub fn count(&self) -> u32 {
        self.count[0]
    }
}

pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, lights: &[AimedLight]) -> Self {
        let uniform = LightUniform::from_lights(lights);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = super::uniform_layout(device, "light_bind_group_layout");
        let bind_group =
            super::uniform_bind_group(device, &bind_group_layout, &buffer, "light_bind_group");
        log::debug!("uploaded {} area lights", uniform.count());

        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}
