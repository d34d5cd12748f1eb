use wgpu::util::DeviceExt;

use crate::config::{MaterialConfig, srgb_hex_to_linear};

/// Physically based parameters shared by every cell.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// Linear rgb, w unused.
    base_colour: [f32; 4],
    /// x metalness, y roughness.
    params: [f32; 4],
}

impl From<&MaterialConfig> for MaterialUniform {
    fn from(material: &MaterialConfig) -> Self {
        let [r, g, b] = srgb_hex_to_linear(material.colour);
        Self {
            base_colour: [r, g, b, 1.0],
            params: [
                material.metalness.clamp(0.0, 1.0),
                material.roughness.clamp(0.0, 1.0),
                0.0,
                0.0,
            ],
        }
    }
}

impl MaterialUniform {
    pub fn base_colour(&self) -> [f32; 3] {
        [self.base_colour[0], self.base_colour[1], self.base_colour[2]]
    }

    pub fn metalness(&self) -> f32 {
        self.params[0]
    }

    pub fn roughness(&self) -> f32 {
        self.params[1]
    }
}

pub struct MaterialResources {
    pub uniform: MaterialUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl MaterialResources {
    pub fn new(device: &wgpu::Device, material: &MaterialConfig) -> Self {
        let uniform = MaterialUniform::from(material);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = super::uniform_layout(device, "material_bind_group_layout");
        let bind_group =
            super::uniform_bind_group(device, &bind_group_layout, &buffer, "material_bind_group");

        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}
