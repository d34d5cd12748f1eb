use wgpu::util::DeviceExt;

use crate::{data_structures::model, resources::geometry::MeshData};

/**
 * Uploads generated geometry as a vertex/index buffer pair. Called once per
 * distinct mesh; cells reuse the result through instancing.
 */
pub fn upload_mesh(device: &wgpu::Device, name: &str, data: &MeshData) -> model::Mesh {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{} Vertex Buffer", name)),
        contents: bytemuck::cast_slice(&data.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{} Index Buffer", name)),
        contents: bytemuck::cast_slice(&data.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    log::info!(
        "uploaded mesh {}: {} vertices, {} indices",
        name,
        data.vertices.len(),
        data.indices.len()
    );

    model::Mesh {
        name: name.to_string(),
        vertex_buffer,
        index_buffer,
        num_elements: data.indices.len() as u32,
    }
}
