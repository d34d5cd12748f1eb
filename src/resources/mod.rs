/**
 * Everything the renderer needs that is generated rather than loaded: the
 * rounded-box geometry shared by all cells and its upload to the GPU.
 */
pub mod geometry;
pub mod mesh;

pub use geometry::{GeometryCache, MeshData, RoundedBox};
