//! Domain errors.
//!
//! Everything that can go wrong while building or driving the puzzle on the CPU
//! side is a [`PuzzleError`]. GPU and window setup stay on `anyhow` and wrap
//! these where they bubble up.

use crate::data_structures::scene_graph::NodeId;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PuzzleError {
    #[error("corner radius {radius} must satisfy 0 <= r < {limit} (half the smaller face side)")]
    InvalidCornerRadius { radius: f32, limit: f32 },

    #[error("box dimensions must be finite and positive, got {width}x{height}x{depth}")]
    InvalidDimensions { width: f32, height: f32, depth: f32 },

    #[error("smoothness must be at least 1, got {0}")]
    InvalidSmoothness(u32),

    #[error("cubes per side must be in 1..={max}, got {got}")]
    InvalidOrder { got: usize, max: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("scene node {0:?} does not exist")]
    NodeNotFound(NodeId),

    #[error("scene node {0:?} has no layers to rotate")]
    NoLayers(NodeId),

    #[error("mount surface `{0}` was not found in the document")]
    MountSurfaceMissing(String),
}
