//! Core data types of the puzzle.
//!
//! - `instance` holds per-node transforms and their packed GPU form
//! - `model` contains the vertex layout, uploaded meshes and the draw helper
//! - `scene_graph` is the node arena for the cube hierarchy
//! - `texture` wraps render targets and the depth buffer

pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
