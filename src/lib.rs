//! puzzle-cube
//!
//! An N×N×N puzzle cube that scrambles itself. Cells are rounded boxes
//! sharing one generated mesh; layers of cells turn in an endless chain of
//! eased, randomly chosen moves while the whole cube spins slowly and can be
//! dragged around with the pointer. Frames are rendered through an FXAA and
//! bloom composite, natively or in a browser canvas.
//!
//! High-level modules
//! - `animation`: easing, the timer queue and rotation tweens
//! - `camera`: camera, projection, uniforms and the presentation viewport
//! - `config`: every tunable with its default
//! - `context`: the window surface, device and queue
//! - `data_structures`: node arena, transforms, meshes and render targets
//! - `flow`: event loop and window glue
//! - `frame`: the per-frame spin, tween and composite sequence
//! - `input`: input events and listener bindings
//! - `pipelines`: the cell pipeline and the post-processing passes
//! - `puzzle`: scene assembly, move scheduling and drag
//! - `render`: the compositor that records a full frame
//! - `resources`: rounded-box geometry and its upload
//!

pub mod animation;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod frame;
pub mod input;
pub mod pipelines;
pub mod puzzle;
pub mod render;
pub mod resources;

pub use config::PuzzleConfig;
pub use error::PuzzleError;
pub use flow::run;
pub use frame::{CompositeRenderer, FrameLoop, FrameReport, FrameStage};
pub use puzzle::{InputOutcome, PuzzleContext};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() -> Result<(), wasm_bindgen::JsValue> {
    run(PuzzleConfig::default()).map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{:#}", e)))
}
