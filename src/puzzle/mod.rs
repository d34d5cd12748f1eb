//! The puzzle itself, independent of any GPU.
//!
//! [`PuzzleContext`] is the one object that owns the animated state: the scene
//! (with the orientation the drag writes to), the tween engine, the layer-move
//! scheduler, the drag controller and the presentation viewport. The frame
//! loop and the window glue only ever talk to it.

pub mod assembler;
pub mod drag;
pub mod random;
pub mod scheduler;

use cgmath::Quaternion;

use crate::{
    animation::tween::TweenEngine,
    camera::Viewport,
    config::PuzzleConfig,
    error::PuzzleError,
    input::{InputBindings, InputEvent},
    resources::geometry::GeometryCache,
};

use assembler::{PuzzleScene, SceneAssembler};
use drag::DragController;
use random::{RandomSource, SplitMix64};
use scheduler::{ChainId, LayerRotationScheduler, MoveTiming};

/// What handling one input event led to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputOutcome {
    Ignored,
    DragStarted,
    DragEnded,
    Rotated(Quaternion<f32>),
    PointerTracked,
    Resized { width: u32, height: u32 },
    /// Resize to the size the viewport already had.
    Unchanged,
}

#[derive(Debug)]
pub struct PuzzleContext {
    pub scene: PuzzleScene,
    pub geometry: GeometryCache,
    pub tweens: TweenEngine,
    pub scheduler: LayerRotationScheduler,
    pub drag: DragController,
    pub viewport: Viewport,
    pub chains: Vec<ChainId>,
    spin_per_frame: f32,
}

impl PuzzleContext {
    /// Assembles the cube and starts `config.chains` move chains. The random
    /// source is taken from `config.seed` when set, otherwise from the OS.
    pub fn new(config: &PuzzleConfig) -> Result<Self, PuzzleError> {
        let rng: Box<dyn RandomSource> = match config.seed {
            Some(seed) => Box::new(SplitMix64::new(seed)),
            None => Box::new(SplitMix64::from_entropy()),
        };
        Self::with_random(config, rng)
    }

    pub fn with_random(
        config: &PuzzleConfig,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, PuzzleError> {
        let mut geometry = GeometryCache::new();
        let mut scene = SceneAssembler::new(config).assemble(&mut geometry)?;
        let mut tweens = TweenEngine::new();
        let mut scheduler = LayerRotationScheduler::new(MoveTiming::from(config), rng);

        let chains = (0..config.chains)
            .map(|_| scheduler.start_chain(scene.handles.cube_root, &mut scene.graph, &mut tweens))
            .collect::<Result<Vec<_>, _>>()?;

        let drag = DragController::new(scene.handles.outer, config.drag_degrees_per_pixel);
        let [width, height] = config.composite_size;
        let viewport = Viewport::new(width, height, config.composite_size);

        Ok(Self {
            scene,
            geometry,
            tweens,
            scheduler,
            drag,
            viewport,
            chains,
            spin_per_frame: config.spin_per_frame,
        })
    }

    pub fn spin_per_frame(&self) -> f32 {
        self.spin_per_frame
    }

    /// Applies one event, provided a listener for its kind is registered.
    pub fn handle_input(&mut self, event: InputEvent, bindings: &InputBindings) -> InputOutcome {
        if !bindings.accepts(event.kind()) {
            return InputOutcome::Ignored;
        }
        match event {
            InputEvent::PointerDown => {
                self.drag.pointer_down();
                InputOutcome::DragStarted
            }
            InputEvent::PointerUp => {
                self.drag.pointer_up();
                InputOutcome::DragEnded
            }
            InputEvent::PointerMove(position) => {
                match self.drag.pointer_move(position, &mut self.scene.graph) {
                    Some(delta) => InputOutcome::Rotated(delta),
                    None => InputOutcome::PointerTracked,
                }
            }
            InputEvent::Resize { width, height } => {
                if self.viewport.resize(width, height) {
                    InputOutcome::Resized { width, height }
                } else {
                    InputOutcome::Unchanged
                }
            }
        }
    }
}
