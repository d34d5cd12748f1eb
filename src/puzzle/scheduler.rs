//! Endless chains of randomized layer moves.
//!
//! A chain is bound to a node whose children are the layers (the cube root).
//! Every cycle it
//!
//! 1. turns the chain node by 90° about Y or Z, so that the fixed X axis of the
//!    layers points along a different cube axis from move to move,
//! 2. picks one of the node's layers and a direction,
//! 3. schedules a half turn of that layer about its local X axis, eased over
//!    the move duration after a random pause.
//!
//! When the tween completes the chain immediately runs the next cycle. The
//! pause of the finished cycle is carried over as a rest before the next
//! move's own pause, so a chain never has more than one tween in flight.
//!
//! Chains bound to the same node take turns: while one of them is animating
//! the others wait, and each completion hands the next cycle to the next
//! waiting chain, so outside cancellation a layer is only ever turned from a
//! resting angle.

use std::f32::consts::{FRAC_PI_2, PI};

use cgmath::Rad;
use instant::Duration;
use log::{debug, error};

use crate::{
    animation::{
        easing::Easing,
        tween::{Completion, CompletedTween, RotationTween, TweenEngine, TweenId},
    },
    config::PuzzleConfig,
    data_structures::scene_graph::{Axis, NodeId, SceneGraph},
    error::PuzzleError,
    puzzle::random::RandomSource,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(pub(crate) usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainState {
    Idle,
    Animating(TweenId),
    /// Another chain on the same node is animating.
    Waiting,
    /// Cancelled; never rescheduled again.
    Stopped,
}

#[derive(Clone, Debug)]
pub struct Chain {
    pub id: ChainId,
    pub node: NodeId,
    pub state: ChainState,
    pub moves_completed: u64,
    /// Pause of the last cycle, waited out before the next one's pause.
    rest: Duration,
}

/// One randomly drawn move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlannedMove {
    /// Axis of the 90° re-orientation of the chain node.
    pub reorient_axis: Axis,
    pub layer: usize,
    /// +1 or -1
    pub direction: f32,
    pub pause: Duration,
}

#[derive(Clone, Debug)]
pub struct MoveTiming {
    pub duration: Duration,
    pub pause_min: Duration,
    pub pause_max: Duration,
    pub easing: Easing,
}

impl From<&PuzzleConfig> for MoveTiming {
    fn from(config: &PuzzleConfig) -> Self {
        Self {
            duration: config.move_duration,
            pause_min: config.pause_min,
            pause_max: config.pause_max,
            easing: Easing::QuadraticInOut,
        }
    }
}

pub struct LayerRotationScheduler {
    timing: MoveTiming,
    rng: Box<dyn RandomSource>,
    chains: Vec<Chain>,
}

impl std::fmt::Debug for LayerRotationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerRotationScheduler")
            .field("timing", &self.timing)
            .field("chains", &self.chains)
            .finish()
    }
}

impl LayerRotationScheduler {
    pub fn new(timing: MoveTiming, rng: Box<dyn RandomSource>) -> Self {
        Self {
            timing,
            rng,
            chains: Vec::new(),
        }
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id.0)
    }

    /// Binds a new chain to `node` and runs its first cycle right away.
    pub fn start_chain(
        &mut self,
        node: NodeId,
        scene: &mut SceneGraph,
        tweens: &mut TweenEngine,
    ) -> Result<ChainId, PuzzleError> {
        let id = ChainId(self.chains.len());
        let busy = self.is_busy(node);
        self.chains.push(Chain {
            id,
            node,
            state: ChainState::Idle,
            moves_completed: 0,
            rest: Duration::ZERO,
        });
        if busy {
            self.chains[id.0].state = ChainState::Waiting;
            return Ok(id);
        }
        if let Err(err) = self.cycle(id, scene, tweens) {
            self.chains[id.0].state = ChainState::Stopped;
            return Err(err);
        }
        Ok(id)
    }

    /// Stops a chain and drops its tween. A layer caught mid-move keeps its
    /// current angle. If the chain was animating, the next chain waiting on
    /// the same node takes over.
    pub fn cancel_chain(
        &mut self,
        id: ChainId,
        scene: &mut SceneGraph,
        tweens: &mut TweenEngine,
    ) -> bool {
        let Some(chain) = self.chains.get_mut(id.0) else {
            return false;
        };
        let previous = chain.state;
        chain.state = ChainState::Stopped;
        if let ChainState::Animating(tween) = previous {
            tweens.cancel(tween);
            if let Some(next) = self.next_waiting(id) {
                self.chains[next.0].rest = self.chains[id.0].rest;
                self.run_cycle(next, scene, tweens);
            }
        }
        previous != ChainState::Stopped
    }

    /// Feeds finished tweens back into their chains. Returns how many new
    /// moves were scheduled.
    pub fn handle_completions(
        &mut self,
        completed: &[CompletedTween],
        scene: &mut SceneGraph,
        tweens: &mut TweenEngine,
    ) -> usize {
        completed
            .iter()
            .filter(|done| self.on_tween_complete(done, scene, tweens))
            .count()
    }

    fn on_tween_complete(
        &mut self,
        done: &CompletedTween,
        scene: &mut SceneGraph,
        tweens: &mut TweenEngine,
    ) -> bool {
        let Completion::ContinueChain(id) = done.on_complete else {
            return false;
        };
        let Some(chain) = self.chains.get_mut(id.0) else {
            return false;
        };
        if chain.state != ChainState::Animating(done.id) {
            return false;
        }
        chain.state = ChainState::Idle;
        chain.moves_completed += 1;
        let next = match self.next_waiting(id) {
            Some(next) => {
                self.chains[id.0].state = ChainState::Waiting;
                self.chains[next.0].rest = self.chains[id.0].rest;
                next
            }
            None => id,
        };
        self.run_cycle(next, scene, tweens)
    }

    fn run_cycle(
        &mut self,
        id: ChainId,
        scene: &mut SceneGraph,
        tweens: &mut TweenEngine,
    ) -> bool {
        match self.cycle(id, scene, tweens) {
            Ok(_) => true,
            Err(err) => {
                error!("layer chain {:?} stopped: {}", id, err);
                self.chains[id.0].state = ChainState::Stopped;
                false
            }
        }
    }

    fn is_busy(&self, node: NodeId) -> bool {
        self.chains
            .iter()
            .any(|chain| chain.node == node && matches!(chain.state, ChainState::Animating(_)))
    }

    /// The first waiting chain on the same node after `id`, in round-robin
    /// order.
    fn next_waiting(&self, id: ChainId) -> Option<ChainId> {
        let node = self.chains[id.0].node;
        let count = self.chains.len();
        (1..count)
            .map(|offset| &self.chains[(id.0 + offset) % count])
            .find(|chain| chain.node == node && chain.state == ChainState::Waiting)
            .map(|chain| chain.id)
    }

    /// Draws the next move from the random source.
    pub fn plan_move(&mut self, layer_count: usize) -> PlannedMove {
        let reorient_axis = if self.rng.next_f64() > 0.5 {
            Axis::Y
        } else {
            Axis::Z
        };
        let layer = self.rng.next_index(layer_count);
        let direction = if self.rng.next_f64() > 0.5 { -1.0 } else { 1.0 };
        let pause = Duration::from_secs_f64(self.rng.next_range(
            self.timing.pause_min.as_secs_f64(),
            self.timing.pause_max.as_secs_f64(),
        ));
        PlannedMove {
            reorient_axis,
            layer,
            direction,
            pause,
        }
    }

    fn cycle(
        &mut self,
        id: ChainId,
        scene: &mut SceneGraph,
        tweens: &mut TweenEngine,
    ) -> Result<TweenId, PuzzleError> {
        let node = self.chains[id.0].node;
        let layer_count = scene
            .node(node)
            .ok_or(PuzzleError::NodeNotFound(node))?
            .children()
            .len();
        if layer_count == 0 {
            return Err(PuzzleError::NoLayers(node));
        }

        let planned = self.plan_move(layer_count);
        if let Some(chain_node) = scene.node_mut(node) {
            chain_node.rotate_on_axis(planned.reorient_axis, Rad(FRAC_PI_2));
        }
        let layer = scene.children(node)[planned.layer];
        let current = scene
            .node(layer)
            .ok_or(PuzzleError::NodeNotFound(layer))?
            .euler_component(Axis::X);

        let chain = &mut self.chains[id.0];
        let delay = chain.rest + planned.pause;
        let tween = tweens.schedule(RotationTween {
            target: layer,
            axis: Axis::X,
            to: current + Rad(planned.direction * PI),
            delay,
            duration: self.timing.duration,
            easing: self.timing.easing,
            on_complete: Completion::ContinueChain(id),
        });
        chain.rest = planned.pause;
        chain.state = ChainState::Animating(tween);
        debug!(
            "chain {:?}: turned {:?} about {:?}, layer {} by {}180° after {:?}",
            id,
            node,
            planned.reorient_axis,
            planned.layer,
            if planned.direction < 0.0 { "-" } else { "+" },
            delay
        );
        Ok(tween)
    }
}
