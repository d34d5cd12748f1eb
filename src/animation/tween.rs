//! Rotation tweens on scene nodes.
//!
//! The engine keeps its own clock, advanced by [`TweenEngine::update`]. A
//! scheduled tween sits in the timer queue until its delay has elapsed; then
//! it captures the node's current angle and eases it towards the target over
//! its duration. The last update of a tween writes the target exactly.
//!
//! Completion actions are returned to the caller as data instead of being run
//! by the engine, so whoever owns the follow-up logic (the layer-move
//! scheduler) can react with full access to the scene and the engine.

use cgmath::Rad;
use instant::Duration;
use log::warn;

use crate::{
    animation::{easing::Easing, timer::TimerQueue},
    data_structures::scene_graph::{Axis, NodeId, SceneGraph},
    puzzle::scheduler::ChainId,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(u64);

/// What to do once a tween has reached its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    None,
    /// Hand control back to a layer-move chain.
    ContinueChain(ChainId),
}

/// Animates one Euler component of `target` to the absolute angle `to`.
#[derive(Clone, Debug, PartialEq)]
pub struct RotationTween {
    pub target: NodeId,
    pub axis: Axis,
    pub to: Rad<f32>,
    pub delay: Duration,
    pub duration: Duration,
    pub easing: Easing,
    pub on_complete: Completion,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompletedTween {
    pub id: TweenId,
    pub target: NodeId,
    pub axis: Axis,
    pub from: Rad<f32>,
    pub to: Rad<f32>,
    pub on_complete: Completion,
}

#[derive(Debug)]
struct ActiveTween {
    id: TweenId,
    tween: RotationTween,
    from: Rad<f32>,
    started_at: Duration,
}

#[derive(Debug, Default)]
pub struct TweenEngine {
    now: Duration,
    pending: TimerQueue<(TweenId, RotationTween)>,
    active: Vec<ActiveTween>,
    next_id: u64,
}

impl TweenEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time the engine has been advanced by so far.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, tween: RotationTween) -> TweenId {
        let id = TweenId(self.next_id);
        self.next_id += 1;
        let fire_at = self.now + tween.delay;
        self.pending.push(fire_at, (id, tween));
        id
    }

    /// Removes a tween whether it is still waiting or already running. A
    /// running tween stays at whatever angle it had reached.
    pub fn cancel(&mut self, id: TweenId) -> bool {
        let waiting = self.pending.cancel_where(|(pending, _)| *pending == id);
        let before = self.active.len();
        self.active.retain(|active| active.id != id);
        waiting > 0 || before != self.active.len()
    }

    pub fn is_scheduled(&self, id: TweenId) -> bool {
        self.pending.iter().any(|(_, (pending, _))| *pending == id)
            || self.active.iter().any(|active| active.id == id)
    }

    pub fn is_running(&self, id: TweenId) -> bool {
        self.active.iter().any(|active| active.id == id)
    }

    /// Waiting plus running tweens.
    pub fn in_flight(&self) -> usize {
        self.pending.len() + self.active.len()
    }

    /// Tweens in flight whose completion continues the given chain.
    pub fn in_flight_for(&self, chain: ChainId) -> usize {
        let continues = |tween: &RotationTween| tween.on_complete == Completion::ContinueChain(chain);
        self.pending.iter().filter(|(_, (_, tween))| continues(tween)).count()
            + self.active.iter().filter(|active| continues(&active.tween)).count()
    }

    /// When the earliest waiting tween starts.
    pub fn next_start(&self) -> Option<Duration> {
        self.pending.peek_time()
    }

    /// Advances the clock by `dt`, starts every tween that became due, writes
    /// the eased angle of every running tween and returns those that finished.
    pub fn update(&mut self, dt: Duration, scene: &mut SceneGraph) -> Vec<CompletedTween> {
        self.now += dt;

        while let Some((fire_at, (id, tween))) = self.pending.pop_due(self.now) {
            let Some(node) = scene.node(tween.target) else {
                warn!("tween {:?} targets missing node {:?}, dropping it", id, tween.target);
                continue;
            };
            let from = node.euler_component(tween.axis);
            self.active.push(ActiveTween {
                id,
                tween,
                from,
                started_at: fire_at,
            });
        }

        let now = self.now;
        let mut completed = Vec::new();
        self.active.retain(|active| {
            let Some(node) = scene.node_mut(active.tween.target) else {
                warn!(
                    "tween {:?} lost its node {:?} while running",
                    active.id, active.tween.target
                );
                return false;
            };
            let elapsed = now.saturating_sub(active.started_at);
            let progress = if active.tween.duration.is_zero() {
                1.0
            } else {
                (elapsed.as_secs_f32() / active.tween.duration.as_secs_f32()).min(1.0)
            };
            let Rad(from) = active.from;
            let Rad(to) = active.tween.to;
            if progress >= 1.0 {
                node.set_euler_component(active.tween.axis, active.tween.to);
                completed.push(CompletedTween {
                    id: active.id,
                    target: active.tween.target,
                    axis: active.tween.axis,
                    from: active.from,
                    to: active.tween.to,
                    on_complete: active.tween.on_complete,
                });
                false
            } else {
                let eased = active.tween.easing.apply(progress);
                node.set_euler_component(active.tween.axis, Rad(from + (to - from) * eased));
                true
            }
        });
        completed
    }
}
