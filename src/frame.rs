//! One frame of the puzzle.
//!
//! Every tick runs the same three stages in a fixed order: the inner wrapper
//! spins by a constant step, the tween engine advances by the elapsed time
//! (which may finish moves and schedule new ones), and the composite is
//! rendered from the freshly updated world transforms.

use cgmath::Rad;
use instant::{Duration, Instant};

use crate::{data_structures::scene_graph::SceneGraph, puzzle::PuzzleContext};

/// Anything that can turn the scene into a composited image.
pub trait CompositeRenderer {
    fn composite(&mut self, scene: &SceneGraph) -> anyhow::Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStage {
    Spin,
    Tweens,
    Composite,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub stages: Vec<FrameStage>,
    pub completed_moves: usize,
    pub scheduled_moves: usize,
}

/// Wall-clock bookkeeping: time between ticks and the running total.
///
/// Nothing reads this to drive animation; the tween engine is advanced by the
/// `dt` passed to [`FrameLoop::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClockState {
    pub last_frame_time: Option<Instant>,
    pub total_time: Duration,
    pub last_dt: Duration,
}

impl ClockState {
    pub fn advance(&mut self, now: Instant) {
        self.last_dt = match self.last_frame_time {
            Some(last) if now > last => now - last,
            _ => Duration::ZERO,
        };
        self.total_time += self.last_dt;
        self.last_frame_time = Some(now);
    }
}

#[derive(Debug, Default)]
pub struct FrameLoop {
    frame: u64,
    clock: ClockState,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock(&self) -> &ClockState {
        &self.clock
    }

    pub fn frames(&self) -> u64 {
        self.frame
    }

    pub fn tick(
        &mut self,
        puzzle: &mut PuzzleContext,
        dt: Duration,
        now: Instant,
        renderer: &mut dyn CompositeRenderer,
    ) -> anyhow::Result<FrameReport> {
        self.clock.advance(now);
        let mut stages = Vec::with_capacity(3);

        let spin = puzzle.spin_per_frame();
        let inner = puzzle.scene.handles.inner;
        if let Some(node) = puzzle.scene.graph.node_mut(inner) {
            let mut euler = node.euler();
            euler.x += Rad(spin);
            euler.y += Rad(spin);
            euler.z += Rad(spin);
            node.set_euler(euler);
        }
        stages.push(FrameStage::Spin);

        let completed = puzzle.tweens.update(dt, &mut puzzle.scene.graph);
        let scheduled = puzzle.scheduler.handle_completions(
            &completed,
            &mut puzzle.scene.graph,
            &mut puzzle.tweens,
        );
        stages.push(FrameStage::Tweens);

        puzzle.scene.graph.update_world_transforms();
        renderer.composite(&puzzle.scene.graph)?;
        stages.push(FrameStage::Composite);

        self.frame += 1;
        let report = FrameReport {
            frame: self.frame,
            stages,
            completed_moves: completed.len(),
            scheduled_moves: scheduled,
        };
        if report.completed_moves > 0 {
            log::debug!("frame {}: {:?}", report.frame, report);
        } else {
            log::trace!(
                "frame {} after {:?} (total {:?})",
                report.frame,
                self.clock.last_dt,
                self.clock.total_time
            );
        }
        Ok(report)
    }
}
