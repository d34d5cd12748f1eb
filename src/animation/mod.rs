//! Time-based animation.
//!
//! - `easing` maps linear progress to eased progress
//! - `timer` is the min-heap of pending work keyed by fire time
//! - `tween` drives rotation tweens on scene nodes

pub mod easing;
pub mod timer;
pub mod tween;

pub use easing::Easing;
pub use timer::TimerQueue;
pub use tween::{Completion, CompletedTween, RotationTween, TweenEngine, TweenId};
