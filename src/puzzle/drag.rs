//! Pointer-drag orientation of the whole cube.
//!
//! Moving the pointer by (dx, dy) pixels while a button is held turns the
//! target node by dy degrees about X and dx degrees about Y. The rotation is
//! applied in world space (`delta * orientation`) so dragging right always
//! spins the cube to the right on screen, however it is currently oriented.

use cgmath::{Deg, Euler, Point2, Quaternion, Rad};

use crate::data_structures::scene_graph::{NodeId, SceneGraph};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
    pub is_dragging: bool,
    /// Last pointer position seen, dragging or not.
    pub previous: Point2<f64>,
}

impl Default for DragState {
    fn default() -> Self {
        Self {
            is_dragging: false,
            previous: Point2::new(0.0, 0.0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DragController {
    state: DragState,
    target: NodeId,
    degrees_per_pixel: f32,
}

impl DragController {
    pub fn new(target: NodeId, degrees_per_pixel: f32) -> Self {
        Self {
            state: DragState::default(),
            target,
            degrees_per_pixel,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn pointer_down(&mut self) {
        self.state.is_dragging = true;
    }

    pub fn pointer_up(&mut self) {
        self.state.is_dragging = false;
    }

    /// Records the new position and, while dragging, rotates the target.
    /// Returns the rotation that was applied.
    pub fn pointer_move(
        &mut self,
        position: Point2<f64>,
        scene: &mut SceneGraph,
    ) -> Option<Quaternion<f32>> {
        let dx = (position.x - self.state.previous.x) as f32;
        let dy = (position.y - self.state.previous.y) as f32;
        self.state.previous = position;

        if !self.state.is_dragging {
            return None;
        }
        let delta = drag_rotation(dx * self.degrees_per_pixel, dy * self.degrees_per_pixel);
        match scene.node_mut(self.target) {
            Some(node) => {
                node.premultiply_rotation(delta);
                Some(delta)
            }
            None => {
                log::warn!("drag target {:?} is gone", self.target);
                None
            }
        }
    }
}

/// Rotation for a pointer delta given in degrees: vertical motion turns about
/// X, horizontal about Y (intrinsic XYZ order).
pub fn drag_rotation(dx_degrees: f32, dy_degrees: f32) -> Quaternion<f32> {
    let x: Rad<f32> = Deg(dy_degrees).into();
    let y: Rad<f32> = Deg(dx_degrees).into();
    Quaternion::from(Euler::new(x, y, Rad(0.0)))
}
