//! Scene graph for the cube hierarchy.
//!
//! Nodes live in an arena and are addressed by [`NodeId`], so the scheduler,
//! the drag controller and the tween engine can all hold on to the node they
//! animate without borrowing the graph. Each node keeps a local transform and
//! the world transform derived from it (`parent_world * local`).
//!
//! Rotations are stored twice: as a quaternion (used for composition) and as
//! XYZ Euler angles (what the tweens and the spin animate). Writing either one
//! updates the other.

use cgmath::{Euler, InnerSpace, Matrix3, Quaternion, Rad, Rotation3};
use log::warn;

use crate::data_structures::instance::Instance;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Identifies a shared mesh; all cells of one cube point at the same one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Carries the user's drag orientation.
    OuterWrapper,
    /// Carries the autonomous spin.
    InnerWrapper,
    /// Parent of the layers; layer-move chains rotate it in 90° steps.
    CubeRoot,
    Layer { index: usize },
    Cell { mesh: MeshId },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(&self) -> cgmath::Vector3<f32> {
        match self {
            Axis::X => cgmath::Vector3::unit_x(),
            Axis::Y => cgmath::Vector3::unit_y(),
            Axis::Z => cgmath::Vector3::unit_z(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    local: Instance,
    world: Instance,
    euler: Euler<Rad<f32>>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind, local: Instance, parent: Option<NodeId>) -> Self {
        let euler = euler_from_quaternion(local.rotation);
        Self {
            kind,
            world: local.clone(),
            local,
            euler,
            parent,
            children: Vec::new(),
        }
    }

    pub fn local(&self) -> &Instance {
        &self.local
    }

    /// World transform as of the last [`SceneGraph::update_world_transforms`].
    pub fn world(&self) -> &Instance {
        &self.world
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn rotation(&self) -> Quaternion<f32> {
        self.local.rotation
    }

    pub fn euler(&self) -> Euler<Rad<f32>> {
        self.euler
    }

    pub fn euler_component(&self, axis: Axis) -> Rad<f32> {
        match axis {
            Axis::X => self.euler.x,
            Axis::Y => self.euler.y,
            Axis::Z => self.euler.z,
        }
    }

    pub fn set_position(&mut self, position: cgmath::Vector3<f32>) {
        self.local.position = position;
    }

    pub fn set_euler(&mut self, euler: Euler<Rad<f32>>) {
        self.euler = euler;
        self.local.rotation = Quaternion::from(euler);
    }

    pub fn set_euler_component(&mut self, axis: Axis, angle: Rad<f32>) {
        let mut euler = self.euler;
        match axis {
            Axis::X => euler.x = angle,
            Axis::Y => euler.y = angle,
            Axis::Z => euler.z = angle,
        }
        self.set_euler(euler);
    }

    pub fn set_rotation(&mut self, rotation: Quaternion<f32>) {
        self.local.rotation = rotation.normalize();
        self.euler = euler_from_quaternion(self.local.rotation);
    }

    /// Rotates about one of the node's own axes (post-multiplication).
    pub fn rotate_on_axis(&mut self, axis: Axis, angle: Rad<f32>) {
        let delta = Quaternion::from_axis_angle(axis.unit(), angle);
        self.set_rotation(self.local.rotation * delta);
    }

    /// Applies `delta` in the parent's frame (pre-multiplication).
    pub fn premultiply_rotation(&mut self, delta: Quaternion<f32>) {
        self.set_rotation(delta * self.local.rotation);
    }
}

/// Decomposes a rotation into intrinsic XYZ Euler angles, the inverse of
/// `Quaternion::from(Euler)`.
pub fn euler_from_quaternion(q: Quaternion<f32>) -> Euler<Rad<f32>> {
    let m = Matrix3::from(q);
    // cgmath is column major: m.z.x is row 0, column 2
    let m13 = m.z.x.clamp(-1.0, 1.0);
    let y = m13.asin();
    if m13.abs() < 0.999_999_9 {
        Euler::new(
            Rad((-m.z.y).atan2(m.z.z)),
            Rad(y),
            Rad((-m.y.x).atan2(m.x.x)),
        )
    } else {
        Euler::new(Rad(m.y.z.atan2(m.y.y)), Rad(y), Rad(0.0))
    }
}

#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, kind: NodeKind, local: Instance) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind, local, None));
        id
    }

    /// Appends a child. A stale parent id is reported and the node is added
    /// as a root instead so the id handed out is still valid.
    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind, local: Instance) -> NodeId {
        let id = NodeId(self.nodes.len());
        match self.nodes.get_mut(parent.0) {
            Some(parent_node) => {
                parent_node.children.push(id);
                self.nodes.push(Node::new(kind, local, Some(parent)));
            }
            None => {
                warn!(
                    "parent {:?} does not exist, adding {:?} as a root instead",
                    parent, kind
                );
                self.nodes.push(Node::new(kind, local, None));
            }
        }
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(index, _)| NodeId(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    /// Cells in insertion order; this is also the order of the instance buffer.
    pub fn cells(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.iter()
            .filter(|(_, node)| matches!(node.kind, NodeKind::Cell { .. }))
    }

    pub fn count(&self, predicate: impl Fn(&NodeKind) -> bool) -> usize {
        self.nodes.iter().filter(|node| predicate(&node.kind)).count()
    }

    /**
     * Recomputes every world transform top-down. Nodes are visited from the
     * roots so a parent is always resolved before its children.
     */
    pub fn update_world_transforms(&mut self) {
        let mut stack: Vec<(NodeId, Instance)> = self
            .roots()
            .map(|root| (root, Instance::new()))
            .collect();
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(id.0) else {
                warn!("dangling child {:?} while updating world transforms", id);
                continue;
            };
            node.world = &parent_world * &node.local;
            let world = node.world.clone();
            stack.extend(node.children.iter().map(|child| (*child, world.clone())));
        }
    }

    /// World transforms of all cells, ready for the instance buffer.
    pub fn cell_world_transforms(&self) -> Vec<Instance> {
        self.cells().map(|(_, node)| node.world.clone()).collect()
    }
}
