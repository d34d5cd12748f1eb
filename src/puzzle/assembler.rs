//! Builds the cube hierarchy and its lighting.
//!
//! ```text
//! OuterWrapper           drag orientation
//! └── InnerWrapper       autonomous spin
//!     └── CubeRoot       90° re-orientations of the move chains
//!         ├── Layer 0    cells with x index 0
//!         │   └── Cell × N²
//!         ├── ...
//!         └── Layer N-1
//! ```

use cgmath::{InnerSpace, Vector3};

use crate::{
    config::{MaterialConfig, PuzzleConfig, srgb_hex_to_linear},
    data_structures::{
        instance::Instance,
        scene_graph::{MeshId, NodeId, NodeKind, SceneGraph},
    },
    error::PuzzleError,
    resources::geometry::{GeometryCache, MeshData, RoundedBox},
};
use std::sync::Arc;

/// Ids of the structural nodes, so callers never have to search the graph.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneHandles {
    pub outer: NodeId,
    pub inner: NodeId,
    pub cube_root: NodeId,
    pub layers: Vec<NodeId>,
}

/// A rectangular area light panel.
#[derive(Clone, Debug, PartialEq)]
pub struct AreaLight {
    pub position: Vector3<f32>,
    /// sRGB hex colour.
    pub colour: u32,
    pub intensity: f32,
    pub width: f32,
    pub height: f32,
    pub active: bool,
}

impl AreaLight {
    const PANEL_SIZE: f32 = 20.0;

    fn panel(colour: u32, intensity: f32, position: [f32; 3], active: bool) -> Self {
        Self {
            position: position.into(),
            colour,
            intensity,
            width: Self::PANEL_SIZE,
            height: Self::PANEL_SIZE,
            active,
        }
    }

    /// The default eight-panel rig. Only three of them are lit; the
    /// rest are kept so they can be switched back on.
    pub fn default_set() -> Vec<AreaLight> {
        vec![
            Self::panel(0xea7bd9, 50.0, [10.0, 10.0, 0.0], true),
            Self::panel(0xffffff, 100.0, [10.0, -10.0, 0.0], false),
            Self::panel(0xffffff, 100.0, [-10.0, -10.0, 0.0], false),
            Self::panel(0xffffff, 100.0, [-10.0, 10.0, 0.0], false),
            Self::panel(0xffffff, 100.0, [20.0, 0.0, 0.0], false),
            Self::panel(0x79e3c0, 30.0, [10.0, -20.0, 10.0], true),
            Self::panel(0x83e19e, 30.0, [-20.0, 0.0, 10.0], true),
            Self::panel(0xffffff, 100.0, [0.0, 20.0, 0.0], false),
        ]
    }

    /// Aims the panel at `target` and returns its orientation.
    pub fn aim_at(&self, target: Vector3<f32>) -> AimedLight {
        let forward = (target - self.position).normalize();
        let world_up = if forward.y.abs() > 0.999 {
            Vector3::unit_z()
        } else {
            Vector3::unit_y()
        };
        let right = world_up.cross(-forward).normalize();
        let up = (-forward).cross(right).normalize();
        AimedLight {
            position: self.position,
            colour: srgb_hex_to_linear(self.colour),
            intensity: self.intensity,
            forward,
            right,
            up,
            half_size: [self.width / 2.0, self.height / 2.0],
        }
    }
}

/// An active light with its panel basis resolved; it emits along `forward`.
#[derive(Clone, Debug, PartialEq)]
pub struct AimedLight {
    pub position: Vector3<f32>,
    /// Linear RGB.
    pub colour: [f32; 3],
    pub intensity: f32,
    pub forward: Vector3<f32>,
    pub right: Vector3<f32>,
    pub up: Vector3<f32>,
    pub half_size: [f32; 2],
}

#[derive(Clone, Debug)]
pub struct PuzzleScene {
    pub graph: SceneGraph,
    pub handles: SceneHandles,
    pub mesh_id: MeshId,
    pub mesh: Arc<MeshData>,
    pub material: MaterialConfig,
    pub lights: Vec<AimedLight>,
    pub cubes_per_side: usize,
}

impl PuzzleScene {
    pub fn cell_count(&self) -> usize {
        self.graph.count(|kind| matches!(kind, NodeKind::Cell { .. }))
    }
}

pub struct SceneAssembler<'a> {
    config: &'a PuzzleConfig,
    lights: Vec<AreaLight>,
}

impl<'a> SceneAssembler<'a> {
    pub fn new(config: &'a PuzzleConfig) -> Self {
        Self {
            config,
            lights: AreaLight::default_set(),
        }
    }

    pub fn with_lights(mut self, lights: Vec<AreaLight>) -> Self {
        self.lights = lights;
        self
    }

    pub fn assemble(&self, geometry: &mut GeometryCache) -> Result<PuzzleScene, PuzzleError> {
        self.config.validate()?;
        let n = self.config.cubes_per_side;
        let (mesh_id, mesh) = geometry.get_or_build(&RoundedBox::cube(
            self.config.cell_size,
            self.config.corner_radius,
            self.config.smoothness,
        ))?;

        let mut graph = SceneGraph::new();
        let outer = graph.add_root(NodeKind::OuterWrapper, Instance::new());
        let inner = graph.add_child(outer, NodeKind::InnerWrapper, Instance::new());
        let cube_root = graph.add_child(inner, NodeKind::CubeRoot, Instance::new());

        let spacing = self.config.spacing();
        let offset = (n as f32 - 1.0) / 2.0;
        let grid = |index: usize| (index as f32 - offset) * spacing;

        let mut layers = Vec::with_capacity(n);
        for i in 0..n {
            let layer = graph.add_child(cube_root, NodeKind::Layer { index: i }, Instance::new());
            for j in 0..n {
                for k in 0..n {
                    let position = Vector3::new(grid(i), grid(j), grid(k));
                    graph.add_child(layer, NodeKind::Cell { mesh: mesh_id }, position.into());
                }
            }
            layers.push(layer);
        }
        graph.update_world_transforms();

        let lights: Vec<AimedLight> = self
            .lights
            .iter()
            .filter(|light| light.active)
            .map(|light| light.aim_at(Vector3::new(0.0, 0.0, 0.0)))
            .collect();

        log::info!(
            "assembled {}x{}x{} cube: {} nodes, {} active lights",
            n,
            n,
            n,
            graph.len(),
            lights.len()
        );

        Ok(PuzzleScene {
            graph,
            handles: SceneHandles {
                outer,
                inner,
                cube_root,
                layers,
            },
            mesh_id,
            mesh,
            material: self.config.material.clone(),
            lights,
            cubes_per_side: n,
        })
    }
}
