//! Procedural rounded-box geometry.
//!
//! A cell is a box whose edges and corners are rounded with a radius `r`. The
//! shape is built as an extrusion: a rectangle outline, inset by the bevel on
//! every side and with tiny arcs at its corners, is swept along Z. Each end of
//! the sweep is a bevel that grows the outline out by `r` while moving in by
//! `r`, following a quarter circle. Offsetting the corner arcs outward is what
//! rounds the vertical edges, the bevel rounds the front and back edges.
//!
//! ```text
//!   ring layout along Z (side view)
//!
//!   front cap  bevel rings        straight side        bevel rings  back cap
//!   |--------)(--------------------------------------)(--------|
//!   -d/2                -(d/2 - r)          +(d/2 - r)          +d/2
//! ```

use std::{collections::HashMap, f32::consts::FRAC_PI_2, sync::Arc};

use crate::{
    data_structures::{model::ModelVertex, scene_graph::MeshId},
    error::PuzzleError,
};

/// Radius of the corner arcs in the outline. The arcs only give the bevel
/// something to offset; the visible rounding comes from the bevel size.
pub const EPSILON: f32 = 0.00001;

/// Parameters of one rounded box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundedBox {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub corner_radius: f32,
    /// Curve segments per outline corner; the bevel gets twice as many.
    pub smoothness: u32,
}

impl RoundedBox {
    pub fn new(width: f32, height: f32, depth: f32, corner_radius: f32, smoothness: u32) -> Self {
        Self {
            width,
            height,
            depth,
            corner_radius,
            smoothness,
        }
    }

    pub fn cube(size: f32, corner_radius: f32, smoothness: u32) -> Self {
        Self::new(size, size, size, corner_radius, smoothness)
    }

    /// `0 <= corner_radius < min(width, height) / 2` with finite, positive
    /// dimensions and at least one curve segment.
    pub fn validate(&self) -> Result<(), PuzzleError> {
        let dims = [self.width, self.height, self.depth];
        if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(PuzzleError::InvalidDimensions {
                width: self.width,
                height: self.height,
                depth: self.depth,
            });
        }
        let limit = self.width.min(self.height) / 2.0;
        if !self.corner_radius.is_finite() || self.corner_radius < 0.0 || self.corner_radius >= limit
        {
            return Err(PuzzleError::InvalidCornerRadius {
                radius: self.corner_radius,
                limit,
            });
        }
        if self.smoothness == 0 {
            return Err(PuzzleError::InvalidSmoothness(self.smoothness));
        }
        Ok(())
    }

    pub fn build(&self) -> Result<MeshData, PuzzleError> {
        self.validate()?;

        let radius = self.corner_radius;
        let bevel = (radius - EPSILON).max(0.0);
        let half_w = self.width / 2.0 - bevel;
        let half_h = self.height / 2.0 - bevel;
        // a box thinner than 2r just loses its straight section
        let core = (self.depth / 2.0 - radius).max(0.0);

        let segments = self.smoothness;
        let bevel_segments = 2 * self.smoothness;

        let corners = [
            (half_w, -half_h, -FRAC_PI_2),
            (half_w, half_h, 0.0),
            (-half_w, half_h, FRAC_PI_2),
            (-half_w, -half_h, 2.0 * FRAC_PI_2),
        ];
        let outline: Vec<([f32; 2], [f32; 2])> = corners
            .iter()
            .flat_map(|&(cx, cy, start)| {
                (0..=segments).map(move |s| {
                    let angle = start + FRAC_PI_2 * s as f32 / segments as f32;
                    ([cx, cy], [angle.cos(), angle.sin()])
                })
            })
            .collect();

        // (bevel angle, z, z-normal sign), ordered front to back
        let front = (0..=bevel_segments).map(|b| {
            let phi = FRAC_PI_2 * b as f32 / bevel_segments as f32;
            (phi, -(core + radius * phi.cos()), -1.0)
        });
        let back = (0..=bevel_segments).rev().map(|b| {
            let phi = FRAC_PI_2 * b as f32 / bevel_segments as f32;
            (phi, core + radius * phi.cos(), 1.0)
        });
        let rings: Vec<(f32, f32, f32)> = front.chain(back).collect();

        let mut vertices = Vec::with_capacity(rings.len() * outline.len() + 2);
        for &(phi, z, z_sign) in &rings {
            let (sin, cos) = phi.sin_cos();
            let offset = EPSILON + bevel * sin;
            for &([cx, cy], [dx, dy]) in &outline {
                vertices.push(ModelVertex {
                    position: [cx + dx * offset, cy + dy * offset, z],
                    normal: normalized([dx * sin, dy * sin, z_sign * cos]),
                });
            }
        }

        let m = outline.len() as u32;
        let ring_count = rings.len() as u32;
        let mut indices = Vec::with_capacity(((ring_count - 1) * m * 6 + 2 * m * 3) as usize);
        for k in 0..ring_count - 1 {
            for j in 0..m {
                let j1 = (j + 1) % m;
                let a = k * m + j;
                let b = k * m + j1;
                let c = (k + 1) * m + j1;
                let d = (k + 1) * m + j;
                indices.extend_from_slice(&[a, b, c, a, c, d]);
            }
        }

        let front_z = rings[0].1;
        let back_z = rings[rings.len() - 1].1;
        let front_center = vertices.len() as u32;
        vertices.push(ModelVertex {
            position: [0.0, 0.0, front_z],
            normal: [0.0, 0.0, -1.0],
        });
        let back_center = vertices.len() as u32;
        vertices.push(ModelVertex {
            position: [0.0, 0.0, back_z],
            normal: [0.0, 0.0, 1.0],
        });
        let last_ring = (ring_count - 1) * m;
        for j in 0..m {
            let j1 = (j + 1) % m;
            indices.extend_from_slice(&[front_center, j1, j]);
            indices.extend_from_slice(&[back_center, last_ring + j, last_ring + j1]);
        }

        let mut mesh = MeshData { vertices, indices };
        mesh.center();
        Ok(mesh)
    }
}

fn normalized(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len <= f32::EPSILON {
        return [0.0, 0.0, 1.0];
    }
    [v[0] / len, v[1] / len, v[2] / len]
}

/// CPU-side triangle mesh, uploaded once with [`crate::resources::mesh::upload_mesh`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Axis-aligned bounds as (min, max). Empty meshes report the origin.
    pub fn bounding_box(&self) -> ([f32; 3], [f32; 3]) {
        let Some(first) = self.vertices.first() else {
            return ([0.0; 3], [0.0; 3]);
        };
        self.vertices
            .iter()
            .fold((first.position, first.position), |(mut min, mut max), v| {
                for axis in 0..3 {
                    min[axis] = min[axis].min(v.position[axis]);
                    max[axis] = max[axis].max(v.position[axis]);
                }
                (min, max)
            })
    }

    /// Translates the mesh so its bounding-box centroid sits at the origin and
    /// returns the translation that was applied.
    pub fn center(&mut self) -> [f32; 3] {
        let (min, max) = self.bounding_box();
        let offset = [
            -(min[0] + max[0]) / 2.0,
            -(min[1] + max[1]) / 2.0,
            -(min[2] + max[2]) / 2.0,
        ];
        for v in self.vertices.iter_mut() {
            for axis in 0..3 {
                v.position[axis] += offset[axis];
            }
        }
        offset
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct GeometryKey([u32; 4], u32);

impl From<&RoundedBox> for GeometryKey {
    fn from(params: &RoundedBox) -> Self {
        GeometryKey(
            [
                params.width.to_bits(),
                params.height.to_bits(),
                params.depth.to_bits(),
                params.corner_radius.to_bits(),
            ],
            params.smoothness,
        )
    }
}

/// Builds each distinct parameter set once and shares the result.
#[derive(Debug, Default)]
pub struct GeometryCache {
    ids: HashMap<GeometryKey, MeshId>,
    meshes: Vec<Arc<MeshData>>,
    builds: usize,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(&mut self, params: &RoundedBox) -> Result<(MeshId, Arc<MeshData>), PuzzleError> {
        let key = GeometryKey::from(params);
        if let Some(id) = self.ids.get(&key) {
            return Ok((*id, self.meshes[id.0].clone()));
        }
        let mesh = Arc::new(params.build()?);
        self.builds += 1;
        let id = MeshId(self.meshes.len());
        self.meshes.push(mesh.clone());
        self.ids.insert(key, id);
        log::debug!(
            "built rounded box {:?}: {} vertices, {} triangles",
            params,
            mesh.vertices.len(),
            mesh.triangle_count()
        );
        Ok((id, mesh))
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Arc<MeshData>> {
        self.meshes.get(id.0)
    }

    /// How many times geometry was actually generated.
    pub fn builds(&self) -> usize {
        self.builds
    }
}
