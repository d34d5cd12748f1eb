use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use cgmath::{Euler, Quaternion, Rad};
use puzzle_cube::{
    PuzzleConfig, PuzzleContext,
    data_structures::scene_graph::{NodeId, SceneGraph},
    frame::CompositeRenderer,
    puzzle::random::RandomSource,
};

/// Replays a fixed list of values, then repeats the last one (or 0.0).
#[derive(Clone, Debug, Default)]
pub struct ScriptedRandom {
    values: Rc<RefCell<VecDeque<f64>>>,
    last: f64,
    drawn: Rc<RefCell<usize>>,
}

impl ScriptedRandom {
    pub fn new(values: &[f64]) -> Self {
        Self {
            values: Rc::new(RefCell::new(values.iter().copied().collect())),
            last: values.last().copied().unwrap_or(0.0),
            drawn: Rc::new(RefCell::new(0)),
        }
    }

    /// How many values have been drawn so far, across clones.
    pub fn drawn(&self) -> usize {
        *self.drawn.borrow()
    }

    pub fn push(&self, values: &[f64]) {
        self.values.borrow_mut().extend(values.iter().copied());
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        *self.drawn.borrow_mut() += 1;
        let next = self.values.borrow_mut().pop_front();
        if let Some(value) = next {
            self.last = value;
        }
        self.last
    }
}

/// One move's draws in scheduler order: reorientation axis (> 0.5 means Y),
/// layer, direction (> 0.5 means negative), pause.
pub fn move_script(axis: f64, layer: f64, direction: f64, pause: f64) -> [f64; 4] {
    [axis, layer, direction, pause]
}

/// What a watched node looked like when the composite was drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeSnapshot {
    pub euler: Euler<Rad<f32>>,
    pub world_rotation: Quaternion<f32>,
    /// Parent world rotation times local rotation, as of the same moment.
    pub composed_rotation: Quaternion<f32>,
}

/// Records every composite call instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub composites: usize,
    pub cell_counts: Vec<usize>,
    pub watched: Vec<NodeId>,
    /// One entry per composite, one snapshot per watched node.
    pub snapshots: Vec<Vec<NodeSnapshot>>,
}

impl RecordingRenderer {
    pub fn watching(nodes: &[NodeId]) -> Self {
        Self {
            watched: nodes.to_vec(),
            ..Self::default()
        }
    }
}

impl CompositeRenderer for RecordingRenderer {
    fn composite(&mut self, scene: &SceneGraph) -> anyhow::Result<()> {
        self.composites += 1;
        self.cell_counts.push(scene.cell_world_transforms().len());
        let snapshot = self
            .watched
            .iter()
            .filter_map(|id| {
                let node = scene.node(*id)?;
                let parent_world = node
                    .parent()
                    .and_then(|parent| scene.node(parent))
                    .map(|parent| parent.world().rotation)
                    .unwrap_or(Quaternion::new(1.0, 0.0, 0.0, 0.0));
                Some(NodeSnapshot {
                    euler: node.euler(),
                    world_rotation: node.world().rotation,
                    composed_rotation: parent_world * node.local().rotation,
                })
            })
            .collect();
        self.snapshots.push(snapshot);
        Ok(())
    }
}

/// A small, fast configuration: short moves, no pauses.
pub fn quick_config() -> PuzzleConfig {
    PuzzleConfig {
        move_duration: instant::Duration::from_millis(100),
        pause_min: instant::Duration::ZERO,
        pause_max: instant::Duration::ZERO,
        ..PuzzleConfig::default()
    }
}

pub fn scripted_puzzle(config: &PuzzleConfig, script: &ScriptedRandom) -> PuzzleContext {
    PuzzleContext::with_random(config, Box::new(script.clone()))
        .expect("the puzzle should assemble")
}

/// Angles equal modulo float noise.
pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {} to be close to {}",
        actual,
        expected
    );
}

#[cfg(feature = "integration-tests")]
pub mod gpu {
    use puzzle_cube::{context, data_structures::texture::Texture};

    pub async fn headless_device() -> anyhow::Result<(wgpu::Device, wgpu::Queue)> {
        let instance = context::create_instance();
        let (_, device, queue) = context::request_device(&instance, None).await?;
        Ok((device, queue))
    }

    /// Copies an `Rgba8` texture back to the CPU. Rows are padded to wgpu's
    /// copy alignment on the GPU side and unpadded here.
    pub async fn read_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &Texture,
    ) -> anyhow::Result<image::RgbaImage> {
        let [width, height] = texture.size;
        let unpadded = 4 * width;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;

        let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            size: (padded * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            label: Some("readback"),
            mapped_at_creation: false,
        });
        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));

        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        let buffer_slice = output_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).unwrap();
        });
        device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(std::time::Duration::from_secs(3)),
        })?;
        rx.receive()
            .await
            .ok_or_else(|| anyhow::anyhow!("readback channel closed"))??;

        let data = buffer_slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded * height) as usize);
        for row in data.chunks(padded as usize) {
            pixels.extend_from_slice(&row[..unpadded as usize]);
        }
        drop(data);
        output_buffer.unmap();

        image::RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| anyhow::anyhow!("readback size mismatch"))
    }
}
