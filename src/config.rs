//! Runtime configuration.
//!
//! [`PuzzleConfig`] collects every tunable of the cube: its order and cell
//! geometry, move timing, the per-frame spin, drag sensitivity, camera,
//! material and the composite/bloom settings. `Default` gives the stock
//! 3×3×3 look.

use instant::Duration;

use crate::error::PuzzleError;

/// Upper bound on cells per side. 16³ cells is already well past what reads as
/// a puzzle cube on screen.
pub const MAX_CUBES_PER_SIDE: usize = 16;

#[derive(Clone, Debug)]
pub struct PuzzleConfig {
    pub cubes_per_side: usize,
    /// Edge length of a single cell.
    pub cell_size: f32,
    /// Grid spacing as a multiple of `cell_size`; values above 1 leave a seam.
    pub gap_factor: f32,
    pub corner_radius: f32,
    /// Curve segments per rounded corner.
    pub smoothness: u32,
    pub move_duration: Duration,
    /// Random pre-delay before each move is drawn from `[pause_min, pause_max)`.
    pub pause_min: Duration,
    pub pause_max: Duration,
    /// Radians added to each axis of the inner wrapper every frame.
    pub spin_per_frame: f32,
    pub drag_degrees_per_pixel: f32,
    /// Number of independent layer-rotation chains started on mount.
    pub chains: usize,
    /// Fixed seed for the move generator; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub composite_size: [u32; 2],
    pub camera: CameraConfig,
    pub material: MaterialConfig,
    pub bloom: BloomConfig,
    /// Id of the DOM element the canvas is appended to on the web.
    pub container_id: String,
    pub clear_colour: wgpu::Color,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            cubes_per_side: 3,
            cell_size: 1.0,
            gap_factor: 1.01,
            corner_radius: 0.15,
            smoothness: 10,
            move_duration: Duration::from_millis(3000),
            pause_min: Duration::ZERO,
            pause_max: Duration::from_millis(2000),
            spin_per_frame: 0.005,
            drag_degrees_per_pixel: 1.0,
            chains: 1,
            seed: None,
            composite_size: [1200, 1200],
            camera: CameraConfig::default(),
            material: MaterialConfig::default(),
            bloom: BloomConfig::default(),
            container_id: "cube".to_string(),
            clear_colour: wgpu::Color::BLACK,
        }
    }
}

impl PuzzleConfig {
    /// Checks everything that is not already guarded by geometry validation.
    pub fn validate(&self) -> Result<(), PuzzleError> {
        if self.cubes_per_side == 0 || self.cubes_per_side > MAX_CUBES_PER_SIDE {
            return Err(PuzzleError::InvalidOrder {
                got: self.cubes_per_side,
                max: MAX_CUBES_PER_SIDE,
            });
        }
        if !(self.gap_factor.is_finite() && self.gap_factor > 0.0) {
            return Err(PuzzleError::InvalidConfig(format!(
                "gap factor must be positive, got {}",
                self.gap_factor
            )));
        }
        if self.pause_max < self.pause_min {
            return Err(PuzzleError::InvalidConfig(format!(
                "pause range is empty: {:?}..{:?}",
                self.pause_min, self.pause_max
            )));
        }
        if self.composite_size[0] == 0 || self.composite_size[1] == 0 {
            return Err(PuzzleError::InvalidConfig(
                "composite size must be non-zero".to_string(),
            ));
        }
        if !self.spin_per_frame.is_finite() || !self.drag_degrees_per_pixel.is_finite() {
            return Err(PuzzleError::InvalidConfig(
                "spin and drag sensitivity must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Distance between neighbouring cell centres.
    pub fn spacing(&self) -> f32 {
        self.cell_size * self.gap_factor
    }
}

#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    /// The camera sits on +Z at this distance, looking at the origin.
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy_degrees: 75.0,
            znear: 0.1,
            zfar: 1000.0,
            distance: 12.0,
        }
    }
}

/// The single material every cell shares.
#[derive(Clone, Debug)]
pub struct MaterialConfig {
    /// sRGB hex colour, e.g. `0x424242`.
    pub colour: u32,
    pub metalness: f32,
    pub roughness: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            colour: 0x424242,
            metalness: 1.0,
            roughness: 0.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BloomConfig {
    pub intensity: f32,
    pub luminance_threshold: f32,
    pub luminance_smoothing: f32,
    /// Blur through a downsample/upsample mip chain. When off only the
    /// prefiltered half-resolution image is added back.
    pub mipmap_blur: bool,
    pub levels: u32,
    /// Weight of each coarser level when it is added back on the way up.
    pub radius: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            intensity: 0.7,
            luminance_threshold: 0.0,
            luminance_smoothing: 0.03,
            mipmap_blur: true,
            levels: 6,
            radius: 0.85,
        }
    }
}

impl BloomConfig {
    /// Clamp values into their usable ranges.
    pub fn sanitize(&mut self) {
        self.intensity = self.intensity.max(0.0);
        self.luminance_threshold = self.luminance_threshold.clamp(0.0, 1.0);
        self.luminance_smoothing = self.luminance_smoothing.clamp(0.0, 1.0);
        self.levels = self.levels.clamp(1, 10);
        self.radius = self.radius.clamp(0.0, 1.0);
    }
}

/// Converts a `0xRRGGBB` sRGB colour into linear RGB.
pub fn srgb_hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0)]
}
