#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    Linear,
    QuadraticIn,
    QuadraticOut,
    /// Accelerates through the first half, decelerates through the second.
    #[default]
    QuadraticInOut,
}

impl Easing {
    /// Eased progress for `t` in [0, 1]; inputs outside are clamped.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadraticIn => t * t,
            Easing::QuadraticOut => t * (2.0 - t),
            Easing::QuadraticInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let u = 2.0 * t - 1.0;
                    -0.5 * (u * (u - 2.0) - 1.0)
                }
            }
        }
    }
}
