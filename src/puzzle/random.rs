//! Randomness behind the layer moves.
//!
//! The scheduler only sees [`RandomSource`], so tests can replace the
//! generator with a scripted or fixed-seed one.

pub trait RandomSource {
    /// Uniform in [0, 1).
    fn next_f64(&mut self) -> f64;

    /// Uniform in [0, len); `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize {
        ((self.next_f64() * len as f64) as usize).min(len.saturating_sub(1))
    }

    fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_f64()
    }
}

fn splitmix64(mut value: u64) -> u64 {
    value = value.wrapping_add(0x9e3779b97f4a7c15);
    let mut z = value;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// A splitmix64 stream. Cheap, seedable and good enough for picking moves.
#[derive(Clone, Debug)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seeds from the OS, falling back to the clock if that is unavailable.
    pub fn from_entropy() -> Self {
        match getrandom::u64() {
            Ok(seed) => Self::new(seed),
            Err(err) => {
                log::warn!("no OS randomness ({}), seeding moves from the clock", err);
                Self::from_clock()
            }
        }
    }

    /// Seeds from the wall clock.
    pub fn from_clock() -> Self {
        let since_epoch = instant::SystemTime::now()
            .duration_since(instant::SystemTime::UNIX_EPOCH)
            .unwrap_or_default();
        Self::new(splitmix64(since_epoch.as_nanos() as u64))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        splitmix64(self.state)
    }
}

impl RandomSource for SplitMix64 {
    fn next_f64(&mut self) -> f64 {
        // top 53 bits fill the mantissa exactly
        (self.next_u64() >> 11) as f64 / ((1u64 << 53) as f64)
    }
}
