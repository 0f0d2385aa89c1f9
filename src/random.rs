//! Xorshift128 pseudorandom engine.
//!
//! Marsaglia's "xor128" generator (Xorshift RNGs, 2003, p. 5) over four 32-bit
//! words, with uniform and Box-Muller Gaussian draws layered on top. The stream
//! is fully determined by the 128-bit seed.

use crate::error::MinimizerError;
use rand::rand_core::impls;
use rand::{RngCore, SeedableRng};
use std::f64::consts::TAU;
use tracing::warn;

/// A 128-bit generator state as four 32-bit words.
pub type Seed = [u32; 4];

/// 2^32, maps a `u32` draw onto [0, 1).
const UINT32_RANGE: f64 = 4_294_967_296.0;

/// Draw a fresh seed from an injected entropy provider.
///
/// ```
/// use rand::SeedableRng;
/// use snes::random::{generate_seed, Xorshift128};
///
/// let mut entropy = rand::rngs::StdRng::seed_from_u64(7);
/// let mut rng = Xorshift128::new(generate_seed(&mut entropy));
/// assert!(rng.next_uniform() < 1.0);
/// ```
pub fn generate_seed<R>(entropy: &mut R) -> Seed
where
    R: RngCore + ?Sized,
{
    std::array::from_fn(|_| entropy.next_u32())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xorshift128 {
    state: Seed,
}

impl Xorshift128 {
    pub fn new(seed: Seed) -> Self {
        if seed == [0; 4] {
            warn!("xorshift128 seeded with an all-zero state; every draw will be zero");
        }
        Xorshift128 { state: seed }
    }

    /// Seed from a word slice, which must hold exactly four words.
    pub fn from_words(words: &[u32]) -> Result<Self, MinimizerError> {
        let seed: Seed = words.try_into().map_err(|_| {
            MinimizerError::Configuration(format!(
                "expected 128 bit state, got {} bits",
                words.len() * 32
            ))
        })?;
        Ok(Xorshift128::new(seed))
    }

    /// Seed from raw bytes, read as four little-endian words. The slice must be
    /// exactly 16 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MinimizerError> {
        let bytes: [u8; 16] = bytes.try_into().map_err(|_| {
            MinimizerError::Configuration(format!(
                "expected 128 bit state, got {} bits",
                bytes.len() * 8
            ))
        })?;
        Ok(Xorshift128::new(words_from_le_bytes(bytes)))
    }

    pub fn state(&self) -> Seed {
        self.state
    }

    pub fn set_state(&mut self, seed: Seed) {
        *self = Xorshift128::new(seed);
    }

    /// Advance the state and return the new first word.
    pub fn next_uint32(&mut self) -> u32 {
        let s = self.state[0];
        let mut t = self.state[3];
        self.state[3] = self.state[2];
        self.state[2] = self.state[1];
        self.state[1] = s;
        t ^= t << 11;
        t ^= t >> 8;
        self.state[0] = t ^ s ^ (s >> 19);
        self.state[0]
    }

    /// Uniform draw in [0, 1).
    pub fn next_uniform(&mut self) -> f64 {
        f64::from(self.next_uint32()) / UINT32_RANGE
    }

    /// Standard normal draw.
    pub fn next_gaussian(&mut self) -> f64 {
        self.next_gaussian_with(0.0, 1.0)
    }

    /// Normal draw via Box-Muller, consuming two uniforms per call.
    ///
    /// A first uniform of exactly 0 (probability 2^-32) yields a non-finite
    /// result; the draw is not clamped so the stream stays reproducible.
    pub fn next_gaussian_with(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_uniform();
        let u2 = self.next_uniform();
        mean + std_dev * ((-2.0 * u1.ln()).sqrt() * (TAU * u2).cos())
    }
}

fn words_from_le_bytes(bytes: [u8; 16]) -> Seed {
    std::array::from_fn(|i| {
        u32::from_le_bytes([
            bytes[4 * i],
            bytes[4 * i + 1],
            bytes[4 * i + 2],
            bytes[4 * i + 3],
        ])
    })
}

impl RngCore for Xorshift128 {
    fn next_u32(&mut self) -> u32 {
        self.next_uint32()
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        impls::fill_bytes_via_next(self, dst)
    }
}

impl SeedableRng for Xorshift128 {
    type Seed = [u8; 16];

    fn from_seed(seed: Self::Seed) -> Self {
        Xorshift128::new(words_from_le_bytes(seed))
    }
}
