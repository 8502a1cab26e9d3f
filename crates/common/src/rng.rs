//! Seed derivation and the deterministic float stream every component draws from.

use serde::{Deserialize, Serialize};

/// A 32-bit run seed derived from the theme name.
pub type Seed = u32;

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;
const MULBERRY_INCREMENT: u32 = 0x6d2b_79f5;

/// FNV-1a fold over the UTF-8 bytes of `s`.
pub fn seed_from_str(s: &str) -> Seed {
    let mut h = FNV_OFFSET;
    for &b in s.as_bytes() {
        h ^= b as u32;
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

/// Murmur3 finalizer. Spreads nearby seeds apart before they become stream state.
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^ (h >> 16)
}

/// Mulberry32 stream producing uniform floats in `[0, 1)`.
///
/// Same seed and same number of draws always yields the same value; the
/// stream has no other inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomStream {
    state: u32,
}

impl RandomStream {
    pub fn new(seed: Seed) -> Self {
        Self { state: seed }
    }

    /// Stream for one named consumer of a run seed (`"world"`, `"agent"`, ...).
    pub fn derive(seed: Seed, label: &str) -> Self {
        Self::new(fmix32(seed ^ fmix32(seed_from_str(label))))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let a = self.state;
        let mut t = (a ^ (a >> 15)).wrapping_mul(1 | a);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t));
        t ^ (t >> 14)
    }

    /// Next uniform value in `[0, 1)`. Uses the top 24 bits so the result is
    /// exactly representable and never rounds up to 1.0.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform in `[lo, hi)`.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next()
    }

    /// Uniform integer in `[lo, hi]` (inclusive).
    pub fn int_range(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        let span = (i64::from(hi) - i64::from(lo) + 1) as f64;
        let v = i64::from(lo) + (f64::from(self.next()) * span).floor() as i64;
        v.min(i64::from(hi)) as i32
    }

    /// Uniformly chosen element, `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = (self.next() * items.len() as f32) as usize;
        items.get(idx.min(items.len() - 1))
    }

    /// `true` with probability `p`.
    pub fn chance(&mut self, p: f32) -> bool {
        self.next() < p
    }

    /// Uniform angle in `[0, 2π)`.
    pub fn angle(&mut self) -> f32 {
        self.next() * std::f32::consts::TAU
    }
}
