//! Seeded linear congruential generator shared by the synthetic models.
//!
//! The recurrence is pinned: `seed = (seed * 9301 + 49297) mod 233280` and
//! `next = seed / 233280`. Changing it changes every published buzz series.

const MULTIPLIER: u64 = 9301;
const INCREMENT: u64 = 49297;
const MODULUS: u64 = 233_280;

#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        // (a * s + c) mod m only depends on s mod m.
        Self {
            seed: seed % MODULUS,
        }
    }

    /// Generator for `seed + offset`, reduced first so large seeds cannot overflow.
    pub fn with_offset(seed: u64, offset: u64) -> Self {
        Self::new(seed % MODULUS + offset)
    }

    pub fn next_f64(&mut self) -> f64 {
        self.seed = (self.seed * MULTIPLIER + INCREMENT) % MODULUS;
        self.seed as f64 / MODULUS as f64
    }

    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Index in `0..len`, `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        ((self.next_f64() * len as f64).floor() as usize).min(len - 1)
    }
}

/// Seed derived from an identifier: the sum of its UTF-16 code units.
pub fn seed_from_id(id: &str) -> u64 {
    id.encode_utf16().map(u64::from).sum()
}
