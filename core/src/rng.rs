//! Seeded randomness for the synthetic tables.
//!
//! RULE: generator code draws only from DatasetRng, never from thread_rng
//! or the OS. Each table owns a stream derived from the master seed and its
//! DatasetSlot, so regenerating one table leaves the others byte-identical.

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Seed-mixing multiplier (2^64 / golden ratio) spreading slot numbers apart.
const SLOT_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// Sampling helpers over one table's PCG stream.
pub struct DatasetRng {
    slot: DatasetSlot,
    inner: Pcg64Mcg,
}

impl DatasetRng {
    pub fn for_slot(master_seed: u64, slot: DatasetSlot) -> Self {
        let seed = master_seed ^ (slot as u64).wrapping_mul(SLOT_MIX);
        Self {
            slot,
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn slot(&self) -> DatasetSlot {
        self.slot
    }

    /// Uniform in [0, 1).
    pub fn unit(&mut self) -> f64 {
        self.inner.gen()
    }

    /// Uniform in [lo, hi]; `lo` when the range is empty.
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if hi > lo {
            self.inner.gen_range(lo..=hi)
        } else {
            lo
        }
    }

    /// Uniform integer in [lo, hi]; `lo` when the range is empty.
    pub fn range_inclusive(&mut self, lo: u64, hi: u64) -> u64 {
        if hi > lo {
            self.inner.gen_range(lo..=hi)
        } else {
            lo
        }
    }

    /// True with probability `p` (clamped to [0, 1]).
    pub fn chance(&mut self, p: f64) -> bool {
        self.unit() < p.clamp(0.0, 1.0)
    }

    /// Uniform element of `items`; `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.inner)
    }

    /// Exponential draw with the given mean.
    pub fn exponential(&mut self, mean: f64) -> f64 {
        // 1 - u lies in (0, 1], so ln never sees zero.
        -mean * (1.0 - self.unit()).ln()
    }

    /// Poisson draw (Knuth). Fine for the small lambdas used here.
    pub fn poisson(&mut self, lambda: f64) -> u64 {
        let limit = (-lambda).exp();
        let mut k = 0u64;
        let mut p = 1.0;
        loop {
            p *= self.unit();
            if p <= limit {
                return k;
            }
            k += 1;
        }
    }

    /// Beta(a, b) draw for integer shape parameters: the a-th smallest
    /// of a + b - 1 uniforms. Shapes below 1 are raised to 1.
    pub fn beta_int(&mut self, a: u32, b: u32) -> f64 {
        let (a, b) = (a.max(1), b.max(1));
        let mut draws: Vec<f64> = (0..a + b - 1).map(|_| self.unit()).collect();
        draws.sort_by(f64::total_cmp);
        draws[(a - 1) as usize]
    }
}

/// Table slots. The number feeds the seed: append new tables, never renumber.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum DatasetSlot {
    Funnel = 0,
    Behavior = 1,
    Rfm = 2,
    Sales = 3,
}

impl DatasetSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Funnel => "funnel",
            Self::Behavior => "behavior",
            Self::Rfm => "rfm",
            Self::Sales => "sales",
        }
    }
}
