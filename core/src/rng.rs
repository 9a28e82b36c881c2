//! Deterministic random number generation.
//!
//! RULE: scoring code never calls a platform RNG directly.
//! All randomness flows through a `RandomSource`, normally a
//! `RiskRng` stream derived from the run's master seed.
//!
//! Each consumer gets its own stream, seeded from
//! (master_seed XOR slot-derived salt). This means:
//!   - Adding a new slot never changes existing streams.
//!   - Proximity draws never shift the perturbation sequence.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// The injectable randomness capability.
pub trait RandomSource {
    /// Roll a float in [0.0, 1.0).
    fn next_f64(&mut self) -> f64;

    /// Roll a float in [lo, hi).
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// A named, deterministic RNG stream.
pub struct RiskRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl RiskRng {
    /// Create a stream from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

impl RandomSource for RiskRng {
    fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// All streams for a single run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    /// Bank for an unseeded run. The drawn seed is returned by
    /// `master_seed()` so the run can be replayed.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn stream(&self, slot: StreamSlot) -> RiskRng {
        RiskRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries, only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    FloodRisk = 0,
    Proximity = 1,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FloodRisk => "flood_risk",
            Self::Proximity => "proximity",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let bank_a = RngBank::new(12345);
        let bank_b = RngBank::new(12345);
        let mut a = bank_a.stream(StreamSlot::FloodRisk);
        let mut b = bank_b.stream(StreamSlot::FloodRisk);

        for _ in 0..32 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn slots_are_independent_streams() {
        let bank = RngBank::new(12345);
        let mut risk = bank.stream(StreamSlot::FloodRisk);
        let mut prox = bank.stream(StreamSlot::Proximity);

        let any_different = (0..8).any(|_| risk.next_f64() != prox.next_f64());
        assert!(any_different, "Slots should not share a sequence");
        assert_eq!(risk.name, "flood_risk");
    }

    #[test]
    fn uniform_stays_in_range() {
        let mut rng = RngBank::new(7).stream(StreamSlot::FloodRisk);
        for _ in 0..1_000 {
            let x = rng.uniform(-0.05, 0.05);
            assert!((-0.05..0.05).contains(&x), "Out of range: {x}");
        }
    }
}
