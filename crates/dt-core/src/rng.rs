//! Deterministic per-agent and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each agent gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (agent.seed_component() * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive identities uniformly across the seed space.
//! Nothing in the core negotiation protocol itself consumes randomness —
//! variant generation, scoring, and schedule insertion are all pure
//! functions of their inputs. `AgentRng`/`SimRng` exist for the one place
//! the spec allows non-determinism: the dispatcher may shuffle per-tick
//! agent processing order "to avoid bias" (§4.G), and a host's own scenario
//! jitter hooks, should it want any.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentAddress;

const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG.
pub struct AgentRng(SmallRng);

impl AgentRng {
    pub fn new(global_seed: u64, agent: AgentAddress) -> Self {
        let seed = global_seed ^ agent.seed_component().wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for global operations (e.g. randomizing the
/// dispatcher's per-tick agent processing order).
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OrderId;

    #[test]
    fn deterministic_given_same_seed_and_address() {
        let addr = AgentAddress::Order(OrderId(7));
        let mut a = AgentRng::new(42, addr);
        let mut b = AgentRng::new(42, addr);
        let av: u32 = a.gen_range(0..1_000_000);
        let bv: u32 = b.gen_range(0..1_000_000);
        assert_eq!(av, bv);
    }

    #[test]
    fn different_addresses_diverge() {
        let mut a = AgentRng::new(42, AgentAddress::Order(OrderId(1)));
        let mut b = AgentRng::new(42, AgentAddress::Order(OrderId(2)));
        let av: u32 = a.gen_range(0..u32::MAX);
        let bv: u32 = b.gen_range(0..u32::MAX);
        assert_ne!(av, bv);
    }

    #[test]
    fn shuffle_is_deterministic() {
        let mut rng1 = SimRng::new(1);
        let mut rng2 = SimRng::new(1);
        let mut v1 = vec![1, 2, 3, 4, 5];
        let mut v2 = vec![1, 2, 3, 4, 5];
        rng1.shuffle(&mut v1);
        rng2.shuffle(&mut v2);
        assert_eq!(v1, v2);
    }
}
