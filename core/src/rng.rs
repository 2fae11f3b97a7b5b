//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through SubsystemRng instances derived
//! from the single master seed stored on the Run record.
//!
//! Each stream is seeded from (master_seed, slot, tick, salt), so:
//!   - Adding a new container never changes existing containers' streams.
//!   - Two commands issued in the same tick draw from different streams.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use uuid::Uuid;

/// A named, deterministic RNG for a single container.
pub struct SubsystemRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SubsystemRng {
    pub fn new(seed: u64) -> Self {
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.next_u64() % n
    }

    /// Roll an integer in [lo, hi].
    pub fn range_inclusive(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64_below(hi.saturating_sub(lo) + 1)
    }

    /// Roll a float in [lo, hi).
    pub fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick one element uniformly. `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.next_u64_below(items.len() as u64) as usize;
        items.get(idx)
    }

    /// A v4-shaped UUID built from this stream, as a string id.
    pub fn next_id(&mut self) -> String {
        self.next_uuid().to_string()
    }

    pub fn next_uuid(&mut self) -> Uuid {
        use rand::RngCore;
        let mut bytes = [0u8; 16];
        self.inner.fill_bytes(&mut bytes);
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }
}

/// All container RNGs for a single run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_subsystem_at_tick(&self, slot: SubsystemSlot, tick: u64) -> SubsystemRng {
        self.stream(slot, tick, 0)
    }

    /// A stream for (slot, tick, salt). Commands pass a per-tick sequence
    /// number as the salt.
    pub fn stream(&self, slot: SubsystemSlot, tick: u64, salt: u64) -> SubsystemRng {
        let mut seed = self.master_seed ^ (slot as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        seed ^= tick.wrapping_mul(0xbf58_476d_1ce4_e5b9);
        seed ^= salt.wrapping_mul(0x94d0_49bb_1331_11eb);
        SubsystemRng::new(seed).with_name(slot.name())
    }
}

/// Stable slot assignments.
/// NEVER reorder or remove entries. Append only.
/// Reordering changes every container's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum SubsystemSlot {
    Company = 0,
    Team = 1,
    Product = 2,
    Marketing = 3,
    Investor = 4,
    Achievement = 5,
    RandomEvent = 6,
    Command = 7,
    // Add new slots here. Append only.
}

impl SubsystemSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Team => "team",
            Self::Product => "product",
            Self::Marketing => "marketing",
            Self::Investor => "investor",
            Self::Achievement => "achievement",
            Self::RandomEvent => "random_event",
            Self::Command => "command",
        }
    }
}
