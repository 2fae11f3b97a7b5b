//! Deterministic names for recruits and investors.
//!
//! Same RNG stream = same names, so recruit pools and investor lists
//! replay identically for a given seed.

use crate::rng::SubsystemRng;

pub struct NameGenerator;

impl NameGenerator {
    /// "First Last".
    pub fn person_name(rng: &mut SubsystemRng) -> String {
        let first = Self::pick(rng, FIRST_NAMES);
        let last = Self::pick(rng, LAST_NAMES);
        format!("{first} {last}")
    }

    /// An investor firm, e.g. "Summit Ventures" or "Okafor Capital Partners".
    pub fn firm_name(rng: &mut SubsystemRng) -> String {
        let suffix = Self::pick(rng, FIRM_SUFFIXES);
        if rng.chance(0.5) {
            format!("{} {suffix}", Self::pick(rng, FIRM_PREFIXES))
        } else {
            format!("{} {suffix}", Self::pick(rng, LAST_NAMES))
        }
    }

    fn pick(rng: &mut SubsystemRng, names: &[&'static str]) -> &'static str {
        rng.pick(names).copied().unwrap_or("Unknown")
    }
}

const FIRST_NAMES: &[&str] = &[
    "Alex", "Jordan", "Taylor", "Morgan", "Casey", "Riley", "Jamie", "Avery",
    "Quinn", "Skyler", "Devon", "Reese", "Rowan", "Sam", "Charlie", "Emerson",
    "Priya", "Wei", "Mateo", "Aisha", "Kenji", "Sofia", "Olu", "Lena",
    "Ravi", "Ines", "Tomas", "Yuki", "Amara", "Noor", "Felix", "Mira",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Garcia", "Chen", "Patel", "Nguyen", "Kim", "Okafor",
    "Rossi", "Silva", "Novak", "Kowalski", "Haddad", "Tanaka", "Schmidt", "Dubois",
    "Murphy", "Lopez", "Singh", "Ivanova", "Mensah", "Andersen", "Costa", "Reyes",
];

const FIRM_PREFIXES: &[&str] = &[
    "Summit", "Horizon", "Northstar", "Blue Harbor", "Granite", "Lighthouse",
    "Redwood", "Catalyst", "Meridian", "Evergreen", "Foundry", "Keystone",
];

const FIRM_SUFFIXES: &[&str] = &[
    "Ventures", "Capital", "Partners", "Capital Partners", "Fund", "Investments",
];
