//! Team roster and recruit marketplace.
//!
//! Morale and energy are clamped to [0, 100] at every mutation, so stored
//! state never holds an out-of-range value.

use crate::{
    command::CommandResult,
    config::TeamConfig,
    name_generator::NameGenerator,
    rng::SubsystemRng,
    snapshot::TeamStats,
    types::{EntityId, Tick},
};
use serde::{Deserialize, Serialize};

pub const MORALE_MAX: f64 = 100.0;
pub const ENERGY_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Coding,
    Design,
    Marketing,
    Business,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SkillVector {
    pub coding:    f64,
    pub design:    f64,
    pub marketing: f64,
    pub business:  f64,
}

impl SkillVector {
    pub fn new(coding: f64, design: f64, marketing: f64, business: f64) -> Self {
        Self { coding, design, marketing, business }
    }

    pub fn get(&self, skill: Skill) -> f64 {
        match skill {
            Skill::Coding => self.coding,
            Skill::Design => self.design,
            Skill::Marketing => self.marketing,
            Skill::Business => self.business,
        }
    }

    /// Skills never drop below zero.
    pub fn add(&mut self, skill: Skill, amount: f64) {
        let slot = match skill {
            Skill::Coding => &mut self.coding,
            Skill::Design => &mut self.design,
            Skill::Marketing => &mut self.marketing,
            Skill::Business => &mut self.business,
        };
        *slot = (*slot + amount).max(0.0);
    }
}

/// Someone on the marketplace, not yet hired.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub id:                     EntityId,
    pub name:                   String,
    pub skills:                 SkillVector,
    pub personality:            Vec<String>,
    pub specialty:              String,
    pub salary_expectation:     f64,
    pub exploitation_tolerance: f64,
}

impl Candidate {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>, salary_expectation: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            skills: SkillVector::new(20.0, 20.0, 20.0, 20.0),
            personality: Vec::new(),
            specialty: "Backend".to_string(),
            salary_expectation,
            exploitation_tolerance: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    pub id:                     EntityId,
    pub name:                   String,
    pub skills:                 SkillVector,
    pub personality:            Vec<String>,
    pub specialty:              String,
    pub salary:                 f64,
    pub morale:                 f64,
    pub energy:                 f64,
    pub exploitation_tolerance: f64,
    pub hire_tick:              Tick,
}

impl Employee {
    /// Output multiplier in [0, 1].
    pub fn productivity(&self) -> f64 {
        (self.morale / MORALE_MAX) * (self.energy / ENERGY_MAX)
    }

    fn adjust_morale(&mut self, delta: f64) {
        self.morale = clamp_unit(self.morale + delta, self.morale);
    }

    fn adjust_energy(&mut self, delta: f64) {
        self.energy = clamp_unit(self.energy + delta, self.energy);
    }
}

fn clamp_unit(value: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TeamRoster {
    employees: Vec<Employee>,
    recruits:  Vec<Candidate>,
}

impl TeamRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn recruits(&self) -> &[Candidate] {
        &self.recruits
    }

    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    pub fn headcount(&self) -> usize {
        self.employees.len()
    }

    // ── Commands ───────────────────────────────────────────────

    /// Hire `candidate` if there is a free seat. The new hire starts at full
    /// morale and energy. The caller books the salary as an expense.
    pub fn hire(&mut self, candidate: Candidate, capacity: usize, tick: Tick) -> CommandResult {
        if self.employees.len() >= capacity {
            return CommandResult::fail("Office at maximum capacity!");
        }
        if self.employee(&candidate.id).is_some() {
            return CommandResult::fail("Already on the team");
        }
        if !candidate.salary_expectation.is_finite() || candidate.salary_expectation < 0.0 {
            return CommandResult::fail("Invalid salary");
        }
        let id = candidate.id.clone();
        self.recruits.retain(|r| r.id != id);
        self.employees.push(Employee {
            id:                     candidate.id,
            name:                   candidate.name,
            skills:                 candidate.skills,
            personality:            candidate.personality,
            specialty:              candidate.specialty,
            salary:                 candidate.salary_expectation,
            morale:                 MORALE_MAX,
            energy:                 ENERGY_MAX,
            exploitation_tolerance: candidate.exploitation_tolerance.clamp(0.0, 100.0),
            hire_tick:              tick,
        });
        CommandResult::ok_with_id(id)
    }

    /// Hire from the current marketplace by id.
    pub fn hire_recruit(&mut self, recruit_id: &str, capacity: usize, tick: Tick) -> CommandResult {
        match self.recruits.iter().find(|r| r.id == recruit_id) {
            Some(candidate) => {
                let candidate = candidate.clone();
                self.hire(candidate, capacity, tick)
            }
            None => CommandResult::fail("Recruit not found"),
        }
    }

    /// Remove an employee. Returns the departing record so the caller can
    /// drop the salary and apply the reputation penalty.
    pub fn fire(&mut self, employee_id: &str) -> Option<Employee> {
        let idx = self.employees.iter().position(|e| e.id == employee_id)?;
        Some(self.employees.remove(idx))
    }

    pub fn train(&mut self, employee_id: &str, skill: Skill, amount: f64) -> CommandResult {
        if !amount.is_finite() || amount <= 0.0 {
            return CommandResult::fail("Training amount must be positive");
        }
        match self.employees.iter_mut().find(|e| e.id == employee_id) {
            Some(e) => {
                e.skills.add(skill, amount);
                CommandResult::ok_with_id(employee_id)
            }
            None => CommandResult::fail("Team member not found"),
        }
    }

    /// Shift every employee's morale by `delta`, clamped.
    pub fn boost_morale(&mut self, delta: f64) {
        for e in &mut self.employees {
            e.adjust_morale(delta);
        }
    }

    /// Replace the marketplace with 2–4 fresh candidates. Higher employer
    /// reputation attracts stronger candidates.
    pub fn generate_recruits(
        &mut self,
        employer_reputation: f64,
        config: &TeamConfig,
        rng:    &mut SubsystemRng,
    ) -> usize {
        let bonus = (employer_reputation.clamp(0.0, 100.0) / 100.0 * config.reputation_skill_bonus).floor();
        let count = rng.range_inclusive(config.min_recruits, config.max_recruits);
        let skill = |rng: &mut SubsystemRng| {
            rng.range_inclusive(config.recruit_skill_min, config.recruit_skill_max) as f64 + bonus
        };

        self.recruits = (0..count)
            .map(|_| {
                let skills = SkillVector::new(skill(rng), skill(rng), skill(rng), skill(rng));
                let trait_count = rng.range_inclusive(2, 3) as usize;
                let mut personality: Vec<String> = Vec::with_capacity(trait_count);
                for _ in 0..trait_count * 8 {
                    if personality.len() >= trait_count {
                        break;
                    }
                    if let Some(t) = rng.pick(&config.personalities) {
                        if !personality.contains(t) {
                            personality.push(t.clone());
                        }
                    }
                }
                Candidate {
                    id: rng.next_id(),
                    name: NameGenerator::person_name(rng),
                    skills,
                    personality,
                    specialty: rng.pick(&config.specialties).cloned().unwrap_or_default(),
                    salary_expectation: rng.range_inclusive(config.min_salary, config.max_salary) as f64,
                    exploitation_tolerance: rng.range_inclusive(
                        config.min_exploitation_tolerance,
                        config.max_exploitation_tolerance,
                    ) as f64,
                }
            })
            .collect();
        self.recruits.len()
    }

    // ── Hourly recompute ───────────────────────────────────────

    /// One simulated hour of morale and energy drift. `hour` is the hour of
    /// day the clock just rolled into.
    pub fn recompute_hour(&mut self, hour: u32, config: &TeamConfig) {
        let working = hour >= config.work_start_hour && hour < config.work_end_hour;
        let energy_delta = if working {
            -config.energy_decay_per_hour
        } else {
            config.energy_recovery_per_hour
        };
        for e in &mut self.employees {
            let exploitation = 100.0 - e.exploitation_tolerance;
            if exploitation > 0.0 {
                e.adjust_morale(-exploitation * config.exploitation_factor);
            }
            e.adjust_energy(energy_delta);
        }
    }

    /// Productivity-weighted aggregates.
    pub fn stats(&self) -> TeamStats {
        let mut stats = TeamStats::default();
        for e in &self.employees {
            let p = e.productivity();
            stats.coding += e.skills.coding * p;
            stats.design += e.skills.design * p;
            stats.marketing += e.skills.marketing * p;
            stats.business += e.skills.business * p;
            stats.total_salary += e.salary;
            stats.average_morale += e.morale;
            stats.average_energy += e.energy;
        }
        stats.headcount = self.employees.len();
        if stats.headcount > 0 {
            let n = stats.headcount as f64;
            stats.average_morale /= n;
            stats.average_energy /= n;
            stats.min_morale = self
                .employees
                .iter()
                .map(|e| e.morale)
                .fold(MORALE_MAX, f64::min);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, SubsystemSlot};

    #[test]
    fn recruits_scale_with_employer_reputation() {
        let config = TeamConfig::default();
        let mut roster = TeamRoster::new();
        let mut rng = RngBank::new(7).for_subsystem_at_tick(SubsystemSlot::Team, 1);
        let count = roster.generate_recruits(100.0, &config, &mut rng);
        assert!((2..=4).contains(&count));
        for r in roster.recruits() {
            assert!(r.skills.coding >= 30.0 && r.skills.coding <= 59.0);
            assert!(r.salary_expectation >= 1_000.0 && r.salary_expectation <= 3_000.0);
            assert!(r.personality.len() >= 2);
        }
    }

    #[test]
    fn energy_recovers_off_hours() {
        let config = TeamConfig::default();
        let mut roster = TeamRoster::new();
        roster.hire(Candidate::new("e1", "Ada", 1_500.0), 5, 0);
        roster.recompute_hour(10, &config);
        assert_eq!(roster.employees()[0].energy, 99.5);
        roster.recompute_hour(22, &config);
        assert_eq!(roster.employees()[0].energy, 100.0);
    }
}
