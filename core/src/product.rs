//! Product development: features, bugs, tech stack, releases.
//!
//! Feature lifecycle is Planned -> InProgress -> Completed, one way.
//! `Feature::transition` is the only place status changes.

use crate::{
    command::CommandResult,
    config::{ProductConfig, TechCategory, TechOption},
    error::{SimError, SimResult},
    rng::SubsystemRng,
    snapshot::{ProductSnapshot, TeamStats},
    types::{EntityId, Tick},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MIN_COMPLEXITY: u8 = 1;
pub const MAX_COMPLEXITY: u8 = 5;
/// Progress points per unit of complexity.
pub const POINTS_PER_COMPLEXITY: f64 = 100.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeatureStatus {
    Planned,
    InProgress,
    Completed,
}

impl FeatureStatus {
    pub fn can_transition_to(self, next: FeatureStatus) -> bool {
        matches!(
            (self, next),
            (Self::Planned, Self::InProgress) | (Self::InProgress, Self::Completed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    pub id:             EntityId,
    pub name:           String,
    pub description:    String,
    pub complexity:     u8,
    status:             FeatureStatus,
    /// In [0, ceiling()].
    pub progress:       f64,
    pub dependencies:   Vec<EntityId>,
    pub completed_tick: Option<Tick>,
    /// Version of the release that shipped this feature.
    pub released_in:    Option<String>,
}

impl Feature {
    pub fn status(&self) -> FeatureStatus {
        self.status
    }

    pub fn ceiling(&self) -> f64 {
        f64::from(self.complexity) * POINTS_PER_COMPLEXITY
    }

    pub fn is_completed(&self) -> bool {
        self.status == FeatureStatus::Completed
    }

    fn transition(&mut self, next: FeatureStatus) -> SimResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(SimError::IllegalTransition {
                entity: "feature",
                id:     self.id.clone(),
                from:   self.status.as_str().to_string(),
                to:     next.as_str().to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BugSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BugSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Release quality bonus for shipping the fix.
    fn fix_value(self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Medium => 2.0,
            Self::High => 3.0,
            Self::Critical => 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BugStatus {
    Open,
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bug {
    pub id:               EntityId,
    pub title:            String,
    pub severity:         BugSeverity,
    pub status:           BugStatus,
    pub affected_feature: Option<EntityId>,
    pub reported_tick:    Tick,
    pub released_in:      Option<String>,
}

/// Immutable once shipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Release {
    pub id:                 EntityId,
    pub version:            String,
    pub features:           Vec<EntityId>,
    pub fixed_bugs:         Vec<EntityId>,
    pub notes:              String,
    pub quality_score:      f64,
    pub tech_debt_incurred: f64,
    pub tick:               Tick,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductState {
    pub current_version:    String,
    features:               Vec<Feature>,
    bugs:                   Vec<Bug>,
    pub tech_stack:         BTreeMap<TechCategory, TechOption>,
    pub tech_debt:          f64,
    releases:               Vec<Release>,
    /// Banked dev points not yet applied to a feature.
    pub development_points: f64,
}

impl Default for ProductState {
    fn default() -> Self {
        Self {
            current_version:    "0.1".to_string(),
            features:           Vec::new(),
            bugs:               Vec::new(),
            tech_stack:         BTreeMap::new(),
            tech_debt:          0.0,
            releases:           Vec::new(),
            development_points: 0.0,
        }
    }
}

impl ProductState {
    /// A product seeded with the configured starter features.
    pub fn with_starter_features(config: &ProductConfig, rng: &mut SubsystemRng) -> Self {
        let mut product = Self::default();
        let ids: Vec<EntityId> = config.starter_features.iter().map(|_| rng.next_id()).collect();
        for (template, id) in config.starter_features.iter().zip(&ids) {
            product.features.push(Feature {
                id:             id.clone(),
                name:           template.name.clone(),
                description:    template.description.clone(),
                complexity:     template.complexity.clamp(MIN_COMPLEXITY, MAX_COMPLEXITY),
                status:         FeatureStatus::Planned,
                progress:       0.0,
                dependencies:   template.depends_on.iter().filter_map(|&i| ids.get(i).cloned()).collect(),
                completed_tick: None,
                released_in:    None,
            });
        }
        product
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature(&self, id: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn bugs(&self) -> &[Bug] {
        &self.bugs
    }

    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    pub fn open_bugs(&self) -> usize {
        self.bugs.iter().filter(|b| b.status == BugStatus::Open).count()
    }

    // ── Commands ───────────────────────────────────────────────

    pub fn add_feature(
        &mut self,
        name:         &str,
        description:  &str,
        complexity:   u8,
        dependencies: Vec<EntityId>,
        rng:          &mut SubsystemRng,
    ) -> CommandResult {
        if name.trim().is_empty() {
            return CommandResult::fail("Feature name cannot be empty");
        }
        if !(MIN_COMPLEXITY..=MAX_COMPLEXITY).contains(&complexity) {
            return CommandResult::fail("Complexity must be between 1 and 5");
        }
        if let Some(missing) = dependencies.iter().find(|d| self.feature(d).is_none()) {
            return CommandResult::fail(format!("Unknown dependency {missing}"));
        }
        let mut id = rng.next_id();
        while self.feature(&id).is_some() {
            id = rng.next_id();
        }
        self.features.push(Feature {
            id:             id.clone(),
            name:           name.trim().to_string(),
            description:    description.to_string(),
            complexity,
            status:         FeatureStatus::Planned,
            progress:       0.0,
            dependencies,
            completed_tick: None,
            released_in:    None,
        });
        CommandResult::ok_with_id(id)
    }

    /// Planned -> InProgress, only once every dependency is completed.
    pub fn start_feature(&mut self, feature_id: &str) -> CommandResult {
        let Some(feature) = self.feature(feature_id) else {
            return CommandResult::fail("Feature not found");
        };
        if feature.status != FeatureStatus::Planned {
            return CommandResult::fail("Feature is not in the planned state");
        }
        let blocked = feature
            .dependencies
            .iter()
            .any(|dep| !self.feature(dep).is_some_and(Feature::is_completed));
        if blocked {
            return CommandResult::fail("Dependencies are not completed yet");
        }
        match self.features.iter_mut().find(|f| f.id == feature_id) {
            Some(f) => match f.transition(FeatureStatus::InProgress) {
                Ok(()) => CommandResult::ok_with_id(feature_id),
                Err(e) => CommandResult::fail(e.to_string()),
            },
            None => CommandResult::fail("Feature not found"),
        }
    }

    pub fn report_bug(
        &mut self,
        title:            &str,
        severity:         BugSeverity,
        affected_feature: Option<EntityId>,
        tick:             Tick,
        rng:              &mut SubsystemRng,
    ) -> EntityId {
        let id = rng.next_id();
        self.bugs.push(Bug {
            id: id.clone(),
            title: title.to_string(),
            severity,
            status: BugStatus::Open,
            affected_feature,
            reported_tick: tick,
            released_in: None,
        });
        id
    }

    pub fn fix_bug(&mut self, bug_id: &str, config: &ProductConfig) -> CommandResult {
        match self.bugs.iter_mut().find(|b| b.id == bug_id) {
            Some(bug) if bug.status == BugStatus::Open => {
                bug.status = BugStatus::Fixed;
                self.tech_debt = (self.tech_debt - config.bug_fix_debt_relief).max(0.0);
                CommandResult::ok_with_id(bug_id)
            }
            Some(_) => CommandResult::fail("Bug is already fixed"),
            None => CommandResult::fail("Bug not found"),
        }
    }

    /// Install a tech option in its category. The caller pays for it.
    pub fn select_tech(&mut self, option: TechOption) -> CommandResult {
        let id = option.id.clone();
        self.tech_stack.insert(option.category, option);
        CommandResult::ok_with_id(id)
    }

    /// Ship every completed, unreleased feature and every fixed, unreleased
    /// bug. Fails when there is no completed feature to ship.
    pub fn create_release(
        &mut self,
        notes:  &str,
        rush:   bool,
        config: &ProductConfig,
        tick:   Tick,
        rng:    &mut SubsystemRng,
    ) -> Result<Release, String> {
        let shipping: Vec<usize> = self
            .features
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_completed() && f.released_in.is_none())
            .map(|(i, _)| i)
            .collect();
        if shipping.is_empty() {
            return Err("No completed features to release".to_string());
        }
        let fixed: Vec<usize> = self
            .bugs
            .iter()
            .enumerate()
            .filter(|(_, b)| b.status == BugStatus::Fixed && b.released_in.is_none())
            .map(|(i, _)| i)
            .collect();

        let mut score = 50.0;
        score += shipping.iter().map(|&i| f64::from(self.features[i].complexity) * 2.0).sum::<f64>();
        score += fixed.iter().map(|&i| self.bugs[i].severity.fix_value()).sum::<f64>();
        score -= self.tech_debt;

        let version = increment_version(&self.current_version);
        for &i in &shipping {
            self.features[i].released_in = Some(version.clone());
        }
        for &i in &fixed {
            self.bugs[i].released_in = Some(version.clone());
        }
        let debt = if rush { config.rush_release_debt } else { 0.0 };
        self.tech_debt += debt;

        let release = Release {
            id:                 rng.next_id(),
            version:            version.clone(),
            features:           shipping.iter().map(|&i| self.features[i].id.clone()).collect(),
            fixed_bugs:         fixed.iter().map(|&i| self.bugs[i].id.clone()).collect(),
            notes:              notes.to_string(),
            quality_score:      score.clamp(0.0, 100.0),
            tech_debt_incurred: debt,
            tick,
        };
        self.current_version = version;
        self.releases.push(release.clone());
        Ok(release)
    }

    // ── Derived ────────────────────────────────────────────────

    /// 0–100. Completed ratio and tech stack raise it; open bugs and tech
    /// debt drag it down.
    pub fn quality(&self) -> f64 {
        if self.features.is_empty() {
            return 0.0;
        }
        let completed = self.features.iter().filter(|f| f.is_completed()).count();
        let completed_ratio = completed as f64 / self.features.len() as f64;
        let bug_penalty = (self.open_bugs() as f64 * 5.0).min(50.0);
        let stack_impact = if self.tech_stack.is_empty() {
            0.0
        } else {
            self.tech_stack
                .values()
                .map(|t| (t.stability + t.popularity) / 2.0)
                .sum::<f64>()
                / self.tech_stack.len() as f64
        };
        let debt_penalty = self.tech_debt.min(30.0);
        let base = completed_ratio * 70.0 + stack_impact / 100.0 * 30.0;
        (base - bug_penalty - debt_penalty).clamp(0.0, 100.0)
    }

    // ── Hourly recompute ───────────────────────────────────────

    /// Bank an hour of dev points and spread them over in-progress features.
    /// Returns the ids of features completed by this call.
    pub fn recompute_hour(&mut self, team: &TeamStats, config: &ProductConfig, tick: Tick) -> SimResult<Vec<EntityId>> {
        let divisor = if config.dev_points_divisor > 0.0 { config.dev_points_divisor } else { 1.0 };
        let earned = (team.coding + team.design) / divisor;
        if earned <= 0.0 || !earned.is_finite() {
            return Ok(Vec::new());
        }
        self.development_points += earned;

        let active: Vec<usize> = self
            .features
            .iter()
            .enumerate()
            .filter(|(_, f)| f.status == FeatureStatus::InProgress)
            .map(|(i, _)| i)
            .collect();
        if active.is_empty() {
            return Ok(Vec::new());
        }

        let share = self.development_points / active.len() as f64;
        let mut remaining = self.development_points;
        let mut completed = Vec::new();
        for i in active {
            let feature = &mut self.features[i];
            let needed = feature.ceiling() - feature.progress;
            let applied = share.min(needed).min(remaining);
            if applied <= 0.0 {
                continue;
            }
            feature.progress = (feature.progress + applied).min(feature.ceiling());
            remaining -= applied;
            if feature.progress >= feature.ceiling() {
                feature.transition(FeatureStatus::Completed)?;
                feature.completed_tick = Some(tick);
                completed.push(feature.id.clone());
            }
        }
        self.development_points = remaining.max(0.0);
        Ok(completed)
    }

    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            quality:            self.quality(),
            total_features:     self.features.len(),
            completed_features: self.features.iter().filter(|f| f.is_completed()).count(),
            open_bugs:          self.open_bugs(),
            fixed_bugs:         self.bugs.iter().filter(|b| b.status == BugStatus::Fixed).count(),
            releases:           self.releases.len(),
            tech_debt:          self.tech_debt,
        }
    }
}

/// "0.1" -> "0.2", "1.9" -> "1.10".
fn increment_version(version: &str) -> String {
    match version.rsplit_once('.') {
        Some((head, last)) => {
            let next = last.parse::<u64>().map(|n| n + 1).unwrap_or(1);
            format!("{head}.{next}")
        }
        None => format!("{version}.1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_feature_cannot_go_back() {
        assert!(FeatureStatus::Planned.can_transition_to(FeatureStatus::InProgress));
        assert!(FeatureStatus::InProgress.can_transition_to(FeatureStatus::Completed));
        assert!(!FeatureStatus::Completed.can_transition_to(FeatureStatus::InProgress));
        assert!(!FeatureStatus::Completed.can_transition_to(FeatureStatus::Planned));
        assert!(!FeatureStatus::Planned.can_transition_to(FeatureStatus::Completed));
    }

    #[test]
    fn versions_increment_last_component() {
        assert_eq!(increment_version("0.1"), "0.2");
        assert_eq!(increment_version("1.9"), "1.10");
    }
}
