//! Serializable predicates over a `WorldSnapshot`.
//!
//! Both achievements and objectives unlock on a `Milestone`. Keeping the
//! predicate as data (not a closure) lets the registry be saved and loaded
//! with its rules intact.

use crate::snapshot::WorldSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Milestone {
    DaysSurvived { days: u32 },
    Valuation { at_least: f64 },
    Headcount { at_least: usize },
    /// A team of at least `min_size` where nobody is below `min_morale`.
    DreamTeam { min_size: usize, min_morale: f64 },
    CompletedFeatures { at_least: usize },
    Releases { at_least: usize },
    BugsFixed { at_least: usize },
    CampaignsRun { at_least: usize },
    Users { at_least: u64 },
    Investors { at_least: usize },
    FundingRaised { at_least: f64 },
    CompanyStarted,
}

impl Milestone {
    pub fn is_met(&self, world: &WorldSnapshot) -> bool {
        match *self {
            Self::DaysSurvived { days } => world.company.day > days,
            Self::Valuation { at_least } => world.company.valuation >= at_least,
            Self::Headcount { at_least } => world.team.headcount >= at_least,
            Self::DreamTeam { min_size, min_morale } => {
                world.team.headcount >= min_size && world.team.min_morale >= min_morale
            }
            Self::CompletedFeatures { at_least } => world.product.completed_features >= at_least,
            Self::Releases { at_least } => world.product.releases >= at_least,
            Self::BugsFixed { at_least } => world.product.fixed_bugs >= at_least,
            Self::CampaignsRun { at_least } => world.marketing.campaigns_run >= at_least,
            Self::Users { at_least } => world.company.user_count >= at_least,
            Self::Investors { at_least } => world.investors.active_investors >= at_least,
            Self::FundingRaised { at_least } => world.investors.total_raised >= at_least,
            Self::CompanyStarted => world.company.started,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dream_team_needs_size_and_morale() {
        let mut world = WorldSnapshot::default();
        let rule = Milestone::DreamTeam { min_size: 5, min_morale: 75.0 };
        world.team.headcount = 5;
        world.team.min_morale = 74.9;
        assert!(!rule.is_met(&world));
        world.team.min_morale = 75.0;
        assert!(rule.is_met(&world));
    }

    #[test]
    fn days_survived_counts_completed_days() {
        let mut world = WorldSnapshot::default();
        let rule = Milestone::DaysSurvived { days: 30 };
        world.company.day = 30;
        assert!(!rule.is_met(&world));
        world.company.day = 31;
        assert!(rule.is_met(&world));
    }
}
