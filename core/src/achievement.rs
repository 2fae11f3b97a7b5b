//! Achievement registry.
//!
//! Unlocking is one-way, and a reward can be claimed once, only after
//! unlock. `check_achievements` runs behind its own `TickGate`, so a check
//! can never be entered again while one is in flight.

use crate::{
    clock::TickGate,
    company::ReputationKind,
    milestone::Milestone,
    snapshot::WorldSnapshot,
    types::{EntityId, Tick},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Company,
    Team,
    Product,
    Marketing,
    Investor,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reward {
    Cash { amount: f64 },
    Reputation { kind: ReputationKind, amount: f64 },
    Users { count: u64 },
    TeamBoost { morale: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    pub id:             EntityId,
    pub title:          String,
    pub description:    String,
    pub category:       AchievementCategory,
    pub rule:           Milestone,
    pub reward:         Option<Reward>,
    pub unlocked:       bool,
    pub unlocked_tick:  Option<Tick>,
    pub reward_claimed: bool,
}

impl Achievement {
    pub fn new(
        id:          &str,
        title:       &str,
        description: &str,
        category:    AchievementCategory,
        rule:        Milestone,
        reward:      Option<Reward>,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category,
            rule,
            reward,
            unlocked: false,
            unlocked_tick: None,
            reward_claimed: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementRegistry {
    achievements: Vec<Achievement>,
    #[serde(skip)]
    gate:         Arc<TickGate>,
}

impl Default for AchievementRegistry {
    fn default() -> Self {
        use AchievementCategory as C;
        use Milestone as M;
        let cash = |amount| Some(Reward::Cash { amount });
        let rep = |kind, amount| Some(Reward::Reputation { kind, amount });
        Self::with_achievements(vec![
            Achievement::new("first_steps", "First Steps", "Start your own startup",
                C::Company, M::CompanyStarted, None),
            Achievement::new("first_month", "One Month Survivor", "Keep your startup running for one month",
                C::Company, M::DaysSurvived { days: 30 }, rep(ReputationKind::Industry, 5.0)),
            Achievement::new("first_million", "Millionaire", "Reach a company valuation of $1 million",
                C::Company, M::Valuation { at_least: 1_000_000.0 }, cash(5_000.0)),
            Achievement::new("first_hire", "First Hire", "Hire your first team member",
                C::Team, M::Headcount { at_least: 1 }, rep(ReputationKind::Employer, 5.0)),
            Achievement::new("dream_team", "Dream Team", "Have a team of 5 or more people with high morale",
                C::Team, M::DreamTeam { min_size: 5, min_morale: 75.0 }, Some(Reward::TeamBoost { morale: 20.0 })),
            Achievement::new("first_feature", "Feature Complete", "Complete your first product feature",
                C::Product, M::CompletedFeatures { at_least: 1 }, rep(ReputationKind::Customer, 5.0)),
            Achievement::new("first_release", "Ship It", "Release your first product version",
                C::Product, M::Releases { at_least: 1 }, Some(Reward::Users { count: 100 })),
            Achievement::new("bug_hunter", "Bug Hunter", "Fix 10 bugs",
                C::Product, M::BugsFixed { at_least: 10 }, cash(2_000.0)),
            Achievement::new("first_campaign", "Marketing 101", "Run your first marketing campaign",
                C::Marketing, M::CampaignsRun { at_least: 1 }, rep(ReputationKind::Customer, 5.0)),
            Achievement::new("viral_hit", "Viral Hit", "Reach 1,000 users",
                C::Marketing, M::Users { at_least: 1_000 }, rep(ReputationKind::Industry, 10.0)),
            Achievement::new("first_investment", "Funded", "Secure your first investment",
                C::Investor, M::Investors { at_least: 1 }, rep(ReputationKind::Industry, 10.0)),
            Achievement::new("big_money", "Big Money", "Raise over $1 million in funding",
                C::Investor, M::FundingRaised { at_least: 1_000_000.0 }, cash(10_000.0)),
        ])
    }
}

impl AchievementRegistry {
    pub fn with_achievements(achievements: Vec<Achievement>) -> Self {
        Self { achievements, gate: TickGate::new() }
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn get(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn unlocked(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter().filter(|a| a.unlocked)
    }

    /// The guard `check_achievements` runs behind. Exposed so callers and
    /// tests can observe or hold it.
    pub fn gate(&self) -> Arc<TickGate> {
        Arc::clone(&self.gate)
    }

    /// Unlock every locked achievement whose rule holds for `world`.
    /// Returns the newly unlocked achievements. A call made while another
    /// check holds the gate does nothing.
    pub fn check_achievements(&mut self, world: &WorldSnapshot, tick: Tick) -> Vec<Achievement> {
        let Some(_permit) = self.gate.try_enter() else {
            log::trace!("tick={tick} achievement check already in flight, skipped");
            return Vec::new();
        };
        let mut unlocked = Vec::new();
        for achievement in self.achievements.iter_mut().filter(|a| !a.unlocked) {
            if achievement.rule.is_met(world) {
                achievement.unlocked = true;
                achievement.unlocked_tick = Some(tick);
                unlocked.push(achievement.clone());
            }
        }
        unlocked
    }

    /// Mark the reward claimed and hand it back. The caller applies it.
    pub fn claim_reward(&mut self, achievement_id: &str) -> Result<Reward, String> {
        let achievement = self
            .achievements
            .iter_mut()
            .find(|a| a.id == achievement_id)
            .ok_or_else(|| "Achievement not found".to_string())?;
        if !achievement.unlocked {
            return Err("Achievement is still locked".to_string());
        }
        if achievement.reward_claimed {
            return Err("Reward already claimed".to_string());
        }
        let reward = achievement.reward.clone().ok_or_else(|| "No reward for this achievement".to_string())?;
        achievement.reward_claimed = true;
        Ok(reward)
    }
}
