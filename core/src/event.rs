//! Everything the cascade and the command surface emit.
//!
//! Events are records, not a communication channel: containers never read
//! each other's events. The engine persists them to the event log.

use crate::{
    clock::SimTime,
    config::RandomEventKind,
    types::{EntityId, RunId, Tick},
};
use serde::{Deserialize, Serialize};

/// Variants are appended over time, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
    },
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },
    HourRolled {
        tick: Tick,
        time: SimTime,
    },
    DayRolled {
        tick: Tick,
        day: u32,
    },
    CascadeStepFailed {
        tick: Tick,
        step: String,
        error: String,
    },
    PlayerCommandReceived {
        tick: Tick,
        command_type: String,
        success: bool,
    },

    // ── Company ────────────────────────────────────
    UsersUpdated {
        tick: Tick,
        gained: u64,
        churned: u64,
        total: u64,
    },
    WeeklyRollup {
        tick: Tick,
        team_size: usize,
        expenses: f64,
    },
    MonthlyRollup {
        tick: Tick,
        revenue: f64,
        expenses: f64,
        revenue_growth: f64,
        rent_paid: f64,
        cash: f64,
        valuation: f64,
    },
    OfficeUpgraded {
        tick: Tick,
        level: u32,
        capacity: usize,
    },
    ObjectiveCompleted {
        tick: Tick,
        objective_id: EntityId,
    },
    RandomEventOccurred {
        tick: Tick,
        kind: RandomEventKind,
    },

    // ── Team ───────────────────────────────────────
    EmployeeHired {
        tick: Tick,
        employee_id: EntityId,
        salary: f64,
    },
    EmployeeFired {
        tick: Tick,
        employee_id: EntityId,
    },
    TeamRecomputed {
        tick: Tick,
        headcount: usize,
        average_morale: f64,
        average_energy: f64,
    },

    // ── Product ────────────────────────────────────
    FeatureStarted {
        tick: Tick,
        feature_id: EntityId,
    },
    FeatureCompleted {
        tick: Tick,
        feature_id: EntityId,
    },
    BugReported {
        tick: Tick,
        bug_id: EntityId,
        severity: String,
    },
    BugFixed {
        tick: Tick,
        bug_id: EntityId,
    },
    ReleaseShipped {
        tick: Tick,
        release_id: EntityId,
        version: String,
        quality: f64,
    },

    // ── Marketing ──────────────────────────────────
    CampaignStarted {
        tick: Tick,
        campaign_id: EntityId,
        budget: f64,
    },
    CampaignCompleted {
        tick: Tick,
        campaign_id: EntityId,
        reach: f64,
        conversions: f64,
    },
    CampaignCancelled {
        tick: Tick,
        campaign_id: EntityId,
    },

    // ── Investors ──────────────────────────────────
    OfferMade {
        tick: Tick,
        investor_id: EntityId,
        amount: f64,
        equity: f64,
    },
    OfferExpired {
        tick: Tick,
        investor_id: EntityId,
    },
    InvestorJoined {
        tick: Tick,
        investor_id: EntityId,
        amount: f64,
        equity: f64,
    },

    // ── Achievements ───────────────────────────────
    AchievementUnlocked {
        tick: Tick,
        achievement_id: EntityId,
    },
    RewardClaimed {
        tick: Tick,
        achievement_id: EntityId,
    },
}

impl SimEvent {
    /// Stable string name, used for the event_type column in event_log.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::TickStarted { .. }           => "tick_started",
            Self::TickCompleted { .. }         => "tick_completed",
            Self::RunInitialized { .. }        => "run_initialized",
            Self::HourRolled { .. }            => "hour_rolled",
            Self::DayRolled { .. }             => "day_rolled",
            Self::CascadeStepFailed { .. }     => "cascade_step_failed",
            Self::PlayerCommandReceived { .. } => "player_command_received",
            Self::UsersUpdated { .. }          => "users_updated",
            Self::WeeklyRollup { .. }          => "weekly_rollup",
            Self::MonthlyRollup { .. }         => "monthly_rollup",
            Self::OfficeUpgraded { .. }        => "office_upgraded",
            Self::ObjectiveCompleted { .. }    => "objective_completed",
            Self::RandomEventOccurred { .. }   => "random_event_occurred",
            Self::EmployeeHired { .. }         => "employee_hired",
            Self::EmployeeFired { .. }         => "employee_fired",
            Self::TeamRecomputed { .. }        => "team_recomputed",
            Self::FeatureStarted { .. }        => "feature_started",
            Self::FeatureCompleted { .. }      => "feature_completed",
            Self::BugReported { .. }           => "bug_reported",
            Self::BugFixed { .. }              => "bug_fixed",
            Self::ReleaseShipped { .. }        => "release_shipped",
            Self::CampaignStarted { .. }       => "campaign_started",
            Self::CampaignCompleted { .. }     => "campaign_completed",
            Self::CampaignCancelled { .. }     => "campaign_cancelled",
            Self::OfferMade { .. }             => "offer_made",
            Self::OfferExpired { .. }          => "offer_expired",
            Self::InvestorJoined { .. }        => "investor_joined",
            Self::AchievementUnlocked { .. }   => "achievement_unlocked",
            Self::RewardClaimed { .. }         => "reward_claimed",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub run_id:     RunId,
    pub tick:       Tick,
    pub subsystem:  String,
    pub event_type: String,
    pub payload:    String, // JSON-serialized SimEvent
}
