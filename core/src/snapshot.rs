//! Read-only, by-value views of container state.
//!
//! Cross-container logic (user growth, investor relationships, valuation,
//! achievement and objective predicates) only ever sees these. A snapshot
//! is a plain copy: holding one grants no way to mutate its source.

use crate::company::Reputation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompanySnapshot {
    pub cash:            f64,
    pub revenue:         f64,
    pub expenses:        f64,
    pub valuation:       f64,
    pub revenue_growth:  f64,
    pub reputation:      Reputation,
    pub user_count:      u64,
    pub team_size:       usize,
    pub office_capacity: usize,
    pub day:             u32,
    pub started:         bool,
}

/// Team aggregates. Skill totals are weighted by morale × energy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TeamStats {
    pub coding:         f64,
    pub design:         f64,
    pub marketing:      f64,
    pub business:       f64,
    pub total_salary:   f64,
    pub headcount:      usize,
    pub average_morale: f64,
    pub average_energy: f64,
    /// 0 for an empty team.
    pub min_morale:     f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductSnapshot {
    pub quality:            f64,
    pub total_features:     usize,
    pub completed_features: usize,
    pub open_bugs:          usize,
    pub fixed_bugs:         usize,
    pub releases:           usize,
    pub tech_debt:          f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MarketingSnapshot {
    pub brand_awareness:   f64,
    pub total_reach:       f64,
    pub total_conversions: f64,
    pub active_campaigns:  usize,
    /// Active plus past campaigns.
    pub campaigns_run:     usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InvestorSnapshot {
    pub active_investors:    usize,
    pub potential_investors: usize,
    pub total_raised:        f64,
    pub total_equity_sold:   f64,
}

/// Everything the orchestrator hands to cross-container predicates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorldSnapshot {
    pub company:   CompanySnapshot,
    pub team:      TeamStats,
    pub product:   ProductSnapshot,
    pub marketing: MarketingSnapshot,
    pub investors: InvestorSnapshot,
}
