//! The aggregate of every container, owned by the engine.
//!
//! Each field is one container's exclusive slice. Cross-container reads go
//! through `snapshot()`; cross-container writes go through the target
//! container's public operations.

use crate::{
    achievement::AchievementRegistry,
    clock::SimClock,
    company::CompanyState,
    config::SimConfig,
    investor::InvestorState,
    marketing::MarketingState,
    product::ProductState,
    rng::{RngBank, SubsystemSlot},
    snapshot::WorldSnapshot,
    team::TeamRoster,
    types::RunId,
};

pub const CLOCK_KEY:        &str = "startup-sim.clock";
pub const COMPANY_KEY:      &str = "startup-sim.company";
pub const TEAM_KEY:         &str = "startup-sim.team";
pub const PRODUCT_KEY:      &str = "startup-sim.product";
pub const MARKETING_KEY:    &str = "startup-sim.marketing";
pub const INVESTOR_KEY:     &str = "startup-sim.investor";
pub const ACHIEVEMENTS_KEY: &str = "startup-sim.achievements";

pub const CONTAINER_KEYS: [&str; 7] = [
    CLOCK_KEY,
    COMPANY_KEY,
    TEAM_KEY,
    PRODUCT_KEY,
    MARKETING_KEY,
    INVESTOR_KEY,
    ACHIEVEMENTS_KEY,
];

#[derive(Debug, Clone)]
pub struct SimState {
    pub config:       SimConfig,
    pub clock:        SimClock,
    pub company:      CompanyState,
    pub team:         TeamRoster,
    pub product:      ProductState,
    pub marketing:    MarketingState,
    pub investors:    InvestorState,
    pub achievements: AchievementRegistry,
}

impl SimState {
    /// A fresh run. Starter features and seed investors draw from their
    /// containers' tick-0 streams.
    pub fn new(run_id: RunId, config: SimConfig, rng_bank: &RngBank) -> Self {
        let mut product_rng = rng_bank.for_subsystem_at_tick(SubsystemSlot::Product, 0);
        let mut investor_rng = rng_bank.for_subsystem_at_tick(SubsystemSlot::Investor, 0);
        let mut clock = SimClock::new(run_id);
        clock.set_tick_rate(config.clock.initial_tick_rate_hz);
        Self {
            clock,
            company:      CompanyState::new(&config.company),
            team:         TeamRoster::new(),
            product:      ProductState::with_starter_features(&config.product, &mut product_rng),
            marketing:    MarketingState::new(&config.marketing),
            investors:    InvestorState::with_seed_investors(&config.investor, &mut investor_rng),
            achievements: AchievementRegistry::default(),
            config,
        }
    }

    /// By-value view of every container.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            company:   self.company.snapshot(self.clock.time().day),
            team:      self.team.stats(),
            product:   self.product.snapshot(),
            marketing: self.marketing.snapshot(),
            investors: self.investors.snapshot(),
        }
    }
}
