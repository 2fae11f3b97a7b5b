//! Investor pipeline: potential investors, pitches, offers, and the cap
//! table of active investors.
//!
//! An investor lives in exactly one of `potential` or `active`. The only
//! move between them is `accept_offer`, which removes and inserts within
//! one `&mut self` call, so no reader can observe it in both or neither.

use crate::{
    clock::HOURS_PER_DAY,
    command::CommandResult,
    config::{InvestorArchetype, InvestorConfig},
    name_generator::NameGenerator,
    rng::SubsystemRng,
    snapshot::{InvestorSnapshot, WorldSnapshot},
    types::{EntityId, Tick},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Offer {
    pub amount:          f64,
    pub equity:          f64,
    pub valuation:       f64,
    pub made_tick:       Tick,
    pub hours_remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PotentialInvestor {
    pub id:                 EntityId,
    pub name:               String,
    pub archetype_id:       String,
    pub round_name:         String,
    /// 0–100.
    pub interest:           f64,
    pub interest_threshold: f64,
    pub focus_areas:        Vec<String>,
    pub pending_offer:      Option<Offer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveInvestor {
    pub id:             EntityId,
    pub name:           String,
    pub archetype_id:   String,
    pub round_name:     String,
    pub focus_areas:    Vec<String>,
    pub invested:       f64,
    pub equity_percent: f64,
    /// 0–100.
    pub relationship:   f64,
    pub joined_tick:    Tick,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FundingEntryKind {
    Investment,
    RejectedOffer,
    Meeting,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FundingEntry {
    pub tick:     Tick,
    pub kind:     FundingEntryKind,
    pub investor: String,
    pub amount:   f64,
    pub equity:   f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FundingRound {
    pub name:         String,
    pub total_raised: f64,
    pub total_equity: f64,
    pub valuation:    f64,
    pub investors:    Vec<String>,
    pub opened_tick:  Tick,
    pub last_tick:    Tick,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PitchOutcome {
    pub interest:   f64,
    pub interested: bool,
    pub offer:      Option<Offer>,
}

/// Offers that lapsed during one hourly recompute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvestorHour {
    pub expired_offers: Vec<EntityId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InvestorState {
    potential:             Vec<PotentialInvestor>,
    active:                Vec<ActiveInvestor>,
    pub funding_history:   Vec<FundingEntry>,
    pub funding_rounds:    Vec<FundingRound>,
    pub total_raised:      f64,
    pub total_equity_sold: f64,
}

impl InvestorState {
    /// One or two angels to start with.
    pub fn with_seed_investors(config: &InvestorConfig, rng: &mut SubsystemRng) -> Self {
        let mut state = Self::default();
        if let Some(angel) = config.archetypes.first() {
            for _ in 0..rng.range_inclusive(1, 2) {
                state.add_potential(angel, rng);
            }
        }
        state
    }

    pub fn potential(&self) -> &[PotentialInvestor] {
        &self.potential
    }

    pub fn active(&self) -> &[ActiveInvestor] {
        &self.active
    }

    pub fn potential_investor(&self, id: &str) -> Option<&PotentialInvestor> {
        self.potential.iter().find(|i| i.id == id)
    }

    pub fn active_investor(&self, id: &str) -> Option<&ActiveInvestor> {
        self.active.iter().find(|i| i.id == id)
    }

    pub fn add_potential(&mut self, archetype: &InvestorArchetype, rng: &mut SubsystemRng) -> EntityId {
        let id = rng.next_id();
        self.potential.push(PotentialInvestor {
            id:                 id.clone(),
            name:               NameGenerator::firm_name(rng),
            archetype_id:       archetype.id.clone(),
            round_name:         archetype.round_name.clone(),
            interest:           archetype.base_interest.clamp(0.0, 100.0),
            interest_threshold: archetype.interest_threshold,
            focus_areas:        archetype.focus_areas.clone(),
            pending_offer:      None,
        });
        id
    }

    // ── Commands ───────────────────────────────────────────────

    /// Add 1–3 potential investors drawn from the archetypes the company's
    /// industry reputation unlocks.
    pub fn find_investors(
        &mut self,
        industry_reputation: f64,
        config: &InvestorConfig,
        rng:    &mut SubsystemRng,
    ) -> Vec<EntityId> {
        let available: Vec<&InvestorArchetype> = config
            .archetypes
            .iter()
            .filter(|a| industry_reputation >= a.min_industry_reputation)
            .collect();
        if available.is_empty() {
            return Vec::new();
        }
        let count = rng.range_inclusive(1, 3);
        let mut found = Vec::with_capacity(count as usize);
        for _ in 0..count {
            if let Some(archetype) = rng.pick(&available) {
                found.push(self.add_potential(archetype, rng));
            }
        }
        found
    }

    /// Score a pitch. When interest clears the investor's threshold a
    /// pending offer is attached, replacing any earlier one.
    #[allow(clippy::too_many_arguments)]
    pub fn prepare_pitch(
        &mut self,
        investor_id:   &str,
        pitch_quality: f64,
        focus_areas:   &[String],
        world:         &WorldSnapshot,
        valuation:     f64,
        config:        &InvestorConfig,
        tick:          Tick,
        rng:           &mut SubsystemRng,
    ) -> Result<PitchOutcome, String> {
        let archetype_id = self
            .potential_investor(investor_id)
            .map(|i| i.archetype_id.clone())
            .ok_or_else(|| "Investor not found".to_string())?;
        let archetype = config
            .archetype(&archetype_id)
            .ok_or_else(|| format!("Unknown investor type {archetype_id}"))?;
        let investor = self
            .potential
            .iter_mut()
            .find(|i| i.id == investor_id)
            .ok_or_else(|| "Investor not found".to_string())?;

        let mut interest = investor.interest;
        if pitch_quality.is_finite() {
            interest += pitch_quality;
        }
        let matching = investor.focus_areas.iter().filter(|a| focus_areas.contains(a)).count();
        interest += matching as f64 * 10.0;
        interest += world.product.quality / 10.0;
        interest += match world.marketing.total_conversions {
            c if c > 1_000.0 => 15.0,
            c if c > 500.0 => 10.0,
            c if c > 100.0 => 5.0,
            _ => 0.0,
        };
        interest += world.company.team_size as f64 * 2.0;
        interest += world.company.reputation.industry / 5.0;
        interest = interest.clamp(0.0, 100.0);
        investor.interest = interest;

        let interested = interest >= investor.interest_threshold;
        let offer = if interested && valuation > 0.0 {
            let max_investment = archetype.max_investment.min(valuation * config.max_valuation_fraction);
            let min_investment = archetype.min_investment.min(max_investment);
            let amount = rng.range_f64(min_investment, max_investment).round();
            let equity = (amount / valuation * 100.0).clamp(archetype.min_equity, archetype.max_equity);
            Some(Offer {
                amount,
                equity: (equity * 10.0).round() / 10.0,
                valuation,
                made_tick: tick,
                hours_remaining: config.offer_expiry_days.saturating_mul(HOURS_PER_DAY as u32),
            })
        } else {
            None
        };
        investor.pending_offer = offer.clone();
        Ok(PitchOutcome { interest, interested, offer })
    }

    /// Take the pending offer. Moves the investor to the active list and
    /// books the round. The caller credits cash with the returned amount.
    pub fn accept_offer(
        &mut self,
        investor_id: &str,
        config: &InvestorConfig,
        tick:   Tick,
    ) -> Result<ActiveInvestor, String> {
        let idx = self
            .potential
            .iter()
            .position(|i| i.id == investor_id)
            .ok_or_else(|| "Investor not found".to_string())?;
        if self.potential[idx].pending_offer.is_none() {
            return Err("No pending offer from this investor".to_string());
        }
        let investor = self.potential.remove(idx);
        let Some(offer) = investor.pending_offer else {
            return Err("No pending offer from this investor".to_string());
        };

        let joined = ActiveInvestor {
            id:             investor.id,
            name:           investor.name,
            archetype_id:   investor.archetype_id,
            round_name:     investor.round_name,
            focus_areas:    investor.focus_areas,
            invested:       offer.amount,
            equity_percent: offer.equity,
            relationship:   config.initial_relationship.clamp(0.0, 100.0),
            joined_tick:    tick,
        };
        self.active.push(joined.clone());

        self.total_raised += offer.amount;
        self.total_equity_sold += offer.equity;
        self.funding_history.push(FundingEntry {
            tick,
            kind:     FundingEntryKind::Investment,
            investor: joined.name.clone(),
            amount:   offer.amount,
            equity:   offer.equity,
        });
        match self.funding_rounds.iter_mut().find(|r| r.name == joined.round_name) {
            Some(round) => {
                round.total_raised += offer.amount;
                round.total_equity += offer.equity;
                round.investors.push(joined.name.clone());
                round.last_tick = tick;
            }
            None => self.funding_rounds.push(FundingRound {
                name:         joined.round_name.clone(),
                total_raised: offer.amount,
                total_equity: offer.equity,
                valuation:    offer.valuation,
                investors:    vec![joined.name.clone()],
                opened_tick:  tick,
                last_tick:    tick,
            }),
        }
        Ok(joined)
    }

    /// Decline the pending offer. The investor stays a prospect with less
    /// interest.
    pub fn reject_offer(&mut self, investor_id: &str, config: &InvestorConfig, tick: Tick) -> CommandResult {
        let Some(investor) = self.potential.iter_mut().find(|i| i.id == investor_id) else {
            return CommandResult::fail("Investor not found");
        };
        investor.pending_offer = None;
        investor.interest = (investor.interest - config.reject_interest_penalty).clamp(0.0, 100.0);
        let name = investor.name.clone();
        self.funding_history.push(FundingEntry {
            tick,
            kind:     FundingEntryKind::RejectedOffer,
            investor: name,
            amount:   0.0,
            equity:   0.0,
        });
        CommandResult::ok_with_id(investor_id)
    }

    /// Active investor: relationship up. Prospect: interest up.
    pub fn schedule_meeting(&mut self, investor_id: &str, config: &InvestorConfig, tick: Tick) -> CommandResult {
        let name = if let Some(active) = self.active.iter_mut().find(|i| i.id == investor_id) {
            active.relationship = (active.relationship + config.meeting_bonus).clamp(0.0, 100.0);
            active.name.clone()
        } else if let Some(prospect) = self.potential.iter_mut().find(|i| i.id == investor_id) {
            prospect.interest = (prospect.interest + config.meeting_bonus).clamp(0.0, 100.0);
            prospect.name.clone()
        } else {
            return CommandResult::fail("Investor not found");
        };
        self.funding_history.push(FundingEntry {
            tick,
            kind:     FundingEntryKind::Meeting,
            investor: name,
            amount:   0.0,
            equity:   0.0,
        });
        CommandResult::ok_with_id(investor_id)
    }

    // ── Hourly recompute ───────────────────────────────────────

    /// Relationship drift from revenue growth and product quality, plus
    /// offer expiry countdown.
    pub fn recompute_hour(&mut self, revenue_growth: f64, quality: f64, config: &InvestorConfig) -> InvestorHour {
        let mut delta = 0.0;
        if revenue_growth > config.growth_threshold {
            delta += config.growth_relationship_delta;
        } else if revenue_growth < 0.0 {
            delta -= config.growth_relationship_delta;
        }
        if quality > config.quality_high {
            delta += config.quality_relationship_delta;
        } else if quality < config.quality_low {
            delta -= config.quality_relationship_delta;
        }
        for investor in &mut self.active {
            investor.relationship = (investor.relationship + delta).clamp(0.0, 100.0);
        }

        let mut hour = InvestorHour::default();
        for investor in &mut self.potential {
            let expired = match investor.pending_offer.as_mut() {
                Some(offer) => {
                    offer.hours_remaining = offer.hours_remaining.saturating_sub(1);
                    offer.hours_remaining == 0
                }
                None => false,
            };
            if expired {
                investor.pending_offer = None;
                hour.expired_offers.push(investor.id.clone());
            }
        }
        hour
    }

    pub fn snapshot(&self) -> InvestorSnapshot {
        InvestorSnapshot {
            active_investors:    self.active.len(),
            potential_investors: self.potential.len(),
            total_raised:        self.total_raised,
            total_equity_sold:   self.total_equity_sold,
        }
    }
}
