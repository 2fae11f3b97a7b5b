//! Marketing campaigns, channels, audiences, and brand awareness.
//!
//! Campaign time is kept in whole hours. A D-day campaign gets 24×D
//! hourly recomputes, accrues on each one, and leaves the active list on
//! the last. Reach and conversions only grow while a campaign is active.

use crate::{
    command::CommandResult,
    config::{CampaignTemplate, MarketingConfig},
    clock::HOURS_PER_DAY,
    error::{SimError, SimResult},
    rng::SubsystemRng,
    snapshot::MarketingSnapshot,
    types::{EntityId, Tick},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Active,
    Completed,
    Cancelled,
}

impl CampaignStatus {
    fn can_transition_to(self, next: CampaignStatus) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Completed) | (Self::Active, Self::Cancelled)
        )
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    pub id:                    EntityId,
    pub template_id:           String,
    pub name:                  String,
    pub channel:               String,
    pub budget:                f64,
    pub duration_days:         u32,
    pub hours_remaining:       u32,
    pub effectiveness:         f64,
    pub estimated_reach:       f64,
    pub estimated_conversions: f64,
    pub reach:                 f64,
    pub conversions:           f64,
    pub target_audience:       Option<String>,
    status:                    CampaignStatus,
    pub started_tick:          Tick,
    pub ended_tick:            Option<Tick>,
}

impl Campaign {
    pub fn status(&self) -> CampaignStatus {
        self.status
    }

    pub fn days_remaining(&self) -> f64 {
        f64::from(self.hours_remaining) / HOURS_PER_DAY as f64
    }

    fn transition(&mut self, next: CampaignStatus, tick: Tick) -> SimResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(SimError::IllegalTransition {
                entity: "campaign",
                id:     self.id.clone(),
                from:   self.status.as_str().to_string(),
                to:     next.as_str().to_string(),
            });
        }
        self.status = next;
        self.hours_remaining = 0;
        self.ended_tick = Some(tick);
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Channel {
    pub id:          String,
    pub name:        String,
    pub unlock_cost: f64,
    pub unlocked:    bool,
}

/// What one hourly recompute produced, for the orchestrator to report on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketingHour {
    pub new_reach:       f64,
    pub new_conversions: f64,
    pub completed:       Vec<Campaign>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MarketingState {
    active:                  Vec<Campaign>,
    past:                    Vec<Campaign>,
    pub channels:            Vec<Channel>,
    pub target_audience:     Option<String>,
    pub total_reach:         f64,
    pub total_conversions:   f64,
    pub total_spent:         f64,
    /// Flat awareness bonus on top of the reach curve, e.g. a viral post.
    pub buzz:                f64,
    brand_awareness:         f64,
}

impl MarketingState {
    pub fn new(config: &MarketingConfig) -> Self {
        Self {
            channels: config
                .channels
                .iter()
                .map(|c| Channel {
                    id:          c.id.clone(),
                    name:        c.name.clone(),
                    unlock_cost: c.unlock_cost,
                    unlocked:    c.starts_unlocked,
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn active_campaigns(&self) -> &[Campaign] {
        &self.active
    }

    pub fn past_campaigns(&self) -> &[Campaign] {
        &self.past
    }

    pub fn brand_awareness(&self) -> f64 {
        self.brand_awareness
    }

    pub fn is_channel_unlocked(&self, channel_id: &str) -> bool {
        self.channels.iter().any(|c| c.id == channel_id && c.unlocked)
    }

    // ── Commands ───────────────────────────────────────────────

    /// Launch a campaign from `template`. The caller debits the returned
    /// campaign's budget from cash.
    #[allow(clippy::too_many_arguments)]
    pub fn start_campaign(
        &mut self,
        template:      &CampaignTemplate,
        budget:        Option<f64>,
        duration_days: Option<u32>,
        cash:          f64,
        quality:       f64,
        config:        &MarketingConfig,
        tick:          Tick,
        rng:           &mut SubsystemRng,
    ) -> Result<Campaign, String> {
        if !self.is_channel_unlocked(&template.channel) {
            return Err(format!("Channel '{}' is locked", template.channel));
        }
        let budget = budget.unwrap_or(template.base_cost);
        if !budget.is_finite() || budget <= 0.0 {
            return Err("Budget must be positive".to_string());
        }
        let duration_days = duration_days.unwrap_or(template.base_duration_days);
        if duration_days == 0 {
            return Err("Duration must be at least one day".to_string());
        }
        if cash < budget {
            return Err("Not enough cash to start this campaign".to_string());
        }

        let audience_factor = self.audience_factor(&template.channel, config);
        let quality_factor = 0.5 + quality.clamp(0.0, 100.0) / 100.0;
        let reach = if template.base_cost > 0.0 {
            (template.base_reach * budget / template.base_cost).round()
        } else {
            template.base_reach
        };
        let conversion_rate = template.base_conversion_rate * audience_factor * quality_factor;

        let campaign = Campaign {
            id:                    rng.next_id(),
            template_id:           template.id.clone(),
            name:                  template.name.clone(),
            channel:               template.channel.clone(),
            budget,
            duration_days,
            hours_remaining:       duration_days.saturating_mul(HOURS_PER_DAY as u32),
            effectiveness:         (template.base_effectiveness * audience_factor * quality_factor).min(100.0),
            estimated_reach:       reach,
            estimated_conversions: (reach * conversion_rate / 100.0).round(),
            reach:                 0.0,
            conversions:           0.0,
            target_audience:       self.target_audience.clone(),
            status:                CampaignStatus::Active,
            started_tick:          tick,
            ended_tick:            None,
        };
        self.total_spent += budget;
        self.active.push(campaign.clone());
        Ok(campaign)
    }

    fn audience_factor(&self, channel: &str, config: &MarketingConfig) -> f64 {
        let audience = self
            .target_audience
            .as_deref()
            .and_then(|id| config.audiences.iter().find(|a| a.id == id));
        match audience {
            Some(a) if a.best_channels.iter().any(|c| c == channel) => config.matched_audience_factor,
            Some(_) => config.mismatched_audience_factor,
            None => 1.0,
        }
    }

    /// Active -> Cancelled. What was accrued so far stays.
    pub fn cancel_campaign(&mut self, campaign_id: &str, tick: Tick) -> CommandResult {
        let Some(idx) = self.active.iter().position(|c| c.id == campaign_id) else {
            return CommandResult::fail("Campaign not found");
        };
        let mut campaign = self.active.remove(idx);
        if let Err(e) = campaign.transition(CampaignStatus::Cancelled, tick) {
            self.active.insert(idx, campaign);
            return CommandResult::fail(e.to_string());
        }
        self.past.push(campaign);
        CommandResult::ok_with_id(campaign_id)
    }

    /// Add budget to an active campaign. Returns the amount to debit.
    pub fn boost_campaign(
        &mut self,
        campaign_id:       &str,
        additional_budget: f64,
        cash:              f64,
        config:            &MarketingConfig,
    ) -> Result<f64, String> {
        if !additional_budget.is_finite() || additional_budget <= 0.0 {
            return Err("Boost must be positive".to_string());
        }
        if cash < additional_budget {
            return Err("Not enough cash to boost this campaign".to_string());
        }
        let campaign = self
            .active
            .iter_mut()
            .find(|c| c.id == campaign_id)
            .ok_or_else(|| "Campaign not found".to_string())?;
        let ratio = if campaign.budget > 0.0 { additional_budget / campaign.budget } else { 1.0 };
        campaign.estimated_reach += (campaign.estimated_reach * ratio * config.boost_efficiency).round();
        campaign.estimated_conversions +=
            (campaign.estimated_conversions * ratio * config.boost_efficiency).round();
        campaign.budget += additional_budget;
        self.total_spent += additional_budget;
        Ok(additional_budget)
    }

    pub fn select_audience(&mut self, audience_id: &str, config: &MarketingConfig) -> CommandResult {
        if !config.audiences.iter().any(|a| a.id == audience_id) {
            return CommandResult::fail("Unknown audience segment");
        }
        self.target_audience = Some(audience_id.to_string());
        CommandResult::ok_with_id(audience_id)
    }

    /// Unlock a channel. Returns the cost to debit.
    pub fn unlock_channel(&mut self, channel_id: &str, cash: f64) -> Result<f64, String> {
        let channel = self
            .channels
            .iter_mut()
            .find(|c| c.id == channel_id)
            .ok_or_else(|| "Channel not found".to_string())?;
        if channel.unlocked {
            return Err("Channel already unlocked".to_string());
        }
        if cash < channel.unlock_cost {
            return Err(format!("Unlocking {} costs ${:.0}", channel.name, channel.unlock_cost));
        }
        channel.unlocked = true;
        Ok(channel.unlock_cost)
    }

    pub fn apply_buzz(&mut self, bonus: f64, config: &MarketingConfig) {
        if bonus.is_finite() {
            self.buzz = (self.buzz + bonus).clamp(0.0, 100.0);
        }
        self.refresh_awareness(config);
    }

    // ── Hourly recompute ───────────────────────────────────────

    /// One hour for every active campaign: count the hour down, retire it
    /// at zero, otherwise accrue an even slice of what is left of its
    /// estimate. The last active hour takes the remainder, so the final
    /// hour retires without accruing.
    pub fn recompute_hour(&mut self, config: &MarketingConfig, tick: Tick) -> SimResult<MarketingHour> {
        let mut hour = MarketingHour::default();
        let mut still_active = Vec::with_capacity(self.active.len());
        let mut failure = None;

        for mut campaign in std::mem::take(&mut self.active) {
            campaign.hours_remaining = campaign.hours_remaining.saturating_sub(1);
            if campaign.hours_remaining > 0 {
                let hours = f64::from(campaign.hours_remaining);
                let reach = ((campaign.estimated_reach - campaign.reach) / hours).max(0.0);
                let conversions = ((campaign.estimated_conversions - campaign.conversions) / hours).max(0.0);
                campaign.reach += reach;
                campaign.conversions += conversions;
                hour.new_reach += reach;
                hour.new_conversions += conversions;
                still_active.push(campaign);
                continue;
            }
            match campaign.transition(CampaignStatus::Completed, tick) {
                Ok(()) => {
                    hour.completed.push(campaign.clone());
                    self.past.push(campaign);
                }
                Err(e) => {
                    failure.get_or_insert(e);
                    still_active.push(campaign);
                }
            }
        }
        self.active = still_active;

        self.total_reach += hour.new_reach;
        self.total_conversions += hour.new_conversions;
        self.refresh_awareness(config);
        match failure {
            Some(e) => Err(e),
            None => Ok(hour),
        }
    }

    fn refresh_awareness(&mut self, config: &MarketingConfig) {
        let scale = if config.awareness_reach_scale > 0.0 { config.awareness_reach_scale } else { 1.0 };
        let curve = 100.0 * (1.0 - (-self.total_reach / scale).exp());
        let awareness = curve + self.buzz;
        self.brand_awareness = if awareness.is_nan() { 0.0 } else { awareness.clamp(0.0, 100.0) };
    }

    pub fn snapshot(&self) -> MarketingSnapshot {
        MarketingSnapshot {
            brand_awareness:   self.brand_awareness,
            total_reach:       self.total_reach,
            total_conversions: self.total_conversions,
            active_campaigns:  self.active.len(),
            campaigns_run:     self.active.len() + self.past.len(),
        }
    }
}
