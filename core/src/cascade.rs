//! Built-in cascade steps.
//!
//! One struct per step. Each mutates its own container and applies any
//! cross-container effect through the target container's public
//! operations. Registration order lives in engine.rs.

use crate::{
    clock::TICKS_PER_MONTH,
    company::{NotificationCategory, ReputationKind},
    error::SimResult,
    event::SimEvent,
    random_event,
    rng::{SubsystemRng, SubsystemSlot},
    state::SimState,
    subsystem::{SimSubsystem, StepContext},
};

pub const WEEK_DAYS: u32 = 7;
pub const MONTH_DAYS: u32 = 30;

// ── Per tick ───────────────────────────────────────────────────────

pub struct PassiveIncomeStep;

impl SimSubsystem for PassiveIncomeStep {
    fn name(&self) -> &'static str { "passive_income" }
    fn slot(&self) -> SubsystemSlot { SubsystemSlot::Company }

    fn update(&mut self, state: &mut SimState, _ctx: &StepContext, _rng: &mut SubsystemRng) -> SimResult<Vec<SimEvent>> {
        state.company.apply_passive_income(TICKS_PER_MONTH);
        Ok(Vec::new())
    }
}

// ── Hourly ─────────────────────────────────────────────────────────

pub struct ProductHourStep;

impl SimSubsystem for ProductHourStep {
    fn name(&self) -> &'static str { "product" }
    fn slot(&self) -> SubsystemSlot { SubsystemSlot::Product }

    fn update(&mut self, state: &mut SimState, ctx: &StepContext, _rng: &mut SubsystemRng) -> SimResult<Vec<SimEvent>> {
        let completed = state.product.recompute_hour(&ctx.world.team, &state.config.product, ctx.tick)?;
        let mut events = Vec::with_capacity(completed.len());
        for feature_id in completed {
            let name = state
                .product
                .feature(&feature_id)
                .map(|f| f.name.clone())
                .unwrap_or_default();
            log::debug!("tick={} feature '{name}' completed", ctx.tick);
            state.company.record_notification(
                "Feature Completed",
                format!("{name} is ready to ship"),
                NotificationCategory::Success,
                ctx.tick,
            );
            events.push(SimEvent::FeatureCompleted { tick: ctx.tick, feature_id });
        }
        Ok(events)
    }
}

pub struct MarketingHourStep;

impl SimSubsystem for MarketingHourStep {
    fn name(&self) -> &'static str { "marketing" }
    fn slot(&self) -> SubsystemSlot { SubsystemSlot::Marketing }

    fn update(&mut self, state: &mut SimState, ctx: &StepContext, _rng: &mut SubsystemRng) -> SimResult<Vec<SimEvent>> {
        let hour = state.marketing.recompute_hour(&state.config.marketing, ctx.tick)?;
        // Reputation moves only in hours that converted someone; reach alone
        // earns no industry credit.
        if hour.new_conversions > 0.0 {
            let config = &state.config.marketing;
            state.company.update_reputation(
                ReputationKind::Customer,
                hour.new_conversions * config.conversion_customer_reputation,
            );
            state.company.update_reputation(
                ReputationKind::Industry,
                hour.new_reach * config.reach_industry_reputation,
            );
        }
        let mut events = Vec::with_capacity(hour.completed.len());
        for campaign in hour.completed {
            log::debug!("tick={} campaign '{}' completed, reach={:.0}", ctx.tick, campaign.name, campaign.reach);
            state.company.record_notification(
                "Campaign Completed",
                format!("{} reached {:.0} people", campaign.name, campaign.reach),
                NotificationCategory::Info,
                ctx.tick,
            );
            events.push(SimEvent::CampaignCompleted {
                tick:        ctx.tick,
                campaign_id: campaign.id,
                reach:       campaign.reach,
                conversions: campaign.conversions,
            });
        }
        Ok(events)
    }
}

pub struct TeamHourStep;

impl SimSubsystem for TeamHourStep {
    fn name(&self) -> &'static str { "team" }
    fn slot(&self) -> SubsystemSlot { SubsystemSlot::Team }

    fn update(&mut self, state: &mut SimState, ctx: &StepContext, _rng: &mut SubsystemRng) -> SimResult<Vec<SimEvent>> {
        if state.team.headcount() == 0 {
            return Ok(Vec::new());
        }
        state.team.recompute_hour(ctx.time.hour, &state.config.team);
        let stats = state.team.stats();
        Ok(vec![SimEvent::TeamRecomputed {
            tick:           ctx.tick,
            headcount:      stats.headcount,
            average_morale: stats.average_morale,
            average_energy: stats.average_energy,
        }])
    }
}

pub struct InvestorHourStep;

impl SimSubsystem for InvestorHourStep {
    fn name(&self) -> &'static str { "investor" }
    fn slot(&self) -> SubsystemSlot { SubsystemSlot::Investor }

    fn update(&mut self, state: &mut SimState, ctx: &StepContext, _rng: &mut SubsystemRng) -> SimResult<Vec<SimEvent>> {
        let hour = state.investors.recompute_hour(
            ctx.world.company.revenue_growth,
            ctx.world.product.quality,
            &state.config.investor,
        );
        Ok(hour
            .expired_offers
            .into_iter()
            .map(|investor_id| SimEvent::OfferExpired { tick: ctx.tick, investor_id })
            .collect())
    }
}

// ── Daily ──────────────────────────────────────────────────────────

pub struct UserGrowthStep;

impl SimSubsystem for UserGrowthStep {
    fn name(&self) -> &'static str { "user_growth" }
    fn slot(&self) -> SubsystemSlot { SubsystemSlot::Company }

    fn update(&mut self, state: &mut SimState, ctx: &StepContext, _rng: &mut SubsystemRng) -> SimResult<Vec<SimEvent>> {
        let (gained, churned) = state.company.apply_user_growth(
            &ctx.world.marketing,
            &ctx.world.product,
            &state.config.company,
        );
        Ok(vec![SimEvent::UsersUpdated {
            tick: ctx.tick,
            gained,
            churned,
            total: state.company.user_count,
        }])
    }
}

pub struct WeeklyRollupStep;

impl SimSubsystem for WeeklyRollupStep {
    fn name(&self) -> &'static str { "weekly_rollup" }
    fn slot(&self) -> SubsystemSlot { SubsystemSlot::Company }

    fn update(&mut self, state: &mut SimState, ctx: &StepContext, _rng: &mut SubsystemRng) -> SimResult<Vec<SimEvent>> {
        if ctx.time.day % WEEK_DAYS != 0 {
            return Ok(Vec::new());
        }
        state.company.run_weekly_financial_rollup(&ctx.world.team);
        Ok(vec![SimEvent::WeeklyRollup {
            tick:      ctx.tick,
            team_size: state.company.team_size,
            expenses:  state.company.expenses,
        }])
    }
}

pub struct MonthlyRollupStep;

impl SimSubsystem for MonthlyRollupStep {
    fn name(&self) -> &'static str { "monthly_rollup" }
    fn slot(&self) -> SubsystemSlot { SubsystemSlot::Company }

    fn update(&mut self, state: &mut SimState, ctx: &StepContext, _rng: &mut SubsystemRng) -> SimResult<Vec<SimEvent>> {
        if ctx.time.day % MONTH_DAYS != 0 {
            return Ok(Vec::new());
        }
        let month = state.company.run_monthly_rollup(&ctx.world, &state.config.company, ctx.tick);
        log::info!(
            "tick={} monthly rollup: revenue={:.0} expenses={:.0} cash={:.0} valuation={:.0}",
            ctx.tick, month.revenue, month.expenses, month.cash, month.valuation
        );
        Ok(vec![SimEvent::MonthlyRollup {
            tick:           ctx.tick,
            revenue:        month.revenue,
            expenses:       month.expenses,
            revenue_growth: month.revenue_growth,
            rent_paid:      month.rent_paid,
            cash:           month.cash,
            valuation:      month.valuation,
        }])
    }
}

pub struct RandomEventStep;

impl SimSubsystem for RandomEventStep {
    fn name(&self) -> &'static str { "random_event" }
    fn slot(&self) -> SubsystemSlot { SubsystemSlot::RandomEvent }

    fn update(&mut self, state: &mut SimState, ctx: &StepContext, rng: &mut SubsystemRng) -> SimResult<Vec<SimEvent>> {
        match random_event::roll(&state.config.events, rng) {
            Some(event) => Ok(random_event::apply(state, &event, ctx.tick, rng)),
            None => Ok(Vec::new()),
        }
    }
}

pub struct ObjectiveStep;

impl SimSubsystem for ObjectiveStep {
    fn name(&self) -> &'static str { "objectives" }
    fn slot(&self) -> SubsystemSlot { SubsystemSlot::Company }

    fn update(&mut self, state: &mut SimState, ctx: &StepContext, _rng: &mut SubsystemRng) -> SimResult<Vec<SimEvent>> {
        Ok(state
            .company
            .check_objectives(&ctx.world, ctx.tick)
            .into_iter()
            .map(|objective_id| SimEvent::ObjectiveCompleted { tick: ctx.tick, objective_id })
            .collect())
    }
}

pub struct AchievementStep;

impl SimSubsystem for AchievementStep {
    fn name(&self) -> &'static str { "achievements" }
    fn slot(&self) -> SubsystemSlot { SubsystemSlot::Achievement }

    fn update(&mut self, state: &mut SimState, ctx: &StepContext, _rng: &mut SubsystemRng) -> SimResult<Vec<SimEvent>> {
        let unlocked = state.achievements.check_achievements(&ctx.world, ctx.tick);
        let mut events = Vec::with_capacity(unlocked.len());
        for achievement in unlocked {
            log::info!("tick={} achievement unlocked: {}", ctx.tick, achievement.id);
            state.company.record_notification(
                "Achievement Unlocked!",
                format!("{} - {}", achievement.title, achievement.description),
                NotificationCategory::Achievement,
                ctx.tick,
            );
            events.push(SimEvent::AchievementUnlocked { tick: ctx.tick, achievement_id: achievement.id });
        }
        Ok(events)
    }
}
