//! The simulation engine: the clock's tick handler and the command surface.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   Every tick:
//!     1. Passive income            (company)
//!   On an hour boundary:
//!     2. Product recompute         (dev points, feature completion)
//!     3. Marketing recompute       (campaign accrual and retirement)
//!     4. Team recompute            (morale and energy drift)
//!     5. Investor recompute        (relationship drift, offer expiry)
//!   On a day boundary:
//!     6. User growth and churn
//!     7. Weekly financial rollup   (day % 7 == 0)
//!     8. Monthly rollup            (day % 30 == 0)
//!     9. Random event              (configured daily probability)
//!    10. Objective checks
//!    11. Achievement checks
//!
//! RULES:
//!   - At most one cascade is in flight. A request that finds the gate
//!     held is dropped, not queued, and changes nothing.
//!   - The gate is released only after every step of the tick has run.
//!   - Each step is fault-isolated: an `Err` or a panic is logged and
//!     recorded, and the cascade carries on.
//!   - The hourly steps read nothing the others write within the same
//!     hour. A step that comes to depend on another must be placed after
//!     it here, and the dependency noted above.
//!   - All randomness flows through the RngBank.
//!   - All state changes are recorded in the event log.

use crate::{
    achievement::Reward,
    cascade::{
        AchievementStep, InvestorHourStep, MarketingHourStep, MonthlyRollupStep, ObjectiveStep,
        PassiveIncomeStep, ProductHourStep, RandomEventStep, TeamHourStep, UserGrowthStep,
        WeeklyRollupStep,
    },
    clock::{Boundaries, ClockPhase, SimClock, SimTime, TickGate},
    command::{CommandResult, PlayerCommand},
    company::{self, NotificationCategory, ReputationKind},
    config::SimConfig,
    error::{SimError, SimResult},
    event::{EventLogEntry, SimEvent},
    rng::{RngBank, SubsystemRng, SubsystemSlot},
    state::{
        SimState, ACHIEVEMENTS_KEY, CLOCK_KEY, COMPANY_KEY, INVESTOR_KEY, MARKETING_KEY,
        PRODUCT_KEY, TEAM_KEY,
    },
    store::SimStore,
    subsystem::{SimSubsystem, StepContext},
    types::{RunId, Tick},
};
use serde::de::DeserializeOwned;
use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

const ENGINE_SOURCE: &str = "engine";
const COMMAND_SOURCE: &str = "command";

/// What one accepted tick did.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick:         Tick,
    pub time:         SimTime,
    pub boundaries:   Boundaries,
    pub events:       Vec<SimEvent>,
    /// Names of steps that returned an error or panicked.
    pub failed_steps: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// The gate was held. Nothing changed.
    Dropped,
    Advanced(TickReport),
}

impl TickOutcome {
    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped)
    }

    pub fn report(&self) -> Option<&TickReport> {
        match self {
            Self::Dropped => None,
            Self::Advanced(report) => Some(report),
        }
    }
}

pub struct SimEngine {
    pub run_id:   RunId,
    pub rng_bank: RngBank,
    seed:         u64,
    state:        SimState,
    gate:         Arc<TickGate>,
    per_tick:     Vec<Box<dyn SimSubsystem>>,
    hourly:       Vec<Box<dyn SimSubsystem>>,
    daily:        Vec<Box<dyn SimSubsystem>>,
    store:        SimStore,
    dropped:      u64,
}

impl SimEngine {
    /// An engine with no cascade steps. Migrates the store and records
    /// the run.
    pub fn new(run_id: RunId, seed: u64, config: SimConfig, store: SimStore) -> SimResult<Self> {
        store.migrate()?;
        store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"))?;
        let rng_bank = RngBank::new(seed);
        let state = SimState::new(run_id.clone(), config, &rng_bank);
        let mut engine = Self::assemble(run_id, seed, state, store);
        if engine.store.events_for_tick(&engine.run_id, 0)?.is_empty() {
            let init = SimEvent::RunInitialized { run_id: engine.run_id.clone(), seed };
            engine.persist(0, &[(ENGINE_SOURCE, init)])?;
        }
        Ok(engine)
    }

    /// Build a fully wired engine with every built-in step registered.
    /// Call this instead of new() + manual register calls.
    pub fn build(run_id: RunId, seed: u64, config: SimConfig, store: SimStore) -> SimResult<Self> {
        let mut engine = Self::new(run_id, seed, config, store)?;
        engine.register_builtin_steps();
        Ok(engine)
    }

    /// Restore a saved run. The seed comes from the run record; each
    /// container without a saved entry starts from defaults.
    pub fn load(run_id: RunId, config: SimConfig, store: SimStore) -> SimResult<Self> {
        store.migrate()?;
        let seed = store.run_seed(&run_id)?.ok_or(SimError::RunNotInitialized)?;
        let rng_bank = RngBank::new(seed);
        let mut state = SimState::new(run_id.clone(), config, &rng_bank);

        if let Some(clock) = restore::<SimClock>(&store, &run_id, CLOCK_KEY)? {
            state.clock = clock;
        }
        if let Some(company) = restore(&store, &run_id, COMPANY_KEY)? {
            state.company = company;
        }
        if let Some(team) = restore(&store, &run_id, TEAM_KEY)? {
            state.team = team;
        }
        if let Some(product) = restore(&store, &run_id, PRODUCT_KEY)? {
            state.product = product;
        }
        if let Some(marketing) = restore(&store, &run_id, MARKETING_KEY)? {
            state.marketing = marketing;
        }
        if let Some(investors) = restore(&store, &run_id, INVESTOR_KEY)? {
            state.investors = investors;
        }
        if let Some(achievements) = restore(&store, &run_id, ACHIEVEMENTS_KEY)? {
            state.achievements = achievements;
        }
        log::info!("Loaded run {run_id} at tick {}", state.clock.current_tick);

        let mut engine = Self::assemble(run_id, seed, state, store);
        engine.register_builtin_steps();
        Ok(engine)
    }

    fn assemble(run_id: RunId, seed: u64, state: SimState, store: SimStore) -> Self {
        Self {
            run_id,
            rng_bank: RngBank::new(seed),
            seed,
            state,
            gate: TickGate::new(),
            per_tick: Vec::new(),
            hourly: Vec::new(),
            daily: Vec::new(),
            store,
            dropped: 0,
        }
    }

    fn register_builtin_steps(&mut self) {
        // EXECUTION ORDER is fixed and documented above. Never reorder.
        self.register_per_tick(Box::new(PassiveIncomeStep));

        self.register_hourly(Box::new(ProductHourStep));
        self.register_hourly(Box::new(MarketingHourStep));
        self.register_hourly(Box::new(TeamHourStep));
        self.register_hourly(Box::new(InvestorHourStep));

        self.register_daily(Box::new(UserGrowthStep));
        self.register_daily(Box::new(WeeklyRollupStep));
        self.register_daily(Box::new(MonthlyRollupStep));
        self.register_daily(Box::new(RandomEventStep));
        self.register_daily(Box::new(ObjectiveStep));
        self.register_daily(Box::new(AchievementStep));
    }

    /// Register a step. Call in the documented execution order.
    pub fn register_per_tick(&mut self, step: Box<dyn SimSubsystem>) {
        self.per_tick.push(step);
    }

    pub fn register_hourly(&mut self, step: Box<dyn SimSubsystem>) {
        self.hourly.push(step);
    }

    pub fn register_daily(&mut self, step: Box<dyn SimSubsystem>) {
        self.daily.push(step);
    }

    // ── Tick protocol ──────────────────────────────────────────

    /// Advance one simulated minute and run its cascade, unless a cascade
    /// already holds the gate.
    pub fn request_tick(&mut self) -> SimResult<TickOutcome> {
        let Some(_permit) = self.gate.try_enter() else {
            self.dropped += 1;
            log::trace!(
                "tick={} request dropped: cascade in flight",
                self.state.clock.current_tick
            );
            return Ok(TickOutcome::Dropped);
        };

        let (tick, boundaries) = self.state.clock.advance();
        let time = self.state.clock.time();
        let mut logged: Vec<(&'static str, SimEvent)> = Vec::new();
        let mut failed_steps = Vec::new();

        run_steps(&mut self.per_tick, &mut self.state, &self.rng_bank, tick, time, &mut logged, &mut failed_steps);

        if boundaries.hour {
            logged.push((ENGINE_SOURCE, SimEvent::HourRolled { tick, time }));
            run_steps(&mut self.hourly, &mut self.state, &self.rng_bank, tick, time, &mut logged, &mut failed_steps);
        }
        if boundaries.day {
            log::debug!("tick={tick} day {} begins", time.day);
            logged.push((ENGINE_SOURCE, SimEvent::DayRolled { tick, day: time.day }));
            run_steps(&mut self.daily, &mut self.state, &self.rng_bank, tick, time, &mut logged, &mut failed_steps);
        }

        self.persist(tick, &logged)?;

        let mut events = Vec::with_capacity(logged.len() + 2);
        events.push(SimEvent::TickStarted { tick });
        events.extend(logged.into_iter().map(|(_, e)| e));
        events.push(SimEvent::TickCompleted { tick });

        // _permit drops on return: Advancing -> Idle.
        Ok(TickOutcome::Advanced(TickReport { tick, time, boundaries, events, failed_steps }))
    }

    /// Call request_tick n times. Returns how many were accepted.
    /// Used for testing and fast-forward.
    pub fn run_ticks(&mut self, n: u64) -> SimResult<u64> {
        let mut accepted = 0;
        for _ in 0..n {
            if !self.request_tick()?.is_dropped() {
                accepted += 1;
            }
        }
        Ok(accepted)
    }

    // ── Commands ───────────────────────────────────────────────

    /// Validate and apply one player command. Validation failures come back
    /// as `success: false`; `Err` is reserved for persistence failures.
    pub fn apply_command(&mut self, command: PlayerCommand) -> SimResult<CommandResult> {
        let tick = self.state.clock.current_tick;
        let salt = self.state.clock.next_command_salt();
        let mut rng = self.rng_bank.stream(SubsystemSlot::Command, tick, salt);

        let (result, events) = dispatch(&mut self.state, &command, tick, &mut rng);
        if result.success {
            log::debug!("tick={tick} command {} ok", command.type_name());
        } else {
            log::debug!(
                "tick={tick} command {} rejected: {}",
                command.type_name(),
                result.message.as_deref().unwrap_or("")
            );
        }

        let mut logged = Vec::with_capacity(events.len() + 1);
        logged.push((
            COMMAND_SOURCE,
            SimEvent::PlayerCommandReceived {
                tick,
                command_type: command.type_name().to_string(),
                success: result.success,
            },
        ));
        logged.extend(events.into_iter().map(|e| (COMMAND_SOURCE, e)));
        self.persist(tick, &logged)?;
        Ok(result)
    }

    // ── Persistence ────────────────────────────────────────────

    /// Write every container under its key.
    pub fn save(&self) -> SimResult<()> {
        let tick = self.state.clock.current_tick;
        let s = &self.state;
        let entries: [(&str, String); 7] = [
            (CLOCK_KEY, serde_json::to_string(&s.clock)?),
            (COMPANY_KEY, serde_json::to_string(&s.company)?),
            (TEAM_KEY, serde_json::to_string(&s.team)?),
            (PRODUCT_KEY, serde_json::to_string(&s.product)?),
            (MARKETING_KEY, serde_json::to_string(&s.marketing)?),
            (INVESTOR_KEY, serde_json::to_string(&s.investors)?),
            (ACHIEVEMENTS_KEY, serde_json::to_string(&s.achievements)?),
        ];
        for (key, json) in &entries {
            self.store.save_container(&self.run_id, key, json, tick)?;
        }
        log::debug!("tick={tick} saved {} containers", entries.len());
        Ok(())
    }

    fn persist(&mut self, tick: Tick, logged: &[(&'static str, SimEvent)]) -> SimResult<()> {
        let entries = logged
            .iter()
            .map(|(source, event)| {
                Ok(EventLogEntry {
                    id:         None,
                    run_id:     self.run_id.clone(),
                    tick,
                    subsystem:  source.to_string(),
                    event_type: event.type_name().to_string(),
                    payload:    serde_json::to_string(event)?,
                })
            })
            .collect::<SimResult<Vec<_>>>()?;
        self.store.append_events(&entries)
    }

    /// Query events for a specific tick from the store.
    /// Used by the determinism test and replay tooling.
    pub fn store_events_for_tick(&self, tick: Tick) -> SimResult<Vec<EventLogEntry>> {
        self.store.events_for_tick(&self.run_id, tick)
    }

    pub fn store_events(&self) -> SimResult<Vec<EventLogEntry>> {
        self.store.events_for_run(&self.run_id)
    }

    pub fn store(&self) -> &SimStore {
        &self.store
    }

    // ── Accessors ──────────────────────────────────────────────

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    /// Direct state access for tooling and tests.
    /// Production paths go through commands and the cascade.
    pub fn state_mut(&mut self) -> &mut SimState {
        &mut self.state
    }

    pub fn clock(&self) -> &SimClock {
        &self.state.clock
    }

    pub fn current_tick(&self) -> Tick {
        self.state.clock.current_tick
    }

    pub fn time(&self) -> SimTime {
        self.state.clock.time()
    }

    /// The reentrancy gate. Whoever schedules ticks may hold a clone.
    pub fn gate(&self) -> Arc<TickGate> {
        Arc::clone(&self.gate)
    }

    pub fn phase(&self) -> ClockPhase {
        self.gate.phase()
    }

    pub fn dropped_requests(&self) -> u64 {
        self.dropped
    }
}

fn restore<T: DeserializeOwned>(store: &SimStore, run_id: &str, key: &str) -> SimResult<Option<T>> {
    match store.load_container(run_id, key)? {
        Some(json) => serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| {
                log::error!("Cannot restore {key}: {e}");
                SimError::UnknownState { key: key.to_string() }
            }),
        None => Ok(None),
    }
}

/// Run each step under fault isolation, collecting its events.
fn run_steps(
    steps:        &mut [Box<dyn SimSubsystem>],
    state:        &mut SimState,
    rng_bank:     &RngBank,
    tick:         Tick,
    time:         SimTime,
    logged:       &mut Vec<(&'static str, SimEvent)>,
    failed_steps: &mut Vec<String>,
) {
    for step in steps.iter_mut() {
        let name = step.name();
        let ctx = StepContext { tick, time, world: state.snapshot() };
        let mut rng = rng_bank.for_subsystem_at_tick(step.slot(), tick);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| step.update(state, &ctx, &mut rng)));
        let error = match outcome {
            Ok(Ok(events)) => {
                logged.extend(events.into_iter().map(|e| (name, e)));
                continue;
            }
            Ok(Err(e)) => e,
            Err(payload) => SimError::StepPanicked {
                step:    name.to_string(),
                message: panic_message(payload.as_ref()),
            },
        };
        log::error!("tick={tick} cascade step '{name}' failed: {error}");
        failed_steps.push(name.to_string());
        logged.push((
            ENGINE_SOURCE,
            SimEvent::CascadeStepFailed { tick, step: name.to_string(), error: error.to_string() },
        ));
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Route a command to its container and apply cross-container effects
/// (cash, expenses, reputation) through the target's operations.
fn dispatch(
    state:   &mut SimState,
    command: &PlayerCommand,
    tick:    Tick,
    rng:     &mut SubsystemRng,
) -> (CommandResult, Vec<SimEvent>) {
    let mut events = Vec::new();
    let result = match command {
        // ── Clock ──────────────────────────────────
        PlayerCommand::Pause => {
            state.clock.pause();
            CommandResult::ok()
        }
        PlayerCommand::Resume => {
            state.clock.resume();
            CommandResult::ok()
        }
        PlayerCommand::SetTickRate { hz } => {
            state.clock.set_tick_rate(*hz);
            CommandResult::ok()
        }

        // ── Company ────────────────────────────────
        PlayerCommand::SetCompanyName { name } => state.company.set_company_name(name),
        PlayerCommand::UpgradeOffice => {
            let result = state.company.upgrade_office(&state.config.company);
            if result.success {
                events.push(SimEvent::OfficeUpgraded {
                    tick,
                    level:    state.company.office_level,
                    capacity: state.company.office_capacity,
                });
            }
            result
        }
        PlayerCommand::MarkNotificationRead { notification_id } => {
            if state.company.mark_read(*notification_id) {
                CommandResult::ok()
            } else {
                CommandResult::fail("Notification not found")
            }
        }
        PlayerCommand::MarkAllNotificationsRead => {
            state.company.mark_all_read();
            CommandResult::ok()
        }
        PlayerCommand::ClearNotifications => {
            state.company.clear_notifications();
            CommandResult::ok()
        }

        // ── Team ───────────────────────────────────
        PlayerCommand::GenerateRecruits => {
            let count = state.team.generate_recruits(
                state.company.reputation.employer,
                &state.config.team,
                rng,
            );
            CommandResult::ok_with_message(format!("{count} candidates available"))
        }
        PlayerCommand::Hire { candidate } => {
            let salary = candidate.salary_expectation;
            let result = state.team.hire(candidate.clone(), state.company.office_capacity, tick);
            book_hire(state, &result, salary, tick, &mut events);
            result
        }
        PlayerCommand::HireRecruit { recruit_id } => {
            let salary = state
                .team
                .recruits()
                .iter()
                .find(|r| &r.id == recruit_id)
                .map(|r| r.salary_expectation)
                .unwrap_or(0.0);
            let result = state.team.hire_recruit(recruit_id, state.company.office_capacity, tick);
            book_hire(state, &result, salary, tick, &mut events);
            result
        }
        PlayerCommand::Fire { employee_id } => match state.team.fire(employee_id) {
            Some(employee) => {
                state.company.add_expense(-employee.salary);
                state.company.set_team_size(state.team.headcount());
                state.company.update_reputation(
                    ReputationKind::Employer,
                    -state.config.team.fire_reputation_penalty,
                );
                events.push(SimEvent::EmployeeFired { tick, employee_id: employee.id.clone() });
                CommandResult::ok_with_id(employee.id)
            }
            None => CommandResult::fail("Team member not found"),
        },
        PlayerCommand::Train { employee_id, skill, amount } => {
            state.team.train(employee_id, *skill, *amount)
        }

        // ── Product ────────────────────────────────
        PlayerCommand::AddFeature { name, description, complexity, dependencies } => {
            state.product.add_feature(name, description, *complexity, dependencies.clone(), rng)
        }
        PlayerCommand::StartFeature { feature_id } => {
            let result = state.product.start_feature(feature_id);
            if result.success {
                events.push(SimEvent::FeatureStarted { tick, feature_id: feature_id.clone() });
            }
            result
        }
        PlayerCommand::FixBug { bug_id } => {
            let result = state.product.fix_bug(bug_id, &state.config.product);
            if result.success {
                events.push(SimEvent::BugFixed { tick, bug_id: bug_id.clone() });
            }
            result
        }
        PlayerCommand::SelectTech { category, tech_id } => {
            match state.config.tech_option(tech_id).filter(|t| t.category == *category).cloned() {
                Some(option) if state.company.can_afford(option.cost) => {
                    let cost = option.cost;
                    let result = state.product.select_tech(option);
                    state.company.adjust_cash(-cost);
                    result
                }
                Some(option) => CommandResult::fail(format!("{} costs ${:.0}", option.name, option.cost)),
                None => CommandResult::fail("Unknown technology for this category"),
            }
        }
        PlayerCommand::CreateRelease { notes, rush } => {
            match state.product.create_release(notes, *rush, &state.config.product, tick, rng) {
                Ok(release) => {
                    let divisor = state.config.product.release_reputation_divisor.max(1.0);
                    state.company.update_reputation(
                        ReputationKind::Customer,
                        (release.quality_score - 50.0) / divisor,
                    );
                    state.company.record_notification(
                        "Release Shipped",
                        format!("Version {} is live (quality {:.0})", release.version, release.quality_score),
                        NotificationCategory::Success,
                        tick,
                    );
                    events.push(SimEvent::ReleaseShipped {
                        tick,
                        release_id: release.id.clone(),
                        version:    release.version.clone(),
                        quality:    release.quality_score,
                    });
                    CommandResult::ok_with_id(release.id)
                }
                Err(message) => CommandResult::fail(message),
            }
        }

        // ── Marketing ──────────────────────────────
        PlayerCommand::StartCampaign { template_id, budget, duration_days } => {
            match state.config.campaign_template(template_id) {
                Some(template) => {
                    let quality = state.product.quality();
                    match state.marketing.start_campaign(
                        template,
                        *budget,
                        *duration_days,
                        state.company.cash,
                        quality,
                        &state.config.marketing,
                        tick,
                        rng,
                    ) {
                        Ok(campaign) => {
                            state.company.adjust_cash(-campaign.budget);
                            events.push(SimEvent::CampaignStarted {
                                tick,
                                campaign_id: campaign.id.clone(),
                                budget:      campaign.budget,
                            });
                            CommandResult::ok_with_id(campaign.id)
                        }
                        Err(message) => CommandResult::fail(message),
                    }
                }
                None => CommandResult::fail("Invalid campaign template"),
            }
        }
        PlayerCommand::CancelCampaign { campaign_id } => {
            let result = state.marketing.cancel_campaign(campaign_id, tick);
            if result.success {
                events.push(SimEvent::CampaignCancelled { tick, campaign_id: campaign_id.clone() });
            }
            result
        }
        PlayerCommand::BoostCampaign { campaign_id, additional_budget } => {
            match state.marketing.boost_campaign(
                campaign_id,
                *additional_budget,
                state.company.cash,
                &state.config.marketing,
            ) {
                Ok(spent) => {
                    state.company.adjust_cash(-spent);
                    CommandResult::ok_with_id(campaign_id.clone())
                }
                Err(message) => CommandResult::fail(message),
            }
        }
        PlayerCommand::SelectAudience { audience_id } => {
            state.marketing.select_audience(audience_id, &state.config.marketing)
        }
        PlayerCommand::UnlockChannel { channel_id } => {
            match state.marketing.unlock_channel(channel_id, state.company.cash) {
                Ok(cost) => {
                    state.company.adjust_cash(-cost);
                    CommandResult::ok_with_id(channel_id.clone())
                }
                Err(message) => CommandResult::fail(message),
            }
        }

        // ── Investors ──────────────────────────────
        PlayerCommand::FindInvestors => {
            let found = state.investors.find_investors(
                state.company.reputation.industry,
                &state.config.investor,
                rng,
            );
            if found.is_empty() {
                CommandResult::fail("No investors are interested right now")
            } else {
                CommandResult::ok_with_message(format!("Found {} potential investors", found.len()))
            }
        }
        PlayerCommand::PreparePitch { investor_id, pitch_quality, focus_areas } => {
            let world = state.snapshot();
            let valuation = company::estimate_valuation(&world, &state.config.company);
            match state.investors.prepare_pitch(
                investor_id,
                *pitch_quality,
                focus_areas,
                &world,
                valuation,
                &state.config.investor,
                tick,
                rng,
            ) {
                Ok(outcome) => match outcome.offer {
                    Some(offer) => {
                        events.push(SimEvent::OfferMade {
                            tick,
                            investor_id: investor_id.clone(),
                            amount:      offer.amount,
                            equity:      offer.equity,
                        });
                        CommandResult {
                            success:   true,
                            message:   Some(format!("Offer: ${:.0} for {:.1}%", offer.amount, offer.equity)),
                            entity_id: Some(investor_id.clone()),
                        }
                    }
                    None => CommandResult::ok_with_message(format!(
                        "Interest {:.0}, not enough for an offer",
                        outcome.interest
                    )),
                },
                Err(message) => CommandResult::fail(message),
            }
        }
        PlayerCommand::AcceptOffer { investor_id } => {
            match state.investors.accept_offer(investor_id, &state.config.investor, tick) {
                Ok(investor) => {
                    state.company.adjust_cash(investor.invested);
                    state.company.record_notification(
                        "Investment Secured",
                        format!("{} invested ${:.0}", investor.name, investor.invested),
                        NotificationCategory::Finance,
                        tick,
                    );
                    events.push(SimEvent::InvestorJoined {
                        tick,
                        investor_id: investor.id.clone(),
                        amount:      investor.invested,
                        equity:      investor.equity_percent,
                    });
                    CommandResult::ok_with_id(investor.id)
                }
                Err(message) => CommandResult::fail(message),
            }
        }
        PlayerCommand::RejectOffer { investor_id } => {
            state.investors.reject_offer(investor_id, &state.config.investor, tick)
        }
        PlayerCommand::ScheduleMeeting { investor_id } => {
            state.investors.schedule_meeting(investor_id, &state.config.investor, tick)
        }

        // ── Achievements ───────────────────────────
        PlayerCommand::ClaimReward { achievement_id } => {
            match state.achievements.claim_reward(achievement_id) {
                Ok(reward) => {
                    apply_reward(state, &reward);
                    let title = state
                        .achievements
                        .get(achievement_id)
                        .map(|a| a.title.clone())
                        .unwrap_or_default();
                    state.company.record_notification(
                        "Reward Claimed",
                        format!("You claimed the reward for \"{title}\""),
                        NotificationCategory::Success,
                        tick,
                    );
                    events.push(SimEvent::RewardClaimed { tick, achievement_id: achievement_id.clone() });
                    CommandResult::ok_with_id(achievement_id.clone())
                }
                Err(message) => CommandResult::fail(message),
            }
        }
    };
    (result, events)
}

fn book_hire(state: &mut SimState, result: &CommandResult, salary: f64, tick: Tick, events: &mut Vec<SimEvent>) {
    if !result.success {
        return;
    }
    state.company.add_expense(salary);
    state.company.set_team_size(state.team.headcount());
    if let Some(id) = &result.entity_id {
        events.push(SimEvent::EmployeeHired { tick, employee_id: id.clone(), salary });
    }
}

fn apply_reward(state: &mut SimState, reward: &Reward) {
    match *reward {
        Reward::Cash { amount } => state.company.adjust_cash(amount),
        Reward::Reputation { kind, amount } => {
            state.company.update_reputation(kind, amount);
        }
        Reward::Users { count } => state.company.add_users(count),
        Reward::TeamBoost { morale } => state.team.boost_morale(morale),
    }
}
