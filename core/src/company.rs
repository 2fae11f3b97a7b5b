//! Company-level state: cash, revenue, reputation, users, office,
//! notifications, objectives.
//!
//! This is the slice other containers' results are reported into, always
//! through the operations below. Cash may go negative without limit; that
//! is the bankruptcy state, not an error.

use crate::{
    clock::SimTime,
    command::CommandResult,
    config::CompanyConfig,
    milestone::Milestone,
    snapshot::{CompanySnapshot, MarketingSnapshot, ProductSnapshot, TeamStats, WorldSnapshot},
    types::{EntityId, Tick},
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const REPUTATION_MIN: f64 = 0.0;
pub const REPUTATION_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReputationKind {
    Industry,
    Employer,
    Customer,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Reputation {
    pub industry: f64,
    pub employer: f64,
    pub customer: f64,
}

impl Reputation {
    pub fn get(&self, kind: ReputationKind) -> f64 {
        match kind {
            ReputationKind::Industry => self.industry,
            ReputationKind::Employer => self.employer,
            ReputationKind::Customer => self.customer,
        }
    }

    fn slot(&mut self, kind: ReputationKind) -> &mut f64 {
        match kind {
            ReputationKind::Industry => &mut self.industry,
            ReputationKind::Employer => &mut self.employer,
            ReputationKind::Customer => &mut self.customer,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    Info,
    Success,
    Warning,
    Danger,
    Finance,
    Achievement,
    Event,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id:           u64,
    pub title:        String,
    pub message:      String,
    pub category:     NotificationCategory,
    pub read:         bool,
    pub created_tick: Tick,
    pub created_at:   SimTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Objective {
    pub id:             EntityId,
    pub title:          String,
    pub description:    String,
    pub goal:           Milestone,
    pub is_complete:    bool,
    pub completed_tick: Option<Tick>,
}

/// Figures produced by one monthly rollup, for the event log.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyOutcome {
    pub revenue:        f64,
    pub expenses:       f64,
    pub revenue_growth: f64,
    pub rent_paid:      f64,
    pub cash:           f64,
    pub valuation:      f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyState {
    pub company_name:    String,
    /// Set once the player names the company.
    pub started:         bool,
    pub cash:            f64,
    /// Recurring monthly revenue.
    pub revenue:         f64,
    /// Recurring monthly expenses (salaries).
    pub expenses:        f64,
    pub valuation:       f64,
    /// Month-over-month revenue change, percent.
    pub revenue_growth:  f64,
    pub reputation:      Reputation,
    pub user_count:      u64,
    pub team_size:       usize,
    pub office_level:    u32,
    pub office_capacity: usize,
    pub revenue_history: VecDeque<f64>,
    pub expense_history: VecDeque<f64>,
    /// Insertion order. `feed()` gives the newest-first view.
    notifications:        Vec<Notification>,
    next_notification_id: u64,
    objectives:           Vec<Objective>,
}

impl CompanyState {
    pub fn new(config: &CompanyConfig) -> Self {
        let mut company = Self {
            company_name:    String::new(),
            started:         false,
            cash:            config.starting_cash,
            revenue:         0.0,
            expenses:        0.0,
            valuation:       0.0,
            revenue_growth:  0.0,
            reputation:      Reputation::default(),
            user_count:      0,
            team_size:       0,
            office_level:    0,
            office_capacity: config.initial_office_capacity,
            revenue_history: VecDeque::with_capacity(config.history_window),
            expense_history: VecDeque::with_capacity(config.history_window),
            notifications:   Vec::new(),
            next_notification_id: 1,
            objectives:      Vec::new(),
        };
        company.add_objective(
            "build_team",
            "Build Your Team",
            "Hire at least 3 team members",
            Milestone::Headcount { at_least: 3 },
        );
        company.add_objective(
            "launch_product",
            "Launch Your Product",
            "Complete at least 3 features",
            Milestone::CompletedFeatures { at_least: 3 },
        );
        company.add_objective(
            "secure_funding",
            "Secure Funding",
            "Raise at least $50,000 from investors",
            Milestone::FundingRaised { at_least: 50_000.0 },
        );
        company
    }

    // ── Per-tick ───────────────────────────────────────────────

    /// cash += (revenue − expenses) / ticks_per_month.
    /// Must run at most once per tick; the engine guarantees it.
    pub fn apply_passive_income(&mut self, ticks_per_month: u64) -> f64 {
        if ticks_per_month == 0 {
            return 0.0;
        }
        let delta = (self.revenue - self.expenses) / ticks_per_month as f64;
        self.cash += delta;
        delta
    }

    // ── Simple mutators ────────────────────────────────────────

    /// Apply `delta` to one reputation component. Returns the clamped value.
    pub fn update_reputation(&mut self, kind: ReputationKind, delta: f64) -> f64 {
        let slot = self.reputation.slot(kind);
        let next = *slot + delta;
        *slot = if next.is_nan() {
            *slot
        } else {
            next.clamp(REPUTATION_MIN, REPUTATION_MAX)
        };
        *slot
    }

    pub fn adjust_cash(&mut self, delta: f64) {
        self.cash += delta;
    }

    pub fn can_afford(&self, amount: f64) -> bool {
        self.cash >= amount
    }

    pub fn add_expense(&mut self, monthly: f64) {
        self.expenses = (self.expenses + monthly).max(0.0);
    }

    pub fn add_users(&mut self, users: u64) {
        self.user_count = self.user_count.saturating_add(users);
    }

    pub fn set_revenue(&mut self, monthly: f64) {
        self.revenue = monthly.max(0.0);
    }

    pub fn set_valuation(&mut self, valuation: f64) {
        self.valuation = valuation.max(0.0);
    }

    pub fn set_team_size(&mut self, team_size: usize) {
        self.team_size = team_size;
    }

    // ── Notifications ──────────────────────────────────────────

    /// Append a notification. Existing entries are never touched.
    pub fn record_notification(
        &mut self,
        title:    impl Into<String>,
        message:  impl Into<String>,
        category: NotificationCategory,
        tick:     Tick,
    ) -> u64 {
        let id = self.next_notification_id;
        self.next_notification_id += 1;
        self.notifications.push(Notification {
            id,
            title: title.into(),
            message: message.into(),
            category,
            read: false,
            created_tick: tick,
            created_at: SimTime::at_tick(tick),
        });
        id
    }

    /// Newest first.
    pub fn feed(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter().rev()
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    pub fn mark_read(&mut self, id: u64) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for n in &mut self.notifications {
            n.read = true;
        }
    }

    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
    }

    // ── Objectives ─────────────────────────────────────────────

    pub fn add_objective(&mut self, id: &str, title: &str, description: &str, goal: Milestone) {
        if self.objectives.iter().any(|o| o.id == id) {
            return;
        }
        self.objectives.push(Objective {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            goal,
            is_complete: false,
            completed_tick: None,
        });
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    /// Returns false for an unknown id. Completing twice is a no-op.
    pub fn complete_objective(&mut self, id: &str, tick: Tick) -> bool {
        match self.objectives.iter_mut().find(|o| o.id == id) {
            Some(o) => {
                if !o.is_complete {
                    o.is_complete = true;
                    o.completed_tick = Some(tick);
                }
                true
            }
            None => false,
        }
    }

    /// Mark every incomplete objective whose goal is met. Completion is
    /// one-way. Returns the ids completed by this call.
    pub fn check_objectives(&mut self, world: &WorldSnapshot, tick: Tick) -> Vec<EntityId> {
        let met: Vec<(EntityId, String)> = self
            .objectives
            .iter()
            .filter(|o| !o.is_complete && o.goal.is_met(world))
            .map(|o| (o.id.clone(), o.title.clone()))
            .collect();
        let mut completed = Vec::with_capacity(met.len());
        for (id, title) in met {
            self.complete_objective(&id, tick);
            self.record_notification(
                "Objective Complete",
                format!("You completed: {title}"),
                NotificationCategory::Success,
                tick,
            );
            completed.push(id);
        }
        completed
    }

    // ── Commands ───────────────────────────────────────────────

    pub fn set_company_name(&mut self, name: &str) -> CommandResult {
        let name = name.trim();
        if name.is_empty() {
            return CommandResult::fail("Company name cannot be empty");
        }
        self.company_name = name.to_string();
        self.started = true;
        CommandResult::ok()
    }

    pub fn upgrade_office(&mut self, config: &CompanyConfig) -> CommandResult {
        let cost = config.office_upgrade_cost * f64::from(self.office_level + 1);
        if !self.can_afford(cost) {
            return CommandResult::fail(format!("Office upgrade costs ${cost:.0}"));
        }
        self.cash -= cost;
        self.office_level += 1;
        self.office_capacity += config.office_capacity_step;
        CommandResult::ok()
    }

    // ── Daily cascade ──────────────────────────────────────────

    /// Daily user growth and churn from awareness and quality snapshots.
    /// Revenue follows the user base. Returns (gained, churned).
    pub fn apply_user_growth(
        &mut self,
        marketing: &MarketingSnapshot,
        product:   &ProductSnapshot,
        config:    &CompanyConfig,
    ) -> (u64, u64) {
        let quality = product.quality.clamp(0.0, 100.0) / 100.0;
        let gained = (marketing.brand_awareness * config.user_growth_per_awareness * (0.5 + quality))
            .floor()
            .max(0.0) as u64;
        let churned = (self.user_count as f64 * config.daily_churn_rate * (1.5 - quality))
            .floor()
            .max(0.0) as u64;
        self.user_count = self.user_count.saturating_add(gained).saturating_sub(churned);
        self.set_revenue(self.user_count as f64 * config.revenue_per_user);
        (gained, churned)
    }

    /// Team size and salary expenses from the team's aggregate snapshot.
    pub fn run_weekly_financial_rollup(&mut self, team: &TeamStats) {
        self.team_size = team.headcount;
        self.expenses = team.total_salary.max(0.0);
    }

    /// Shift the trailing history, recompute growth, pay the month's rent,
    /// revalue the company, and notify.
    ///
    /// Only rent leaves the cash balance here. Salaries and revenue were
    /// already settled tick by tick in `apply_passive_income`.
    pub fn run_monthly_rollup(
        &mut self,
        world:  &WorldSnapshot,
        config: &CompanyConfig,
        tick:   Tick,
    ) -> MonthlyOutcome {
        let previous = self.revenue_history.back().copied();
        push_window(&mut self.revenue_history, self.revenue, config.history_window);
        push_window(&mut self.expense_history, self.expenses, config.history_window);

        self.revenue_growth = match previous {
            Some(prev) if prev > 0.0 => (self.revenue - prev) / prev * 100.0,
            _ if self.revenue > 0.0 => 100.0,
            _ => 0.0,
        };

        let rent = config.office_rent_per_level * f64::from(self.office_level + 1);
        self.cash -= rent;

        let valuation = estimate_valuation(world, config);
        self.set_valuation(valuation);

        let net = self.revenue - self.expenses - rent;
        let category = if net >= 0.0 {
            NotificationCategory::Finance
        } else {
            NotificationCategory::Warning
        };
        self.record_notification(
            "Monthly Report",
            format!(
                "Revenue ${:.0}, expenses ${:.0}, rent ${rent:.0}. Growth {:+.1}%.",
                self.revenue, self.expenses, self.revenue_growth
            ),
            category,
            tick,
        );

        MonthlyOutcome {
            revenue: self.revenue,
            expenses: self.expenses,
            revenue_growth: self.revenue_growth,
            rent_paid: rent,
            cash: self.cash,
            valuation: self.valuation,
        }
    }

    pub fn snapshot(&self, day: u32) -> CompanySnapshot {
        CompanySnapshot {
            cash:            self.cash,
            revenue:         self.revenue,
            expenses:        self.expenses,
            valuation:       self.valuation,
            revenue_growth:  self.revenue_growth,
            reputation:      self.reputation.clone(),
            user_count:      self.user_count,
            team_size:       self.team_size,
            office_capacity: self.office_capacity,
            day,
            started:         self.started,
        }
    }
}

fn push_window(window: &mut VecDeque<f64>, value: f64, len: usize) {
    window.push_back(value);
    while window.len() > len.max(1) {
        window.pop_front();
    }
}

/// Company valuation from revenue, team, product, brand, and reputation,
/// floored at the configured minimum.
pub fn estimate_valuation(world: &WorldSnapshot, config: &CompanyConfig) -> f64 {
    let annual_revenue = world.company.revenue * 12.0;
    let reputation = world.company.reputation.industry + world.company.reputation.customer;
    let value = annual_revenue * config.revenue_multiple
        + world.team.headcount as f64 * config.value_per_employee
        + world.product.quality * config.value_per_quality
        + world.marketing.brand_awareness * config.value_per_awareness
        + reputation * config.value_per_reputation;
    value.max(config.min_valuation)
}
