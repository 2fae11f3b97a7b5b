//! Daily random events.
//!
//! At most one event fires per simulated day. Its effects are applied
//! through each target container's public operations.

use crate::{
    company::{NotificationCategory, ReputationKind},
    config::{EventConfig, RandomEventConfig, RandomEventKind},
    event::SimEvent,
    product::BugSeverity,
    rng::SubsystemRng,
    state::SimState,
    types::Tick,
};

/// Roll for today's event. `None` most days.
pub fn roll(config: &EventConfig, rng: &mut SubsystemRng) -> Option<RandomEventConfig> {
    if config.daily_probability <= 0.0 || !rng.chance(config.daily_probability) {
        return None;
    }
    let total: f64 = config.table.iter().map(|e| e.weight.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }
    let mut target = rng.range_f64(0.0, total);
    for entry in &config.table {
        let weight = entry.weight.max(0.0);
        if target < weight {
            return Some(entry.clone());
        }
        target -= weight;
    }
    config.table.last().cloned()
}

pub fn apply(
    state: &mut SimState,
    event: &RandomEventConfig,
    tick:  Tick,
    rng:   &mut SubsystemRng,
) -> Vec<SimEvent> {
    let mut events = vec![SimEvent::RandomEventOccurred { tick, kind: event.kind }];
    let (title, message, category) = match event.kind {
        RandomEventKind::ServerOutage => {
            let bug_id = state.product.report_bug("Production outage", BugSeverity::High, None, tick, rng);
            state.company.update_reputation(ReputationKind::Customer, -event.magnitude);
            events.push(SimEvent::BugReported {
                tick,
                bug_id,
                severity: BugSeverity::High.as_str().to_string(),
            });
            ("Server Outage", "Your servers went down. Customers noticed.", NotificationCategory::Danger)
        }
        RandomEventKind::ViralPost => {
            state.marketing.apply_buzz(event.magnitude, &state.config.marketing);
            ("Viral Post", "A post about your product is spreading fast.", NotificationCategory::Success)
        }
        RandomEventKind::BurnoutWave => {
            state.team.boost_morale(-event.magnitude);
            ("Burnout Wave", "The team is feeling the crunch.", NotificationCategory::Warning)
        }
        RandomEventKind::PressFeature => {
            state.company.update_reputation(ReputationKind::Industry, event.magnitude);
            ("Press Feature", "A tech blog wrote about your startup.", NotificationCategory::Success)
        }
        RandomEventKind::AngelInterest => {
            if let Some(angel) = state.config.investor.archetypes.first() {
                state.investors.add_potential(angel, rng);
            }
            ("Angel Interest", "An angel investor reached out.", NotificationCategory::Event)
        }
    };
    state.company.record_notification(title, message, category, tick);
    log::info!("tick={tick} random event {:?}", event.kind);
    events
}
