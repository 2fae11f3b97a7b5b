//! Per-tick income, weekly and monthly rollups.

use startup_sim_core::{
    clock::{MINUTES_PER_DAY, TICKS_PER_MONTH},
    command::PlayerCommand,
    config::SimConfig,
    engine::SimEngine,
    store::SimStore,
    team::Candidate,
};

/// First tick of `day` for a run that starts on day 1 at 09:00.
fn start_of_day(day: u64) -> u64 {
    15 * 60 + (day - 2) * MINUTES_PER_DAY
}

fn build_engine() -> SimEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = SimStore::in_memory().expect("in-memory store");
    SimEngine::build("rollup-test".into(), 17, SimConfig::default_test(), store).expect("engine")
}

#[test]
fn salaries_drain_cash_tick_by_tick() {
    let mut engine = build_engine();
    engine
        .apply_command(PlayerCommand::Hire { candidate: Candidate::new("c-1", "Ada", 2_160.0) })
        .expect("hire");

    engine.run_ticks(1_000).expect("run");

    let expected = 10_000.0 - 2_160.0 / TICKS_PER_MONTH as f64 * 1_000.0;
    let cash = engine.state().company.cash;
    assert!((cash - expected).abs() < 1e-6, "{cash} vs {expected}");
}

#[test]
fn weekly_rollup_syncs_expenses_with_the_roster() {
    let mut engine = build_engine();
    engine
        .apply_command(PlayerCommand::Hire { candidate: Candidate::new("c-1", "Ada", 1_200.0) })
        .expect("hire");
    engine
        .apply_command(PlayerCommand::Hire { candidate: Candidate::new("c-2", "Bo", 1_300.0) })
        .expect("hire");

    engine.run_ticks(start_of_day(7)).expect("run");

    assert_eq!(engine.store().event_count(&engine.run_id, "weekly_rollup").expect("count"), 1);
    assert_eq!(engine.state().company.expenses, 2_500.0);
    assert_eq!(engine.state().company.team_size, 2);
}

#[test]
fn monthly_rollup_pays_rent_and_revalues() {
    let mut engine = build_engine();

    engine.run_ticks(start_of_day(30) - 1).expect("run");
    let before = engine.state().company.cash;
    assert_eq!(engine.state().company.valuation, 0.0);

    engine.request_tick().expect("tick");

    let company = &engine.state().company;
    assert_eq!(company.cash, before - 500.0);
    assert!(company.valuation >= 500_000.0);
    assert_eq!(company.revenue_history.len(), 1);
    assert_eq!(engine.store().event_count(&engine.run_id, "monthly_rollup").expect("count"), 1);
}

#[test]
fn rollups_fire_on_their_calendar_days_only() {
    let mut engine = build_engine();
    engine.run_ticks(start_of_day(31)).expect("run");

    // Days 7, 14, 21 and 28.
    assert_eq!(engine.store().event_count(&engine.run_id, "weekly_rollup").expect("count"), 4);
    assert_eq!(engine.store().event_count(&engine.run_id, "monthly_rollup").expect("count"), 1);
    assert_eq!(engine.store().event_count(&engine.run_id, "day_rolled").expect("count"), 30);
}
