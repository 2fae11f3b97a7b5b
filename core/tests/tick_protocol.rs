//! Tick protocol: one cascade in flight, boundaries, event framing.

use startup_sim_core::{
    clock::{ClockPhase, SimTime, MINUTES_PER_HOUR},
    config::SimConfig,
    engine::{SimEngine, TickOutcome},
    event::SimEvent,
    store::SimStore,
};

fn build_engine(seed: u64) -> SimEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = SimStore::in_memory().expect("in-memory store");
    SimEngine::build(format!("tick-test-{seed}"), seed, SimConfig::default_test(), store)
        .expect("build engine")
}

fn advanced(outcome: TickOutcome) -> startup_sim_core::engine::TickReport {
    match outcome {
        TickOutcome::Advanced(report) => report,
        TickOutcome::Dropped => panic!("tick was dropped"),
    }
}

#[test]
fn sixty_ticks_from_start_is_ten_oclock_with_cash_unchanged() {
    let mut engine = build_engine(1);
    let cash = engine.state().company.cash;

    assert_eq!(engine.run_ticks(60).expect("run"), 60);

    let time = engine.time();
    assert_eq!(time, SimTime { day: 1, hour: 10, minute: 0 });
    assert_eq!(engine.current_tick(), 60);
    assert_eq!(engine.state().company.cash, cash);
}

#[test]
fn request_while_advancing_is_dropped_and_changes_nothing() {
    let mut engine = build_engine(2);
    engine.run_ticks(5).expect("run");

    let gate = engine.gate();
    let permit = gate.try_enter().expect("gate idle");
    assert_eq!(engine.phase(), ClockPhase::Advancing);

    let outcome = engine.request_tick().expect("request");
    assert!(outcome.is_dropped());
    assert_eq!(engine.current_tick(), 5);
    assert_eq!(engine.dropped_requests(), 1);
    assert!(engine.store_events_for_tick(6).expect("events").is_empty());

    drop(permit);
    assert_eq!(engine.phase(), ClockPhase::Idle);
    let report = advanced(engine.request_tick().expect("request"));
    assert_eq!(report.tick, 6);
    assert_eq!(engine.dropped_requests(), 1);
}

#[test]
fn gate_is_idle_after_every_tick() {
    let mut engine = build_engine(3);
    for _ in 0..120 {
        engine.request_tick().expect("tick");
        assert_eq!(engine.phase(), ClockPhase::Idle);
    }
}

#[test]
fn events_are_framed_by_tick_started_and_completed() {
    let mut engine = build_engine(4);
    let report = advanced(engine.request_tick().expect("tick"));

    assert_eq!(report.events.first(), Some(&SimEvent::TickStarted { tick: 1 }));
    assert_eq!(report.events.last(), Some(&SimEvent::TickCompleted { tick: 1 }));
}

#[test]
fn hour_boundary_runs_the_hourly_cascade() {
    let mut engine = build_engine(5);
    engine.run_ticks(MINUTES_PER_HOUR - 1).expect("run");

    let report = advanced(engine.request_tick().expect("tick"));
    assert!(report.boundaries.hour);
    assert!(!report.boundaries.day);
    assert!(report
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::HourRolled { tick: 60, .. })));

    let next = advanced(engine.request_tick().expect("tick"));
    assert!(!next.boundaries.hour);
}

#[test]
fn day_boundary_implies_hour_boundary() {
    let mut engine = build_engine(6);
    // Day 1 starts at 09:00, so day 2 begins 15 hours in.
    engine.run_ticks(15 * MINUTES_PER_HOUR - 1).expect("run");

    let report = advanced(engine.request_tick().expect("tick"));
    assert_eq!(report.time, SimTime { day: 2, hour: 0, minute: 0 });
    assert!(report.boundaries.day);
    assert!(report.boundaries.hour);
    assert!(report.events.iter().any(|e| matches!(e, SimEvent::DayRolled { day: 2, .. })));
    assert!(report.events.iter().any(|e| matches!(e, SimEvent::UsersUpdated { .. })));
}

#[test]
fn simulated_time_never_goes_backwards() {
    let mut engine = build_engine(7);
    let mut last = engine.time();
    for _ in 0..2_000 {
        engine.request_tick().expect("tick");
        let now = engine.time();
        assert!(now > last, "{now} is not after {last}");
        last = now;
    }
}

#[test]
fn pause_and_resume_only_touch_the_rate() {
    use startup_sim_core::command::PlayerCommand;

    let mut engine = build_engine(8);
    engine
        .apply_command(PlayerCommand::SetTickRate { hz: 30.0 })
        .expect("set rate");
    engine.apply_command(PlayerCommand::Pause).expect("pause");
    assert!(engine.clock().is_paused());

    // A paused clock still accepts explicit requests.
    let report = advanced(engine.request_tick().expect("tick"));
    assert_eq!(report.tick, 1);

    engine.apply_command(PlayerCommand::Resume).expect("resume");
    assert_eq!(engine.clock().tick_rate_hz, 30.0);
}

#[test]
fn non_finite_rate_pauses() {
    use startup_sim_core::command::PlayerCommand;

    let mut engine = build_engine(9);
    engine
        .apply_command(PlayerCommand::SetTickRate { hz: f64::NAN })
        .expect("set rate");
    assert!(engine.clock().is_paused());
    engine
        .apply_command(PlayerCommand::SetTickRate { hz: -4.0 })
        .expect("set rate");
    assert_eq!(engine.clock().tick_rate_hz, 0.0);
}
