//! A failing step is logged and skipped; the rest of the cascade runs and
//! the gate still returns to Idle.

use startup_sim_core::{
    clock::ClockPhase,
    config::SimConfig,
    engine::{SimEngine, TickOutcome},
    error::{SimError, SimResult},
    event::SimEvent,
    rng::{SubsystemRng, SubsystemSlot},
    state::SimState,
    store::SimStore,
    subsystem::{SimSubsystem, StepContext},
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

struct PanickingStep;

impl SimSubsystem for PanickingStep {
    fn name(&self) -> &'static str { "panicking" }
    fn slot(&self) -> SubsystemSlot { SubsystemSlot::Company }

    fn update(&mut self, _: &mut SimState, _: &StepContext, _: &mut SubsystemRng) -> SimResult<Vec<SimEvent>> {
        panic!("boom");
    }
}

struct FailingStep;

impl SimSubsystem for FailingStep {
    fn name(&self) -> &'static str { "failing" }
    fn slot(&self) -> SubsystemSlot { SubsystemSlot::Company }

    fn update(&mut self, _: &mut SimState, _: &StepContext, _: &mut SubsystemRng) -> SimResult<Vec<SimEvent>> {
        Err(SimError::EntityNotFound { container: "test", id: "nothing".into() })
    }
}

/// Counts runs and nudges cash so its effect is observable.
struct CountingStep {
    name: &'static str,
    runs: Arc<AtomicU64>,
}

impl CountingStep {
    fn boxed(name: &'static str, runs: &Arc<AtomicU64>) -> Box<Self> {
        Box::new(Self { name, runs: Arc::clone(runs) })
    }
}

impl SimSubsystem for CountingStep {
    fn name(&self) -> &'static str { self.name }
    fn slot(&self) -> SubsystemSlot { SubsystemSlot::Company }

    fn update(&mut self, state: &mut SimState, _: &StepContext, _: &mut SubsystemRng) -> SimResult<Vec<SimEvent>> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        state.company.adjust_cash(1.0);
        Ok(Vec::new())
    }
}

fn bare_engine() -> SimEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = SimStore::in_memory().expect("in-memory store");
    SimEngine::new("fault-test".into(), 7, SimConfig::default_test(), store).expect("engine")
}

#[test]
fn failing_steps_do_not_stop_later_steps() {
    let mut engine = bare_engine();
    let runs = Arc::new(AtomicU64::new(0));
    engine.register_per_tick(Box::new(PanickingStep));
    engine.register_per_tick(Box::new(FailingStep));
    engine.register_per_tick(CountingStep::boxed("counting", &runs));
    let cash = engine.state().company.cash;

    let outcome = engine.request_tick().expect("tick");
    let TickOutcome::Advanced(report) = outcome else {
        panic!("tick dropped");
    };

    assert_eq!(report.failed_steps, vec!["panicking".to_string(), "failing".to_string()]);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(engine.state().company.cash, cash + 1.0);
    assert_eq!(engine.phase(), ClockPhase::Idle);
}

#[test]
fn steps_on_both_sides_of_a_failure_run_exactly_once() {
    let mut engine = bare_engine();
    let first = Arc::new(AtomicU64::new(0));
    let third = Arc::new(AtomicU64::new(0));
    let fourth = Arc::new(AtomicU64::new(0));
    engine.register_per_tick(CountingStep::boxed("first", &first));
    engine.register_per_tick(Box::new(FailingStep));
    engine.register_per_tick(CountingStep::boxed("third", &third));
    engine.register_per_tick(CountingStep::boxed("fourth", &fourth));
    let cash = engine.state().company.cash;

    let report = engine.request_tick().expect("tick").report().cloned().expect("advanced");

    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(third.load(Ordering::SeqCst), 1);
    assert_eq!(fourth.load(Ordering::SeqCst), 1);
    assert_eq!(report.failed_steps, vec!["failing".to_string()]);
    assert_eq!(engine.state().company.cash, cash + 3.0);
    assert_eq!(engine.phase(), ClockPhase::Idle);
}

#[test]
fn a_failing_hourly_step_does_not_skip_the_daily_steps() {
    let mut engine = bare_engine();
    let hourly = Arc::new(AtomicU64::new(0));
    let daily = Arc::new(AtomicU64::new(0));
    engine.register_hourly(Box::new(PanickingStep));
    engine.register_hourly(CountingStep::boxed("hourly", &hourly));
    engine.register_daily(CountingStep::boxed("daily", &daily));

    // Day 1 starts at 09:00, so tick 900 is the first midnight.
    engine.run_ticks(899).expect("run");
    assert_eq!(daily.load(Ordering::SeqCst), 0);

    let report = engine.request_tick().expect("tick").report().cloned().expect("advanced");
    assert!(report.boundaries.day);
    assert_eq!(report.failed_steps, vec!["panicking".to_string()]);
    assert_eq!(hourly.load(Ordering::SeqCst), 15);
    assert_eq!(daily.load(Ordering::SeqCst), 1);
    assert_eq!(engine.phase(), ClockPhase::Idle);
}

#[test]
fn failures_are_recorded_in_the_event_log() {
    let mut engine = bare_engine();
    engine.register_per_tick(Box::new(PanickingStep));
    engine.run_ticks(3).expect("run");

    let failures = engine
        .store()
        .event_count(&engine.run_id, "cascade_step_failed")
        .expect("count");
    assert_eq!(failures, 3);

    let entries = engine.store_events_for_tick(1).expect("events");
    let failure = entries
        .iter()
        .find(|e| e.event_type == "cascade_step_failed")
        .expect("failure entry");
    let event: SimEvent = serde_json::from_str(&failure.payload).expect("payload");
    match event {
        SimEvent::CascadeStepFailed { step, error, .. } => {
            assert_eq!(step, "panicking");
            assert!(error.contains("boom"), "{error}");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn clock_keeps_advancing_past_a_broken_step() {
    let mut engine = bare_engine();
    engine.register_hourly(Box::new(FailingStep));
    assert_eq!(engine.run_ticks(180).expect("run"), 180);
    assert_eq!(engine.current_tick(), 180);
    assert_eq!(engine.dropped_requests(), 0);
}
