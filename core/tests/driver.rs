//! Wall-clock driver: ticks at the clock rate, idles when paused, drops
//! requests while the engine is busy.

use startup_sim_core::{
    command::PlayerCommand,
    config::SimConfig,
    driver::TickDriver,
    engine::SimEngine,
    store::SimStore,
};
use std::{
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

fn shared_engine(rate: f64) -> Arc<Mutex<SimEngine>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = SimStore::in_memory().expect("in-memory store");
    let mut config = SimConfig::default_test();
    config.clock.initial_tick_rate_hz = rate;
    let engine = SimEngine::build("driver-test".into(), 3, config, store).expect("engine");
    Arc::new(Mutex::new(engine))
}

fn current_tick(engine: &Mutex<SimEngine>) -> u64 {
    engine.lock().expect("lock").current_tick()
}

#[test]
fn driver_advances_the_clock() {
    let engine = shared_engine(200.0);
    let driver = TickDriver::spawn(Arc::clone(&engine));
    thread::sleep(Duration::from_millis(300));
    driver.stop();

    assert!(current_tick(&engine) > 0);
}

#[test]
fn zero_rate_does_not_tick() {
    let engine = shared_engine(0.0);
    let driver = TickDriver::spawn(Arc::clone(&engine));
    thread::sleep(Duration::from_millis(200));
    driver.stop();

    assert_eq!(current_tick(&engine), 0);
}

#[test]
fn pausing_through_a_command_stops_ticking() {
    let engine = shared_engine(200.0);
    let driver = TickDriver::spawn(Arc::clone(&engine));
    thread::sleep(Duration::from_millis(100));

    engine
        .lock()
        .expect("lock")
        .apply_command(PlayerCommand::Pause)
        .expect("pause");
    // Let any tick that read the old rate finish.
    thread::sleep(Duration::from_millis(100));
    let paused_at = current_tick(&engine);
    thread::sleep(Duration::from_millis(200));
    driver.stop();

    assert_eq!(current_tick(&engine), paused_at);
}

#[test]
fn requests_while_the_engine_is_held_are_dropped_not_queued() {
    let engine = shared_engine(500.0);
    let driver = TickDriver::spawn(Arc::clone(&engine));

    let held_at = {
        let guard = engine.lock().expect("lock");
        let tick = guard.current_tick();
        thread::sleep(Duration::from_millis(200));
        tick
    };
    let after_release = current_tick(&engine);
    driver.stop();

    // At 500 Hz, 200 ms of queued requests would replay ~100 ticks.
    assert!(after_release.saturating_sub(held_at) < 20, "{held_at} -> {after_release}");
}

#[test]
fn dropped_requests_are_counted() {
    let engine = shared_engine(500.0);
    let driver = TickDriver::spawn(Arc::clone(&engine));
    {
        let _guard = engine.lock().expect("lock");
        thread::sleep(Duration::from_millis(150));
    }
    let dropped = driver.dropped_requests();
    driver.stop();
    assert!(dropped > 0);
}

#[test]
fn raising_the_rate_takes_effect_without_waiting_out_the_old_interval() {
    // One tick every 20 seconds.
    let engine = shared_engine(0.05);
    let driver = TickDriver::spawn(Arc::clone(&engine));
    thread::sleep(Duration::from_millis(200));
    let before = current_tick(&engine);

    engine
        .lock()
        .expect("lock")
        .apply_command(PlayerCommand::SetTickRate { hz: 100.0 })
        .expect("rate");
    thread::sleep(Duration::from_millis(600));
    driver.stop();

    assert!(current_tick(&engine) > before + 5, "{before} -> {}", current_tick(&engine));
}

#[test]
fn a_vanishingly_small_rate_can_still_be_raised() {
    let engine = shared_engine(1e-300);
    let driver = TickDriver::spawn(Arc::clone(&engine));
    thread::sleep(Duration::from_millis(150));

    engine
        .lock()
        .expect("lock")
        .apply_command(PlayerCommand::SetTickRate { hz: 100.0 })
        .expect("rate");
    thread::sleep(Duration::from_millis(600));
    driver.stop();

    assert!(current_tick(&engine) > 5);
}
