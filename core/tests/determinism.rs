//! THE MOST IMPORTANT TEST IN THE PROJECT.
//!
//! Two engines, same seed, same commands.
//! They must produce byte-identical event logs.
//! Any divergence is a blocker. Do not merge until fixed.

use startup_sim_core::{
    command::PlayerCommand,
    config::SimConfig,
    engine::SimEngine,
    store::SimStore,
};

fn build_engine(seed: u64) -> SimEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = SimStore::in_memory().expect("in-memory store");
    // Random events on: they are the main consumer of the daily streams.
    let mut config = SimConfig::default();
    config.events.daily_probability = 0.5;
    SimEngine::build("det-test".into(), seed, config, store).expect("engine")
}

/// A short scripted session touching every container.
fn play(engine: &mut SimEngine) {
    let script = [
        PlayerCommand::SetCompanyName { name: "Acme".into() },
        PlayerCommand::GenerateRecruits,
        PlayerCommand::FindInvestors,
        PlayerCommand::StartCampaign { template_id: "social_media".into(), budget: None, duration_days: Some(2) },
    ];
    for cmd in script {
        engine.apply_command(cmd).expect("command");
    }
    let recruits: Vec<String> = engine.state().team.recruits().iter().map(|r| r.id.clone()).collect();
    for id in recruits.into_iter().take(2) {
        engine.apply_command(PlayerCommand::HireRecruit { recruit_id: id }).expect("hire");
    }
    let first_feature = engine.state().product.features()[0].id.clone();
    engine
        .apply_command(PlayerCommand::StartFeature { feature_id: first_feature })
        .expect("start");

    engine.run_ticks(3 * 24 * 60).expect("run");

    let investor = engine.state().investors.potential().first().map(|i| i.id.clone());
    if let Some(investor_id) = investor {
        engine
            .apply_command(PlayerCommand::PreparePitch {
                investor_id,
                pitch_quality: 20.0,
                focus_areas: vec!["user_growth".into()],
            })
            .expect("pitch");
    }
    engine.run_ticks(2 * 24 * 60).expect("run");
}

fn collect_event_log(engine: &SimEngine) -> Vec<String> {
    engine
        .store_events()
        .expect("read events")
        .into_iter()
        .map(|e| format!("{}|{}|{}", e.tick, e.subsystem, e.payload))
        .collect()
}

#[test]
fn same_seed_produces_identical_event_logs() {
    const SEED: u64 = 0xDEAD_BEEF_CAFE_1234;

    let mut engine_a = build_engine(SEED);
    let mut engine_b = build_engine(SEED);

    play(&mut engine_a);
    play(&mut engine_b);

    let log_a = collect_event_log(&engine_a);
    let log_b = collect_event_log(&engine_b);

    assert_eq!(
        log_a.len(), log_b.len(),
        "Event log lengths differ: {} vs {}",
        log_a.len(), log_b.len()
    );

    for (i, (a, b)) in log_a.iter().zip(log_b.iter()).enumerate() {
        assert_eq!(
            a, b,
            "Event log diverged at entry {i}:\n  A: {a}\n  B: {b}"
        );
    }
    assert_eq!(engine_a.state().company, engine_b.state().company);
    assert_eq!(engine_a.state().team, engine_b.state().team);
}

#[test]
fn different_seeds_produce_different_runs() {
    let mut engine_a = build_engine(42);
    let mut engine_b = build_engine(99);

    engine_a.apply_command(PlayerCommand::GenerateRecruits).expect("recruits");
    engine_b.apply_command(PlayerCommand::GenerateRecruits).expect("recruits");

    // With different seeds the marketplace should diverge.
    // This verifies that seed differences are actually observable.
    assert_ne!(
        engine_a.state().team.recruits(),
        engine_b.state().team.recruits(),
        "Different seeds produced identical recruits; seed is not being used"
    );
}

#[test]
fn step_streams_do_not_depend_on_command_traffic() {
    // Commands draw from their own stream, so an extra command must not
    // shift what the cascade rolls later.
    let mut quiet = build_engine(7);
    let mut busy = build_engine(7);
    busy.apply_command(PlayerCommand::GenerateRecruits).expect("recruits");

    quiet.run_ticks(10 * 24 * 60).expect("run");
    busy.run_ticks(10 * 24 * 60).expect("run");

    let events = |engine: &SimEngine| -> Vec<String> {
        engine
            .store_events()
            .expect("events")
            .into_iter()
            .filter(|e| e.event_type == "random_event_occurred")
            .map(|e| e.payload)
            .collect()
    };
    assert_eq!(events(&quiet), events(&busy));
}
