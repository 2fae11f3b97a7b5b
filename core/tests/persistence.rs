//! Save and restore through the container_state table.

use startup_sim_core::{
    command::PlayerCommand,
    config::SimConfig,
    engine::SimEngine,
    error::SimError,
    state::{COMPANY_KEY, CONTAINER_KEYS, TEAM_KEY},
    store::SimStore,
    team::Candidate,
};
use std::path::PathBuf;

/// A throwaway database file, removed on drop.
struct TempDb(PathBuf);

impl TempDb {
    fn new(tag: &str) -> Self {
        let path = std::env::temp_dir().join(format!("startup-sim-{tag}-{}.db", uuid::Uuid::new_v4()));
        Self(path)
    }

    fn path(&self) -> &str {
        self.0.to_str().expect("utf-8 temp path")
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", self.0.display()));
        }
    }
}

fn build_engine(db: &TempDb, run_id: &str) -> SimEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = SimStore::open(db.path()).expect("open store");
    SimEngine::build(run_id.into(), 99, SimConfig::default_test(), store).expect("engine")
}

#[test]
fn save_then_load_restores_every_container() {
    let db = TempDb::new("roundtrip");
    let mut engine = build_engine(&db, "persist-1");
    engine
        .apply_command(PlayerCommand::SetCompanyName { name: "Acme".into() })
        .expect("name");
    engine
        .apply_command(PlayerCommand::Hire { candidate: Candidate::new("c-1", "Ada", 1_800.0) })
        .expect("hire");
    engine
        .apply_command(PlayerCommand::StartCampaign {
            template_id:   "social_media".into(),
            budget:        None,
            duration_days: Some(3),
        })
        .expect("campaign");
    engine.run_ticks(2_000).expect("run");
    engine.save().expect("save");

    let store = engine.store().reopen().expect("reopen");
    let restored = SimEngine::load("persist-1".into(), SimConfig::default_test(), store).expect("load");

    assert_eq!(restored.current_tick(), engine.current_tick());
    assert_eq!(restored.seed(), 99);
    assert_eq!(restored.state().company, engine.state().company);
    assert_eq!(restored.state().team, engine.state().team);
    assert_eq!(restored.state().product, engine.state().product);
    assert_eq!(restored.state().marketing, engine.state().marketing);
    assert_eq!(restored.state().investors, engine.state().investors);
    assert_eq!(
        restored.state().achievements.achievements(),
        engine.state().achievements.achievements()
    );
}

#[test]
fn every_container_has_its_own_key() {
    let db = TempDb::new("keys");
    let mut engine = build_engine(&db, "persist-2");
    engine.run_ticks(10).expect("run");
    engine.save().expect("save");

    for key in CONTAINER_KEYS {
        let json = engine.store().load_container("persist-2", key).expect("load");
        assert!(json.is_some(), "{key} was not saved");
    }
    assert_eq!(engine.store().last_saved_tick("persist-2").expect("tick"), Some(10));
}

#[test]
fn a_restored_run_keeps_ticking() {
    let db = TempDb::new("resume");
    let mut engine = build_engine(&db, "persist-3");
    engine.run_ticks(100).expect("run");
    engine.save().expect("save");

    let store = engine.store().reopen().expect("reopen");
    let mut restored = SimEngine::load("persist-3".into(), SimConfig::default_test(), store).expect("load");
    restored.run_ticks(5).expect("run");
    assert_eq!(restored.current_tick(), 105);
}

#[test]
fn missing_containers_fall_back_to_defaults() {
    let db = TempDb::new("partial");
    let mut engine = build_engine(&db, "persist-4");
    engine
        .apply_command(PlayerCommand::Hire { candidate: Candidate::new("c-1", "Ada", 1_000.0) })
        .expect("hire");

    // Only the company is written; the roster has no saved entry.
    let company = serde_json::to_string(&engine.state().company).expect("json");
    engine
        .store()
        .save_container("persist-4", COMPANY_KEY, &company, engine.current_tick())
        .expect("save company");

    let store = engine.store().reopen().expect("reopen");
    let restored = SimEngine::load("persist-4".into(), SimConfig::default_test(), store).expect("load");
    assert_eq!(restored.state().company.team_size, 1);
    assert_eq!(restored.state().team.headcount(), 0);
    assert_eq!(restored.current_tick(), 0);
}

#[test]
fn unreadable_state_is_reported_by_key() {
    let db = TempDb::new("corrupt");
    let engine = build_engine(&db, "persist-5");
    engine.save().expect("save");
    engine
        .store()
        .save_container("persist-5", TEAM_KEY, "{not json", 0)
        .expect("overwrite");

    let store = engine.store().reopen().expect("reopen");
    match SimEngine::load("persist-5".into(), SimConfig::default_test(), store) {
        Err(SimError::UnknownState { key }) => assert_eq!(key, TEAM_KEY),
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("corrupt state loaded"),
    }
}

#[test]
fn loading_an_unknown_run_fails() {
    let db = TempDb::new("unknown");
    let _engine = build_engine(&db, "persist-6");
    let store = SimStore::open(db.path()).expect("open");
    assert!(matches!(
        SimEngine::load("no-such-run".into(), SimConfig::default_test(), store),
        Err(SimError::RunNotInitialized)
    ));
}

#[test]
fn reopening_a_run_does_not_duplicate_its_init_event() {
    let db = TempDb::new("reinit");
    let engine = build_engine(&db, "persist-7");
    let store = engine.store().reopen().expect("reopen");
    let again = SimEngine::build("persist-7".into(), 99, SimConfig::default_test(), store).expect("engine");

    let inits = again.store().event_count("persist-7", "run_initialized").expect("count");
    assert_eq!(inits, 1);
}

fn add_feature(engine: &mut SimEngine, name: &str) -> String {
    let result = engine
        .apply_command(PlayerCommand::AddFeature {
            name:         name.into(),
            description:  String::new(),
            complexity:   2,
            dependencies: vec![],
        })
        .expect("add feature");
    assert!(result.success, "{result:?}");
    result.entity_id.expect("feature id")
}

#[test]
fn ids_stay_unique_across_a_reload_at_the_same_tick() {
    let db = TempDb::new("ids");
    let mut engine = build_engine(&db, "persist-8");
    engine.run_ticks(10).expect("run");
    let first = add_feature(&mut engine, "Search");
    engine.save().expect("save");

    let store = engine.store().reopen().expect("reopen");
    let mut restored = SimEngine::load("persist-8".into(), SimConfig::default_test(), store).expect("load");
    assert_eq!(restored.current_tick(), 10);
    let second = add_feature(&mut restored, "Export");

    assert_ne!(first, second);
    let mut ids: Vec<&str> = restored.state().product.features().iter().map(|f| f.id.as_str()).collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
    assert_eq!(restored.state().product.feature(&second).map(|f| f.name.as_str()), Some("Export"));
}
