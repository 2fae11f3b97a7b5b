//! Player commands: validation and cross-container effects.

use startup_sim_core::{
    command::PlayerCommand,
    config::{SimConfig, TechCategory},
    engine::SimEngine,
    product::FeatureStatus,
    store::SimStore,
    team::{Candidate, Skill},
};

fn build_engine() -> SimEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = SimStore::in_memory().expect("in-memory store");
    SimEngine::build("command-test".into(), 11, SimConfig::default_test(), store).expect("engine")
}

fn hire(engine: &mut SimEngine, id: &str, salary: f64) -> startup_sim_core::command::CommandResult {
    engine
        .apply_command(PlayerCommand::Hire { candidate: Candidate::new(id, format!("Hire {id}"), salary) })
        .expect("hire")
}

#[test]
fn hiring_books_the_salary_as_an_expense() {
    let mut engine = build_engine();
    let before = engine.state().company.expenses;

    let result = hire(&mut engine, "c-1", 2_000.0);

    assert!(result.success, "{result:?}");
    assert_eq!(result.entity_id.as_deref(), Some("c-1"));
    assert_eq!(engine.state().company.expenses, before + 2_000.0);
    assert_eq!(engine.state().company.team_size, 1);
    assert_eq!(engine.state().team.headcount(), 1);
}

#[test]
fn hiring_at_capacity_fails_and_changes_nothing() {
    let mut engine = build_engine();
    let capacity = engine.state().company.office_capacity;
    for i in 0..capacity {
        assert!(hire(&mut engine, &format!("c-{i}"), 1_000.0).success);
    }
    let expenses = engine.state().company.expenses;

    let result = hire(&mut engine, "one-too-many", 1_000.0);

    assert!(!result.success);
    assert_eq!(result.message.as_deref(), Some("Office at maximum capacity!"));
    assert_eq!(engine.state().team.headcount(), capacity);
    assert_eq!(engine.state().company.expenses, expenses);
}

#[test]
fn upgrading_the_office_adds_seats() {
    let mut engine = build_engine();
    let cash = engine.state().company.cash;
    let capacity = engine.state().company.office_capacity;

    let result = engine.apply_command(PlayerCommand::UpgradeOffice).expect("upgrade");

    assert!(result.success, "{result:?}");
    assert_eq!(engine.state().company.office_capacity, capacity + 5);
    assert_eq!(engine.state().company.cash, cash - 5_000.0);

    // Second upgrade costs 10k, more than what is left.
    let result = engine.apply_command(PlayerCommand::UpgradeOffice).expect("upgrade");
    assert!(!result.success);
    assert_eq!(engine.state().company.office_level, 1);
}

#[test]
fn firing_drops_the_salary() {
    let mut engine = build_engine();
    hire(&mut engine, "c-1", 1_500.0);
    hire(&mut engine, "c-2", 2_500.0);

    let result = engine
        .apply_command(PlayerCommand::Fire { employee_id: "c-1".into() })
        .expect("fire");

    assert!(result.success);
    assert_eq!(engine.state().company.expenses, 2_500.0);
    assert_eq!(engine.state().company.team_size, 1);
    assert!(engine.state().team.employee("c-1").is_none());

    let missing = engine
        .apply_command(PlayerCommand::Fire { employee_id: "c-1".into() })
        .expect("fire");
    assert!(!missing.success);
}

#[test]
fn generated_recruits_can_be_hired_by_id() {
    let mut engine = build_engine();
    let result = engine.apply_command(PlayerCommand::GenerateRecruits).expect("recruit");
    assert!(result.success);

    let recruits = engine.state().team.recruits().to_vec();
    assert!((2..=4).contains(&recruits.len()));
    let pick = &recruits[0];

    let result = engine
        .apply_command(PlayerCommand::HireRecruit { recruit_id: pick.id.clone() })
        .expect("hire recruit");

    assert!(result.success, "{result:?}");
    assert_eq!(engine.state().company.expenses, pick.salary_expectation);
    assert_eq!(engine.state().team.recruits().len(), recruits.len() - 1);
}

#[test]
fn training_raises_a_skill() {
    let mut engine = build_engine();
    hire(&mut engine, "c-1", 1_000.0);

    let result = engine
        .apply_command(PlayerCommand::Train { employee_id: "c-1".into(), skill: Skill::Coding, amount: 5.0 })
        .expect("train");

    assert!(result.success);
    let employee = engine.state().team.employee("c-1").expect("employee");
    assert_eq!(employee.skills.get(Skill::Coding), 25.0);
}

#[test]
fn a_team_finishes_started_features() {
    let mut engine = build_engine();
    for i in 0..3 {
        hire(&mut engine, &format!("c-{i}"), 1_000.0);
    }
    let feature_id = engine.state().product.features()[0].id.clone();

    let result = engine
        .apply_command(PlayerCommand::StartFeature { feature_id: feature_id.clone() })
        .expect("start");
    assert!(result.success, "{result:?}");

    // Complexity 3 = 300 points; a fresh three-person team earns about 12/hour.
    engine.run_ticks(60 * 48).expect("run");

    let feature = engine.state().product.feature(&feature_id).expect("feature");
    assert_eq!(feature.status(), FeatureStatus::Completed);
}

#[test]
fn dependent_features_cannot_start_early() {
    let mut engine = build_engine();
    // Starter feature 1 depends on feature 0.
    let blocked = engine.state().product.features()[1].id.clone();

    let result = engine
        .apply_command(PlayerCommand::StartFeature { feature_id: blocked.clone() })
        .expect("start");

    assert!(!result.success);
    let feature = engine.state().product.feature(&blocked).expect("feature");
    assert_eq!(feature.status(), FeatureStatus::Planned);
}

#[test]
fn selecting_paid_tech_debits_cash() {
    let mut engine = build_engine();
    let cash = engine.state().company.cash;

    let result = engine
        .apply_command(PlayerCommand::SelectTech { category: TechCategory::Hosting, tech_id: "aws".into() })
        .expect("select");
    assert!(result.success, "{result:?}");
    assert_eq!(engine.state().company.cash, cash - 500.0);

    let wrong = engine
        .apply_command(PlayerCommand::SelectTech { category: TechCategory::Frontend, tech_id: "aws".into() })
        .expect("select");
    assert!(!wrong.success);
    assert_eq!(engine.state().company.cash, cash - 500.0);
}

#[test]
fn release_needs_a_completed_feature() {
    let mut engine = build_engine();
    let result = engine
        .apply_command(PlayerCommand::CreateRelease { notes: String::new(), rush: false })
        .expect("release");
    assert!(!result.success);
    assert!(engine.state().product.releases().is_empty());
}

#[test]
fn starting_a_campaign_debits_its_budget() {
    let mut engine = build_engine();
    let cash = engine.state().company.cash;

    let result = engine
        .apply_command(PlayerCommand::StartCampaign {
            template_id:   "social_media".into(),
            budget:        None,
            duration_days: None,
        })
        .expect("campaign");

    assert!(result.success, "{result:?}");
    assert_eq!(engine.state().company.cash, cash - 1_500.0);
    assert_eq!(engine.state().marketing.active_campaigns().len(), 1);
}

#[test]
fn campaigns_on_locked_channels_or_unknown_templates_fail() {
    let mut engine = build_engine();
    let cash = engine.state().company.cash;

    let locked = engine
        .apply_command(PlayerCommand::StartCampaign {
            template_id:   "email_marketing".into(),
            budget:        None,
            duration_days: None,
        })
        .expect("campaign");
    let unknown = engine
        .apply_command(PlayerCommand::StartCampaign {
            template_id:   "skywriting".into(),
            budget:        None,
            duration_days: None,
        })
        .expect("campaign");

    assert!(!locked.success);
    assert!(!unknown.success);
    assert_eq!(engine.state().company.cash, cash);
}

#[test]
fn unlocking_a_channel_enables_its_campaigns() {
    let mut engine = build_engine();
    let result = engine
        .apply_command(PlayerCommand::UnlockChannel { channel_id: "email".into() })
        .expect("unlock");
    assert!(result.success);
    assert_eq!(engine.state().company.cash, 9_000.0);

    let result = engine
        .apply_command(PlayerCommand::StartCampaign {
            template_id:   "email_marketing".into(),
            budget:        None,
            duration_days: None,
        })
        .expect("campaign");
    assert!(result.success, "{result:?}");
}

#[test]
fn naming_the_company_starts_it() {
    let mut engine = build_engine();
    let empty = engine
        .apply_command(PlayerCommand::SetCompanyName { name: "   ".into() })
        .expect("name");
    assert!(!empty.success);
    assert!(!engine.state().company.started);

    let ok = engine
        .apply_command(PlayerCommand::SetCompanyName { name: "Acme".into() })
        .expect("name");
    assert!(ok.success);
    assert!(engine.state().company.started);
    assert_eq!(engine.state().company.company_name, "Acme");
}

#[test]
fn every_command_is_logged_with_its_outcome() {
    let mut engine = build_engine();
    engine.apply_command(PlayerCommand::UpgradeOffice).expect("upgrade");
    engine.apply_command(PlayerCommand::UpgradeOffice).expect("upgrade");

    let received = engine
        .store()
        .event_count(&engine.run_id, "player_command_received")
        .expect("count");
    let upgraded = engine
        .store()
        .event_count(&engine.run_id, "office_upgraded")
        .expect("count");
    assert_eq!(received, 2);
    assert_eq!(upgraded, 1);
}

#[test]
fn notifications_can_be_read_and_cleared() {
    let mut engine = build_engine();
    // Day 2 begins 15 hours in; the day's checks produce notifications
    // only when something happens, so make something happen.
    engine
        .apply_command(PlayerCommand::SetCompanyName { name: "Acme".into() })
        .expect("name");
    engine.run_ticks(15 * 60).expect("run");
    assert!(engine.state().company.unread_count() > 0);

    let newest = engine.state().company.feed().next().expect("notification").id;
    let result = engine
        .apply_command(PlayerCommand::MarkNotificationRead { notification_id: newest })
        .expect("read");
    assert!(result.success);

    engine.apply_command(PlayerCommand::MarkAllNotificationsRead).expect("read all");
    assert_eq!(engine.state().company.unread_count(), 0);

    engine.apply_command(PlayerCommand::ClearNotifications).expect("clear");
    assert_eq!(engine.state().company.feed().count(), 0);

    let missing = engine
        .apply_command(PlayerCommand::MarkNotificationRead { notification_id: newest })
        .expect("read");
    assert!(!missing.success);
}
