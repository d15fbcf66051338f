use idle_core::{
    command::PlayerCommand,
    economy::Refusal,
    engine::GameEngine,
    event::GameEvent,
    snapshot,
};

fn engine_with_atoms(atoms: f64) -> GameEngine {
    let mut engine = GameEngine::build_test(0).expect("engine");
    let mut state = engine.state().clone();
    state.resources.atom_count = atoms;
    engine.set_state(state);
    engine.drain_events();
    engine
}

#[test]
fn fresh_session_starts_unrestored() {
    let mut engine = GameEngine::build_test(0).expect("engine");
    assert_eq!(engine.drain_events(), vec![GameEvent::SessionStarted { restored: false }]);
    assert!(engine.events().is_empty(), "drain empties the log");
}

#[test]
fn purchase_command_emits_the_new_totals() {
    let mut engine = engine_with_atoms(100.0);

    let events = engine.submit(PlayerCommand::Purchase { upgrade_id: 0 }, 0).expect("submit");

    assert_eq!(
        events,
        vec![GameEvent::UpgradePurchased {
            upgrade_id: 0,
            quantity: 1,
            cost: 10.0,
            atoms_per_second: 1001.0,
            prestige_to_be_earned: 0.0,
        }]
    );
    assert_eq!(engine.state().resources.atom_count, 90.0);
    assert_eq!(engine.events(), events.as_slice(), "emitted events are also logged");
}

#[test]
fn refused_command_leaves_state_untouched() {
    let mut engine = engine_with_atoms(5.0);
    let before = engine.state().clone();

    let events = engine.submit(PlayerCommand::Purchase { upgrade_id: 0 }, 0).expect("submit");

    assert_eq!(
        events,
        vec![GameEvent::PurchaseRefused {
            upgrade_id: 0,
            refusal: Refusal::InsufficientResources { cost: 10.0, available: 5.0 },
        }]
    );
    assert_eq!(engine.state(), &before);
}

#[test]
fn unknown_ids_surface_as_errors() {
    let mut engine = engine_with_atoms(0.0);
    assert!(engine.submit(PlayerCommand::Purchase { upgrade_id: 42 }, 0).is_err());
    assert!(engine.submit(PlayerCommand::OpenGroup { group: 9 }, 0).is_err());
}

#[test]
fn group_and_navigation_commands() {
    let mut engine = engine_with_atoms(15_000.0);

    let events = engine.submit(PlayerCommand::OpenGroup { group: 1 }, 0).expect("submit");
    assert_eq!(events, vec![GameEvent::GroupUnlocked { group: 1, cost: 10_000.0 }]);
    assert_eq!(engine.state().resources.atom_count, 5_000.0);

    let events = engine.submit(PlayerCommand::OpenGroup { group: 0 }, 0).expect("submit");
    assert_eq!(events, vec![GameEvent::GroupSelected { group: 0 }]);

    let events = engine.submit(PlayerCommand::SelectSubgroup { subgroup: 1 }, 0).expect("submit");
    assert_eq!(events, vec![GameEvent::SubgroupSelected { group: 0, subgroup: 1 }]);

    let events = engine.submit(PlayerCommand::SelectBulkBuy { quantity: 100 }, 0).expect("submit");
    assert_eq!(events, vec![GameEvent::BulkBuySelected { quantity: 100 }]);

    let events = engine.submit(PlayerCommand::SelectBulkBuy { quantity: 3 }, 0).expect("submit");
    assert_eq!(
        events,
        vec![GameEvent::SelectionRefused { refusal: Refusal::UnknownBulkOption { quantity: 3 } }]
    );

    let ui = &engine.state().ui;
    assert_eq!((ui.current_group, ui.current_subgroup(), ui.active_bulk_buy), (0, 1, 100));
    assert_eq!(engine.state().resources.atom_count, 5_000.0, "navigation is free");
}

#[test]
fn unlock_refused_when_short() {
    let mut engine = engine_with_atoms(1.0);
    let events = engine.submit(PlayerCommand::OpenGroup { group: 1 }, 0).expect("submit");
    assert_eq!(
        events,
        vec![GameEvent::GroupUnlockRefused {
            group: 1,
            refusal: Refusal::InsufficientResources { cost: 10_000.0, available: 1.0 },
        }]
    );
    assert_eq!(engine.state().ui.current_group, 0);
}

#[test]
fn reset_returns_to_a_new_game() {
    let mut engine = engine_with_atoms(1_000.0);
    engine.submit(PlayerCommand::Purchase { upgrade_id: 0 }, 0).expect("submit");

    let events = engine.submit(PlayerCommand::Reset, 8_000).expect("submit");

    assert_eq!(events, vec![GameEvent::GameReset]);
    assert_eq!(engine.state(), &snapshot::initialize(engine.catalog(), engine.config(), 8_000));
}

#[test]
fn ticks_accumulate_production() {
    let mut engine = engine_with_atoms(0.0);
    engine.run_ticks(5);
    assert_eq!(engine.state().resources.atom_count, 5_000.0);
    engine.tick(10);
    assert_eq!(engine.state().resources.atom_count, 15_000.0);
}

#[test]
fn upgrade_views_follow_the_current_subgroup() {
    let mut engine = engine_with_atoms(60.0);

    let views = engine.current_upgrade_views().expect("views");
    let names: Vec<&str> = views.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["Proton", "Neutron"]);

    let proton = &views[0];
    assert!(proton.purchasable);
    assert_eq!(proton.cost, 10.0);
    assert_eq!(proton.production_gain, 1.0);

    let neutron = &views[1];
    assert!(!neutron.purchasable);
    assert_eq!(neutron.requirements.len(), 1);
    assert_eq!(neutron.requirements[0].name, "Proton");
    assert!(!neutron.requirements[0].met);
    assert_eq!(
        neutron.refusal,
        Some(Refusal::RequirementsNotMet { upgrade_id: 0, required: 5, purchased: 0 })
    );

    engine.submit(PlayerCommand::SelectSubgroup { subgroup: 1 }, 0).expect("submit");
    let views = engine.current_upgrade_views().expect("views");
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].name, "Hydrogen");

    let groups = engine.group_views();
    assert_eq!(groups.len(), 2);
    assert!(groups[0].unlocked && groups[0].current);
    assert!(!groups[1].unlocked);

    let subgroups = engine.subgroup_views().expect("subgroups");
    assert!(subgroups[1].current);
}

#[test]
fn resources_view_reports_effective_rate() {
    let mut engine = engine_with_atoms(0.0);
    let mut state = engine.state().clone();
    state.resources.prestige_multiplier = 2.0;
    engine.set_state(state);

    let view = engine.resources_view();
    assert_eq!(view.effective_atoms_per_second, 2_000.0);
    assert!(!view.can_prestige);
}
