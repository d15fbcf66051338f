use idle_core::{
    catalog::Catalog,
    command::PlayerCommand,
    config::EngineConfig,
    economy::{self, Refusal},
    engine::GameEngine,
    event::GameEvent,
    snapshot,
    state::GameState,
};
use std::collections::BTreeSet;

/// A mid-game state: several upgrades bought, second group open, a
/// multiplier already earned from an earlier prestige.
fn progressed(catalog: &Catalog, config: &EngineConfig) -> GameState {
    let mut state = snapshot::initialize(catalog, config, 0);
    state.upgrades[0].purchased = 30;
    state.upgrades[1].purchased = 4;
    state.upgrades[2].purchased = 1;
    state.upgrades[3].purchased = 2;
    state.resources.atom_count = 5_000.0;
    state.resources.atoms_per_second = 1_234.0;
    state.resources.prestige_multiplier = 1.5;
    state.resources.prestige_to_be_earned = economy::compute_prestige_to_be_earned(&state, config);
    state.ui.unlocked_groups.insert(1);
    state.ui.current_group = 1;
    state.ui.current_subgroups = vec![1, 0];
    state.ui.active_bulk_buy = 25;
    state
}

#[test]
fn pending_counts_only_upgrades_bought_more_than_once() {
    let catalog = Catalog::default_test().expect("test catalog");
    let config = EngineConfig::default();
    let state = progressed(&catalog, &config);

    // Proton (30), Neutron (4) and Red Dwarf (2) qualify; Hydrogen (1) does not.
    assert_eq!(state.resources.prestige_to_be_earned, 3.0 * 0.007);
    assert!(economy::can_prestige(&state));
}

#[test]
fn prestige_keeps_only_the_multiplier() {
    let catalog = Catalog::default_test().expect("test catalog");
    let config = EngineConfig::default();
    let before = progressed(&catalog, &config);

    let after = economy::prestige(&catalog, &config, &before);

    assert_eq!(
        after.resources.prestige_multiplier,
        before.resources.prestige_multiplier + before.resources.prestige_to_be_earned
    );
    assert_eq!(after.resources.atom_count, 0.0);
    assert_eq!(after.resources.atoms_per_second, 100.0);
    assert_eq!(after.resources.prestige_to_be_earned, 0.0);
    assert!(
        after.upgrades.iter().all(|u| u.purchased == 0),
        "every purchase counter resets: {:?}",
        after.upgrades
    );
    assert_eq!(after.ui.unlocked_groups, BTreeSet::from([0]));
    assert_eq!(after.ui.current_group, 0);
    assert_eq!(after.ui.current_subgroups, vec![0, 0]);
    assert_eq!(after.ui.active_bulk_buy, 25, "bulk mode is a preference, not progress");
    assert_eq!(after.upgrades.len(), catalog.upgrade_count());
}

#[test]
fn restart_rate_comes_from_config() {
    let catalog = Catalog::default_test().expect("test catalog");
    let config = EngineConfig { prestige_restart_atoms_per_second: 250.0, ..EngineConfig::default() };
    let before = progressed(&catalog, &config);

    let after = economy::prestige(&catalog, &config, &before);
    assert_eq!(after.resources.atoms_per_second, 250.0);
}

#[test]
fn engine_refuses_prestige_with_nothing_pending() {
    let mut engine = GameEngine::build_test(0).expect("engine");
    let before = engine.state().clone();

    let events = engine.submit(PlayerCommand::Prestige, 0).expect("submit");

    assert_eq!(events, vec![GameEvent::PrestigeRefused { refusal: Refusal::NothingToPrestige }]);
    assert_eq!(engine.state(), &before);
}

#[test]
fn engine_prestige_reports_the_gain() {
    let mut engine = GameEngine::build_test(0).expect("engine");
    let state = progressed(engine.catalog(), engine.config());
    engine.set_state(state);

    let events = engine.submit(PlayerCommand::Prestige, 1_000).expect("submit");

    match events.as_slice() {
        [GameEvent::Prestiged { prestige_multiplier, gained }] => {
            assert_eq!(*gained, 3.0 * 0.007);
            assert_eq!(*prestige_multiplier, 1.5 + 3.0 * 0.007);
        }
        other => panic!("expected one Prestiged event, got {other:?}"),
    }
    assert!(!economy::can_prestige(engine.state()));
}

#[test]
fn production_after_prestige_is_boosted() {
    let mut engine = GameEngine::build_test(0).expect("engine");
    let state = progressed(engine.catalog(), engine.config());
    engine.set_state(state);
    engine.submit(PlayerCommand::Prestige, 0).expect("submit");

    engine.tick(10);
    let multiplier = engine.state().resources.prestige_multiplier;
    assert_eq!(engine.state().resources.atom_count, 100.0 * multiplier * 10.0);
}
