use idle_core::{
    catalog::Catalog,
    config::EngineConfig,
    engine::GameEngine,
    error::IdleError,
    event::GameEvent,
    snapshot::{self, SNAPSHOT_VERSION},
    state::GameState,
};
use serde_json::{json, Value};

fn catalog() -> Catalog {
    Catalog::default_test().expect("test catalog")
}

fn played_state(catalog: &Catalog) -> GameState {
    let mut state = snapshot::initialize(catalog, &EngineConfig::default(), 1_000);
    state.resources.atom_count = 123_456.789_012_345;
    state.resources.atoms_per_second = 1_077.1;
    state.resources.prestige_multiplier = 1.049;
    state.resources.prestige_to_be_earned = 0.014;
    state.upgrades[0].purchased = 12;
    state.upgrades[1].purchased = 3;
    state.ui.unlocked_groups.insert(1);
    state.ui.current_group = 1;
    state.ui.current_subgroups = vec![1, 0];
    state.ui.active_bulk_buy = 10;
    state
}

fn encoded_value(state: &GameState) -> Value {
    let raw = snapshot::encode(state, 5_000).expect("encode");
    serde_json::from_str(&raw).expect("encoded snapshot is JSON")
}

fn assert_corrupt(doc: Value, what: &str) {
    let err = snapshot::decode(&doc.to_string(), &catalog())
        .expect_err(&format!("{what} should be rejected"));
    assert!(
        matches!(err, IdleError::CorruptSnapshot { .. }),
        "{what}: expected CorruptSnapshot, got {err:?}"
    );
}

#[test]
fn initial_state_matches_a_new_game() {
    let catalog = catalog();
    let state = snapshot::initialize(&catalog, &EngineConfig::default(), 42);

    assert_eq!(state.resources.atom_count, 0.0);
    assert_eq!(state.resources.atoms_per_second, 1000.0);
    assert_eq!(state.resources.prestige_multiplier, 1.0);
    assert_eq!(state.resources.prestige_to_be_earned, 0.0);
    assert_eq!(state.upgrades.len(), catalog.upgrade_count());
    assert!(state.upgrades.iter().all(|u| u.purchased == 0));
    assert_eq!(state.ui.active_bulk_buy, 1);
    assert_eq!(state.ui.current_group, 0);
    assert!(state.ui.is_unlocked(0));
    assert!(!state.ui.is_unlocked(1));
    assert_eq!(state.last_saved, Some(42));
}

#[test]
fn encode_then_decode_restores_the_state_with_a_new_save_time() {
    let catalog = catalog();
    let state = played_state(&catalog);

    let raw = snapshot::encode(&state, 9_000).expect("encode");
    let restored = snapshot::decode(&raw, &catalog).expect("decode");

    let mut expected = state.clone();
    expected.last_saved = Some(9_000);
    assert_eq!(restored, expected, "floats and selections survive exactly");
}

#[test]
fn encoded_document_is_versioned() {
    let doc = encoded_value(&played_state(&catalog()));
    assert_eq!(doc["version"], json!(SNAPSHOT_VERSION));
    assert_eq!(doc["last_saved"], json!(5_000));
}

#[test]
fn missing_last_saved_is_accepted() {
    let catalog = catalog();
    let mut doc = encoded_value(&played_state(&catalog));
    doc.as_object_mut().expect("object").remove("last_saved");

    let state = snapshot::decode(&doc.to_string(), &catalog).expect("decode");
    assert_eq!(state.last_saved, None);
}

#[test]
fn malformed_json_is_corrupt() {
    let err = snapshot::decode("{\"version\": 1, \"resources\":", &catalog()).expect_err("truncated");
    assert!(matches!(err, IdleError::CorruptSnapshot { .. }), "got {err:?}");
}

#[test]
fn missing_required_field_is_corrupt() {
    let mut doc = encoded_value(&played_state(&catalog()));
    doc["resources"].as_object_mut().expect("object").remove("atom_count");
    assert_corrupt(doc, "missing atom_count");
}

#[test]
fn wrong_field_type_is_corrupt() {
    let mut doc = encoded_value(&played_state(&catalog()));
    doc["resources"]["atoms_per_second"] = json!("lots");
    assert_corrupt(doc, "string atoms_per_second");
}

#[test]
fn unsupported_version_is_corrupt() {
    let mut doc = encoded_value(&played_state(&catalog()));
    doc["version"] = json!(SNAPSHOT_VERSION + 1);
    assert_corrupt(doc, "future version");
}

#[test]
fn out_of_range_values_are_corrupt() {
    let base = encoded_value(&played_state(&catalog()));

    let mut negative_atoms = base.clone();
    negative_atoms["resources"]["atom_count"] = json!(-1.0);
    assert_corrupt(negative_atoms, "negative atom_count");

    let mut low_multiplier = base.clone();
    low_multiplier["resources"]["prestige_multiplier"] = json!(0.5);
    assert_corrupt(low_multiplier, "multiplier below 1");

    let mut negative_count = base.clone();
    negative_count["upgrades"][0]["purchased"] = json!(-3);
    assert_corrupt(negative_count, "negative purchase count");

    let mut over_cap = base;
    over_cap["upgrades"][0]["purchased"] = json!(101);
    assert_corrupt(over_cap, "purchased above cap");
}

#[test]
fn shape_mismatch_with_the_catalog_is_corrupt() {
    let base = encoded_value(&played_state(&catalog()));

    let mut short = base.clone();
    short["upgrades"].as_array_mut().expect("array").pop();
    assert_corrupt(short, "fewer upgrade entries than the catalog");

    let mut bad_bulk = base.clone();
    bad_bulk["ui"]["active_bulk_buy"] = json!(7);
    assert_corrupt(bad_bulk, "bulk option the catalog does not offer");

    let mut bad_group = base.clone();
    bad_group["ui"]["current_group"] = json!(5);
    assert_corrupt(bad_group, "current_group out of range");

    let mut locked_current = base.clone();
    locked_current["ui"]["unlocked_groups"] = json!([0]);
    assert_corrupt(locked_current, "current group not unlocked");

    let mut bad_subgroup = base;
    bad_subgroup["ui"]["current_subgroups"] = json!([0, 3]);
    assert_corrupt(bad_subgroup, "subgroup out of range");
}

#[test]
fn engine_rejects_corrupt_save_and_starts_fresh() {
    let engine = GameEngine::start(catalog(), EngineConfig::default(), Some("not json"), 7_000);

    match engine.events() {
        [GameEvent::SnapshotRejected { reason }, GameEvent::SessionStarted { restored: false }] => {
            assert!(reason.contains("Corrupt snapshot"), "reason: {reason}");
        }
        other => panic!("expected rejection then a fresh session, got {other:?}"),
    }
    assert_eq!(engine.state(), &snapshot::initialize(engine.catalog(), engine.config(), 7_000));
}

#[test]
fn export_snapshot_stamps_last_saved() {
    let mut engine = GameEngine::build_test(0).expect("engine");
    engine.run_ticks(3);

    let raw = engine.export_snapshot(3_000).expect("export");
    assert_eq!(engine.state().last_saved, Some(3_000));

    let restored = snapshot::decode(&raw, engine.catalog()).expect("decode");
    assert_eq!(&restored, engine.state());
}

#[test]
fn last_saved_before_the_epoch_is_corrupt() {
    let mut doc = encoded_value(&played_state(&catalog()));
    doc["last_saved"] = json!(-1);
    assert_corrupt(doc, "negative last_saved");

    let raw = snapshot::encode(&played_state(&catalog()), i64::MIN).expect("encode");
    let engine = GameEngine::start(catalog(), EngineConfig::default(), Some(&raw), 1_700_000_000_000);
    assert!(
        matches!(engine.events().first(), Some(GameEvent::SnapshotRejected { .. })),
        "got {:?}",
        engine.events()
    );
}
