//! Snapshot codec — `GameState` to/from a persistence-ready JSON document.
//!
//! `encode` is total and stamps `last_saved` with the encode time.
//! `decode` never coerces: a missing field, a wrong type, a value outside
//! the state invariants, or a shape that does not match the catalog is a
//! `CorruptSnapshot`. The only optional field is `last_saved`; without it
//! no offline time is credited.

use crate::{
    catalog::Catalog,
    config::EngineConfig,
    error::{IdleError, IdleResult},
    state::{GameState, Resources, UiSelection, UpgradeProgress},
    types::Timestamp,
};
use serde::{Deserialize, Serialize};

/// Bump when the document shape changes incompatibly.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub resources: Resources,
    pub upgrades: Vec<UpgradeProgress>,
    pub ui: UiSelection,
    #[serde(default)]
    pub last_saved: Option<Timestamp>,
}

/// Fresh state for a cold start.
pub fn initialize(catalog: &Catalog, config: &EngineConfig, now: Timestamp) -> GameState {
    GameState {
        resources: Resources {
            atom_count:            0.0,
            atoms_per_second:      config.starting_atoms_per_second,
            prestige_multiplier:   1.0,
            prestige_to_be_earned: 0.0,
        },
        upgrades: vec![UpgradeProgress::default(); catalog.upgrade_count()],
        ui: UiSelection {
            active_bulk_buy:   default_bulk_buy(catalog),
            current_group:     0,
            unlocked_groups:   catalog.free_groups().collect(),
            current_subgroups: vec![0; catalog.groups().len()],
        },
        last_saved: Some(now),
    }
}

/// Single-unit buying when the catalog offers it, else its first option.
fn default_bulk_buy(catalog: &Catalog) -> u32 {
    if catalog.is_bulk_option(1) {
        1
    } else {
        catalog.bulk_buy_options().first().copied().unwrap_or(1)
    }
}

pub fn encode(state: &GameState, now: Timestamp) -> IdleResult<String> {
    let snapshot = Snapshot {
        version:    SNAPSHOT_VERSION,
        resources:  state.resources.clone(),
        upgrades:   state.upgrades.clone(),
        ui:         state.ui.clone(),
        last_saved: Some(now),
    };
    Ok(serde_json::to_string(&snapshot)?)
}

pub fn decode(raw: &str, catalog: &Catalog) -> IdleResult<GameState> {
    let snapshot: Snapshot = serde_json::from_str(raw)
        .map_err(|e| IdleError::corrupt_snapshot(format!("malformed document: {e}")))?;

    if snapshot.version != SNAPSHOT_VERSION {
        return Err(IdleError::corrupt_snapshot(format!(
            "unsupported version {} (expected {SNAPSHOT_VERSION})",
            snapshot.version
        )));
    }

    if let Some(at) = snapshot.last_saved {
        if at < 0 {
            return Err(IdleError::corrupt_snapshot(format!("last_saved {at} is before the epoch")));
        }
    }
    validate_resources(&snapshot.resources)?;
    validate_upgrades(&snapshot.upgrades, catalog)?;
    validate_ui(&snapshot.ui, catalog)?;

    Ok(GameState {
        resources:  snapshot.resources,
        upgrades:   snapshot.upgrades,
        ui:         snapshot.ui,
        last_saved: snapshot.last_saved,
    })
}

fn validate_resources(r: &Resources) -> IdleResult<()> {
    let fields = [
        ("atom_count", r.atom_count, 0.0),
        ("atoms_per_second", r.atoms_per_second, 0.0),
        ("prestige_multiplier", r.prestige_multiplier, 1.0),
        ("prestige_to_be_earned", r.prestige_to_be_earned, 0.0),
    ];
    for (name, value, min) in fields {
        if !value.is_finite() || value < min {
            return Err(IdleError::corrupt_snapshot(format!(
                "{name} = {value} is outside the valid range (>= {min})"
            )));
        }
    }
    Ok(())
}

fn validate_upgrades(upgrades: &[UpgradeProgress], catalog: &Catalog) -> IdleResult<()> {
    if upgrades.len() != catalog.upgrade_count() {
        return Err(IdleError::corrupt_snapshot(format!(
            "snapshot has {} upgrade entries, catalog defines {}",
            upgrades.len(),
            catalog.upgrade_count()
        )));
    }
    for (progress, def) in upgrades.iter().zip(catalog.upgrades()) {
        if progress.purchased > def.purchase_cap {
            return Err(IdleError::corrupt_snapshot(format!(
                "upgrade {} purchased {} exceeds cap {}",
                def.upgrade_id, progress.purchased, def.purchase_cap
            )));
        }
    }
    Ok(())
}

fn validate_ui(ui: &UiSelection, catalog: &Catalog) -> IdleResult<()> {
    let groups = catalog.groups();

    if !catalog.is_bulk_option(ui.active_bulk_buy) {
        return Err(IdleError::corrupt_snapshot(format!(
            "active_bulk_buy {} is not a catalog bulk option",
            ui.active_bulk_buy
        )));
    }
    if ui.current_group >= groups.len() {
        return Err(IdleError::corrupt_snapshot(format!(
            "current_group {} out of range",
            ui.current_group
        )));
    }
    if !ui.unlocked_groups.contains(&0) {
        return Err(IdleError::corrupt_snapshot("starting group is not unlocked"));
    }
    if let Some(bad) = ui.unlocked_groups.iter().find(|g| **g >= groups.len()) {
        return Err(IdleError::corrupt_snapshot(format!(
            "unlocked group {bad} out of range"
        )));
    }
    if !ui.unlocked_groups.contains(&ui.current_group) {
        return Err(IdleError::corrupt_snapshot(format!(
            "current_group {} is not unlocked",
            ui.current_group
        )));
    }
    if ui.current_subgroups.len() != groups.len() {
        return Err(IdleError::corrupt_snapshot(format!(
            "current_subgroups has {} entries, catalog defines {} groups",
            ui.current_subgroups.len(),
            groups.len()
        )));
    }
    for (group, &subgroup) in groups.iter().zip(&ui.current_subgroups) {
        if subgroup >= group.subgroups.len() {
            return Err(IdleError::corrupt_snapshot(format!(
                "subgroup {subgroup} out of range for group '{}'",
                group.name
            )));
        }
    }
    Ok(())
}
