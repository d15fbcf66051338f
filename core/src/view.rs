//! Read-only view models for the presentation layer.

use crate::{
    catalog::Catalog,
    economy::{self, Refusal},
    error::IdleResult,
    state::GameState,
    types::{GroupIndex, SubgroupIndex, UpgradeId},
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourcesView {
    pub atom_count: f64,
    pub atoms_per_second: f64,
    /// `atoms_per_second · prestige_multiplier`, what the tick credits.
    pub effective_atoms_per_second: f64,
    pub prestige_multiplier: f64,
    pub prestige_pending: f64,
    pub can_prestige: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementView {
    pub upgrade_id: UpgradeId,
    pub name: String,
    pub amount: u32,
    pub met: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeView {
    pub upgrade_id: UpgradeId,
    pub name: String,
    pub purchased: u32,
    pub cap: u32,
    pub cost: f64,
    pub max_purchaseable: u32,
    /// Production gained by buying `max_purchaseable` units.
    pub production_gain: f64,
    pub purchasable: bool,
    pub refusal: Option<Refusal>,
    pub requirements: Vec<RequirementView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupView {
    pub group: GroupIndex,
    pub name: String,
    pub unlock_cost: f64,
    pub unlocked: bool,
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubgroupView {
    pub subgroup: SubgroupIndex,
    pub name: String,
    pub current: bool,
}

pub fn resources_view(state: &GameState) -> ResourcesView {
    let r = &state.resources;
    ResourcesView {
        atom_count:                 r.atom_count,
        atoms_per_second:           r.atoms_per_second,
        effective_atoms_per_second: r.effective_rate(),
        prestige_multiplier:        r.prestige_multiplier,
        prestige_pending:           economy::prestige_pending(state),
        can_prestige:               economy::can_prestige(state),
    }
}

pub fn upgrade_view(catalog: &Catalog, state: &GameState, upgrade_id: UpgradeId) -> IdleResult<UpgradeView> {
    let def = catalog.upgrade(upgrade_id)?;
    let quote = economy::quote(catalog, state, upgrade_id)?;

    let requirements = def
        .requirements
        .iter()
        .map(|req| {
            let name = catalog
                .upgrade(req.upgrade_id)
                .map(|u| u.name.clone())
                .unwrap_or_default();
            RequirementView {
                upgrade_id: req.upgrade_id,
                name,
                amount: req.minimum_purchased,
                met: state.purchased(req.upgrade_id) >= req.minimum_purchased,
            }
        })
        .collect();

    Ok(UpgradeView {
        upgrade_id,
        name: def.name.clone(),
        purchased: state.purchased(upgrade_id),
        cap: def.purchase_cap,
        cost: quote.cost,
        max_purchaseable: quote.quantity,
        production_gain: def.atom_production * quote.quantity as f64,
        purchasable: quote.is_purchasable(),
        refusal: quote.check.err(),
        requirements,
    })
}

/// Upgrades of the currently selected group and subgroup, in display order.
pub fn current_upgrade_views(catalog: &Catalog, state: &GameState) -> IdleResult<Vec<UpgradeView>> {
    let group = catalog.group(state.ui.current_group)?;
    let Some(subgroup) = group.subgroups.get(state.ui.current_subgroup()) else {
        return Ok(Vec::new());
    };
    subgroup
        .upgrades
        .iter()
        .map(|&id| upgrade_view(catalog, state, id))
        .collect()
}

pub fn group_views(catalog: &Catalog, state: &GameState) -> Vec<GroupView> {
    catalog
        .groups()
        .iter()
        .map(|g| GroupView {
            group:       g.id,
            name:        g.name.clone(),
            unlock_cost: g.unlock_cost,
            unlocked:    state.ui.is_unlocked(g.id),
            current:     state.ui.current_group == g.id,
        })
        .collect()
}

pub fn subgroup_views(catalog: &Catalog, state: &GameState) -> IdleResult<Vec<SubgroupView>> {
    let group = catalog.group(state.ui.current_group)?;
    let current = state.ui.current_subgroup();
    Ok(group
        .subgroups
        .iter()
        .enumerate()
        .map(|(i, s)| SubgroupView { subgroup: i, name: s.name.clone(), current: i == current })
        .collect())
}

const SUFFIXES: [(f64, &str); 7] = [
    (1e21, "Sx"),
    (1e18, "Qu"),
    (1e15, "Q"),
    (1e12, "T"),
    (1e9,  "B"),
    (1e6,  "M"),
    (1e3,  "K"),
];

/// Abbreviate an atom amount: `1234.5` → `"1.23K"`. Past the largest
/// suffix, falls back to scientific notation.
pub fn format_atoms(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value >= 1e24 {
        return format!("{value:.decimals$e}");
    }
    for (scale, suffix) in SUFFIXES {
        if value >= scale {
            return format!("{:.decimals$}{suffix}", value / scale);
        }
    }
    format!("{value:.decimals$}")
}
