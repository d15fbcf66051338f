//! Economy engine — pricing, purchase validation, group unlocks, prestige.
//!
//! RULES:
//!   - Every operation takes the current `GameState` by reference and
//!     returns the next one. Refused operations return no state at all,
//!     so a refusal can never leave a half-applied purchase behind.
//!   - Refusals are expected, frequent, user-facing outcomes. They are
//!     `Refusal` values, not errors. Only catalog lookups of ids that do
//!     not exist produce `IdleError`.
//!   - Requirements are checked against purchase counts *before* the
//!     purchase; buying an upgrade never unlocks itself.

use crate::{
    catalog::{Catalog, UpgradeDef},
    config::EngineConfig,
    error::IdleResult,
    state::GameState,
    types::{GroupIndex, SubgroupIndex, UpgradeId},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a purchase, unlock, or selection was refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Refusal {
    InsufficientResources { cost: f64, available: f64 },
    RequirementsNotMet { upgrade_id: UpgradeId, required: u32, purchased: u32 },
    /// Also returned for locked (cap 0) upgrades.
    CapReached { cap: u32 },
    GroupLocked { group: GroupIndex },
    UnknownSubgroup { subgroup: SubgroupIndex },
    UnknownBulkOption { quantity: u32 },
    NothingToPrestige,
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Refusal::InsufficientResources { cost, available } => {
                write!(f, "costs {cost:.2} atoms, only {available:.2} available")
            }
            Refusal::RequirementsNotMet { upgrade_id, required, purchased } => write!(
                f,
                "requires {required} of upgrade {upgrade_id}, have {purchased}"
            ),
            Refusal::CapReached { cap } => write!(f, "purchase cap of {cap} reached"),
            Refusal::GroupLocked { group } => write!(f, "group {group} is locked"),
            Refusal::UnknownSubgroup { subgroup } => write!(f, "no subgroup {subgroup}"),
            Refusal::UnknownBulkOption { quantity } => {
                write!(f, "{quantity} is not a bulk-buy option")
            }
            Refusal::NothingToPrestige => write!(f, "no prestige multiplier to earn"),
        }
    }
}

// ── Pricing ─────────────────────────────────────────────────────────

/// Total price of `bulk_quantity` consecutive units starting at `purchased`.
///
/// One unit costs `base · e^purchased`; `k` units are the geometric sum
/// `base · (e^(purchased+k) − e^purchased) / (e − 1)`. The catalog guarantees
/// `e > 1`. Zero units cost nothing.
pub fn compute_upgrade_cost(base_cost: f64, exponent: f64, purchased: u32, bulk_quantity: u32) -> f64 {
    match bulk_quantity {
        0 => 0.0,
        1 => base_cost * exponent.powf(purchased as f64),
        k => {
            let start = exponent.powf(purchased as f64);
            let end = exponent.powf(purchased as f64 + k as f64);
            base_cost * (end - start) / (exponent - 1.0)
        }
    }
}

/// Units actually obtainable: the requested bulk, clipped to the remaining cap.
pub fn compute_purchaseable_quantity(cap: u32, purchased: u32, requested_bulk: u32) -> u32 {
    requested_bulk.min(cap.saturating_sub(purchased))
}

/// Validate a purchase against the current state. The first failing rule
/// wins, in this order: quantity, affordability, requirements. A price that
/// overflowed to a non-finite value is never affordable.
pub fn check_purchase(
    upgrade:  &UpgradeDef,
    cost:     f64,
    quantity: u32,
    state:    &GameState,
) -> Result<(), Refusal> {
    if quantity == 0 {
        return Err(Refusal::CapReached { cap: upgrade.purchase_cap });
    }
    if !cost.is_finite() || cost > state.resources.atom_count {
        return Err(Refusal::InsufficientResources {
            cost,
            available: state.resources.atom_count,
        });
    }
    for req in &upgrade.requirements {
        let purchased = state.purchased(req.upgrade_id);
        if purchased < req.minimum_purchased {
            return Err(Refusal::RequirementsNotMet {
                upgrade_id: req.upgrade_id,
                required:   req.minimum_purchased,
                purchased,
            });
        }
    }
    Ok(())
}

pub fn can_purchase(upgrade: &UpgradeDef, cost: f64, quantity: u32, state: &GameState) -> bool {
    check_purchase(upgrade, cost, quantity, state).is_ok()
}

/// Prestige multiplier the player would gain right now. Always a full
/// recount over every upgrade, never a running delta.
pub fn compute_prestige_to_be_earned(state: &GameState, config: &EngineConfig) -> f64 {
    state.upgrades_above(config.prestige_count_threshold) as f64 * config.prestige_rate
}

/// Apply an already-validated purchase. Callers must have passed
/// `check_purchase`; all resource fields change together.
pub fn apply_purchase(
    state:           &GameState,
    config:          &EngineConfig,
    upgrade_id:      UpgradeId,
    cost:            f64,
    unit_production: f64,
    quantity:        u32,
) -> GameState {
    debug_assert!(cost <= state.resources.atom_count, "apply_purchase on unaffordable cost");

    let mut next = state.clone();
    next.resources.atom_count -= cost;
    next.upgrades[upgrade_id].purchased += quantity;
    next.resources.atoms_per_second += unit_production * quantity as f64;
    next.resources.prestige_to_be_earned = compute_prestige_to_be_earned(&next, config);
    next
}

// ── Catalog-aware operations ───────────────────────────────────────

/// Price and feasibility of buying an upgrade at the active bulk mode.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseQuote {
    pub upgrade_id: UpgradeId,
    /// Units the purchase would grant.
    pub quantity: u32,
    /// Price of exactly `quantity` units. When nothing can be bought this is
    /// the price of the requested bulk, for display.
    pub cost: f64,
    pub check: Result<(), Refusal>,
}

impl PurchaseQuote {
    pub fn is_purchasable(&self) -> bool {
        self.check.is_ok()
    }
}

pub fn quote(catalog: &Catalog, state: &GameState, upgrade_id: UpgradeId) -> IdleResult<PurchaseQuote> {
    let upgrade = catalog.upgrade(upgrade_id)?;
    let purchased = state.purchased(upgrade_id);
    let requested = state.ui.active_bulk_buy;
    let quantity = compute_purchaseable_quantity(upgrade.purchase_cap, purchased, requested);
    let priced_units = if quantity == 0 { requested } else { quantity };
    let cost = compute_upgrade_cost(upgrade.base_cost, upgrade.cost_exponent, purchased, priced_units);

    let check = if state.ui.is_unlocked(upgrade.group) {
        check_purchase(upgrade, cost, quantity, state)
    } else {
        Err(Refusal::GroupLocked { group: upgrade.group })
    };

    Ok(PurchaseQuote { upgrade_id, quantity, cost, check })
}

#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    Applied { state: GameState, quantity: u32, cost: f64 },
    Refused(Refusal),
}

/// Buy `upgrade_id` at the active bulk mode: quote, check, apply.
pub fn purchase(
    catalog:    &Catalog,
    config:     &EngineConfig,
    state:      &GameState,
    upgrade_id: UpgradeId,
) -> IdleResult<PurchaseOutcome> {
    let q = quote(catalog, state, upgrade_id)?;
    if let Err(refusal) = q.check {
        log::debug!("economy: purchase of upgrade {upgrade_id} refused: {refusal}");
        return Ok(PurchaseOutcome::Refused(refusal));
    }

    let upgrade = catalog.upgrade(upgrade_id)?;
    let next = apply_purchase(state, config, upgrade_id, q.cost, upgrade.atom_production, q.quantity);
    log::debug!(
        "economy: bought {}x '{}' for {:.2} (aps {:.2} -> {:.2})",
        q.quantity,
        upgrade.name,
        q.cost,
        state.resources.atoms_per_second,
        next.resources.atoms_per_second
    );
    Ok(PurchaseOutcome::Applied { state: next, quantity: q.quantity, cost: q.cost })
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupOutcome {
    /// Group was locked; cost debited, group unlocked and made current.
    Unlocked { state: GameState, cost: f64 },
    /// Group was already unlocked; only navigation changed.
    Navigated { state: GameState },
    Refused(Refusal),
}

/// Unlock (if needed) and switch to a group.
pub fn open_group(catalog: &Catalog, state: &GameState, group: GroupIndex) -> IdleResult<GroupOutcome> {
    let unlock_cost = catalog.group(group)?.unlock_cost;

    let mut next = state.clone();
    next.ui.current_group = group;

    if state.ui.is_unlocked(group) {
        return Ok(GroupOutcome::Navigated { state: next });
    }

    if state.resources.atom_count < unlock_cost {
        return Ok(GroupOutcome::Refused(Refusal::InsufficientResources {
            cost:      unlock_cost,
            available: state.resources.atom_count,
        }));
    }

    next.resources.atom_count -= unlock_cost;
    next.ui.unlocked_groups.insert(group);
    Ok(GroupOutcome::Unlocked { state: next, cost: unlock_cost })
}

/// Select a subgroup of the current group.
pub fn select_subgroup(catalog: &Catalog, state: &GameState, subgroup: SubgroupIndex) -> IdleResult<Result<GameState, Refusal>> {
    let group = catalog.group(state.ui.current_group)?;
    if subgroup >= group.subgroups.len() {
        return Ok(Err(Refusal::UnknownSubgroup { subgroup }));
    }
    let mut next = state.clone();
    next.ui.current_subgroups[state.ui.current_group] = subgroup;
    Ok(Ok(next))
}

/// Switch the bulk-buy mode. Only quantities the catalog offers are accepted.
pub fn select_bulk_buy(catalog: &Catalog, state: &GameState, quantity: u32) -> Result<GameState, Refusal> {
    if !catalog.is_bulk_option(quantity) {
        return Err(Refusal::UnknownBulkOption { quantity });
    }
    let mut next = state.clone();
    next.ui.active_bulk_buy = quantity;
    Ok(next)
}

// ── Prestige ────────────────────────────────────────────────────────

pub fn prestige_pending(state: &GameState) -> f64 {
    state.resources.prestige_to_be_earned
}

pub fn can_prestige(state: &GameState) -> bool {
    prestige_pending(state) > 0.0
}

/// Trade all short-term progress for a permanent multiplier increase.
///
/// Atoms go to 0, production restarts at the configured rate, every
/// upgrade count goes to 0, and navigation returns to the starting group
/// with only the free groups unlocked. Only `prestige_multiplier` (and the
/// chosen bulk mode) carries over.
pub fn prestige(catalog: &Catalog, config: &EngineConfig, state: &GameState) -> GameState {
    let mut next = state.clone();

    next.resources.prestige_multiplier += state.resources.prestige_to_be_earned;
    next.resources.prestige_to_be_earned = 0.0;
    next.resources.atom_count = 0.0;
    next.resources.atoms_per_second = config.prestige_restart_atoms_per_second;

    for progress in &mut next.upgrades {
        progress.purchased = 0;
    }

    next.ui.current_group = 0;
    next.ui.unlocked_groups = catalog.free_groups().collect();
    next.ui.current_subgroups = vec![0; catalog.groups().len()];

    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_unit_cost_grows_geometrically() {
        assert_eq!(compute_upgrade_cost(10.0, 2.0, 0, 1), 10.0);
        assert_eq!(compute_upgrade_cost(10.0, 2.0, 3, 1), 80.0);
    }

    #[test]
    fn zero_units_cost_nothing() {
        assert_eq!(compute_upgrade_cost(10.0, 1.5, 4, 0), 0.0);
    }

    #[test]
    fn purchaseable_quantity_clips_to_cap() {
        assert_eq!(compute_purchaseable_quantity(100, 0, 10), 10);
        assert_eq!(compute_purchaseable_quantity(100, 95, 10), 5);
        assert_eq!(compute_purchaseable_quantity(100, 100, 10), 0);
        assert_eq!(compute_purchaseable_quantity(0, 0, 1), 0);
    }

    #[test]
    fn refusal_display_is_readable() {
        let r = Refusal::RequirementsNotMet { upgrade_id: 3, required: 5, purchased: 1 };
        assert_eq!(r.to_string(), "requires 5 of upgrade 3, have 1");
    }
}
