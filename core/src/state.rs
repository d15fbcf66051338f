//! Mutable save-state schema.
//!
//! A `GameState` is a plain value: every economy and reconciler operation
//! takes one by reference and returns the next one. Nothing here mutates
//! in place behind the caller's back.

use crate::types::{GroupIndex, SubgroupIndex, Timestamp, UpgradeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub atom_count: f64,
    pub atoms_per_second: f64,
    /// Permanent multiplier, >= 1.
    pub prestige_multiplier: f64,
    pub prestige_to_be_earned: f64,
}

impl Resources {
    /// Atoms credited per elapsed second.
    pub fn effective_rate(&self) -> f64 {
        self.atoms_per_second * self.prestige_multiplier
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpgradeProgress {
    pub purchased: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiSelection {
    pub active_bulk_buy: u32,
    pub current_group: GroupIndex,
    pub unlocked_groups: BTreeSet<GroupIndex>,
    /// One entry per catalog group.
    pub current_subgroups: Vec<SubgroupIndex>,
}

impl UiSelection {
    pub fn is_unlocked(&self, group: GroupIndex) -> bool {
        self.unlocked_groups.contains(&group)
    }

    pub fn current_subgroup(&self) -> SubgroupIndex {
        self.current_subgroups
            .get(self.current_group)
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub resources: Resources,
    /// Dense, indexed identically to the catalog.
    pub upgrades: Vec<UpgradeProgress>,
    pub ui: UiSelection,
    /// None when restored from a save that never recorded it.
    pub last_saved: Option<Timestamp>,
}

impl GameState {
    pub fn purchased(&self, upgrade_id: UpgradeId) -> u32 {
        self.upgrades
            .get(upgrade_id)
            .map(|p| p.purchased)
            .unwrap_or(0)
    }

    /// Number of upgrades whose purchase count is strictly above `threshold`.
    pub fn upgrades_above(&self, threshold: u32) -> usize {
        self.upgrades
            .iter()
            .filter(|p| p.purchased > threshold)
            .count()
    }

    pub fn total_purchased(&self) -> u64 {
        self.upgrades.iter().map(|p| p.purchased as u64).sum()
    }
}
