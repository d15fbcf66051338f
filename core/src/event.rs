//! Game events: the record of every state transition and refusal.
//!
//! The engine appends one or more events per command; hosts drain them to
//! notify the player (offline modal, rejected save) and to persist a log.

use crate::{
    economy::Refusal,
    types::{GroupIndex, SubgroupIndex, UpgradeId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    // ── Session lifecycle ──────────────────────────
    SessionStarted {
        restored: bool,
    },
    /// A persisted snapshot failed validation and a fresh game was started.
    SnapshotRejected {
        reason: String,
    },
    OfflineProgressCredited {
        elapsed_seconds: u64,
        atoms_earned: f64,
    },

    // ── Economy ────────────────────────────────────
    UpgradePurchased {
        upgrade_id: UpgradeId,
        quantity: u32,
        cost: f64,
        atoms_per_second: f64,
        prestige_to_be_earned: f64,
    },
    PurchaseRefused {
        upgrade_id: UpgradeId,
        refusal: Refusal,
    },
    GroupUnlocked {
        group: GroupIndex,
        cost: f64,
    },
    GroupSelected {
        group: GroupIndex,
    },
    GroupUnlockRefused {
        group: GroupIndex,
        refusal: Refusal,
    },

    // ── Navigation ─────────────────────────────────
    SubgroupSelected {
        group: GroupIndex,
        subgroup: SubgroupIndex,
    },
    BulkBuySelected {
        quantity: u32,
    },
    SelectionRefused {
        refusal: Refusal,
    },

    // ── Resets ─────────────────────────────────────
    Prestiged {
        prestige_multiplier: f64,
        gained: f64,
    },
    PrestigeRefused {
        refusal: Refusal,
    },
    GameReset,
}

impl GameEvent {
    /// Stable name used for the `event_type` column in the save store.
    pub fn type_name(&self) -> &'static str {
        match self {
            GameEvent::SessionStarted { .. }          => "session_started",
            GameEvent::SnapshotRejected { .. }        => "snapshot_rejected",
            GameEvent::OfflineProgressCredited { .. } => "offline_progress_credited",
            GameEvent::UpgradePurchased { .. }        => "upgrade_purchased",
            GameEvent::PurchaseRefused { .. }         => "purchase_refused",
            GameEvent::GroupUnlocked { .. }           => "group_unlocked",
            GameEvent::GroupSelected { .. }           => "group_selected",
            GameEvent::GroupUnlockRefused { .. }      => "group_unlock_refused",
            GameEvent::SubgroupSelected { .. }        => "subgroup_selected",
            GameEvent::BulkBuySelected { .. }         => "bulk_buy_selected",
            GameEvent::SelectionRefused { .. }        => "selection_refused",
            GameEvent::Prestiged { .. }               => "prestiged",
            GameEvent::PrestigeRefused { .. }         => "prestige_refused",
            GameEvent::GameReset                      => "game_reset",
        }
    }
}
