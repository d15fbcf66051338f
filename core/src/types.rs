//! Shared primitive types used across the whole engine.

/// Dense catalog index of an upgrade. Also indexes `GameState::upgrades`.
pub type UpgradeId = usize;

/// Index of a group in catalog order.
pub type GroupIndex = usize;

/// Index of a subgroup inside its group.
pub type SubgroupIndex = usize;

/// Wall-clock time in epoch milliseconds.
pub type Timestamp = i64;

/// Stable identifier of a persisted save slot (v4 UUID string).
pub type SaveId = String;

/// Generate a fresh save slot identifier.
pub fn new_save_id() -> SaveId {
    uuid::Uuid::new_v4().to_string()
}
