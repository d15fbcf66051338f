use serde::{Deserialize, Serialize};
use crate::types::{GroupIndex, SubgroupIndex, UpgradeId};

/// Every action the presentation layer can request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Economy ───────────────────────────────────
    Purchase { upgrade_id: UpgradeId },
    OpenGroup { group: GroupIndex },

    // ── Navigation ────────────────────────────────
    SelectSubgroup { subgroup: SubgroupIndex },
    SelectBulkBuy { quantity: u32 },

    // ── Resets (require confirmation in the UI) ───
    Prestige,
    Reset,
}

impl PlayerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerCommand::Purchase { .. }       => "purchase",
            PlayerCommand::OpenGroup { .. }      => "open_group",
            PlayerCommand::SelectSubgroup { .. } => "select_subgroup",
            PlayerCommand::SelectBulkBuy { .. }  => "select_bulk_buy",
            PlayerCommand::Prestige              => "prestige",
            PlayerCommand::Reset                 => "reset",
        }
    }
}
