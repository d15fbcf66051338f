use crate::types::{GroupIndex, UpgradeId};
use thiserror::Error;

/// Hard failures only. Business-rule refusals (not enough atoms, unmet
/// requirements, cap reached) are `economy::Refusal` values, never errors.
#[derive(Error, Debug)]
pub enum IdleError {
    #[error("Invalid catalog: {reason}")]
    InvalidCatalog { reason: String },

    #[error("Corrupt snapshot: {reason}")]
    CorruptSnapshot { reason: String },

    #[error("Upgrade {upgrade_id} not found in catalog")]
    UnknownUpgrade { upgrade_id: UpgradeId },

    #[error("Group {group} not found in catalog")]
    UnknownGroup { group: GroupIndex },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IdleError {
    pub fn invalid_catalog(reason: impl Into<String>) -> Self {
        Self::InvalidCatalog { reason: reason.into() }
    }

    pub fn corrupt_snapshot(reason: impl Into<String>) -> Self {
        Self::CorruptSnapshot { reason: reason.into() }
    }
}

pub type IdleResult<T> = Result<T, IdleError>;
