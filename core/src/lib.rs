//! Progression engine for an incremental game: resources, the upgrade
//! economy, prestige resets, offline catch-up, and the save snapshot.

pub mod autoplay;
pub mod catalog;
pub mod clock;
pub mod command;
pub mod config;
pub mod economy;
pub mod engine;
pub mod error;
pub mod event;
pub mod reconcile;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod types;
pub mod view;
