//! Tick and offline reconciliation. These are the only places atoms are produced.
//!
//! The live loop calls `tick(state, 1)` once per wall-clock second and does
//! not compensate for timer drift. `reconcile_offline` runs exactly once per
//! load, before the live loop starts, and advances `last_saved` so a second
//! call with the same `now` credits nothing.

use crate::{
    state::GameState,
    types::Timestamp,
};

/// Credit `elapsed_seconds` of production.
pub fn tick(state: &GameState, elapsed_seconds: u64) -> GameState {
    let mut next = state.clone();
    next.resources.atom_count += state.resources.effective_rate() * elapsed_seconds as f64;
    next
}

#[derive(Debug, Clone, PartialEq)]
pub struct OfflineReport {
    pub state: GameState,
    pub elapsed_seconds: u64,
    pub atoms_earned: f64,
}

impl OfflineReport {
    fn nothing(state: &GameState) -> Self {
        Self { state: state.clone(), elapsed_seconds: 0, atoms_earned: 0.0 }
    }
}

/// Credit whole seconds elapsed since `last_saved`.
///
/// A state without `last_saved`, or a `now` that is not at least one full
/// second later (including clocks that moved backwards), credits nothing
/// and leaves the state untouched.
pub fn reconcile_offline(state: &GameState, now: Timestamp) -> OfflineReport {
    let Some(last_saved) = state.last_saved else {
        return OfflineReport::nothing(state);
    };

    let elapsed = now.saturating_sub(last_saved).div_euclid(1000);
    if elapsed <= 0 {
        return OfflineReport::nothing(state);
    }
    let elapsed_seconds = elapsed as u64;

    let atoms_earned = state.resources.effective_rate() * elapsed_seconds as f64;
    let mut next = state.clone();
    next.resources.atom_count += atoms_earned;
    next.last_saved = Some(now);

    log::info!(
        "offline: credited {atoms_earned:.2} atoms for {elapsed_seconds}s away"
    );

    OfflineReport { state: next, elapsed_seconds, atoms_earned }
}
