//! Scripted player for headless balance runs.
//!
//! Each decision looks at what the player could do right now (affordable
//! purchases in unlocked groups, affordable group unlocks) and picks one.
//! `Random` draws from a seeded PCG stream so equal seeds replay the same
//! run; nothing here touches a platform RNG.

use crate::{
    command::PlayerCommand,
    economy,
    engine::GameEngine,
    error::IdleResult,
    types::Timestamp,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AutoplayStrategy {
    /// Always the cheapest available action.
    Cheapest,
    /// Uniform choice among available actions.
    Random { seed: u64 },
}

pub struct Autoplayer {
    strategy: AutoplayStrategy,
    rng:      Option<Pcg64Mcg>,
}

impl Autoplayer {
    pub fn new(strategy: AutoplayStrategy) -> Self {
        let rng = match strategy {
            AutoplayStrategy::Cheapest => None,
            AutoplayStrategy::Random { seed } => Some(Pcg64Mcg::seed_from_u64(seed)),
        };
        Self { strategy, rng }
    }

    pub fn strategy(&self) -> AutoplayStrategy {
        self.strategy
    }

    /// Every action that would succeed right now, with its price.
    pub fn candidates(engine: &GameEngine) -> IdleResult<Vec<(f64, PlayerCommand)>> {
        let catalog = engine.catalog();
        let state = engine.state();
        let mut out = Vec::new();

        for def in catalog.upgrades() {
            let q = economy::quote(catalog, state, def.upgrade_id)?;
            if q.is_purchasable() {
                out.push((q.cost, PlayerCommand::Purchase { upgrade_id: def.upgrade_id }));
            }
        }

        for group in catalog.groups() {
            if !state.ui.is_unlocked(group.id) && state.resources.atom_count >= group.unlock_cost {
                out.push((group.unlock_cost, PlayerCommand::OpenGroup { group: group.id }));
            }
        }

        Ok(out)
    }

    /// Pick the next action, or None when nothing is affordable.
    pub fn decide(&mut self, engine: &GameEngine) -> IdleResult<Option<PlayerCommand>> {
        let mut candidates = Self::candidates(engine)?;
        if candidates.is_empty() {
            return Ok(None);
        }

        let pick = match (&self.strategy, self.rng.as_mut()) {
            (AutoplayStrategy::Random { .. }, Some(rng)) => rng.gen_range(0..candidates.len()),
            _ => candidates
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| a.0.total_cmp(&b.0))
                .map(|(i, _)| i)
                .unwrap_or(0),
        };

        Ok(Some(candidates.swap_remove(pick).1))
    }

    /// Buy until nothing is affordable or `max_actions` is reached.
    /// Returns the number of commands applied.
    pub fn play(&mut self, engine: &mut GameEngine, now: Timestamp, max_actions: usize) -> IdleResult<usize> {
        let mut applied = 0;
        while applied < max_actions {
            let Some(command) = self.decide(engine)? else { break };
            engine.submit(command, now)?;
            applied += 1;
        }
        Ok(applied)
    }
}
