//! The game engine — owns one session's catalog, config, state, and event log.
//!
//! LIFECYCLE:
//!   1. `start` restores the saved snapshot or builds a fresh state.
//!      A rejected snapshot is reported as `SnapshotRejected`, never swallowed.
//!   2. Offline reconciliation runs exactly once, inside `start`.
//!   3. The host drives `tick` once per second and `submit` per player action.
//!   4. The host calls `export_snapshot` on its autosave timer.
//!
//! RULES:
//!   - Single writer. Every operation computes a complete next state and
//!     swaps it in; no operation leaves fields half-updated.
//!   - No threads, no I/O, no clocks. Callers pass `now` explicitly.

use crate::{
    catalog::Catalog,
    command::PlayerCommand,
    config::EngineConfig,
    economy::{self, GroupOutcome, PurchaseOutcome, Refusal},
    error::IdleResult,
    event::GameEvent,
    reconcile,
    snapshot,
    state::GameState,
    types::{Timestamp, UpgradeId},
    view::{self, GroupView, ResourcesView, SubgroupView, UpgradeView},
};

pub struct GameEngine {
    catalog: Catalog,
    config:  EngineConfig,
    state:   GameState,
    events:  Vec<GameEvent>,
}

impl GameEngine {
    /// Begin a session from an optional persisted snapshot.
    pub fn start(catalog: Catalog, config: EngineConfig, saved: Option<&str>, now: Timestamp) -> Self {
        let mut events = Vec::new();

        let restored = match saved {
            Some(raw) => match snapshot::decode(raw, &catalog) {
                Ok(state) => Some(state),
                Err(e) => {
                    log::warn!("engine: saved snapshot rejected, starting fresh: {e}");
                    events.push(GameEvent::SnapshotRejected { reason: e.to_string() });
                    None
                }
            },
            None => None,
        };

        let was_restored = restored.is_some();
        let mut state = match restored {
            Some(state) => state,
            None => snapshot::initialize(&catalog, &config, now),
        };
        events.push(GameEvent::SessionStarted { restored: was_restored });

        let report = reconcile::reconcile_offline(&state, now);
        if report.elapsed_seconds > 0 {
            events.push(GameEvent::OfflineProgressCredited {
                elapsed_seconds: report.elapsed_seconds,
                atoms_earned:    report.atoms_earned,
            });
        }
        state = report.state;

        log::info!(
            "engine: session started (restored={was_restored}, atoms={:.2}, aps={:.2}, mult={:.3})",
            state.resources.atom_count,
            state.resources.atoms_per_second,
            state.resources.prestige_multiplier
        );

        Self { catalog, config, state, events }
    }

    /// Build an engine around the built-in test catalog with a fresh state.
    pub fn build_test(now: Timestamp) -> IdleResult<Self> {
        Ok(Self::start(Catalog::default_test()?, EngineConfig::default(), None, now))
    }

    pub fn catalog(&self) -> &Catalog { &self.catalog }
    pub fn config(&self) -> &EngineConfig { &self.config }
    pub fn state(&self) -> &GameState { &self.state }

    /// Replace the state wholesale. Used by tests and tooling to set up
    /// scenarios; gameplay goes through `submit`.
    pub fn set_state(&mut self, state: GameState) {
        self.state = state;
    }

    /// Credit `elapsed_seconds` of production.
    pub fn tick(&mut self, elapsed_seconds: u64) {
        self.state = reconcile::tick(&self.state, elapsed_seconds);
        log::trace!("engine: tick +{elapsed_seconds}s atoms={:.2}", self.state.resources.atom_count);
    }

    /// Advance `n` one-second ticks. Used for fast-forward and tests.
    pub fn run_ticks(&mut self, n: u64) {
        for _ in 0..n {
            self.tick(1);
        }
    }

    /// Apply one player command. Returns the events it produced; they are
    /// also kept in the log until drained.
    pub fn submit(&mut self, command: PlayerCommand, now: Timestamp) -> IdleResult<Vec<GameEvent>> {
        log::debug!("engine: command {}", command.name());
        let emitted = match command {
            PlayerCommand::Purchase { upgrade_id }  => self.purchase(upgrade_id)?,
            PlayerCommand::OpenGroup { group }      => self.open_group(group)?,
            PlayerCommand::SelectSubgroup { subgroup } => {
                match economy::select_subgroup(&self.catalog, &self.state, subgroup)? {
                    Ok(next) => {
                        self.state = next;
                        vec![GameEvent::SubgroupSelected { group: self.state.ui.current_group, subgroup }]
                    }
                    Err(refusal) => vec![GameEvent::SelectionRefused { refusal }],
                }
            }
            PlayerCommand::SelectBulkBuy { quantity } => {
                match economy::select_bulk_buy(&self.catalog, &self.state, quantity) {
                    Ok(next) => {
                        self.state = next;
                        vec![GameEvent::BulkBuySelected { quantity }]
                    }
                    Err(refusal) => vec![GameEvent::SelectionRefused { refusal }],
                }
            }
            PlayerCommand::Prestige => self.prestige(),
            PlayerCommand::Reset    => self.reset(now),
        };
        self.events.extend(emitted.iter().cloned());
        Ok(emitted)
    }

    fn purchase(&mut self, upgrade_id: UpgradeId) -> IdleResult<Vec<GameEvent>> {
        match economy::purchase(&self.catalog, &self.config, &self.state, upgrade_id)? {
            PurchaseOutcome::Applied { state, quantity, cost } => {
                self.state = state;
                Ok(vec![GameEvent::UpgradePurchased {
                    upgrade_id,
                    quantity,
                    cost,
                    atoms_per_second:      self.state.resources.atoms_per_second,
                    prestige_to_be_earned: self.state.resources.prestige_to_be_earned,
                }])
            }
            PurchaseOutcome::Refused(refusal) => {
                Ok(vec![GameEvent::PurchaseRefused { upgrade_id, refusal }])
            }
        }
    }

    fn open_group(&mut self, group: usize) -> IdleResult<Vec<GameEvent>> {
        match economy::open_group(&self.catalog, &self.state, group)? {
            GroupOutcome::Unlocked { state, cost } => {
                self.state = state;
                log::info!("engine: unlocked group {group} for {cost:.2}");
                Ok(vec![GameEvent::GroupUnlocked { group, cost }])
            }
            GroupOutcome::Navigated { state } => {
                self.state = state;
                Ok(vec![GameEvent::GroupSelected { group }])
            }
            GroupOutcome::Refused(refusal) => {
                log::warn!("engine: unlock of group {group} refused: {refusal}");
                Ok(vec![GameEvent::GroupUnlockRefused { group, refusal }])
            }
        }
    }

    fn prestige(&mut self) -> Vec<GameEvent> {
        if !economy::can_prestige(&self.state) {
            return vec![GameEvent::PrestigeRefused { refusal: Refusal::NothingToPrestige }];
        }
        let gained = economy::prestige_pending(&self.state);
        self.state = economy::prestige(&self.catalog, &self.config, &self.state);
        log::info!(
            "engine: prestige +{gained:.3} -> multiplier {:.3}",
            self.state.resources.prestige_multiplier
        );
        vec![GameEvent::Prestiged {
            prestige_multiplier: self.state.resources.prestige_multiplier,
            gained,
        }]
    }

    fn reset(&mut self, now: Timestamp) -> Vec<GameEvent> {
        self.state = snapshot::initialize(&self.catalog, &self.config, now);
        log::info!("engine: game reset");
        vec![GameEvent::GameReset]
    }

    /// Serialize the current state, stamping `last_saved = now`.
    pub fn export_snapshot(&mut self, now: Timestamp) -> IdleResult<String> {
        let raw = snapshot::encode(&self.state, now)?;
        self.state.last_saved = Some(now);
        log::debug!("engine: snapshot exported at {now}");
        Ok(raw)
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Views ──────────────────────────────────────────────────

    pub fn resources_view(&self) -> ResourcesView {
        view::resources_view(&self.state)
    }

    pub fn upgrade_view(&self, upgrade_id: UpgradeId) -> IdleResult<UpgradeView> {
        view::upgrade_view(&self.catalog, &self.state, upgrade_id)
    }

    pub fn current_upgrade_views(&self) -> IdleResult<Vec<UpgradeView>> {
        view::current_upgrade_views(&self.catalog, &self.state)
    }

    pub fn group_views(&self) -> Vec<GroupView> {
        view::group_views(&self.catalog, &self.state)
    }

    pub fn subgroup_views(&self) -> IdleResult<Vec<SubgroupView>> {
        view::subgroup_views(&self.catalog, &self.state)
    }
}
