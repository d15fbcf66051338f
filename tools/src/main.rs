//! idle-runner: headless host for the progression engine.
//!
//! Usage:
//!   idle-runner --data-dir ./data --seconds 3600 --autoplay cheapest
//!   idle-runner --db saves.db --save-id <uuid> --live --seconds 30
//!   idle-runner --db saves.db --ipc-mode
//!   idle-runner --test-catalog --seconds 600 --autoplay random --seed 7

mod ticker;

use anyhow::Result;
use idle_core::{
    autoplay::{AutoplayStrategy, Autoplayer},
    catalog::Catalog,
    clock::{Clock, ManualClock, SystemClock},
    command::PlayerCommand,
    config::EngineConfig,
    engine::GameEngine,
    event::GameEvent,
    store::SaveStore,
    types::{new_save_id, SaveId, Timestamp},
    view::{format_atoms, GroupView, ResourcesView, SubgroupView, UpgradeView},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use ticker::Ticker;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick { count: u64 },
    Command { command: PlayerCommand },
    Save,
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    save_id: SaveId,
    resources: ResourcesView,
    active_bulk_buy: u32,
    bulk_buy_options: Vec<u32>,
    groups: Vec<GroupView>,
    subgroups: Vec<SubgroupView>,
    upgrades: Vec<UpgradeView>,
    events: Vec<GameEvent>,
}

#[derive(Clone, Copy, Debug)]
enum LiveMessage {
    Tick,
    Autosave,
}

struct Session {
    engine:  GameEngine,
    store:   SaveStore,
    save_id: SaveId,
}

impl Session {
    /// Persist drained events; a reset also wipes the stored slot.
    fn flush_events(&mut self, now: Timestamp) -> Result<Vec<GameEvent>> {
        let events = self.engine.drain_events();
        for event in &events {
            if matches!(event, GameEvent::GameReset) {
                self.store.delete_save(&self.save_id)?;
            }
            self.store.append_event(&self.save_id, now, event)?;
        }
        Ok(events)
    }

    fn save(&mut self, now: Timestamp) -> Result<()> {
        let raw = self.engine.export_snapshot(now)?;
        self.store.save_snapshot(&self.save_id, &raw, now)?;
        log::info!("saved {} at {now}", self.save_id);
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seconds = parse_arg(&args, "--seconds", 3600u64);
    let seed = parse_arg(&args, "--seed", 42u64);
    let live = args.iter().any(|a| a == "--live");
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = str_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = str_arg(&args, "--data-dir").unwrap_or("./data");
    let autoplay = match str_arg(&args, "--autoplay") {
        Some("cheapest") => Some(AutoplayStrategy::Cheapest),
        Some("random") => Some(AutoplayStrategy::Random { seed }),
        Some("none") | None => None,
        Some(other) => anyhow::bail!("unknown --autoplay strategy '{other}'"),
    };

    let catalog = if args.iter().any(|a| a == "--test-catalog") {
        Catalog::default_test()?
    } else {
        Catalog::load(data_dir)?
    };
    let config = EngineConfig::load(Path::new(data_dir).join("engine.json"))?;

    let store = SaveStore::open(db)?;
    store.migrate()?;

    let save_id = match str_arg(&args, "--save-id") {
        Some(id) => id.to_string(),
        None => store
            .list_saves()?
            .into_iter()
            .next()
            .map(|(id, _)| id)
            .unwrap_or_else(new_save_id),
    };
    let saved = store.load_snapshot(&save_id)?;

    if !ipc_mode {
        println!("Idle Everything — idle-runner");
        println!("  save_id:   {save_id}");
        println!("  restored:  {}", saved.is_some());
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!("  seconds:   {seconds}");
        println!("  autoplay:  {autoplay:?}");
        println!();
    }

    let now = SystemClock.now_ms();
    let engine = GameEngine::start(catalog, config, saved.as_deref(), now);
    let mut session = Session { engine, store, save_id };
    for event in session.flush_events(now)? {
        if !ipc_mode {
            report_startup_event(&event);
        }
    }

    let mut autoplayer = autoplay.map(Autoplayer::new);

    if ipc_mode {
        run_ipc_loop(&mut session)?;
    } else if live {
        run_live(&mut session, autoplayer.as_mut(), seconds)?;
        print_summary(&session, seconds);
    } else {
        run_fast_forward(&mut session, autoplayer.as_mut(), seconds, now)?;
        print_summary(&session, seconds);
    }

    Ok(())
}

/// Simulate `seconds` of play instantly on a manual clock.
fn run_fast_forward(
    session:    &mut Session,
    mut autoplayer: Option<&mut Autoplayer>,
    seconds:    u64,
    start:      Timestamp,
) -> Result<()> {
    let clock = ManualClock::new(start);
    let autosave_every = (session.engine.config().autosave_interval_ms / 1000).max(1);

    for second in 1..=seconds {
        clock.advance_secs(1);
        session.engine.tick(1);
        if let Some(player) = autoplayer.as_deref_mut() {
            player.play(&mut session.engine, clock.now_ms(), 64)?;
        }
        session.flush_events(clock.now_ms())?;
        if second % autosave_every == 0 {
            session.save(clock.now_ms())?;
        }
    }
    session.save(clock.now_ms())?;
    Ok(())
}

/// Real-time loop: tick and autosave timers feed one channel; this thread
/// is the only one that touches the engine.
fn run_live(session: &mut Session, mut autoplayer: Option<&mut Autoplayer>, seconds: u64) -> Result<()> {
    let config = session.engine.config().clone();
    let (tx, rx) = mpsc::channel();
    let tick_timer = Ticker::spawn(
        "tick",
        Duration::from_millis(config.tick_interval_ms),
        tx.clone(),
        LiveMessage::Tick,
    );
    let save_timer = Ticker::spawn(
        "autosave",
        Duration::from_millis(config.autosave_interval_ms),
        tx,
        LiveMessage::Autosave,
    );

    let deadline = Instant::now() + Duration::from_secs(seconds);
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        let message = match rx.recv_timeout(remaining) {
            Ok(m) => m,
            Err(_) => break,
        };
        let now = SystemClock.now_ms();
        match message {
            LiveMessage::Tick => {
                session.engine.tick(1);
                if let Some(player) = autoplayer.as_deref_mut() {
                    player.play(&mut session.engine, now, 64)?;
                }
                session.flush_events(now)?;
                let r = session.engine.resources_view();
                println!(
                    "{} atoms  (+{}/s, x{:.3})",
                    format_atoms(r.atom_count, 2),
                    format_atoms(r.effective_atoms_per_second, 2),
                    r.prestige_multiplier
                );
            }
            LiveMessage::Autosave => session.save(now)?,
        }
    }

    tick_timer.cancel();
    save_timer.cancel();
    session.save(SystemClock.now_ms())?;
    Ok(())
}

fn run_ipc_loop(session: &mut Session) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let Some(reply) = handle_ipc_line(session, &buffer, SystemClock.now_ms())? else {
            break;
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

/// Answer one request line. Bad requests and engine errors get an
/// `{"error": ...}` reply and the session keeps running; only store
/// failures abort. Returns None on `quit`.
fn handle_ipc_line(session: &mut Session, line: &str, now: Timestamp) -> Result<Option<String>> {
    let cmd: IpcCommand = match serde_json::from_str(line) {
        Ok(c) => c,
        Err(e) => return Ok(Some(error_reply(&e))),
    };

    match cmd {
        IpcCommand::Quit => {
            session.save(now)?;
            return Ok(None);
        }
        IpcCommand::Tick { count } => session.engine.tick(count),
        IpcCommand::GetState => {}
        IpcCommand::Command { command } => {
            if let Err(e) = session.engine.submit(command, now) {
                log::warn!("ipc: command failed: {e}");
                return Ok(Some(error_reply(&e)));
            }
        }
        IpcCommand::Save => session.save(now)?,
    }
    let events = session.flush_events(now)?;
    let state = build_ui_state(session, events)?;
    Ok(Some(serde_json::to_string(&state)?))
}

fn error_reply(e: &dyn std::fmt::Display) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

fn build_ui_state(session: &Session, events: Vec<GameEvent>) -> Result<UiState> {
    let engine = &session.engine;
    Ok(UiState {
        save_id:          session.save_id.clone(),
        resources:        engine.resources_view(),
        active_bulk_buy:  engine.state().ui.active_bulk_buy,
        bulk_buy_options: engine.catalog().bulk_buy_options().to_vec(),
        groups:           engine.group_views(),
        subgroups:        engine.subgroup_views()?,
        upgrades:         engine.current_upgrade_views()?,
        events,
    })
}

fn report_startup_event(event: &GameEvent) {
    match event {
        GameEvent::SnapshotRejected { reason } => {
            println!("! saved game could not be loaded ({reason}); started a new game");
        }
        GameEvent::OfflineProgressCredited { elapsed_seconds, atoms_earned } => {
            println!(
                "You were gone for {elapsed_seconds} seconds.\nYou earned {} atoms while you were away.",
                format_atoms(*atoms_earned, 2)
            );
        }
        _ => {}
    }
}

fn print_summary(session: &Session, seconds: u64) {
    let engine = &session.engine;
    let r = engine.resources_view();
    let state = engine.state();
    let unlocked = state.ui.unlocked_groups.len();

    println!();
    println!("=== RUN SUMMARY ===");
    println!("  save_id:          {}", session.save_id);
    println!("  seconds run:      {seconds}");
    println!("  atoms:            {}", format_atoms(r.atom_count, 2));
    println!("  atoms/s:          {}", format_atoms(r.effective_atoms_per_second, 2));
    println!("  multiplier:       x{:.3}", r.prestige_multiplier);
    println!("  prestige pending: +{:.3}", r.prestige_pending);
    println!("  upgrades bought:  {}", state.total_purchased());
    println!("  groups unlocked:  {unlocked}/{}", engine.catalog().groups().len());
    if let Some(saved) = state.last_saved.and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis) {
        println!("  last saved:       {}", saved.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
