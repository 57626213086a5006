//! swarm-runner: headless host for the Probe Swarm economy.
//!
//! Usage:
//!   swarm-runner --db probe-swarm.db --seconds 60
//!   swarm-runner --db probe-swarm.db --ipc-mode
//!   swarm-runner --import save.json --export-dir ./exports --seconds 0

use anyhow::Result;
use chrono::Utc;
use probeswarm_core::{
    autosave::Debouncer,
    clock::TickClock,
    command::PlayerCommand,
    engine::SwarmEngine,
    event::GameEvent,
    export_save_file, import_save_file,
    production::ProductionSnapshot,
    state::{PrestigeState, ResourceState, UnitCounts, UpgradeState},
    store::SaveStore,
    types::Tick,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick { count: u64 },
    Command { command: PlayerCommand },
    Save,
    Export { dir: PathBuf },
    Import { path: PathBuf },
    Quit,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct UiState<'a> {
    tick:                   Tick,
    paused:                 bool,
    resources:              ResourceState,
    units:                  UnitCounts,
    prestige:               PrestigeState,
    upgrades:               UpgradeState,
    production:             ProductionSnapshot,
    pending_knowledge:      f64,
    pending_prime_archives: f64,
    recent_logs:            &'a [String],
    events:                 Vec<GameEvent>,
}

struct Options {
    db:            String,
    seconds:       u64,
    no_sleep:      bool,
    ipc_mode:      bool,
    export_dir:    Option<PathBuf>,
    import:        Option<PathBuf>,
    autosave_secs: u64,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let opts = Options {
        db:            flag_value(&args, "--db").unwrap_or("probe-swarm.db").to_string(),
        seconds:       parse_arg(&args, "--seconds", 30u64),
        no_sleep:      args.iter().any(|a| a == "--no-sleep"),
        ipc_mode:      args.iter().any(|a| a == "--ipc-mode"),
        export_dir:    flag_value(&args, "--export-dir").map(PathBuf::from),
        import:        flag_value(&args, "--import").map(PathBuf::from),
        autosave_secs: parse_arg(&args, "--autosave-secs", 5u64),
    };

    if !opts.ipc_mode {
        println!("Probe Swarm swarm-runner {APP_VERSION}");
        println!("  db:        {}", opts.db);
        println!("  seconds:   {}", opts.seconds);
        println!("  autosave:  {}s", opts.autosave_secs);
        println!();
    }

    let store = SaveStore::open(&opts.db)?;
    store.migrate()?;

    let mut engine = restore_session(&store, opts.import.as_deref())?;
    let mut saver = Debouncer::new(Duration::from_secs(opts.autosave_secs));

    if opts.ipc_mode {
        run_ipc_loop(&mut engine, &store, &mut saver)?;
    } else {
        run_live(&mut engine, &store, &mut saver, &opts);
        print_summary(&engine);
    }

    // Teardown: drop the pending autosave and write the final state once.
    saver.cancel();
    store.save_envelope(&engine.to_envelope());

    if let Some(dir) = &opts.export_dir {
        let path = export_save_file(&engine.to_envelope(), dir)?;
        if !opts.ipc_mode {
            println!("Exported save to {}", path.display());
        }
    }
    Ok(())
}

/// Load (or import), migrate, then fast-forward across the time closed.
fn restore_session(store: &SaveStore, import: Option<&Path>) -> Result<SwarmEngine> {
    let envelope = match import {
        Some(path) => Some(import_save_file(path)?),
        None => store.load_envelope()?,
    };
    let Some(envelope) = envelope else {
        log::info!("No save found; starting a fresh swarm");
        return Ok(SwarmEngine::new(APP_VERSION));
    };

    let away = envelope.seconds_since_save(Utc::now());
    let mut engine = SwarmEngine::from_envelope(envelope, APP_VERSION);
    if let GameEvent::OfflineProgressApplied { summary, .. } = engine.apply_offline(away) {
        log::info!("{summary}");
    }
    Ok(engine)
}

/// Fixed 250 ms ticks for `opts.seconds`, with the autosave polled on
/// its own schedule.
fn run_live(engine: &mut SwarmEngine, store: &SaveStore, saver: &mut Debouncer, opts: &Options) {
    let total_ticks = opts.seconds * 1000 / TickClock::interval().as_millis() as u64;
    for _ in 0..total_ticks {
        if !engine.clock.paused {
            for event in engine.tick() {
                println!("  [tick {}] {}", engine.clock.current_tick, event.describe());
            }
        }
        autosave_step(engine, store, saver);
        if !opts.no_sleep {
            std::thread::sleep(TickClock::interval());
        }
    }
}

fn autosave_step(engine: &mut SwarmEngine, store: &SaveStore, saver: &mut Debouncer) {
    let now = Instant::now();
    if engine.take_dirty() {
        saver.notify(now);
    }
    if saver.poll(now) {
        // Failures are logged by the store; the next change reschedules.
        store.save_envelope(&engine.to_envelope());
    }
}

/// Stdin lines arrive on a reader thread so the autosave keeps its own
/// schedule while the client is idle.
fn spawn_stdin_reader() -> mpsc::Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn run_ipc_loop(engine: &mut SwarmEngine, store: &SaveStore, saver: &mut Debouncer) -> Result<()> {
    let mut stdout = io::stdout();
    let lines = spawn_stdin_reader();

    loop {
        let line = match lines.recv_timeout(TickClock::interval()) {
            Ok(line) => line?,
            Err(RecvTimeoutError::Timeout) => {
                autosave_step(engine, store, saver);
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break, // EOF
        };
        if line.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&line) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        let outcome = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => Ok(vec![]),
            IpcCommand::Tick { count } => Ok(engine.run_ticks(count)),
            IpcCommand::Command { command } => engine.apply_command(command),
            IpcCommand::Save => {
                saver.cancel();
                store.save_envelope(&engine.to_envelope());
                Ok(vec![])
            }
            IpcCommand::Export { dir } => export_save_file(&engine.to_envelope(), &dir).map(|_| vec![]),
            IpcCommand::Import { path } => import_save_file(&path).map(|env| vec![engine.load_envelope(env)]),
        };

        match outcome {
            Ok(events) => {
                let state = build_ui_state(engine, events);
                writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
            }
            Err(e) => write_error(&mut stdout, &e.to_string())?,
        }
        stdout.flush()?;
        autosave_step(engine, store, saver);
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{err_json}")?;
    stdout.flush()?;
    Ok(())
}

fn build_ui_state(engine: &SwarmEngine, events: Vec<GameEvent>) -> UiState<'_> {
    let logs = &engine.state.logs;
    let recent = &logs[logs.len().saturating_sub(10)..];
    UiState {
        tick:                   engine.clock.current_tick,
        paused:                 engine.clock.paused,
        resources:              engine.state.resources,
        units:                  engine.state.units,
        prestige:               engine.state.prestige,
        upgrades:               engine.state.upgrade_state,
        production:             engine.snapshot(),
        pending_knowledge:      engine.pending_knowledge(),
        pending_prime_archives: engine.pending_prime_archives(),
        recent_logs:            recent,
        events,
    }
}

fn print_summary(engine: &SwarmEngine) {
    let r = &engine.state.resources;
    let p = &engine.state.prestige;
    let snap = engine.snapshot();

    println!("=== SWARM SUMMARY ===");
    println!("  ticks run:   {} ({:.2}s simulated)", engine.clock.current_tick, engine.clock.elapsed);
    println!("  metal:       {:.1} (+{:.2}/s)", r.metal, snap.metal);
    println!("  energy:      {:.1} (+{:.2}/s)", r.energy, snap.energy);
    println!("  data:        {:.1} (+{:.2}/s)", r.data, snap.data);
    println!("  probes:      {:.1} (+{:.2}/s)", r.probes, snap.probes);
    println!("  distance:    {:.1} (+{:.2}/s)", r.distance, snap.distance);
    println!("  entropy:     {:.3} ({:+.4}/s)", r.entropy, snap.entropy_change);
    println!("  factor:      {:.3} (latency {:.3})", snap.production_factor, snap.latency_factor);
    println!("  cycles:      {} (knowledge {:.0})", p.cycles, p.stored_knowledge);
    println!("  forks:       {} (prime archives {:.0})", p.forks, p.prime_archives);

    println!();
    println!("=== RECENT LOG ===");
    if engine.state.logs.is_empty() {
        println!("  (nothing yet)");
    } else {
        for line in engine.state.logs.iter().rev().take(5).rev() {
            println!("  {line}");
        }
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
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
