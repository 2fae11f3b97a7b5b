//! sim-runner: headless runner for the startup simulation.
//!
//! Usage:
//!   sim-runner --seed 12345 --ticks 43200 --db run.db
//!   sim-runner --seed 12345 --realtime-secs 10 --rate 120
//!   sim-runner --db run.db --resume run-12345-...
//!   sim-runner --seed 12345 --ipc-mode

use anyhow::{Context, Result};
use startup_sim_core::{
    clock::SimTime,
    command::{CommandResult, PlayerCommand},
    company::Notification,
    config::SimConfig,
    driver::TickDriver,
    engine::SimEngine,
    snapshot::WorldSnapshot,
    store::SimStore,
    types::Tick,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Newest notifications included in each state line.
const FEED_LIMIT: usize = 10;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick {
        count: u64,
    },
    Command {
        command: PlayerCommand,
    },
    Save,
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    tick: Tick,
    time: SimTime,
    paused: bool,
    tick_rate_hz: f64,
    world: WorldSnapshot,
    unread_notifications: usize,
    notifications: Vec<Notification>,
    dropped_requests: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_result: Option<CommandResult>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 1_440u64);
    let realtime_secs = parse_arg(&args, "--realtime-secs", 0u64);
    let rate = parse_arg(&args, "--rate", 0.0f64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = str_arg(&args, "--db").unwrap_or(":memory:");
    let config_path = str_arg(&args, "--config").unwrap_or("./data/sim_config.json");
    let resume = str_arg(&args, "--resume");

    let config = if Path::new(config_path).exists() {
        SimConfig::load(config_path)?
    } else {
        log::warn!("{config_path} not found, using built-in defaults");
        SimConfig::default()
    };

    let store = SimStore::open(db).with_context(|| format!("opening {db}"))?;
    let mut engine = match resume {
        Some(run_id) => SimEngine::load(run_id.to_string(), config, store)
            .with_context(|| format!("resuming {run_id}"))?,
        None => {
            let run_id = format!("run-{seed}-{}", uuid::Uuid::new_v4().simple());
            SimEngine::build(run_id, seed, config, store)?
        }
    };

    if !ipc_mode {
        println!("Startup Sim - sim-runner");
        println!("  run_id:    {}", engine.run_id);
        println!("  seed:      {}", engine.seed());
        println!("  db:        {db}");
        println!("  config:    {config_path}");
        println!();
    }

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else if realtime_secs > 0 {
        let engine = run_realtime(engine, realtime_secs, rate)?;
        engine.save()?;
        print_summary(&engine)?;
    } else {
        let accepted = engine.run_ticks(ticks)?;
        log::info!("ran {accepted} of {ticks} ticks");
        engine.save()?;
        print_summary(&engine)?;
    }

    Ok(())
}

fn run_realtime(mut engine: SimEngine, secs: u64, rate: f64) -> Result<SimEngine> {
    if rate > 0.0 {
        engine.state_mut().clock.set_tick_rate(rate);
    }
    let shared = Arc::new(Mutex::new(engine));
    let driver = TickDriver::spawn(Arc::clone(&shared));
    std::thread::sleep(Duration::from_secs(secs));
    let dropped = driver.dropped_requests();
    driver.stop();
    log::info!("driver stopped, {dropped} requests dropped");

    let engine = Arc::try_unwrap(shared)
        .map_err(|_| anyhow::anyhow!("engine still shared after driver stopped"))?
        .into_inner()
        .map_err(|_| anyhow::anyhow!("engine lock poisoned"))?;
    Ok(engine)
}

fn run_ipc_loop(engine: &mut SimEngine) -> Result<()> {
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
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let last_result = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Tick { count } => {
                engine.run_ticks(count)?;
                None
            }
            IpcCommand::GetState => None,
            IpcCommand::Command { command } => Some(engine.apply_command(command)?),
            IpcCommand::Save => {
                engine.save()?;
                Some(CommandResult::ok_with_message("saved"))
            }
        };
        let state = build_ui_state(engine, last_result);
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state(engine: &SimEngine, last_result: Option<CommandResult>) -> UiState {
    let state = engine.state();
    UiState {
        tick: engine.current_tick(),
        time: engine.time(),
        paused: state.clock.is_paused(),
        tick_rate_hz: state.clock.tick_rate_hz,
        world: state.snapshot(),
        unread_notifications: state.company.unread_count(),
        notifications: state.company.feed().take(FEED_LIMIT).cloned().collect(),
        dropped_requests: engine.dropped_requests(),
        last_result,
    }
}

fn print_summary(engine: &SimEngine) -> Result<()> {
    let state = engine.state();
    let world = state.snapshot();
    let run_id = &engine.run_id;
    let store = engine.store();

    println!("=== RUN SUMMARY ===");
    println!("  run_id:         {run_id}");
    println!("  final tick:     {}", engine.current_tick());
    println!("  sim time:       {}", engine.time());
    println!("  dropped:        {}", engine.dropped_requests());
    println!("  step failures:  {}", store.event_count(run_id, "cascade_step_failed")?);
    println!("  events logged:  {}", store.events_for_run(run_id)?.len());

    println!();
    println!("=== COMPANY ===");
    println!("  cash:           ${:.0}", world.company.cash);
    println!("  revenue/mo:     ${:.0}", world.company.revenue);
    println!("  expenses/mo:    ${:.0}", world.company.expenses);
    println!("  valuation:      ${:.0}", world.company.valuation);
    println!("  users:          {}", world.company.user_count);
    println!(
        "  reputation:     industry {:.1} | employer {:.1} | customer {:.1}",
        world.company.reputation.industry,
        world.company.reputation.employer,
        world.company.reputation.customer
    );
    println!("  team:           {} / {}", world.team.headcount, world.company.office_capacity);
    println!(
        "  product:        {}/{} features, {} open bugs, quality {:.0}",
        world.product.completed_features,
        world.product.total_features,
        world.product.open_bugs,
        world.product.quality
    );
    println!("  raised:         ${:.0}", world.investors.total_raised);

    let unlocked: Vec<&str> = state.achievements.unlocked().map(|a| a.title.as_str()).collect();
    println!();
    println!("=== ACHIEVEMENTS ({}) ===", unlocked.len());
    if unlocked.is_empty() {
        println!("  (none yet)");
    }
    for title in unlocked {
        println!("  {title}");
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}
