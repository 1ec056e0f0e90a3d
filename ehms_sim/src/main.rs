//! # EHMS Simulation Binary
//!
//! Drives the EHMS core against deterministic demo bus drivers in place of
//! real ARINC 429 / MIL-STD-1553B hardware, for development and demo use.
//!
//! # Usage
//!
//! ```bash
//! # Run the nominal scenario for 200 ticks (2 seconds of simulated time)
//! ehms_sim --scenario nominal --ticks 200
//!
//! # Run a fault-injection scenario with a custom config
//! ehms_sim --config ehms.toml --scenario oil-press-warning -v
//! ```

#![deny(warnings)]

mod clock;
mod drivers;
mod pacing;
mod sinks;

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use ehms_common::model::FlightPhase;
use ehms_core::config::{load_config, EhmsConfig};
use ehms_core::ports::ErrorReporter;
use ehms_core::EhmsCore;

use clock::SystemClock;
use drivers::{Scenario, SimMultiplexBus, SimSerialBus};
use pacing::CyclePacer;
use sinks::{DisplaySink, FaultReporterSink, RecorderSink};

/// EHMS simulation harness.
#[derive(Parser, Debug)]
#[command(name = "ehms_sim")]
#[command(author = "EHMS Core Team")]
#[command(version)]
#[command(about = "Engine health monitoring core simulation harness")]
struct Args {
    /// Path to an EHMS configuration file (TOML). Defaults built in if
    /// absent.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Demo scenario to run.
    #[arg(long, default_value = "nominal")]
    scenario: Scenario,

    /// Number of 10ms ticks to run before exiting.
    #[arg(short, long, default_value_t = 100)]
    ticks: u32,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("ehms_sim startup failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_tracing(&args);

    info!("EHMS simulation harness v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => {
            info!("no --config given, using built-in default configuration");
            EhmsConfig::default()
        }
    };

    let mut core = EhmsCore::new(&config)?;
    core.start();

    let clock = SystemClock::new();
    // Each engine has its own redundant bus pair in the real aircraft
    // wiring, so it gets its own driver instance here.
    let mut buses: Vec<(SimSerialBus, SimMultiplexBus)> = (0..config.engine_count)
        .map(|_| (SimSerialBus::new(args.scenario), SimMultiplexBus::new(args.scenario)))
        .collect();

    let mut display = DisplaySink;
    let mut recorder = RecorderSink;
    let mut fault_reporter = FaultReporterSink;

    info!(scenario = ?args.scenario, ticks = args.ticks, "running simulation");

    let mut pacer = CyclePacer::new(ehms_common::consts::CYCLE_PERIOD_US)?;

    for _ in 0..args.ticks {
        for (engine_id, (serial, mux)) in buses.iter_mut().enumerate() {
            let engine_id = engine_id as u8;
            let _ = core.tick_engine(
                engine_id,
                FlightPhase::Cruise,
                &clock,
                serial,
                mux,
                &mut display,
                &mut recorder,
                &mut fault_reporter,
            );
            serial.advance();
            mux.advance();

            if let Ok(snapshot) = core.get_snapshot(engine_id) {
                display.publish_health(engine_id, snapshot.health_status);
            }
        }
        recorder.record_statistics(&core.get_statistics());

        pacer.wait_for_next_cycle();
    }

    info!(
        master_caution = core.master_caution(),
        master_warning = core.master_warning(),
        active_alerts = core.active_alerts().len(),
        "simulation complete"
    );

    Ok(())
}

/// Set up the tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
