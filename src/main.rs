use anyhow::{Context, Result};
use clap::Parser;
use oxyworld_core::config::SimConfig;
use oxyworld_core::setup::{RunParameters, SimulationBuilder};
use oxyworld_data::RunSummary;
use oxyworld_lib::app::shutdown::ShutdownManager;
use oxyworld_lib::app::{self, RunHandle};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of agents (ids and ranks 1..=N)
    #[arg(short = 'n', long, default_value_t = 6)]
    population: u32,

    /// World dynamics: Static, Seasonal or Extreme
    #[arg(short, long, default_value = "Static")]
    dynamics: String,

    /// Bond groups, e.g. "[1,2,3]" or "[1,2];[3,4]"
    #[arg(short, long, default_value = "[]")]
    bonds: String,

    /// DSI mode: Fixed or Variable
    #[arg(long, default_value = "Fixed")]
    dsi_mode: String,

    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Overrides `run.iterations` from the config file
    #[arg(short, long)]
    iterations: Option<u64>,

    #[arg(long)]
    seed: Option<u64>,

    /// Emit only the end marker instead of every tick frame
    #[arg(short, long)]
    quiet: bool,
}

/// Writes frames as JSON lines until the end marker or a closed stdout.
fn stream_frames(handle: RunHandle, quiet: bool) -> Result<RunSummary> {
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for frame in handle.frames().iter() {
        let end = frame.is_end();
        if !quiet || end {
            let written = serde_json::to_writer(&mut out, &frame)
                .map_err(anyhow::Error::from)
                .and_then(|()| out.write_all(b"\n").map_err(anyhow::Error::from));
            if let Err(err) = written {
                tracing::warn!(%err, "Output closed, finishing run");
                break;
            }
        }
        if end {
            break;
        }
    }
    out.flush().ok();
    drop(out);
    handle.join()
}

#[tokio::main]
async fn main() -> Result<()> {
    oxyworld_core::init_logging();
    let args = Args::parse();

    let config = SimConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let params = RunParameters::parse(args.population, &args.dynamics, &args.bonds, &args.dsi_mode)
        .context("invalid run parameters")?;

    let mut builder = SimulationBuilder::new(config, params);
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    if let Some(iterations) = args.iterations {
        builder = builder.iterations(iterations);
    }

    let handle = app::start_with(builder)?;
    let mut shutdown = ShutdownManager::new();
    shutdown.attach(handle.controller());

    let quiet = args.quiet;
    let mut streamer = tokio::task::spawn_blocking(move || stream_frames(handle, quiet));
    let summary = tokio::select! {
        joined = &mut streamer => joined??,
        _ = tokio::signal::ctrl_c() => {
            shutdown.request_shutdown();
            shutdown.set_exit_code(130);
            streamer.await??
        }
    };

    tracing::info!(
        run_id = %summary.run_id,
        iterations = summary.iterations,
        live_agents = summary.live_agents,
        dead_agents = summary.dead_agents,
        meals = summary.meals,
        terminated_early = summary.terminated_early,
        "Run summary"
    );

    if shutdown.exit_code() != 0 {
        std::process::exit(shutdown.exit_code());
    }
    Ok(())
}
