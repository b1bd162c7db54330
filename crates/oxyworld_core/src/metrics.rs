//! Run metrics and structured logging.
//!
//! Counters are updated concurrently from agent steps and read by the
//! scheduler when it summarizes a run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Atomic counters for one simulation run.
pub struct Metrics {
    tick_count: AtomicU64,
    live_agents: AtomicU64,
    grooms: AtomicU64,
    aggressions: AtomicU64,
    meals: AtomicU64,
    deaths: AtomicU64,
    bounds_rejections: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            live_agents: AtomicU64::new(0),
            grooms: AtomicU64::new(0),
            aggressions: AtomicU64::new(0),
            meals: AtomicU64::new(0),
            deaths: AtomicU64::new(0),
            bounds_rejections: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, duration: Duration, live_agents: usize, live_food: usize) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.live_agents.store(live_agents as u64, Ordering::Relaxed);

        let tick = self.tick_count.load(Ordering::Relaxed);
        if tick % 1000 == 0 {
            tracing::info!(
                tick = tick,
                live_agents = live_agents,
                live_food = live_food,
                grooms = self.grooms(),
                aggressions = self.aggressions(),
                duration_us = duration.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    pub fn record_groom(&self) {
        self.grooms.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_aggression(&self) {
        self.aggressions.fetch_add(1, Ordering::Relaxed);
    }

    /// A shared or solitary meal has finished.
    pub fn record_meal(&self) {
        self.meals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_death(&self, agent: u32, iteration: u64) {
        self.deaths.fetch_add(1, Ordering::Relaxed);
        tracing::info!(agent = agent, iteration = iteration, "Agent died");
    }

    pub fn record_bounds_rejection(&self) {
        self.bounds_rejections.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn live_agents(&self) -> u64 {
        self.live_agents.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn grooms(&self) -> u64 {
        self.grooms.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn aggressions(&self) -> u64 {
        self.aggressions.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn meals(&self) -> u64 {
        self.meals.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn deaths(&self) -> u64 {
        self.deaths.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn bounds_rejections(&self) -> u64 {
        self.bounds_rejections.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize the global tracing subscriber.
///
/// Honors `RUST_LOG`, defaulting to `info`. Log lines go to stderr so stdout
/// stays free for frame output. Calling it twice is harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish(),
    )
    .ok();
}
