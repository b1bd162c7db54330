//! Lockstep tick loop.
//!
//! Every tick: honour pending control commands, advance the world (food
//! cycling and vision), step every roster entry in parallel, join, then hand
//! the roster to the reporter. Nothing of tick `t + 1` starts before the
//! reporter has returned for tick `t`.

use crate::agent::StepContext;
use crate::config::SimConfig;
use crate::entity::{EntityRef, Roster};
use crate::error::{Result, SimError};
use crate::metrics::Metrics;
use crate::world::World;
use oxyworld_data::{DsiMode, RunSummary};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;
use uuid::Uuid;

/// Iteration limit when none is configured.
pub const DEFAULT_ITERATION_LIMIT: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerState {
    Idle,
    Running,
    Paused,
    Finished,
}

/// External control of a running simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlCommand {
    /// Pause a running loop; while paused, resume it.
    Stop,
    Resume,
    Terminate,
}

/// Returned by the reporter after each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFlow {
    Continue,
    /// The consumer has gone away; finish the run.
    Close,
}

pub type Reporter = Box<dyn FnMut(u64, &Roster) -> ReportFlow + Send>;

/// Next state after a control input. `None` means the control channel closed.
#[must_use]
pub fn transition(state: SchedulerState, input: Option<ControlCommand>) -> SchedulerState {
    use ControlCommand::*;
    use SchedulerState::*;
    match (state, input) {
        (Finished, _) => Finished,
        (_, Some(Terminate)) => Finished,
        (Running, Some(Stop)) => Paused,
        (Paused, Some(Stop | Resume)) | (Paused, None) => Running,
        (s, _) => s,
    }
}

pub struct Scheduler {
    run_id: Uuid,
    world: World,
    roster: Roster,
    config: SimConfig,
    dsi_mode: DsiMode,
    metrics: Metrics,
    iteration: u64,
    limit: u64,
    state: SchedulerState,
    control: Option<Receiver<ControlCommand>>,
    reporter: Option<Reporter>,
    terminated_early: bool,
}

impl Scheduler {
    #[must_use]
    pub fn new(world: World, roster: Roster, config: SimConfig, dsi_mode: DsiMode) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            world,
            roster,
            config,
            dsi_mode,
            metrics: Metrics::new(),
            iteration: 0,
            limit: DEFAULT_ITERATION_LIMIT,
            state: SchedulerState::Idle,
            control: None,
            reporter: None,
            terminated_early: false,
        }
    }

    pub fn set_control(&mut self, control: Receiver<ControlCommand>) {
        self.control = Some(control);
    }

    pub fn set_reporter<F>(&mut self, reporter: F)
    where
        F: FnMut(u64, &Roster) -> ReportFlow + Send + 'static,
    {
        self.reporter = Some(Box::new(reporter));
    }

    pub fn limit_iterations(&mut self, limit: u64) {
        self.limit = limit;
    }

    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Ticks completed so far.
    #[must_use]
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[must_use]
    pub fn dsi_mode(&self) -> DsiMode {
        self.dsi_mode
    }

    /// Number of roster entries matching `predicate`.
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&EntityRef<'_>) -> bool,
    {
        self.roster.count(predicate)
    }

    /// Drains pending commands without blocking, then blocks for as long as
    /// the loop is paused.
    fn poll_control(&mut self) {
        loop {
            let Some(rx) = &self.control else {
                return;
            };
            let input = if self.state == SchedulerState::Paused {
                rx.recv().ok()
            } else {
                match rx.try_recv() {
                    Ok(cmd) => Some(cmd),
                    Err(TryRecvError::Empty) => return,
                    Err(TryRecvError::Disconnected) => None,
                }
            };
            if input.is_none() {
                self.control = None;
            }

            let next = transition(self.state, input);
            if next != self.state {
                tracing::info!(run_id = %self.run_id, iteration = self.iteration, from = ?self.state, to = ?next, "Scheduler state change");
            }
            if next == SchedulerState::Finished && self.state != SchedulerState::Finished {
                self.terminated_early = true;
            }
            self.state = next;
            if self.state == SchedulerState::Finished {
                return;
            }
        }
    }

    /// Executes one full tick. Bounds failures inside steps are logged and absorbed.
    pub fn tick(&mut self) -> Result<()> {
        let started = Instant::now();
        self.world.tick(&self.roster);

        let ctx = StepContext {
            world: &self.world,
            roster: &self.roster,
            config: &self.config.agent,
            food: &self.config.food,
            population: self.roster.population(),
            dsi_mode: self.dsi_mode,
            metrics: &self.metrics,
            iteration: self.iteration,
        };
        let errors: Vec<(u32, SimError)> = self
            .roster
            .par_entities()
            .filter_map(|e| e.step(&ctx).err().map(|err| (e.id(), err)))
            .collect();

        for (id, err) in errors {
            if err.is_recoverable() {
                self.metrics.record_bounds_rejection();
                tracing::warn!(entity = id, %err, "Step error absorbed");
            } else {
                tracing::error!(entity = id, %err, "Step failed");
                return Err(err);
            }
        }

        self.iteration += 1;
        self.metrics.record_tick(
            started.elapsed(),
            self.roster.live_agents(),
            self.roster.live_foods(),
        );

        if let Some(reporter) = self.reporter.as_mut() {
            if reporter(self.iteration, &self.roster) == ReportFlow::Close {
                tracing::info!(run_id = %self.run_id, iteration = self.iteration, "Report consumer closed");
                self.state = SchedulerState::Finished;
                self.terminated_early = true;
            }
        }
        Ok(())
    }

    /// Ticks until the iteration limit, a terminate command, or a closed reporter.
    pub fn run(&mut self) -> Result<RunSummary> {
        let started = Instant::now();
        if self.state == SchedulerState::Idle {
            self.state = SchedulerState::Running;
        }
        tracing::info!(
            run_id = %self.run_id,
            population = self.roster.population(),
            dynamics = %self.world.dynamics(),
            dsi_mode = %self.dsi_mode,
            limit = self.limit,
            "Simulation started"
        );

        while self.state != SchedulerState::Finished && self.iteration < self.limit {
            self.poll_control();
            if self.state == SchedulerState::Finished {
                break;
            }
            if let Err(err) = self.tick() {
                self.state = SchedulerState::Finished;
                return Err(err);
            }
        }
        self.state = SchedulerState::Finished;

        let summary = self.summary(started.elapsed().as_millis() as u64);
        tracing::info!(
            run_id = %self.run_id,
            iterations = summary.iterations,
            live_agents = summary.live_agents,
            grooms = summary.grooms,
            aggressions = summary.aggressions,
            runtime_ms = summary.elapsed_ms,
            "Simulation finished"
        );
        Ok(summary)
    }

    #[must_use]
    pub fn summary(&self, elapsed_ms: u64) -> RunSummary {
        let live = self.roster.live_agents();
        RunSummary {
            run_id: self.run_id,
            iterations: self.iteration,
            live_agents: live,
            dead_agents: self.roster.agents().len() - live,
            grooms: self.metrics.grooms(),
            aggressions: self.metrics.aggressions(),
            meals: self.metrics.meals(),
            elapsed_ms,
            terminated_early: self.terminated_early,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use oxyworld_data::WorldDynamics;
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};

    fn empty_scheduler() -> Scheduler {
        let config = SimConfig::default();
        let world = World::new(&config.world, 0, WorldDynamics::Static);
        Scheduler::new(world, Roster::default(), config, DsiMode::Fixed)
    }

    #[test]
    fn test_transition_table() {
        use ControlCommand::*;
        use SchedulerState::*;
        assert_eq!(transition(Running, Some(Stop)), Paused);
        assert_eq!(transition(Running, Some(Resume)), Running);
        assert_eq!(transition(Running, None), Running);
        assert_eq!(transition(Paused, Some(Resume)), Running);
        assert_eq!(transition(Paused, Some(Stop)), Running);
        assert_eq!(transition(Paused, None), Running);
        assert_eq!(transition(Paused, Some(Terminate)), Finished);
        assert_eq!(transition(Running, Some(Terminate)), Finished);
        assert_eq!(transition(Finished, Some(Resume)), Finished);
        assert_eq!(transition(Idle, Some(Stop)), Idle);
    }

    #[test]
    fn test_default_limit() {
        let mut sched = empty_scheduler();
        assert_eq!(sched.state(), SchedulerState::Idle);
        let summary = sched.run().unwrap();
        assert_eq!(summary.iterations, DEFAULT_ITERATION_LIMIT);
        assert!(!summary.terminated_early);
        assert_eq!(sched.state(), SchedulerState::Finished);
    }

    #[test]
    fn test_reporter_sees_every_tick_in_order() {
        let mut sched = empty_scheduler();
        sched.limit_iterations(5);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        sched.set_reporter(move |i, _| {
            sink.lock().unwrap().push(i);
            ReportFlow::Continue
        });
        sched.run().unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_closed_reporter_finishes_run() {
        let mut sched = empty_scheduler();
        sched.limit_iterations(100);
        sched.set_reporter(|i, _| {
            if i == 3 {
                ReportFlow::Close
            } else {
                ReportFlow::Continue
            }
        });
        let summary = sched.run().unwrap();
        assert_eq!(summary.iterations, 3);
        assert!(summary.terminated_early);
    }

    #[test]
    fn test_terminate_before_start() {
        let mut sched = empty_scheduler();
        let (tx, rx) = mpsc::channel();
        sched.set_control(rx);
        tx.send(ControlCommand::Terminate).unwrap();
        let summary = sched.run().unwrap();
        assert_eq!(summary.iterations, 0);
        assert!(summary.terminated_early);
    }

    #[test]
    fn test_stop_then_disconnect_resumes() {
        let mut sched = empty_scheduler();
        sched.limit_iterations(10);
        let (tx, rx) = mpsc::channel();
        sched.set_control(rx);
        tx.send(ControlCommand::Stop).unwrap();
        drop(tx);
        let summary = sched.run().unwrap();
        assert_eq!(summary.iterations, 10);
        assert!(!summary.terminated_early);
    }

    #[test]
    fn test_stop_resume_pair_runs_to_limit() {
        let mut sched = empty_scheduler();
        sched.limit_iterations(4);
        let (tx, rx) = mpsc::channel();
        sched.set_control(rx);
        tx.send(ControlCommand::Stop).unwrap();
        tx.send(ControlCommand::Resume).unwrap();
        let summary = sched.run().unwrap();
        assert_eq!(summary.iterations, 4);
        drop(tx);
    }
}
