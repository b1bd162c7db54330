//! Background execution of a simulation run.
//!
//! The scheduler runs on its own thread. Each tick's roster snapshot is pushed
//! through a bounded channel, so a slow consumer holds the simulation back
//! instead of letting frames pile up. Dropping the frame receiver finishes the
//! run at the next tick boundary; `RunHandle::join` also terminates a paused run.

pub mod shutdown;

use anyhow::{anyhow, Context, Result};
use oxyworld_core::config::SimConfig;
use oxyworld_core::setup::{RunParameters, SimulationBuilder};
use oxyworld_core::{ControlCommand, ReportFlow};
use oxyworld_data::{RunSummary, TickFrame};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use uuid::Uuid;

/// Cloneable sender of control commands to a running scheduler.
#[derive(Debug, Clone)]
pub struct RunController {
    tx: Sender<ControlCommand>,
}

impl RunController {
    /// Pauses a running simulation, or resumes a paused one.
    pub fn stop(&self) -> bool {
        self.send(ControlCommand::Stop)
    }

    pub fn resume(&self) -> bool {
        self.send(ControlCommand::Resume)
    }

    pub fn terminate(&self) -> bool {
        self.send(ControlCommand::Terminate)
    }

    /// False once the scheduler has gone away.
    fn send(&self, command: ControlCommand) -> bool {
        let delivered = self.tx.send(command).is_ok();
        if !delivered {
            tracing::debug!(?command, "Control command dropped, run already finished");
        }
        delivered
    }
}

pub struct RunHandle {
    run_id: Uuid,
    frames: Receiver<TickFrame>,
    controller: RunController,
    worker: JoinHandle<oxyworld_core::Result<RunSummary>>,
}

impl RunHandle {
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Tick frames in iteration order, closed by a single `TickFrame::End`.
    #[must_use]
    pub fn frames(&self) -> &Receiver<TickFrame> {
        &self.frames
    }

    #[must_use]
    pub fn controller(&self) -> RunController {
        self.controller.clone()
    }

    /// Closes the frame stream, terminates the run if it is still going and
    /// waits for the scheduler thread. A paused run never reaches the next
    /// report, so it is told to terminate rather than left blocked.
    pub fn join(self) -> Result<RunSummary> {
        drop(self.frames);
        self.controller.terminate();
        let summary = self
            .worker
            .join()
            .map_err(|_| anyhow!("scheduler thread panicked"))??;
        Ok(summary)
    }

    /// Reads every frame up to the end marker, then joins.
    pub fn collect(self) -> Result<(Vec<TickFrame>, RunSummary)> {
        let mut frames = Vec::new();
        for frame in self.frames.iter() {
            let end = frame.is_end();
            frames.push(frame);
            if end {
                break;
            }
        }
        let summary = self.join()?;
        Ok((frames, summary))
    }
}

pub fn start_run(config: SimConfig, params: RunParameters) -> Result<RunHandle> {
    start_with(SimulationBuilder::new(config, params))
}

/// Builds the simulation and launches it on a dedicated thread.
pub fn start_with(builder: SimulationBuilder) -> Result<RunHandle> {
    let mut scheduler = builder.build().context("invalid simulation setup")?;
    let run_id = scheduler.run_id();

    let (frame_tx, frames) = mpsc::sync_channel(scheduler.config().run.snapshot_buffer);
    let (control_tx, control_rx) = mpsc::channel();
    scheduler.set_control(control_rx);

    let end_tx = frame_tx.clone();
    scheduler.set_reporter(move |iteration, roster| {
        let frame = TickFrame::Tick {
            iteration,
            entities: roster.records(),
        };
        match frame_tx.send(frame) {
            Ok(()) => ReportFlow::Continue,
            Err(_) => ReportFlow::Close,
        }
    });

    let worker = std::thread::Builder::new()
        .name(format!("oxyworld-{run_id}"))
        .spawn(move || {
            let result = scheduler.run();
            if let Err(err) = &result {
                tracing::error!(%run_id, %err, "Run aborted");
            }
            let _ = end_tx.send(TickFrame::End {
                iterations: scheduler.iteration(),
            });
            result
        })
        .context("failed to spawn scheduler thread")?;

    tracing::info!(%run_id, "Run launched");
    Ok(RunHandle {
        run_id,
        frames,
        controller: RunController { tx: control_tx },
        worker,
    })
}
