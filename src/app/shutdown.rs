//! Graceful shutdown handling for the application.
//!
//! A shutdown request terminates the attached run at its next tick boundary.

use super::RunController;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct ShutdownManager {
    shutdown_requested: Arc<AtomicBool>,
    controller: Option<RunController>,
    exit_code: i32,
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self {
            shutdown_requested: Arc::new(AtomicBool::new(false)),
            controller: None,
            exit_code: 0,
        }
    }

    /// Run to terminate when shutdown is requested.
    pub fn attach(&mut self, controller: RunController) {
        self.controller = Some(controller);
    }

    pub fn request_shutdown(&self) {
        if self.shutdown_requested.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!("Shutdown requested");
        if let Some(controller) = &self.controller {
            controller.terminate();
        }
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    pub fn set_exit_code(&mut self, code: i32) {
        self.exit_code = code;
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }
}
