use std::sync::Arc;

use crate::container::Container;
use crate::kernel::error::{Error, Result};

/// Phase-2 API handed to [`Bootstrap::boot`](crate::app::Bootstrap::boot).
///
/// Read-only access to the app container and the host (server) container.
/// Boot-time registrations go through services resolved from these
/// containers, never through the context itself.
#[derive(Debug, Clone)]
pub struct BootContext {
    app_container: Arc<Container>,
    server_container: Arc<Container>,
}

impl BootContext {
    pub fn new(app_container: Arc<Container>, server_container: Arc<Container>) -> Self {
        Self {
            app_container,
            server_container,
        }
    }

    pub fn app_container(&self) -> &Arc<Container> {
        &self.app_container
    }

    pub fn server_container(&self) -> &Arc<Container> {
        &self.server_container
    }
}

/// Runs independent boot steps to completion and reports their failures.
///
/// Every step is recorded whether or not an earlier one failed. With a single
/// failure, [`finish`](Self::finish) returns that error unchanged; with
/// several, it returns [`Error::BootFailed`] listing each of them.
#[derive(Debug)]
pub struct BootSteps {
    app_id: String,
    completed: Vec<&'static str>,
    failures: Vec<(String, Error)>,
}

impl BootSteps {
    pub fn new(app_id: &str) -> Self {
        Self {
            app_id: app_id.to_string(),
            completed: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn record(&mut self, step: &'static str, result: Result<()>) {
        match result {
            Ok(()) => {
                log::debug!("Boot step '{}' of '{}' completed", step, self.app_id);
                self.completed.push(step);
            }
            Err(e) => {
                log::error!("Boot step '{}' of '{}' failed: {}", step, self.app_id, e);
                self.failures.push((step.to_string(), e));
            }
        }
    }

    /// Steps that completed successfully, in order.
    pub fn completed(&self) -> &[&'static str] {
        &self.completed
    }

    pub fn failed_steps(&self) -> Vec<&str> {
        self.failures.iter().map(|(step, _)| step.as_str()).collect()
    }

    pub fn finish(mut self) -> Result<()> {
        match self.failures.len() {
            0 => Ok(()),
            1 => Err(self.failures.remove(0).1),
            _ => Err(Error::BootFailed {
                app_id: self.app_id,
                failures: self.failures,
            }),
        }
    }
}
