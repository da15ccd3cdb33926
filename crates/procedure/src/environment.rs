//! Environment lifecycle around a run
//!
//! The environment is whatever has to be up while processes run (a host
//! application, a session, a lock). The runner starts it once before checking
//! and stops it once after the last phase.

use anyhow::Result;

/// Start/stop bracket around a whole procedure run
pub trait Environment: Send {
    fn start(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;
}

/// Environment for runs that need nothing started
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnvironment;

impl Environment for NoEnvironment {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Scoped environment - stopped exactly once, on `stop` or on drop
pub(crate) struct EnvironmentGuard<'a> {
    env: &'a mut dyn Environment,
    stopped: bool,
}

impl<'a> EnvironmentGuard<'a> {
    /// Start the environment
    ///
    /// The guard is returned even when starting fails so that `stop` is still
    /// paired with the `start` call.
    pub(crate) fn start(env: &'a mut dyn Environment) -> (Self, Result<()>) {
        log::debug!("Starting environment");
        let started = env.start();
        (
            Self {
                env,
                stopped: false,
            },
            started,
        )
    }

    /// Stop the environment; later calls and the drop are no-ops
    pub(crate) fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        log::debug!("Stopping environment");
        if let Err(err) = self.env.stop() {
            log::warn!("Failed to stop environment: {:#}", err);
        }
    }
}

impl Drop for EnvironmentGuard<'_> {
    fn drop(&mut self) {
        self.stop();
    }
}
