//! Environment that runs shell commands around a procedure

use crate::runner;
use anyhow::{Context, Result};
use procedure::Environment;
use serde::Deserialize;

/// `[environment]` table of a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentSpec {
    #[serde(default)]
    pub start: Vec<String>,
    #[serde(default)]
    pub stop: Vec<String>,
}

/// Starts and stops the host application with configured commands
///
/// An empty command is a no-op.
#[derive(Debug, Clone)]
pub struct CommandEnvironment {
    start: Vec<String>,
    stop: Vec<String>,
}

impl CommandEnvironment {
    pub fn new(spec: &EnvironmentSpec) -> Self {
        Self {
            start: expand_all(&spec.start),
            stop: expand_all(&spec.stop),
        }
    }
}

fn expand_all(argv: &[String]) -> Vec<String> {
    argv.iter().map(|arg| crate::paths::expand_str(arg)).collect()
}

impl Environment for CommandEnvironment {
    fn start(&mut self) -> Result<()> {
        if self.start.is_empty() {
            return Ok(());
        }
        log::info!("Starting environment: {}", self.start.join(" "));
        runner::run_argv(&self.start).context("Environment start command failed")
    }

    fn stop(&mut self) -> Result<()> {
        if self.stop.is_empty() {
            return Ok(());
        }
        log::info!("Stopping environment: {}", self.stop.join(" "));
        runner::run_argv(&self.stop).context("Environment stop command failed")
    }
}
