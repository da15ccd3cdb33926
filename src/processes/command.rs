use super::unresolved;
use crate::params::Params;
use crate::{runner, template};
use anyhow::Context;
use procedure::{Phase, Process, ProcedureContext, ProcessError};
use std::sync::Arc;

/// Runs an external command; revert runs the optional undo command
#[derive(Debug, Clone)]
pub struct RunCommand {
    run: Vec<String>,
    revert: Vec<String>,
    params: Arc<Params>,
}

impl RunCommand {
    pub fn new(run: Vec<String>, revert: Vec<String>, params: Arc<Params>) -> Self {
        Self {
            run,
            revert,
            params,
        }
    }

    fn render(
        &self,
        argv: &[String],
        ctx: &ProcedureContext,
        phase: Phase,
    ) -> Result<Vec<String>, ProcessError> {
        argv.iter()
            .map(|arg| template::render(arg, ctx, &self.params).map_err(unresolved(phase)))
            .collect()
    }
}

impl Process for RunCommand {
    fn name(&self) -> String {
        "command".to_string()
    }

    fn check(&mut self, ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        let mut violations = Vec::new();

        for argv in [&self.run, &self.revert] {
            let Some(program) = argv.first() else {
                continue;
            };
            let program = template::render(program, ctx, &self.params)
                .map_err(unresolved(Phase::Check))?;
            if !runner::command_exists(&program) {
                violations.push(format!("command '{program}' not found"));
            }
        }

        if self.run.is_empty() {
            violations.push("command has nothing to run".to_string());
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ProcessError::check_failed(violations))
        }
    }

    fn execute(&mut self, ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        let argv = self.render(&self.run, ctx, Phase::Execute)?;
        runner::run_argv(&argv)?;
        Ok(())
    }

    fn revert(&mut self, ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        if self.revert.is_empty() {
            return Ok(());
        }
        let argv = self.render(&self.revert, ctx, Phase::Revert)?;
        runner::run_argv(&argv).context("Revert command failed")?;
        Ok(())
    }
}
