//! Precondition-only processes

use super::unresolved;
use crate::params::Params;
use crate::template;
use procedure::{Phase, Process, ProcedureContext, ProcessError};
use serde::Deserialize;
use std::sync::Arc;

/// Fails the check when any key is missing from both the inputs and the path context
#[derive(Debug, Clone)]
pub struct RequireInputs {
    keys: Vec<String>,
}

impl RequireInputs {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }
}

impl Process for RequireInputs {
    fn name(&self) -> String {
        "require_inputs".to_string()
    }

    fn check(&mut self, ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        let missing: Vec<String> = self
            .keys
            .iter()
            .filter(|key| ctx.input(key).is_none() && ctx.path(key).is_none())
            .map(|key| format!("missing input '{key}'"))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ProcessError::check_failed(missing))
        }
    }

    fn execute(&mut self, _ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        Ok(())
    }

    fn revert(&mut self, _ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        Ok(())
    }
}

/// What a required path must be
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    #[default]
    Any,
    File,
    Dir,
}

/// Fails the check when a path does not exist as the expected kind
#[derive(Debug, Clone)]
pub struct RequirePath {
    path: String,
    expect: PathKind,
    params: Arc<Params>,
}

impl RequirePath {
    pub fn new(path: String, expect: PathKind, params: Arc<Params>) -> Self {
        Self {
            path,
            expect,
            params,
        }
    }
}

impl Process for RequirePath {
    fn name(&self) -> String {
        "require_path".to_string()
    }

    fn check(&mut self, ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        let path = template::render_path(&self.path, ctx, &self.params)
            .map_err(unresolved(Phase::Check))?;

        let violation = match self.expect {
            _ if !path.exists() => Some("does not exist"),
            PathKind::File if !path.is_file() => Some("is not a file"),
            PathKind::Dir if !path.is_dir() => Some("is not a directory"),
            _ => None,
        };

        match violation {
            Some(problem) => Err(ProcessError::check_failed([format!(
                "'{}' {}",
                path.display(),
                problem
            )])),
            None => Ok(()),
        }
    }

    fn execute(&mut self, _ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        Ok(())
    }

    fn revert(&mut self, _ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        Ok(())
    }
}
