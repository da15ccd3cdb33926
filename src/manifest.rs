//! Procedure manifests
//!
//! ```toml
//! name = "Publish model"
//! revert_order = "reverse"
//!
//! [inputs]
//! source = "~/work/hero.usd"
//!
//! [environment]
//! start = ["dcc", "--headless"]
//! stop = ["dcc", "--quit"]
//!
//! [[process]]
//! kind = "require_path"
//! path = "{source}"
//! expect = "file"
//!
//! [[process]]
//! kind = "publish"
//! source = "{source}"
//! destination = "{params.publish.root}/{entity_type}/{entity_name}/{task}"
//! ```

use crate::arg::entity_expander;
use crate::environment::{CommandEnvironment, EnvironmentSpec};
use crate::params::Params;
use crate::processes::ProcessSpec;
use anyhow::{Context, Result};
use procedure::{
    HookPoint, OutcomeReporter, Procedure, ProcedureContext, ProcessExecutor, RevertOrder, Step,
    ValueMap,
};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Run name; defaults to the manifest file stem
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: ValueMap,
    #[serde(default)]
    pub revert_order: RevertOrder,
    pub environment: Option<EnvironmentSpec>,
    #[serde(default, rename = "process")]
    pub processes: Vec<ProcessSpec>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read manifest: {}", path.display()))?;
        let mut manifest: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid manifest: {}", path.display()))?;

        if manifest.name.is_none() {
            manifest.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string());
        }
        Ok(manifest)
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("procedure")
    }

    /// Context for a run: manifest inputs overlaid with `overrides`
    pub fn context(
        &self,
        argument: &str,
        name: Option<&str>,
        overrides: ValueMap,
    ) -> ProcedureContext {
        let mut inputs = self.inputs.clone();
        inputs.extend(overrides);
        ProcedureContext::new(argument, name.unwrap_or(self.name()), inputs)
    }

    pub fn steps(&self, params: &Arc<Params>) -> Vec<Step> {
        self.processes
            .iter()
            .map(|spec| Step::from_boxed(spec.build(params)))
            .collect()
    }

    /// Executor with the entity path expander and the manifest's revert order
    pub fn executor(&self) -> ProcessExecutor {
        ProcessExecutor::new()
            .hook(HookPoint::BeforeCheck, entity_expander())
            .revert_order(self.revert_order)
    }

    /// Procedure ready to launch
    pub fn procedure(
        &self,
        context: ProcedureContext,
        params: &Arc<Params>,
        reporter: impl OutcomeReporter + 'static,
    ) -> Procedure {
        let procedure = Procedure::new(self.steps(params), context)
            .with_executor(self.executor())
            .with_reporter(reporter);

        match &self.environment {
            Some(spec) => procedure.with_environment(CommandEnvironment::new(spec)),
            None => procedure,
        }
    }
}

/// Parse `key=value`; the value is JSON when it parses as JSON, a string otherwise
pub fn parse_assignment(raw: &str) -> Result<(String, procedure::Value)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("Expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Empty key in '{raw}'");
    }
    let value: procedure::Value = serde_json::from_str(value).unwrap_or_else(|_| value.into());
    Ok((key.to_string(), value))
}
