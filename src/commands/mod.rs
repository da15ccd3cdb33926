pub mod check;
pub mod kinds;
pub mod params;
pub mod run;

use crate::cli::RunArgs;
use crate::manifest::{self, Manifest};
use crate::params::Params;
use crate::paths;
use anyhow::Result;
use procedure::{ProcedureContext, ValueMap};
use std::path::Path;
use std::sync::Arc;

/// Everything a run or a check needs, loaded from the command line
pub struct Prepared {
    pub manifest: Manifest,
    pub params: Arc<Params>,
    pub context: ProcedureContext,
}

/// Load parameters and the manifest, and build the run context
pub fn prepare(args: &RunArgs) -> Result<Prepared> {
    let params = Arc::new(load_params(args.params.as_deref())?);
    let manifest = Manifest::load(&args.manifest)?;

    let mut overrides = ValueMap::new();
    for raw in &args.set {
        let (key, value) = manifest::parse_assignment(raw)?;
        overrides.insert(key, value);
    }

    let context = manifest.context(&args.arg, args.name.as_deref(), overrides);
    log::debug!(
        "Prepared '{}' with {} processes and {} inputs",
        context.name(),
        manifest.processes.len(),
        context.input_args().len()
    );

    Ok(Prepared {
        manifest,
        params,
        context,
    })
}

/// Parameters from the config directory plus an optional extra file
pub fn load_params(extra: Option<&Path>) -> Result<Params> {
    Params::load(&paths::config_dir()?, extra)
}
