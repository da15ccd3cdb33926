use super::unresolved;
use crate::params::Params;
use crate::template;
use anyhow::{Context, anyhow};
use procedure::{Phase, Process, ProcedureContext, ProcessError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Creates directories; revert removes only the ones this run created
#[derive(Debug, Clone)]
pub struct MakeDirs {
    paths: Vec<String>,
    params: Arc<Params>,
    created: Vec<PathBuf>,
}

impl MakeDirs {
    pub fn new(paths: Vec<String>, params: Arc<Params>) -> Self {
        Self {
            paths,
            params,
            created: Vec::new(),
        }
    }

    fn render(&self, ctx: &ProcedureContext, phase: Phase) -> Result<Vec<PathBuf>, ProcessError> {
        self.paths
            .iter()
            .map(|path| template::render_path(path, ctx, &self.params).map_err(unresolved(phase)))
            .collect()
    }
}

/// Missing ancestors of `path` (itself included), outermost first
fn missing_ancestors(path: &Path) -> Vec<PathBuf> {
    let mut missing: Vec<PathBuf> = path
        .ancestors()
        .take_while(|p| !p.as_os_str().is_empty() && !p.exists())
        .map(Path::to_path_buf)
        .collect();
    missing.reverse();
    missing
}

impl Process for MakeDirs {
    fn name(&self) -> String {
        "make_dirs".to_string()
    }

    fn check(&mut self, ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        let violations: Vec<String> = self
            .render(ctx, Phase::Check)?
            .into_iter()
            .filter(|path| path.exists() && !path.is_dir())
            .map(|path| format!("'{}' exists and is not a directory", path.display()))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ProcessError::check_failed(violations))
        }
    }

    fn execute(&mut self, ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        for path in self.render(ctx, Phase::Execute)? {
            let missing = missing_ancestors(&path);
            if missing.is_empty() {
                log::debug!("Directory already exists: {}", path.display());
                continue;
            }

            fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            log::info!("Created {}", path.display());
            self.created.extend(missing);
        }
        Ok(())
    }

    fn revert(&mut self, _ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        // Deepest first
        self.created
            .sort_by_key(|path| std::cmp::Reverse(path.components().count()));

        let mut failed = Vec::new();
        for path in std::mem::take(&mut self.created) {
            if !path.exists() {
                continue;
            }
            match fs::remove_dir_all(&path) {
                Ok(()) => log::info!("Removed {}", path.display()),
                Err(err) => {
                    log::warn!("Failed to remove directory {}: {}", path.display(), err);
                    failed.push(path);
                }
            }
        }

        if failed.is_empty() {
            return Ok(());
        }
        let listed: Vec<String> = failed.iter().map(|p| p.display().to_string()).collect();
        self.created = failed;
        Err(anyhow!("Failed to remove directories: {}", listed.join(", ")).into())
    }
}
