use super::unresolved;
use crate::params::Params;
use crate::template;
use anyhow::{Context, anyhow};
use procedure::{Phase, Process, ProcedureContext, ProcessError, Value};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Writes a value as pretty JSON; revert puts the previous file back
///
/// The value is either inline (`value`) or read from the context (`from`,
/// resolved like a template placeholder).
#[derive(Debug, Clone)]
pub struct WriteJson {
    path: String,
    from: Option<String>,
    value: Option<Value>,
    params: Arc<Params>,
    written: Option<Written>,
}

#[derive(Debug, Clone)]
struct Written {
    path: PathBuf,
    previous: Option<Vec<u8>>,
}

impl WriteJson {
    pub fn new(
        path: String,
        from: Option<String>,
        value: Option<Value>,
        params: Arc<Params>,
    ) -> Self {
        Self {
            path,
            from,
            value,
            params,
            written: None,
        }
    }

    fn value(&self, ctx: &ProcedureContext) -> anyhow::Result<Value> {
        match (&self.from, &self.value) {
            (Some(key), None) => ctx
                .lookup(key)
                .cloned()
                .ok_or_else(|| anyhow!("No context value '{}' to write", key)),
            (None, Some(value)) => Ok(value.clone()),
            _ => Err(anyhow!("write_json needs exactly one of 'from' or 'value'")),
        }
    }
}

impl Process for WriteJson {
    fn name(&self) -> String {
        "write_json".to_string()
    }

    fn check(&mut self, _ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        if self.from.is_some() == self.value.is_some() {
            return Err(ProcessError::check_failed([format!(
                "write_json '{}' needs exactly one of 'from' or 'value'",
                self.path
            )]));
        }
        Ok(())
    }

    fn execute(&mut self, ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        let path = template::render_path(&self.path, ctx, &self.params)
            .map_err(unresolved(Phase::Execute))?;
        let value = self.value(ctx)?;

        let previous = if path.exists() {
            Some(fs::read(&path).with_context(|| format!("Failed to back up {}", path.display()))?)
        } else {
            None
        };

        let content = serde_json::to_string_pretty(&value).context("Failed to serialize value")?;
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Wrote {}", path.display());

        self.written = Some(Written { path, previous });
        Ok(())
    }

    fn revert(&mut self, _ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        let Some(Written { path, previous }) = self.written.take() else {
            return Ok(());
        };

        match previous {
            Some(content) => {
                fs::write(&path, content)
                    .with_context(|| format!("Failed to restore {}", path.display()))?;
                log::info!("Restored {}", path.display());
            }
            None if path.exists() => {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
                log::info!("Removed {}", path.display());
            }
            None => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procedure::ValueMap;
    use serde_json::json;
    use tempfile::TempDir;

    fn context(dir: &std::path::Path) -> ProcedureContext {
        let mut ctx = ProcedureContext::new("", "write", ValueMap::new());
        ctx.set_path("dir", dir.to_string_lossy().to_string());
        ctx.set("frames", json!([1001, 1002]));
        ctx
    }

    fn read(path: &std::path::Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_write_from_context_and_revert_deletes() {
        let tmp = TempDir::new().unwrap();
        let mut ctx = context(tmp.path());
        let mut process = WriteJson::new(
            "{dir}/frames.json".into(),
            Some("frames".into()),
            None,
            Arc::new(Params::default()),
        );

        process.check(&mut ctx).unwrap();
        process.execute(&mut ctx).unwrap();
        assert_eq!(read(&tmp.path().join("frames.json")), json!([1001, 1002]));

        process.revert(&mut ctx).unwrap();
        assert!(!tmp.path().join("frames.json").exists());
    }

    #[test]
    fn test_revert_restores_previous_content() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("meta.json");
        fs::write(&file, "{\"old\": true}").unwrap();
        let mut ctx = context(tmp.path());
        let mut process = WriteJson::new(
            "{dir}/meta.json".into(),
            None,
            Some(json!({"new": true})),
            Arc::new(Params::default()),
        );

        process.execute(&mut ctx).unwrap();
        assert_eq!(read(&file), json!({"new": true}));

        process.revert(&mut ctx).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "{\"old\": true}");
    }

    #[test]
    fn test_needs_exactly_one_source() {
        let mut ctx = context(std::path::Path::new("/tmp"));
        let params = Arc::new(Params::default());

        let mut neither = WriteJson::new("x.json".into(), None, None, Arc::clone(&params));
        assert!(neither.check(&mut ctx).unwrap_err().violations().is_some());

        let mut both = WriteJson::new(
            "x.json".into(),
            Some("frames".into()),
            Some(json!(1)),
            params,
        );
        assert!(both.check(&mut ctx).is_err());
    }

    #[test]
    fn test_missing_context_value_fails_execute() {
        let tmp = TempDir::new().unwrap();
        let mut ctx = context(tmp.path());
        let mut process = WriteJson::new(
            "{dir}/out.json".into(),
            Some("nothing".into()),
            None,
            Arc::new(Params::default()),
        );

        let err = process.execute(&mut ctx).unwrap_err();
        assert!(err.violations().is_none());
        assert!(!tmp.path().join("out.json").exists());
    }

    #[test]
    fn test_unresolved_path_is_an_execute_failure() {
        let tmp = TempDir::new().unwrap();
        let mut ctx = context(tmp.path());
        let mut process = WriteJson::new(
            "{shot_dir}/out.json".into(),
            None,
            Some(json!({"frames": 10})),
            Arc::new(Params::default()),
        );

        let err = process.execute(&mut ctx).unwrap_err();

        assert!(err.violations().is_none());
        assert!(err.to_string().contains("shot_dir"));
    }
}
