//! Layered project parameters
//!
//! Parameters come from up to three TOML layers, later layers overriding
//! earlier ones key by key:
//!
//! 1. built-in defaults
//! 2. `params.toml` in the config directory
//! 3. an explicit `--params <file>`
//!
//! Values are looked up by dotted key (`project.resolution.width`).

use anyhow::{Context, Result, bail};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

const DEFAULTS: &str = r#"
[project]
name = "default"
root = "~/procflow/projects"

[publish]
root = "~/procflow/publish"
"#;

/// Resolved parameters and the files they were read from
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: Table,
    sources: Vec<PathBuf>,
}

impl Params {
    /// Built-in defaults only
    pub fn defaults() -> Result<Self> {
        let values = DEFAULTS
            .parse::<Table>()
            .context("Invalid built-in parameters")?;
        Ok(Self {
            values,
            sources: Vec::new(),
        })
    }

    /// Defaults, then the project layer in `config_dir`, then `extra`
    ///
    /// A missing project layer is skipped; a missing `extra` file is an error.
    pub fn load(config_dir: &Path, extra: Option<&Path>) -> Result<Self> {
        let mut params = Self::defaults()?;

        let project = config_dir.join(crate::paths::PARAMS_FILE);
        if project.exists() {
            params.merge_file(&project)?;
        } else {
            log::debug!("No project parameters at {}", project.display());
        }

        if let Some(extra) = extra {
            params.merge_file(extra)?;
        }

        Ok(params)
    }

    /// Overlay a TOML file on the current values
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let layer = content
            .parse::<Table>()
            .with_context(|| format!("Invalid parameters in {}", path.display()))?;

        log::debug!("Loaded parameters from {}", path.display());
        merge(&mut self.values, layer);
        self.sources.push(path.to_path_buf());
        Ok(())
    }

    /// Value at a dotted key, if any
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let first = parts.next()?;
        parts.try_fold(self.values.get(first)?, |value, part| {
            value.as_table()?.get(part)
        })
    }

    /// Value at a dotted key
    pub fn get(&self, key: &str) -> Result<&Value> {
        match self.lookup(key) {
            Some(value) => Ok(value),
            None => bail!("Unknown parameter '{}'", key),
        }
    }

    /// Every leaf value, keyed by its dotted path
    pub fn flatten(&self) -> BTreeMap<String, &Value> {
        let mut out = BTreeMap::new();
        flatten_into(&self.values, "", &mut out);
        out
    }

    /// Files merged on top of the defaults, in order
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

/// Text form of a parameter value, as substituted into templates
pub fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn merge(base: &mut Table, layer: Table) {
    for (key, value) in layer {
        match value {
            Value::Table(incoming) => {
                if let Some(Value::Table(existing)) = base.get_mut(&key) {
                    merge(existing, incoming);
                } else {
                    base.insert(key, Value::Table(incoming));
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

fn flatten_into<'a>(table: &'a Table, prefix: &str, out: &mut BTreeMap<String, &'a Value>) {
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Table(inner) => flatten_into(inner, &path, out),
            leaf => {
                out.insert(path, leaf);
            }
        }
    }
}
