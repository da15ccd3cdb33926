//! Built-in processes
//!
//! Each `[[process]]` table of a manifest is tagged by `kind` and becomes one
//! of the processes below. Path and argument fields are templates (see
//! [`crate::template`]).

mod command;
mod make_dirs;
mod publish;
mod require;
mod write_json;

pub use command::RunCommand;
pub use make_dirs::MakeDirs;
pub use publish::{PUBLISH_RECORD, Publish, PublishRecord};
pub use require::{PathKind, RequireInputs, RequirePath};
pub use write_json::WriteJson;

use crate::params::Params;
use crate::template::Unresolved;
use procedure::{BoxedProcess, Phase, ProcessError, Value};
use serde::Deserialize;
use std::sync::Arc;

/// Kind name and one-line description of every built-in process
pub const KINDS: &[(&str, &str)] = &[
    ("require_inputs", "Check that input arguments are present"),
    ("require_path", "Check that a file or directory exists"),
    ("make_dirs", "Create directories, removing them on revert"),
    ("publish", "Copy a file or tree into the next version directory"),
    ("write_json", "Write a context value as JSON, restoring the old file on revert"),
    ("command", "Run a command, with an optional revert command"),
];

/// A `[[process]]` entry of a manifest
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessSpec {
    RequireInputs {
        keys: Vec<String>,
    },
    RequirePath {
        path: String,
        #[serde(default)]
        expect: PathKind,
    },
    MakeDirs {
        paths: Vec<String>,
    },
    Publish {
        source: String,
        destination: String,
        #[serde(default = "default_publish_key")]
        key: String,
    },
    WriteJson {
        path: String,
        from: Option<String>,
        value: Option<Value>,
    },
    Command {
        run: Vec<String>,
        #[serde(default)]
        revert: Vec<String>,
    },
}

fn default_publish_key() -> String {
    "published".to_string()
}

impl ProcessSpec {
    /// Kind name, as written in manifests
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RequireInputs { .. } => "require_inputs",
            Self::RequirePath { .. } => "require_path",
            Self::MakeDirs { .. } => "make_dirs",
            Self::Publish { .. } => "publish",
            Self::WriteJson { .. } => "write_json",
            Self::Command { .. } => "command",
        }
    }

    /// Build the process; templates are resolved against `params` at run time
    pub fn build(&self, params: &Arc<Params>) -> BoxedProcess {
        let params = Arc::clone(params);
        match self.clone() {
            Self::RequireInputs { keys } => Box::new(RequireInputs::new(keys)),
            Self::RequirePath { path, expect } => Box::new(RequirePath::new(path, expect, params)),
            Self::MakeDirs { paths } => Box::new(MakeDirs::new(paths, params)),
            Self::Publish {
                source,
                destination,
                key,
            } => Box::new(Publish::new(source, destination, key, params)),
            Self::WriteJson { path, from, value } => {
                Box::new(WriteJson::new(path, from, value, params))
            }
            Self::Command { run, revert } => Box::new(RunCommand::new(run, revert, params)),
        }
    }
}

/// Error for a template that could not be resolved
///
/// A violation while checking, a plain failure once execution has started.
fn unresolved(phase: Phase) -> impl Fn(Unresolved) -> ProcessError {
    move |err| match phase {
        Phase::Check => ProcessError::check_failed([err.to_string()]),
        Phase::Execute | Phase::Revert => ProcessError::from(anyhow::Error::from(err)),
    }
}
