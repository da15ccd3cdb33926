//! `{key}` templates for paths and command arguments
//!
//! A placeholder is resolved from the path context, then the input
//! arguments, then `params.<dotted key>` from the parameter layers. After
//! substitution `~` and `$VAR` are expanded.

use crate::params::{self, Params};
use procedure::{ProcedureContext, Value};
use regex::{Captures, Regex};
use std::path::PathBuf;
use std::sync::LazyLock;
use thiserror::Error;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_.\-]*)\}").expect("placeholder pattern is valid")
});

const PARAMS_PREFIX: &str = "params.";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unresolved {} in '{template}': {}", plural(.keys.len()), .keys.join(", "))]
pub struct Unresolved {
    pub template: String,
    pub keys: Vec<String>,
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "placeholder" } else { "placeholders" }
}

/// Substitute every placeholder in `template`
pub fn render(
    template: &str,
    ctx: &ProcedureContext,
    params: &Params,
) -> Result<String, Unresolved> {
    let mut missing = Vec::new();

    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures| {
        let key = &caps[1];
        match resolve(key, ctx, params) {
            Some(value) => value,
            None => {
                missing.push(key.to_string());
                caps[0].to_string()
            }
        }
    });

    if !missing.is_empty() {
        return Err(Unresolved {
            template: template.to_string(),
            keys: missing,
        });
    }

    Ok(crate::paths::expand_str(&rendered))
}

/// [`render`] for templates that name a path
pub fn render_path(
    template: &str,
    ctx: &ProcedureContext,
    params: &Params,
) -> Result<PathBuf, Unresolved> {
    render(template, ctx, params).map(PathBuf::from)
}

fn resolve(key: &str, ctx: &ProcedureContext, params: &Params) -> Option<String> {
    if let Some(value) = ctx.path(key).or_else(|| ctx.input(key)) {
        return Some(value_text(value));
    }
    key.strip_prefix(PARAMS_PREFIX)
        .and_then(|dotted| params.lookup(dotted))
        .map(params::display)
}

/// Text form of a context value; strings are not quoted
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
