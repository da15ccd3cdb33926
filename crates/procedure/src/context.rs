//! Procedure context
//!
//! The context is the value bag threaded through every phase of every
//! process in a run. The runner owns it; processes and expanders borrow it
//! for the duration of a single call.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use serde_json::Value;

/// String-keyed value map used for inputs and derived data
pub type ValueMap = BTreeMap<String, Value>;

/// Shared state of a single procedure run
///
/// - `input_args` are supplied at construction and never modified by the engine
/// - `path_context` holds derived path-like data (entity, task, version, output paths)
/// - `any_context` holds everything else processes want to pass forward
/// - `return_value` is read by the caller once the run is over
///
/// A value written by one process is visible to every later phase and process
/// of the same run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcedureContext {
    argument: String,
    name: String,
    #[serde(default)]
    input_args: ValueMap,
    #[serde(default)]
    path_context: ValueMap,
    #[serde(default)]
    any_context: ValueMap,
    #[serde(default)]
    return_value: Option<Value>,
}

impl ProcedureContext {
    /// Create a context for a run
    ///
    /// `argument` identifies what the run operates on (an entity path, a file,
    /// a task key); the engine treats it as opaque.
    pub fn new(argument: impl Into<String>, name: impl Into<String>, input_args: ValueMap) -> Self {
        Self {
            argument: argument.into(),
            name: name.into(),
            input_args,
            path_context: ValueMap::new(),
            any_context: ValueMap::new(),
            return_value: None,
        }
    }

    pub fn argument(&self) -> &str {
        &self.argument
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_args(&self) -> &ValueMap {
        &self.input_args
    }

    /// Get an input argument
    pub fn input(&self, key: &str) -> Option<&Value> {
        self.input_args.get(key)
    }

    /// Get an input argument as a string slice
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.input(key).and_then(Value::as_str)
    }

    pub fn path_context(&self) -> &ValueMap {
        &self.path_context
    }

    /// Get a path context value
    pub fn path(&self, key: &str) -> Option<&Value> {
        self.path_context.get(key)
    }

    /// Get a path context value as a string slice
    pub fn path_str(&self, key: &str) -> Option<&str> {
        self.path(key).and_then(Value::as_str)
    }

    /// Set a path context value, returning the previous one
    pub fn set_path(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.path_context.insert(key.into(), value.into())
    }

    pub fn any_context(&self) -> &ValueMap {
        &self.any_context
    }

    /// Get a free-form context value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.any_context.get(key)
    }

    /// Set a free-form context value, returning the previous one
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.any_context.insert(key.into(), value.into())
    }

    /// Remove a free-form context value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.any_context.remove(key)
    }

    pub fn return_value(&self) -> Option<&Value> {
        self.return_value.as_ref()
    }

    /// Set the value handed back to the caller of `Procedure::launch`
    pub fn set_return_value(&mut self, value: impl Into<Value>) {
        self.return_value = Some(value.into());
    }

    /// Take the return value out of the context
    pub fn take_return_value(&mut self) -> Option<Value> {
        self.return_value.take()
    }

    /// Look a key up in `path_context`, then `input_args`, then `any_context`
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        self.path_context
            .get(key)
            .or_else(|| self.input_args.get(key))
            .or_else(|| self.any_context.get(key))
    }
}
