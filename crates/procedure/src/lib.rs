//! Procedure engine
//!
//! Runs an ordered list of [`Process`]es through three phases:
//!
//! 1. **check** every process, stopping at the first failure
//! 2. **execute** every process, stopping at the first failure
//! 3. **revert** every process that executed, only when a phase failed
//!
//! The [`Procedure`] runner drives the phases, brackets the run with an
//! [`Environment`] and hands one of five terminal [`Outcome`]s to an
//! [`OutcomeReporter`]. Processes share a [`ProcedureContext`] that carries
//! the run's inputs, derived paths, arbitrary values and a return value.
//!
//! # Example
//!
//! ```
//! use procedure::{Process, ProcessError, Procedure, ProcedureContext, Step, ValueMap};
//!
//! struct Greet;
//!
//! impl Process for Greet {
//!     fn check(&mut self, _ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
//!         Ok(())
//!     }
//!
//!     fn execute(&mut self, ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
//!         ctx.set_return_value("hello");
//!         Ok(())
//!     }
//!
//!     fn revert(&mut self, _ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
//!         Ok(())
//!     }
//! }
//!
//! let context = ProcedureContext::new("", "greet", ValueMap::new());
//! let mut procedure = Procedure::new(vec![Step::new(Greet)], context);
//!
//! assert_eq!(procedure.launch(), Some("hello".into()));
//! ```

pub mod context;
pub mod environment;
pub mod error;
pub mod executor;
pub mod expander;
pub mod procedure;
pub mod process;
pub mod reporter;

#[cfg(test)]
mod testing;

pub use context::{ProcedureContext, Value, ValueMap};
pub use environment::{Environment, NoEnvironment};
pub use error::{Error, Phase, ProcessError, Result};
pub use executor::{Executor, ProcessExecutor, RevertOrder};
pub use expander::{DefaultExpander, Expander, HookPoint, Hooks};
pub use procedure::{Outcome, Procedure, RunState};
pub use process::{BoxedProcess, Process, Step, steps};
pub use reporter::{LogReporter, NoReport, OutcomeReporter};
