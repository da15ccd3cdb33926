//! Process trait and the has-run bookkeeping around it
//!
//! A process is one unit of work with three operations:
//! - `check`: validate preconditions (no external side effects)
//! - `execute`: perform the side effects
//! - `revert`: best-effort compensation of what `execute` did

use crate::context::ProcedureContext;
use crate::error::ProcessError;

/// Core trait for units of work
///
/// # Example
///
/// ```
/// use procedure::{Process, ProcessError, ProcedureContext};
///
/// struct Rename {
///     to: String,
/// }
///
/// impl Process for Rename {
///     fn check(&mut self, _ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
///         if self.to.contains(' ') {
///             return Err(ProcessError::check_failed([format!("'{}' contains spaces", self.to)]));
///         }
///         Ok(())
///     }
///
///     fn execute(&mut self, ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
///         ctx.set_path("name", self.to.clone());
///         Ok(())
///     }
///
///     fn revert(&mut self, _ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
///         Ok(())
///     }
/// }
/// ```
pub trait Process: Send {
    /// Name used in logs and error messages
    ///
    /// Defaults to the type name without its module path.
    fn name(&self) -> String {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full).to_string()
    }

    /// Validate preconditions against the current context
    ///
    /// Return `ProcessError::CheckFailed` with human-readable violations when
    /// the preconditions are not met.
    fn check(&mut self, ctx: &mut ProcedureContext) -> Result<(), ProcessError>;

    /// Perform the work
    fn execute(&mut self, ctx: &mut ProcedureContext) -> Result<(), ProcessError>;

    /// Compensate for a successful `execute`
    ///
    /// Only called when `execute` succeeded earlier in the same run. A no-op
    /// is fine when the side effect is harmless to leave behind.
    fn revert(&mut self, ctx: &mut ProcedureContext) -> Result<(), ProcessError>;
}

/// A boxed process for type-erased storage
pub type BoxedProcess = Box<dyn Process>;

/// A process plus its has-run flag
///
/// The flag starts false, is set by the executor right after a successful
/// `execute`, and is never reset. Only steps that have run are reverted, and
/// each of them at most once.
pub struct Step {
    process: BoxedProcess,
    has_run: bool,
    reverted: bool,
}

impl Step {
    pub fn new(process: impl Process + 'static) -> Self {
        Self::from_boxed(Box::new(process))
    }

    pub fn from_boxed(process: BoxedProcess) -> Self {
        Self {
            process,
            has_run: false,
            reverted: false,
        }
    }

    pub fn name(&self) -> String {
        self.process.name()
    }

    pub fn has_run(&self) -> bool {
        self.has_run
    }

    /// Record a successful execute
    ///
    /// Called by executors. The flag cannot be cleared.
    pub fn mark_run(&mut self) {
        self.has_run = true;
    }

    /// True once a revert has been attempted, whether it succeeded or not
    pub fn reverted(&self) -> bool {
        self.reverted
    }

    /// Record a revert attempt
    pub fn mark_reverted(&mut self) {
        self.reverted = true;
    }

    /// Has run and has not been reverted yet
    pub fn needs_revert(&self) -> bool {
        self.has_run && !self.reverted
    }

    pub fn process(&self) -> &dyn Process {
        self.process.as_ref()
    }

    pub fn process_mut(&mut self) -> &mut dyn Process {
        self.process.as_mut()
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name())
            .field("has_run", &self.has_run)
            .field("reverted", &self.reverted)
            .finish()
    }
}

impl From<BoxedProcess> for Step {
    fn from(process: BoxedProcess) -> Self {
        Self::from_boxed(process)
    }
}

/// Wrap a list of boxed processes into steps, preserving order
pub fn steps<I>(processes: I) -> Vec<Step>
where
    I: IntoIterator<Item = BoxedProcess>,
{
    processes.into_iter().map(Step::from_boxed).collect()
}
