//! Expanders: hooks invoked at phase boundaries
//!
//! An executor holds one expander per [`HookPoint`]. Any slot that is not
//! configured holds a [`DefaultExpander`], which leaves the context untouched.

use crate::context::ProcedureContext;
use crate::error::{Phase, ProcessError};
use std::fmt;

/// Hook invoked before or after a phase
///
/// Returning an error aborts the phase exactly like a failing process would.
/// Closures of the right shape implement this trait.
pub trait Expander: Send {
    fn extend(&mut self, ctx: &mut ProcedureContext) -> Result<(), ProcessError>;
}

impl<F> Expander for F
where
    F: FnMut(&mut ProcedureContext) -> Result<(), ProcessError> + Send,
{
    fn extend(&mut self, ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        (*self)(ctx)
    }
}

/// Identity expander
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExpander;

impl Expander for DefaultExpander {
    fn extend(&mut self, _ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        Ok(())
    }
}

/// Phase boundary at which an expander runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    BeforeCheck,
    AfterCheck,
    BeforeExecute,
    AfterExecute,
    BeforeRevert,
    AfterRevert,
}

impl HookPoint {
    pub const ALL: [HookPoint; 6] = [
        Self::BeforeCheck,
        Self::AfterCheck,
        Self::BeforeExecute,
        Self::AfterExecute,
        Self::BeforeRevert,
        Self::AfterRevert,
    ];

    /// Phase this hook point belongs to
    pub fn phase(&self) -> Phase {
        match self {
            Self::BeforeCheck | Self::AfterCheck => Phase::Check,
            Self::BeforeExecute | Self::AfterExecute => Phase::Execute,
            Self::BeforeRevert | Self::AfterRevert => Phase::Revert,
        }
    }

    /// Label used as the error origin when the hook fails
    pub fn label(&self) -> &'static str {
        match self {
            Self::BeforeCheck => "before-check hook",
            Self::AfterCheck => "after-check hook",
            Self::BeforeExecute => "before-execute hook",
            Self::AfterExecute => "after-execute hook",
            Self::BeforeRevert => "before-revert hook",
            Self::AfterRevert => "after-revert hook",
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The six expander slots of an executor
pub struct Hooks {
    before_check: Box<dyn Expander>,
    after_check: Box<dyn Expander>,
    before_execute: Box<dyn Expander>,
    after_execute: Box<dyn Expander>,
    before_revert: Box<dyn Expander>,
    after_revert: Box<dyn Expander>,
}

impl Hooks {
    /// All slots set to the identity expander
    pub fn new() -> Self {
        Self {
            before_check: Box::new(DefaultExpander),
            after_check: Box::new(DefaultExpander),
            before_execute: Box::new(DefaultExpander),
            after_execute: Box::new(DefaultExpander),
            before_revert: Box::new(DefaultExpander),
            after_revert: Box::new(DefaultExpander),
        }
    }

    /// Builder-style `set`
    pub fn with(mut self, point: HookPoint, expander: impl Expander + 'static) -> Self {
        self.set(point, expander);
        self
    }

    /// Replace the expander at a hook point
    pub fn set(&mut self, point: HookPoint, expander: impl Expander + 'static) {
        *self.slot(point) = Box::new(expander);
    }

    /// Run the expander at a hook point
    pub fn run(
        &mut self,
        point: HookPoint,
        ctx: &mut ProcedureContext,
    ) -> Result<(), ProcessError> {
        self.slot(point).extend(ctx)
    }

    fn slot(&mut self, point: HookPoint) -> &mut Box<dyn Expander> {
        match point {
            HookPoint::BeforeCheck => &mut self.before_check,
            HookPoint::AfterCheck => &mut self.after_check,
            HookPoint::BeforeExecute => &mut self.before_execute,
            HookPoint::AfterExecute => &mut self.after_execute,
            HookPoint::BeforeRevert => &mut self.before_revert,
            HookPoint::AfterRevert => &mut self.after_revert,
        }
    }
}

impl Default for Hooks {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}
