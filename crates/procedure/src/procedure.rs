//! Procedure runner - the top-level check/execute/revert state machine
//!
//! ```text
//! INIT -> CHECKING -> CHECK_FAILED ---------------------> REVERTING
//!                  -> CHECKED -> EXECUTING -> EXECUTE_FAILED -^
//!                                          -> EXECUTED -------------> END
//! REVERTING -> REVERTED / REVERT_FAILED -> END
//! ```
//!
//! Every failure is turned into one of five terminal [`Outcome`]s and handed
//! to the reporter. `launch` never returns an error.

use crate::context::{ProcedureContext, Value};
use crate::environment::{Environment, EnvironmentGuard, NoEnvironment};
use crate::error::{Error, Phase};
use crate::executor::{Executor, ProcessExecutor};
use crate::process::Step;
use crate::reporter::OutcomeReporter;
use std::fmt;

pub const SUCCESS_MESSAGE: &str = "success";
pub const CHECKS_INVALID_MESSAGE: &str = "checks invalid, execution not attempted";
pub const CHECKS_INVALID_REVERT_FAILED_MESSAGE: &str = "checks invalid and revert failed";
pub const EXECUTION_ROLLED_BACK_MESSAGE: &str = "execution failed, successfully rolled back";
pub const EXECUTION_ROLLBACK_FAILED_MESSAGE: &str = "execution failed and rollback failed";

/// State of a procedure run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    Init,
    Checking,
    CheckFailed,
    Checked,
    Executing,
    ExecuteFailed,
    Executed,
    Reverting,
    RevertFailed,
    Reverted,
    End,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "INIT",
            Self::Checking => "CHECKING",
            Self::CheckFailed => "CHECK_FAILED",
            Self::Checked => "CHECKED",
            Self::Executing => "EXECUTING",
            Self::ExecuteFailed => "EXECUTE_FAILED",
            Self::Executed => "EXECUTED",
            Self::Reverting => "REVERTING",
            Self::RevertFailed => "REVERT_FAILED",
            Self::Reverted => "REVERTED",
            Self::End => "END",
        };
        f.write_str(s)
    }
}

/// Terminal status of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every check and every execute succeeded
    Success,
    /// A check failed, nothing was executed
    ChecksInvalid { violations: Vec<String> },
    /// A check failed and the revert sweep failed too
    ChecksInvalidRevertFailed,
    /// An execute failed and every step that ran was reverted
    ExecutionRolledBack,
    /// An execute failed and at least one revert failed
    ExecutionRollbackFailed,
}

impl Outcome {
    /// Map the failed phase and the revert result to an outcome
    ///
    /// `failed` is `None` when no phase failed, in which case the revert
    /// result is irrelevant.
    pub fn resolve(failed: Option<Phase>, violations: Vec<String>, revert_failed: bool) -> Self {
        match (failed, revert_failed) {
            (None, _) => Self::Success,
            (Some(Phase::Check), false) => Self::ChecksInvalid { violations },
            (Some(Phase::Check), true) => Self::ChecksInvalidRevertFailed,
            (Some(_), false) => Self::ExecutionRolledBack,
            (Some(_), true) => Self::ExecutionRollbackFailed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Human-readable status
    ///
    /// Check violations are appended one per line.
    pub fn message(&self) -> String {
        match self {
            Self::Success => SUCCESS_MESSAGE.to_string(),
            Self::ChecksInvalid { violations } if violations.is_empty() => {
                CHECKS_INVALID_MESSAGE.to_string()
            }
            Self::ChecksInvalid { violations } => {
                format!("{}\n- {}", CHECKS_INVALID_MESSAGE, violations.join("\n- "))
            }
            Self::ChecksInvalidRevertFailed => CHECKS_INVALID_REVERT_FAILED_MESSAGE.to_string(),
            Self::ExecutionRolledBack => EXECUTION_ROLLED_BACK_MESSAGE.to_string(),
            Self::ExecutionRollbackFailed => EXECUTION_ROLLBACK_FAILED_MESSAGE.to_string(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Current state plus every state entered so far
#[derive(Debug, Clone)]
struct Transitions {
    current: RunState,
    history: Vec<RunState>,
}

impl Transitions {
    fn new() -> Self {
        Self {
            current: RunState::Init,
            history: vec![RunState::Init],
        }
    }

    fn enter(&mut self, next: RunState) {
        log::debug!("{} -> {}", self.current, next);
        self.current = next;
        self.history.push(next);
    }
}

/// Runs an ordered list of processes through check, execute and revert
///
/// # Example
///
/// ```
/// use procedure::{Procedure, ProcedureContext, ValueMap};
///
/// let context = ProcedureContext::new("assets~prop/chair", "empty run", ValueMap::new());
/// let mut procedure = Procedure::new(Vec::new(), context);
///
/// let returned = procedure.launch();
/// assert!(returned.is_none());
/// assert!(procedure.outcome().unwrap().is_success());
/// ```
pub struct Procedure {
    steps: Vec<Step>,
    context: ProcedureContext,
    executor: Box<dyn Executor>,
    environment: Box<dyn Environment>,
    reporter: Option<Box<dyn OutcomeReporter>>,
    transitions: Transitions,
    failures: Vec<Error>,
    outcome: Option<Outcome>,
}

impl Procedure {
    /// Procedure with the default executor, no environment and no reporter
    pub fn new(steps: Vec<Step>, context: ProcedureContext) -> Self {
        Self {
            steps,
            context,
            executor: Box::new(ProcessExecutor::new()),
            environment: Box::new(NoEnvironment),
            reporter: None,
            transitions: Transitions::new(),
            failures: Vec::new(),
            outcome: None,
        }
    }

    pub fn with_executor(mut self, executor: impl Executor + 'static) -> Self {
        self.executor = Box::new(executor);
        self
    }

    pub fn with_environment(mut self, environment: impl Environment + 'static) -> Self {
        self.environment = Box::new(environment);
        self
    }

    pub fn with_reporter(mut self, reporter: impl OutcomeReporter + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    /// Run the procedure and return the context's return value
    ///
    /// Success or failure is reported to the reporter and available through
    /// [`Procedure::outcome`]; the return value is handed back either way.
    /// A procedure runs at most once; later calls only return the value again.
    pub fn launch(&mut self) -> Option<Value> {
        if self.transitions.current != RunState::Init {
            log::warn!(
                "Procedure '{}' already launched, not running it again",
                self.context.name()
            );
            return self.context.return_value().cloned();
        }

        let Self {
            steps,
            context,
            executor,
            environment,
            reporter,
            transitions,
            failures,
            outcome,
        } = self;

        log::info!("Launching '{}' ({} processes)", context.name(), steps.len());

        let (mut guard, started) = EnvironmentGuard::start(environment.as_mut());
        transitions.enter(RunState::Checking);

        let checked = match started {
            Ok(()) => executor.check_all(steps, context),
            Err(err) => Err(Error::unexpected("environment", Phase::Check, err)),
        };

        let mut failed = None;
        let mut violations = Vec::new();

        match checked {
            Ok(()) => {
                transitions.enter(RunState::Checked);
                transitions.enter(RunState::Executing);

                match executor.execute_all(steps, context) {
                    Ok(()) => transitions.enter(RunState::Executed),
                    Err(err) => {
                        log::error!("Exception occurred while executing the procedure: {}", err);
                        transitions.enter(RunState::ExecuteFailed);
                        failed = Some(Phase::Execute);
                        failures.push(err);
                    }
                }
            }
            Err(err) => {
                if err.is_check_failed() {
                    log::warn!("{}", err);
                    violations = err.violations().to_vec();
                } else {
                    log::error!("Exception occurred while checking before execution: {}", err);
                }
                transitions.enter(RunState::CheckFailed);
                failed = Some(Phase::Check);
                failures.push(err);
            }
        }

        let mut revert_failed = false;
        if failed.is_some() {
            transitions.enter(RunState::Reverting);
            match executor.revert_all(steps, context) {
                Ok(()) => transitions.enter(RunState::Reverted),
                Err(err) => {
                    log::error!("Exception occurred while reverting the procedure: {}", err);
                    transitions.enter(RunState::RevertFailed);
                    revert_failed = true;
                    failures.push(err);
                }
            }
        }

        guard.stop();
        transitions.enter(RunState::End);

        let result = Outcome::resolve(failed, violations, revert_failed);
        if let Some(reporter) = reporter.as_mut() {
            if result.is_success() {
                reporter.report_success(context.name());
            } else {
                reporter.report_failure(context.name(), &result.message());
            }
        }
        log::info!("'{}' finished: {}", context.name(), result);
        *outcome = Some(result);

        context.return_value().cloned()
    }

    /// Terminal status, once launched
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Current state
    pub fn state(&self) -> RunState {
        self.transitions.current
    }

    /// Every state entered, starting with `Init`
    pub fn history(&self) -> &[RunState] {
        &self.transitions.history
    }

    /// Errors recorded during the run (phase failure, then revert failure)
    pub fn failures(&self) -> &[Error] {
        &self.failures
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn context(&self) -> &ProcedureContext {
        &self.context
    }

    /// Consume the procedure and return its context
    pub fn into_context(self) -> ProcedureContext {
        self.context
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Procedure")
            .field("name", &self.context.name())
            .field("steps", &self.steps)
            .field("state", &self.transitions.current)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}
