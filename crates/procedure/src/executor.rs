//! Executor - drives a list of steps through one phase
//!
//! Every process and hook call is guarded: errors are tagged with the name of
//! what failed and the phase, panics are caught and turned into
//! [`Error::Panicked`].

use crate::context::ProcedureContext;
use crate::error::{Error, Phase, ProcessError, Result};
use crate::expander::{Expander, HookPoint, Hooks};
use crate::process::Step;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};

/// Drives steps through the check, execute and revert phases
pub trait Executor: Send {
    /// Check every step in order, stopping at the first failure
    fn check_all(&mut self, steps: &mut [Step], ctx: &mut ProcedureContext) -> Result<()>;

    /// Execute every step in order, marking each one as run after it succeeds,
    /// stopping at the first failure
    fn execute_all(&mut self, steps: &mut [Step], ctx: &mut ProcedureContext) -> Result<()>;

    /// Revert every step that has run, attempting all of them even when some fail
    ///
    /// A step is reverted at most once, so a second sweep reverts nothing.
    fn revert_all(&mut self, steps: &mut [Step], ctx: &mut ProcedureContext) -> Result<()>;
}

/// Order in which steps that have run are reverted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevertOrder {
    /// Same order as execution
    #[default]
    Forward,
    /// Most recently executed first
    Reverse,
}

/// Default executor with expander hooks
#[derive(Debug, Default)]
pub struct ProcessExecutor {
    hooks: Hooks,
    revert_order: RevertOrder,
}

impl ProcessExecutor {
    /// Executor with identity hooks and forward revert order
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor with the given hooks
    pub fn with_hooks(hooks: Hooks) -> Self {
        Self {
            hooks,
            revert_order: RevertOrder::default(),
        }
    }

    /// Set one hook
    pub fn hook(mut self, point: HookPoint, expander: impl Expander + 'static) -> Self {
        self.hooks.set(point, expander);
        self
    }

    /// Set the revert order
    pub fn revert_order(mut self, order: RevertOrder) -> Self {
        self.revert_order = order;
        self
    }

    fn run_hook(&mut self, point: HookPoint, ctx: &mut ProcedureContext) -> Result<()> {
        let hooks = &mut self.hooks;
        guarded(point.label(), point.phase(), || hooks.run(point, ctx))
    }
}

impl Executor for ProcessExecutor {
    fn check_all(&mut self, steps: &mut [Step], ctx: &mut ProcedureContext) -> Result<()> {
        self.run_hook(HookPoint::BeforeCheck, ctx)?;

        for step in steps.iter_mut() {
            let name = step.name();
            log::debug!("Checking {}", name);
            guarded(&name, Phase::Check, || step.process_mut().check(ctx))?;
        }

        self.run_hook(HookPoint::AfterCheck, ctx)
    }

    fn execute_all(&mut self, steps: &mut [Step], ctx: &mut ProcedureContext) -> Result<()> {
        self.run_hook(HookPoint::BeforeExecute, ctx)?;

        for step in steps.iter_mut() {
            let name = step.name();
            log::debug!("Executing {}", name);
            guarded(&name, Phase::Execute, || step.process_mut().execute(ctx))?;
            step.mark_run();
        }

        self.run_hook(HookPoint::AfterExecute, ctx)
    }

    fn revert_all(&mut self, steps: &mut [Step], ctx: &mut ProcedureContext) -> Result<()> {
        let mut failures = Vec::new();

        if let Err(err) = self.run_hook(HookPoint::BeforeRevert, ctx) {
            log::warn!("{}", err);
            failures.push(err);
        }

        let order: Vec<usize> = match self.revert_order {
            RevertOrder::Forward => (0..steps.len()).collect(),
            RevertOrder::Reverse => (0..steps.len()).rev().collect(),
        };

        for index in order {
            let step = &mut steps[index];
            if !step.needs_revert() {
                continue;
            }

            let name = step.name();
            log::debug!("Reverting {}", name);
            let result = guarded(&name, Phase::Revert, || step.process_mut().revert(ctx));
            step.mark_reverted();
            if let Err(err) = result {
                log::warn!("{}", err);
                failures.push(err);
            }
        }

        if let Err(err) = self.run_hook(HookPoint::AfterRevert, ctx) {
            log::warn!("{}", err);
            failures.push(err);
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Revert { failures })
        }
    }
}

/// Run one process or hook call, converting errors and panics
fn guarded<F>(origin: &str, phase: Phase, call: F) -> Result<()>
where
    F: FnOnce() -> std::result::Result<(), ProcessError>,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(Error::from_process(origin, phase, err)),
        Err(payload) => Err(Error::panicked(origin, phase, payload.as_ref())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Journal, Scripted, failing_hook, recording_hook};

    fn ctx() -> ProcedureContext {
        ProcedureContext::new("assets~prop/chair", "test run", Default::default())
    }

    fn three(journal: &Journal) -> Vec<Step> {
        vec![
            Step::new(Scripted::new("P1", journal)),
            Step::new(Scripted::new("P2", journal)),
            Step::new(Scripted::new("P3", journal)),
        ]
    }

    fn has_run(steps: &[Step]) -> Vec<bool> {
        steps.iter().map(Step::has_run).collect()
    }

    #[test]
    fn test_check_all_passes_without_running_anything() {
        let journal = Journal::default();
        let mut steps = three(&journal);
        let mut context = ctx();

        ProcessExecutor::new()
            .check_all(&mut steps, &mut context)
            .unwrap();

        assert_eq!(journal.entries(), ["P1.check", "P2.check", "P3.check"]);
        assert_eq!(has_run(&steps), [false, false, false]);
    }

    #[test]
    fn test_check_all_short_circuits_and_keeps_violations() {
        let journal = Journal::default();
        let mut steps = vec![
            Step::new(Scripted::new("P1", &journal)),
            Step::new(Scripted::new("P2", &journal).fail_check(["bad name", "bad task"])),
            Step::new(Scripted::new("P3", &journal)),
        ];
        let mut context = ctx();

        let err = ProcessExecutor::new()
            .hook(HookPoint::AfterCheck, recording_hook(&journal, "after-check"))
            .check_all(&mut steps, &mut context)
            .unwrap_err();

        assert!(err.is_check_failed());
        assert_eq!(err.violations(), ["bad name", "bad task"]);
        assert_eq!(err.origin(), Some("P2"));
        assert_eq!(journal.entries(), ["P1.check", "P2.check"]);
    }

    #[test]
    fn test_check_all_unexpected_error_has_no_violations() {
        let journal = Journal::default();
        let mut steps = vec![Step::new(Scripted::new("P1", &journal).error_on_check())];

        let err = ProcessExecutor::new()
            .check_all(&mut steps, &mut ctx())
            .unwrap_err();

        assert!(matches!(err, Error::Unexpected { phase: Phase::Check, .. }));
        assert!(err.violations().is_empty());
    }

    #[test]
    fn test_execute_all_marks_steps_before_failure() {
        for failing in 0..3 {
            let journal = Journal::default();
            let mut steps: Vec<Step> = (0..3)
                .map(|i| {
                    let process = Scripted::new(&format!("P{}", i + 1), &journal);
                    Step::new(if i == failing { process.fail_execute() } else { process })
                })
                .collect();

            let result = ProcessExecutor::new().execute_all(&mut steps, &mut ctx());

            assert!(result.is_err());
            let expected: Vec<bool> = (0..3).map(|i| i < failing).collect();
            assert_eq!(has_run(&steps), expected, "failing index {failing}");
        }
    }

    #[test]
    fn test_execute_all_success_runs_hooks_in_order() {
        let journal = Journal::default();
        let mut steps = three(&journal);

        ProcessExecutor::new()
            .hook(HookPoint::BeforeExecute, recording_hook(&journal, "before-execute"))
            .hook(HookPoint::AfterExecute, recording_hook(&journal, "after-execute"))
            .execute_all(&mut steps, &mut ctx())
            .unwrap();

        assert_eq!(
            journal.entries(),
            [
                "before-execute",
                "P1.execute",
                "P2.execute",
                "P3.execute",
                "after-execute"
            ]
        );
        assert_eq!(has_run(&steps), [true, true, true]);
    }

    #[test]
    fn test_after_execute_skipped_on_failure() {
        let journal = Journal::default();
        let mut steps = vec![Step::new(Scripted::new("P1", &journal).fail_execute())];

        let _ = ProcessExecutor::new()
            .hook(HookPoint::AfterExecute, recording_hook(&journal, "after-execute"))
            .execute_all(&mut steps, &mut ctx());

        assert_eq!(journal.entries(), ["P1.execute"]);
    }

    #[test]
    fn test_panic_becomes_error_and_is_not_marked() {
        let journal = Journal::default();
        let mut steps = vec![
            Step::new(Scripted::new("P1", &journal)),
            Step::new(Scripted::new("P2", &journal).panic_on_execute()),
        ];

        let err = ProcessExecutor::new()
            .execute_all(&mut steps, &mut ctx())
            .unwrap_err();

        assert!(matches!(err, Error::Panicked { phase: Phase::Execute, .. }));
        assert_eq!(err.origin(), Some("P2"));
        assert_eq!(has_run(&steps), [true, false]);
    }

    #[test]
    fn test_revert_all_only_reverts_steps_that_ran() {
        let journal = Journal::default();
        let mut steps = vec![
            Step::new(Scripted::new("P1", &journal)),
            Step::new(Scripted::new("P2", &journal)),
            Step::new(Scripted::new("P3", &journal).fail_execute()),
        ];
        let mut context = ctx();
        let mut executor = ProcessExecutor::new();

        let _ = executor.execute_all(&mut steps, &mut context);
        journal.clear();

        executor.revert_all(&mut steps, &mut context).unwrap();
        assert_eq!(journal.entries(), ["P1.revert", "P2.revert"]);
    }

    #[test]
    fn test_revert_all_twice_is_safe() {
        let journal = Journal::default();
        let mut steps = vec![
            Step::new(Scripted::new("P1", &journal)),
            Step::new(Scripted::new("P2", &journal).fail_execute()),
        ];
        let mut context = ctx();
        let mut executor = ProcessExecutor::new();

        let _ = executor.execute_all(&mut steps, &mut context);
        executor.revert_all(&mut steps, &mut context).unwrap();
        assert_eq!(journal.count("P1.revert"), 1);
        journal.clear();

        executor.revert_all(&mut steps, &mut context).unwrap();

        assert!(
            !journal.entries().iter().any(|e| e.ends_with(".revert")),
            "second sweep reverted again: {:?}",
            journal.entries()
        );
        assert_eq!(has_run(&steps), [true, false]);
    }

    #[test]
    fn test_failed_revert_is_not_retried() {
        let journal = Journal::default();
        let mut steps = vec![Step::new(Scripted::new("P1", &journal).fail_revert())];
        let mut context = ctx();
        let mut executor = ProcessExecutor::new();

        executor.execute_all(&mut steps, &mut context).unwrap();
        assert!(executor.revert_all(&mut steps, &mut context).is_err());
        executor.revert_all(&mut steps, &mut context).unwrap();

        assert_eq!(journal.count("P1.revert"), 1);
        assert!(steps[0].has_run());
    }

    #[test]
    fn test_revert_all_continues_after_failure() {
        let journal = Journal::default();
        let mut steps = vec![
            Step::new(Scripted::new("P1", &journal).fail_revert()),
            Step::new(Scripted::new("P2", &journal)),
        ];
        let mut context = ctx();
        let mut executor = ProcessExecutor::new()
            .hook(HookPoint::AfterRevert, recording_hook(&journal, "after-revert"));

        executor.execute_all(&mut steps, &mut context).unwrap();
        journal.clear();

        let err = executor.revert_all(&mut steps, &mut context).unwrap_err();
        assert_eq!(err.revert_failures().len(), 1);
        assert_eq!(err.revert_failures()[0].origin(), Some("P1"));
        assert_eq!(journal.entries(), ["P1.revert", "P2.revert", "after-revert"]);
    }

    #[test]
    fn test_revert_all_reverse_order() {
        let journal = Journal::default();
        let mut steps = three(&journal);
        let mut context = ctx();
        let mut executor = ProcessExecutor::new().revert_order(RevertOrder::Reverse);

        executor.execute_all(&mut steps, &mut context).unwrap();
        journal.clear();

        executor.revert_all(&mut steps, &mut context).unwrap();
        assert_eq!(journal.entries(), ["P3.revert", "P2.revert", "P1.revert"]);
    }

    #[test]
    fn test_revert_all_with_nothing_run_only_runs_hooks() {
        let journal = Journal::default();
        let mut steps = three(&journal);

        ProcessExecutor::new()
            .hook(HookPoint::BeforeRevert, recording_hook(&journal, "before-revert"))
            .hook(HookPoint::AfterRevert, recording_hook(&journal, "after-revert"))
            .revert_all(&mut steps, &mut ctx())
            .unwrap();

        assert_eq!(journal.entries(), ["before-revert", "after-revert"]);
        assert_eq!(has_run(&steps), [false, false, false]);
    }

    #[test]
    fn test_failing_hook_aborts_phase() {
        let journal = Journal::default();
        let mut steps = three(&journal);

        let err = ProcessExecutor::new()
            .hook(HookPoint::BeforeCheck, failing_hook("no scene open"))
            .check_all(&mut steps, &mut ctx())
            .unwrap_err();

        assert_eq!(err.origin(), Some("before-check hook"));
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn test_failing_revert_hook_does_not_stop_sweep() {
        let journal = Journal::default();
        let mut steps = three(&journal);
        let mut context = ctx();
        let mut executor =
            ProcessExecutor::new().hook(HookPoint::BeforeRevert, failing_hook("lock lost"));

        executor.execute_all(&mut steps, &mut context).unwrap();
        journal.clear();

        let err = executor.revert_all(&mut steps, &mut context).unwrap_err();
        assert_eq!(err.revert_failures().len(), 1);
        assert_eq!(journal.entries(), ["P1.revert", "P2.revert", "P3.revert"]);
    }
}
