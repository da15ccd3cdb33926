//! Test doubles shared by the engine's unit tests

use crate::context::ProcedureContext;
use crate::environment::Environment;
use crate::error::ProcessError;
use crate::expander::Expander;
use crate::reporter::OutcomeReporter;
use std::sync::{Arc, Mutex};

/// Ordered log of calls, shared between doubles
#[derive(Debug, Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    pub(crate) fn count(&self, entry: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == entry).count()
    }
}

/// Process whose outcome for each phase is scripted
pub(crate) struct Scripted {
    name: String,
    journal: Journal,
    check_violations: Option<Vec<String>>,
    check_error: bool,
    check_panic: bool,
    execute_error: bool,
    execute_panic: bool,
    revert_error: bool,
}

impl Scripted {
    pub(crate) fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            journal: journal.clone(),
            check_violations: None,
            check_error: false,
            check_panic: false,
            execute_error: false,
            execute_panic: false,
            revert_error: false,
        }
    }

    pub(crate) fn fail_check<I, S>(mut self, violations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check_violations = Some(violations.into_iter().map(Into::into).collect());
        self
    }

    pub(crate) fn error_on_check(mut self) -> Self {
        self.check_error = true;
        self
    }

    pub(crate) fn panic_on_check(mut self) -> Self {
        self.check_panic = true;
        self
    }

    pub(crate) fn fail_execute(mut self) -> Self {
        self.execute_error = true;
        self
    }

    pub(crate) fn panic_on_execute(mut self) -> Self {
        self.execute_panic = true;
        self
    }

    pub(crate) fn fail_revert(mut self) -> Self {
        self.revert_error = true;
        self
    }
}

impl crate::process::Process for Scripted {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn check(&mut self, _ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        self.journal.push(format!("{}.check", self.name));
        if self.check_panic {
            panic!("{} blew up during check", self.name);
        }
        if let Some(violations) = &self.check_violations {
            return Err(ProcessError::check_failed(violations.clone()));
        }
        if self.check_error {
            return Err(anyhow::anyhow!("{} could not read the scene", self.name).into());
        }
        Ok(())
    }

    fn execute(&mut self, ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        self.journal.push(format!("{}.execute", self.name));
        if self.execute_panic {
            panic!("{} blew up", self.name);
        }
        if self.execute_error {
            return Err(anyhow::anyhow!("{} failed to execute", self.name).into());
        }
        ctx.set(format!("{}.done", self.name), true);
        ctx.set_return_value(self.name.clone());
        Ok(())
    }

    fn revert(&mut self, _ctx: &mut ProcedureContext) -> Result<(), ProcessError> {
        self.journal.push(format!("{}.revert", self.name));
        if self.revert_error {
            return Err(anyhow::anyhow!("{} failed to revert", self.name).into());
        }
        Ok(())
    }
}

/// Expander that only records that it ran
pub(crate) fn recording_hook(journal: &Journal, label: &'static str) -> impl Expander + 'static {
    let journal = journal.clone();
    move |_ctx: &mut ProcedureContext| -> Result<(), ProcessError> {
        journal.push(label);
        Ok(())
    }
}

/// Expander that always fails
pub(crate) fn failing_hook(message: &'static str) -> impl Expander + 'static {
    move |_ctx: &mut ProcedureContext| -> Result<(), ProcessError> {
        Err(anyhow::anyhow!(message).into())
    }
}

/// Environment that records start/stop calls
pub(crate) struct RecordingEnvironment {
    journal: Journal,
    fail_start: bool,
    fail_stop: bool,
}

impl RecordingEnvironment {
    pub(crate) fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            fail_start: false,
            fail_stop: false,
        }
    }

    pub(crate) fn fail_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub(crate) fn fail_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }
}

impl Environment for RecordingEnvironment {
    fn start(&mut self) -> anyhow::Result<()> {
        self.journal.push("env.start");
        if self.fail_start {
            anyhow::bail!("host application did not start");
        }
        Ok(())
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        self.journal.push("env.stop");
        if self.fail_stop {
            anyhow::bail!("host application did not stop");
        }
        Ok(())
    }
}

/// A report received by [`RecordingReporter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Report {
    Success(String),
    Failure(String, String),
}

/// Reporter that keeps every report it receives
#[derive(Clone, Default)]
pub(crate) struct RecordingReporter(Arc<Mutex<Vec<Report>>>);

impl RecordingReporter {
    pub(crate) fn reports(&self) -> Vec<Report> {
        self.0.lock().unwrap().clone()
    }
}

impl OutcomeReporter for RecordingReporter {
    fn report_success(&mut self, run_name: &str) {
        self.0
            .lock()
            .unwrap()
            .push(Report::Success(run_name.to_string()));
    }

    fn report_failure(&mut self, run_name: &str, message: &str) {
        self.0
            .lock()
            .unwrap()
            .push(Report::Failure(run_name.to_string(), message.to_string()));
    }
}
