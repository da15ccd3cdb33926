//! Outcome reporting
//!
//! The runner hands its terminal status to a reporter. Presentation lives
//! outside the engine: a terminal, a dialog, a log line.

/// Receives the terminal result of a run
pub trait OutcomeReporter: Send {
    fn report_success(&mut self, run_name: &str);

    fn report_failure(&mut self, run_name: &str, message: &str);
}

/// Reporter that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReport;

impl OutcomeReporter for NoReport {
    fn report_success(&mut self, _run_name: &str) {}

    fn report_failure(&mut self, _run_name: &str, _message: &str) {}
}

/// Reporter that writes outcomes to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl OutcomeReporter for LogReporter {
    fn report_success(&mut self, run_name: &str) {
        log::info!("End of {}", run_name);
    }

    fn report_failure(&mut self, run_name: &str, message: &str) {
        log::error!("Error while executing '{}': {}", run_name, message);
    }
}
