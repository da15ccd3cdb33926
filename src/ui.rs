use colored::Colorize;
use procedure::OutcomeReporter;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Failure text: first line, then every other line indented under it
pub fn failure_text(run_name: &str, message: &str) -> String {
    let mut lines = message.lines();
    let mut text = format!(
        "Error while executing '{}': {}",
        run_name,
        lines.next().unwrap_or_default()
    );
    for line in lines {
        text.push_str("\n  ");
        text.push_str(line);
    }
    text
}

/// Reports run outcomes on the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalReporter;

impl OutcomeReporter for TerminalReporter {
    fn report_success(&mut self, run_name: &str) {
        success(&format!("End of {run_name}"));
    }

    fn report_failure(&mut self, run_name: &str, message: &str) {
        error(&failure_text(run_name, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_text_single_line() {
        assert_eq!(
            failure_text("Publish hero", "execution failed, successfully rolled back"),
            "Error while executing 'Publish hero': execution failed, successfully rolled back"
        );
    }

    #[test]
    fn test_failure_text_lists_violations() {
        assert_eq!(
            failure_text(
                "Publish hero",
                "checks invalid, execution not attempted\n- missing input 'source'"
            ),
            concat!(
                "Error while executing 'Publish hero': ",
                "checks invalid, execution not attempted\n",
                "  - missing input 'source'"
            )
        );
    }
}
