use anyhow::{Context, Result, bail};
use std::process::{Command, ExitStatus, Stdio};

/// Run a command and inherit stdio (shows output in real-time)
pub fn run(cmd: &str, args: &[String]) -> Result<ExitStatus> {
    log::debug!("Running: {} {}", cmd, args.join(" "));
    Command::new(cmd)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to execute: {} {}", cmd, args.join(" ")))
}

/// Run an argv (program first), failing on a non-zero exit
pub fn run_argv(argv: &[String]) -> Result<()> {
    let Some((program, args)) = argv.split_first() else {
        bail!("Empty command");
    };

    let status = run(program, args)?;
    if !status.success() {
        match status.code() {
            Some(code) => bail!("Command '{}' exited with status {}", argv.join(" "), code),
            None => bail!("Command '{}' was terminated by a signal", argv.join(" ")),
        }
    }
    Ok(())
}

/// Check if a command exists
///
/// Paths are checked directly; bare names are looked up on `PATH`.
pub fn command_exists(cmd: &str) -> bool {
    if cmd.contains(std::path::MAIN_SEPARATOR) {
        return std::path::Path::new(cmd).is_file();
    }

    Command::new("which")
        .arg(cmd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
