use anyhow::{Result, bail};
use procedure::Executor;

use super::{Prepared, prepare};
use crate::Context;
use crate::cli::RunArgs;
use crate::ui;

/// Run the check phase only: no environment, nothing executed, nothing reverted
pub fn run(ctx: &Context, args: RunArgs) -> Result<()> {
    let Prepared {
        manifest,
        params,
        mut context,
    } = prepare(&args)?;

    let mut steps = manifest.steps(&params);
    let mut executor = manifest.executor();

    match executor.check_all(&mut steps, &mut context) {
        Ok(()) => {
            if args.json {
                println!("{}", serde_json::json!({ "name": context.name(), "violations": [] }));
            } else if !ctx.quiet {
                ui::success(&format!(
                    "All {} checks passed for {}",
                    steps.len(),
                    context.name()
                ));
            }
            Ok(())
        }
        Err(err) => {
            if args.json {
                let violations = if err.is_check_failed() {
                    err.violations().to_vec()
                } else {
                    vec![err.to_string()]
                };
                println!(
                    "{}",
                    serde_json::json!({ "name": context.name(), "violations": violations })
                );
            } else if err.is_check_failed() {
                ui::header(&format!("Checks failed for {}", context.name()));
                for violation in err.violations() {
                    ui::error(violation);
                }
            } else {
                ui::error(&err.to_string());
            }
            bail!("Checks did not pass for '{}'", context.name())
        }
    }
}
