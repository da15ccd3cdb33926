use anyhow::{Result, bail};
use procedure::{LogReporter, Procedure, Value, ValueMap};
use serde::Serialize;

use super::{Prepared, prepare};
use crate::Context;
use crate::cli::RunArgs;
use crate::template::value_text;
use crate::ui::{self, TerminalReporter};

/// Machine-readable result of `procflow run --json`
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    name: &'a str,
    success: bool,
    status: String,
    return_value: Option<&'a Value>,
    path_context: &'a ValueMap,
}

pub fn run(ctx: &Context, args: RunArgs) -> Result<()> {
    let Prepared {
        manifest,
        params,
        context,
    } = prepare(&args)?;

    if !ctx.quiet && !args.json {
        ui::header(&format!("Running {}", context.name()));
        if !context.argument().is_empty() {
            ui::kv("Argument", context.argument());
        }
        ui::kv("Processes", &manifest.processes.len().to_string());
        println!();
    }

    let mut procedure = if args.json {
        manifest.procedure(context, &params, LogReporter)
    } else {
        manifest.procedure(context, &params, TerminalReporter)
    };
    let returned = procedure.launch();

    if args.json {
        print_json(&procedure)?;
    } else if let Some(value) = &returned {
        ui::kv("Result", &value_text(value));
    }

    match procedure.outcome() {
        Some(outcome) if outcome.is_success() => Ok(()),
        _ => bail!("Procedure '{}' did not succeed", procedure.context().name()),
    }
}

fn print_json(procedure: &Procedure) -> Result<()> {
    let context = procedure.context();
    let report = RunReport {
        name: context.name(),
        success: procedure.outcome().is_some_and(|o| o.is_success()),
        status: procedure
            .outcome()
            .map(|o| o.message())
            .unwrap_or_default(),
        return_value: context.return_value(),
        path_context: context.path_context(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
