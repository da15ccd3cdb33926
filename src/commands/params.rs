use anyhow::Result;

use super::load_params;
use crate::Context;
use crate::cli::ParamsCommand;
use crate::params::display;
use crate::ui;

pub fn run(ctx: &Context, cmd: ParamsCommand) -> Result<()> {
    match cmd {
        ParamsCommand::Get { key, params } => {
            let loaded = load_params(params.as_deref())?;
            println!("{}", display(loaded.get(&key)?));
            Ok(())
        }
        ParamsCommand::List { params } => {
            let loaded = load_params(params.as_deref())?;

            ui::header("Parameters");
            for (key, value) in loaded.flatten() {
                ui::kv(&key, &display(value));
            }

            if !ctx.quiet {
                println!();
                if loaded.sources().is_empty() {
                    ui::dim("Built-in defaults only");
                } else {
                    for source in loaded.sources() {
                        ui::dim(&format!("from {}", source.display()));
                    }
                }
            }
            Ok(())
        }
    }
}
