// src/cli/handlers/stop.rs

// `stop` and `destroy` share their selection logic; they differ only in the
// compose verb issued per component.

use anyhow::Result;
use clap::Parser;

use super::commons;
use crate::models::GlobalOptions;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct StopArgs {
    /// Components to act on; defaults to the one containing the current
    /// directory.
    components: Vec<String>,

    /// Act on every component in the workspace.
    #[arg(long)]
    all: bool,
}

pub fn handle(args: Vec<String>, options: &GlobalOptions) -> Result<i32> {
    act_on_selection(args, options, false)
}

pub fn handle_destroy(args: Vec<String>, options: &GlobalOptions) -> Result<i32> {
    act_on_selection(args, options, true)
}

fn act_on_selection(args: Vec<String>, options: &GlobalOptions, destroy: bool) -> Result<i32> {
    let stop_args = StopArgs::try_parse_from(&args)?;
    let ws = commons::load_workspace(options)?;

    let names = if stop_args.all {
        ws.component_names()
    } else {
        commons::resolve_component_names(&ws, options, &stop_args.components)?
    };

    for name in &names {
        let component = ws.component_by_name(name)?;
        if destroy {
            component.destroy(&ws, options)?;
        } else {
            component.stop(&ws, options)?;
        }
    }
    Ok(0)
}
