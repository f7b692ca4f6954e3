// src/cli/handlers/vars.rs

use anyhow::Result;
use clap::Parser;

use super::commons;
use crate::models::GlobalOptions;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct VarsArgs {
    /// Component to inspect; defaults to the one containing the current
    /// directory.
    component: Option<String>,
}

pub fn handle(args: Vec<String>, options: &GlobalOptions) -> Result<i32> {
    let vars_args = VarsArgs::try_parse_from(&args)?;
    let ws = commons::load_workspace(options)?;

    let positional: Vec<String> = vars_args.component.into_iter().collect();
    let component = commons::single_component(&ws, options, &positional)?;

    for line in component.vars() {
        println!("{}", line);
    }
    Ok(0)
}
