// src/cli/handlers/wrap.rs

use anyhow::Result;
use clap::Parser;

use super::commons;
use crate::models::GlobalOptions;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct WrapArgs {
    /// The host command to run with the component's environment.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    command: Vec<String>,
}

pub fn handle(args: Vec<String>, options: &GlobalOptions) -> Result<i32> {
    let wrap_args = WrapArgs::try_parse_from(&args)?;
    let ws = commons::load_workspace(options)?;
    let component = commons::single_component(&ws, options, &[])?;
    let target = ws.host_component(component)?;
    Ok(target.wrap(&ws, &wrap_args.command, options)?)
}
