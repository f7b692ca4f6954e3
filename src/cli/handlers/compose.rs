// src/cli/handlers/compose.rs

use anyhow::Result;
use clap::Parser;

use super::commons;
use crate::models::GlobalOptions;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct ComposeArgs {
    /// The compose subcommand to pass through.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    args: Vec<String>,
}

pub fn handle(args: Vec<String>, options: &GlobalOptions) -> Result<i32> {
    let compose_args = ComposeArgs::try_parse_from(&args)?;
    let ws = commons::load_workspace(options)?;
    let component = commons::single_component(&ws, options, &[])?;
    Ok(component.compose(&ws, &compose_args.args, options)?)
}
