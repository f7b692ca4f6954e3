// src/cli/handlers/restart.rs

use anyhow::Result;
use clap::Parser;

use super::commons;
use crate::core::component::Activation;
use crate::models::GlobalOptions;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct RestartArgs {
    /// Components to restart; defaults to the one containing the current
    /// directory.
    components: Vec<String>,

    /// Remove the containers instead of stopping them before starting again.
    #[arg(long)]
    hard: bool,
}

pub fn handle(args: Vec<String>, options: &GlobalOptions) -> Result<i32> {
    let restart_args = RestartArgs::try_parse_from(&args)?;
    let ws = commons::load_workspace(options)?;
    let names = commons::resolve_component_names(&ws, options, &restart_args.components)?;

    let mut activation = Activation::new();
    for name in &names {
        ws.component_by_name(name)?
            .restart(&ws, restart_args.hard, options, &mut activation)?;
    }
    Ok(0)
}
