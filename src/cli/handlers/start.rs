// src/cli/handlers/start.rs

use anyhow::Result;
use clap::Parser;

use super::commons;
use crate::core::component::Activation;
use crate::models::GlobalOptions;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct StartArgs {
    /// Components to start; defaults to the one containing the current
    /// directory.
    components: Vec<String>,

    /// Dependency activation mode.
    #[arg(long)]
    mode: Option<String>,

    /// Re-activate dependencies even when the component is already running.
    #[arg(long)]
    force: bool,
}

pub fn handle(args: Vec<String>, options: &GlobalOptions) -> Result<i32> {
    let start_args = StartArgs::try_parse_from(&args)?;

    let mut options = options.clone();
    if let Some(mode) = start_args.mode {
        options.mode = mode;
    }
    options.force = start_args.force;

    let ws = commons::load_workspace(&options)?;
    let names = commons::resolve_component_names(&ws, &options, &start_args.components)?;

    // One activation per invocation, shared across the selection, so a
    // dependency common to several selected components comes up once.
    let mut activation = Activation::new();
    for name in &names {
        ws.component_by_name(name)?.start(&ws, &options, &mut activation)?;
    }
    Ok(0)
}
