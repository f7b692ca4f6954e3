// src/cli/handlers/clone.rs

use anyhow::Result;
use clap::Parser;

use super::commons;
use crate::models::GlobalOptions;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct CloneArgs {
    /// Components to clone.
    components: Vec<String>,

    /// Skip the after-clone hook.
    #[arg(long)]
    no_hook: bool,
}

pub fn handle(args: Vec<String>, options: &GlobalOptions) -> Result<i32> {
    let clone_args = CloneArgs::try_parse_from(&args)?;
    let ws = commons::load_workspace(options)?;
    let names = commons::resolve_component_names(&ws, options, &clone_args.components)?;

    for name in &names {
        ws.component_by_name(name)?
            .clone_repo(&ws, options, clone_args.no_hook)?;
    }
    Ok(0)
}
