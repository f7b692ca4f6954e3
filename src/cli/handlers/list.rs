// src/cli/handlers/list.rs

use anyhow::Result;
use clap::Parser;

use super::commons;
use crate::models::GlobalOptions;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct ListArgs {
    /// Print each component's tags next to its name.
    #[arg(long)]
    tags: bool,
}

pub fn handle(args: Vec<String>, options: &GlobalOptions) -> Result<i32> {
    let list_args = ListArgs::try_parse_from(&args)?;
    let ws = commons::load_workspace(options)?;

    let names = match &options.tag {
        Some(tag) => ws.component_names_by_tag(tag),
        None => ws.component_names(),
    };

    for name in &names {
        if list_args.tags {
            let tags = &ws.component_by_name(name)?.definition.tags;
            println!("{} [{}]", name, tags.join(", "));
        } else {
            println!("{}", name);
        }
    }
    Ok(0)
}
