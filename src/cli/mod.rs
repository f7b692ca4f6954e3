// src/cli/mod.rs

use clap::Parser;
use std::path::PathBuf;

pub mod handlers;

/// stax: manages the containerized components of a developer workspace.
///
/// Global flags come before the command; everything after the command name is
/// handed to that command's own parser.
#[derive(Parser, Debug)]
#[command(author, version, about, disable_help_subcommand = true)]
pub struct Cli {
    /// Workspace root; overrides STAX_WORKSPACE and the upward search.
    #[arg(short = 'w', long, value_name = "PATH")]
    pub workspace: Option<PathBuf>,

    /// Component to act on; overrides detection from the current directory.
    #[arg(short = 'c', long, value_name = "NAME")]
    pub component: Option<String>,

    /// Act on every component carrying this tag.
    #[arg(long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Echo every external command before running it.
    #[arg(long)]
    pub debug: bool,

    /// Compute commands without executing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// The command and its arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
