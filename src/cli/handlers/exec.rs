// src/cli/handlers/exec.rs

// `exec` runs inside the long-lived service container (starting it first);
// `run` uses a one-off container. Both build the same user/tty arguments.

use anyhow::Result;
use clap::Parser;

use super::commons;
use crate::core::component::Activation;
use crate::models::GlobalOptions;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct ExecArgs {
    /// Run as this uid instead of the context USER_ID/GROUP_ID.
    #[arg(long)]
    uid: Option<u32>,

    /// Working directory inside the container.
    #[arg(long, value_name = "DIR")]
    workdir: Option<String>,

    /// Never allocate a TTY.
    #[arg(long)]
    no_tty: bool,

    /// Dependency activation mode for the implicit start.
    #[arg(long)]
    mode: Option<String>,

    /// The command to run inside the service container.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    command: Vec<String>,
}

pub fn handle(args: Vec<String>, options: &GlobalOptions) -> Result<i32> {
    run_in_container(args, options, false)
}

pub fn handle_run(args: Vec<String>, options: &GlobalOptions) -> Result<i32> {
    run_in_container(args, options, true)
}

fn run_in_container(args: Vec<String>, options: &GlobalOptions, one_off: bool) -> Result<i32> {
    let exec_args = ExecArgs::try_parse_from(&args)?;

    let mut options = options.clone();
    options.uid = exec_args.uid;
    options.working_dir = exec_args.workdir;
    options.no_tty = exec_args.no_tty;
    if let Some(mode) = exec_args.mode {
        options.mode = mode;
    }

    let ws = commons::load_workspace(&options)?;
    let component = commons::single_component(&ws, &options, &[])?;
    let target = ws.host_component(component)?;

    // Hosted components carry the directory their code occupies inside the
    // host container.
    if options.working_dir.is_none() {
        if let Some(exec_path) = &component.definition.exec_path {
            options.working_dir = Some(component.context.render(exec_path)?);
        }
    }

    let code = if one_off {
        target.run(&ws, &exec_args.command, &options)?
    } else {
        target.exec(&ws, &exec_args.command, &options, &mut Activation::new())?
    };
    Ok(code)
}
