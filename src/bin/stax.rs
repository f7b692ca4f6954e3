// src/bin/stax.rs

use anyhow::{Result, bail};
use clap::Parser;
use colored::Colorize;

use stax::cli::{Cli, handlers};
use stax::models::GlobalOptions;

/// Defines a command, its aliases, and its handler. The handler signature is
/// kept uniform across all commands so the registry stays declarative.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &GlobalOptions) -> Result<i32>,
}

/// The single source of truth for all commands. Adding a command means
/// adding one entry here.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "start",
        aliases: &[],
        handler: handlers::start::handle,
    },
    CommandDefinition {
        name: "stop",
        aliases: &[],
        handler: handlers::stop::handle,
    },
    CommandDefinition {
        name: "destroy",
        aliases: &["down"],
        handler: handlers::stop::handle_destroy,
    },
    CommandDefinition {
        name: "restart",
        aliases: &[],
        handler: handlers::restart::handle,
    },
    CommandDefinition {
        name: "exec",
        aliases: &[],
        handler: handlers::exec::handle,
    },
    CommandDefinition {
        name: "run",
        aliases: &[],
        handler: handlers::exec::handle_run,
    },
    CommandDefinition {
        name: "compose",
        aliases: &[],
        handler: handlers::compose::handle,
    },
    CommandDefinition {
        name: "wrap",
        aliases: &[],
        handler: handlers::wrap::handle,
    },
    CommandDefinition {
        name: "vars",
        aliases: &[],
        handler: handlers::vars::handle,
    },
    CommandDefinition {
        name: "clone",
        aliases: &[],
        handler: handlers::clone::handle,
    },
    CommandDefinition {
        name: "list",
        aliases: &["ls"],
        handler: handlers::list::handle,
    },
];

fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

fn main() {
    env_logger::init();

    match run_cli(Cli::parse()) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("\n{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Routes the invocation: the first free argument selects the command; an
/// unknown first argument is a shortcut for `exec` inside the component
/// containing the current directory.
fn run_cli(cli: Cli) -> Result<i32> {
    log::debug!("CLI args parsed: {:?}", cli);

    let options = handlers::commons::global_options(&cli);
    let mut args = cli.args;
    if args.is_empty() {
        bail!("no command given; try 'stax list' or 'stax start'");
    }
    let action = args.remove(0);

    match find_command(&action) {
        Some(command) => (command.handler)(args, &options),
        None => {
            let mut exec_args = vec![action];
            exec_args.extend(args);
            handlers::exec::handle(exec_args, &options)
        }
    }
}
