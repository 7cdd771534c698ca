mod cli;
mod commands;
mod config;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use medportal_auth::PermissionTable;

use cli::{CacheCommands, Cli, Commands, ConfigCommands, PermissionsCommands};
use output::print_error;

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            print_error(&format!("{e:#}"));
            std::process::exit(2);
        }
    }
}

/// Returns `false` when a check ran successfully but was denied.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    let config = config::loader::load_config(cli.config.as_deref())?;
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    observability::init_tracing_with_level(level);
    tracing::debug!(config = ?cli.config, "Configuration loaded");

    match &cli.command {
        Commands::Access(args) => {
            commands::access::run(&config, args, format)?;
        }
        Commands::Permissions(args) => {
            let table = PermissionTable::from_config(&config.auth)?;
            match &args.command {
                PermissionsCommands::List { role } => {
                    commands::permissions::list(&table, *role, format)?;
                }
                PermissionsCommands::Check(check_args) => {
                    return commands::permissions::check(&table, check_args, format);
                }
            }
        }
        Commands::Cache(args) => match &args.command {
            CacheCommands::Key { endpoint, params } => {
                commands::cache::key(endpoint, params.as_deref(), format)?;
            }
            CacheCommands::Ttls => {
                commands::cache::ttls(&config.cache, format)?;
            }
        },
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show => {
                if cli.config.is_none() {
                    eprintln!(
                        "{}",
                        "(no --config; defaults, env and ./medportal.toml if present)".dimmed()
                    );
                }
                output::print_json(&config)?;
            }
        },
    }

    Ok(true)
}
