//! Capready CLI - factory readiness and CapEx reporting.

use std::env;
use std::path::PathBuf;
use std::process;

use capready::analytics::CyclePolicy;
use capready::cli::{Cli, Commands, ConfigCommands};
use capready::commands::{self, Context, Output};
use capready::config::{ConfigOverrides, OutputFormat, resolve_config};
use capready::logging;
use clap::Parser;
use tracing::debug;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut human = cli.human_readable;

    // Determine root: --root flag > CR_ROOT env > cwd
    let root = resolve_root(cli.root.clone(), human);

    let result = overrides_for(&cli)
        .and_then(|overrides| resolve_config(&root, &overrides))
        .and_then(|config| {
            human = config.output_format() == OutputFormat::Human;
            debug!(root = %root.display(), data_dir = %config.data_dir().display(), "resolved config");
            let ctx = Context::new(&root, config, cli.filter.to_filter());
            run_command(cli.command, &ctx, human)
        });

    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

/// Resolve the project root.
///
/// An explicit path (via -C/--root or CR_ROOT) must exist and is used as-is.
fn resolve_root(explicit_path: Option<PathBuf>, human: bool) -> PathBuf {
    match explicit_path {
        Some(path) => {
            if !path.exists() {
                let message = format!("Specified root does not exist: {}", path.display());
                if human {
                    eprintln!("Error: {}", message);
                } else {
                    eprintln!("{}", serde_json::json!({ "error": message }));
                }
                process::exit(1);
            }
            path
        }
        None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// CLI flags that take part in config precedence.
fn overrides_for(cli: &Cli) -> capready::Result<ConfigOverrides> {
    let mut overrides = ConfigOverrides::new();
    if let Some(dir) = &cli.data_dir {
        overrides = overrides.with_data_dir(dir);
    }
    if cli.human_readable {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }
    match &cli.command {
        Commands::CriticalPath { strict: true } => {
            overrides = overrides.with_cycle_policy(CyclePolicy::Error);
        }
        Commands::Evidence { out: Some(dir) } => {
            overrides = overrides.with_evidence_dir(dir);
        }
        Commands::Blockers { limit: Some(0) } => {
            return Err(capready::Error::InvalidInput(
                "--limit must be at least 1".to_string(),
            ));
        }
        _ => {}
    }
    Ok(overrides)
}

fn run_command(command: Commands, ctx: &Context, human: bool) -> capready::Result<()> {
    match command {
        Commands::Readiness { at_risk } => {
            output(&commands::readiness(ctx, at_risk)?, human);
        }
        Commands::CriticalPath { .. } => {
            output(&commands::critical_path(ctx)?, human);
        }
        Commands::Expedite { top } => {
            output(&commands::expedite(ctx, top)?, human);
        }
        Commands::Capex { by, top } => {
            output(&commands::capex(ctx, by.into(), top)?, human);
        }
        Commands::Gates { by } => {
            output(&commands::gates(ctx, by.into())?, human);
        }
        Commands::Blockers { limit } => {
            output(&commands::blockers(ctx, limit)?, human);
        }
        Commands::Kpis => {
            output(&commands::kpis(ctx)?, human);
        }
        Commands::Evidence { .. } => {
            output(&commands::evidence(ctx)?, human);
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => output(&commands::config_show(ctx), human),
            ConfigCommands::Init { force } => {
                output(&commands::config_init(ctx, force)?, human);
            }
        },
    }

    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
