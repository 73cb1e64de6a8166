//! Tabviz CLI - profile, clean and chart tabular data.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Profile {
            input,
            json,
            output,
            correlation,
        } => commands::profile::run(input, config, json, output, correlation, cli.verbose),

        Commands::Clean {
            input,
            output,
            policy,
            missing,
            fill_value,
            outliers,
            threshold,
            columns,
            bom,
        } => commands::clean::run(
            input,
            config,
            output,
            bom,
            commands::clean::PolicyArgs {
                file: policy,
                missing,
                fill_value,
                outliers,
                threshold,
                columns,
            },
        ),

        Commands::Chart {
            input,
            kind,
            spec,
            roles,
            style,
            output,
            dpi,
        } => commands::chart::run(input, config, kind, spec, roles, style, output, dpi),

        Commands::Grid {
            input,
            layout,
            columns,
            output,
            dpi,
        } => commands::grid::run(input, config, layout, columns, output, dpi),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
