mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments, keeping the matches to see which values were defaulted
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose, cli.global.quiet);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli, &matches).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, quiet: bool) {
    let filter = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(mut cli: Cli, matches: &ArgMatches) -> Result<(), CliError> {
    let defaults = config::load_config_or_default().defaults;
    config::apply_display_defaults(&mut cli.global, matches, &defaults)?;

    match cli.command {
        // Config and registry commands don't need a device
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),
        Command::Actions => {
            commands::registry::actions(&cli.global);
            Ok(())
        }
        Command::Feedbacks => {
            commands::registry::feedbacks(&cli.global);
            Ok(())
        }
        Command::Variables => {
            commands::registry::variables(&cli.global);
            Ok(())
        }

        // Shell completions generation
        Command::Completions(args) => {
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "smclink", &mut std::io::stdout());
            Ok(())
        }

        // All other commands talk to the SMC
        cmd => {
            let controller_config = config::build_controller_config(&cli.global)?;
            tracing::debug!(command = ?cmd, address = %controller_config.target_address, "dispatching command");
            commands::dispatch(cmd, controller_config, &cli.global).await
        }
    }
}
