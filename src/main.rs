use clap::Parser;
use log::{debug, LevelFilter};
use std::process::ExitCode;

use kitfields::cli_app::{handle_command, Cli, Commands};
use kitfields::command_logic::init::init_config;
use kitfields::{ApiError, Config, ConvertkitApi};

fn init_logger(verbose: bool) -> Result<(), log::SetLoggerError> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init()
}

async fn run(cli: Cli) -> Result<String, ApiError> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    if let Commands::Init = cli.command {
        return init_config(stdin.lock(), stdout.lock());
    }
    let config = Config::load()?;
    debug!("[main] using API at {}", config.api_base_url);
    let api = ConvertkitApi::new(&config)?;
    handle_command(&cli.command, &api, stdin.lock(), stdout.lock()).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logger(cli.verbose) {
        eprintln!("Failed to initialize logger: {e}");
    }

    match run(cli).await {
        Ok(message) => {
            println!("{message}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
