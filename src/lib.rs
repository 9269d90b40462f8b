pub mod commands;
pub mod core;
pub mod providers;
pub mod reconcile;
pub mod security;
pub mod workflow;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::Cli;
use crate::core::config::log_filter_from_env;

fn init_tracing() {
    let filter = EnvFilter::try_new(log_filter_from_env()).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() -> std::process::ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start runtime: {err}");
            return std::process::ExitCode::FAILURE;
        }
    };

    match runtime.block_on(commands::dispatch(cli)) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} ({})", err, err.code());
            std::process::ExitCode::FAILURE
        }
    }
}
