//! spidriver - Client for serial-to-SPI bridge gadgets
//!
//! One-shot commands open the port, run the connection test, do their work
//! and exit. The `shell` command keeps a connection open for interactive use.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let result = match cli.command {
        Commands::Status { port } => commands::status::run_status(&port),
        Commands::Set {
            port,
            output,
            state,
        } => commands::output::run_set(&port, &output, state),
        Commands::Read {
            port,
            count,
            output,
        } => commands::transfer::run_read(&port, count, output.as_deref()),
        Commands::Write { port, input } => commands::transfer::run_write(&port, &input),
        Commands::Transfer { port, data } => commands::transfer::run_transfer(&port, &data),
        #[cfg(feature = "shell")]
        Commands::Shell { port, timeout_ms } => {
            commands::shell::cmd_shell(port.as_deref(), commands::timeout(timeout_ms))
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
