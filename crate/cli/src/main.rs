//! The interactive `kmsc` console: a REPL that drives a KMIP server
//! through the client crate.

use std::io::{BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use kmsc_client::ConfigurationSettings;
use tracing_subscriber::EnvFilter;

mod console;
mod parser;

use console::Console;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// An interactive Key Management System (KMS) tool for executing KMIP
/// commands. Run it, then type `help` to get started.
#[derive(Parser)]
#[command(name = "kmsc", version)]
struct Cli {
    /// Enable debug log level
    #[arg(short, long)]
    debug: bool,

    /// Configuration settings file
    #[arg(short, long)]
    config: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    println!("\n[] kmsc (version={VERSION})\n");

    // Restore any previously stored configuration settings
    let settings = match ConfigurationSettings::restore(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("ERROR: restoring kms configuration settings: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut console = Console::new(settings);
    let stdin = std::io::stdin();
    loop {
        print!("kms) ");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("ERROR: reading input: {e}");
                return ExitCode::FAILURE;
            }
        }
        let line = line.trim();
        if line == "exit" || line == "quit" {
            println!();
            break;
        }
        if !line.is_empty() {
            console.execute(line);
            println!();
        }
    }
    ExitCode::SUCCESS
}
