use std::{
    io::{self, BufRead, Write},
    process::ExitCode,
    sync::Arc,
};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use spendlog::{
    cli,
    config::{CliArgs, Config, LoggingConfig},
    controller::ExpenseController,
    export_registry::ExporterRegistry,
    storage::open_storage,
};

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn prompt(question: &str) -> bool {
    eprint!("{} [y/N] ", question);
    let _ = io::stderr().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let config = Config::load(&args);
    init_tracing(&config.logging);

    let storage = match open_storage(&config.storage) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, path = %config.storage.path, "Failed to open expense store");
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let controller = ExpenseController::new(storage, Arc::new(ExporterRegistry::with_defaults()));

    match cli::execute(&controller, &config.report, args.command, &mut prompt) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            if !e.is_warning() {
                tracing::error!(error = %e, "Command failed");
            }
            eprintln!("{}", e.report());
            ExitCode::FAILURE
        }
    }
}
