// CLI binary entry point for opus-remux

mod cli;

use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

use cli::{commands, Config, OutputFormatter};

fn main() {
    let config = Config::parse();

    // Respect RUST_LOG if set, otherwise derive the level from the flags
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_filter().to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .init();

    let formatter = OutputFormatter::new(config.format, config.quiet);
    if let Err(e) = commands::run(config.command, &formatter) {
        formatter.print_error(&format!("{:#}", e));
        process::exit(1);
    }
}
