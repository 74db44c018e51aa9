// CLI module for opus-remux
//
// Command-line front end over the opus_remux library: argument parsing,
// command dispatch and report formatting.

pub mod commands;
pub mod config;
pub mod output;

pub use config::Config;
pub use output::OutputFormatter;
