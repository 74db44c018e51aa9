// CLI configuration
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use opus_remux::{ChecksumMode, RemuxOptions, TransformKind};

/// opus-remux - Ogg Opus packet transform tool
#[derive(Parser, Debug)]
#[command(name = "opus-remux")]
#[command(about = "Transforms the audio packets of an Ogg Opus file and rebuilds the container", long_about = None)]
#[command(version)]
pub struct Config {
    /// Output format for reports
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (log every page)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Pretty,
    /// Compact JSON
    Json,
    /// Key-value pairs
    KeyValue,
    /// Table format
    Table,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transform one file
    Remux {
        /// Input Ogg Opus file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        pass: PassArgs,
    },

    /// Transform every file matching a pattern in a directory
    Batch {
        /// Directory path
        #[arg(short, long)]
        directory: PathBuf,

        /// File pattern (e.g., "*.opus")
        #[arg(short, long, default_value = "*.opus")]
        pattern: String,

        /// Directory receiving the rebuilt files
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        pass: PassArgs,
    },

    /// List the pages of Ogg file(s)
    Inspect {
        /// Ogg file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
}

/// Options shared by every transforming command
#[derive(Args, Debug, Clone)]
pub struct PassArgs {
    /// Packet transform
    #[arg(short, long, value_enum, default_value = "complement")]
    pub transform: TransformKind,

    /// Checksum written into rebuilt pages
    #[arg(long, value_enum, default_value = "recompute")]
    pub checksum: ChecksumArg,

    /// Warn about input pages with a wrong checksum
    #[arg(long)]
    pub verify_crc: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChecksumArg {
    /// Compute the Ogg CRC of every rebuilt page
    Recompute,
    /// Write 0 (legacy output)
    Zero,
}

impl PassArgs {
    pub fn transform(&self) -> TransformKind {
        self.transform
    }

    pub fn options(&self) -> RemuxOptions {
        RemuxOptions {
            checksum: match self.checksum {
                ChecksumArg::Recompute => ChecksumMode::Recompute,
                ChecksumArg::Zero => ChecksumMode::Zero,
            },
            verify_input_crc: self.verify_crc,
        }
    }
}

impl Config {
    /// Default log filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "opus_remux=debug"
        } else if self.quiet {
            "opus_remux=error"
        } else {
            "opus_remux=warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_remux_with_defaults() {
        let config = Config::parse_from(["opus-remux", "remux", "in.opus", "-o", "out.opus"]);
        match config.command {
            Commands::Remux { input, output, pass } => {
                assert_eq!(input, PathBuf::from("in.opus"));
                assert_eq!(output, PathBuf::from("out.opus"));
                assert_eq!(pass.transform(), TransformKind::Complement);
                assert_eq!(pass.options(), RemuxOptions::default());
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(config.format, OutputFormat::Pretty);
    }

    #[test]
    fn parses_legacy_checksum_and_global_flags() {
        let config = Config::parse_from([
            "opus-remux",
            "batch",
            "-d",
            "voices",
            "-o",
            "out",
            "--checksum",
            "zero",
            "--transform",
            "identity",
            "--format",
            "json",
            "-v",
        ]);
        assert!(config.verbose);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.log_filter(), "opus_remux=debug");
        let Commands::Batch { pattern, pass, .. } = config.command else {
            panic!("expected batch");
        };
        assert_eq!(pattern, "*.opus");
        assert_eq!(pass.options().checksum, ChecksumMode::Zero);
        assert_eq!(pass.transform(), TransformKind::Identity);
    }
}
