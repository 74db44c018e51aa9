// CLI command implementations
use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use opus_remux::{inspect_file, remux_file};

use crate::cli::config::{Commands, OutputFormat, PassArgs};
use crate::cli::output::{OutputFormatter, ProgressBar};

/// Dispatch a parsed subcommand
pub fn run(command: Commands, formatter: &OutputFormatter) -> Result<()> {
    match command {
        Commands::Remux {
            input,
            output,
            pass,
        } => command_remux(&input, &output, &pass, formatter),
        Commands::Batch {
            directory,
            pattern,
            output,
            pass,
        } => command_batch(&directory, &pattern, &output, &pass, formatter),
        Commands::Inspect { files } => command_inspect(&files, formatter),
    }
}

/// Transform a single file
fn command_remux(input: &Path, output: &Path, pass: &PassArgs, formatter: &OutputFormatter) -> Result<()> {
    if !input.exists() {
        bail!("File not found: {}", input.display());
    }

    let report = remux_file(input, output, pass.transform(), pass.options())
        .with_context(|| format!("Failed to remux {} into {}", input.display(), output.display()))?;

    formatter.output(&report, &mut io::stdout().lock())?;
    formatter.print_success(&format!(
        "{} -> {} ({} packets, transform: {})",
        input.display(),
        output.display(),
        report.audio_packets,
        pass.transform()
    ));
    Ok(())
}

/// Batch process directory
fn command_batch(
    directory: &Path,
    pattern: &str,
    output_dir: &Path,
    pass: &PassArgs,
    formatter: &OutputFormatter,
) -> Result<()> {
    use glob::glob;

    let glob_pattern = if pattern.contains('*') || pattern.contains('?') {
        format!("{}/{}", directory.display(), pattern)
    } else {
        format!("{}/**/{}", directory.display(), pattern)
    };

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in glob(&glob_pattern).with_context(|| format!("Invalid glob pattern: {}", glob_pattern))? {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    files.push(path);
                }
            }
            Err(e) => {
                formatter.print_error(&format!("Error reading path: {}", e));
            }
        }
    }

    if files.is_empty() {
        formatter.print_info("No files found matching pattern");
        return Ok(());
    }

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut progress = ProgressBar::new(files.len(), formatter.format() == OutputFormat::Pretty);
    let mut success_count = 0;
    let mut error_count = 0;

    for file in &files {
        let Some(name) = file.file_name() else {
            continue;
        };
        let target = output_dir.join(name);

        match remux_file(file, &target, pass.transform(), pass.options()) {
            Ok(report) => {
                tracing::debug!(file = %file.display(), packets = report.audio_packets, "Remuxed");
                success_count += 1;
            }
            Err(e) => {
                formatter.print_error(&format!("{}: {}", file.display(), e));
                error_count += 1;
            }
        }
        progress.increment(&file.display().to_string());
    }

    formatter.print_info(&format!(
        "Completed: {} successful, {} errors",
        success_count, error_count
    ));
    if error_count > 0 {
        bail!("{} of {} files failed", error_count, files.len());
    }
    Ok(())
}

/// List the pages of each file
fn command_inspect(files: &[PathBuf], formatter: &OutputFormatter) -> Result<()> {
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    for path in files {
        let report = inspect_file(path).with_context(|| format!("Failed to inspect {}", path.display()))?;

        match formatter.format() {
            OutputFormat::Pretty | OutputFormat::Json => formatter.output(&report, &mut writer)?,
            OutputFormat::KeyValue | OutputFormat::Table => {
                writeln!(writer, "{}", path.display())?;
                for page in &report.pages {
                    formatter.output(page, &mut writer)?;
                }
            }
        }

        formatter.print_info(&format!(
            "{}: {} pages, Opus streams: {:?}",
            path.display(),
            report.pages.len(),
            report.opus_streams
        ));
    }
    Ok(())
}
