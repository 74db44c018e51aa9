// Output formatting for CLI

use anyhow::Result;
use serde::Serialize;
use std::io::Write;

use crate::cli::config::OutputFormat;

/// Format and output reports
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Output a serializable report
    pub fn output<T: Serialize>(&self, report: &T, writer: &mut impl Write) -> Result<()> {
        let value = serde_json::to_value(report)?;
        match self.format {
            OutputFormat::Pretty => {
                writeln!(writer, "{}", serde_json::to_string_pretty(&value)?)?;
            }
            OutputFormat::Json => {
                writeln!(writer, "{}", serde_json::to_string(&value)?)?;
            }
            OutputFormat::KeyValue => {
                self.output_key_value(&value, writer)?;
            }
            OutputFormat::Table => {
                self.output_table(&value, writer)?;
            }
        }
        Ok(())
    }

    /// Output as key-value pairs
    fn output_key_value(&self, value: &serde_json::Value, writer: &mut impl Write) -> Result<()> {
        if let Some(obj) = value.as_object() {
            let mut items: Vec<_> = obj.iter().collect();
            items.sort_by(|a, b| a.0.cmp(b.0));

            for (key, value) in items {
                writeln!(writer, "{}: {}", key, self.format_value(value))?;
            }
        }
        Ok(())
    }

    /// Output as table
    fn output_table(&self, value: &serde_json::Value, writer: &mut impl Write) -> Result<()> {
        if let Some(obj) = value.as_object() {
            let max_key_len = obj.keys().map(|k| k.len()).max().unwrap_or(0);

            writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;

            for (key, value) in obj {
                writeln!(writer, "{:<width$}: {}", format!("{}:", key), self.format_value(value), width = max_key_len + 2)?;
            }

            writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
        }
        Ok(())
    }

    /// Format a JSON value for display
    fn format_value(&self, value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => "(null)".to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Array(arr) => {
                if arr.iter().all(|v| !v.is_object() && !v.is_array()) {
                    let items: Vec<_> = arr.iter().map(|v| self.format_value(v)).collect();
                    format!("[{}]", items.join(", "))
                } else {
                    format!("[{} items]", arr.len())
                }
            }
            serde_json::Value::Object(obj) => {
                if obj.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{{} items}}", obj.len())
                }
            }
        }
    }

    /// Print success message
    pub fn print_success(&self, message: &str) {
        if !self.quiet {
            eprintln!("✓ {}", message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            eprintln!("  {}", message);
        }
    }
}

/// Progress indicator for batch operations
pub struct ProgressBar {
    total: usize,
    current: usize,
    show: bool,
}

impl ProgressBar {
    pub fn new(total: usize, show: bool) -> Self {
        Self {
            total,
            current: 0,
            show,
        }
    }

    pub fn increment(&mut self, label: &str) {
        self.current += 1;
        if self.show && self.total > 0 {
            let percent = (self.current * 100) / self.total;
            eprint!("\r[{}/{}] ({}%) {}", self.current, self.total, percent, label);
            if self.current == self.total {
                eprintln!();
            }
            std::io::stderr().flush().ok();
        }
    }
}
