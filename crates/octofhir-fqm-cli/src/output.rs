//! Output formatting utilities

use anyhow::{Context, Result};
use colored::Colorize;
use octofhir_fqm_diagnostics::{Diagnostic, Severity};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => {
            // Auto-detect based on terminal
            if std::env::var("TERM").is_ok() {
                colored::control::set_override(true);
            } else {
                colored::control::set_override(false);
            }
        }
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {error:#}", "Error:".red().bold())
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {warning}", "Warning:".yellow().bold())
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {message}", "Success:".green().bold())
}

/// Print diagnostics returned alongside an artifact to stderr
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let line = match diagnostic.severity {
            Severity::Error => format!("{} {}", "Error:".red().bold(), diagnostic.message),
            Severity::Warning => format_warning(&diagnostic.message),
            Severity::Info => format!("{} {}", "Info:".cyan().bold(), diagnostic.message),
        };
        eprintln!("{line}");
    }
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!(
            "{}",
            format_success(&format!("Output written to {}", path.display()))
        );
    } else {
        println!("{content}");
    }
    Ok(())
}
