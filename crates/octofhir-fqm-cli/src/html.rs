//! `fqm html` - coverage HTML normalization

use anyhow::{Context, Result};
use octofhir_fqm_report::html::convert;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::output;

/// Output name when reading from standard input
pub const DEFAULT_HTML_FILE: &str = "coverage-analysis.html";

/// Configuration for the html command
pub struct HtmlConfig {
    pub input: Option<PathBuf>,
    pub stdin: bool,
    pub output_file: Option<PathBuf>,
    pub verbose: bool,
}

/// Normalize a coverage blob and write the standalone document
pub fn run(config: HtmlConfig) -> Result<()> {
    let (content, default_output) = match (&config.input, config.stdin) {
        (Some(path), false) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("file not found or unreadable: {}", path.display()))?;
            (content, derived_output_name(path))
        }
        _ => {
            let content = io::read_to_string(io::stdin()).context("failed to read stdin")?;
            (content, PathBuf::from(DEFAULT_HTML_FILE))
        }
    };

    if config.verbose {
        eprintln!("analyzing {} bytes of input", content.len());
    }

    let document = convert(&content);
    output::print_diagnostics(&document.diagnostics);

    eprintln!("detected input format: {}", document.format);
    if let Some(percent) = &document.coverage_percent {
        eprintln!("clause coverage: {percent}%");
    }

    let output_file = config.output_file.unwrap_or(default_output);
    fs::write(&output_file, &document.html)
        .with_context(|| format!("Failed to write {}", output_file.display()))?;

    eprintln!(
        "{}",
        output::format_success(&format!(
            "Coverage document written to {} ({:.1} KB)",
            output_file.display(),
            document.html.len() as f64 / 1024.0
        ))
    );
    Ok(())
}

/// `input.txt` becomes `input-coverage.html` next to it
fn derived_output_name(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("coverage");
    input.with_file_name(format!("{stem}-coverage.html"))
}
