//! `fqm report` - markdown coverage report generation

use anyhow::{Context, Result};
use octofhir_fqm_report::MarkdownReportBuilder;
use std::fs;
use std::path::PathBuf;

use crate::{input, output};

/// Conventional location of the generated report
pub const DEFAULT_REPORT_FILE: &str = "scratch/results.md";

/// Configuration for the report command
pub struct ReportConfig {
    pub file: PathBuf,
    pub output_file: PathBuf,
    pub verbose: bool,
}

/// Generate the four-section markdown report and write it out
pub fn run(config: ReportConfig) -> Result<()> {
    let results = input::load_results(&config.file)?;
    input::print_data_quality_warnings(&results);

    if config.verbose {
        eprintln!("generating markdown report from {}", config.file.display());
    }

    let report = MarkdownReportBuilder::new(&results).render()?;

    if let Some(parent) = config.output_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(&config.output_file, &report).with_context(|| {
        format!(
            "Failed to write report to {}",
            config.output_file.display()
        )
    })?;

    eprintln!(
        "{}",
        output::format_success(&format!(
            "Report written to {} ({:.1} KB)",
            config.output_file.display(),
            report.len() as f64 / 1024.0
        ))
    );
    Ok(())
}
