//! Result bundle loading shared by the commands

use anyhow::{Context, Result};
use octofhir_fqm_results::{ClauseResultIndex, ExecutionResults};
use std::fs;
use std::path::Path;

use crate::output;

/// Conventional location of the engine's result bundle
pub const DEFAULT_RESULTS_FILE: &str = "scratch/results.json";

/// Load and parse a result bundle
///
/// A missing file or unparseable JSON is terminal for CLI invocations.
pub fn load_results(path: &Path) -> Result<ExecutionResults> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("file not found or unreadable: {}", path.display()))?;
    ExecutionResults::from_json(&text)
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Surface data-quality warnings without failing the run
pub fn print_data_quality_warnings(results: &ExecutionResults) {
    if let Some(group) = results.first_group() {
        let index = ClauseResultIndex::new(&group.clause_results);
        for warning in index.warnings() {
            eprintln!("{}", output::format_warning(&warning.message));
        }
    }
}
