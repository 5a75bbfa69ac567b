//! `fqm tree` - annotated expression tree for one statement

use anyhow::{Context, Result};
use octofhir_fqm_report::tree::statement_view;
use std::path::PathBuf;

use crate::{input, output};

/// Configuration for the tree command
pub struct TreeConfig {
    pub file: PathBuf,
    pub statement: String,
    pub output_file: Option<PathBuf>,
    pub verbose: bool,
}

/// Render the annotated expression tree to stdout or a file
pub fn run(config: TreeConfig) -> Result<()> {
    let results = input::load_results(&config.file)?;
    input::print_data_quality_warnings(&results);

    if config.verbose {
        eprintln!(
            "building expression tree for statement `{}`",
            config.statement
        );
    }

    let view = statement_view(&results, &config.statement).with_context(|| {
        format!(
            "cannot build expression tree from {}",
            config.file.display()
        )
    })?;

    output::write_output(&view, config.output_file.as_deref())
}
