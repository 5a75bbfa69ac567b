//! FQM result reporting command-line interface

use clap::{Parser, Subcommand};
use octofhir_fqm_cli::{html, input, output, report, tree};
use std::path::PathBuf;

/// FQM result reporting tool
#[derive(Parser)]
#[command(name = "fqm")]
#[command(author, version, about = "FQM execution result reporting tools", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the annotated expression tree for a statement
    Tree {
        /// Results file from the execution engine
        file: Option<PathBuf>,

        /// Statement to render
        #[arg(short, long, default_value = "Initial Population")]
        statement: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate the markdown coverage report
    Report {
        /// Results file from the execution engine
        file: Option<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Normalize a coverage HTML blob into a standalone document
    Html {
        /// Input file (omit or use --stdin to read standard input)
        input: Option<PathBuf>,

        /// Read the blob from standard input
        #[arg(long)]
        stdin: bool,

        /// Output file (default: derived from the input name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);

    let result = match cli.command {
        Commands::Tree {
            file,
            statement,
            output,
        } => {
            let config = tree::TreeConfig {
                file: file.unwrap_or_else(|| PathBuf::from(input::DEFAULT_RESULTS_FILE)),
                statement,
                output_file: output,
                verbose: cli.verbose,
            };
            tree::run(config)
        }

        Commands::Report { file, output } => {
            let config = report::ReportConfig {
                file: file.unwrap_or_else(|| PathBuf::from(input::DEFAULT_RESULTS_FILE)),
                output_file: output.unwrap_or_else(|| PathBuf::from(report::DEFAULT_REPORT_FILE)),
                verbose: cli.verbose,
            };
            report::run(config)
        }

        Commands::Html {
            input,
            stdin,
            output,
        } => {
            let config = html::HtmlConfig {
                input,
                stdin,
                output_file: output,
                verbose: cli.verbose,
            };
            html::run(config)
        }
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
