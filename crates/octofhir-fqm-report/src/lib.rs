//! Correlation and rendering engine for FQM execution results
//!
//! This crate joins the typed expression tree of a measure against the
//! flat per-clause outcome tables by identifier and renders three
//! human-facing artifacts:
//! - an annotated expression tree as an indented outline ([`tree`])
//! - a structured markdown coverage report ([`markdown`])
//! - a normalized, themed HTML coverage document ([`html`])
//!
//! Every operation is a synchronous, pure transformation over in-memory
//! structures: indexes and trees are rebuilt per call from the supplied
//! inputs, so any number of report requests may run concurrently without
//! shared state.

pub mod explain;
pub mod html;
pub mod markdown;
pub mod tree;
pub mod value;

pub use html::{CoverageDocument, CoverageFormat, NormalizedCoverage, convert, normalize};
pub use markdown::MarkdownReportBuilder;
pub use tree::{ExpressionTreeBuilder, TreeNode, statement_view};
pub use value::format_raw_value;
