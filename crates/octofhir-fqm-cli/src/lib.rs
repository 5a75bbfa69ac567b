//! CLI functionality for the `fqm` tool
//!
//! This crate contains the command implementations:
//! - Expression tree rendering
//! - Markdown report generation
//! - Coverage HTML normalization
//! - Input loading and output formatting

pub mod html;
pub mod input;
pub mod output;
pub mod report;
pub mod tree;
