//! FQM reporting diagnostics and error handling
//!
//! This crate provides the error handling infrastructure for the FQM
//! reporting crates: the error taxonomy for report generation and the
//! diagnostic type used to surface recoverable data-quality findings.

mod diagnostic;
mod error;

pub use diagnostic::*;
pub use error::*;

/// Result type for FQM reporting operations
pub type Result<T> = std::result::Result<T, ReportError>;
