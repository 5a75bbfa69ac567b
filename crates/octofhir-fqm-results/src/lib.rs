//! Execution result model for FQM result reporting
//!
//! This crate models the per-patient result bundle produced by an
//! external clinical-quality-measure execution engine: flat lists of
//! per-clause and per-statement outcomes keyed by node identifier, plus
//! population membership. It also provides the identifier index the
//! reporting pipelines join against, and a short-lived TTL cache for
//! callers that front the (expensive) external calculation.
//!
//! Everything here is read-only input: records are produced once by the
//! engine and consumed for the duration of one report-generation call.

pub mod cache;
pub mod index;
pub mod model;

pub use cache::TtlCache;
pub use index::ClauseResultIndex;
pub use model::*;
