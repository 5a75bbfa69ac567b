//! ELM (Expression Logical Model) input model for FQM result reporting
//!
//! This crate provides:
//! - ELM data structures for the subset of the HL7 ELM schema that the
//!   reporting pipelines traverse (libraries, statements, expressions,
//!   narrative annotations)
//! - Recovery of original CQL source text from narrative annotations
//! - Extraction of ELM JSON from a FHIR measure bundle
//!
//! The model is read-only: it is produced by an external calculation
//! engine and consumed for the duration of one report-generation call,
//! so the types implement `Deserialize` but are never re-serialized.

pub mod bundle;
pub mod model;
pub mod text;

pub use model::*;
