//! FQM reporting error types

use thiserror::Error;

/// Main error type for report generation
///
/// Only "required input missing or unreadable" conditions live here.
/// Recoverable conditions (unmatched identifiers, missing source text,
/// unrecognized coverage formats) are resolved locally by the components
/// and never surface as errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// The result bundle carries no patient results or detailed results
    #[error("result bundle contains no detailed results")]
    NoResults,

    /// A named statement does not exist in the result group
    #[error("statement `{0}` not found")]
    StatementNotFound(String),

    /// A statement exists but its ELM definition could not be located
    #[error("ELM definition not found for `{0}`")]
    DefinitionNotFound(String),

    /// The result bundle carries no ELM library at all
    #[error("no ELM library available in the result bundle")]
    ElmUnavailable,

    /// Input is not parseable structured data
    #[error("malformed input: {0}")]
    Malformed(String),

    /// A FHIR measure bundle has no Library resource to extract ELM from
    #[error("no Library resource found in measure bundle")]
    NoLibraryResource,

    /// A Library resource has no `application/elm+json` attachment
    #[error("library `{0}` has no ELM (application/elm+json) content")]
    NoElmContent(String),

    /// An ELM attachment could not be decoded or parsed
    #[error("ELM content could not be decoded: {0}")]
    ElmDecode(String),
}

impl ReportError {
    /// Create a malformed-input error from any parse failure
    pub fn malformed(source: impl std::fmt::Display) -> Self {
        Self::Malformed(source.to_string())
    }
}
