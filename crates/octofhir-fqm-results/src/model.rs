//! Result bundle structures as emitted by the execution engine
//!
//! Field names mirror the engine's JSON (camelCase, `final` verdicts,
//! `localId` join keys). Raw computed values stay untyped
//! (`serde_json::Value`): a clause may evaluate to a boolean, a number,
//! a string, a list, or a structured clinical object, and the reporting
//! pipelines only ever format them for display.

use indexmap::IndexMap;
use octofhir_fqm_diagnostics::{ReportError, Result};
use octofhir_fqm_elm::LibraryDocument;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Final verdict of a clause or statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FinalResult {
    /// Not applicable to the current evaluation context
    #[default]
    Na,
    /// Never executed during calculation
    Unhit,
    /// Executed with a truthy outcome
    True,
    /// Executed with a falsy outcome
    False,
}

impl FinalResult {
    /// Display icon used across the report artifacts
    pub fn icon(&self) -> &'static str {
        match self {
            FinalResult::True => "✅",
            FinalResult::False => "❌",
            FinalResult::Unhit => "⚪",
            FinalResult::Na => "❓",
        }
    }
}

impl fmt::Display for FinalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FinalResult::Na => "NA",
            FinalResult::Unhit => "UNHIT",
            FinalResult::True => "TRUE",
            FinalResult::False => "FALSE",
        };
        f.write_str(text)
    }
}

/// Whether a statement is applicable to the current evaluation context
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Relevance {
    /// Inapplicable; excluded from reporting
    #[default]
    Na,
    True,
    False,
}

impl fmt::Display for Relevance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Relevance::Na => "NA",
            Relevance::True => "TRUE",
            Relevance::False => "FALSE",
        };
        f.write_str(text)
    }
}

/// Outcome of one evaluated clause, keyed by its node identifier
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClauseResult {
    /// Owning library name
    #[serde(default)]
    pub library_name: String,
    /// Owning statement name
    #[serde(default)]
    pub statement_name: String,
    /// Identifier correlating this record with an expression node
    #[serde(default)]
    pub local_id: String,
    /// Final verdict
    #[serde(rename = "final", default)]
    pub final_result: FinalResult,
    /// Raw computed value, untyped
    #[serde(default)]
    pub raw: Option<Value>,
}

/// Outcome of one statement definition
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementResult {
    /// Owning library name
    #[serde(default)]
    pub library_name: String,
    /// Statement name
    #[serde(default)]
    pub statement_name: String,
    /// Identifier of the statement's definition node
    #[serde(default)]
    pub local_id: Option<String>,
    /// Final verdict
    #[serde(rename = "final", default)]
    pub final_result: FinalResult,
    /// Whether the statement applies to the current context
    #[serde(default)]
    pub relevance: Relevance,
    /// Library-internal helper, excluded from reporting
    #[serde(default)]
    pub is_function: bool,
    /// Raw computed value, untyped
    #[serde(default)]
    pub raw: Option<Value>,
}

impl StatementResult {
    /// Whether the statement participates in reporting
    pub fn is_relevant(&self) -> bool {
        self.relevance != Relevance::Na && !self.is_function
    }
}

/// One defined cohort role (initial population, numerator, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum PopulationType {
    InitialPopulation,
    Denominator,
    Numerator,
    DenominatorExclusion,
    NumeratorExclusion,
    MeasurePopulation,
    /// Population kind outside the fixed enumeration, kept verbatim
    Other(String),
}

impl From<String> for PopulationType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "initial-population" => PopulationType::InitialPopulation,
            "denominator" => PopulationType::Denominator,
            "numerator" => PopulationType::Numerator,
            "denominator-exclusion" => PopulationType::DenominatorExclusion,
            "numerator-exclusion" => PopulationType::NumeratorExclusion,
            "measure-population" => PopulationType::MeasurePopulation,
            _ => PopulationType::Other(value),
        }
    }
}

impl PopulationType {
    /// Human display name; unknown kinds display their wire string
    pub fn display_name(&self) -> &str {
        match self {
            PopulationType::InitialPopulation => "Initial Population",
            PopulationType::Denominator => "Denominator",
            PopulationType::Numerator => "Numerator",
            PopulationType::DenominatorExclusion => "Denominator Exclusion",
            PopulationType::NumeratorExclusion => "Numerator Exclusion",
            PopulationType::MeasurePopulation => "Measure Population",
            PopulationType::Other(kind) => kind,
        }
    }
}

/// Membership outcome for one population
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationResult {
    /// Population kind
    pub population_type: PopulationType,
    /// Name of the statement whose outcome defines this population
    #[serde(default)]
    pub criteria_expression: Option<String>,
    /// Whether the patient belongs to the population
    #[serde(default)]
    pub result: bool,
}

/// One result group: the unit of correlation
///
/// Invariant: identifiers are unique within a group; a duplicate is a
/// data-quality issue the index surfaces, never a crash. An identifier
/// with no matching clause result renders as unannotated.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedResult {
    /// Measure group identifier
    #[serde(default)]
    pub group_id: String,
    /// Population membership outcomes
    #[serde(default)]
    pub population_results: Vec<PopulationResult>,
    /// Per-statement outcomes
    #[serde(default)]
    pub statement_results: Vec<StatementResult>,
    /// Per-clause outcomes
    #[serde(default)]
    pub clause_results: Vec<ClauseResult>,
}

impl DetailedResult {
    /// Find a statement result by name
    pub fn statement(&self, name: &str) -> Option<&StatementResult> {
        self.statement_results
            .iter()
            .find(|s| s.statement_name == name)
    }

    /// Whether any population includes the patient
    pub fn is_included(&self) -> bool {
        self.population_results.iter().any(|p| p.result)
    }
}

/// Results for one patient across measure groups
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientResult {
    /// Patient identifier
    #[serde(default)]
    pub patient_id: String,
    /// One entry per measure group
    #[serde(default)]
    pub detailed_results: Vec<DetailedResult>,
}

/// Complete engine response: per-patient results plus the ELM the
/// measure was compiled from and the pre-rendered coverage fragments
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResults {
    /// Per-patient results
    #[serde(default)]
    pub results: Vec<PatientResult>,
    /// ELM of the main library (older response shape)
    #[serde(default)]
    pub elm_definition: Option<LibraryDocument>,
    /// ELM of the main library
    #[serde(default)]
    pub elm_definitions: Option<LibraryDocument>,
    /// Pre-rendered coverage HTML per group, in engine order
    #[serde(default, rename = "coverageHTML")]
    pub coverage_html: Option<IndexMap<String, String>>,
}

impl ExecutionResults {
    /// Parse an engine response from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(ReportError::malformed)
    }

    /// The ELM library document, whichever response field carries it
    pub fn elm(&self) -> Option<&LibraryDocument> {
        self.elm_definitions.as_ref().or(self.elm_definition.as_ref())
    }

    /// First patient result
    pub fn first_patient(&self) -> Option<&PatientResult> {
        self.results.first()
    }

    /// First detailed result of the first patient
    pub fn first_group(&self) -> Option<&DetailedResult> {
        self.first_patient()?.detailed_results.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn verdicts_deserialize_from_wire_strings() {
        let clause: ClauseResult = serde_json::from_value(json!({
            "libraryName": "PreventiveCare",
            "statementName": "Initial Population",
            "localId": "18",
            "final": "UNHIT"
        }))
        .unwrap();
        assert_eq!(clause.final_result, FinalResult::Unhit);
        assert_eq!(clause.final_result.to_string(), "UNHIT");
        assert!(clause.raw.is_none());
    }

    #[test]
    fn unknown_population_type_displays_verbatim() {
        let population: PopulationResult = serde_json::from_value(json!({
            "populationType": "measure-observation",
            "criteriaExpression": "Measure Observation",
            "result": false
        }))
        .unwrap();
        assert_eq!(
            population.population_type,
            PopulationType::Other("measure-observation".to_string())
        );
        assert_eq!(population.population_type.display_name(), "measure-observation");
    }

    #[test]
    fn known_population_types_map_to_display_names() {
        for (wire, display) in [
            ("initial-population", "Initial Population"),
            ("denominator", "Denominator"),
            ("numerator", "Numerator"),
            ("denominator-exclusion", "Denominator Exclusion"),
            ("numerator-exclusion", "Numerator Exclusion"),
            ("measure-population", "Measure Population"),
        ] {
            let kind = PopulationType::from(wire.to_string());
            assert_eq!(kind.display_name(), display);
        }
    }

    #[test]
    fn statement_relevance_excludes_functions_and_na() {
        let stmt: StatementResult = serde_json::from_value(json!({
            "libraryName": "Lib",
            "statementName": "Helper",
            "final": "NA",
            "relevance": "TRUE",
            "isFunction": true
        }))
        .unwrap();
        assert!(!stmt.is_relevant());
    }

    #[test]
    fn elm_definitions_takes_precedence() {
        let results = ExecutionResults::from_json(
            &json!({
                "results": [],
                "elmDefinition": {"library": {"identifier": {"id": "OldShape"}}},
                "elmDefinitions": {"library": {"identifier": {"id": "NewShape"}}}
            })
            .to_string(),
        )
        .unwrap();

        assert_eq!(results.elm().unwrap().library_id(), Some("NewShape"));
    }

    #[test]
    fn malformed_json_is_a_terminal_error() {
        let err = ExecutionResults::from_json("not json").unwrap_err();
        assert!(matches!(
            err,
            octofhir_fqm_diagnostics::ReportError::Malformed(_)
        ));
    }

    #[test]
    fn coverage_html_preserves_group_order() {
        let results = ExecutionResults::from_json(
            &json!({
                "results": [],
                "coverageHTML": {"zeta": "<div>z</div>", "alpha": "<div>a</div>"}
            })
            .to_string(),
        )
        .unwrap();

        let coverage = results.coverage_html.unwrap();
        let first = coverage.iter().next().unwrap();
        assert_eq!(first.0, "zeta");
    }
}
