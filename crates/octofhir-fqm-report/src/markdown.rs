//! Markdown coverage report generation
//!
//! Aggregates one result group into a four-section report: executive
//! summary, population analysis, statement-by-statement analysis, and
//! the complete coverage listing. Sections are generated independently
//! and concatenated; emoji and heading conventions are literal content.

use chrono::{DateTime, SecondsFormat, Utc};
use octofhir_fqm_diagnostics::{ReportError, Result};
use octofhir_fqm_elm::{ExpressionDef, text};
use octofhir_fqm_results::{
    ClauseResult, DetailedResult, ExecutionResults, FinalResult, PopulationResult, StatementResult,
};

use crate::value::format_raw_value;

/// Builds the markdown coverage report for one result bundle
pub struct MarkdownReportBuilder<'a> {
    results: &'a ExecutionResults,
}

impl<'a> MarkdownReportBuilder<'a> {
    pub fn new(results: &'a ExecutionResults) -> Self {
        Self { results }
    }

    /// Render the report stamped with the current time
    pub fn render(&self) -> Result<String> {
        self.render_at(Utc::now())
    }

    /// Render the report with an explicit generation timestamp
    pub fn render_at(&self, generated: DateTime<Utc>) -> Result<String> {
        let patient = self.results.first_patient().ok_or(ReportError::NoResults)?;
        let group = patient
            .detailed_results
            .first()
            .ok_or(ReportError::NoResults)?;

        let timestamp = generated.to_rfc3339_opts(SecondsFormat::Millis, true);
        let executive = self.executive_summary(group);
        let population = self.population_analysis(group);
        let statements = self.statement_analysis(group);
        let coverage = self.coverage_details(group);

        Ok(format!(
            "# 🔍 CQL Execution Analysis Report\n\
             \n\
             **Generated**: {timestamp}  \n\
             **Patient**: `{patient_id}`  \n\
             **Group**: {group_id}\n\
             \n\
             ---\n\
             \n\
             {executive}\n\
             \n\
             ---\n\
             \n\
             {population}\n\
             \n\
             ---\n\
             \n\
             {statements}\n\
             \n\
             ---\n\
             \n\
             {coverage}\n\
             \n\
             ---\n\
             \n\
             *Report generated from FQM execution results*\n",
            patient_id = patient.patient_id,
            group_id = group.group_id,
        ))
    }

    fn executive_summary(&self, group: &DetailedResult) -> String {
        let stats = OverallStats::for_group(group);
        let included = if group.is_included() {
            "✅ INCLUDED"
        } else {
            "❌ EXCLUDED"
        };

        format!(
            "## 📊 Executive Summary\n\
             \n\
             | Metric | Value |\n\
             |--------|-------|\n\
             | **Clause Results** | ✅ {true_count} true, ❌ {false_count} false, ⚪ {unhit_count} unhit |\n\
             | **Coverage Percentage** | {coverage}% ({true_count}/{total} clauses) |\n\
             | **Population Result** | {included} |\n\
             | **Statements Evaluated** | {evaluated} |\n\
             | **Functions Skipped** | {skipped} |",
            true_count = stats.hit_true,
            false_count = stats.hit_false,
            unhit_count = stats.unhit,
            coverage = stats.coverage_percentage,
            total = stats.total,
            evaluated = stats.evaluated,
            skipped = stats.skipped,
        )
    }

    fn population_analysis(&self, group: &DetailedResult) -> String {
        if group.population_results.is_empty() {
            return "## 🎯 Population Analysis\n\n*No population results available*".to_string();
        }

        let rows: Vec<String> = group
            .population_results
            .iter()
            .map(|population| {
                let related = related_population_clauses(group, population);
                let coverage = VerdictCounts::for_clauses(&related);
                let coverage_display = if related.is_empty() {
                    "No data".to_string()
                } else {
                    format!(
                        "✅{} ❌{} ⚪{}",
                        coverage.hit_true, coverage.hit_false, coverage.unhit
                    )
                };
                let result = if population.result {
                    "✅ TRUE"
                } else {
                    "❌ FALSE"
                };

                format!(
                    "| {} | {} | {} | {} |",
                    population.population_type.display_name(),
                    result,
                    coverage_display,
                    population_reason(population, &related),
                )
            })
            .collect();

        format!(
            "## 🎯 Population Analysis\n\
             \n\
             | Population | Result | Clause Results | Reason |\n\
             |------------|--------|----------------|---------|\n\
             {}",
            rows.join("\n")
        )
    }

    fn statement_analysis(&self, group: &DetailedResult) -> String {
        if group.statement_results.is_empty() {
            return "## 📋 Statement-by-Statement Analysis\n\n*No statement results available*"
                .to_string();
        }

        let relevant: Vec<&StatementResult> = group
            .statement_results
            .iter()
            .filter(|statement| statement.is_relevant())
            .collect();

        if relevant.is_empty() {
            return "## 📋 Statement-by-Statement Analysis\n\n*No relevant statements found*"
                .to_string();
        }

        let sections: Vec<String> = relevant
            .iter()
            .map(|statement| {
                format!(
                    "### {icon} {name}\n\
                     **Library**: {library}  \n\
                     **Result**: {verdict} (`{raw}`)  \n\
                     **Relevance**: {relevance}\n\
                     \n\
                     {breakdown}",
                    icon = statement.final_result.icon(),
                    name = statement.statement_name,
                    library = statement.library_name,
                    verdict = statement.final_result,
                    raw = format_raw_value(statement.raw.as_ref()),
                    relevance = statement.relevance,
                    breakdown = self.clause_breakdown(group, statement),
                )
            })
            .collect();

        format!(
            "## 📋 Statement-by-Statement Analysis\n\n{}",
            sections.join("\n\n")
        )
    }

    fn clause_breakdown(&self, group: &DetailedResult, statement: &StatementResult) -> String {
        let clauses: Vec<&ClauseResult> = group
            .clause_results
            .iter()
            .filter(|clause| {
                clause.statement_name == statement.statement_name
                    && clause.library_name == statement.library_name
            })
            .collect();

        if clauses.is_empty() {
            return "*No clause details available*".to_string();
        }

        let counts = VerdictCounts::for_clauses(&clauses);
        let def = self.statement_def(&statement.library_name, &statement.statement_name);

        let lines: Vec<String> = clauses
            .iter()
            .map(|clause| {
                let context = self
                    .clause_source_text(clause)
                    .map(|cql| format!("\"{cql}\""))
                    .unwrap_or_else(|| clause.statement_name.clone());
                format!(
                    "- {} `{}`: {} → {} (`{}`)",
                    clause.final_result.icon(),
                    clause.local_id,
                    context,
                    clause.final_result,
                    format_raw_value(clause.raw.as_ref()),
                )
            })
            .collect();

        let definition = def
            .and_then(statement_definition_text)
            .map(|cql| format!("\n\n**CQL Definition:**\n```cql\n{cql}\n```"))
            .unwrap_or_default();

        format!(
            "**Clause Breakdown** ({} true, {} false, {} unhit):\n{}{}",
            counts.hit_true,
            counts.hit_false,
            counts.unhit,
            lines.join("\n"),
            definition,
        )
    }

    fn coverage_details(&self, group: &DetailedResult) -> String {
        if group.clause_results.is_empty() {
            return "## 🔍 Coverage Details\n\n*No clause results available*".to_string();
        }

        let by_verdict = |verdict: FinalResult| -> Vec<&ClauseResult> {
            group
                .clause_results
                .iter()
                .filter(|clause| clause.final_result == verdict)
                .collect()
        };

        let hit_true = by_verdict(FinalResult::True);
        let hit_false = by_verdict(FinalResult::False);
        let unhit = by_verdict(FinalResult::Unhit);

        // Complete lists, no truncation.
        format!(
            "## 🔍 Coverage Details\n\
             \n\
             ### ✅ HIT/True Clauses ({})\n\
             {}\n\
             \n\
             ### ❌ HIT/False Clauses ({})\n\
             {}\n\
             \n\
             ### ⚪ UNHIT Clauses ({})\n\
             {}",
            hit_true.len(),
            self.coverage_list(&hit_true, true),
            hit_false.len(),
            self.coverage_list(&hit_false, true),
            unhit.len(),
            self.coverage_list(&unhit, false),
        )
    }

    fn coverage_list(&self, clauses: &[&ClauseResult], with_value: bool) -> String {
        if clauses.is_empty() {
            return "_(None)_".to_string();
        }

        clauses
            .iter()
            .map(|clause| {
                let description = self
                    .clause_source_text(clause)
                    .map(|cql| format!("\"{cql}\""))
                    .unwrap_or_else(|| {
                        if clause.statement_name.is_empty() {
                            "Unknown Statement".to_string()
                        } else {
                            clause.statement_name.clone()
                        }
                    });
                if with_value {
                    format!(
                        "- `{}`: {} → `{}`",
                        clause.local_id,
                        description,
                        format_raw_value(clause.raw.as_ref())
                    )
                } else {
                    format!("- `{}`: {}", clause.local_id, description)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn statement_def(&self, library_name: &str, statement_name: &str) -> Option<&'a ExpressionDef> {
        self.results
            .elm()?
            .statement_for(library_name, statement_name)
    }

    fn clause_source_text(&self, clause: &ClauseResult) -> Option<String> {
        let def = self.statement_def(&clause.library_name, &clause.statement_name)?;
        text::clause_text(def.narrative()?, &clause.local_id)
    }
}

fn statement_definition_text(def: &ExpressionDef) -> Option<String> {
    text::statement_text(def.annotation.as_deref().unwrap_or_default())
}

/// Group-wide verdict partition used by the executive summary
struct OverallStats {
    total: usize,
    hit_true: usize,
    hit_false: usize,
    unhit: usize,
    coverage_percentage: u32,
    evaluated: usize,
    skipped: usize,
}

impl OverallStats {
    fn for_group(group: &DetailedResult) -> Self {
        let counts = VerdictCounts::for_clauses(&group.clause_results.iter().collect::<Vec<_>>());
        let total = group.clause_results.len();
        let coverage_percentage = if total > 0 {
            ((counts.hit_true as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };
        let evaluated = group
            .statement_results
            .iter()
            .filter(|statement| statement.is_relevant())
            .count();
        let skipped = group.statement_results.len() - evaluated;

        Self {
            total,
            hit_true: counts.hit_true,
            hit_false: counts.hit_false,
            unhit: counts.unhit,
            coverage_percentage,
            evaluated,
            skipped,
        }
    }
}

/// TRUE/FALSE/UNHIT partition of a clause list (`NA` stays outside)
struct VerdictCounts {
    hit_true: usize,
    hit_false: usize,
    unhit: usize,
}

impl VerdictCounts {
    fn for_clauses(clauses: &[&ClauseResult]) -> Self {
        let count = |verdict: FinalResult| {
            clauses
                .iter()
                .filter(|clause| clause.final_result == verdict)
                .count()
        };
        Self {
            hit_true: count(FinalResult::True),
            hit_false: count(FinalResult::False),
            unhit: count(FinalResult::Unhit),
        }
    }

}

fn related_population_clauses<'g>(
    group: &'g DetailedResult,
    population: &PopulationResult,
) -> Vec<&'g ClauseResult> {
    let Some(criteria) = population.criteria_expression.as_deref() else {
        return Vec::new();
    };
    group
        .clause_results
        .iter()
        .filter(|clause| clause.statement_name == criteria)
        .collect()
}

fn population_reason(population: &PopulationResult, related: &[&ClauseResult]) -> String {
    if population.result {
        return "Criteria met".to_string();
    }
    let failed = related
        .iter()
        .filter(|clause| clause.final_result == FinalResult::False)
        .count();
    if failed > 0 {
        format!("Failed {failed} condition(s)")
    } else {
        "Criteria not met".to_string()
    }
}
