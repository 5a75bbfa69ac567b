//! Command-level tests over real files

use octofhir_fqm_cli::{html, report, tree};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_results(dir: &TempDir) -> PathBuf {
    let results = json!({
        "results": [{
            "patientId": "patient-1",
            "detailedResults": [{
                "groupId": "group-1",
                "populationResults": [
                    {"populationType": "initial-population", "criteriaExpression": "Initial Population", "result": true}
                ],
                "statementResults": [
                    {"libraryName": "Lib", "statementName": "Initial Population", "localId": "st-1",
                     "final": "TRUE", "relevance": "TRUE", "raw": true}
                ],
                "clauseResults": [
                    {"libraryName": "Lib", "statementName": "Initial Population", "localId": "ex-1",
                     "final": "TRUE", "raw": true}
                ]
            }]
        }],
        "elmDefinition": {
            "library": {
                "identifier": {"id": "Lib"},
                "statements": {"def": [{
                    "name": "Initial Population",
                    "localId": "st-1",
                    "expression": {"type": "Exists", "localId": "ex-1",
                                   "operand": {"type": "ExpressionRef", "localId": "ref-1", "name": "Encounters"}}
                }]}
            }
        }
    });

    let path = dir.path().join("results.json");
    fs::write(&path, serde_json::to_string_pretty(&results).unwrap()).unwrap();
    path
}

#[test]
fn tree_command_writes_rendered_outline() {
    let dir = TempDir::new().unwrap();
    let results = write_results(&dir);
    let out = dir.path().join("tree.txt");

    tree::run(tree::TreeConfig {
        file: results,
        statement: "Initial Population".to_string(),
        output_file: Some(out.clone()),
        verbose: false,
    })
    .unwrap();

    let rendered = fs::read_to_string(out).unwrap();
    assert!(rendered.contains("Initial Population (localId: st-1)"));
    assert!(rendered.contains("Exists (localId: ex-1) → TRUE ✅"));
    assert!(rendered.contains("EXECUTION SUMMARY:"));
}

#[test]
fn tree_command_fails_for_unknown_statement() {
    let dir = TempDir::new().unwrap();
    let results = write_results(&dir);

    let err = tree::run(tree::TreeConfig {
        file: results,
        statement: "Denominator".to_string(),
        output_file: None,
        verbose: false,
    })
    .unwrap_err();
    assert!(format!("{err:#}").contains("statement `Denominator` not found"));
}

#[test]
fn tree_command_fails_for_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = tree::run(tree::TreeConfig {
        file: dir.path().join("nope.json"),
        statement: "Initial Population".to_string(),
        output_file: None,
        verbose: false,
    })
    .unwrap_err();
    assert!(format!("{err:#}").contains("file not found or unreadable"));
}

#[test]
fn report_command_writes_markdown() {
    let dir = TempDir::new().unwrap();
    let results = write_results(&dir);
    let out = dir.path().join("nested/results.md");

    report::run(report::ReportConfig {
        file: results,
        output_file: out.clone(),
        verbose: false,
    })
    .unwrap();

    let markdown = fs::read_to_string(out).unwrap();
    assert!(markdown.starts_with("# 🔍 CQL Execution Analysis Report"));
    assert!(markdown.contains("| **Coverage Percentage** | 100% (1/1 clauses) |"));
}

#[test]
fn report_command_fails_for_malformed_input() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{not json").unwrap();

    let err = report::run(report::ReportConfig {
        file: path,
        output_file: dir.path().join("out.md"),
        verbose: false,
    })
    .unwrap_err();
    assert!(format!("{err:#}").contains("failed to parse"));
}

#[test]
fn html_command_writes_document_next_to_input() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("coverage.txt");
    fs::write(&path, r#"{"coverageHTML":{"group1":"<div>ok</div>"}}"#).unwrap();

    html::run(html::HtmlConfig {
        input: Some(path),
        stdin: false,
        output_file: None,
        verbose: false,
    })
    .unwrap();

    let document = fs::read_to_string(dir.path().join("coverage-coverage.html")).unwrap();
    assert!(document.contains("<div>ok</div>"));
    assert!(document.contains("FQM Coverage Analysis Viewer"));
}

#[test]
fn html_command_honors_explicit_output() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blob.txt");
    fs::write(&path, "<div><pre>raw tree</pre></div>").unwrap();
    let out = dir.path().join("viewer.html");

    html::run(html::HtmlConfig {
        input: Some(path),
        stdin: false,
        output_file: Some(out.clone()),
        verbose: false,
    })
    .unwrap();

    let document = fs::read_to_string(out).unwrap();
    assert!(document.contains("<div><pre>raw tree</pre></div>"));
}
