//! Shared fixtures for report tests
//!
//! One result bundle shaped like real engine output: an `Initial
//! Population` statement whose expression is an `And` over an age
//! comparison and an `Or` of two `Exists` checks, with clause outcomes
//! and narrative annotations wired up by identifier.

use octofhir_fqm_results::ExecutionResults;
use serde_json::json;

pub fn sample_results() -> ExecutionResults {
    serde_json::from_value(json!({
        "results": [
            {
                "patientId": "patient-123",
                "detailedResults": [
                    {
                        "groupId": "group-1",
                        "populationResults": [
                            {
                                "populationType": "initial-population",
                                "criteriaExpression": "Initial Population",
                                "result": true
                            }
                        ],
                        "statementResults": [
                            {
                                "libraryName": "PreventiveCare",
                                "statementName": "Initial Population",
                                "localId": "st-1",
                                "final": "TRUE",
                                "relevance": "TRUE",
                                "raw": true
                            },
                            {
                                "libraryName": "PreventiveCare",
                                "statementName": "Qualifying Encounters",
                                "localId": "st-2",
                                "final": "FALSE",
                                "relevance": "TRUE",
                                "raw": []
                            },
                            {
                                "libraryName": "PreventiveCare",
                                "statementName": "Normalize Interval",
                                "final": "NA",
                                "relevance": "TRUE",
                                "isFunction": true
                            }
                        ],
                        "clauseResults": [
                            {"libraryName": "PreventiveCare", "statementName": "Initial Population",
                             "localId": "and-1", "final": "TRUE", "raw": true},
                            {"libraryName": "PreventiveCare", "statementName": "Initial Population",
                             "localId": "ageCheck", "final": "TRUE", "raw": 14},
                            {"libraryName": "PreventiveCare", "statementName": "Initial Population",
                             "localId": "or-1", "final": "TRUE", "raw": true},
                            {"libraryName": "PreventiveCare", "statementName": "Initial Population",
                             "localId": "ex-1", "final": "FALSE", "raw": false},
                            {"libraryName": "PreventiveCare", "statementName": "Initial Population",
                             "localId": "ex-2", "final": "TRUE", "raw": true},
                            {"libraryName": "PreventiveCare", "statementName": "Initial Population",
                             "localId": "ref-1", "final": "FALSE", "raw": []},
                            {"libraryName": "PreventiveCare", "statementName": "Initial Population",
                             "localId": "lit-12", "final": "UNHIT"}
                        ]
                    }
                ]
            }
        ],
        "elmDefinitions": {
            "library": {
                "identifier": {"id": "PreventiveCare", "version": "0.1.000"},
                "statements": {
                    "def": [
                        {
                            "name": "Initial Population",
                            "localId": "st-1",
                            "context": "Patient",
                            "expression": {
                                "type": "And",
                                "localId": "and-1",
                                "operand": [
                                    {
                                        "type": "GreaterOrEqual",
                                        "localId": "ageCheck",
                                        "operand": [
                                            {
                                                "type": "CalculateAgeAt",
                                                "localId": "age-1",
                                                "precision": "Year",
                                                "operand": [
                                                    {"type": "Property", "localId": "prop-1", "path": "birthDate.value",
                                                     "source": {"type": "ExpressionRef", "localId": "pat-1", "name": "Patient"}},
                                                    {"type": "Start", "localId": "start-1",
                                                     "operand": {"type": "ParameterRef", "localId": "mp-1", "name": "Measurement Period"}}
                                                ]
                                            },
                                            {"type": "Literal", "localId": "lit-12",
                                             "valueType": "{urn:hl7-org:elm-types:r1}Integer", "value": "12"}
                                        ]
                                    },
                                    {
                                        "type": "Or",
                                        "localId": "or-1",
                                        "operand": [
                                            {"type": "Exists", "localId": "ex-1",
                                             "operand": {"type": "ExpressionRef", "localId": "ref-1", "name": "Qualifying Encounters"}},
                                            {"type": "Exists", "localId": "ex-2",
                                             "operand": {"type": "ExpressionRef", "localId": "ref-2", "name": "Preventive Visits"}}
                                        ]
                                    }
                                ]
                            },
                            "annotation": [
                                {
                                    "type": "Annotation",
                                    "s": {
                                        "r": "st-1",
                                        "s": [
                                            {"value": ["define \"Initial Population\":\n  "]},
                                            {"r": "ageCheck", "s": [{"value": ["AgeInYearsAt(start of \"Measurement Period\") >= 12"]}]}
                                        ]
                                    }
                                }
                            ]
                        },
                        {"name": "Qualifying Encounters", "localId": "st-2"}
                    ]
                }
            }
        }
    }))
    .unwrap()
}
