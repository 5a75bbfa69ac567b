//! Per-node rationale text
//!
//! Stateless policy table mapping a node kind and its outcome record to
//! an explanatory line. Kinds outside the table, and nodes without an
//! outcome record, yield no explanation.

use octofhir_fqm_elm::Expression;
use octofhir_fqm_results::{ClauseResult, FinalResult};
use serde_json::Value;

/// Derive the explanation line for a node, when the policy table has one
pub fn node_explanation(expression: &Expression, clause: Option<&ClauseResult>) -> Option<String> {
    let clause = clause?;
    match expression {
        Expression::And(_) => Some(
            if clause.final_result == FinalResult::False {
                "[FAILURE: One or more AND conditions failed]"
            } else {
                "[All AND conditions passed]"
            }
            .to_string(),
        ),
        Expression::Or(_) => Some(
            if clause.final_result == FinalResult::False {
                "[FAILURE: All OR conditions failed]"
            } else {
                "[At least one OR condition passed]"
            }
            .to_string(),
        ),
        Expression::GreaterOrEqual(_) | Expression::Equal(_) | Expression::Less(_) => {
            match &clause.raw {
                Some(Value::Bool(passed)) => Some(format!(
                    "[{}: Comparison result]",
                    if *passed { "PASSED" } else { "FAILED" }
                )),
                _ => None,
            }
        }
        Expression::CalculateAgeAt(_) => match &clause.raw {
            Some(Value::Number(age)) => Some(format!("[Calculated age: {age} years]")),
            _ => None,
        },
        Expression::Count(_) => match &clause.raw {
            Some(Value::Number(count)) => Some(format!("[Count result: {count}]")),
            _ => None,
        },
        Expression::ExpressionRef(_) => match &clause.raw {
            Some(Value::Array(items)) if items.is_empty() => {
                Some("[Returns: empty list []]".to_string())
            }
            _ => None,
        },
        _ => None,
    }
}
