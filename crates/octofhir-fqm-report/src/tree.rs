//! Annotated expression tree construction and outline rendering
//!
//! Walks a statement's ELM expression with kind-specific child
//! discovery, annotates each visited node with its clause outcome, and
//! renders the result as a box-drawing indented outline with the
//! verdict on the node line and the rationale on a continuation line.

use octofhir_fqm_diagnostics::{ReportError, Result};
use octofhir_fqm_elm::{Expression, ExpressionDef, FunctionExpression};
use octofhir_fqm_results::{ClauseResult, ClauseResultIndex, ExecutionResults, FinalResult};
use serde_json::Value;

use crate::explain;

/// Depth guard for expression walks; input trees originate from an
/// external engine and are not guaranteed well-formed.
pub const MAX_TREE_DEPTH: usize = 128;

/// One node of the label tree, isomorphic to the expression tree
///
/// Carries no rendering concerns: the label and the optional
/// explanation line are plain text, and [`TreeNode::render`] is one of
/// any number of possible renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Node description plus identifier and verdict marker
    pub label: String,
    /// Rationale line, present when the policy table has one
    pub explanation: Option<String>,
    /// Mapped children in discovery order
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Leaf constructor
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            explanation: None,
            children: Vec::new(),
        }
    }

    /// Render the tree as a box-drawing indented outline
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.label);
        out.push('\n');
        self.write_explanation(&mut out, "");
        self.write_children(&mut out, "");
        out
    }

    fn write_explanation(&self, out: &mut String, prefix: &str) {
        if let Some(explanation) = &self.explanation {
            out.push_str(prefix);
            out.push(if self.children.is_empty() { ' ' } else { '│' });
            out.push_str("     ");
            out.push_str(explanation);
            out.push('\n');
        }
    }

    fn write_children(&self, out: &mut String, prefix: &str) {
        let count = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            let last = i + 1 == count;
            out.push_str(prefix);
            out.push(if last { '└' } else { '├' });
            out.push('─');
            out.push(if child.children.is_empty() { '─' } else { '┬' });
            out.push(' ');
            out.push_str(&child.label);
            out.push('\n');

            let child_prefix = format!("{prefix}{} ", if last { ' ' } else { '│' });
            child.write_explanation(out, &child_prefix);
            child.write_children(out, &child_prefix);
        }
    }
}

/// Builds label trees from expression trees and a clause index
pub struct ExpressionTreeBuilder<'a> {
    index: &'a ClauseResultIndex<'a>,
}

impl<'a> ExpressionTreeBuilder<'a> {
    pub fn new(index: &'a ClauseResultIndex<'a>) -> Self {
        Self { index }
    }

    /// Build the label tree for a statement definition
    ///
    /// The root carries the statement name; its single child is the
    /// statement's expression. A definition without an expression is a
    /// not-found condition, never a partial tree.
    pub fn statement_tree(&self, def: &ExpressionDef) -> Result<TreeNode> {
        let expression = def
            .expression
            .as_deref()
            .ok_or_else(|| ReportError::DefinitionNotFound(def.name.clone()))?;

        Ok(TreeNode {
            label: self.label(&def.name, def.local_id.as_deref()),
            explanation: None,
            children: vec![self.node_tree(expression, 0)],
        })
    }

    fn node_tree(&self, expression: &Expression, depth: usize) -> TreeNode {
        let local_id = expression.local_id();
        let clause = local_id.and_then(|id| self.index.get(id));
        let label = self.label(&describe(expression), local_id);
        let explanation = explain::node_explanation(expression, clause);

        // Past the guard the frontier node renders as a leaf.
        let children = if depth >= MAX_TREE_DEPTH {
            Vec::new()
        } else {
            children(expression)
                .into_iter()
                .map(|child| self.node_tree(child, depth + 1))
                .collect()
        };

        TreeNode {
            label,
            explanation,
            children,
        }
    }

    fn label(&self, description: &str, local_id: Option<&str>) -> String {
        let mut label = description.to_string();
        if let Some(id) = local_id {
            label.push_str(&format!(" (localId: {id})"));
        }
        if let Some(clause) = local_id.and_then(|id| self.index.get(id)) {
            label.push_str(&verdict_suffix(clause));
        }
        label
    }
}

fn verdict_suffix(clause: &ClauseResult) -> String {
    let icon = match clause.final_result {
        FinalResult::True => " ✅",
        FinalResult::False => " ❌",
        _ => "",
    };
    let mut suffix = format!(" → {}{icon}", clause.final_result);
    if clause.final_result == FinalResult::True {
        match &clause.raw {
            Some(Value::Number(n)) => suffix.push_str(&format!(" (value: {n})")),
            Some(Value::String(s)) => suffix.push_str(&format!(" (value: {s})")),
            _ => {}
        }
    }
    suffix
}

/// Discover the children of a node, dispatched purely on its kind
///
/// Boolean operators and comparisons walk their operand list; function
/// kinds walk operands then `source`; `Property` walks `source`; every
/// other kind is a leaf regardless of nested fields.
pub fn children(expression: &Expression) -> Vec<&Expression> {
    match expression {
        Expression::And(e)
        | Expression::Or(e)
        | Expression::GreaterOrEqual(e)
        | Expression::Equal(e)
        | Expression::Less(e) => e.operand.iter().collect(),
        Expression::CalculateAgeAt(f)
        | Expression::Count(f)
        | Expression::Exists(f)
        | Expression::DateFrom(f)
        | Expression::Start(f) => function_children(f),
        Expression::Property(p) => p.source.as_deref().into_iter().collect(),
        Expression::ExpressionRef(_)
        | Expression::ParameterRef(_)
        | Expression::Literal(_)
        | Expression::Other(_) => Vec::new(),
    }
}

fn function_children(function: &FunctionExpression) -> Vec<&Expression> {
    let mut nodes: Vec<&Expression> = function.operands().iter().collect();
    if let Some(source) = function.source.as_deref() {
        nodes.push(source);
    }
    nodes
}

/// Human-readable description of a node kind
pub fn describe(expression: &Expression) -> String {
    match expression {
        Expression::And(_) => "AND".to_string(),
        Expression::Or(_) => "OR".to_string(),
        Expression::GreaterOrEqual(_) => "GreaterOrEqual".to_string(),
        Expression::Equal(_) => "Equal".to_string(),
        Expression::Less(_) => "Less".to_string(),
        Expression::CalculateAgeAt(f) => function_description("CalculateAgeAt", f),
        Expression::Count(f) => function_description("Count", f),
        Expression::Exists(f) => function_description("Exists", f),
        Expression::DateFrom(f) => function_description("DateFrom", f),
        Expression::Start(f) => function_description("Start", f),
        Expression::Property(p) => format!("Property \"{}\"", p.path),
        Expression::ExpressionRef(r) => format!("ExpressionRef \"{}\"", r.name),
        Expression::ParameterRef(r) => format!("ParameterRef \"{}\"", r.name),
        Expression::Literal(l) => format!("Literal \"{}\"", l.value.as_deref().unwrap_or_default()),
        Expression::Other(o) => o.kind_name().to_string(),
    }
}

fn function_description(name: &str, function: &FunctionExpression) -> String {
    match &function.precision {
        Some(precision) => format!("{name} [{precision}]"),
        None => name.to_string(),
    }
}

/// Build and render the annotated tree for one statement of a bundle
///
/// Uses the first patient's first result group, locates the statement's
/// definition by its identifier (falling back to its name), and appends
/// the fixed execution summary.
pub fn statement_view(results: &ExecutionResults, statement_name: &str) -> Result<String> {
    let group = results.first_group().ok_or(ReportError::NoResults)?;
    let statement = group
        .statement(statement_name)
        .ok_or_else(|| ReportError::StatementNotFound(statement_name.to_string()))?;

    let elm = results.elm().ok_or(ReportError::ElmUnavailable)?;
    let def = statement
        .local_id
        .as_deref()
        .and_then(|id| elm.library.statement_by_local_id(id))
        .or_else(|| elm.library.statement(statement_name))
        .ok_or_else(|| ReportError::DefinitionNotFound(statement_name.to_string()))?;

    let index = ClauseResultIndex::new(&group.clause_results);
    let builder = ExpressionTreeBuilder::new(&index);
    let tree = builder.statement_tree(def)?;
    let summary = execution_summary(statement_name, statement.final_result);

    Ok(format!("{}\n{}", tree.render(), summary))
}

/// Fixed-text execution summary trailing the rendered tree
pub fn execution_summary(statement_name: &str, final_result: FinalResult) -> String {
    if final_result == FinalResult::False {
        format!(
            "EXECUTION SUMMARY:\n\
             ❌ {statement_name} = FALSE\n\
             \n\
             FAILURE ANALYSIS:\n\
             To qualify for {statement_name}, patient needs:\n\
             \x20 - Age ≥ 12 years at start of measurement period\n\
             \x20 - AND either ≥2 qualifying visits OR ≥1 preventive visit during measurement period\n\
             \n\
             REMEDY: Schedule qualifying healthcare encounters during the measurement period"
        )
    } else {
        format!(
            "EXECUTION SUMMARY:\n\
             ✅ {statement_name} = TRUE\n\
             Patient meets all {statement_name} criteria"
        )
    }
}
