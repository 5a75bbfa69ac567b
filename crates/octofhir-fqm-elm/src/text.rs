//! Source-text recovery from narrative annotations
//!
//! Clause results and expression nodes reference narrative elements by
//! identifier only; the annotation tree may cover nodes the expression
//! tree never mentions and vice versa. Absence is therefore a normal
//! outcome here, never an error.

use crate::model::{Annotation, NarrativeElement};

/// Depth guard for annotation walks; input trees originate from an
/// external engine and are not guaranteed well-formed.
pub const MAX_ANNOTATION_DEPTH: usize = 128;

/// Recover the source text for one identifier from an annotation subtree
///
/// Depth-first search for the first element whose `r` equals the target,
/// then concatenation of every literal fragment reachable from it in
/// document order, trimmed. Returns `None` when the identifier does not
/// occur in the subtree or contributes no text.
pub fn clause_text(root: &NarrativeElement, local_id: &str) -> Option<String> {
    let node = find_by_ref(root, local_id, 0)?;
    let mut text = String::new();
    collect_text(node, &mut text, 0);
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Recover the entire source text of a statement definition
///
/// Ignores the identifier filter and concatenates the full narrative of
/// the first annotation that carries one, for display as the complete
/// source definition.
pub fn statement_text(annotations: &[Annotation]) -> Option<String> {
    let root = annotations.iter().find_map(|a| a.s.as_ref())?;
    let mut text = String::new();
    collect_text(root, &mut text, 0);
    (!text.is_empty()).then_some(text)
}

fn find_by_ref<'a>(
    node: &'a NarrativeElement,
    target: &str,
    depth: usize,
) -> Option<&'a NarrativeElement> {
    if depth > MAX_ANNOTATION_DEPTH {
        return None;
    }
    if node.r.as_deref() == Some(target) {
        return Some(node);
    }
    node.children()
        .iter()
        .find_map(|child| find_by_ref(child, target, depth + 1))
}

fn collect_text(node: &NarrativeElement, out: &mut String, depth: usize) {
    if depth > MAX_ANNOTATION_DEPTH {
        return;
    }
    if let Some(value) = &node.value {
        value.write_to(out);
    }
    for child in node.children() {
        collect_text(child, out, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NarrativeValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn narrative(value: serde_json::Value) -> NarrativeElement {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn finds_text_for_nested_identifier() {
        let root = narrative(json!({
            "r": "30",
            "s": [
                {"value": ["exists "]},
                {"r": "19", "s": [{"value": ["\"Qualifying Encounters\""]}]}
            ]
        }));

        assert_eq!(
            clause_text(&root, "19").as_deref(),
            Some("\"Qualifying Encounters\"")
        );
    }

    #[test]
    fn concatenates_fragments_in_document_order() {
        let root = narrative(json!({
            "r": "5",
            "value": ["Count("],
            "s": [
                {"value": ["\"Visits\""]},
                {"s": [{"value": [")"]}]}
            ]
        }));

        assert_eq!(clause_text(&root, "5").as_deref(), Some("Count(\"Visits\")"));
    }

    #[test]
    fn absent_identifier_returns_none() {
        let root = narrative(json!({
            "r": "1",
            "s": [{"r": "2", "value": ["AgeInYearsAt("]}]
        }));

        assert_eq!(clause_text(&root, "99"), None);
    }

    #[test]
    fn whitespace_only_text_returns_none() {
        let root = narrative(json!({"r": "3", "value": ["   \n  "]}));
        assert_eq!(clause_text(&root, "3"), None);
    }

    #[test]
    fn statement_text_ignores_identifier_filter() {
        let annotations: Vec<Annotation> = serde_json::from_value(json!([
            {
                "type": "Annotation",
                "s": {
                    "r": "42",
                    "s": [
                        {"value": ["define \"Initial Population\":\n  "]},
                        {"r": "41", "value": ["AgeInYearsAt(start of \"Measurement Period\") >= 12"]}
                    ]
                }
            }
        ]))
        .unwrap();

        assert_eq!(
            statement_text(&annotations).as_deref(),
            Some("define \"Initial Population\":\n  AgeInYearsAt(start of \"Measurement Period\") >= 12")
        );
    }

    #[test]
    fn statement_text_without_narrative_returns_none() {
        let annotations: Vec<Annotation> =
            serde_json::from_value(json!([{"type": "Annotation"}])).unwrap();
        assert_eq!(statement_text(&annotations), None);
    }

    #[test]
    fn pathological_depth_is_guarded() {
        // Build a chain far deeper than the guard allows; the search must
        // return None instead of exhausting the call stack.
        let mut node = NarrativeElement {
            r: Some("target".to_string()),
            s: None,
            value: Some(NarrativeValue::One("deep".to_string())),
        };
        for _ in 0..2_000 {
            node = NarrativeElement {
                r: None,
                s: Some(vec![node]),
                value: None,
            };
        }

        assert_eq!(clause_text(&node, "target"), None);
    }
}
