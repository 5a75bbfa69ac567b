//! ELM extraction from a FHIR measure bundle
//!
//! Measure bundles carry their compiled logic as base64-encoded
//! `application/elm+json` attachments on Library resources. The bundle
//! itself stays untyped (`serde_json::Value`): only the Library content
//! path is traversed, and bundles are assembled by callers this crate
//! has no contract with.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use octofhir_fqm_diagnostics::{ReportError, Result};
use serde_json::Value;

use crate::model::LibraryDocument;

const ELM_CONTENT_TYPE: &str = "application/elm+json";

/// Extract the ELM document of the main library in a measure bundle
///
/// Picks the first Library resource whose `name` or `title` contains
/// `name_hint`, falling back to the first Library in the bundle when the
/// hint is absent or matches nothing.
pub fn extract_elm_from_bundle(bundle: &Value, name_hint: Option<&str>) -> Result<LibraryDocument> {
    let libraries: Vec<&Value> = bundle
        .get("entry")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("resource"))
                .filter(|resource| {
                    resource.get("resourceType").and_then(Value::as_str) == Some("Library")
                })
                .collect()
        })
        .unwrap_or_default();

    if libraries.is_empty() {
        return Err(ReportError::NoLibraryResource);
    }

    let chosen = name_hint
        .and_then(|hint| {
            libraries.iter().copied().find(|library| {
                ["name", "title"].iter().any(|field| {
                    library
                        .get(*field)
                        .and_then(Value::as_str)
                        .is_some_and(|text| text.contains(hint))
                })
            })
        })
        .unwrap_or_else(|| {
            if let Some(hint) = name_hint {
                log::warn!("no library matching `{hint}`, using first library");
            }
            libraries[0]
        });

    extract_elm_from_library(chosen)
}

/// Extract the ELM document from a single Library resource
pub fn extract_elm_from_library(library: &Value) -> Result<LibraryDocument> {
    let name = library
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>");

    let content = library
        .get("content")
        .and_then(Value::as_array)
        .and_then(|contents| {
            contents.iter().find(|content| {
                content.get("contentType").and_then(Value::as_str) == Some(ELM_CONTENT_TYPE)
            })
        })
        .ok_or_else(|| ReportError::NoElmContent(name.to_string()))?;

    let data = content
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| ReportError::NoElmContent(name.to_string()))?;

    let bytes = BASE64
        .decode(data)
        .map_err(|e| ReportError::ElmDecode(e.to_string()))?;
    let document: LibraryDocument =
        serde_json::from_slice(&bytes).map_err(|e| ReportError::ElmDecode(e.to_string()))?;

    log::debug!(
        "extracted ELM for library `{}`",
        document.library_id().unwrap_or(name)
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn elm_attachment(library_id: &str) -> String {
        let elm = json!({
            "library": {
                "identifier": {"id": library_id, "version": "1.0.0"},
                "statements": {"def": [{"name": "Initial Population", "localId": "44"}]}
            }
        });
        BASE64.encode(serde_json::to_vec(&elm).unwrap())
    }

    #[test]
    fn extracts_first_library_without_hint() {
        let bundle = json!({
            "resourceType": "Bundle",
            "entry": [
                {"resource": {"resourceType": "Measure", "id": "m1"}},
                {"resource": {
                    "resourceType": "Library",
                    "name": "HelperLib",
                    "content": [{"contentType": "application/elm+json", "data": elm_attachment("HelperLib")}]
                }},
                {"resource": {
                    "resourceType": "Library",
                    "name": "MainLib",
                    "content": [{"contentType": "application/elm+json", "data": elm_attachment("MainLib")}]
                }}
            ]
        });

        let document = extract_elm_from_bundle(&bundle, None).unwrap();
        assert_eq!(document.library_id(), Some("HelperLib"));
    }

    #[test]
    fn hint_selects_matching_library() {
        let bundle = json!({
            "entry": [
                {"resource": {
                    "resourceType": "Library",
                    "name": "HelperLib",
                    "content": [{"contentType": "application/elm+json", "data": elm_attachment("HelperLib")}]
                }},
                {"resource": {
                    "resourceType": "Library",
                    "title": "PreventiveCare Main",
                    "content": [{"contentType": "application/elm+json", "data": elm_attachment("PreventiveCare")}]
                }}
            ]
        });

        let document = extract_elm_from_bundle(&bundle, Some("Preventive")).unwrap();
        assert_eq!(document.library_id(), Some("PreventiveCare"));
    }

    #[test]
    fn bundle_without_libraries_is_an_error() {
        let bundle = json!({"entry": [{"resource": {"resourceType": "Patient"}}]});
        assert_eq!(
            extract_elm_from_bundle(&bundle, None).unwrap_err(),
            ReportError::NoLibraryResource
        );
    }

    #[test]
    fn library_without_elm_content_is_an_error() {
        let library = json!({
            "resourceType": "Library",
            "name": "TextOnly",
            "content": [{"contentType": "text/cql", "data": "bm90IGVsbQ=="}]
        });
        assert_eq!(
            extract_elm_from_library(&library).unwrap_err(),
            ReportError::NoElmContent("TextOnly".to_string())
        );
    }

    #[test]
    fn undecodable_attachment_is_an_error() {
        let library = json!({
            "resourceType": "Library",
            "name": "Broken",
            "content": [{"contentType": "application/elm+json", "data": "!!not-base64!!"}]
        });
        assert!(matches!(
            extract_elm_from_library(&library),
            Err(ReportError::ElmDecode(_))
        ));
    }
}
