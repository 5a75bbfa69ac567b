//! Coverage HTML normalization
//!
//! Coverage fragments reach callers in several incompatible textual
//! encodings: a structured engine response with a group-to-fragment
//! map, JSON-escaped text, fragments embedded in copy-pasted logs, or
//! already-raw HTML. Classification tries each interpretation in order
//! and stops at the first success; every branch has a best-effort
//! fallback, so normalization never fails.

use chrono::Local;
use octofhir_fqm_diagnostics::Diagnostic;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt;

/// Recognized field names mapping group names to fragments
const COVERAGE_FIELDS: [&str; 2] = ["coverageHTML", "groupClauseCoverageHTML"];

static COVERAGE_FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""coverageHTML":\s*\{\s*"[^"]+"\s*:\s*"([^"]+(?:\\.[^"]*)*)""#).unwrap()
});
static GROUP_COVERAGE_FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""groupClauseCoverageHTML":\s*\{\s*"[^"]+"\s*:\s*"([^"]+(?:\\.[^"]*)*)""#).unwrap()
});
static HTML_BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<div><h2>.*?</div>").unwrap());
static COVERAGE_PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Clause Coverage: ([\d.]+)%").unwrap());

/// Input encoding the normalizer detected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageFormat {
    /// Structured response with a group-to-fragment map
    CoverageMap,
    /// Valid structured data without a coverage field
    JsonWithoutCoverage,
    /// Text with JSON escape sequences
    EscapedText,
    /// Fragment extracted out of a larger text block
    EmbeddedFragment,
    /// Raw HTML, already clean
    RawHtml,
    /// Unrecognized; passed through as-is
    Unknown,
}

impl fmt::Display for CoverageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CoverageFormat::CoverageMap => "engine response with coverage HTML map",
            CoverageFormat::JsonWithoutCoverage => "JSON without coverage HTML",
            CoverageFormat::EscapedText => "JSON-escaped HTML text",
            CoverageFormat::EmbeddedFragment => "HTML extracted from larger text block",
            CoverageFormat::RawHtml => "raw HTML",
            CoverageFormat::Unknown => "unknown format",
        };
        f.write_str(text)
    }
}

/// A classified, cleaned coverage fragment
#[derive(Debug, Clone)]
pub struct NormalizedCoverage {
    /// The extracted (or passed-through) HTML fragment
    pub fragment: String,
    /// Which interpretation succeeded
    pub format: CoverageFormat,
    /// Caller-visible notes; warnings mark best-effort fallbacks
    pub diagnostics: Vec<Diagnostic>,
}

/// The normalized fragment embedded in the presentation template
#[derive(Debug, Clone)]
pub struct CoverageDocument {
    /// Complete standalone HTML document
    pub html: String,
    /// Which interpretation succeeded
    pub format: CoverageFormat,
    /// `Clause Coverage: N%` scanned out of the fragment, when present
    pub coverage_percent: Option<String>,
    /// Caller-visible notes carried over from normalization
    pub diagnostics: Vec<Diagnostic>,
}

/// Classify an arbitrary text blob and extract its coverage fragment
pub fn normalize(input: &str) -> NormalizedCoverage {
    let trimmed = input.trim();
    let mut diagnostics = Vec::new();

    // 1. Structured data carrying a group-to-fragment map; the first
    //    group in document order wins.
    if let Ok(parsed) = serde_json::from_str::<Value>(trimmed) {
        for field in COVERAGE_FIELDS {
            if let Some(groups) = parsed.get(field).and_then(Value::as_object) {
                if let Some((group, fragment)) = groups.iter().next() {
                    match fragment.as_str() {
                        Some(html) => {
                            diagnostics.push(Diagnostic::info(format!(
                                "using coverage HTML for group `{group}`"
                            )));
                            return NormalizedCoverage {
                                fragment: html.to_string(),
                                format: CoverageFormat::CoverageMap,
                                diagnostics,
                            };
                        }
                        None => diagnostics.push(Diagnostic::warning(format!(
                            "coverage HTML for group `{group}` is not text"
                        ))),
                    }
                }
            }
        }

        // 2. Valid structured data, nothing to extract.
        diagnostics.push(Diagnostic::warning("valid JSON but no coverage HTML found"));
        return NormalizedCoverage {
            fragment: trimmed.to_string(),
            format: CoverageFormat::JsonWithoutCoverage,
            diagnostics,
        };
    }

    // 3. JSON-escaped HTML text.
    if trimmed.contains("\\\"") || trimmed.contains("\\n") {
        return NormalizedCoverage {
            fragment: unescape(trimmed),
            format: CoverageFormat::EscapedText,
            diagnostics,
        };
    }

    // 4. Fragment embedded in a larger block (copy-pasted logs).
    if let Some(extracted) = extract_embedded(trimmed) {
        return NormalizedCoverage {
            fragment: unescape(&extracted),
            format: CoverageFormat::EmbeddedFragment,
            diagnostics,
        };
    }

    // 5. Raw HTML, already clean.
    if trimmed.contains("<div>") || trimmed.contains("<pre>") {
        return NormalizedCoverage {
            fragment: trimmed.to_string(),
            format: CoverageFormat::RawHtml,
            diagnostics,
        };
    }

    // 6. Unknown; best-effort passthrough.
    diagnostics.push(Diagnostic::warning(
        "unknown coverage format, using input as-is",
    ));
    NormalizedCoverage {
        fragment: trimmed.to_string(),
        format: CoverageFormat::Unknown,
        diagnostics,
    }
}

/// Normalize a blob and embed the fragment in the presentation template
pub fn convert(input: &str) -> CoverageDocument {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    convert_at(input, &timestamp)
}

/// [`convert`] with an explicit timestamp
pub fn convert_at(input: &str, timestamp: &str) -> CoverageDocument {
    let normalized = normalize(input);
    let coverage_percent = coverage_percent(&normalized.fragment);
    let html = wrap_fragment(&normalized.fragment, timestamp);
    CoverageDocument {
        html,
        format: normalized.format,
        coverage_percent,
        diagnostics: normalized.diagnostics,
    }
}

/// Embed a cleaned fragment in the presentation template
pub fn wrap_fragment(fragment: &str, timestamp: &str) -> String {
    COVERAGE_TEMPLATE
        .replacen("{{CONTENT}}", fragment, 1)
        .replacen("{{TIMESTAMP}}", timestamp, 1)
}

/// Scan a fragment for the engine's `Clause Coverage: N%` marker
pub fn coverage_percent(fragment: &str) -> Option<String> {
    COVERAGE_PERCENT_RE
        .captures(fragment)
        .map(|captures| captures[1].to_string())
}

fn unescape(text: &str) -> String {
    text.replace("\\\"", "\"")
        .replace("\\n", "\n")
        .replace("\\t", "\t")
        .replace("\\r", "\r")
        .replace("\\\\", "\\")
}

fn extract_embedded(text: &str) -> Option<String> {
    if let Some(captures) = COVERAGE_FIELD_RE
        .captures(text)
        .or_else(|| GROUP_COVERAGE_FIELD_RE.captures(text))
    {
        return Some(captures[1].to_string());
    }
    HTML_BLOCK_RE.find(text).map(|m| m.as_str().to_string())
}

/// Presentation template: legend, generation timestamp, and the
/// normalized fragment
pub const COVERAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>FQM Coverage Analysis</title>
    <style>
        body {
            font-family: 'Courier New', monospace;
            line-height: 1.6;
            margin: 20px;
            background-color: #f5f5f5;
        }
        .container {
            background-color: white;
            padding: 20px;
            border-radius: 8px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
            max-width: 1200px;
            margin: 0 auto;
        }
        h1 {
            color: #333;
            border-bottom: 2px solid #ddd;
            padding-bottom: 10px;
        }
        h2 {
            color: #666;
            margin-top: 30px;
        }
        pre {
            background-color: #f8f9fa;
            border: 1px solid #e9ecef;
            border-radius: 4px;
            padding: 15px;
            margin: 10px 0;
            overflow-x: auto;
            white-space: pre-wrap;
            word-wrap: break-word;
        }
        code {
            font-family: 'Courier New', monospace;
            font-size: 14px;
        }
        /* Coverage highlighting styles */
        span[style*="background-color:#daeaf5"] {
            background-color: #daeaf5 !important;
            color: #004e82 !important;
            border-bottom: 2px dashed #004e82;
            font-weight: bold;
        }
        span[style*="background-color:white"] {
            background-color: white !important;
            color: black !important;
        }
        .coverage-info {
            background-color: #e8f4fd;
            border-left: 4px solid #0066cc;
            padding: 15px;
            margin: 20px 0;
        }
        .legend {
            background-color: #f0f0f0;
            padding: 15px;
            border-radius: 4px;
            margin-bottom: 20px;
        }
        .legend-item {
            display: inline-block;
            margin-right: 20px;
            margin-bottom: 5px;
        }
        .legend-covered {
            background-color: #daeaf5;
            color: #004e82;
            padding: 2px 8px;
            border-bottom: 2px dashed #004e82;
            font-weight: bold;
        }
        .legend-uncovered {
            background-color: white;
            color: black;
            padding: 2px 8px;
            border: 1px solid #ccc;
        }
        .timestamp {
            color: #666;
            font-size: 0.9em;
            margin-bottom: 20px;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>FQM Coverage Analysis Viewer</h1>
        <div class="timestamp">Generated: {{TIMESTAMP}}</div>

        <div class="legend">
            <h3>Coverage Legend:</h3>
            <div class="legend-item">
                <span class="legend-covered">Covered</span> - Logic that executed with "truthy" values
            </div>
            <div class="legend-item">
                <span class="legend-uncovered">Uncovered</span> - Logic that was not executed or had "falsy" values
            </div>
        </div>

        <div class="coverage-info">
            <strong>Coverage Analysis:</strong> This view shows which parts of your CQL measure logic were actually executed during calculation. Blue highlighted sections with dashed underlines represent code that was executed and returned "truthy" values.
        </div>

        <div id="coverage-content">
            {{CONTENT}}
        </div>
    </div>
</body>
</html>"#;
