//! ELM structures per the HL7 ELM specification, reduced to the subset
//! the reporting pipelines traverse
//!
//! The expression kind set is closed: the kinds the tree builder
//! dispatches on are modeled as enum variants, and every other kind
//! deserializes into [`OtherExpression`] keeping its raw `type` string.
//! Identifiers (`localId`) correlate expressions with clause results and
//! narrative annotations by plain lookup, never by ownership.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ============================================================================
// Library Structure
// ============================================================================

/// ELM JSON document root (`{"library": {...}}`)
#[derive(Debug, Clone, Deserialize)]
pub struct LibraryDocument {
    /// The contained library
    pub library: Library,
}

impl LibraryDocument {
    /// Library identifier, when present
    pub fn library_id(&self) -> Option<&str> {
        self.library.identifier.as_ref().map(|id| id.id.as_str())
    }

    /// Find a statement by owning library name and statement name
    ///
    /// Returns `None` when this document belongs to a different library,
    /// since clause results may reference statements from libraries that
    /// were never supplied.
    pub fn statement_for(&self, library_name: &str, statement_name: &str) -> Option<&ExpressionDef> {
        if self.library_id()? != library_name {
            return None;
        }
        self.library.statement(statement_name)
    }
}

/// ELM Library - the root element containing a compiled CQL library
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    /// Library identifier
    #[serde(default)]
    pub identifier: Option<VersionedIdentifier>,
    /// Statements (expression and function definitions)
    #[serde(default)]
    pub statements: Option<Statements>,
}

impl Library {
    /// All statement definitions, or empty when the library has none
    pub fn statement_defs(&self) -> &[ExpressionDef] {
        self.statements
            .as_ref()
            .map(|s| s.defs.as_slice())
            .unwrap_or_default()
    }

    /// Find a statement definition by name
    pub fn statement(&self, name: &str) -> Option<&ExpressionDef> {
        self.statement_defs().iter().find(|def| def.name == name)
    }

    /// Find a statement definition by its identifier
    pub fn statement_by_local_id(&self, local_id: &str) -> Option<&ExpressionDef> {
        self.statement_defs()
            .iter()
            .find(|def| def.local_id.as_deref() == Some(local_id))
    }
}

/// Versioned identifier for libraries and schemas
#[derive(Debug, Clone, Deserialize)]
pub struct VersionedIdentifier {
    /// Identifier
    #[serde(default)]
    pub id: String,
    /// System/namespace
    #[serde(default)]
    pub system: Option<String>,
    /// Version
    #[serde(default)]
    pub version: Option<String>,
}

/// Container for statements
#[derive(Debug, Clone, Deserialize)]
pub struct Statements {
    #[serde(rename = "def", default)]
    pub defs: Vec<ExpressionDef>,
}

/// Expression definition
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionDef {
    /// Name
    #[serde(default)]
    pub name: String,
    /// Identifier correlating the definition with its outcome record
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub local_id: Option<String>,
    /// Context
    #[serde(default)]
    pub context: Option<String>,
    /// Expression
    #[serde(default)]
    pub expression: Option<Box<Expression>>,
    /// Narrative annotations carrying the original source text
    #[serde(default)]
    pub annotation: Option<Vec<Annotation>>,
}

impl ExpressionDef {
    /// The top-level narrative node of this definition, when annotated
    pub fn narrative(&self) -> Option<&NarrativeElement> {
        self.annotation
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find_map(|a| a.s.as_ref())
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// Common element fields shared by all expression kinds
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Identifier correlating the node with its outcome record
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub local_id: Option<String>,
    /// Locator (source position)
    #[serde(default)]
    pub locator: Option<String>,
}

/// The expression kinds the reporting pipelines dispatch on
///
/// Anything outside the closed set deserializes as [`Expression::Other`]
/// and is treated as a leaf with its raw kind name as the description.
#[derive(Debug, Clone)]
pub enum Expression {
    And(BinaryExpression),
    Or(BinaryExpression),
    GreaterOrEqual(BinaryExpression),
    Equal(BinaryExpression),
    Less(BinaryExpression),
    CalculateAgeAt(FunctionExpression),
    Count(FunctionExpression),
    Exists(FunctionExpression),
    DateFrom(FunctionExpression),
    Start(FunctionExpression),
    Property(Property),
    ExpressionRef(ExpressionRef),
    ParameterRef(ParameterRef),
    Literal(Literal),
    Other(OtherExpression),
}

impl Expression {
    /// Common element fields of any expression kind
    pub fn element(&self) -> &Element {
        match self {
            Expression::And(e) | Expression::Or(e) => &e.element,
            Expression::GreaterOrEqual(e) | Expression::Equal(e) | Expression::Less(e) => {
                &e.element
            }
            Expression::CalculateAgeAt(e)
            | Expression::Count(e)
            | Expression::Exists(e)
            | Expression::DateFrom(e)
            | Expression::Start(e) => &e.element,
            Expression::Property(e) => &e.element,
            Expression::ExpressionRef(e) => &e.element,
            Expression::ParameterRef(e) => &e.element,
            Expression::Literal(e) => &e.element,
            Expression::Other(e) => &e.element,
        }
    }

    /// Identifier correlating this node with its outcome record
    pub fn local_id(&self) -> Option<&str> {
        self.element().local_id.as_deref()
    }
}

impl<'de> Deserialize<'de> for Expression {
    // ELM tags expressions with a `type` field. serde's internally
    // tagged enums cannot keep the tag string for unrecognized kinds,
    // so the tag is sniffed from a buffered value instead.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error as _;

        let value = Value::deserialize(deserializer)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        fn decode<'de, T, D>(value: Value) -> Result<T, D::Error>
        where
            T: serde::de::DeserializeOwned,
            D: Deserializer<'de>,
        {
            serde_json::from_value(value).map_err(D::Error::custom)
        }

        Ok(match kind.as_str() {
            "And" => Expression::And(decode::<_, D>(value)?),
            "Or" => Expression::Or(decode::<_, D>(value)?),
            "GreaterOrEqual" => Expression::GreaterOrEqual(decode::<_, D>(value)?),
            "Equal" => Expression::Equal(decode::<_, D>(value)?),
            "Less" => Expression::Less(decode::<_, D>(value)?),
            "CalculateAgeAt" => Expression::CalculateAgeAt(decode::<_, D>(value)?),
            "Count" => Expression::Count(decode::<_, D>(value)?),
            "Exists" => Expression::Exists(decode::<_, D>(value)?),
            "DateFrom" => Expression::DateFrom(decode::<_, D>(value)?),
            "Start" => Expression::Start(decode::<_, D>(value)?),
            "Property" => Expression::Property(decode::<_, D>(value)?),
            "ExpressionRef" => Expression::ExpressionRef(decode::<_, D>(value)?),
            "ParameterRef" => Expression::ParameterRef(decode::<_, D>(value)?),
            "Literal" => Expression::Literal(decode::<_, D>(value)?),
            _ => Expression::Other(OtherExpression {
                type_name: kind.clone(),
                element: decode::<_, D>(value)?,
            }),
        })
    }
}

/// Operand list that arrives either as one node or as a list of nodes
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Operands {
    Many(Vec<Expression>),
    One(Box<Expression>),
}

impl Operands {
    /// View the operands as a slice regardless of wire shape
    pub fn as_slice(&self) -> &[Expression] {
        match self {
            Operands::Many(operands) => operands.as_slice(),
            Operands::One(operand) => std::slice::from_ref(operand.as_ref()),
        }
    }
}

/// Binary/n-ary expression (And, Or, comparisons)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryExpression {
    #[serde(flatten)]
    pub element: Element,
    #[serde(default)]
    pub operand: Vec<Expression>,
}

/// Function-style expression (CalculateAgeAt, Count, Exists, DateFrom, Start)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionExpression {
    #[serde(flatten)]
    pub element: Element,
    #[serde(default)]
    pub operand: Option<Operands>,
    #[serde(default)]
    pub source: Option<Box<Expression>>,
    /// Precision qualifier (e.g. `year` for age calculations)
    #[serde(default)]
    pub precision: Option<String>,
}

impl FunctionExpression {
    /// Operands normalized to a slice
    pub fn operands(&self) -> &[Expression] {
        self.operand.as_ref().map(Operands::as_slice).unwrap_or_default()
    }
}

/// Property access
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(flatten)]
    pub element: Element,
    #[serde(default)]
    pub source: Option<Box<Expression>>,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Expression reference
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionRef {
    #[serde(flatten)]
    pub element: Element,
    #[serde(default)]
    pub library_name: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// Parameter reference
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterRef {
    #[serde(flatten)]
    pub element: Element,
    #[serde(default)]
    pub library_name: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// Literal value
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Literal {
    #[serde(flatten)]
    pub element: Element,
    #[serde(default)]
    pub value_type: Option<String>,
    /// The literal value as string
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub value: Option<String>,
}

/// Any expression kind outside the closed set, kept with its raw kind name
#[derive(Debug, Clone)]
pub struct OtherExpression {
    /// Raw `type` string from the wire
    pub type_name: String,
    pub element: Element,
}

impl OtherExpression {
    /// Kind name for display, never empty
    pub fn kind_name(&self) -> &str {
        if self.type_name.is_empty() {
            "Unknown"
        } else {
            &self.type_name
        }
    }
}

// ============================================================================
// Annotations
// ============================================================================

/// Annotation attached to a statement definition
#[derive(Debug, Clone, Deserialize)]
pub struct Annotation {
    #[serde(rename = "type", default)]
    pub annotation_type: Option<String>,
    /// Top-level narrative node
    #[serde(default)]
    pub s: Option<NarrativeElement>,
}

/// Narrative element
///
/// A nested tree of source-text fragments. `r` names the identifier the
/// node corresponds to (a weak reference into the expression tree),
/// `value` carries literal text fragments, `s` nests child elements.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NarrativeElement {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub r: Option<String>,
    #[serde(default)]
    pub s: Option<Vec<NarrativeElement>>,
    #[serde(default)]
    pub value: Option<NarrativeValue>,
}

impl NarrativeElement {
    /// Child elements, or empty when the node nests none
    pub fn children(&self) -> &[NarrativeElement] {
        self.s.as_deref().unwrap_or_default()
    }
}

/// Literal text payload of a narrative element (one fragment or a list)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NarrativeValue {
    Many(Vec<String>),
    One(String),
}

impl NarrativeValue {
    /// Append all fragments to `out` in document order
    pub fn write_to(&self, out: &mut String) {
        match self {
            NarrativeValue::Many(parts) => {
                for part in parts {
                    out.push_str(part);
                }
            }
            NarrativeValue::One(part) => out.push_str(part),
        }
    }
}

/// Accept identifiers encoded as strings or numbers
///
/// Engine output always uses strings, but translator-emitted ELM has
/// been seen with bare numeric `localId`s.
fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        String(String),
        Number(serde_json::Number),
    }

    Ok(Option::<IdRepr>::deserialize(deserializer)?.map(|id| match id {
        IdRepr::String(s) => s,
        IdRepr::Number(n) => n.to_string(),
    }))
}
