//! Abstract Syntax Tree for LCML.
//!
//! Every node carries a [`Span`] of absolute byte offsets into the source.
//! Child spans always lie inside their parent's span and siblings never
//! overlap.
//!
//! Values that can appear anywhere a value is expected are collected in
//! [`Value`]. Nodes that only appear in specific positions (comments,
//! identifiers used as keys, string segments, properties) are standalone
//! structs. [`NodeRef`] borrows any of them for tree walks and observers.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// Half-open byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Consumed length of the node.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `other` lies entirely within this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl Serialize for Span {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Span", 3)?;
        s.serialize_field("start", &self.start)?;
        s.serialize_field("end", &self.end)?;
        s.serialize_field("consumedLength", &self.len())?;
        s.end()
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// Any value node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Value {
    String(StringNode),
    Expression(ExpressionNode),
    Array(ArrayNode),
    Object(ObjectNode),
    Number(NumberNode),
    Boolean(BooleanNode),
    Nullish(NullishNode),
}

impl Value {
    pub fn span(&self) -> Span {
        self.as_node().span()
    }

    pub fn kind(&self) -> NodeKind {
        self.as_node().kind()
    }

    pub fn as_node(&self) -> NodeRef<'_> {
        match self {
            Value::String(n) => NodeRef::String(n),
            Value::Expression(n) => NodeRef::Expression(n),
            Value::Array(n) => NodeRef::Array(n),
            Value::Object(n) => NodeRef::Object(n),
            Value::Number(n) => NodeRef::Number(n),
            Value::Boolean(n) => NodeRef::Boolean(n),
            Value::Nullish(n) => NodeRef::Nullish(n),
        }
    }
}

/// A `// line` or `/* block */` comment. Only produced to be skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub span: Span,
}

/// A bare identifier, used as an object key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentifierNode {
    #[serde(flatten)]
    pub span: Span,
    pub raw: String,
}

/// A numeric literal, including `NaN` and signed `Infinity`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberNode {
    #[serde(flatten)]
    pub span: Span,
    pub raw: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BooleanNode {
    #[serde(flatten)]
    pub span: Span,
    pub raw: String,
    pub value: bool,
}

/// `null` or `undefined`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NullishNode {
    #[serde(flatten)]
    pub span: Span,
    pub raw: String,
}

/// What an embedded expression evaluates to, as far as a host can tell.
///
/// The parser always produces `Unknown`; expression handlers may refine it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    Unknown,
    Array,
    Number,
    String,
    Boolean,
    Object,
}

/// An embedded `{{ expression }}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionNode {
    #[serde(flatten)]
    pub span: Span,
    /// Expression text between the brackets. Handlers may rewrite it.
    pub expression: String,
    /// Expression text exactly as written in the source.
    pub raw_expression: String,
    /// Position of the text between the brackets.
    pub expression_span: Span,
    /// The opening run of `{`, at least two long.
    pub left_bracket: String,
    /// The closing run of `}`, as long as the opening run.
    pub right_bracket: String,
    pub value_type: ValueType,
}

/// A static run of string content, still escaped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringSegmentNode {
    #[serde(flatten)]
    pub span: Span,
    pub raw: String,
}

/// One child of a [`StringNode`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StringPart {
    #[serde(rename = "string-segment")]
    Segment(StringSegmentNode),
    Expression(ExpressionNode),
}

impl StringPart {
    pub fn span(&self) -> Span {
        match self {
            StringPart::Segment(s) => s.span,
            StringPart::Expression(e) => e.span,
        }
    }
}

/// A string, quoted or (for whole-input reinterpretation) bare.
///
/// `segments` has odd length: even indices are segments, odd indices are
/// expressions. The first and last parts are always segments, possibly
/// empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StringNode {
    #[serde(flatten)]
    pub span: Span,
    /// `None` when the string was read without delimiters.
    pub quote: Option<char>,
    pub segments: Vec<StringPart>,
    pub is_dynamic: bool,
}

/// Where one array slot sits in the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemLocation {
    pub has_value: bool,
    pub value_start: usize,
    pub value_end: usize,
    pub has_trailing_comma: bool,
    pub trailing_comma_start: Option<usize>,
}

impl ItemLocation {
    /// An empty slot beginning at `position`.
    pub fn empty(position: usize) -> Self {
        Self {
            value_start: position,
            value_end: position,
            ..Self::default()
        }
    }
}

/// An array literal. Elided slots (`[1,,3]`) are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayNode {
    #[serde(flatten)]
    pub span: Span,
    pub items: Vec<Option<Value>>,
    /// One entry per item.
    pub items_location: Vec<ItemLocation>,
}

impl ArrayNode {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Key of an object property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PropertyKey {
    String(StringNode),
    Expression(ExpressionNode),
    Identifier(IdentifierNode),
}

impl PropertyKey {
    pub fn span(&self) -> Span {
        self.as_node().span()
    }

    pub fn as_node(&self) -> NodeRef<'_> {
        match self {
            PropertyKey::String(n) => NodeRef::String(n),
            PropertyKey::Expression(n) => NodeRef::Expression(n),
            PropertyKey::Identifier(n) => NodeRef::Identifier(n),
        }
    }
}

/// `key: value,` inside an object.
///
/// `value` is `None` when recovery skipped a malformed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyNode {
    #[serde(flatten)]
    pub span: Span,
    pub key: PropertyKey,
    pub value: Option<Value>,
    pub has_colon: bool,
    pub colon_start: Option<usize>,
    pub has_trailing_comma: bool,
    pub trailing_comma_start: Option<usize>,
}

/// An object literal. Property order follows the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectNode {
    #[serde(flatten)]
    pub span: Span,
    pub properties: Vec<PropertyNode>,
}

// ---------------------------------------------------------------------------
// Borrowed views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Comment,
    Identifier,
    Number,
    Boolean,
    Nullish,
    Expression,
    String,
    StringSegment,
    Array,
    Object,
    Property,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Comment => "comment",
            NodeKind::Identifier => "identifier",
            NodeKind::Number => "number",
            NodeKind::Boolean => "boolean",
            NodeKind::Nullish => "nullish",
            NodeKind::Expression => "expression",
            NodeKind::String => "string",
            NodeKind::StringSegment => "string-segment",
            NodeKind::Array => "array",
            NodeKind::Object => "object",
            NodeKind::Property => "object-property",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A borrowed reference to any node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'n> {
    Comment(&'n CommentNode),
    Identifier(&'n IdentifierNode),
    Number(&'n NumberNode),
    Boolean(&'n BooleanNode),
    Nullish(&'n NullishNode),
    Expression(&'n ExpressionNode),
    String(&'n StringNode),
    StringSegment(&'n StringSegmentNode),
    Array(&'n ArrayNode),
    Object(&'n ObjectNode),
    Property(&'n PropertyNode),
}

impl<'n> NodeRef<'n> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Comment(_) => NodeKind::Comment,
            NodeRef::Identifier(_) => NodeKind::Identifier,
            NodeRef::Number(_) => NodeKind::Number,
            NodeRef::Boolean(_) => NodeKind::Boolean,
            NodeRef::Nullish(_) => NodeKind::Nullish,
            NodeRef::Expression(_) => NodeKind::Expression,
            NodeRef::String(_) => NodeKind::String,
            NodeRef::StringSegment(_) => NodeKind::StringSegment,
            NodeRef::Array(_) => NodeKind::Array,
            NodeRef::Object(_) => NodeKind::Object,
            NodeRef::Property(_) => NodeKind::Property,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            NodeRef::Comment(n) => n.span,
            NodeRef::Identifier(n) => n.span,
            NodeRef::Number(n) => n.span,
            NodeRef::Boolean(n) => n.span,
            NodeRef::Nullish(n) => n.span,
            NodeRef::Expression(n) => n.span,
            NodeRef::String(n) => n.span,
            NodeRef::StringSegment(n) => n.span,
            NodeRef::Array(n) => n.span,
            NodeRef::Object(n) => n.span,
            NodeRef::Property(n) => n.span,
        }
    }

    /// Direct children in source order. Elided array slots are skipped.
    pub fn children(&self) -> Vec<NodeRef<'n>> {
        match *self {
            NodeRef::String(n) => n
                .segments
                .iter()
                .map(|part| match part {
                    StringPart::Segment(s) => NodeRef::StringSegment(s),
                    StringPart::Expression(e) => NodeRef::Expression(e),
                })
                .collect(),
            NodeRef::Array(n) => n.items.iter().flatten().map(Value::as_node).collect(),
            NodeRef::Object(n) => n.properties.iter().map(NodeRef::Property).collect(),
            NodeRef::Property(n) => std::iter::once(n.key.as_node())
                .chain(n.value.as_ref().map(Value::as_node))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl<'n> From<&'n Value> for NodeRef<'n> {
    fn from(value: &'n Value) -> Self {
        value.as_node()
    }
}
