//! Reader for the xml-js "non-compact" JSON form of a report document
//!
//! ```json
//! { "elements": [
//!     { "type": "element", "name": "View", "elements": [
//!         { "type": "element", "name": "Text", "attributes": { "id": "t1" },
//!           "elements": [ { "type": "text", "text": "Hello" } ] }
//!     ] }
//! ] }
//! ```
//!
//! xml-js drops `attributes` and `elements` entirely when a tag has none,
//! so both are optional here and normalized to empty collections.

use crate::error::{ParseError, ParseResult};
use crate::node::{Attributes, SerializedNode};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawNode {
    Element {
        name: String,
        #[serde(default)]
        attributes: Option<Attributes>,
        #[serde(default)]
        elements: Option<Vec<RawNode>>,
    },
    Text {
        text: String,
    },
    Cdata {
        cdata: String,
    },
    #[serde(other)]
    Ignored,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    elements: Vec<RawNode>,
}

impl RawNode {
    fn into_node(self) -> Option<SerializedNode> {
        let RawNode::Element {
            name,
            attributes,
            elements,
        } = self
        else {
            return None;
        };

        let mut node = SerializedNode::new(name);
        node.attributes = attributes.unwrap_or_default();

        let mut text = String::new();
        let mut keep_text = false;

        for child in elements.unwrap_or_default() {
            match child {
                RawNode::Text { text: t } => {
                    keep_text |= !t.trim().is_empty();
                    text.push_str(&t);
                }
                RawNode::Cdata { cdata } => {
                    keep_text = true;
                    text.push_str(&cdata);
                }
                element @ RawNode::Element { .. } => {
                    if let Some(child) = element.into_node() {
                        node.children.push(child);
                    }
                }
                RawNode::Ignored => {}
            }
        }

        if keep_text {
            node.text = Some(text);
        }

        Some(node)
    }
}

/// Parse an xml-js JSON document. Accepts either the document wrapper
/// (`{"elements": [...]}`) or a bare element object.
pub fn from_json(source: &str) -> ParseResult<SerializedNode> {
    let value: serde_json::Value =
        serde_json::from_str(source).map_err(|e| ParseError::Json(e.to_string()))?;
    from_json_value(value)
}

pub fn from_json_value(value: serde_json::Value) -> ParseResult<SerializedNode> {
    let is_element = value.get("type").and_then(|t| t.as_str()) == Some("element");

    let root = if is_element {
        serde_json::from_value::<RawNode>(value)
            .map_err(|e| ParseError::Json(e.to_string()))?
            .into_node()
    } else {
        let doc: RawDocument =
            serde_json::from_value(value).map_err(|e| ParseError::Json(e.to_string()))?;
        doc.elements.into_iter().find_map(RawNode::into_node)
    };

    root.ok_or_else(|| ParseError::Json("document has no root element".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_wrapper() {
        let source = r#"{
            "declaration": {"attributes": {"version": "1.0"}},
            "elements": [
                {"type": "comment", "comment": "generated"},
                {"type": "element", "name": "View", "elements": [
                    {"type": "element", "name": "Text", "attributes": {"id": "t1"},
                     "elements": [{"type": "text", "text": "Hello"}]},
                    {"type": "element", "name": "Empty"}
                ]}
            ]
        }"#;

        let root = from_json(source).unwrap();
        assert_eq!(root.name, "View");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].attr("id"), Some("t1"));
        assert_eq!(root.children[0].inner_text(), Some("Hello"));
        assert!(root.children[1].attributes.is_empty());
    }

    #[test]
    fn test_bare_element_with_cdata() {
        let source = r#"{"type": "element", "name": "Code",
            "elements": [{"type": "cdata", "cdata": "x < y"}]}"#;
        let root = from_json(source).unwrap();
        assert_eq!(root.inner_text(), Some("x < y"));
    }

    #[test]
    fn test_no_root() {
        let err = from_json(r#"{"elements": []}"#).unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(from_json("{").unwrap_err(), ParseError::Json(_)));
    }
}
