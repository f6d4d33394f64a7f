use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute map of a serialized node. Values are always strings; typed
/// parsing is left to whoever consumes the node.
pub type Attributes = BTreeMap<String, String>;

/// Generic labelled tree node, the shape every report document is read into
/// before it is classified into typed blocks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SerializedNode {
    pub name: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SerializedNode>,
    /// Concatenated text and CDATA content. Whitespace-only text between
    /// child elements is not kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl SerializedNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: SerializedNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = SerializedNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// First direct child with the given name
    pub fn child(&self, name: &str) -> Option<&SerializedNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn inner_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }
}
