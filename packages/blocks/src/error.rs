use dossier_parser::SerializedNode;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

/// Failure to turn a serialized node into a typed block. Any of these abort
/// the build of the enclosing tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Unrecognized block type <{}>", node.name)]
    UnrecognizedBlockType { node: Box<SerializedNode> },

    #[error("Malformed attribute '{attribute}' on <{block}>: {reason}")]
    MalformedAttribute {
        block: String,
        attribute: String,
        reason: String,
    },

    #[error("<{block}> requires inner text or CDATA content")]
    MissingContent { block: String },

    #[error("Malformed <{block}>: {reason}")]
    MalformedNode { block: String, reason: String },

    #[error("Duplicate field name '{name}' in interactive region")]
    DuplicateField { name: String },
}

impl BuildError {
    pub fn unrecognized(node: &SerializedNode) -> Self {
        Self::UnrecognizedBlockType {
            node: Box::new(node.clone()),
        }
    }

    pub fn malformed_attribute(
        node: &SerializedNode,
        attribute: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedAttribute {
            block: node.name.clone(),
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_attribute(node: &SerializedNode, attribute: &str) -> Self {
        Self::malformed_attribute(node, attribute, "required attribute is missing")
    }

    pub fn missing_content(node: &SerializedNode) -> Self {
        Self::MissingContent {
            block: node.name.clone(),
        }
    }

    pub fn malformed_node(node: &SerializedNode, reason: impl Into<String>) -> Self {
        Self::MalformedNode {
            block: node.name.clone(),
            reason: reason.into(),
        }
    }
}

/// Setting a parameter that no field in the region declares
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown field '{field}'")]
pub struct UnknownFieldError {
    pub field: String,
}

/// Asset payload could not be fetched or decoded
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Block {block} has no fetchable asset")]
    NotAnAsset { block: String },

    #[error("Failed to decode asset payload: {0}")]
    Decode(String),

    #[error("Invalid JSON asset payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to fetch {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("Remote assets requested but this build has no `remote` feature")]
    RemoteDisabled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_block_and_attribute() {
        let node = SerializedNode::new("Range").with_attr("min", "low");
        let err = BuildError::malformed_attribute(&node, "min", "expected a number");
        assert_eq!(
            err.to_string(),
            "Malformed attribute 'min' on <Range>: expected a number"
        );

        let err = BuildError::unrecognized(&SerializedNode::new("Widget"));
        assert_eq!(err.to_string(), "Unrecognized block type <Widget>");
    }
}
