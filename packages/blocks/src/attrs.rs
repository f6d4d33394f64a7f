//! Typed reads of string attributes. Every failure names the attribute so
//! the caller sees which part of the document was malformed.

use crate::error::{BuildError, BuildResult};
use dossier_parser::SerializedNode;
use serde::de::DeserializeOwned;

pub(crate) fn required<'n>(node: &'n SerializedNode, key: &str) -> BuildResult<&'n str> {
    node.attr(key)
        .ok_or_else(|| BuildError::missing_attribute(node, key))
}

pub(crate) fn optional(node: &SerializedNode, key: &str) -> Option<String> {
    node.attr(key).map(str::to_string)
}

pub(crate) fn number(node: &SerializedNode, key: &str, raw: &str) -> BuildResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| BuildError::malformed_attribute(node, key, format!("expected a number, got {raw:?}")))
}

pub(crate) fn required_number(node: &SerializedNode, key: &str) -> BuildResult<f64> {
    number(node, key, required(node, key)?)
}

pub(crate) fn optional_number(node: &SerializedNode, key: &str) -> BuildResult<Option<f64>> {
    node.attr(key).map(|raw| number(node, key, raw)).transpose()
}

pub(crate) fn count(node: &SerializedNode, key: &str) -> BuildResult<u64> {
    let raw = required(node, key)?;
    raw.trim()
        .parse::<u64>()
        .map_err(|_| BuildError::malformed_attribute(node, key, format!("expected a count, got {raw:?}")))
}

/// Attribute holding a JSON literal, e.g. `required="true"` or
/// `choices='["a", "b"]'`
pub(crate) fn json<T: DeserializeOwned>(node: &SerializedNode, key: &str) -> BuildResult<Option<T>> {
    node.attr(key)
        .map(|raw| {
            serde_json::from_str(raw)
                .map_err(|e| BuildError::malformed_attribute(node, key, e.to_string()))
        })
        .transpose()
}

pub(crate) fn json_bool(node: &SerializedNode, key: &str, default: bool) -> BuildResult<bool> {
    Ok(json::<bool>(node, key)?.unwrap_or(default))
}

pub(crate) fn inner_text(node: &SerializedNode) -> BuildResult<String> {
    node.inner_text()
        .map(str::to_string)
        .ok_or_else(|| BuildError::missing_content(node))
}
