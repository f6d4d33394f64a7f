//! Layout blocks and the region store each of them owns

use crate::attrs;
use crate::block::{Block, BlockKind};
use crate::error::{BuildError, BuildResult, UnknownFieldError};
use crate::fields::FieldValue;
use dossier_parser::SerializedNode;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Ordered children of a layout block plus the index of the selected tab.
///
/// Tabs only matter to `Select`, but every region tracks the index so that a
/// structural edit keeps the current selection pointing at the same child.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    children: Vec<Block>,
    tab: usize,
}

impl Region {
    pub fn new(children: Vec<Block>) -> Self {
        Self { children, tab: 0 }
    }

    pub fn children(&self) -> &[Block] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Block] {
        &mut self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn tab(&self) -> usize {
        self.tab
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.children.iter().position(|c| c.id() == Some(id))
    }

    pub fn prepend(&mut self, blocks: Vec<Block>) {
        let inserted = blocks.len();
        self.children.splice(0..0, blocks);
        self.tab += inserted;
    }

    pub fn append(&mut self, blocks: Vec<Block>) {
        self.children.extend(blocks);
    }

    /// Replace the child at `idx` with zero or more blocks, returning the
    /// removed child. Out of range indices leave the region untouched.
    pub fn swap(&mut self, idx: usize, blocks: Vec<Block>) -> Option<Block> {
        if idx >= self.children.len() {
            return None;
        }

        let inserted = blocks.len();
        let removed = self.children.splice(idx..=idx, blocks).next();

        if idx < self.tab {
            self.tab = self.tab + inserted - 1;
        }
        self.clamp_tab();
        removed
    }

    pub fn set_tab(&mut self, n: usize) {
        self.tab = n;
        self.clamp_tab();
    }

    fn clamp_tab(&mut self) {
        self.tab = self.tab.min(self.children.len().saturating_sub(1));
    }

    pub fn into_children(self) -> Vec<Block> {
        self.children
    }
}

/// How a submission's response is spliced into the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Insert at the start of the target container
    Prepend,
    /// Insert at the end of the target container
    Append,
    /// Replace the target block in its parent's child list
    Swap,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown method '{0}', expected prepend, append or swap")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prepend" | "insert-before" => Ok(Method::Prepend),
            "append" | "insert-after" => Ok(Method::Append),
            "swap" | "replace" => Ok(Method::Swap),
            other => Err(UnknownMethod(other.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Prepend => "prepend",
            Method::Append => "append",
            Method::Swap => "swap",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Serialize)]
pub struct Group {
    pub columns: u32,
    pub region: Region,
}

impl Group {
    pub fn from_node(node: &SerializedNode, children: Vec<Block>) -> BuildResult<Self> {
        let columns = match attrs::optional_number(node, "columns")? {
            None => 1,
            Some(c) if c >= 1.0 && c.fract() == 0.0 && c <= f64::from(u32::MAX) => c as u32,
            Some(c) => {
                return Err(BuildError::malformed_attribute(
                    node,
                    "columns",
                    format!("expected a positive whole number, got {c}"),
                ))
            }
        };

        Ok(Self {
            columns,
            region: Region::new(children),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectType {
    #[default]
    Tabs,
    Dropdown,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Select {
    pub select_type: SelectType,
    pub layout: Option<String>,
    pub region: Region,
}

impl Select {
    pub fn from_node(node: &SerializedNode, children: Vec<Block>) -> BuildResult<Self> {
        let select_type = match node.attr("type") {
            None | Some("tabs") => SelectType::Tabs,
            Some("dropdown") => SelectType::Dropdown,
            Some(other) => {
                return Err(BuildError::malformed_attribute(
                    node,
                    "type",
                    format!("expected tabs or dropdown, got {other:?}"),
                ))
            }
        };

        Ok(Self {
            select_type,
            layout: attrs::optional(node, "layout"),
            region: Region::new(children),
        })
    }
}

/// Collapsible section. Its title is the block's `label`.
#[derive(Debug, Serialize)]
pub struct Toggle {
    pub region: Region,
}

/// Current parameter values of an Interactive region, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterStore {
    values: BTreeMap<String, FieldValue>,
}

impl ParameterStore {
    /// Seed with every field's initial value
    pub fn seed(fields: &[Block]) -> Self {
        let values = fields
            .iter()
            .filter_map(Block::as_field)
            .map(|f| (f.name.clone(), f.initial_value.clone()))
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<(), UnknownFieldError> {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(UnknownFieldError {
                field: name.to_string(),
            }),
        }
    }

    pub fn values(&self) -> &BTreeMap<String, FieldValue> {
        &self.values
    }

    /// Track a changed field list: keep values of fields that are still
    /// declared, seed new ones and drop the rest
    pub fn sync(&mut self, fields: &[Block]) {
        let mut next = Self::seed(fields);
        for (name, value) in next.values.iter_mut() {
            if let Some(current) = self.values.get(name) {
                *value = current.clone();
            }
        }
        *self = next;
    }
}

/// Everything the invocation collaborator needs to run one submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub target: String,
    pub method: Method,
    pub parameters: BTreeMap<String, FieldValue>,
}

/// Form region whose submission updates another part of the document
#[derive(Debug, Serialize)]
pub struct Interactive {
    pub target: String,
    pub method: Method,
    pub region: Region,
    pub parameters: ParameterStore,
}

impl Interactive {
    pub fn from_node(node: &SerializedNode, fields: Vec<Block>) -> BuildResult<Self> {
        let target = node.attr("target").unwrap_or(crate::ROOT_ID).to_string();
        let method = match node.attr("method") {
            None => Method::Append,
            Some(raw) => raw
                .parse()
                .map_err(|e: UnknownMethod| BuildError::malformed_attribute(node, "method", e.to_string()))?,
        };

        validate_fields(&fields)?;

        Ok(Self {
            target,
            method,
            parameters: ParameterStore::seed(&fields),
            region: Region::new(fields),
        })
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), UnknownFieldError> {
        self.parameters.set(name, value.into())
    }

    pub fn submission(&self) -> Submission {
        Submission {
            target: self.target.clone(),
            method: self.method,
            parameters: self.parameters.values().clone(),
        }
    }
}

/// Check that `blocks` can make up one Interactive region: controls fields
/// only, and no field name twice
pub fn validate_fields<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> BuildResult<()> {
    let mut seen = BTreeSet::new();
    for block in blocks {
        let Some(field) = block.as_field() else {
            return Err(BuildError::MalformedNode {
                block: "Interactive".to_string(),
                reason: format!("expected only controls fields, found {}", block.kind_name()),
            });
        };
        if !seen.insert(field.name.as_str()) {
            return Err(BuildError::DuplicateField {
                name: field.name.clone(),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageLayout {
    Top,
    Side,
}

/// Report root. A `fragment` view only wraps the blocks of an update
/// response and is never attached itself.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub layout: Option<PageLayout>,
    pub fragment: bool,
    pub region: Region,
}

impl View {
    pub fn from_node(node: &SerializedNode, children: Vec<Block>) -> BuildResult<Self> {
        let layout = match node.attr("layout") {
            None => None,
            Some("top") => Some(PageLayout::Top),
            Some("side") => Some(PageLayout::Side),
            Some(other) => {
                return Err(BuildError::malformed_attribute(
                    node,
                    "layout",
                    format!("expected top or side, got {other:?}"),
                ))
            }
        };

        Ok(Self {
            layout,
            fragment: attrs::json_bool(node, "fragment", false)?,
            region: Region::new(children),
        })
    }

    /// Explicit layout, else side navigation for pages with many blocks
    pub fn resolved_layout(&self) -> PageLayout {
        self.layout.unwrap_or(if self.region.len() > 5 {
            PageLayout::Side
        } else {
            PageLayout::Top
        })
    }

    pub fn has_pages(&self) -> bool {
        matches!(self.region.children(), [only] if matches!(only.kind, BlockKind::Select(_)))
    }
}
