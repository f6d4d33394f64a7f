//! Blocks whose payload lives outside the document and is fetched on demand
//! through [`crate::fetch`].

use crate::attrs;
use crate::error::BuildResult;
use dossier_parser::SerializedNode;
use serde::Serialize;

/// Tables above this many cells are loaded on request instead of on render
pub const DEFER_LOAD_CELLS: u64 = 500_000;

/// Opaque locator of an asset payload: a base64 data URI for local reports,
/// a URL for remote ones
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSource {
    pub src: String,
    pub media_type: Option<String>,
}

impl AssetSource {
    pub fn from_node(node: &SerializedNode) -> BuildResult<Self> {
        Ok(Self {
            src: attrs::required(node, "src")?.to_string(),
            media_type: attrs::optional(node, "type"),
        })
    }

    pub fn is_inline(&self) -> bool {
        self.src.starts_with("data:")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plot {
    pub source: AssetSource,
    pub responsive: bool,
    pub scale: f64,
}

impl Plot {
    pub fn from_node(node: &SerializedNode) -> BuildResult<Self> {
        Ok(Self {
            source: AssetSource::from_node(node)?,
            responsive: attrs::json_bool(node, "responsive", true)?,
            scale: attrs::optional_number(node, "scale")?.unwrap_or(1.0),
        })
    }
}

/// Downloadable file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub source: AssetSource,
    pub filename: Option<String>,
}

impl Attachment {
    pub fn from_node(node: &SerializedNode) -> BuildResult<Self> {
        Ok(Self {
            source: AssetSource::from_node(node)?,
            filename: attrs::optional(node, "filename"),
        })
    }
}

/// Third-party embed, carried as HTML
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Embed {
    pub source: Option<AssetSource>,
    pub html: String,
    pub is_iframe: bool,
}

impl Embed {
    pub fn from_node(node: &SerializedNode) -> BuildResult<Self> {
        let html = attrs::inner_text(node)?;
        let source = match node.attr("src") {
            Some(_) => Some(AssetSource::from_node(node)?),
            None => None,
        };

        Ok(Self {
            source,
            is_iframe: is_single_iframe(&html),
            html,
        })
    }
}

/// True when the markup is exactly one `<iframe>` element
fn is_single_iframe(html: &str) -> bool {
    let trimmed = html.trim();
    match dossier_parser::parse(trimmed) {
        Ok(root) => root.name.eq_ignore_ascii_case("iframe"),
        // Not well-formed XML, e.g. unquoted attributes
        Err(_) => {
            let lower = trimmed.to_ascii_lowercase();
            lower.starts_with("<iframe")
                && lower.ends_with("</iframe>")
                && lower.matches("<iframe").count() == 1
        }
    }
}

/// Arrow-backed data table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTable {
    pub source: AssetSource,
    pub rows: u64,
    pub columns: u64,
    pub schema: Option<String>,
    pub web_url: String,
}

impl DataTable {
    pub fn from_node(node: &SerializedNode, web_url: &str) -> BuildResult<Self> {
        Ok(Self {
            source: AssetSource::from_node(node)?,
            rows: attrs::count(node, "rows")?,
            columns: attrs::count(node, "columns")?,
            schema: attrs::optional(node, "schema"),
            web_url: web_url.to_string(),
        })
    }

    pub fn cells(&self) -> u64 {
        self.rows.saturating_mul(self.columns)
    }

    pub fn defer_load(&self) -> bool {
        self.cells() > DEFER_LOAD_CELLS
    }
}
