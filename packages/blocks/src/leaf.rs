use crate::attrs;
use crate::error::BuildResult;
use dossier_parser::SerializedNode;
use serde::Serialize;

/// Markdown prose
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub content: String,
    pub is_light_prose: bool,
}

impl Text {
    pub fn from_node(node: &SerializedNode, is_light_prose: bool) -> BuildResult<Self> {
        Ok(Self {
            content: attrs::inner_text(node)?,
            is_light_prose,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Code {
    pub code: String,
    pub language: Option<String>,
}

impl Code {
    pub fn from_node(node: &SerializedNode) -> BuildResult<Self> {
        Ok(Self {
            code: attrs::inner_text(node)?,
            language: attrs::optional(node, "language"),
        })
    }
}

/// Raw HTML shown inside a sandboxed frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Html {
    pub html: String,
    /// `allow-scripts` for public reports, none for organisation reports
    pub sandbox: Option<String>,
}

impl Html {
    pub fn from_node(node: &SerializedNode, is_org: bool) -> BuildResult<Self> {
        Ok(Self {
            html: attrs::inner_text(node)?,
            sandbox: (!is_org).then(|| "allow-scripts".to_string()),
        })
    }
}

/// TeX formula source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Formula {
    pub content: String,
}

impl Formula {
    pub fn from_node(node: &SerializedNode) -> BuildResult<Self> {
        Ok(Self {
            content: attrs::inner_text(node)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BigNumber {
    pub heading: Option<String>,
    pub value: Option<String>,
    pub trend: Option<Trend>,
}

/// Comparison against a previous value. Absent on "simple" big numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    pub prev_value: Option<String>,
    pub change: Option<String>,
    pub is_positive_intent: bool,
    pub is_upward_change: bool,
}

impl BigNumber {
    pub fn from_node(node: &SerializedNode) -> BuildResult<Self> {
        let prev_value = attrs::optional(node, "prev_value").filter(|v| !v.is_empty());
        let change = attrs::optional(node, "change").filter(|v| !v.is_empty());

        let trend = if prev_value.is_none() && change.is_none() {
            None
        } else {
            Some(Trend {
                prev_value,
                change,
                is_positive_intent: attrs::json_bool(node, "is_positive_intent", false)?,
                is_upward_change: attrs::json_bool(node, "is_upward_change", false)?,
            })
        };

        Ok(Self {
            heading: attrs::optional(node, "heading"),
            value: attrs::optional(node, "value"),
            trend,
        })
    }

    pub fn is_simple(&self) -> bool {
        self.trend.is_none()
    }
}
