use serde::{Deserialize, Serialize};

/// Presentation mode the document is being rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    #[default]
    View,
    /// Rendered inside an iframe on a third-party page
    Embed,
}

/// Where asset payloads are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetMode {
    /// Payloads are inlined as base64 data URIs in each block's `src`
    #[default]
    Local,
    /// `src` is a URL fetched over HTTP
    Remote,
}

/// Options supplied by whoever hosts the report. The standard dispatch table
/// derives its per-rule static options from these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    pub mode: Mode,
    pub is_light_prose: bool,
    pub web_url: String,
    pub is_org: bool,
    pub assets: AssetMode,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            mode: Mode::View,
            is_light_prose: false,
            web_url: String::new(),
            is_org: false,
            assets: AssetMode::Local,
        }
    }
}

impl RenderOptions {
    pub fn embed(mut self) -> Self {
        self.mode = Mode::Embed;
        self
    }

    pub fn with_assets(mut self, assets: AssetMode) -> Self {
        self.assets = assets;
        self
    }
}
