//! Asset payload fetching
//!
//! Fetchers only move bytes. Turning those bytes into what a block's renderer
//! expects (UTF-8 text, a JSON document) is decided per block variant in
//! [`fetch_block_asset`].

use crate::block::{Block, BlockKind};
use crate::error::FetchError;
use crate::options::AssetMode;
use base64::Engine;
use serde_json::Value;
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq)]
pub enum AssetPayload {
    Text(String),
    Json(Value),
    Bytes(Vec<u8>),
}

impl AssetPayload {
    fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => AssetPayload::Text(text),
            Err(e) => AssetPayload::Bytes(e.into_bytes()),
        }
    }

    fn into_text(self) -> Result<String, FetchError> {
        match self {
            AssetPayload::Text(text) => Ok(text),
            AssetPayload::Json(Value::String(text)) => Ok(text),
            AssetPayload::Json(value) => Ok(value.to_string()),
            AssetPayload::Bytes(bytes) => {
                String::from_utf8(bytes).map_err(|e| FetchError::Decode(e.to_string()))
            }
        }
    }

    fn into_json(self) -> Result<Value, FetchError> {
        match self {
            AssetPayload::Json(value) => Ok(value),
            AssetPayload::Text(text) => Ok(serde_json::from_str(&text)?),
            AssetPayload::Bytes(bytes) => Ok(serde_json::from_slice(&bytes)?),
        }
    }

    /// One-line description for logs and the CLI
    pub fn describe(&self) -> String {
        match self {
            AssetPayload::Text(text) => format!("text, {} chars", text.chars().count()),
            AssetPayload::Json(Value::Object(map)) => format!("JSON object, {} keys", map.len()),
            AssetPayload::Json(Value::Array(items)) => format!("JSON array, {} items", items.len()),
            AssetPayload::Json(_) => "JSON scalar".to_string(),
            AssetPayload::Bytes(bytes) => format!("binary, {} bytes", bytes.len()),
        }
    }
}

/// Reads the raw payload behind an asset locator
pub trait FetchAsset {
    fn fetch(&self, src: &str) -> Result<AssetPayload, FetchError>;
}

/// Payloads inlined in the document as base64 data URIs
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAssets;

impl LocalAssets {
    pub fn decode(src: &str) -> Result<Vec<u8>, FetchError> {
        let (_, encoded) = src
            .split_once("base64,")
            .ok_or_else(|| FetchError::Decode("source is not a base64 data URI".to_string()))?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

impl FetchAsset for LocalAssets {
    fn fetch(&self, src: &str) -> Result<AssetPayload, FetchError> {
        Ok(AssetPayload::from_bytes(Self::decode(src)?))
    }
}

/// Payloads read over HTTP, with `src` as the URL
#[cfg(feature = "remote")]
#[derive(Debug, Clone)]
pub struct RemoteAssets {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "remote")]
impl RemoteAssets {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[cfg(feature = "remote")]
impl FetchAsset for RemoteAssets {
    fn fetch(&self, src: &str) -> Result<AssetPayload, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: src.to_string(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .get(src)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(transport)?;

        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("json"));

        let bytes = response.bytes().map_err(transport)?;
        if is_json {
            Ok(AssetPayload::Json(serde_json::from_slice(&bytes)?))
        } else {
            Ok(AssetPayload::from_bytes(bytes.to_vec()))
        }
    }
}

/// Fetcher for the configured asset mode
pub fn fetcher_for(mode: AssetMode) -> Result<Box<dyn FetchAsset>, FetchError> {
    match mode {
        AssetMode::Local => Ok(Box::new(LocalAssets)),
        #[cfg(feature = "remote")]
        AssetMode::Remote => Ok(Box::new(RemoteAssets::new()?)),
        #[cfg(not(feature = "remote"))]
        AssetMode::Remote => Err(FetchError::RemoteDisabled),
    }
}

/// Fetch a block's asset and post-process it for that block's renderer
#[instrument(level = "debug", skip_all, fields(block = block.kind_name(), id = block.id()))]
pub fn fetch_block_asset(block: &Block, fetcher: &dyn FetchAsset) -> Result<AssetPayload, FetchError> {
    let source = block.asset().ok_or_else(|| FetchError::NotAnAsset {
        block: block.id().unwrap_or(block.kind_name()).to_string(),
    })?;

    // SVGs are rendered straight from their locator
    if let BlockKind::Svg(_) = block.kind {
        return Ok(AssetPayload::Text(source.src.clone()));
    }

    let raw = fetcher.fetch(&source.src)?;
    let payload = match &block.kind {
        BlockKind::Table(_) => AssetPayload::Text(raw.into_text()?),
        BlockKind::Bokeh(_) | BlockKind::Vega(_) => AssetPayload::Json(raw.into_json()?),
        // Plotly figures are stored as a JSON string holding the JSON figure
        BlockKind::Plotly(_) => match raw.into_json()? {
            Value::String(inner) => AssetPayload::Json(serde_json::from_str(&inner)?),
            figure => AssetPayload::Json(figure),
        },
        _ => raw,
    };

    debug!(payload = %payload.describe(), "fetched asset");
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetSource, Plot};
    use crate::block::BlockMeta;
    use base64::engine::general_purpose::STANDARD;
    use serde_json::json;

    fn data_uri(payload: &[u8]) -> String {
        format!("data:application/octet-stream;base64,{}", STANDARD.encode(payload))
    }

    fn plot(src: String) -> Plot {
        Plot {
            source: AssetSource { src, media_type: None },
            responsive: true,
            scale: 1.0,
        }
    }

    fn block(kind: BlockKind) -> Block {
        Block::new(BlockMeta::with_id("a1"), kind)
    }

    #[test]
    fn test_local_decode_requires_data_uri() {
        assert!(matches!(LocalAssets::decode("https://example.com/a.json"), Err(FetchError::Decode(_))));
        assert_eq!(LocalAssets::decode(&data_uri(b"hi")).unwrap(), b"hi");
    }

    #[test]
    fn test_table_decodes_utf8() {
        let table = block(BlockKind::Table(AssetSource {
            src: data_uri("<table>€</table>".as_bytes()),
            media_type: Some("text/html".to_string()),
        }));
        let payload = fetch_block_asset(&table, &LocalAssets).unwrap();
        assert_eq!(payload, AssetPayload::Text("<table>€</table>".to_string()));
    }

    #[test]
    fn test_bokeh_decodes_json_once() {
        let bokeh = block(BlockKind::Bokeh(plot(data_uri(br#"{"doc": 1}"#))));
        let payload = fetch_block_asset(&bokeh, &LocalAssets).unwrap();
        assert_eq!(payload, AssetPayload::Json(json!({"doc": 1})));
    }

    #[test]
    fn test_plotly_decodes_json_twice() {
        let encoded = serde_json::to_string(r#"{"data": []}"#).unwrap();
        let plotly = block(BlockKind::Plotly(plot(data_uri(encoded.as_bytes()))));
        let payload = fetch_block_asset(&plotly, &LocalAssets).unwrap();
        assert_eq!(payload, AssetPayload::Json(json!({"data": []})));
    }

    #[test]
    fn test_svg_is_not_fetched() {
        struct Unreachable;
        impl FetchAsset for Unreachable {
            fn fetch(&self, _: &str) -> Result<AssetPayload, FetchError> {
                panic!("svg assets must not be fetched");
            }
        }

        let svg = block(BlockKind::Svg(plot("data:image/svg+xml;base64,PHN2Zy8+".to_string())));
        let payload = fetch_block_asset(&svg, &Unreachable).unwrap();
        assert_eq!(payload, AssetPayload::Text("data:image/svg+xml;base64,PHN2Zy8+".to_string()));
    }

    #[test]
    fn test_binary_media_stays_bytes() {
        let media = block(BlockKind::Media(AssetSource {
            src: data_uri(&[0xff, 0x00, 0xfe]),
            media_type: Some("image/png".to_string()),
        }));
        let payload = fetch_block_asset(&media, &LocalAssets).unwrap();
        assert_eq!(payload, AssetPayload::Bytes(vec![0xff, 0x00, 0xfe]));
    }

    #[test]
    fn test_non_asset_block() {
        let err = fetch_block_asset(&block(BlockKind::Empty), &LocalAssets).unwrap_err();
        assert!(matches!(err, FetchError::NotAnAsset { ref block } if block == "a1"));
    }

    #[test]
    fn test_invalid_json_payload() {
        let vega = block(BlockKind::Vega(plot(data_uri(b"not json"))));
        assert!(matches!(fetch_block_asset(&vega, &LocalAssets), Err(FetchError::Json(_))));
    }

    #[cfg(not(feature = "remote"))]
    #[test]
    fn test_remote_mode_without_feature() {
        assert!(matches!(fetcher_for(AssetMode::Remote), Err(FetchError::RemoteDisabled)));
    }
}
