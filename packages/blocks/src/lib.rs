//! Typed block tree for report documents
//!
//! A [`SerializedNode`](dossier_parser::SerializedNode) tree is classified
//! node by node through a [`DispatchTable`] and built bottom-up by a
//! [`TreeBuilder`] into [`Block`]s. Captioned blocks are numbered by a
//! [`FigureCounter`] shared across every build of one document.

pub mod asset;
mod attrs;
pub mod block;
pub mod builder;
pub mod classifier;
pub mod counter;
pub mod embed;
pub mod error;
pub mod fetch;
pub mod fields;
pub mod layout;
pub mod leaf;
pub mod options;

pub use asset::{AssetSource, Attachment, DataTable, Embed, Plot};
pub use block::{Block, BlockKind, BlockMeta, CaptionType, RefId};
pub use builder::{build_tree, TreeBuilder};
pub use classifier::{DispatchTable, Rule, StaticOptions, Variant};
pub use counter::FigureCounter;
pub use embed::{is_single_block_embed, is_single_leaf_path};
pub use error::{BuildError, BuildResult, FetchError, UnknownFieldError};
pub use fetch::{fetch_block_asset, fetcher_for, AssetPayload, FetchAsset, LocalAssets};
#[cfg(feature = "remote")]
pub use fetch::RemoteAssets;
pub use fields::{ControlsField, FieldKind, FieldValue, TemporalKind};
pub use layout::{
    validate_fields, Group, Interactive, Method, PageLayout, ParameterStore, Region, Select, SelectType, Submission,
    Toggle, UnknownMethod, View,
};
pub use leaf::{BigNumber, Code, Formula, Html, Text, Trend};
pub use options::{AssetMode, Mode, RenderOptions};

/// Id every root view carries, and the default Interactive target
pub const ROOT_ID: &str = "root";
