use crate::asset::{AssetSource, Attachment, DataTable, Embed, Plot};
use crate::fields::ControlsField;
use crate::layout::{Group, Interactive, Region, Select, Toggle, View};
use crate::leaf::{BigNumber, Code, Formula, Html, Text};
use dossier_parser::SerializedNode;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Process-unique identity of a block, minted at construction. Presentation
/// layers key on it; it is never derived from document content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RefId(Uuid);

impl RefId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RefId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which sequence a captioned block is numbered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CaptionType {
    #[default]
    Figure,
    Table,
    Plot,
}

impl fmt::Display for CaptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Attributes every block carries regardless of variant
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMeta {
    pub ref_id: RefId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub caption_type: CaptionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u32>,
}

impl BlockMeta {
    pub fn from_node(node: &SerializedNode, caption_type: CaptionType, sequence_number: Option<u32>) -> Self {
        Self {
            ref_id: RefId::new(),
            id: node.attr("id").map(str::to_string),
            label: node.attr("label").map(str::to_string),
            caption: node.attr("caption").map(str::to_string),
            caption_type,
            sequence_number,
        }
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }
}

/// The closed set of block variants. Each carries only its own fields;
/// layout variants own a [`Region`] of children.
#[derive(Debug, Serialize)]
#[serde(tag = "block", content = "props")]
pub enum BlockKind {
    Text(Text),
    Code(Code),
    #[serde(rename = "HTML")]
    Html(Html),
    Formula(Formula),
    BigNumber(BigNumber),
    Empty,

    Table(AssetSource),
    DataTable(DataTable),
    Bokeh(Plot),
    Vega(Plot),
    Plotly(Plot),
    #[serde(rename = "SVG")]
    Svg(Plot),
    Folium(AssetSource),
    Plotapi(AssetSource),
    Media(AssetSource),
    Attachment(Attachment),
    Embed(Embed),

    Field(ControlsField),

    Group(Group),
    Select(Select),
    Toggle(Toggle),
    Interactive(Interactive),
    View(View),
}

#[derive(Debug, Serialize)]
pub struct Block {
    #[serde(flatten)]
    pub meta: BlockMeta,
    #[serde(flatten)]
    pub kind: BlockKind,
}

impl Block {
    pub fn new(meta: BlockMeta, kind: BlockKind) -> Self {
        Self { meta, kind }
    }

    pub fn ref_id(&self) -> RefId {
        self.meta.ref_id
    }

    pub fn id(&self) -> Option<&str> {
        self.meta.id.as_deref()
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            BlockKind::Text(_) => "Text",
            BlockKind::Code(_) => "Code",
            BlockKind::Html(_) => "HTML",
            BlockKind::Formula(_) => "Formula",
            BlockKind::BigNumber(_) => "BigNumber",
            BlockKind::Empty => "Empty",
            BlockKind::Table(_) => "Table",
            BlockKind::DataTable(_) => "DataTable",
            BlockKind::Bokeh(_) => "Bokeh",
            BlockKind::Vega(_) => "Vega",
            BlockKind::Plotly(_) => "Plotly",
            BlockKind::Svg(_) => "SVG",
            BlockKind::Folium(_) => "Folium",
            BlockKind::Plotapi(_) => "Plotapi",
            BlockKind::Media(_) => "Media",
            BlockKind::Attachment(_) => "Attachment",
            BlockKind::Embed(_) => "Embed",
            BlockKind::Field(_) => "Field",
            BlockKind::Group(_) => "Group",
            BlockKind::Select(_) => "Select",
            BlockKind::Toggle(_) => "Toggle",
            BlockKind::Interactive(_) => "Interactive",
            BlockKind::View(_) => "View",
        }
    }

    pub fn region(&self) -> Option<&Region> {
        match &self.kind {
            BlockKind::Group(b) => Some(&b.region),
            BlockKind::Select(b) => Some(&b.region),
            BlockKind::Toggle(b) => Some(&b.region),
            BlockKind::Interactive(b) => Some(&b.region),
            BlockKind::View(b) => Some(&b.region),
            _ => None,
        }
    }

    pub fn region_mut(&mut self) -> Option<&mut Region> {
        match &mut self.kind {
            BlockKind::Group(b) => Some(&mut b.region),
            BlockKind::Select(b) => Some(&mut b.region),
            BlockKind::Toggle(b) => Some(&mut b.region),
            BlockKind::Interactive(b) => Some(&mut b.region),
            BlockKind::View(b) => Some(&mut b.region),
            _ => None,
        }
    }

    pub fn is_layout(&self) -> bool {
        self.region().is_some()
    }

    /// Direct children; empty for anything that is not a layout block
    pub fn children(&self) -> &[Block] {
        self.region().map(Region::children).unwrap_or(&[])
    }

    pub fn asset(&self) -> Option<&AssetSource> {
        match &self.kind {
            BlockKind::Table(s)
            | BlockKind::Folium(s)
            | BlockKind::Plotapi(s)
            | BlockKind::Media(s) => Some(s),
            BlockKind::DataTable(t) => Some(&t.source),
            BlockKind::Bokeh(p) | BlockKind::Vega(p) | BlockKind::Plotly(p) | BlockKind::Svg(p) => {
                Some(&p.source)
            }
            BlockKind::Attachment(a) => Some(&a.source),
            BlockKind::Embed(e) => e.source.as_ref(),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&ControlsField> {
        match &self.kind {
            BlockKind::Field(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_interactive(&self) -> Option<&Interactive> {
        match &self.kind {
            BlockKind::Interactive(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_interactive_mut(&mut self) -> Option<&mut Interactive> {
        match &mut self.kind {
            BlockKind::Interactive(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_view(&self) -> Option<&View> {
        match &self.kind {
            BlockKind::View(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_view_mut(&mut self) -> Option<&mut View> {
        match &mut self.kind {
            BlockKind::View(v) => Some(v),
            _ => None,
        }
    }

    /// First block in left-to-right pre-order carrying `id`
    pub fn find_by_id(&self, id: &str) -> Option<&Block> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find_by_id(id))
    }

    pub fn find_by_ref(&self, ref_id: RefId) -> Option<&Block> {
        if self.ref_id() == ref_id {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find_by_ref(ref_id))
    }

    pub fn find_by_ref_mut(&mut self, ref_id: RefId) -> Option<&mut Block> {
        if self.ref_id() == ref_id {
            return Some(self);
        }
        self.region_mut()?
            .children_mut()
            .iter_mut()
            .find_map(|c| c.find_by_ref_mut(ref_id))
    }

    /// Visit every block in pre-order along with its depth below `self`
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Block, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a Block, usize)) {
        visit(self, depth);
        for child in self.children() {
            child.walk_at(depth + 1, visit);
        }
    }

    /// Number of blocks in this subtree, including self
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(Block::count).sum::<usize>()
    }
}
