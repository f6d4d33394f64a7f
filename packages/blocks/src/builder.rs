//! Serialized node tree → typed block tree
//!
//! Layout nodes are built bottom-up: every child is fully built before its
//! parent is constructed around the finished child list. Any failure aborts
//! the whole build; there is no partially built tree.

use crate::asset::{AssetSource, Attachment, DataTable, Embed, Plot};
use crate::attrs;
use crate::block::{Block, BlockKind, BlockMeta};
use crate::classifier::{DispatchTable, StaticOptions, Variant};
use crate::counter::FigureCounter;
use crate::error::{BuildError, BuildResult};
use crate::fields::{ControlsField, TemporalKind};
use crate::layout::{Group, Interactive, Region, Select, Toggle, View};
use crate::leaf::{BigNumber, Code, Formula, Html, Text};
use crate::ROOT_ID;
use dossier_parser::SerializedNode;
use tracing::{debug, instrument};

/// Label of the wrapper element between an Interactive and its fields
pub const CONTROLS_WRAPPER: &str = "Controls";

pub struct TreeBuilder<'a> {
    table: &'a DispatchTable,
    counter: &'a mut FigureCounter,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(table: &'a DispatchTable, counter: &'a mut FigureCounter) -> Self {
        Self { table, counter }
    }

    #[instrument(level = "debug", skip_all, fields(root = %node.name, nodes = node.node_count()))]
    pub fn build(&mut self, node: &SerializedNode) -> BuildResult<Block> {
        let block = self.build_node(node, false)?;
        debug!(blocks = block.count(), "built block tree");
        Ok(block)
    }

    /// `fields_allowed` is set for the children of an Interactive region and
    /// of a fragment wrapper, the only places a controls field may appear
    fn build_node(&mut self, node: &SerializedNode, fields_allowed: bool) -> BuildResult<Block> {
        let table = self.table;
        let (variant, options) = table.classify(node)?;

        if variant.is_field() && !fields_allowed {
            return Err(BuildError::malformed_node(
                node,
                "controls fields are only allowed inside an Interactive region",
            ));
        }

        let child_nodes: &[SerializedNode] = if variant == Variant::Interactive {
            unwrap_controls(node)?
        } else {
            node.children.as_slice()
        };

        let children = if variant.is_layout() {
            let fields_allowed = match variant {
                Variant::Interactive => true,
                Variant::View => attrs::json_bool(node, "fragment", false)?,
                _ => false,
            };
            child_nodes
                .iter()
                .map(|child| self.build_node(child, fields_allowed))
                .collect::<BuildResult<Vec<_>>>()?
        } else {
            Vec::new()
        };

        let caption_type = variant.caption_type();
        let sequence_number = node
            .attr("caption")
            .map(|_| self.counter.next(caption_type));
        if let Some(n) = sequence_number {
            debug!(node = %node.name, %caption_type, number = n, "assigned caption number");
        }

        let mut meta = BlockMeta::from_node(node, caption_type, sequence_number);
        if variant == Variant::View {
            meta.id = Some(ROOT_ID.to_string());
        }

        let kind = construct(variant, node, options, children)?;
        Ok(Block::new(meta, kind))
    }
}

fn unwrap_controls(node: &SerializedNode) -> BuildResult<&[SerializedNode]> {
    if node.children.len() > 1 {
        return Err(BuildError::malformed_node(
            node,
            format!(
                "expected a single <{CONTROLS_WRAPPER}> wrapper, found {} children",
                node.children.len()
            ),
        ));
    }
    match node.children.first() {
        Some(wrapper) if wrapper.is(CONTROLS_WRAPPER) => Ok(&wrapper.children),
        // An Interactive without fields at all is accepted
        None => Ok(&[]),
        Some(other) => Err(BuildError::malformed_node(
            node,
            format!("expected a <{CONTROLS_WRAPPER}> wrapper, found <{}>", other.name),
        )),
    }
}

fn construct(
    variant: Variant,
    node: &SerializedNode,
    options: &StaticOptions,
    children: Vec<Block>,
) -> BuildResult<BlockKind> {
    let kind = match variant {
        Variant::Text => {
            let is_light_prose = matches!(options, StaticOptions::Text { is_light_prose: true });
            BlockKind::Text(Text::from_node(node, is_light_prose)?)
        }
        Variant::Code => BlockKind::Code(Code::from_node(node)?),
        Variant::Html => {
            let is_org = matches!(options, StaticOptions::Html { is_org: true });
            BlockKind::Html(Html::from_node(node, is_org)?)
        }
        Variant::Formula => BlockKind::Formula(Formula::from_node(node)?),
        Variant::BigNumber => BlockKind::BigNumber(BigNumber::from_node(node)?),
        Variant::Empty => BlockKind::Empty,

        Variant::Table => BlockKind::Table(AssetSource::from_node(node)?),
        Variant::DataTable => {
            let web_url = match options {
                StaticOptions::DataTable { web_url } => web_url.as_str(),
                _ => "",
            };
            BlockKind::DataTable(DataTable::from_node(node, web_url)?)
        }
        Variant::Bokeh => BlockKind::Bokeh(Plot::from_node(node)?),
        Variant::Vega => BlockKind::Vega(Plot::from_node(node)?),
        Variant::Plotly => BlockKind::Plotly(Plot::from_node(node)?),
        Variant::Svg => BlockKind::Svg(Plot::from_node(node)?),
        Variant::Folium => BlockKind::Folium(AssetSource::from_node(node)?),
        Variant::Plotapi => BlockKind::Plotapi(AssetSource::from_node(node)?),
        Variant::Media => BlockKind::Media(AssetSource::from_node(node)?),
        Variant::Attachment => BlockKind::Attachment(Attachment::from_node(node)?),
        Variant::Embed => BlockKind::Embed(Embed::from_node(node)?),

        Variant::StringField => BlockKind::Field(ControlsField::string(node)?),
        Variant::RangeField => BlockKind::Field(ControlsField::range(node)?),
        Variant::TagsField => BlockKind::Field(ControlsField::tags(node)?),
        Variant::MultiSelectField => BlockKind::Field(ControlsField::multi_select(node)?),
        Variant::SwitchField => BlockKind::Field(ControlsField::switch(node)?),
        Variant::FileField => BlockKind::Field(ControlsField::file(node)?),
        Variant::SelectField => BlockKind::Field(ControlsField::select(node)?),
        Variant::TemporalField => {
            let kind = match options {
                StaticOptions::Temporal(kind) => *kind,
                _ => TemporalKind::DateTime,
            };
            BlockKind::Field(ControlsField::temporal(node, kind)?)
        }

        Variant::Group => BlockKind::Group(Group::from_node(node, children)?),
        Variant::Select => BlockKind::Select(Select::from_node(node, children)?),
        Variant::Toggle => BlockKind::Toggle(Toggle {
            region: Region::new(children),
        }),
        Variant::Interactive => BlockKind::Interactive(Interactive::from_node(node, children)?),
        Variant::View => BlockKind::View(View::from_node(node, children)?),
    };

    Ok(kind)
}

/// Build a tree with a fresh counter, for callers that do not track
/// numbering across builds
pub fn build_tree(node: &SerializedNode, table: &DispatchTable) -> BuildResult<(Block, FigureCounter)> {
    let mut counter = FigureCounter::new();
    let block = TreeBuilder::new(table, &mut counter).build(node)?;
    Ok((block, counter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::CaptionType;
    use crate::fields::FieldValue;
    use crate::layout::Method;
    use crate::options::RenderOptions;
    use dossier_parser::parse;

    fn build(xml: &str) -> BuildResult<Block> {
        let table = DispatchTable::standard(&RenderOptions::default());
        build_tree(&parse(xml).unwrap(), &table).map(|(block, _)| block)
    }

    #[test]
    fn test_view_always_has_root_id() {
        let root = build(r#"<View id="custom"><Text id="t1">Hello</Text></View>"#).unwrap();
        assert_eq!(root.id(), Some("root"));
        assert_eq!(root.children()[0].id(), Some("t1"));
        assert_eq!(root.children()[0].kind_name(), "Text");
    }

    #[test]
    fn test_children_are_numbered_before_parent() {
        let root = build(
            r#"<View>
                <Group caption="outer">
                    <Media caption="inner" src="https://example.com/a.png" type="image/png"/>
                </Group>
                <Table caption="t" src="https://example.com/t.html"/>
            </View>"#,
        )
        .unwrap();

        let group = &root.children()[0];
        assert_eq!(group.children()[0].meta.sequence_number, Some(1));
        assert_eq!(group.meta.sequence_number, Some(2));

        let table = &root.children()[1];
        assert_eq!(table.meta.caption_type, CaptionType::Table);
        assert_eq!(table.meta.sequence_number, Some(1));
        assert_eq!(root.meta.sequence_number, None);
    }

    #[test]
    fn test_interactive_unwraps_controls() {
        let root = build(
            r#"<View>
                <Interactive target="t1" method="replace" id="c1">
                    <Controls>
                        <Range name="range_field" initialValue="4" min="0" max="10" step="1"/>
                        <Switch name="switch_field" initialValue="true"/>
                    </Controls>
                </Interactive>
            </View>"#,
        )
        .unwrap();

        let interactive = root.children()[0].as_interactive().unwrap();
        assert_eq!(interactive.target, "t1");
        assert_eq!(interactive.method, Method::Swap);
        assert_eq!(interactive.region.len(), 2);
        assert_eq!(
            interactive.parameters.get("switch_field"),
            Some(&FieldValue::Bool(true))
        );
    }

    #[test]
    fn test_interactive_without_wrapper_is_malformed() {
        let err = build(r#"<View><Interactive><String name="s"/></Interactive></View>"#).unwrap_err();
        assert!(matches!(err, BuildError::MalformedNode { ref block, .. } if block == "Interactive"));
    }

    #[test]
    fn test_content_after_controls_is_malformed() {
        let err = build(
            r#"<View>
                <Interactive id="c1">
                    <Controls><String name="s"/></Controls>
                    <Text id="lost">x</Text>
                </Interactive>
            </View>"#,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::MalformedNode { ref block, .. } if block == "Interactive"));
    }

    #[test]
    fn test_field_outside_interactive_is_malformed() {
        let err = build(r#"<View><String name="x"/></View>"#).unwrap_err();
        assert!(matches!(err, BuildError::MalformedNode { ref block, .. } if block == "String"));

        let err = build(
            r#"<View><Group><Range name="r" min="0" max="1" step="1"/></Group></View>"#,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::MalformedNode { ref block, .. } if block == "Range"));

        // Nesting a layout inside an Interactive does not extend the allowance
        let err = build(
            r#"<View><Interactive><Controls><Group><Switch name="s"/></Group></Controls></Interactive></View>"#,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::MalformedNode { .. }));
    }

    #[test]
    fn test_fragment_wrapper_may_carry_fields() {
        let root = build(r#"<View fragment="true"><Switch name="s"/></View>"#).unwrap();
        assert!(root.children()[0].as_field().is_some());
    }

    #[test]
    fn test_unrecognized_child_aborts_build() {
        let err = build(r#"<View><Group><Text>a</Text><Widget/></Group></View>"#).unwrap_err();
        assert!(matches!(err, BuildError::UnrecognizedBlockType { ref node } if node.name == "Widget"));
    }

    #[test]
    fn test_malformed_attribute_names_attribute() {
        let err = build(r#"<View><Plot type="application/vnd.bokeh.show+json" src="x" scale="big"/></View>"#)
            .unwrap_err();
        assert!(matches!(err, BuildError::MalformedAttribute { ref attribute, .. } if attribute == "scale"));
    }

    #[test]
    fn test_counter_carries_across_builds() {
        let table = DispatchTable::standard(&RenderOptions::default());
        let mut counter = FigureCounter::new();
        let node = parse(r#"<View><BigNumber caption="a" heading="h" value="1"/></View>"#).unwrap();

        let first = TreeBuilder::new(&table, &mut counter).build(&node).unwrap();
        let second = TreeBuilder::new(&table, &mut counter).build(&node).unwrap();
        assert_eq!(first.children()[0].meta.sequence_number, Some(1));
        assert_eq!(second.children()[0].meta.sequence_number, Some(2));
    }
}
