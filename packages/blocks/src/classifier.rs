//! Ordered dispatch from serialized nodes to block variants
//!
//! A [`DispatchTable`] is a list of rules checked top to bottom; the first
//! rule whose predicate matches decides the variant. Rule order is part of
//! the contract: a broad predicate placed above a narrower one captures the
//! narrower one's nodes.

use crate::block::CaptionType;
use crate::error::{BuildError, BuildResult};
use crate::fields::TemporalKind;
use crate::options::RenderOptions;
use dossier_parser::SerializedNode;
use tracing::trace;

/// Constructor a rule dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Text,
    Code,
    Html,
    Formula,
    BigNumber,
    Empty,
    Table,
    DataTable,
    Bokeh,
    Vega,
    Plotly,
    Svg,
    Folium,
    Plotapi,
    Media,
    Attachment,
    Embed,
    StringField,
    RangeField,
    TagsField,
    MultiSelectField,
    SwitchField,
    FileField,
    SelectField,
    TemporalField,
    Group,
    Select,
    Toggle,
    Interactive,
    View,
}

impl Variant {
    /// Layout variants have their children built before they are
    pub fn is_layout(self) -> bool {
        matches!(
            self,
            Variant::Group | Variant::Select | Variant::Toggle | Variant::Interactive | Variant::View
        )
    }

    pub fn is_field(self) -> bool {
        matches!(
            self,
            Variant::StringField
                | Variant::RangeField
                | Variant::TagsField
                | Variant::MultiSelectField
                | Variant::SwitchField
                | Variant::FileField
                | Variant::SelectField
                | Variant::TemporalField
        )
    }

    pub fn caption_type(self) -> CaptionType {
        match self {
            Variant::Table | Variant::DataTable => CaptionType::Table,
            Variant::Bokeh
            | Variant::Vega
            | Variant::Plotly
            | Variant::Svg
            | Variant::Folium
            | Variant::Plotapi => CaptionType::Plot,
            _ => CaptionType::Figure,
        }
    }
}

/// Per-rule options fixed when the table is built
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StaticOptions {
    #[default]
    None,
    Text { is_light_prose: bool },
    Html { is_org: bool },
    DataTable { web_url: String },
    Temporal(TemporalKind),
}

pub type Predicate = fn(&SerializedNode) -> bool;

pub struct Rule {
    pub name: &'static str,
    pub test: Predicate,
    pub variant: Variant,
    pub options: StaticOptions,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("variant", &self.variant)
            .field("options", &self.options)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct DispatchTable {
    rules: Vec<Rule>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(self, name: &'static str, test: Predicate, variant: Variant) -> Self {
        self.rule_with(name, test, variant, StaticOptions::None)
    }

    pub fn rule_with(
        mut self,
        name: &'static str,
        test: Predicate,
        variant: Variant,
        options: StaticOptions,
    ) -> Self {
        self.rules.push(Rule {
            name,
            test,
            variant,
            options,
        });
        self
    }

    /// Append a terminal rule matching every node. Classification with a
    /// fallback never fails.
    pub fn with_fallback(self, variant: Variant) -> Self {
        self.rule("fallback", |_| true, variant)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// First matching rule's variant and options
    pub fn classify(&self, node: &SerializedNode) -> BuildResult<(Variant, &StaticOptions)> {
        match self.rules.iter().find(|rule| (rule.test)(node)) {
            Some(rule) => {
                trace!(node = %node.name, rule = rule.name, variant = ?rule.variant, "classified node");
                Ok((rule.variant, &rule.options))
            }
            None => Err(BuildError::unrecognized(node)),
        }
    }

    /// Table for report documents. There is no catch-all: unknown tags fail
    /// to classify.
    pub fn standard(options: &RenderOptions) -> Self {
        Self::new()
            .rule_with(
                "markdown",
                predicates::is_markdown,
                Variant::Text,
                StaticOptions::Text {
                    is_light_prose: options.is_light_prose,
                },
            )
            .rule("bokeh", predicates::is_bokeh, Variant::Bokeh)
            .rule_with(
                "arrow-table",
                predicates::is_arrow_table,
                Variant::DataTable,
                StaticOptions::DataTable {
                    web_url: options.web_url.clone(),
                },
            )
            .rule("code", predicates::is_code, Variant::Code)
            .rule("vega", predicates::is_vega, Variant::Vega)
            .rule("plotly", predicates::is_plotly, Variant::Plotly)
            .rule("html-table", predicates::is_html_table, Variant::Table)
            .rule("svg", predicates::is_svg, Variant::Svg)
            .rule("formula", predicates::is_formula, Variant::Formula)
            .rule_with(
                "html",
                predicates::is_html,
                Variant::Html,
                StaticOptions::Html {
                    is_org: options.is_org,
                },
            )
            .rule("media", predicates::is_media, Variant::Media)
            .rule("embed", predicates::is_embed, Variant::Embed)
            .rule("folium", predicates::is_folium, Variant::Folium)
            .rule("plotapi", predicates::is_plotapi, Variant::Plotapi)
            .rule("big-number", predicates::is_big_number, Variant::BigNumber)
            .rule("empty", predicates::is_empty, Variant::Empty)
            .rule("interactive", predicates::is_interactive, Variant::Interactive)
            .rule("string-field", predicates::is_string_field, Variant::StringField)
            .rule("range-field", predicates::is_range_field, Variant::RangeField)
            .rule("tags-field", predicates::is_tags_field, Variant::TagsField)
            .rule("switch-field", predicates::is_switch_field, Variant::SwitchField)
            .rule("multi-select-field", predicates::is_multi_select_field, Variant::MultiSelectField)
            // Attachments share the <File> tag with file inputs and must win
            .rule("attachment", predicates::is_attachment, Variant::Attachment)
            .rule("file-field", predicates::is_file_field, Variant::FileField)
            .rule("select-field", predicates::is_select_field, Variant::SelectField)
            .rule_with(
                "datetime-field",
                predicates::is_datetime_field,
                Variant::TemporalField,
                StaticOptions::Temporal(TemporalKind::DateTime),
            )
            .rule_with(
                "date-field",
                predicates::is_date_field,
                Variant::TemporalField,
                StaticOptions::Temporal(TemporalKind::Date),
            )
            .rule_with(
                "time-field",
                predicates::is_time_field,
                Variant::TemporalField,
                StaticOptions::Temporal(TemporalKind::Time),
            )
            .rule("group", predicates::is_group, Variant::Group)
            .rule("view", predicates::is_view, Variant::View)
            .rule("select", predicates::is_select, Variant::Select)
            .rule("toggle", predicates::is_toggle, Variant::Toggle)
    }
}

/// Predicates used by the standard table
pub mod predicates {
    use dossier_parser::SerializedNode;

    pub const BOKEH_TYPE: &str = "application/vnd.bokeh.show+json";
    pub const VEGA_TYPE_PREFIX: &str = "application/vnd.vegalite.";
    pub const PLOTLY_TYPE: &str = "application/vnd.plotly.v1+json";
    pub const SVG_TYPE: &str = "image/svg+xml";
    pub const FOLIUM_TYPE: &str = "application/vnd.folium+html";
    pub const PLOTAPI_TYPE: &str = "application/vnd.plotapi+html";

    fn plot_type(node: &SerializedNode) -> Option<&str> {
        if node.is("Plot") {
            node.attr("type")
        } else {
            None
        }
    }

    pub fn is_markdown(node: &SerializedNode) -> bool {
        node.is("Text")
    }

    pub fn is_code(node: &SerializedNode) -> bool {
        node.is("Code")
    }

    pub fn is_html(node: &SerializedNode) -> bool {
        node.is("HTML")
    }

    pub fn is_formula(node: &SerializedNode) -> bool {
        node.is("Formula")
    }

    pub fn is_big_number(node: &SerializedNode) -> bool {
        node.is("BigNumber")
    }

    pub fn is_empty(node: &SerializedNode) -> bool {
        node.is("Empty")
    }

    pub fn is_bokeh(node: &SerializedNode) -> bool {
        plot_type(node) == Some(BOKEH_TYPE)
    }

    pub fn is_vega(node: &SerializedNode) -> bool {
        plot_type(node).is_some_and(|t| t.starts_with(VEGA_TYPE_PREFIX))
    }

    pub fn is_plotly(node: &SerializedNode) -> bool {
        plot_type(node) == Some(PLOTLY_TYPE)
    }

    pub fn is_svg(node: &SerializedNode) -> bool {
        plot_type(node) == Some(SVG_TYPE)
    }

    pub fn is_folium(node: &SerializedNode) -> bool {
        plot_type(node) == Some(FOLIUM_TYPE)
    }

    pub fn is_plotapi(node: &SerializedNode) -> bool {
        plot_type(node) == Some(PLOTAPI_TYPE)
    }

    pub fn is_arrow_table(node: &SerializedNode) -> bool {
        node.is("DataTable")
    }

    pub fn is_html_table(node: &SerializedNode) -> bool {
        node.is("Table")
    }

    pub fn is_media(node: &SerializedNode) -> bool {
        node.is("Media")
    }

    pub fn is_embed(node: &SerializedNode) -> bool {
        node.is("Embed")
    }

    pub fn is_attachment(node: &SerializedNode) -> bool {
        node.is("Attachment") || (node.is("File") && node.has_attr("src"))
    }

    pub fn is_interactive(node: &SerializedNode) -> bool {
        node.is("Interactive")
    }

    pub fn is_string_field(node: &SerializedNode) -> bool {
        node.is("String")
    }

    pub fn is_range_field(node: &SerializedNode) -> bool {
        node.is("Range")
    }

    pub fn is_tags_field(node: &SerializedNode) -> bool {
        node.is("Tags")
    }

    pub fn is_switch_field(node: &SerializedNode) -> bool {
        node.is("Switch")
    }

    pub fn is_multi_select_field(node: &SerializedNode) -> bool {
        node.is("MultiSelect")
    }

    pub fn is_file_field(node: &SerializedNode) -> bool {
        node.is("File")
    }

    pub fn is_select_field(node: &SerializedNode) -> bool {
        node.is("SelectField")
    }

    pub fn is_datetime_field(node: &SerializedNode) -> bool {
        node.is("DateTime")
    }

    pub fn is_date_field(node: &SerializedNode) -> bool {
        node.is("Date")
    }

    pub fn is_time_field(node: &SerializedNode) -> bool {
        node.is("Time")
    }

    pub fn is_group(node: &SerializedNode) -> bool {
        node.is("Group")
    }

    pub fn is_view(node: &SerializedNode) -> bool {
        node.is("View")
    }

    pub fn is_select(node: &SerializedNode) -> bool {
        node.is("Select")
    }

    pub fn is_toggle(node: &SerializedNode) -> bool {
        node.is("Toggle")
    }
}
