//! Form inputs declared inside an Interactive region

use crate::attrs;
use crate::error::{BuildError, BuildResult};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use dossier_parser::SerializedNode;
use serde::{Deserialize, Serialize};

/// Value of one form field, as accumulated in a parameter store and sent with
/// a submission
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TemporalKind {
    Date,
    Time,
    DateTime,
}

impl TemporalKind {
    /// Display format in moment.js notation, as handed to the widget
    pub fn time_format(self) -> &'static str {
        match self {
            TemporalKind::Date => "YYYY-MM-DD",
            TemporalKind::Time => "HH:mm:ss",
            TemporalKind::DateTime => "YYYY-MM-DDTHH:mm:ss",
        }
    }

    /// HTML `<input type>` used for this kind
    pub fn input_type(self) -> &'static str {
        match self {
            TemporalKind::Date => "date",
            TemporalKind::Time => "time",
            TemporalKind::DateTime => "datetime-local",
        }
    }

    fn chrono_format(self) -> &'static str {
        match self {
            TemporalKind::Date => "%Y-%m-%d",
            TemporalKind::Time => "%H:%M:%S",
            TemporalKind::DateTime => "%Y-%m-%dT%H:%M:%S",
        }
    }

    pub fn format(self, at: NaiveDateTime) -> String {
        at.format(self.chrono_format()).to_string()
    }
}

/// Read a temporal initial value. Zoned timestamps are shown in local time,
/// naive ones as written. A bare time is placed on today's date.
fn parse_temporal(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(zoned) = DateTime::parse_from_rfc3339(raw) {
        return Some(zoned.with_timezone(&Local).naive_local());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    ["%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
        .map(|time| Local::now().date_naive().and_time(time))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldKind {
    String,
    Range { min: f64, max: f64, step: f64 },
    Tags,
    MultiSelect { choices: Vec<String> },
    Switch,
    File,
    Select { choices: Vec<String> },
    Temporal { kind: TemporalKind },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlsField {
    pub name: String,
    pub required: bool,
    pub help_text: Option<String>,
    pub initial_value: FieldValue,
    pub kind: FieldKind,
}

impl ControlsField {
    fn from_parts(node: &SerializedNode, kind: FieldKind, initial_value: FieldValue) -> BuildResult<Self> {
        Ok(Self {
            name: attrs::required(node, "name")?.to_string(),
            required: attrs::json_bool(node, "required", false)?,
            help_text: attrs::optional(node, "helpText"),
            initial_value,
            kind,
        })
    }

    pub fn string(node: &SerializedNode) -> BuildResult<Self> {
        let initial = attrs::optional(node, "initialValue").map(FieldValue::Text);
        Self::from_parts(node, FieldKind::String, initial.unwrap_or_default())
    }

    pub fn range(node: &SerializedNode) -> BuildResult<Self> {
        let kind = FieldKind::Range {
            min: attrs::required_number(node, "min")?,
            max: attrs::required_number(node, "max")?,
            step: attrs::required_number(node, "step")?,
        };
        let initial = attrs::optional_number(node, "initialValue")?.map(FieldValue::Number);
        Self::from_parts(node, kind, initial.unwrap_or_default())
    }

    pub fn tags(node: &SerializedNode) -> BuildResult<Self> {
        let initial = attrs::json::<Vec<String>>(node, "initialValue")?.map(FieldValue::List);
        Self::from_parts(node, FieldKind::Tags, initial.unwrap_or_default())
    }

    pub fn multi_select(node: &SerializedNode) -> BuildResult<Self> {
        let kind = FieldKind::MultiSelect {
            choices: choices(node)?,
        };
        let initial = attrs::json::<Vec<String>>(node, "initialValue")?.map(FieldValue::List);
        Self::from_parts(node, kind, initial.unwrap_or_default())
    }

    pub fn switch(node: &SerializedNode) -> BuildResult<Self> {
        let initial = attrs::json_bool(node, "initialValue", false)?;
        Self::from_parts(node, FieldKind::Switch, FieldValue::Bool(initial))
    }

    pub fn file(node: &SerializedNode) -> BuildResult<Self> {
        Self::from_parts(node, FieldKind::File, FieldValue::Null)
    }

    pub fn select(node: &SerializedNode) -> BuildResult<Self> {
        let kind = FieldKind::Select {
            choices: choices(node)?,
        };
        let initial = attrs::optional(node, "initialValue").map(FieldValue::Text);
        Self::from_parts(node, kind, initial.unwrap_or_default())
    }

    pub fn temporal(node: &SerializedNode, kind: TemporalKind) -> BuildResult<Self> {
        let at = match node.attr("initialValue") {
            Some(raw) => parse_temporal(raw).ok_or_else(|| {
                BuildError::malformed_attribute(node, "initialValue", format!("unrecognised date/time {raw:?}"))
            })?,
            None => Local::now().naive_local(),
        };
        Self::from_parts(node, FieldKind::Temporal { kind }, FieldValue::Text(kind.format(at)))
    }
}

fn choices(node: &SerializedNode) -> BuildResult<Vec<String>> {
    attrs::json::<Vec<String>>(node, "choices")?
        .ok_or_else(|| BuildError::missing_attribute(node, "choices"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_field() {
        let node = SerializedNode::new("Range")
            .with_attr("name", "range_field")
            .with_attr("initialValue", "4")
            .with_attr("min", "0")
            .with_attr("max", "10")
            .with_attr("step", "1");
        let field = ControlsField::range(&node).unwrap();
        assert_eq!(field.name, "range_field");
        assert_eq!(field.initial_value, FieldValue::Number(4.0));
        assert_eq!(field.kind, FieldKind::Range { min: 0.0, max: 10.0, step: 1.0 });
        assert!(!field.required);
    }

    #[test]
    fn test_range_requires_bounds() {
        let node = SerializedNode::new("Range").with_attr("name", "r").with_attr("min", "0");
        let err = ControlsField::range(&node).unwrap_err();
        assert!(matches!(err, BuildError::MalformedAttribute { ref attribute, .. } if attribute == "max"));
    }

    #[test]
    fn test_field_requires_name() {
        let err = ControlsField::string(&SerializedNode::new("String")).unwrap_err();
        assert!(matches!(err, BuildError::MalformedAttribute { ref attribute, .. } if attribute == "name"));
    }

    #[test]
    fn test_select_requires_choices() {
        let node = SerializedNode::new("SelectField").with_attr("name", "s");
        assert!(ControlsField::select(&node).is_err());

        let node = node.with_attr("choices", r#"["foo", "bar"]"#).with_attr("initialValue", "bar");
        let field = ControlsField::select(&node).unwrap();
        assert_eq!(field.initial_value, FieldValue::from("bar"));
    }

    #[test]
    fn test_switch_defaults_to_false() {
        let field = ControlsField::switch(&SerializedNode::new("Switch").with_attr("name", "s")).unwrap();
        assert_eq!(field.initial_value, FieldValue::Bool(false));
    }

    #[test]
    fn test_temporal_formats_naive_values() {
        let node = SerializedNode::new("DateTime")
            .with_attr("name", "when")
            .with_attr("initialValue", "2022-11-16T11:04:51");

        let dt = ControlsField::temporal(&node, TemporalKind::DateTime).unwrap();
        assert_eq!(dt.initial_value, FieldValue::from("2022-11-16T11:04:51"));

        let date = ControlsField::temporal(&node, TemporalKind::Date).unwrap();
        assert_eq!(date.initial_value, FieldValue::from("2022-11-16"));

        let time = ControlsField::temporal(&node, TemporalKind::Time).unwrap();
        assert_eq!(time.initial_value, FieldValue::from("11:04:51"));
    }

    #[test]
    fn test_temporal_absent_value_is_now() {
        let node = SerializedNode::new("Date").with_attr("name", "d");
        let field = ControlsField::temporal(&node, TemporalKind::Date).unwrap();
        let FieldValue::Text(text) = field.initial_value else {
            panic!("expected formatted text");
        };
        assert!(NaiveDate::parse_from_str(&text, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn test_temporal_rejects_garbage() {
        let node = SerializedNode::new("Date")
            .with_attr("name", "d")
            .with_attr("initialValue", "next tuesday");
        assert!(ControlsField::temporal(&node, TemporalKind::Date).is_err());
    }

    #[test]
    fn test_field_value_json_shape() {
        let values = vec![
            FieldValue::Null,
            FieldValue::from(true),
            FieldValue::from(7.0),
            FieldValue::from("x"),
            FieldValue::from(vec!["a".to_string()]),
        ];
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"[null,true,7.0,"x",["a"]]"#
        );
    }
}
