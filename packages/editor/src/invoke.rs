//! # Invocation protocol
//!
//! An Interactive region's submission is sent to an [`Invoke`]
//! implementation, which answers with a serialized fragment: a
//! `<View fragment="true">` wrapping the blocks to splice in. How the call
//! reaches a server is up to the implementation.

use dossier_blocks::{FieldValue, Method};
use std::collections::BTreeMap;

pub type Parameters = BTreeMap<String, FieldValue>;

/// Failure reported by an invocation backend
pub type InvokeError = Box<dyn std::error::Error + Send + Sync>;

pub trait Invoke {
    /// Run the remote method for `target`/`method` with the region's current
    /// parameters and return the response document
    fn invoke(&self, target: &str, method: Method, parameters: &Parameters) -> Result<String, InvokeError>;
}

impl<F> Invoke for F
where
    F: Fn(&str, Method, &Parameters) -> Result<String, InvokeError>,
{
    fn invoke(&self, target: &str, method: Method, parameters: &Parameters) -> Result<String, InvokeError> {
        self(target, method, parameters)
    }
}

/// Answers every invocation by filling `${name}` placeholders of a fixed
/// response document with the submitted parameters. Unknown placeholders
/// are left as written.
#[derive(Debug, Clone)]
pub struct TemplateInvoker {
    template: String,
}

impl TemplateInvoker {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn render(&self, parameters: &Parameters) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let name = &after[..end];
                    match parameters.get(name) {
                        Some(value) => out.push_str(&escape_xml(&placeholder_text(value))),
                        None => out.push_str(&rest[start..start + 2 + end + 1]),
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }

        out.push_str(rest);
        out
    }
}

impl Invoke for TemplateInvoker {
    fn invoke(&self, _target: &str, _method: Method, parameters: &Parameters) -> Result<String, InvokeError> {
        Ok(self.render(parameters))
    }
}

fn placeholder_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => String::new(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Number(n) => n.to_string(),
        FieldValue::Text(s) => s.clone(),
        FieldValue::List(items) => items.join(", "),
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_substitution() {
        let invoker = TemplateInvoker::new(r#"<BigNumber heading="${who}" value="${n}" other="${missing}"/>"#);
        let mut params = Parameters::new();
        params.insert("who".to_string(), FieldValue::from("A & B"));
        params.insert("n".to_string(), FieldValue::from(7.0));

        assert_eq!(
            invoker.render(&params),
            r#"<BigNumber heading="A &amp; B" value="7" other="${missing}"/>"#
        );
    }

    #[test]
    fn test_single_quoted_attribute_substitution() {
        let invoker = TemplateInvoker::new("<View fragment='true'><BigNumber heading='${who}' value='1'/></View>");
        let mut params = Parameters::new();
        params.insert("who".to_string(), FieldValue::from("O'Brien \"Q1\""));

        let rendered = invoker.render(&params);
        assert_eq!(
            rendered,
            "<View fragment='true'><BigNumber heading='O&apos;Brien &quot;Q1&quot;' value='1'/></View>"
        );
        let node = dossier_parser::parse(&rendered).unwrap();
        assert_eq!(node.children[0].attr("heading"), Some("O'Brien \"Q1\""));
    }

    #[test]
    fn test_unterminated_placeholder_is_kept() {
        let invoker = TemplateInvoker::new("value ${oops");
        assert_eq!(invoker.render(&Parameters::new()), "value ${oops");
    }

    #[test]
    fn test_closure_invoker() {
        let invoker = |target: &str, method: Method, _: &Parameters| -> Result<String, InvokeError> {
            Ok(format!("{target}:{method}"))
        };
        assert_eq!(invoker.invoke("root", Method::Append, &Parameters::new()).unwrap(), "root:append");
    }
}
