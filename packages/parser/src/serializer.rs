use crate::node::SerializedNode;

/// Serializer writes a serialized node tree back out as XML.
///
/// Attribute order follows the (sorted) attribute map, and whitespace is
/// normalised to one element per line. An element with text is written on a
/// single line together with its children. Text content is written verbatim
/// apart from escaping, so inner text survives a round trip.
pub struct Serializer {
    indent_level: usize,
    indent_string: String,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_string: "  ".to_string(),
        }
    }

    pub fn with_indent(indent: &str) -> Self {
        Self {
            indent_level: 0,
            indent_string: indent.to_string(),
        }
    }

    pub fn serialize(&mut self, node: &SerializedNode) -> String {
        let mut output = String::new();
        self.serialize_node(node, &mut output);
        output
    }

    fn serialize_node(&mut self, node: &SerializedNode, output: &mut String) {
        output.push_str(&self.indent());

        // Indenting inside mixed content would add whitespace to the text
        if node.text.is_some() {
            write_inline(node, output);
            output.push('\n');
            return;
        }

        open_tag(node, output);
        if node.children.is_empty() {
            output.push_str("/>\n");
            return;
        }

        output.push_str(">\n");
        self.indent_level += 1;
        for child in &node.children {
            self.serialize_node(child, output);
        }
        self.indent_level -= 1;

        output.push_str(&self.indent());
        close_tag(node, output);
        output.push('\n');
    }

    fn indent(&self) -> String {
        self.indent_string.repeat(self.indent_level)
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

fn open_tag(node: &SerializedNode, output: &mut String) {
    output.push('<');
    output.push_str(&node.name);
    for (key, value) in &node.attributes {
        output.push(' ');
        output.push_str(key);
        output.push_str("=\"");
        output.push_str(&escape_attr(value));
        output.push('"');
    }
}

fn close_tag(node: &SerializedNode, output: &mut String) {
    output.push_str("</");
    output.push_str(&node.name);
    output.push('>');
}

/// Write a node and its subtree on one line, text first
fn write_inline(node: &SerializedNode, output: &mut String) {
    open_tag(node, output);
    if node.children.is_empty() && node.text.is_none() {
        output.push_str("/>");
        return;
    }

    output.push('>');
    if let Some(text) = &node.text {
        output.push_str(&escape_text(text));
    }
    for child in &node.children {
        write_inline(child, output);
    }
    close_tag(node, output);
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Serialize a node tree to XML with the default two-space indent
pub fn serialize(node: &SerializedNode) -> String {
    Serializer::new().serialize(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_serialize_layout() {
        let node = SerializedNode::new("View").with_child(
            SerializedNode::new("Group")
                .with_attr("columns", "2")
                .with_child(SerializedNode::new("Text").with_attr("id", "t1").with_text("Hi"))
                .with_child(SerializedNode::new("Empty")),
        );

        let xml = serialize(&node);
        assert_eq!(
            xml,
            "<View>\n  <Group columns=\"2\">\n    <Text id=\"t1\">Hi</Text>\n    <Empty/>\n  </Group>\n</View>\n"
        );
    }

    #[test]
    fn test_mixed_content_is_written_inline() {
        let node = parse("<View><Text>a<b/>c</Text></View>").unwrap();
        assert_eq!(node.children[0].inner_text(), Some("ac"));

        let xml = serialize(&node);
        assert_eq!(xml, "<View>\n  <Text>ac<b/></Text>\n</View>\n");
        assert_eq!(parse(&xml).unwrap(), node);
    }

    #[test]
    fn test_roundtrip_preserves_escaped_content() {
        let source = r#"<View><Text heading="a &quot;b&quot;"><![CDATA[x < y && z]]></Text></View>"#;
        let node = parse(source).unwrap();
        let reparsed = parse(&serialize(&node)).unwrap();
        assert_eq!(node, reparsed);
    }
}
