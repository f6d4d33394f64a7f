use crate::error::{ParseError, ParseResult};
use crate::node::SerializedNode;
use crate::tokenizer::{tokenize, SpannedToken, Token};
use std::borrow::Cow;

/// Recursive descent parser over the flattened XML token stream
pub struct Parser<'src> {
    tokens: Vec<SpannedToken<'src>>,
    pos: usize,
    source_len: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> ParseResult<Self> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
            source_len: source.len(),
        })
    }

    /// Parse a document with exactly one root element
    pub fn parse_document(&mut self) -> ParseResult<SerializedNode> {
        self.skip_blank_text()?;

        if self.is_at_end() {
            return Err(ParseError::unexpected_eof(self.source_len));
        }

        let root = self.parse_element()?;
        self.skip_blank_text()?;

        if !self.is_at_end() {
            return Err(ParseError::invalid_syntax(
                self.peek_pos(),
                "Unexpected content after the root element",
            ));
        }

        Ok(root)
    }

    fn parse_element(&mut self) -> ParseResult<SerializedNode> {
        let name = match self.peek() {
            Some((Token::OpenTag(name), _)) => name.to_string(),
            other => {
                return Err(ParseError::unexpected_token(
                    self.peek_pos(),
                    "opening tag",
                    Self::format_token(other),
                ))
            }
        };
        self.advance();

        let mut node = SerializedNode::new(name);

        if self.parse_attributes(&mut node)? {
            return Ok(node);
        }

        let mut segments: Vec<Cow<'src, str>> = Vec::new();
        let mut keep_text = false;

        loop {
            match self.peek() {
                Some((Token::OpenTag(_), _)) => {
                    let child = self.parse_element()?;
                    node.children.push(child);
                }
                Some((Token::Text(text), span)) => {
                    let decoded = decode_entities(text, span.start)?;
                    keep_text |= !decoded.trim().is_empty();
                    segments.push(decoded);
                    self.advance();
                }
                Some((Token::CData(text), _)) => {
                    keep_text = true;
                    segments.push(Cow::Borrowed(*text));
                    self.advance();
                }
                Some((Token::CloseTag(closing), span)) => {
                    if *closing != node.name {
                        return Err(ParseError::mismatched_tag(span.start, &node.name, *closing));
                    }
                    self.advance();
                    self.expect_tag_end()?;
                    break;
                }
                None => return Err(ParseError::unexpected_eof(self.source_len)),
                other => {
                    return Err(ParseError::unexpected_token(
                        self.peek_pos(),
                        format!("content or </{}>", node.name),
                        Self::format_token(other),
                    ))
                }
            }
        }

        if keep_text {
            node.text = Some(segments.concat());
        }

        Ok(node)
    }

    /// Parse attributes up to the end of the opening tag. Returns `true` when
    /// the tag was self-closing.
    fn parse_attributes(&mut self, node: &mut SerializedNode) -> ParseResult<bool> {
        loop {
            match self.peek() {
                Some((Token::AttrName(name), _)) => {
                    let key = name.to_string();
                    self.advance();

                    // Bare attributes (`<iframe allowfullscreen>`) read as empty strings
                    let value = if self.check(&Token::Equals) {
                        self.advance();
                        self.expect_attr_value()?
                    } else {
                        String::new()
                    };
                    node.attributes.insert(key, value);
                }
                Some((Token::TagEnd, _)) => {
                    self.advance();
                    return Ok(false);
                }
                Some((Token::SelfClose, _)) => {
                    self.advance();
                    return Ok(true);
                }
                None => return Err(ParseError::unexpected_eof(self.source_len)),
                other => {
                    return Err(ParseError::unexpected_token(
                        self.peek_pos(),
                        "attribute, '>' or '/>'",
                        Self::format_token(other),
                    ))
                }
            }
        }
    }

    fn expect_attr_value(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some((Token::AttrValue(value), span)) => {
                let decoded = decode_entities(value, span.start)?.into_owned();
                self.advance();
                Ok(decoded)
            }
            other => Err(ParseError::unexpected_token(
                self.peek_pos(),
                "quoted attribute value",
                Self::format_token(other),
            )),
        }
    }

    fn expect_tag_end(&mut self) -> ParseResult<()> {
        if self.check(&Token::TagEnd) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected_token(
                self.peek_pos(),
                "'>'",
                Self::format_token(self.peek()),
            ))
        }
    }

    fn skip_blank_text(&mut self) -> ParseResult<()> {
        while let Some((Token::Text(text), span)) = self.peek() {
            if !text.trim().is_empty() {
                return Err(ParseError::invalid_syntax(
                    span.start,
                    "Text is not allowed outside the root element",
                ));
            }
            self.advance();
        }
        Ok(())
    }

    // Helper methods

    fn peek(&self) -> Option<&SpannedToken<'src>> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, token: &Token) -> bool {
        matches!(self.peek(), Some((t, _)) if t == token)
    }

    fn peek_pos(&self) -> usize {
        self.peek()
            .map(|(_, span)| span.start)
            .unwrap_or(self.source_len)
    }

    fn format_token(token: Option<&SpannedToken>) -> String {
        match token {
            Some((t, _)) => t.describe(),
            None => "end of input".to_string(),
        }
    }
}

/// Decode the predefined XML entities and numeric character references.
/// Unknown named entities are kept verbatim.
pub fn decode_entities(raw: &str, offset: usize) -> ParseResult<Cow<'_, str>> {
    if !raw.contains('&') {
        return Ok(Cow::Borrowed(raw));
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        let after = &rest[idx..];

        let Some(end) = after.find(';') else {
            out.push_str(after);
            return Ok(Cow::Owned(out));
        };

        let entity = &after[1..end];
        let decoded = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                Some(char_ref(&entity[2..], 16, offset + (raw.len() - rest.len()) + idx)?)
            }
            _ if entity.starts_with('#') => {
                Some(char_ref(&entity[1..], 10, offset + (raw.len() - rest.len()) + idx)?)
            }
            _ => None,
        };

        match decoded {
            Some(c) => out.push(c),
            None => out.push_str(&after[..=end]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(Cow::Owned(out))
}

fn char_ref(digits: &str, radix: u32, pos: usize) -> ParseResult<char> {
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| ParseError::invalid_syntax(pos, format!("Invalid character reference '{}'", digits)))
}

/// Parse an XML document into its root node
pub fn parse(source: &str) -> ParseResult<SerializedNode> {
    let mut parser = Parser::new(source)?;
    parser.parse_document()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let source = r#"
            <View>
                <Group columns="2">
                    <Text id="a">First</Text>
                    <Text id="b">Second</Text>
                </Group>
            </View>
        "#;

        let root = parse(source).unwrap();
        assert_eq!(root.name, "View");
        assert!(root.text.is_none(), "whitespace between elements is dropped");
        assert_eq!(root.children.len(), 1);

        let group = &root.children[0];
        assert_eq!(group.attr("columns"), Some("2"));
        assert_eq!(group.children.len(), 2);
        assert_eq!(group.children[1].inner_text(), Some("Second"));
    }

    #[test]
    fn test_text_and_cdata_are_concatenated() {
        let root = parse("<Text>a &amp; b <![CDATA[<c>]]></Text>").unwrap();
        assert_eq!(root.inner_text(), Some("a & b <c>"));
    }

    #[test]
    fn test_empty_cdata_still_counts_as_text() {
        let root = parse("<Code><![CDATA[]]></Code>").unwrap();
        assert_eq!(root.inner_text(), Some(""));
    }

    #[test]
    fn test_attribute_entities() {
        let root = parse(r#"<BigNumber heading="&quot;Q1&quot; &#x26; &#38;"/>"#).unwrap();
        assert_eq!(root.attr("heading"), Some("\"Q1\" & &"));
    }

    #[test]
    fn test_unknown_entity_is_kept() {
        let root = parse("<Text>&nbsp;x</Text>").unwrap();
        assert_eq!(root.inner_text(), Some("&nbsp;x"));
    }

    #[test]
    fn test_bare_attribute() {
        let root = parse(r#"<iframe src="https://example.com" allowfullscreen></iframe>"#).unwrap();
        assert_eq!(root.attr("allowfullscreen"), Some(""));
    }

    #[test]
    fn test_mismatched_close_tag() {
        let err = parse("<View><Group></View>").unwrap_err();
        assert!(matches!(err, ParseError::MismatchedTag { ref expected, .. } if expected == "Group"));
    }

    #[test]
    fn test_multiple_roots_rejected() {
        let err = parse("<View/><View/>").unwrap_err();
        assert!(matches!(err, ParseError::InvalidSyntax { .. }));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse("   ").unwrap_err(), ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_invalid_char_ref() {
        let err = parse("<Text>&#xZZ;</Text>").unwrap_err();
        assert!(matches!(err, ParseError::InvalidSyntax { pos: 6, .. }));
    }
}
