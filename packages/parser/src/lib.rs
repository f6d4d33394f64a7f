pub mod error;
pub mod json;
pub mod node;
pub mod parser;
pub mod serializer;
pub mod tokenizer;

pub use error::{ParseError, ParseResult};
#[cfg(feature = "pretty-errors")]
pub use error::format_error;
pub use json::{from_json, from_json_value};
pub use node::{Attributes, SerializedNode};
pub use parser::{decode_entities, parse, Parser};
pub use serializer::{serialize, Serializer};
pub use tokenizer::{tokenize, Token};

/// Parse a document that is either XML or xml-js JSON, sniffing the first
/// non-whitespace character.
pub fn parse_any(source: &str) -> ParseResult<SerializedNode> {
    if source.trim_start().starts_with('{') {
        from_json(source)
    } else {
        parse(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_any_sniffs_format() {
        let xml = parse_any("<View><Empty/></View>").unwrap();
        let json = parse_any(
            r#"{"elements": [{"type": "element", "name": "View",
                "elements": [{"type": "element", "name": "Empty"}]}]}"#,
        )
        .unwrap();
        assert_eq!(xml, json);
    }
}
