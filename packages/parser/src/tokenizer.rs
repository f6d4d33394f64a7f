//! XML tokenizer built on logos
//!
//! XML is lexed in two modes: `Content` between tags and `Markup` inside a
//! tag. The tokenizer morphs between the two lexers and flattens their output
//! into a single token stream for the parser.

use crate::error::{ParseError, ParseResult};
use logos::{Lexer, Logos};
use std::ops::Range;

/// Tokens produced between tags
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
enum Content<'src> {
    #[token("<!--", |lex| skip_past(lex, "-->"))]
    Comment,

    #[token("<?", |lex| skip_past(lex, "?>"))]
    Instruction,

    #[token("<!DOCTYPE", |lex| skip_past(lex, ">"))]
    #[token("<!doctype", |lex| skip_past(lex, ">"))]
    Doctype,

    #[token("<![CDATA[", cdata)]
    CData(&'src str),

    #[regex(r"</[A-Za-z_][A-Za-z0-9_.:-]*", |lex| &lex.slice()[2..])]
    CloseTag(&'src str),

    #[regex(r"<[A-Za-z_][A-Za-z0-9_.:-]*", |lex| &lex.slice()[1..])]
    OpenTag(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

/// Tokens produced inside a tag, after its name
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum Markup<'src> {
    #[regex(r"[A-Za-z_:][A-Za-z0-9_.:-]*", |lex| lex.slice())]
    Name(&'src str),

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#, strip_quotes)]
    #[regex(r"'[^']*'", strip_quotes)]
    Value(&'src str),

    #[token(">")]
    TagEnd,

    #[token("/>")]
    SelfClose,
}

fn skip_past<'src>(lex: &mut Lexer<'src, Content<'src>>, terminator: &str) -> bool {
    match lex.remainder().find(terminator) {
        Some(idx) => {
            lex.bump(idx + terminator.len());
            true
        }
        None => false,
    }
}

fn cdata<'src>(lex: &mut Lexer<'src, Content<'src>>) -> Option<&'src str> {
    let remainder: &'src str = lex.remainder();
    let idx = remainder.find("]]>")?;
    lex.bump(idx + 3);
    Some(&remainder[..idx])
}

fn strip_quotes<'src>(lex: &mut Lexer<'src, Markup<'src>>) -> &'src str {
    let s = lex.slice();
    &s[1..s.len() - 1]
}

/// Flattened XML token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'src> {
    /// `<name`
    OpenTag(&'src str),
    /// `</name`
    CloseTag(&'src str),
    AttrName(&'src str),
    Equals,
    /// Attribute value with its quotes stripped, entities not yet decoded
    AttrValue(&'src str),
    /// `>`
    TagEnd,
    /// `/>`
    SelfClose,
    /// Raw character data, entities not yet decoded
    Text(&'src str),
    CData(&'src str),
}

impl<'src> Token<'src> {
    pub fn describe(&self) -> String {
        match self {
            Token::OpenTag(name) => format!("<{}", name),
            Token::CloseTag(name) => format!("</{}", name),
            Token::AttrName(name) => format!("attribute '{}'", name),
            Token::Equals => "'='".to_string(),
            Token::AttrValue(_) => "attribute value".to_string(),
            Token::TagEnd => "'>'".to_string(),
            Token::SelfClose => "'/>'".to_string(),
            Token::Text(_) => "text".to_string(),
            Token::CData(_) => "CDATA section".to_string(),
        }
    }
}

impl<'src> From<Markup<'src>> for Token<'src> {
    fn from(markup: Markup<'src>) -> Self {
        match markup {
            Markup::Name(name) => Token::AttrName(name),
            Markup::Equals => Token::Equals,
            Markup::Value(value) => Token::AttrValue(value),
            Markup::TagEnd => Token::TagEnd,
            Markup::SelfClose => Token::SelfClose,
        }
    }
}

pub type SpannedToken<'src> = (Token<'src>, Range<usize>);

/// Tokenize an XML source. Comments, processing instructions and doctype
/// declarations are dropped.
pub fn tokenize(source: &str) -> ParseResult<Vec<SpannedToken<'_>>> {
    let mut tokens = Vec::new();
    let mut content = Content::lexer(source);

    while let Some(result) = content.next() {
        let span = content.span();
        let token = result.map_err(|_| ParseError::lexer_error(span.start))?;

        match token {
            Content::Comment | Content::Instruction | Content::Doctype => {}
            Content::Text(text) => tokens.push((Token::Text(text), span)),
            Content::CData(text) => tokens.push((Token::CData(text), span)),
            Content::OpenTag(name) => {
                tokens.push((Token::OpenTag(name), span));
                content = lex_markup(content, &mut tokens, source.len())?;
            }
            Content::CloseTag(name) => {
                tokens.push((Token::CloseTag(name), span));
                content = lex_markup(content, &mut tokens, source.len())?;
            }
        }
    }

    Ok(tokens)
}

/// Lex the inside of a tag up to and including its `>` or `/>`
fn lex_markup<'src>(
    content: Lexer<'src, Content<'src>>,
    tokens: &mut Vec<SpannedToken<'src>>,
    source_len: usize,
) -> ParseResult<Lexer<'src, Content<'src>>> {
    let mut markup = content.morph::<Markup<'src>>();

    loop {
        match markup.next() {
            None => return Err(ParseError::unexpected_eof(source_len)),
            Some(Err(())) => return Err(ParseError::lexer_error(markup.span().start)),
            Some(Ok(token)) => {
                let closes = matches!(token, Markup::TagEnd | Markup::SelfClose);
                tokens.push((token.into(), markup.span()));
                if closes {
                    break;
                }
            }
        }
    }

    Ok(markup.morph())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token<'_>> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|(token, _)| token)
            .collect()
    }

    #[test]
    fn test_self_closing_tag_with_attributes() {
        let tokens = kinds(r#"<Range min="0" max='10'/>"#);
        assert_eq!(
            tokens,
            vec![
                Token::OpenTag("Range"),
                Token::AttrName("min"),
                Token::Equals,
                Token::AttrValue("0"),
                Token::AttrName("max"),
                Token::Equals,
                Token::AttrValue("10"),
                Token::SelfClose,
            ]
        );
    }

    #[test]
    fn test_text_and_close_tag() {
        let tokens = kinds("<Text>Hello, world!</Text >");
        assert_eq!(
            tokens,
            vec![
                Token::OpenTag("Text"),
                Token::TagEnd,
                Token::Text("Hello, world!"),
                Token::CloseTag("Text"),
                Token::TagEnd,
            ]
        );
    }

    #[test]
    fn test_comments_and_declarations_are_dropped() {
        let tokens = kinds("<?xml version=\"1.0\"?><!-- note --><View/>");
        assert_eq!(tokens, vec![Token::OpenTag("View"), Token::SelfClose]);
    }

    #[test]
    fn test_cdata_keeps_markup_characters() {
        let tokens = kinds("<Code><![CDATA[if a < b { }]]></Code>");
        assert_eq!(tokens[2], Token::CData("if a < b { }"));
    }

    #[test]
    fn test_single_quoted_json_value() {
        let tokens = kinds(r#"<Tags initialValue='["foo", "bar"]'/>"#);
        assert_eq!(tokens[3], Token::AttrValue(r#"["foo", "bar"]"#));
    }

    #[test]
    fn test_unterminated_tag_is_eof() {
        let err = tokenize("<View id=\"x\"").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_unterminated_comment_is_lexer_error() {
        let err = tokenize("<!-- never closed").unwrap_err();
        assert!(matches!(err, ParseError::LexerError { pos: 0 }));
    }
}
