use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token at {pos}: expected {expected}, found {found}")]
    UnexpectedToken {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of input at {pos}")]
    UnexpectedEof { pos: usize },

    #[error("Invalid syntax at {pos}: {message}")]
    InvalidSyntax { pos: usize, message: String },

    #[error("Lexer error at {pos}")]
    LexerError { pos: usize },

    #[error("Mismatched closing tag at {pos}: expected </{expected}>, found </{found}>")]
    MismatchedTag {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("Invalid JSON document: {0}")]
    Json(String),
}

impl ParseError {
    pub fn unexpected_token(pos: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::UnexpectedToken {
            pos,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(pos: usize) -> Self {
        Self::UnexpectedEof { pos }
    }

    pub fn invalid_syntax(pos: usize, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            pos,
            message: message.into(),
        }
    }

    pub fn lexer_error(pos: usize) -> Self {
        Self::LexerError { pos }
    }

    pub fn mismatched_tag(pos: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::MismatchedTag {
            pos,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Byte offset into the source, when the error has one
    pub fn pos(&self) -> Option<usize> {
        match self {
            ParseError::UnexpectedToken { pos, .. }
            | ParseError::UnexpectedEof { pos }
            | ParseError::InvalidSyntax { pos, .. }
            | ParseError::LexerError { pos }
            | ParseError::MismatchedTag { pos, .. } => Some(*pos),
            ParseError::Json(_) => None,
        }
    }
}

/// Pretty-print an error with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_error(source: &str, filename: &str, error: &ParseError) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let start = error
        .pos()
        .unwrap_or(0)
        .min(source.len().saturating_sub(1));
    let end = (start + 1).min(source.len()).max(start);

    let label = match error {
        ParseError::UnexpectedToken { expected, .. } => format!("expected {}", expected),
        ParseError::MismatchedTag { expected, .. } => format!("expected </{}>", expected),
        ParseError::InvalidSyntax { message, .. } => message.clone(),
        ParseError::UnexpectedEof { .. } => "input ends here".to_string(),
        ParseError::LexerError { .. } => "unrecognised input".to_string(),
        ParseError::Json(message) => message.clone(),
    };

    let mut output = Vec::new();
    let report = Report::build(ReportKind::Error, filename, start)
        .with_message(error.to_string())
        .with_label(
            Label::new((filename, start..end))
                .with_color(Color::Red)
                .with_message(label),
        )
        .finish();

    if report
        .write((filename, Source::from(source)), &mut output)
        .is_err()
    {
        return error.to_string();
    }

    String::from_utf8(output).unwrap_or_else(|_| error.to_string())
}
