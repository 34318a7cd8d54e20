//! Token definitions for RIB text
//!
//! [`RawToken`] is what the logos lexer recognises: words, quoted strings,
//! brackets, and the two comment forms. [`Token`] is the position-tagged value
//! handed to consumers; the tokenizer fills in everything but the semantic tag,
//! which the classifier adds.

use logos::Logos;
use serde::Serialize;
use std::fmt;

/// Lexemes recognised by the base scanner
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum RawToken {
    /// `##` to end of line (file banner and structural hints)
    #[regex(r"##[^\r\n]*")]
    StructuralHint,

    /// `#` to end of line, when not followed by a second `#`
    #[regex(r"#([^#\r\n][^\r\n]*)?")]
    Comment,

    /// Balanced double quotes, backslash escapes allowed
    #[regex(r##""([^"\\]|\\.)*""##)]
    Quoted,

    #[token("[")]
    OpenBracket,

    #[token("]")]
    CloseBracket,

    /// Anything else up to whitespace, a bracket, a quote or a comment
    #[regex(r##"[^ \t\r\n\f\[\]"#]+"##)]
    Word,
}

impl RawToken {
    pub fn is_comment(&self) -> bool {
        matches!(self, RawToken::Comment | RawToken::StructuralHint)
    }
}

/// Coarse class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenClass {
    /// Protocol command, comment, or structural hint
    Structural,
    /// Literal data
    Content,
}

/// Literal shapes reported for content tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LiteralShape {
    Integer,
    Float,
    String,
    ArrayOpen,
    ArrayClose,
}

/// Meaning assigned by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SemanticTag {
    /// Matched vocabulary entry
    Command(&'static str),
    Literal(LiteralShape),
}

/// A lexeme with its source position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// 1-based row
    pub line: usize,
    /// 1-based column, in characters
    pub pos: usize,
    /// Raw text; quoted strings keep their quotes, comments drop their `#`/`##` prefix
    pub word: String,
    pub kind: RawToken,
    pub class: TokenClass,
    pub tag: Option<SemanticTag>,
}

impl Token {
    pub fn command(&self) -> Option<&'static str> {
        match self.tag {
            Some(SemanticTag::Command(name)) => Some(name),
            _ => None,
        }
    }

    pub fn shape(&self) -> Option<LiteralShape> {
        match self.tag {
            Some(SemanticTag::Literal(shape)) => Some(shape),
            _ => None,
        }
    }

    pub fn is_structural(&self) -> bool {
        self.class == TokenClass::Structural
    }

    /// Text as it appears in source
    pub fn source_text(&self) -> String {
        match self.kind {
            RawToken::StructuralHint => format!("##{}", self.word),
            RawToken::Comment => format!("#{}", self.word),
            _ => self.word.clone(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = match self.class {
            TokenClass::Structural => "structural",
            TokenClass::Content => "content",
        };
        let tag = match self.tag {
            Some(SemanticTag::Command(name)) => format!("command:{}", name),
            Some(SemanticTag::Literal(shape)) => format!("{:?}", shape).to_lowercase(),
            None => "-".to_string(),
        };
        write!(
            f,
            "{:04}:{:03} {:>24} ({}) {}",
            self.line, self.pos, self.word, class, tag
        )
    }
}
