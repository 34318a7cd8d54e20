//! Token classification
//!
//!     Second lexing stage. Consumes the tokenizer's stream and assigns each token
//!     its meaning: a request name, or a literal of some shape. Order is preserved
//!     and every token comes out exactly once.
//!
//! Statement Heads
//!
//!     RIB statements carry no terminator; a statement ends where the next request
//!     name appears. Outside an array, a bare word (one that is not a number) is
//!     therefore always a statement head. It is screened by the vocabulary filter
//!     first: a negative answer rejects it without a lookup, a positive one is
//!     confirmed by the exact vocabulary. A head that fails both is an undefined
//!     request.
//!
//! Arrays
//!
//!     Brackets open and close an array sub-state. Inside it no word is a head;
//!     words are classified by literal shape only. Element counts and nesting depth
//!     are checked against [`Limits`].
//!
//! Comments and structural hints pass through untouched.

use crate::rib::error::{Result, RibError};
use crate::rib::lexing::filter::VocabularyFilter;
use crate::rib::lexing::tokens::{LiteralShape, RawToken, SemanticTag, Token, TokenClass};
use crate::rib::lexing::vocabulary;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+$").unwrap());
static FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?([0-9]+\.[0-9]*|\.[0-9]+|[0-9]+)([eE][+-]?[0-9]+)?$").unwrap()
});

/// Literal shape of a word or quoted string, if it has one
pub fn literal_shape(kind: RawToken, word: &str) -> Option<LiteralShape> {
    match kind {
        RawToken::Quoted => Some(LiteralShape::String),
        RawToken::OpenBracket => Some(LiteralShape::ArrayOpen),
        RawToken::CloseBracket => Some(LiteralShape::ArrayClose),
        RawToken::Word if INTEGER.is_match(word) => Some(LiteralShape::Integer),
        RawToken::Word if FLOAT.is_match(word) => Some(LiteralShape::Float),
        _ => None,
    }
}

/// Resource bounds checked while classifying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_array_len: usize,
    pub max_string_len: usize,
    pub max_array_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_array_len: 1 << 20,
            max_string_len: 1 << 16,
            max_array_depth: 1,
        }
    }
}

impl From<rib_config::LimitsConfig> for Limits {
    fn from(config: rib_config::LimitsConfig) -> Self {
        Limits {
            max_array_len: config.max_array_len,
            max_string_len: config.max_string_len,
            max_array_depth: config.max_array_depth,
        }
    }
}

struct OpenArray {
    line: usize,
    pos: usize,
    len: usize,
}

/// Single-pass classifier over a token stream
pub struct Lexer<'f, I> {
    tokens: I,
    filter: &'f dyn VocabularyFilter,
    limits: Limits,
    arrays: Vec<OpenArray>,
    done: bool,
}

impl<'f, I> Lexer<'f, I>
where
    I: Iterator<Item = Result<Token>>,
{
    pub fn new(tokens: I, filter: &'f dyn VocabularyFilter) -> Self {
        Lexer {
            tokens,
            filter,
            limits: Limits::default(),
            arrays: Vec::new(),
            done: false,
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    fn classify(&mut self, mut token: Token) -> Result<Token> {
        match token.kind {
            RawToken::Comment | RawToken::StructuralHint => return Ok(token),
            RawToken::OpenBracket => {
                self.count_element()?;
                if self.arrays.len() >= self.limits.max_array_depth {
                    return Err(RibError::LimitCheck {
                        line: token.line,
                        pos: token.pos,
                        message: format!(
                            "arrays nested deeper than {}",
                            self.limits.max_array_depth
                        ),
                    });
                }
                self.arrays.push(OpenArray {
                    line: token.line,
                    pos: token.pos,
                    len: 0,
                });
            }
            RawToken::CloseBracket => {
                self.arrays.pop();
            }
            RawToken::Quoted => {
                let len = token.word.len().saturating_sub(2);
                if len > self.limits.max_string_len {
                    return Err(RibError::StringTooBig {
                        line: token.line,
                        pos: token.pos,
                        len,
                        limit: self.limits.max_string_len,
                    });
                }
                self.count_element()?;
            }
            RawToken::Word => {
                self.count_element()?;
            }
        }

        let shape = literal_shape(token.kind, &token.word);
        if shape.is_some() || !self.arrays.is_empty() {
            token.class = TokenClass::Content;
            token.tag = shape.map(SemanticTag::Literal);
            return Ok(token);
        }

        // A bare word outside an array starts a new statement
        match self.lookup(&token.word) {
            Some(name) => {
                token.class = TokenClass::Structural;
                token.tag = Some(SemanticTag::Command(name));
                Ok(token)
            }
            None => Err(RibError::Unregistered {
                word: token.word,
                line: token.line,
                pos: token.pos,
            }),
        }
    }

    fn lookup(&self, word: &str) -> Option<&'static str> {
        if !self.filter.may_contain(word) {
            return None;
        }
        let found = vocabulary::lookup(word);
        if found.is_none() {
            debug!(word, "Vocabulary filter false positive");
        }
        found
    }

    fn count_element(&mut self) -> Result<()> {
        let limit = self.limits.max_array_len;
        if let Some(array) = self.arrays.last_mut() {
            array.len += 1;
            if array.len > limit {
                return Err(RibError::ArrayTooBig {
                    line: array.line,
                    pos: array.pos,
                    len: array.len,
                    limit,
                });
            }
        }
        Ok(())
    }
}

impl<'f, I> Iterator for Lexer<'f, I>
where
    I: Iterator<Item = Result<Token>>,
{
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = match self.tokens.next()? {
            Ok(token) => self.classify(token),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            debug!(error = %e, "Lexing stopped");
            self.done = true;
        }
        Some(result)
    }
}

/// Classify a token stream against a vocabulary filter
pub fn classify<I>(tokens: I, filter: &dyn VocabularyFilter) -> Lexer<'_, I::IntoIter>
where
    I: IntoIterator<Item = Result<Token>>,
{
    Lexer::new(tokens.into_iter(), filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rib::error::ErrorKind;
    use crate::rib::lexing::filter::{ri_bloom_filter, ExactFilter};
    use crate::rib::lexing::tokenizer::tokenize;
    use rstest::rstest;

    /// Answers yes to every word, like a saturated Bloom filter
    struct AcceptAll;

    impl VocabularyFilter for AcceptAll {
        fn may_contain(&self, _word: &str) -> bool {
            true
        }
    }

    fn lex(source: &str) -> Result<Vec<Token>> {
        classify(tokenize(source), ri_bloom_filter()).collect()
    }

    #[rstest]
    #[case(RawToken::Word, "42", Some(LiteralShape::Integer))]
    #[case(RawToken::Word, "-1", Some(LiteralShape::Integer))]
    #[case(RawToken::Word, "30.0", Some(LiteralShape::Float))]
    #[case(RawToken::Word, ".5", Some(LiteralShape::Float))]
    #[case(RawToken::Word, "1e-3", Some(LiteralShape::Float))]
    #[case(RawToken::Word, "-2.5E+4", Some(LiteralShape::Float))]
    #[case(RawToken::Word, "Sphere", None)]
    #[case(RawToken::Word, "1.2.3", None)]
    #[case(RawToken::Word, "-", None)]
    #[case(RawToken::Quoted, "\"rgb\"", Some(LiteralShape::String))]
    #[case(RawToken::OpenBracket, "[", Some(LiteralShape::ArrayOpen))]
    #[case(RawToken::CloseBracket, "]", Some(LiteralShape::ArrayClose))]
    fn test_literal_shape(
        #[case] kind: RawToken,
        #[case] word: &str,
        #[case] expected: Option<LiteralShape>,
    ) {
        assert_eq!(literal_shape(kind, word), expected);
    }

    #[test]
    fn test_commands_and_content() {
        let tokens = lex(r#"Projection "perspective" "fov" 30.0"#).unwrap();
        assert_eq!(tokens[0].command(), Some("Projection"));
        assert_eq!(tokens[0].class, TokenClass::Structural);
        assert_eq!(tokens[1].shape(), Some(LiteralShape::String));
        assert_eq!(tokens[2].shape(), Some(LiteralShape::String));
        assert_eq!(tokens[3].shape(), Some(LiteralShape::Float));
        assert!(tokens[1..].iter().all(|t| t.class == TokenClass::Content));
    }

    #[test]
    fn test_bare_word_starts_next_statement() {
        let tokens = lex("Translate 0 0 6 WorldBegin").unwrap();
        let commands: Vec<_> = tokens.iter().filter_map(Token::command).collect();
        assert_eq!(commands, vec!["Translate", "WorldBegin"]);
    }

    #[test]
    fn test_array_contents_are_never_heads() {
        let tokens = lex("Color [1 0 0]").unwrap();
        let shapes: Vec<_> = tokens.iter().map(|t| t.tag).collect();
        assert_eq!(
            shapes,
            vec![
                Some(SemanticTag::Command("Color")),
                Some(SemanticTag::Literal(LiteralShape::ArrayOpen)),
                Some(SemanticTag::Literal(LiteralShape::Integer)),
                Some(SemanticTag::Literal(LiteralShape::Integer)),
                Some(SemanticTag::Literal(LiteralShape::Integer)),
                Some(SemanticTag::Literal(LiteralShape::ArrayClose)),
            ]
        );
    }

    #[test]
    fn test_bare_word_inside_array_is_untagged_content() {
        let tokens = lex("Basis [bezier]").unwrap();
        assert_eq!(tokens[2].word, "bezier");
        assert_eq!(tokens[2].class, TokenClass::Content);
        assert_eq!(tokens[2].tag, None);
    }

    #[test]
    fn test_unknown_head_is_unregistered() {
        let err = lex("WorldBegin\n  Spheroid 1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unregistered);
        assert_eq!(err.position(), Some((2, 3)));
        assert_eq!(err.to_string(), "2:3: undefined RIB request 'Spheroid'");
    }

    #[test]
    fn test_filter_false_positive_falls_through_to_lookup() {
        let err = classify(tokenize("Spheroid"), &AcceptAll)
            .collect::<Result<Vec<_>>>()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unregistered);
    }

    #[test]
    fn test_exact_filter_classifies_the_same() {
        let source = "WorldBegin Sphere 1 -1 1 360 WorldEnd";
        let bloom: Vec<_> = lex(source).unwrap();
        let exact = ExactFilter::from_vocabulary();
        let exact: Vec<_> = classify(tokenize(source), &exact)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(bloom, exact);
    }

    #[test]
    fn test_literal_at_start_is_content() {
        let tokens = lex("3.04").unwrap();
        assert_eq!(tokens[0].class, TokenClass::Content);
        assert_eq!(tokens[0].shape(), Some(LiteralShape::Float));
    }

    #[test]
    fn test_head_decided_by_token_alone() {
        let tokens = lex(r#"WorldBegin AttributeBegin Color [1 0 0] Surface "plastic""#).unwrap();
        let commands: Vec<_> = tokens.iter().filter_map(Token::command).collect();
        assert_eq!(commands, ["WorldBegin", "AttributeBegin", "Color", "Surface"]);
        assert_eq!(tokens.last().and_then(Token::shape), Some(LiteralShape::String));
    }

    #[test]
    fn test_comments_pass_through() {
        let tokens = lex("# hello\nWorldBegin").unwrap();
        assert_eq!(tokens[0].kind, RawToken::Comment);
        assert_eq!(tokens[0].tag, None);
        assert_eq!(tokens[1].command(), Some("WorldBegin"));
    }

    #[test]
    fn test_nested_array_exceeds_depth_limit() {
        let err = lex("Color [[1] 0 0]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitCheck);
        assert_eq!(err.position(), Some((1, 8)));
    }

    #[test]
    fn test_array_too_big() {
        let limits = Limits {
            max_array_len: 3,
            ..Limits::default()
        };
        let err = classify(tokenize("Color [1 0 0 1]"), ri_bloom_filter())
            .with_limits(limits)
            .collect::<Result<Vec<_>>>()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArrayTooBig);
        assert_eq!(err.position(), Some((1, 7)));
    }

    #[test]
    fn test_string_too_big() {
        let limits = Limits {
            max_string_len: 4,
            ..Limits::default()
        };
        let ok: Result<Vec<_>> = classify(tokenize(r#"Display "abcd""#), ri_bloom_filter())
            .with_limits(limits)
            .collect();
        assert!(ok.is_ok());
        let err = classify(tokenize(r#"Display "abcde""#), ri_bloom_filter())
            .with_limits(limits)
            .collect::<Result<Vec<_>>>()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StringTooBig);
    }

    #[test]
    fn test_tokenizer_errors_pass_through() {
        let err = lex("Display \"open").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_stops_after_first_error() {
        let mut lexer = classify(tokenize("Bogus WorldBegin"), ri_bloom_filter());
        assert!(lexer.next().unwrap().is_err());
        assert!(lexer.next().is_none());
    }
}
