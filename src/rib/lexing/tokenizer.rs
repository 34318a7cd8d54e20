//! Tokenizer
//!
//!     First lexing stage. Wraps the logos scanner and turns its lexemes into
//!     position-tagged [`Token`]s, one at a time. Whitespace is dropped; quoted
//!     strings, brackets, words and comment lines each become a token.
//!
//! Positions
//!
//!     Logos reports byte ranges. A [`LineIndex`] built once over the source maps
//!     a byte offset to its 1-based line and 1-based character column.
//!
//! Failure
//!
//!     An unterminated quote fails at the opening quote. Brackets are only checked
//!     for balance here (grouping is the classifier's job): a stray `]` fails where
//!     it stands, and an array still open at end of input fails at its `[`.
//!     The stream ends after the first error.

use crate::rib::error::{Result, RibError};
use crate::rib::lexing::tokens::{RawToken, Token, TokenClass};
use logos::Logos;

/// Byte offset to (line, column) lookup
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .char_indices()
                .filter(|(_, c)| *c == '\n')
                .map(|(i, _)| i + 1),
        );
        LineIndex { line_starts }
    }

    /// 1-based line and column of `offset` in `source`
    pub fn position(&self, source: &str, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert - 1,
        };
        let start = self.line_starts[line];
        let column = source[start..offset].chars().count();
        (line + 1, column + 1)
    }
}

/// Single-pass token stream over a source string
pub struct Tokenizer<'src> {
    source: &'src str,
    lexer: logos::Lexer<'src, RawToken>,
    index: LineIndex,
    open_brackets: Vec<(usize, usize)>,
    done: bool,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str) -> Self {
        Tokenizer {
            source,
            lexer: RawToken::lexer(source),
            index: LineIndex::new(source),
            open_brackets: Vec::new(),
            done: false,
        }
    }

    fn fail(&mut self, error: RibError) -> Option<Result<Token>> {
        self.done = true;
        Some(Err(error))
    }
}

impl<'src> Iterator for Tokenizer<'src> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let Some(result) = self.lexer.next() else {
            self.done = true;
            if let Some((line, pos)) = self.open_brackets.first().copied() {
                return Some(Err(RibError::syntax(line, pos, "unterminated array")));
            }
            return None;
        };

        let span = self.lexer.span();
        let slice = self.lexer.slice();
        let (line, pos) = self.index.position(self.source, span.start);

        let kind = match result {
            Ok(kind) => kind,
            Err(()) => {
                let message = if slice.starts_with('"') {
                    "unterminated string".to_string()
                } else {
                    format!("unexpected input '{}'", slice)
                };
                return self.fail(RibError::syntax(line, pos, message));
            }
        };

        match kind {
            RawToken::OpenBracket => self.open_brackets.push((line, pos)),
            RawToken::CloseBracket => {
                if self.open_brackets.pop().is_none() {
                    return self.fail(RibError::syntax(line, pos, "unbalanced ']'"));
                }
            }
            _ => {}
        }

        let (word, class) = match kind {
            RawToken::StructuralHint => (&slice[2..], TokenClass::Structural),
            RawToken::Comment => (&slice[1..], TokenClass::Structural),
            _ => (slice, TokenClass::Content),
        };

        Some(Ok(Token {
            line,
            pos,
            word: word.to_string(),
            kind,
            class,
            tag: None,
        }))
    }
}

/// Stream the tokens of `source`
pub fn tokenize(source: &str) -> Tokenizer<'_> {
    Tokenizer::new(source)
}
