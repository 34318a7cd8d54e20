//! Lexing of RIB text
//!
//!     Two stages, each a lazy iterator feeding the next:
//!
//!         source ──tokenize──> Token ──classify──> Token (tagged)
//!
//!     1. [`tokenizer`]: logos-based scanning into position-tagged words, quoted
//!        strings, brackets and comment lines.
//!     2. [`classification`]: assigns each token its meaning (request name or
//!        literal shape), screening statement heads through a [`VocabularyFilter`]
//!        before the exact [`vocabulary`] lookup.
//!
//!     Both stages stop at the first error. [`lex`] runs them with the shared
//!     Bloom filter and default limits; [`lex_with`] takes both explicitly.
//!
//! Positions are 1-based lines and 1-based character columns throughout.

pub mod classification;
pub mod filter;
pub mod tokenizer;
pub mod tokens;
pub mod vocabulary;

pub use classification::{classify, literal_shape, Lexer, Limits};
pub use filter::{ri_bloom_filter, BloomFilter, ExactFilter, VocabularyFilter};
pub use tokenizer::{tokenize, LineIndex, Tokenizer};
pub use tokens::{LiteralShape, RawToken, SemanticTag, Token, TokenClass};

use crate::rib::error::Result;
use rib_config::{FilterKind, LexerConfig};

/// Classified token stream over `source`, with default filter and limits
pub fn lex(source: &str) -> Lexer<'static, Tokenizer<'_>> {
    classify(tokenize(source), ri_bloom_filter())
}

/// Classified token stream with an explicit filter and limits
pub fn lex_with<'src, 'f>(
    source: &'src str,
    filter: &'f dyn VocabularyFilter,
    limits: Limits,
) -> Lexer<'f, Tokenizer<'src>> {
    classify(tokenize(source), filter).with_limits(limits)
}

/// Lex all of `source`, failing on the first error
pub fn lex_all(source: &str) -> Result<Vec<Token>> {
    lex(source).collect()
}

/// Build the pre-filter a lexer configuration asks for
pub fn filter_from_config(config: &LexerConfig) -> Box<dyn VocabularyFilter> {
    match config.filter {
        FilterKind::Bloom => Box::new(BloomFilter::from_vocabulary(
            config.bloom_bits,
            config.bloom_hashes,
        )),
        FilterKind::Exact => Box::new(ExactFilter::from_vocabulary()),
    }
}
