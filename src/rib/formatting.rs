//! Re-formatting of RIB text
//!
//!     Reads RIB source through the lexer and writes it back one statement per
//!     line, indented by block depth with the same rules the pretty-printer stage
//!     applies to emitted requests. Applying it to its own output changes nothing.
//!
//! Layout
//!
//!     - A statement is its request name followed by its arguments, space separated.
//!       Arrays print as `[a b c]`, with no padding inside the brackets.
//!     - Comment and structural hint lines print as written, at the current depth.
//!     - A comment inside a statement splits it; the rest of the statement continues
//!       on a line one level deeper than the statement.
//!     - Literals before the first request print on their own line.
//!
//!     Block nesting errors (an End with no matching Begin) are reported, not
//!     repaired.

use crate::rib::error::Result;
use crate::rib::lexing::{self, RawToken, Token};
use crate::rib::pipeline::BlockDepth;
use tracing::debug;

/// Indent unit used by [`format_rib`]
pub const DEFAULT_INDENT: &str = "    ";

/// Re-format `source` with the default indent unit
pub fn format_rib(source: &str) -> Result<String> {
    format_rib_with(source, DEFAULT_INDENT)
}

/// Re-format `source`, indenting each level with `indent_unit`
pub fn format_rib_with(source: &str, indent_unit: &str) -> Result<String> {
    let mut formatter = Formatter::new(indent_unit);
    for token in lexing::lex(source) {
        formatter.push(token?)?;
    }
    Ok(formatter.finish())
}

struct Line {
    indent: usize,
    text: String,
}

struct Formatter<'a> {
    indent_unit: &'a str,
    blocks: BlockDepth,
    out: String,
    current: Option<Line>,
    /// Depth of the statement most recently started, for continuation lines
    statement_indent: Option<usize>,
}

impl<'a> Formatter<'a> {
    fn new(indent_unit: &'a str) -> Self {
        Formatter {
            indent_unit,
            blocks: BlockDepth::new(),
            out: String::new(),
            current: None,
            statement_indent: None,
        }
    }

    fn push(&mut self, token: Token) -> Result<()> {
        if token.kind.is_comment() {
            self.flush();
            let depth = self.blocks.depth();
            self.emit(depth, &token.source_text());
            return Ok(());
        }

        if let Some(name) = token.command() {
            self.flush();
            let indent = self.blocks.enter(name)?;
            self.statement_indent = Some(indent);
            self.current = Some(Line {
                indent,
                text: token.word,
            });
            return Ok(());
        }

        let indent = match self.statement_indent {
            Some(indent) => indent + 1,
            None => self.blocks.depth(),
        };
        let line = self.current.get_or_insert_with(|| Line {
            indent,
            text: String::new(),
        });
        let glued = line.text.is_empty()
            || line.text.ends_with('[')
            || token.kind == RawToken::CloseBracket;
        if !glued {
            line.text.push(' ');
        }
        line.text.push_str(&token.word);
        Ok(())
    }

    fn flush(&mut self) {
        if let Some(line) = self.current.take() {
            self.emit(line.indent, &line.text);
        }
    }

    fn emit(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.out.push_str(self.indent_unit);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn finish(mut self) -> String {
        self.flush();
        if self.blocks.depth() > 0 {
            let missing: Vec<_> = self.blocks.unclosed().collect();
            debug!(missing = ?missing, "Formatted text leaves blocks open");
        }
        self.out
    }
}
