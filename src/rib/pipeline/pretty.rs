//! Pretty-printer stage
//!
//!     Assigns each request its nesting depth so the sink can indent it. The depth
//!     grows after a block Begin command is emitted and shrinks before its End is
//!     emitted, so a block's Begin and End line up and its body sits one level in.
//!
//! Blocks
//!
//!     Frame, World, Attribute, Transform, Solid, Object and Motion. Open blocks are
//!     kept as a stack: an End must close the innermost open block. An End with no
//!     open block, or one that closes a different block, is an error. The depth is
//!     never clamped.

use crate::rib::error::{Result, RibError};
use crate::rib::pipeline::Stage;
use crate::rib::request::Request;
use std::any::Any;
use tracing::warn;

/// Block Begin commands and their matching End
pub const BLOCKS: [(&str, &str); 7] = [
    ("FrameBegin", "FrameEnd"),
    ("WorldBegin", "WorldEnd"),
    ("AttributeBegin", "AttributeEnd"),
    ("TransformBegin", "TransformEnd"),
    ("SolidBegin", "SolidEnd"),
    ("ObjectBegin", "ObjectEnd"),
    ("MotionBegin", "MotionEnd"),
];

/// End command matching a block Begin
pub fn block_end_for(name: &str) -> Option<&'static str> {
    BLOCKS
        .iter()
        .find(|(begin, _)| *begin == name)
        .map(|(_, end)| *end)
}

pub fn is_block_end(name: &str) -> bool {
    BLOCKS.iter().any(|(_, end)| *end == name)
}

/// Stack of open blocks, shared by the pretty-printer stage and the re-formatter
#[derive(Debug, Default, Clone)]
pub struct BlockDepth {
    open: Vec<&'static str>,
}

impl BlockDepth {
    pub fn new() -> Self {
        BlockDepth::default()
    }

    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Depth at which `name` is printed; updates the stack
    pub fn enter(&mut self, name: &str) -> Result<usize> {
        if let Some(end) = block_end_for(name) {
            let depth = self.open.len();
            self.open.push(end);
            return Ok(depth);
        }
        if is_block_end(name) {
            return match self.open.last() {
                Some(expected) if *expected == name => {
                    self.open.pop();
                    Ok(self.open.len())
                }
                Some(expected) => Err(RibError::UnmatchedEnd {
                    name: name.to_string(),
                    expected: Some(expected.to_string()),
                }),
                None => Err(RibError::UnmatchedEnd {
                    name: name.to_string(),
                    expected: None,
                }),
            };
        }
        Ok(self.open.len())
    }

    /// Ends still owed, innermost first
    pub fn unclosed(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.open.iter().rev().copied()
    }
}

#[derive(Debug, Default)]
pub struct PrettyPrinter {
    blocks: BlockDepth,
}

impl PrettyPrinter {
    pub fn new() -> Self {
        PrettyPrinter::default()
    }

    pub fn depth(&self) -> usize {
        self.blocks.depth()
    }
}

impl Stage for PrettyPrinter {
    fn name(&self) -> &'static str {
        "pretty-printer"
    }

    fn process(&mut self, mut request: Request) -> Result<Request> {
        request.indent = self.blocks.enter(&request.name)?;
        Ok(request)
    }

    fn close(&mut self) -> Result<()> {
        if self.blocks.depth() > 0 {
            let missing: Vec<_> = self.blocks.unclosed().collect();
            warn!(missing = ?missing, "Closing with open blocks");
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
