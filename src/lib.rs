//! # rib
//!
//! Emits and re-reads RenderMan Interface Bytestream (RIB) text.
//!
//! The encode path runs typed requests through an ordered [pipeline](rib::pipeline)
//! of stages ending in a sink. The decode path [tokenizes and classifies](rib::lexing)
//! RIB text against the protocol vocabulary.
//!
//! ```rust,ignore
//! use rib::{Context, Pipeline, PrettyPrinter, Sink};
//!
//! let (sink, buffer) = Sink::buffer();
//! let mut ctx = Context::new(Pipeline::new().append(PrettyPrinter::new()).append(sink));
//! ctx.world_begin()?;
//! ctx.sphere(1.0, -1.0, 1.0, 360.0, vec![])?;
//! ctx.world_end()?;
//! ```

pub mod rib;

pub use rib::context::{Context, RecordKind};
pub use rib::error::{ErrorKind, Result, RibError};
pub use rib::lexing::{lex, tokenize, Token};
pub use rib::pipeline::{Pipeline, PrettyPrinter, Sink, Stage};
pub use rib::request::Request;
pub use rib::values::{HandleNamespace, Value};
