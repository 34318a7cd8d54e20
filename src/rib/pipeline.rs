//! Output pipeline
//!
//! The pipeline is an ordered chain of stages. Every request written to it
//! passes through each stage in construction order; a stage may inspect the
//! request, rewrite it, or fail.
//!
//! # Architecture Overview
//!
//! ## 1. The `Stage` Trait
//!
//! The interface every link implements:
//!
//! ```rust,ignore
//! pub trait Stage {
//!     fn name(&self) -> &'static str;
//!     fn process(&mut self, request: Request) -> Result<Request>;
//!     fn close(&mut self) -> Result<()>;
//! }
//! ```
//!
//! ## 2. The `Pipeline`
//!
//! Owns its stages exclusively and is assembled once with [`Pipeline::append`]:
//!
//! ```rust,ignore
//! let mut pipeline = Pipeline::new()
//!     .append(Timer::new())
//!     .append(Statistics::new())
//!     .append(HandleFilter::new())
//!     .append(PrettyPrinter::new())
//!     .append(Sink::writer(std::io::stdout()));
//! pipeline.write(Request::new("WorldBegin"))?;
//! pipeline.close()?;
//! ```
//!
//! # Failure Semantics
//!
//! The first stage to fail halts the chain for that request and its error is
//! returned unchanged. Effects already applied by earlier stages stand: there
//! is no rollback. [`Pipeline::close`] closes every stage even when one of them
//! fails, and reports the first failure.
//!
//! # Module Organization
//!
//! - [`timer`]: start instant, elapsed forwarding and debug-barrier checkpoints
//! - [`statistics`]: per-command counters and byte totals
//! - [`params`]: parameter-list pairing check (strict preset)
//! - [`handles`]: string handle interning per namespace
//! - [`pretty`]: block depth tracking and indentation
//! - [`sink`]: final text encoding and destination ownership

pub mod handles;
pub mod params;
pub mod pretty;
pub mod sink;
pub mod statistics;
pub mod timer;

pub use handles::{HandleFilter, HandleTable};
pub use params::ParamListValidator;
pub use pretty::{BlockDepth, PrettyPrinter};
pub use sink::{Destination, FileDestination, SharedBuffer, Sink, WriterDestination};
pub use statistics::{Statistics, StatsSnapshot};
pub use timer::{Checkpoint, Timer};

use crate::rib::error::{Result, RibError};
use crate::rib::request::{IntoRequest, Request};
use std::any::Any;
use std::fmt;
use tracing::{debug, span, warn, Level};

/// One link of the output pipeline
pub trait Stage {
    /// Stage name for logs and diagnostics
    fn name(&self) -> &'static str;

    /// Inspect and possibly rewrite a request
    fn process(&mut self, request: Request) -> Result<Request>;

    /// Called once when the pipeline closes
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Read-only access to the concrete stage (e.g. to take a statistics snapshot)
    fn as_any(&self) -> &dyn Any;
}

/// An ordered, exclusively owned chain of stages
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    closed: bool,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline::default()
    }

    /// Add a stage at the end of the chain
    pub fn append<S>(mut self, stage: S) -> Self
    where
        S: Stage + 'static,
    {
        debug!(stage = stage.name(), position = self.stages.len(), "Appending stage");
        self.stages.push(Box::new(stage));
        self
    }

    /// Add an already boxed stage at the end of the chain
    pub fn append_boxed(mut self, stage: Box<dyn Stage>) -> Self {
        debug!(stage = stage.name(), position = self.stages.len(), "Appending stage");
        self.stages.push(stage);
        self
    }

    /// Push a request through every stage in order.
    ///
    /// Halts at the first failing stage and returns its error unchanged.
    pub fn write(&mut self, request: impl IntoRequest) -> Result<()> {
        if self.closed {
            return Err(RibError::PipelineClosed);
        }

        let mut request = request.into_request();
        if request.name.is_empty() {
            return Err(RibError::BadArgument("request name is empty".to_string()));
        }

        let span = span!(Level::TRACE, "pipeline_write", request = %request.name);
        let _enter = span.enter();

        for stage in &mut self.stages {
            request = stage.process(request).map_err(|e| {
                warn!(stage = stage.name(), error = %e, "Stage failed");
                e
            })?;
        }
        Ok(())
    }

    /// Close every stage, releasing the sink's destination.
    ///
    /// All stages are closed even if one fails; the first failure is returned.
    /// Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let mut first_error = None;
        for stage in &mut self.stages {
            if let Err(e) = stage.close() {
                warn!(stage = stage.name(), error = %e, "Stage failed to close");
                first_error.get_or_insert(e);
            }
        }
        debug!(stages = self.stages.len(), "Pipeline closed");

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// First stage of the given concrete type
    pub fn stage<T: Stage + 'static>(&self) -> Option<&T> {
        self.stages
            .iter()
            .find_map(|stage| stage.as_any().downcast_ref::<T>())
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("closed", &self.closed)
            .finish()
    }
}
