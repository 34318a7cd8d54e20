//! Preset pipelines
//!
//!     Ready-made stage orderings, each ending in the sink supplied by the caller:
//!
//!     - default: Statistics, then the pretty-printer when enabled
//!     - strict:  Timer, Statistics, ParamListValidator, HandleFilter, PrettyPrinter
//!     - entity:  HandleFilter, PrettyPrinter
//!
//!     [`from_config`] picks the ordering from a [`RibConfig`] and builds a file
//!     sink under the configured output directory.

use crate::rib::context::Context;
use crate::rib::error::{Result, RibError};
use crate::rib::pipeline::{
    HandleFilter, ParamListValidator, Pipeline, PrettyPrinter, Sink, Stage, Statistics, Timer,
};
use rib_config::{Encoding, Preset, RibConfig};
use tracing::info;

pub fn default_pipeline(sink: impl Stage + 'static, pretty_print: bool) -> Pipeline {
    let pipeline = Pipeline::new().append(Statistics::new());
    let pipeline = if pretty_print {
        pipeline.append(PrettyPrinter::new())
    } else {
        pipeline
    };
    pipeline.append(sink)
}

pub fn strict_pipeline(sink: impl Stage + 'static) -> Pipeline {
    Pipeline::new()
        .append(Timer::new())
        .append(Statistics::new())
        .append(ParamListValidator::new())
        .append(HandleFilter::new())
        .append(PrettyPrinter::new())
        .append(sink)
}

/// String handles interned, always pretty-printed
pub fn entity_pipeline(sink: impl Stage + 'static) -> Pipeline {
    Pipeline::new()
        .append(HandleFilter::new())
        .append(PrettyPrinter::new())
        .append(sink)
}

/// Assemble a named preset around `sink`
pub fn assemble(preset: Preset, pretty_print: bool, sink: impl Stage + 'static) -> Pipeline {
    let pipeline = match preset {
        Preset::Default => default_pipeline(sink, pretty_print),
        Preset::Strict => strict_pipeline(sink),
        Preset::Entity => entity_pipeline(sink),
    };
    info!(preset = ?preset, stages = ?pipeline.stage_names(), "Assembled pipeline");
    pipeline
}

/// Assemble the configured preset around `sink`.
///
/// Fails with NotSupported for the binary encoding.
pub fn with_sink(config: &RibConfig, sink: impl Stage + 'static) -> Result<Pipeline> {
    if config.pipeline.encoding == Encoding::Binary {
        return Err(RibError::NotSupported("binary RIB encoding".to_string()));
    }
    Ok(assemble(
        config.pipeline.preset,
        config.pipeline.pretty_print,
        sink,
    ))
}

/// Configured preset writing archives under `output.directory`
pub fn from_config(config: &RibConfig) -> Result<Pipeline> {
    let sink = Sink::file(&config.output.directory).with_indent(&config.pipeline.indent_string);
    with_sink(config, sink)
}

/// Context over the configured file pipeline
pub fn context(config: &RibConfig) -> Result<Context> {
    from_config(config).map(Context::new)
}
