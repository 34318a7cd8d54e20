//! Requests
//!
//! A [`Request`] is one logical RIB statement: a command name, the required
//! arguments in order, and the optional parameter list. The pipeline forwards
//! the optional list verbatim; pairing it up is the caller's contract (or the
//! strict preset's validator stage).

use crate::rib::values::Value;
use std::time::Duration;

/// Checkpoint marker recognised by the timer stage. Never reaches the wire.
pub const DEBUG_BARRIER: &str = "-->";
/// Plain comment prefix
pub const COMMENT: &str = "#";
/// Structural hint prefix
pub const STRUCTURAL_HINT: &str = "##";
/// File-format banner written at the head of every archive
pub const RIB_STRUCTURE: &str = "##RenderMan RIB-Structure 1.1";
/// Session control: opens the named archive on file sinks
pub const BEGIN: &str = "Begin";
/// Session control: closes the current archive on file sinks
pub const END: &str = "End";
pub const VERBATIM: &str = "Verbatim";

/// One protocol statement travelling through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub name: String,
    pub required: Vec<Value>,
    pub optional: Vec<Value>,
    /// Nesting depth assigned by the pretty-printer; zero when not pretty-printing
    pub indent: usize,
    /// Time since the first request, attached by the timer stage
    pub elapsed: Option<Duration>,
}

impl Request {
    pub fn new(name: impl Into<String>) -> Self {
        Request {
            name: name.into(),
            required: Vec::new(),
            optional: Vec::new(),
            indent: 0,
            elapsed: None,
        }
    }

    /// Append a required argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.required.push(value.into());
        self
    }

    pub fn args(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.required.extend(values);
        self
    }

    /// Append a `"token" value` pair to the parameter list
    pub fn param(mut self, token: impl Into<String>, value: impl Into<Value>) -> Self {
        self.optional.push(Value::Token(token.into()));
        self.optional.push(value.into());
        self
    }

    pub fn params(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.optional.extend(values);
        self
    }

    pub fn is_debug_barrier(&self) -> bool {
        self.name == DEBUG_BARRIER
    }

    pub fn is_session_control(&self) -> bool {
        self.name == BEGIN || self.name == END
    }

    /// All values in wire order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.required.iter().chain(self.optional.iter())
    }

    /// Single-line text form, without indentation or line terminator.
    ///
    /// Values that print as nothing (empty annotations) are skipped so the
    /// line never carries doubled separators.
    pub fn serialise(&self) -> String {
        let mut line = self.name.clone();
        for text in self.values().map(Value::serialise) {
            if text.is_empty() {
                continue;
            }
            line.push(' ');
            line.push_str(&text);
        }
        line
    }
}

/// Anything that can be turned into a [`Request`]
///
/// This is the producer side of the pipeline: a command name, its required
/// values and its optional values.
pub trait IntoRequest {
    fn into_request(self) -> Request;
}

impl IntoRequest for Request {
    fn into_request(self) -> Request {
        self
    }
}

impl<N: Into<String>> IntoRequest for (N, Vec<Value>, Vec<Value>) {
    fn into_request(self) -> Request {
        let (name, required, optional) = self;
        Request::new(name).args(required).params(optional)
    }
}
