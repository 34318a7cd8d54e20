//! Error types shared by the output pipeline and the lexer.
//!
//! Every failure is a value travelling back along the synchronous call chain.
//! The binary-encoding kinds are kept so callers can match on the full
//! taxonomy, but the text path never produces them.

use std::fmt;
use std::io;
use thiserror::Error;

/// Errors raised while emitting or lexing RIB
#[derive(Debug, Error)]
pub enum RibError {
    /// Malformed lexical structure: unterminated quote or bracket
    #[error("{line}:{pos}: syntax error: {message}")]
    Syntax {
        line: usize,
        pos: usize,
        message: String,
    },

    /// Statement head matches neither the vocabulary nor a literal shape
    #[error("{line}:{pos}: undefined RIB request '{word}'")]
    Unregistered {
        word: String,
        line: usize,
        pos: usize,
    },

    #[error("invalid binary token")]
    BadToken,

    #[error("invalid encoded RIB request code")]
    BadRibCode,

    #[error("undefined encoded string token")]
    BadStringToken,

    #[error("malformed binary encoding")]
    ProtocolBotch,

    /// A value tagged as a handle holds something that cannot be one
    #[error("invalid {namespace} handle: cannot intern a value of type '{type_name}'")]
    BadHandle {
        namespace: String,
        type_name: String,
    },

    #[error("parameter list type mismatch in {request}: {message}")]
    BadParamList { request: String, message: String },

    #[error("protocol version number mismatch: requested {requested}, supported {supported}")]
    BadVersion { requested: String, supported: String },

    #[error("{line}:{pos}: overflowing an internal limit: {message}")]
    LimitCheck {
        line: usize,
        pos: usize,
        message: String,
    },

    #[error("{line}:{pos}: array of {len} elements exceeds the limit of {limit}")]
    ArrayTooBig {
        line: usize,
        pos: usize,
        len: usize,
        limit: usize,
    },

    #[error("{line}:{pos}: string of {len} bytes exceeds the limit of {limit}")]
    StringTooBig {
        line: usize,
        pos: usize,
        len: usize,
        limit: usize,
    },

    #[error("generic instance of insufficient memory")]
    OutOfMemory,

    #[error("not supported at this time: {0}")]
    NotSupported(String),

    #[error("incorrect parameter value: {0}")]
    BadArgument(String),

    /// A block End with no open Begin, or closing a different block
    #[error("'{name}' does not close any open block{}", expected_suffix(.expected))]
    UnmatchedEnd {
        name: String,
        expected: Option<String>,
    },

    #[error("pipeline is closed")]
    PipelineClosed,

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

fn expected_suffix(expected: &Option<String>) -> String {
    match expected {
        Some(open) => format!(" (innermost open block expects '{}')", open),
        None => String::new(),
    }
}

/// Stable discriminant for matching and logging without payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    Unregistered,
    BadToken,
    BadRibCode,
    BadStringToken,
    ProtocolBotch,
    BadHandle,
    BadParamList,
    BadVersion,
    LimitCheck,
    ArrayTooBig,
    StringTooBig,
    OutOfMemory,
    NotSupported,
    BadArgument,
    UnmatchedEnd,
    PipelineClosed,
    Io,
}

impl RibError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RibError::Syntax { .. } => ErrorKind::Syntax,
            RibError::Unregistered { .. } => ErrorKind::Unregistered,
            RibError::BadToken => ErrorKind::BadToken,
            RibError::BadRibCode => ErrorKind::BadRibCode,
            RibError::BadStringToken => ErrorKind::BadStringToken,
            RibError::ProtocolBotch => ErrorKind::ProtocolBotch,
            RibError::BadHandle { .. } => ErrorKind::BadHandle,
            RibError::BadParamList { .. } => ErrorKind::BadParamList,
            RibError::BadVersion { .. } => ErrorKind::BadVersion,
            RibError::LimitCheck { .. } => ErrorKind::LimitCheck,
            RibError::ArrayTooBig { .. } => ErrorKind::ArrayTooBig,
            RibError::StringTooBig { .. } => ErrorKind::StringTooBig,
            RibError::OutOfMemory => ErrorKind::OutOfMemory,
            RibError::NotSupported(_) => ErrorKind::NotSupported,
            RibError::BadArgument(_) => ErrorKind::BadArgument,
            RibError::UnmatchedEnd { .. } => ErrorKind::UnmatchedEnd,
            RibError::PipelineClosed => ErrorKind::PipelineClosed,
            RibError::Io(_) => ErrorKind::Io,
        }
    }

    /// Source position for lexical failures
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            RibError::Syntax { line, pos, .. }
            | RibError::Unregistered { line, pos, .. }
            | RibError::LimitCheck { line, pos, .. }
            | RibError::ArrayTooBig { line, pos, .. }
            | RibError::StringTooBig { line, pos, .. } => Some((*line, *pos)),
            _ => None,
        }
    }

    pub(crate) fn syntax(line: usize, pos: usize, message: impl Into<String>) -> Self {
        RibError::Syntax {
            line,
            pos,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::Unregistered => "unregistered-request",
            ErrorKind::BadToken => "bad-token",
            ErrorKind::BadRibCode => "bad-rib-code",
            ErrorKind::BadStringToken => "bad-string-token",
            ErrorKind::ProtocolBotch => "protocol-botch",
            ErrorKind::BadHandle => "bad-handle",
            ErrorKind::BadParamList => "bad-param-list",
            ErrorKind::BadVersion => "bad-version",
            ErrorKind::LimitCheck => "limit-check",
            ErrorKind::ArrayTooBig => "array-too-big",
            ErrorKind::StringTooBig => "string-too-big",
            ErrorKind::OutOfMemory => "out-of-memory",
            ErrorKind::NotSupported => "not-supported",
            ErrorKind::BadArgument => "bad-argument",
            ErrorKind::UnmatchedEnd => "unmatched-end",
            ErrorKind::PipelineClosed => "pipeline-closed",
            ErrorKind::Io => "io",
        };
        write!(f, "{}", name)
    }
}

pub type Result<T> = std::result::Result<T, RibError>;
