//! Error types for the slatejs runtime

use std::fmt;
use thiserror::Error;

/// A single frame in a JavaScript stack trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Function name (or `"<anonymous>"` for anonymous functions)
    pub function_name: String,
    /// Whether the frame was entered through `new`
    pub is_construct: bool,
    /// Whether this is a native function
    pub is_native: bool,
}

impl StackFrame {
    /// Create a stack frame for a host-defined function
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            is_construct: false,
            is_native: false,
        }
    }

    /// Create a stack frame for a native builtin
    pub fn native(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            is_construct: false,
            is_native: true,
        }
    }

    /// Mark the frame as a construction frame
    pub fn constructing(mut self) -> Self {
        self.is_construct = true;
        self
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.is_construct { "new " } else { "" };
        if self.is_native {
            write!(f, "    at {}{} (native)", prefix, self.function_name)
        } else {
            write!(f, "    at {}{}", prefix, self.function_name)
        }
    }
}

/// A JavaScript stack trace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackTrace {
    /// Stack frames from innermost to outermost
    pub frames: Vec<StackFrame>,
}

impl StackTrace {
    /// Create an empty stack trace
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Add a frame to the stack trace
    pub fn push(&mut self, frame: StackFrame) {
        self.frames.push(frame);
    }

    /// Check if the stack trace is empty
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            writeln!(f, "{}", frame)?;
        }
        Ok(())
    }
}

/// Main error type for slatejs
#[derive(Error, Debug)]
pub enum Error {
    /// Runtime error - TypeError, RangeError, etc.
    #[error("{kind}: {message}{}", if stack_trace.is_empty() { String::new() } else { format!("\n{}", stack_trace) })]
    RuntimeError {
        kind: ErrorKind,
        message: String,
        stack_trace: StackTrace,
    },

    /// Internal engine error
    #[error("InternalError: {0}")]
    InternalError(String),

    /// IO error
    #[error("IOError: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    /// Resource limit exceeded
    #[error("ResourceLimitError: {kind}: {message}")]
    ResourceLimitError {
        kind: ResourceLimitKind,
        message: String,
    },
}

/// Resource limit kinds enforced by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceLimitKind {
    /// Call stack depth limit exceeded
    StackDepthLimit,
}

impl fmt::Display for ResourceLimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceLimitKind::StackDepthLimit => write!(f, "StackDepthLimit"),
        }
    }
}

/// JavaScript error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::enum_variant_names)]
pub enum ErrorKind {
    /// TypeError - wrong type for operation
    TypeError,
    /// ReferenceError - undefined variable
    ReferenceError,
    /// RangeError - value out of range
    RangeError,
    /// SyntaxError - malformed literal at runtime (e.g. BigInt("1.5"))
    SyntaxError,
    /// Generic Error - assertion failures and host-thrown errors
    GenericError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::TypeError => write!(f, "TypeError"),
            ErrorKind::ReferenceError => write!(f, "ReferenceError"),
            ErrorKind::RangeError => write!(f, "RangeError"),
            ErrorKind::SyntaxError => write!(f, "SyntaxError"),
            ErrorKind::GenericError => write!(f, "Error"),
        }
    }
}

impl Error {
    /// Create a TypeError
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::runtime(ErrorKind::TypeError, message)
    }

    /// Create a ReferenceError
    pub fn reference_error(message: impl Into<String>) -> Self {
        Self::runtime(ErrorKind::ReferenceError, message)
    }

    /// Create a RangeError
    pub fn range_error(message: impl Into<String>) -> Self {
        Self::runtime(ErrorKind::RangeError, message)
    }

    /// Create a SyntaxError
    pub fn syntax_error(message: impl Into<String>) -> Self {
        Self::runtime(ErrorKind::SyntaxError, message)
    }

    /// Create a plain `Error`
    pub fn generic(message: impl Into<String>) -> Self {
        Self::runtime(ErrorKind::GenericError, message)
    }

    fn runtime(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error::RuntimeError {
            kind,
            message: message.into(),
            stack_trace: StackTrace::new(),
        }
    }

    /// Add stack trace to an existing error. A trace that is already present
    /// is kept, so the innermost throw site wins.
    pub fn with_stack_trace(self, stack_trace: StackTrace) -> Self {
        match self {
            Error::RuntimeError {
                kind,
                message,
                stack_trace: existing,
            } if existing.is_empty() => Error::RuntimeError {
                kind,
                message,
                stack_trace,
            },
            other => other,
        }
    }

    /// Create a stack depth limit exceeded error
    pub fn stack_depth_exceeded(depth: usize, limit: usize) -> Self {
        Error::ResourceLimitError {
            kind: ResourceLimitKind::StackDepthLimit,
            message: format!(
                "Call stack depth limit exceeded: {} frames, limit was {}",
                depth, limit
            ),
        }
    }

    /// The JavaScript error kind, if this error is a thrown JavaScript error
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::RuntimeError { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The bare message, without kind prefix or stack trace
    pub fn message(&self) -> String {
        match self {
            Error::RuntimeError { message, .. } => message.clone(),
            Error::InternalError(message) => message.clone(),
            Error::IoError { source } => source.to_string(),
            Error::ResourceLimitError { message, .. } => message.clone(),
        }
    }

    /// The stack trace captured when the error crossed a call frame
    pub fn stack_trace(&self) -> Option<&StackTrace> {
        match self {
            Error::RuntimeError { stack_trace, .. } => Some(stack_trace),
            _ => None,
        }
    }
}

/// Result type alias for slatejs
pub type Result<T> = std::result::Result<T, Error>;

/// Standardized error message templates
///
/// Message text is observable by scripts and matched exactly by test
/// harnesses; change these only together with the tests that pin them.
pub mod messages {
    pub const NOT_A_FUNCTION: &str = "is not a function";
    pub const NOT_A_CONSTRUCTOR: &str = "is not a constructor";
    pub const IS_NOT_DEFINED: &str = "is not defined";

    pub const INVALID_EPOCH_NANOSECONDS: &str = "Invalid epoch nanoseconds value";
    pub const INVALID_INSTANT_STRING: &str = "Invalid instant string";

    /// Format a "X is not a function" error message
    pub fn not_a_function(name: &str) -> String {
        format!("{} {}", name, NOT_A_FUNCTION)
    }

    /// Format a "X is not a constructor" error message
    pub fn not_a_constructor(name: &str) -> String {
        format!("{} {}", name, NOT_A_CONSTRUCTOR)
    }

    /// Format a "Cannot read property 'X' of Y" error message
    pub fn cannot_read_property(prop: &str, of: &str) -> String {
        format!("Cannot read property '{}' of {}", prop, of)
    }

    /// Format a "X is not defined" error message
    pub fn not_defined(name: &str) -> String {
        format!("{} {}", name, IS_NOT_DEFINED)
    }

    /// Format a "Not a X" brand mismatch message
    pub fn not_a(type_name: &str) -> String {
        format!("Not a {}", type_name)
    }

    /// Format a "X constructor must be called with 'new'" error message
    pub fn constructor_without_new(name: &str) -> String {
        format!("{} constructor must be called with 'new'", name)
    }

    /// Format a "Cannot convert X to Y" error message
    pub fn cannot_convert(from: &str, to: &str) -> String {
        format!("Cannot convert {} to {}", from, to)
    }

    /// Format a "X: Y" instant parse failure message
    pub fn invalid_instant_string(input: &str) -> String {
        format!("{}: {}", INVALID_INSTANT_STRING, input)
    }
}
