//! VM type definitions
//!
//! This module contains types used by the VM.

use super::super::value::{FunctionFlags, Value};

/// How a function is being invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    /// Plain call, `f()` or `obj.f()`
    Call,
    /// Construction, `new f()`
    Construct,
}

/// How the receiver of a call is obtained, before anything is allocated
#[derive(Debug, Clone, PartialEq)]
pub enum ThisBinding {
    /// Use the explicitly supplied receiver
    Explicit(Value),
    /// Use the global object
    Global,
    /// Leave `this` undefined
    Undefined,
    /// Allocate an ordinary object from `new.target.prototype`
    Allocate,
    /// The builtin constructor allocates its own instance
    Deferred,
}

impl ThisBinding {
    /// Decide the receiver for `(callable flags, mode, explicit receiver)`.
    ///
    /// In non-strict functions a nullish explicit receiver is replaced by
    /// the global object, the same as when none is supplied.
    pub fn resolve(flags: FunctionFlags, mode: InvocationMode, explicit: Option<&Value>) -> Self {
        match mode {
            InvocationMode::Construct if flags.contains(FunctionFlags::BUILTIN) => {
                ThisBinding::Deferred
            }
            InvocationMode::Construct => ThisBinding::Allocate,
            InvocationMode::Call => {
                let strict = flags.contains(FunctionFlags::STRICT);
                match explicit {
                    Some(this) if strict || !this.is_nullish() => {
                        ThisBinding::Explicit(this.clone())
                    }
                    _ if strict => ThisBinding::Undefined,
                    _ => ThisBinding::Global,
                }
            }
        }
    }
}

/// A call frame on the call stack
#[derive(Clone, Debug)]
pub struct CallFrame {
    /// Function being executed (`undefined` for top-level code)
    pub callee: Value,
    /// The resolved receiver
    pub this_value: Value,
    /// Call or construct
    pub mode: InvocationMode,
    /// `new.target` for construction frames
    pub new_target: Option<Value>,
}

impl CallFrame {
    /// The frame top-level script code runs in
    pub fn top_level(global: Value) -> Self {
        Self {
            callee: Value::Undefined,
            this_value: global,
            mode: InvocationMode::Call,
            new_target: None,
        }
    }

    /// Create a frame for a plain call
    pub fn for_call(callee: Value, this_value: Value) -> Self {
        Self {
            callee,
            this_value,
            mode: InvocationMode::Call,
            new_target: None,
        }
    }

    /// Create a frame for a constructor call
    pub fn for_constructor(callee: Value, this_value: Value, new_target: Value) -> Self {
        Self {
            callee,
            this_value,
            mode: InvocationMode::Construct,
            new_target: Some(new_target),
        }
    }

    /// Is this a constructor call?
    pub fn is_constructor(&self) -> bool {
        self.mode == InvocationMode::Construct
    }

    /// Argument at `index`, or `undefined`
    pub fn arg(args: &[Value], index: usize) -> Value {
        args.get(index).cloned().unwrap_or(Value::Undefined)
    }
}

/// Resource limits configuration for the VM
#[derive(Debug, Clone)]
pub struct ResourceLimits {
    /// Maximum call stack depth
    pub stack_depth_limit: Option<usize>,
}

impl ResourceLimits {
    /// Create new resource limits with the default call depth
    pub fn new() -> Self {
        Self {
            stack_depth_limit: Some(super::MAX_CALL_DEPTH),
        }
    }

    /// Set stack depth limit
    pub fn with_stack_depth_limit(mut self, depth: usize) -> Self {
        self.stack_depth_limit = Some(depth);
        self
    }
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self::new()
    }
}
