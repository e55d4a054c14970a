//! Prelude module for convenient imports
//!
//! ```no_run
//! use slatejs::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut runtime = Runtime::new();
//!     let instant = runtime.new_instant(0)?;
//!     println!("{:?}", instant);
//!     Ok(())
//! }
//! ```

// Core runtime types
pub use crate::runtime::{Runtime, Value, ObjectKind};

// Invocation
pub use crate::runtime::{CallFrame, FunctionFlags, InvocationMode, ResourceLimits, VM};

// Brands and built-ins
pub use crate::runtime::{validate_brand, Brand, BrandedSlots, GlobalEnvironment, Instant};

// Error handling
pub use crate::error::{Error, ErrorKind, Result, StackTrace, StackFrame};

// Test runner
pub use crate::test_runner::{TestConfig, TestReport, TestRunner, TestSuite};

// Version
pub use crate::VERSION;
