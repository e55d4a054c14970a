//! slatejs: an embeddable JavaScript object-model core written in Rust
//!
//! slatejs implements the parts of a JavaScript engine that decide what a
//! function sees as `this`, how built-in objects are branded and checked,
//! and the `Temporal.Instant` type built on top of them.
//!
//! # Quick Start
//!
//! ```no_run
//! use slatejs::{Runtime, Value};
//!
//! fn main() -> slatejs::Result<()> {
//!     let mut runtime = Runtime::new();
//!     let a = runtime.new_instant(111)?;
//!     let b = runtime.new_instant(999)?;
//!     let same = runtime.call_method(&a, "equals", &[b])?;
//!     assert_eq!(same, Value::Boolean(false));
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! | Category | Modules |
//! |----------|---------|
//! | **Core** | [`runtime`], [`error`](Error) |
//! | **Tooling** | [`test_runner`] |
// Clippy configuration for slatejs.
//
// - arc_with_non_send_sync: Value uses Rc<RefCell> (single-threaded)
// - new_without_default: Some types have required initialization logic
#![allow(clippy::arc_with_non_send_sync)]
#![allow(clippy::new_without_default)]

pub mod prelude;
pub mod runtime;
pub mod test_runner;

mod error;

pub use error::{messages, Error, ErrorKind, ResourceLimitKind, Result, StackFrame, StackTrace};
pub use runtime::{ObjectKind, Runtime, Value};

/// slatejs version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
