//! Runtime environment for slatejs
//!
//! This module provides the host-facing runtime: the object model, the
//! invocation dispatcher and the built-in objects.

pub mod brand;
mod global;
mod intrinsics;
pub mod temporal;
mod value;
mod vm;

pub use brand::{validate_brand, Brand, BrandedSlots};
pub use global::GlobalEnvironment;
pub use intrinsics::Intrinsics;
pub use temporal::Instant;
pub use value::{Function, FunctionFlags, NativeFn, Object, ObjectKind, ObjectRef, PropertyMap, Value};
pub use vm::{CallFrame, InvocationMode, ResourceLimits, ThisBinding, MAX_CALL_DEPTH, VM};

use crate::error::{messages, Error, Result};
use num_bigint::BigInt;

/// The slatejs runtime
pub struct Runtime {
    vm: VM,
}

impl Runtime {
    /// Create a new runtime
    pub fn new() -> Self {
        Self::with_limits(ResourceLimits::new())
    }

    /// Create a new runtime with the given resource limits
    pub fn with_limits(limits: ResourceLimits) -> Self {
        let mut vm = VM::with_limits(limits);
        intrinsics::register_globals(&mut vm);
        tracing::debug!("runtime initialized");
        Self { vm }
    }

    /// The underlying VM
    pub fn vm(&mut self) -> &mut VM {
        &mut self.vm
    }

    /// The global object
    pub fn global_object(&self) -> Value {
        self.vm.global().this_value()
    }

    /// `this` as seen by top-level code
    pub fn top_level_this(&self) -> Value {
        self.vm.this_value()
    }

    /// Get a global value
    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.vm.get_global(name)
    }

    /// Set a global value
    pub fn set_global(&mut self, name: &str, value: Value) {
        self.vm.set_global(name, value);
    }

    /// Resolve a dotted global path such as `Temporal.Instant`
    pub fn lookup(&self, path: &str) -> Result<Value> {
        let mut parts = path.split('.');
        let first = parts.next().unwrap_or_default();
        let mut value = self
            .get_global(first)
            .ok_or_else(|| Error::reference_error(messages::not_defined(first)))?;
        for part in parts {
            value = match value.get_property(part) {
                Some(next) => next,
                None if value.is_nullish() => {
                    return Err(Error::type_error(messages::cannot_read_property(
                        part,
                        &value.to_js_string(),
                    )))
                }
                None => Value::Undefined,
            };
        }
        Ok(value)
    }

    /// Define a function and bind it as a global.
    ///
    /// Without [`FunctionFlags::STRICT`] the function behaves like sloppy
    /// script code: plain calls see the global object as `this`.
    pub fn define_function<F>(
        &mut self,
        name: &str,
        length: usize,
        flags: FunctionFlags,
        func: F,
    ) -> Value
    where
        F: Fn(&mut VM, &CallFrame, &[Value]) -> Result<Value> + 'static,
    {
        let function = self.vm.create_function(name, length, flags, func);
        self.vm.set_global(name, function.clone());
        function
    }

    /// Run host code as top-level script code
    pub fn run_script<F>(&mut self, body: F) -> Result<Value>
    where
        F: FnOnce(&mut VM, &CallFrame) -> Result<Value>,
    {
        self.vm.run_script(body)
    }

    /// Plain call, or a call with an explicit receiver
    pub fn call(&mut self, callee: &Value, this: Option<Value>, args: &[Value]) -> Result<Value> {
        self.vm.call(callee, this, args)
    }

    /// Method call `receiver.name(...args)`
    pub fn call_method(&mut self, receiver: &Value, name: &str, args: &[Value]) -> Result<Value> {
        self.vm.call_method(receiver, name, args)
    }

    /// `new callee(...args)`
    pub fn construct(&mut self, callee: &Value, args: &[Value]) -> Result<Value> {
        self.vm.construct(callee, args, None)
    }

    /// `new Temporal.Instant(epochNanoseconds)`
    pub fn new_instant(&mut self, epoch_nanoseconds: impl Into<BigInt>) -> Result<Value> {
        let constructor = self.lookup("Temporal.Instant")?;
        self.construct(&constructor, &[Value::BigInt(epoch_nanoseconds.into())])
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_runtime_top_level_this() {
        let runtime = Runtime::new();
        let this = runtime.top_level_this();
        assert!(this.strict_equals(&runtime.global_object()));
        assert!(this.strict_equals(&runtime.get_global("globalThis").unwrap()));
    }

    #[test]
    fn test_runtime_lookup() {
        let runtime = Runtime::new();
        let ctor = runtime.lookup("Temporal.Instant").unwrap();
        assert_eq!(ctor.type_of(), "function");
        assert_eq!(ctor.get_property("name"), Some(Value::from("Instant")));
        assert_eq!(ctor.get_property("length"), Some(Value::Number(1.0)));
    }

    #[test]
    fn test_runtime_lookup_missing() {
        let runtime = Runtime::new();
        let err = runtime.lookup("Nope.x").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::ReferenceError));
        assert_eq!(err.message(), "Nope is not defined");
    }

    #[test]
    fn test_runtime_new_instant() {
        let mut runtime = Runtime::new();
        let a = runtime.new_instant(111).unwrap();
        let b = runtime.new_instant(111).unwrap();
        let result = runtime.call_method(&a, "equals", &[b]).unwrap();
        assert_eq!(result, Value::Boolean(true));
    }

    #[test]
    fn test_runtimes_have_distinct_globals() {
        let a = Runtime::new();
        let b = Runtime::new();
        assert!(!a.global_object().strict_equals(&b.global_object()));
    }
}
