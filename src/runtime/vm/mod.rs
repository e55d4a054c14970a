//! Invocation dispatcher for slatejs
//!
//! The VM owns the call stack, the global environment and the intrinsic
//! objects. Every call, method call and construction goes through
//! [`VM::invoke`], which resolves the receiver once per frame, runs the
//! function body and applies the constructor-return override.

mod types;

pub use types::{CallFrame, InvocationMode, ResourceLimits, ThisBinding};

use super::global::GlobalEnvironment;
use super::intrinsics::Intrinsics;
use super::value::{Function, FunctionFlags, Object, ObjectKind, ObjectRef, Value};
use crate::error::{messages, Error, Result, StackFrame, StackTrace};
use std::cell::RefCell;
use std::rc::Rc;

/// Maximum call stack depth
pub const MAX_CALL_DEPTH: usize = 1024;

/// The slatejs virtual machine
pub struct VM {
    /// Call stack; the bottom frame is top-level code
    frames: Vec<CallFrame>,
    /// The global object
    global: GlobalEnvironment,
    /// Well-known intrinsic objects
    intrinsics: Intrinsics,
    /// Resource limits configuration
    resource_limits: ResourceLimits,
}

impl VM {
    /// Create a new VM with default limits
    pub fn new() -> Self {
        Self::with_limits(ResourceLimits::new())
    }

    /// Create a new VM with the given resource limits
    pub fn with_limits(resource_limits: ResourceLimits) -> Self {
        let intrinsics = Intrinsics::new();
        let global = GlobalEnvironment::new(intrinsics.object_prototype.clone());
        let top_level = CallFrame::top_level(global.this_value());
        Self {
            frames: vec![top_level],
            global,
            intrinsics,
            resource_limits,
        }
    }

    /// The global environment
    pub fn global(&self) -> &GlobalEnvironment {
        &self.global
    }

    /// The intrinsic objects
    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    /// The active resource limits
    pub fn resource_limits(&self) -> &ResourceLimits {
        &self.resource_limits
    }

    /// Get a global value
    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.global.get(name)
    }

    /// Set a global value
    pub fn set_global(&mut self, name: &str, value: Value) {
        self.global.set(name, value);
    }

    /// The innermost call frame
    pub fn current_frame(&self) -> &CallFrame {
        // The top-level frame is never popped.
        &self.frames[self.frames.len() - 1]
    }

    /// The `this` value of the innermost frame
    pub fn this_value(&self) -> Value {
        self.current_frame().this_value.clone()
    }

    /// Number of active function frames, not counting top-level code
    pub fn call_depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Run host code as top-level script code
    pub fn run_script<F>(&mut self, body: F) -> Result<Value>
    where
        F: FnOnce(&mut VM, &CallFrame) -> Result<Value>,
    {
        let frame = self.frames[0].clone();
        body(self, &frame)
    }

    /// Create a function object
    ///
    /// Constructible non-builtin functions get a fresh `prototype` object
    /// whose `constructor` points back at the function.
    pub fn create_function<F>(
        &self,
        name: impl Into<String>,
        length: usize,
        flags: FunctionFlags,
        behavior: F,
    ) -> Value
    where
        F: Fn(&mut VM, &CallFrame, &[Value]) -> Result<Value> + 'static,
    {
        let function = Function::new(name, length, flags, behavior);
        let needs_prototype = function.is_constructor() && !function.is_builtin();
        let name = function.name.clone();

        let obj = Rc::new(RefCell::new(Object::with_kind(
            ObjectKind::Function(function),
            Some(self.intrinsics.function_prototype.clone()),
        )));
        {
            let mut obj = obj.borrow_mut();
            obj.set_property("name", Value::String(name));
            obj.set_property("length", Value::Number(length as f64));
        }

        if needs_prototype {
            let prototype = Value::from_object(Object::with_prototype(
                self.intrinsics.object_prototype.clone(),
            ));
            prototype.set_property("constructor", Value::Object(obj.clone()));
            obj.borrow_mut().set_property("prototype", prototype);
        }

        Value::Object(obj)
    }

    /// Call a function as a plain call (`f()`) or with an explicit receiver
    /// (`obj.f()`, `f.call(obj)`).
    pub fn call(&mut self, callee: &Value, this: Option<Value>, args: &[Value]) -> Result<Value> {
        let function = function_of(callee)
            .ok_or_else(|| Error::type_error(messages::not_a_function(&describe(callee))))?;
        self.invoke(callee, &function, InvocationMode::Call, this, None, args)
    }

    /// Call the method `name` of `receiver` with `receiver` as `this`
    pub fn call_method(&mut self, receiver: &Value, name: &str, args: &[Value]) -> Result<Value> {
        if receiver.is_nullish() {
            return Err(Error::type_error(messages::cannot_read_property(
                name,
                &receiver.to_js_string(),
            )));
        }
        let method = receiver.get_property(name).unwrap_or(Value::Undefined);
        if !method.is_callable() {
            return Err(Error::type_error(messages::not_a_function(&format!(
                "{}.{}",
                describe(receiver),
                name
            ))));
        }
        self.call(&method, Some(receiver.clone()), args)
    }

    /// Invoke `callee` with `new`. `new_target` defaults to the callee.
    pub fn construct(
        &mut self,
        callee: &Value,
        args: &[Value],
        new_target: Option<&Value>,
    ) -> Result<Value> {
        let function = match function_of(callee) {
            Some(function) if function.is_constructor() => function,
            _ => {
                return Err(Error::type_error(messages::not_a_constructor(&describe(
                    callee,
                ))))
            }
        };
        let new_target = new_target.cloned().unwrap_or_else(|| callee.clone());
        if !new_target.is_constructor() {
            return Err(Error::type_error(messages::not_a_constructor(&describe(
                &new_target,
            ))));
        }
        self.invoke(
            callee,
            &function,
            InvocationMode::Construct,
            None,
            Some(new_target),
            args,
        )
    }

    /// Push a frame with the resolved receiver, run the body, pop the frame.
    fn invoke(
        &mut self,
        callee: &Value,
        function: &Function,
        mode: InvocationMode,
        explicit_this: Option<Value>,
        new_target: Option<Value>,
        args: &[Value],
    ) -> Result<Value> {
        if let Some(limit) = self.resource_limits.stack_depth_limit {
            let depth = self.call_depth() + 1;
            if depth > limit {
                return Err(Error::stack_depth_exceeded(depth, limit));
            }
        }

        let binding = ThisBinding::resolve(function.flags, mode, explicit_this.as_ref());
        let frame = match mode {
            InvocationMode::Call => {
                let this_value = self.bind_this(&binding, callee);
                CallFrame::for_call(callee.clone(), this_value)
            }
            InvocationMode::Construct => {
                let new_target = new_target.unwrap_or_else(|| callee.clone());
                let this_value = self.bind_this(&binding, &new_target);
                CallFrame::for_constructor(callee.clone(), this_value, new_target)
            }
        };

        tracing::trace!(
            function = %function.name,
            mode = ?mode,
            receiver = frame.this_value.type_of(),
            depth = self.call_depth() + 1,
            "invoke"
        );

        self.frames.push(frame.clone());
        let behavior = function.behavior.clone();
        let result =
            behavior(self, &frame, args).map_err(|e| e.with_stack_trace(self.capture_stack_trace()));
        self.frames.pop();
        let result = result?;

        // Constructor-return override: an explicitly returned object wins,
        // anything else yields the allocated receiver.
        if binding == ThisBinding::Allocate && !result.is_object() {
            return Ok(frame.this_value);
        }
        Ok(result)
    }

    /// Materialize a [`ThisBinding`]. `Allocate` is the only side effect of
    /// receiver resolution.
    fn bind_this(&self, binding: &ThisBinding, constructor: &Value) -> Value {
        match binding {
            ThisBinding::Explicit(this) => this.clone(),
            ThisBinding::Global => self.global.this_value(),
            ThisBinding::Undefined | ThisBinding::Deferred => Value::Undefined,
            ThisBinding::Allocate => {
                let prototype = self
                    .get_prototype_from_constructor(constructor, &self.intrinsics.object_prototype);
                Value::from_object(Object::with_prototype(prototype))
            }
        }
    }

    /// `constructor.prototype` if it is an object, else `fallback`
    pub fn get_prototype_from_constructor(
        &self,
        constructor: &Value,
        fallback: &ObjectRef,
    ) -> ObjectRef {
        match constructor.get_property("prototype") {
            Some(Value::Object(prototype)) => prototype,
            _ => fallback.clone(),
        }
    }

    /// Capture the active function frames, innermost first
    pub fn capture_stack_trace(&self) -> StackTrace {
        let mut trace = StackTrace::new();
        for frame in self.frames.iter().skip(1).rev() {
            let Some(function) = function_of(&frame.callee) else {
                continue;
            };
            let mut entry = if function.is_builtin() {
                StackFrame::native(function.name.clone())
            } else {
                StackFrame::new(function.name.clone())
            };
            if frame.is_constructor() {
                entry = entry.constructing();
            }
            trace.push(entry);
        }
        trace
    }
}

impl Default for VM {
    fn default() -> Self {
        Self::new()
    }
}

/// Clone the function slots out of a callee, if it is callable
fn function_of(callee: &Value) -> Option<Function> {
    match callee {
        Value::Object(obj) => match obj.borrow().kind() {
            ObjectKind::Function(function) => Some(function.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// Short rendering of a value for error messages
fn describe(value: &Value) -> String {
    match value {
        Value::Object(obj) => match obj.borrow().kind() {
            ObjectKind::Function(function) => function.name.clone(),
            _ => value.to_js_string(),
        },
        Value::String(s) => format!("\"{}\"", s),
        _ => format!("{:?}", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn sloppy_fn(vm: &VM) -> Value {
        vm.create_function("f", 0, FunctionFlags::CONSTRUCTOR, |_, frame, _| {
            Ok(frame.this_value.clone())
        })
    }

    #[test]
    fn test_top_level_this_is_global() {
        let mut vm = VM::new();
        let this = vm
            .run_script(|_, frame| Ok(frame.this_value.clone()))
            .unwrap();
        assert!(vm.global().is(&this));
        assert_eq!(this.type_of(), "object");
    }

    #[test]
    fn test_sloppy_plain_call_receives_global() {
        let mut vm = VM::new();
        let f = sloppy_fn(&vm);
        let this = vm.call(&f, None, &[]).unwrap();
        assert!(vm.global().is(&this));
    }

    #[test]
    fn test_strict_plain_call_receives_undefined() {
        let mut vm = VM::new();
        let f = vm.create_function("f", 0, FunctionFlags::STRICT, |_, frame, _| {
            Ok(frame.this_value.clone())
        });
        assert_eq!(vm.call(&f, None, &[]).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_construct_allocates_from_prototype_property() {
        let mut vm = VM::new();
        let f = sloppy_fn(&vm);
        let instance = vm.construct(&f, &[], None).unwrap();
        let prototype = f.get_property("prototype").unwrap();

        let instance_proto = instance.as_object().unwrap().borrow().prototype.clone().unwrap();
        assert!(Value::Object(instance_proto).strict_equals(&prototype));
        assert!(instance.get_property("constructor").unwrap().strict_equals(&f));
    }

    #[test]
    fn test_non_object_prototype_falls_back_to_object_prototype() {
        let mut vm = VM::new();
        let f = sloppy_fn(&vm);
        f.set_property("prototype", Value::Number(1.0));
        let instance = vm.construct(&f, &[], None).unwrap();
        let proto = instance.as_object().unwrap().borrow().prototype.clone().unwrap();
        assert!(Rc::ptr_eq(&proto, &vm.intrinsics().object_prototype));
    }

    #[test]
    fn test_constructor_return_override() {
        let mut vm = VM::new();
        let replacement = Value::new_object();
        let returned = replacement.clone();
        let f = vm.create_function("F", 0, FunctionFlags::CONSTRUCTOR, move |_, _, _| {
            Ok(returned.clone())
        });
        let result = vm.construct(&f, &[], None).unwrap();
        assert!(result.strict_equals(&replacement));

        let g = vm.create_function("G", 0, FunctionFlags::CONSTRUCTOR, |_, _, _| {
            Ok(Value::Number(7.0))
        });
        assert_eq!(vm.construct(&g, &[], None).unwrap().type_of(), "object");
    }

    #[test]
    fn test_frames_are_popped_after_throw() {
        let mut vm = VM::new();
        let f = vm.create_function("thrower", 0, FunctionFlags::empty(), |_, _, _| {
            Err(Error::range_error("nope"))
        });
        let err = vm.call(&f, None, &[]).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::RangeError));
        assert_eq!(vm.call_depth(), 0);
        let trace = err.stack_trace().unwrap();
        assert_eq!(trace.frames, vec![StackFrame::new("thrower")]);
    }

    #[test]
    fn test_calling_non_callable_is_type_error() {
        let mut vm = VM::new();
        let err = vm.call(&Value::from("foo"), None, &[]).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::TypeError));
        assert_eq!(err.message(), "\"foo\" is not a function");
    }

    #[test]
    fn test_constructing_non_constructor_is_type_error() {
        let mut vm = VM::new();
        let f = vm.create_function("plain", 0, FunctionFlags::empty(), |_, _, _| {
            Ok(Value::Undefined)
        });
        let err = vm.construct(&f, &[], None).unwrap_err();
        assert_eq!(err.message(), "plain is not a constructor");
    }

    #[test]
    fn test_call_method_binds_receiver() {
        let mut vm = VM::new();
        let obj = Value::new_object();
        let method = sloppy_fn(&vm);
        obj.set_property("m", method);
        let this = vm.call_method(&obj, "m", &[]).unwrap();
        assert!(this.strict_equals(&obj));
    }

    #[test]
    fn test_call_method_on_undefined() {
        let mut vm = VM::new();
        let err = vm.call_method(&Value::Undefined, "m", &[]).unwrap_err();
        assert_eq!(err.message(), "Cannot read property 'm' of undefined");
    }

    #[test]
    fn test_stack_depth_limit() {
        let mut vm = VM::with_limits(ResourceLimits::new().with_stack_depth_limit(8));
        let f = vm.create_function("recurse", 0, FunctionFlags::empty(), |vm, frame, _| {
            vm.call(&frame.callee, None, &[])
        });
        let err = vm.call(&f, None, &[]).unwrap_err();
        assert!(matches!(err, Error::ResourceLimitError { .. }));
        assert_eq!(vm.call_depth(), 0);
    }
}
