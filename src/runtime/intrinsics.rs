//! Built-in prototypes and global registration
//!
//! This module creates the intrinsic objects every VM starts with and
//! installs the builtins on the global object.

use super::temporal;
use super::value::{FunctionFlags, Object, ObjectRef, Value};
use super::vm::{CallFrame, VM};
use crate::error::{Error, Result};
use std::cell::RefCell;
use std::rc::Rc;

/// Upper bound on the argument list built by `Function.prototype.apply`
const MAX_APPLY_ARGUMENTS: usize = 65535;

/// Well-known intrinsic objects
pub struct Intrinsics {
    /// `Object.prototype`
    pub object_prototype: ObjectRef,
    /// `Function.prototype`
    pub function_prototype: ObjectRef,
    /// `Temporal.Instant.prototype`
    pub instant_prototype: ObjectRef,
}

impl Intrinsics {
    /// Create the prototype objects, still without methods
    pub fn new() -> Self {
        let object_prototype = Rc::new(RefCell::new(Object::new()));
        let function_prototype = Rc::new(RefCell::new(Object::with_prototype(
            object_prototype.clone(),
        )));
        let instant_prototype = Rc::new(RefCell::new(Object::with_prototype(
            object_prototype.clone(),
        )));
        Self {
            object_prototype,
            function_prototype,
            instant_prototype,
        }
    }
}

impl Default for Intrinsics {
    fn default() -> Self {
        Self::new()
    }
}

/// Register all built-in globals
pub fn register_globals(vm: &mut VM) {
    register_function_prototype(vm);
    temporal::register(vm);
}

/// Define a strict builtin method on `target`
pub(crate) fn define_native_method<F>(
    vm: &VM,
    target: &ObjectRef,
    name: &str,
    length: usize,
    behavior: F,
) where
    F: Fn(&mut VM, &CallFrame, &[Value]) -> Result<Value> + 'static,
{
    let method = vm.create_function(
        name,
        length,
        FunctionFlags::BUILTIN | FunctionFlags::STRICT,
        behavior,
    );
    target.borrow_mut().set_property(name, method);
}

/// Register `Function.prototype.call` and `Function.prototype.apply`
fn register_function_prototype(vm: &mut VM) {
    let function_prototype = vm.intrinsics().function_prototype.clone();

    // func.call(thisArg, arg1, arg2, ...)
    define_native_method(vm, &function_prototype, "call", 1, |vm, frame, args| {
        let this_arg = CallFrame::arg(args, 0);
        let rest = args.get(1..).unwrap_or(&[]);
        vm.call(&frame.this_value, Some(this_arg), rest)
    });

    // func.apply(thisArg, argsArray)
    define_native_method(vm, &function_prototype, "apply", 2, |vm, frame, args| {
        let this_arg = CallFrame::arg(args, 0);
        let call_args = create_list_from_array_like(&CallFrame::arg(args, 1))?;
        vm.call(&frame.this_value, Some(this_arg), &call_args)
    });
}

/// Read `length` and the indexed properties of an array-like object
fn create_list_from_array_like(value: &Value) -> Result<Vec<Value>> {
    match value {
        Value::Undefined | Value::Null => Ok(Vec::new()),
        Value::Object(obj) => {
            let obj = obj.borrow();
            let length = obj
                .get_property("length")
                .map(|v| v.to_number())
                .unwrap_or(0.0);
            let length = if length.is_nan() || length <= 0.0 {
                0
            } else {
                length.trunc() as usize
            };
            if length > MAX_APPLY_ARGUMENTS {
                return Err(Error::range_error(format!(
                    "Too many arguments in function call (only {} allowed)",
                    MAX_APPLY_ARGUMENTS
                )));
            }
            Ok((0..length)
                .map(|i| obj.get_property(&i.to_string()).unwrap_or(Value::Undefined))
                .collect())
        }
        _ => Err(Error::type_error(
            "CreateListFromArrayLike called on non-object",
        )),
    }
}
