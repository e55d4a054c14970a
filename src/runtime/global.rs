//! The global environment
//!
//! One global object exists per [`VM`](super::VM). It is created before any
//! host code runs and lives as long as the VM; its identity never changes,
//! only its bindings do.

use super::value::{Object, ObjectKind, ObjectRef, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Handle to the global object
#[derive(Clone)]
pub struct GlobalEnvironment {
    object: ObjectRef,
}

impl GlobalEnvironment {
    /// Create the global object and its `globalThis` self-binding
    pub fn new(object_prototype: ObjectRef) -> Self {
        let object = Rc::new(RefCell::new(Object::with_kind(
            ObjectKind::Global,
            Some(object_prototype),
        )));
        let env = Self { object };
        env.set("globalThis", env.this_value());
        env
    }

    /// The global object itself
    pub fn object(&self) -> &ObjectRef {
        &self.object
    }

    /// The global object as a `this` value
    pub fn this_value(&self) -> Value {
        Value::Object(self.object.clone())
    }

    /// Look up a global binding
    pub fn get(&self, name: &str) -> Option<Value> {
        self.object.borrow().get_property(name)
    }

    /// Add or overwrite a global binding
    pub fn set(&self, name: &str, value: Value) {
        self.object.borrow_mut().set_property(name, value);
    }

    /// Check for an own global binding
    pub fn has(&self, name: &str) -> bool {
        self.object.borrow().has_own_property(name)
    }

    /// Check whether `value` is this global object
    pub fn is(&self, value: &Value) -> bool {
        matches!(value, Value::Object(obj) if Rc::ptr_eq(obj, &self.object))
    }
}
