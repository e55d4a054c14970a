//! JavaScript value types
//!
//! This module defines the runtime representation of JavaScript values,
//! objects and function objects.

use super::temporal::Instant;
use super::vm::{CallFrame, VM};
use crate::error::Result;
use bitflags::bitflags;
use indexmap::IndexMap;
use num_bigint::BigInt;
use rustc_hash::FxBuildHasher;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a heap object
pub type ObjectRef = Rc<RefCell<Object>>;

/// Own properties of an object, in insertion order
pub type PropertyMap = IndexMap<String, Value, FxBuildHasher>;

/// Type alias for native function implementations
///
/// The frame carries the resolved receiver, the callee and, for
/// construction, the `new.target`.
pub type NativeFn = Rc<dyn Fn(&mut VM, &CallFrame, &[Value]) -> Result<Value>>;

/// A JavaScript value
#[derive(Clone)]
pub enum Value {
    /// undefined
    Undefined,
    /// null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number (IEEE 754 double)
    Number(f64),
    /// BigInt (arbitrary precision integer)
    BigInt(BigInt),
    /// String
    String(String),
    /// Object (includes functions and branded builtins)
    Object(ObjectRef),
}

impl Value {
    /// Check if value is undefined
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check if value is nullish (null or undefined)
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Check if value is an object
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Borrow the object handle, if this is an object
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Whether the value has a [[Call]] behavior
    pub fn is_callable(&self) -> bool {
        match self {
            Value::Object(obj) => matches!(obj.borrow().kind(), ObjectKind::Function(_)),
            _ => false,
        }
    }

    /// Whether the value has a [[Construct]] behavior
    pub fn is_constructor(&self) -> bool {
        match self {
            Value::Object(obj) => match obj.borrow().kind() {
                ObjectKind::Function(f) => f.is_constructor(),
                _ => false,
            },
            _ => false,
        }
    }

    /// Convert to boolean (truthiness)
    pub fn to_boolean(&self) -> bool {
        use num_traits::Zero;
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::BigInt(n) => !n.is_zero(),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) => true,
        }
    }

    /// Convert to number
    pub fn to_number(&self) -> f64 {
        use num_traits::ToPrimitive;
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Boolean(true) => 1.0,
            Value::Boolean(false) => 0.0,
            Value::Number(n) => *n,
            Value::BigInt(n) => n.to_f64().unwrap_or(f64::INFINITY),
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    0.0
                } else {
                    s.parse().unwrap_or(f64::NAN)
                }
            }
            Value::Object(_) => f64::NAN,
        }
    }

    /// Convert to JavaScript string representation
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(true) => "true".to_string(),
            Value::Boolean(false) => "false".to_string(),
            Value::Number(n) => {
                if n.is_nan() {
                    "NaN".to_string()
                } else if n.is_infinite() {
                    if *n > 0.0 {
                        "Infinity".to_string()
                    } else {
                        "-Infinity".to_string()
                    }
                } else if *n == 0.0 {
                    "0".to_string()
                } else {
                    format!("{}", n)
                }
            }
            Value::BigInt(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Object(obj) => match obj.borrow().kind() {
                ObjectKind::Function(f) => format!("function {}() {{ [native code] }}", f.name),
                ObjectKind::Instant(_) => "[object Temporal.Instant]".to_string(),
                ObjectKind::Global => "[object global]".to_string(),
                ObjectKind::Ordinary => "[object Object]".to_string(),
            },
        }
    }

    /// Get the typeof string
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object", // Historical quirk
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Object(obj) => match obj.borrow().kind() {
                ObjectKind::Function(_) => "function",
                _ => "object",
            },
        }
    }

    /// Strict equality (===)
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => {
                if a.is_nan() || b.is_nan() {
                    false
                } else {
                    a == b
                }
            }
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Create a new BigInt value from a literal such as `111n`
    pub fn new_bigint(s: &str) -> Option<Value> {
        let s = s.strip_suffix('n').unwrap_or(s);
        s.parse::<BigInt>().ok().map(Value::BigInt)
    }

    /// Create a new ordinary object value without a prototype
    pub fn new_object() -> Value {
        Value::Object(Rc::new(RefCell::new(Object::new())))
    }

    /// Wrap an object in a fresh handle
    pub fn from_object(object: Object) -> Value {
        Value::Object(Rc::new(RefCell::new(object)))
    }

    /// Get property from object, walking the prototype chain
    pub fn get_property(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(obj) => obj.borrow().get_property(key),
            Value::String(s) if key == "length" => Some(Value::Number(s.chars().count() as f64)),
            _ => None,
        }
    }

    /// Set an own property on an object. Returns false for primitives.
    pub fn set_property(&self, key: &str, value: Value) -> bool {
        match self {
            Value::Object(obj) => {
                obj.borrow_mut().set_property(key, value);
                true
            }
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::BigInt(n)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::BigInt(n) => write!(f, "{}n", n),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Object(obj) => {
                let obj = obj.borrow();
                match obj.kind() {
                    ObjectKind::Ordinary => write!(f, "{{...}}"),
                    ObjectKind::Global => write!(f, "[global]"),
                    ObjectKind::Function(func) => write!(f, "[Function: {}]", func.name),
                    ObjectKind::Instant(instant) => {
                        write!(f, "Temporal.Instant({}n)", instant.epoch_nanoseconds())
                    }
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_js_string())
    }
}

/// JavaScript object
///
/// The kind is fixed when the object is created; there is no way to
/// replace it afterwards, which is what makes it usable as a brand.
#[derive(Clone)]
pub struct Object {
    kind: ObjectKind,
    /// Own properties
    pub properties: PropertyMap,
    /// Prototype
    pub prototype: Option<ObjectRef>,
}

impl Object {
    /// Create a new ordinary object with no prototype
    pub fn new() -> Self {
        Self::with_kind(ObjectKind::Ordinary, None)
    }

    /// Create an object of the given kind
    pub fn with_kind(kind: ObjectKind, prototype: Option<ObjectRef>) -> Self {
        Self {
            kind,
            properties: PropertyMap::default(),
            prototype,
        }
    }

    /// Create an ordinary object inheriting from `prototype`
    pub fn with_prototype(prototype: ObjectRef) -> Self {
        Self::with_kind(ObjectKind::Ordinary, Some(prototype))
    }

    /// The object's kind (and therefore its brand)
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    /// Get a property, walking the prototype chain
    pub fn get_property(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.properties.get(key) {
            return Some(value.clone());
        }
        self.prototype
            .as_ref()
            .and_then(|proto| proto.borrow().get_property(key))
    }

    /// Get an own property
    pub fn get_own_property(&self, key: &str) -> Option<Value> {
        self.properties.get(key).cloned()
    }

    /// Set an own property. Overwrites keep the original insertion position.
    pub fn set_property(&mut self, key: &str, value: Value) {
        if let Some(slot) = self.properties.get_mut(key) {
            *slot = value;
        } else {
            self.properties.insert(key.to_string(), value);
        }
    }

    /// Check for an own property
    pub fn has_own_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Own property keys in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("brand", &self.kind.brand())
            .field("keys", &self.keys())
            .field("has_prototype", &self.prototype.is_some())
            .finish()
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

/// Kinds of objects, i.e. the internal slots an object carries
#[derive(Clone)]
pub enum ObjectKind {
    /// Ordinary object
    Ordinary,
    /// The global object
    Global,
    /// Function object
    Function(Function),
    /// Temporal.Instant
    Instant(Instant),
}

bitflags! {
    /// Behavior flags of a function object
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FunctionFlags: u8 {
        /// Strict mode code: plain calls see `undefined` as `this`
        const STRICT = 1;
        /// Has a [[Construct]] behavior
        const CONSTRUCTOR = 1 << 1;
        /// Engine-provided builtin. As a constructor it allocates its own
        /// (branded) instance from `new.target` instead of receiving an
        /// ordinary `this`.
        const BUILTIN = 1 << 2;
    }
}

/// A callable function object's internal slots
#[derive(Clone)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Number of declared parameters
    pub length: usize,
    /// Behavior flags
    pub flags: FunctionFlags,
    /// Function body
    pub behavior: NativeFn,
}

impl Function {
    /// Create a new function
    pub fn new<F>(name: impl Into<String>, length: usize, flags: FunctionFlags, behavior: F) -> Self
    where
        F: Fn(&mut VM, &CallFrame, &[Value]) -> Result<Value> + 'static,
    {
        Self {
            name: name.into(),
            length,
            flags,
            behavior: Rc::new(behavior),
        }
    }

    /// Can be invoked with `new`?
    pub fn is_constructor(&self) -> bool {
        self.flags.contains(FunctionFlags::CONSTRUCTOR)
    }

    /// Engine-provided builtin?
    pub fn is_builtin(&self) -> bool {
        self.flags.contains(FunctionFlags::BUILTIN)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("length", &self.length)
            .field("flags", &self.flags)
            .finish()
    }
}
