//! Internal-slot brands
//!
//! Every builtin method that reads internal state goes through
//! [`validate_brand`] (or [`with_slots`]) first, so an ordinary object with
//! look-alike properties can never stand in for a builtin instance.

use super::value::{ObjectKind, ObjectRef, Value};
use crate::error::{messages, Error, Result};

/// Type tag of an object, derived from its [`ObjectKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Brand {
    Ordinary,
    Global,
    Function,
    Instant,
}

impl Brand {
    /// Name used in brand mismatch messages
    pub fn display_name(self) -> &'static str {
        match self {
            Brand::Ordinary => "Object",
            Brand::Global => "global object",
            Brand::Function => "Function",
            Brand::Instant => "Temporal.Instant",
        }
    }
}

impl ObjectKind {
    /// The brand carried by objects of this kind
    pub fn brand(&self) -> Brand {
        match self {
            ObjectKind::Ordinary => Brand::Ordinary,
            ObjectKind::Global => Brand::Global,
            ObjectKind::Function(_) => Brand::Function,
            ObjectKind::Instant(_) => Brand::Instant,
        }
    }
}

/// Internal slots of a branded builtin type
pub trait BrandedSlots {
    /// The brand objects holding these slots carry
    const BRAND: Brand;

    /// Borrow the slots out of an object kind
    fn from_kind(kind: &ObjectKind) -> Option<&Self>;
}

/// Check that `value` is an object carrying `expected`.
///
/// Fails with `TypeError: Not a <Name>` for primitives and for objects with
/// any other brand.
pub fn validate_brand(value: &Value, expected: Brand) -> Result<ObjectRef> {
    match value {
        Value::Object(obj) if obj.borrow().kind().brand() == expected => Ok(obj.clone()),
        _ => {
            tracing::debug!(
                expected = expected.display_name(),
                actual = value.type_of(),
                "brand check failed"
            );
            Err(Error::type_error(messages::not_a(expected.display_name())))
        }
    }
}

/// Validate the brand of `value` and read its internal slots.
pub fn with_slots<T, R>(value: &Value, f: impl FnOnce(&T) -> R) -> Result<R>
where
    T: BrandedSlots,
{
    let obj = validate_brand(value, T::BRAND)?;
    let obj = obj.borrow();
    T::from_kind(obj.kind())
        .map(f)
        .ok_or_else(|| Error::type_error(messages::not_a(T::BRAND.display_name())))
}
