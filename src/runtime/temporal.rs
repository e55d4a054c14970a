//! Temporal.Instant - a fixed point in time with nanosecond precision
//!
//! An Instant is a branded object whose only internal slot is the number of
//! nanoseconds since the Unix epoch. The value is validated before the
//! object is allocated, so an Instant with an out-of-range slot can never
//! exist.

use super::brand::{with_slots, Brand, BrandedSlots};
use super::intrinsics::define_native_method;
use super::value::{FunctionFlags, Object, ObjectKind, ObjectRef, Value};
use super::vm::{CallFrame, VM};
use crate::error::{messages, Error, Result};
use num_bigint::BigInt;
use num_traits::Zero;
use std::cell::RefCell;
use std::rc::Rc;

/// Name used in messages and by `Brand::Instant`
pub const INSTANT_NAME: &str = "Temporal.Instant";

/// Nanoseconds in one day
pub const NANOSECONDS_PER_DAY: i128 = 86_400 * 1_000_000_000;

/// Instants may lie at most this many days before or after the epoch
pub const MAX_EPOCH_DAYS: i128 = 100_000_000;

const NANOSECONDS_PER_SECOND: i64 = 1_000_000_000;

/// Instant strings carry at most nanosecond precision
const MAX_FRACTION_DIGITS: usize = 9;

/// Largest valid `epochNanoseconds` (the smallest is its negation)
pub fn max_epoch_nanoseconds() -> BigInt {
    BigInt::from(MAX_EPOCH_DAYS * NANOSECONDS_PER_DAY)
}

/// Whether `ns` lies in the inclusive window of representable instants
pub fn is_valid_epoch_nanoseconds(ns: &BigInt) -> bool {
    let limit = max_epoch_nanoseconds();
    *ns <= limit && *ns >= -limit
}

/// Internal slots of a `Temporal.Instant`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instant {
    epoch_nanoseconds: BigInt,
}

impl Instant {
    /// Validate `epoch_nanoseconds`, failing with a RangeError outside
    /// ±10^8 days.
    pub fn try_new(epoch_nanoseconds: BigInt) -> Result<Self> {
        if !is_valid_epoch_nanoseconds(&epoch_nanoseconds) {
            tracing::debug!(%epoch_nanoseconds, "epoch nanoseconds out of range");
            return Err(Error::range_error(messages::INVALID_EPOCH_NANOSECONDS));
        }
        Ok(Self { epoch_nanoseconds })
    }

    /// Nanoseconds since the Unix epoch
    pub fn epoch_nanoseconds(&self) -> &BigInt {
        &self.epoch_nanoseconds
    }
}

impl BrandedSlots for Instant {
    const BRAND: Brand = Brand::Instant;

    fn from_kind(kind: &ObjectKind) -> Option<&Self> {
        match kind {
            ObjectKind::Instant(instant) => Some(instant),
            _ => None,
        }
    }
}

/// Allocate a branded Instant object
pub fn create_instant(instant: Instant, prototype: ObjectRef) -> Value {
    Value::Object(Rc::new(RefCell::new(Object::with_kind(
        ObjectKind::Instant(instant),
        Some(prototype),
    ))))
}

/// Register the `Temporal` namespace and `Temporal.Instant`
pub fn register(vm: &mut VM) {
    let prototype = vm.intrinsics().instant_prototype.clone();
    let constructor = vm.create_function(
        "Instant",
        1,
        FunctionFlags::CONSTRUCTOR | FunctionFlags::BUILTIN | FunctionFlags::STRICT,
        instant_constructor,
    );
    constructor.set_property("prototype", Value::Object(prototype.clone()));
    prototype
        .borrow_mut()
        .set_property("constructor", constructor.clone());

    if let Some(statics) = constructor.as_object() {
        define_native_method(vm, statics, "from", 1, instant_from);
        define_native_method(
            vm,
            statics,
            "fromEpochNanoseconds",
            1,
            instant_from_epoch_nanoseconds,
        );
    }

    define_native_method(vm, &prototype, "equals", 1, instant_equals);
    define_native_method(vm, &prototype, "epochNanoseconds", 0, instant_epoch_nanoseconds);

    let temporal = Value::from_object(Object::with_prototype(
        vm.intrinsics().object_prototype.clone(),
    ));
    temporal.set_property("Instant", constructor);
    vm.set_global("Temporal", temporal);
}

/// new Temporal.Instant(epochNanoseconds)
fn instant_constructor(vm: &mut VM, frame: &CallFrame, args: &[Value]) -> Result<Value> {
    let Some(new_target) = frame.new_target.as_ref() else {
        return Err(Error::type_error(messages::constructor_without_new(
            INSTANT_NAME,
        )));
    };
    let epoch_nanoseconds = to_big_int(&CallFrame::arg(args, 0))?;
    let instant = Instant::try_new(epoch_nanoseconds)?;
    let prototype =
        vm.get_prototype_from_constructor(new_target, &vm.intrinsics().instant_prototype);
    Ok(create_instant(instant, prototype))
}

/// Temporal.Instant.from(item)
fn instant_from(vm: &mut VM, _frame: &CallFrame, args: &[Value]) -> Result<Value> {
    let instant = to_temporal_instant(&CallFrame::arg(args, 0))?;
    Ok(create_instant(instant, vm.intrinsics().instant_prototype.clone()))
}

/// Temporal.Instant.fromEpochNanoseconds(epochNanoseconds)
fn instant_from_epoch_nanoseconds(
    vm: &mut VM,
    _frame: &CallFrame,
    args: &[Value],
) -> Result<Value> {
    let epoch_nanoseconds = to_big_int(&CallFrame::arg(args, 0))?;
    let instant = Instant::try_new(epoch_nanoseconds)?;
    Ok(create_instant(instant, vm.intrinsics().instant_prototype.clone()))
}

/// Temporal.Instant.prototype.equals(other)
fn instant_equals(_vm: &mut VM, frame: &CallFrame, args: &[Value]) -> Result<Value> {
    let this_nanoseconds = with_slots(&frame.this_value, |instant: &Instant| {
        instant.epoch_nanoseconds.clone()
    })?;
    let other = to_temporal_instant(&CallFrame::arg(args, 0))?;
    Ok(Value::Boolean(this_nanoseconds == other.epoch_nanoseconds))
}

/// Temporal.Instant.prototype.epochNanoseconds()
fn instant_epoch_nanoseconds(_vm: &mut VM, frame: &CallFrame, _args: &[Value]) -> Result<Value> {
    with_slots(&frame.this_value, |instant: &Instant| {
        Value::BigInt(instant.epoch_nanoseconds.clone())
    })
}

/// ToTemporalInstant: an Instant is taken as is, a string is parsed as an
/// RFC 3339 instant, anything else is rejected.
pub fn to_temporal_instant(item: &Value) -> Result<Instant> {
    match item {
        Value::Object(obj) => match obj.borrow().kind() {
            ObjectKind::Instant(instant) => Ok(instant.clone()),
            _ => Err(Error::type_error(messages::cannot_convert(
                item.type_of(),
                INSTANT_NAME,
            ))),
        },
        Value::String(s) => parse_instant_string(s),
        _ => Err(Error::type_error(messages::cannot_convert(
            item.type_of(),
            INSTANT_NAME,
        ))),
    }
}

/// Parse `2020-01-01T00:00:00.000000111Z` or a string with a numeric offset
pub fn parse_instant_string(s: &str) -> Result<Instant> {
    let invalid = || Error::range_error(messages::invalid_instant_string(s));
    // chrono skips fraction digits past the ninth instead of rejecting them.
    if fraction_digits(s) > MAX_FRACTION_DIGITS {
        return Err(invalid());
    }
    let parsed = chrono::DateTime::parse_from_rfc3339(s.trim()).map_err(|_| invalid())?;
    // chrono reports a leap second as nanos >= 1e9; it folds into :59.
    let subsecond = parsed.timestamp_subsec_nanos().min(999_999_999);
    let epoch_nanoseconds =
        BigInt::from(parsed.timestamp()) * NANOSECONDS_PER_SECOND + BigInt::from(subsecond);
    Instant::try_new(epoch_nanoseconds)
}

/// Length of the digit run after the decimal point, if any
fn fraction_digits(s: &str) -> usize {
    s.split_once('.')
        .map(|(_, rest)| rest.bytes().take_while(u8::is_ascii_digit).count())
        .unwrap_or(0)
}

/// ToBigInt
pub fn to_big_int(value: &Value) -> Result<BigInt> {
    match value {
        Value::BigInt(n) => Ok(n.clone()),
        Value::Boolean(b) => Ok(BigInt::from(u8::from(*b))),
        Value::String(s) => string_to_big_int(s).ok_or_else(|| {
            Error::syntax_error(messages::cannot_convert(s, "a BigInt"))
        }),
        _ => Err(Error::type_error(messages::cannot_convert(
            &value.to_js_string(),
            "a BigInt",
        ))),
    }
}

/// StringToBigInt: optional whitespace, then a signed decimal literal or an
/// unsigned `0x`/`0o`/`0b` literal. The empty string is `0n`.
fn string_to_big_int(s: &str) -> Option<BigInt> {
    let s = s.trim_matches(is_js_whitespace);
    if s.is_empty() {
        return Some(BigInt::zero());
    }

    let (radix, digits) = match s.get(..2) {
        Some("0x" | "0X") => (16, &s[2..]),
        Some("0o" | "0O") => (8, &s[2..]),
        Some("0b" | "0B") => (2, &s[2..]),
        _ => (10, s),
    };

    let (negative, digits) = if radix == 10 {
        match digits.as_bytes().first() {
            Some(b'-') => (true, &digits[1..]),
            Some(b'+') => (false, &digits[1..]),
            _ => (false, digits),
        }
    } else {
        (false, digits)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix)?;
    Some(if negative { -magnitude } else { magnitude })
}

/// WhiteSpace or LineTerminator as ECMAScript defines them
fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'
            | '\u{000A}'
            | '\u{000B}'
            | '\u{000C}'
            | '\u{000D}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}
