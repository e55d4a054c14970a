//! Shared test helpers for integration tests

use num_bigint::BigInt;
use slatejs::runtime::FunctionFlags;
use slatejs::{ErrorKind, Runtime, Value};

/// A BigInt value
pub fn big(n: i128) -> Value {
    Value::BigInt(BigInt::from(n))
}

/// A BigInt value from decimal digits
#[allow(dead_code)]
pub fn big_str(digits: &str) -> Value {
    Value::BigInt(digits.parse().expect("valid BigInt literal"))
}

/// Look up `Temporal.Instant`
#[allow(dead_code)]
pub fn instant_ctor(runtime: &Runtime) -> Value {
    runtime
        .lookup("Temporal.Instant")
        .expect("Temporal.Instant is installed")
}

/// Define a function that returns whatever it sees as `this`
#[allow(dead_code)]
pub fn this_echo(runtime: &mut Runtime, name: &str, flags: FunctionFlags) -> Value {
    runtime.define_function(name, 0, flags, |_, frame, _| Ok(frame.this_value.clone()))
}

/// Run an operation and return the kind and message it threw
#[allow(dead_code)]
pub fn thrown(result: slatejs::Result<Value>) -> (ErrorKind, String) {
    let err = result.expect_err("operation should throw");
    (
        err.kind().expect("a JavaScript error"),
        err.message(),
    )
}
