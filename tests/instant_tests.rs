//! Temporal.Instant: construction window, brand checks, equality

mod common;

use common::{big, big_str, instant_ctor, thrown};
use slatejs::runtime::{temporal, validate_brand, Brand, Instant};
use slatejs::{ErrorKind, Runtime, Value};

const LIMIT: &str = "8640000000000000000000";

mod construction {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_instant_is_branded() {
        let mut runtime = Runtime::new();
        let instant = runtime.new_instant(111).unwrap();
        assert_eq!(instant.type_of(), "object");
        assert!(validate_brand(&instant, Brand::Instant).is_ok());
        assert_eq!(format!("{:?}", instant), "Temporal.Instant(111n)");
    }

    #[test]
    fn test_boundaries_are_accepted() {
        let mut runtime = Runtime::new();
        let ctor = instant_ctor(&runtime);
        let upper = runtime.construct(&ctor, &[big_str(LIMIT)]).unwrap();
        let lower = runtime
            .construct(&ctor, &[big_str(&format!("-{}", LIMIT))])
            .unwrap();
        assert_eq!(
            runtime.call_method(&upper, "epochNanoseconds", &[]).unwrap(),
            big_str(LIMIT)
        );
        assert_eq!(
            runtime.call_method(&lower, "epochNanoseconds", &[]).unwrap(),
            big_str(&format!("-{}", LIMIT))
        );
    }

    #[test]
    fn test_outside_window_is_range_error() {
        let mut runtime = Runtime::new();
        let ctor = instant_ctor(&runtime);
        for value in ["8640000000000000000001", "-8640000000000000000001"] {
            let (kind, message) = thrown(runtime.construct(&ctor, &[big_str(value)]));
            assert_eq!(kind, ErrorKind::RangeError);
            assert_eq!(message, "Invalid epoch nanoseconds value");
        }
    }

    #[test]
    fn test_window_matches_day_limit() {
        let expected: num_bigint::BigInt = LIMIT.parse().unwrap();
        assert_eq!(temporal::max_epoch_nanoseconds(), expected);
        assert!(Instant::try_new(expected.clone()).is_ok());
        assert!(Instant::try_new(expected + 1).is_err());
    }

    #[test]
    fn test_call_without_new_is_type_error() {
        let mut runtime = Runtime::new();
        let ctor = instant_ctor(&runtime);
        let (kind, message) = thrown(runtime.call(&ctor, None, &[big(111)]));
        assert_eq!(kind, ErrorKind::TypeError);
        assert_eq!(message, "Temporal.Instant constructor must be called with 'new'");
    }

    #[test]
    fn test_argument_conversion() {
        let mut runtime = Runtime::new();
        let ctor = instant_ctor(&runtime);

        let from_string = runtime.construct(&ctor, &[Value::from("0x10")]).unwrap();
        assert_eq!(
            runtime.call_method(&from_string, "epochNanoseconds", &[]).unwrap(),
            big(16)
        );

        let from_bool = runtime.construct(&ctor, &[Value::Boolean(true)]).unwrap();
        assert_eq!(
            runtime.call_method(&from_bool, "epochNanoseconds", &[]).unwrap(),
            big(1)
        );

        let (kind, _) = thrown(runtime.construct(&ctor, &[Value::Number(1.0)]));
        assert_eq!(kind, ErrorKind::TypeError);

        let (kind, message) = thrown(runtime.construct(&ctor, &[Value::from("1.5")]));
        assert_eq!(kind, ErrorKind::SyntaxError);
        assert_eq!(message, "Cannot convert 1.5 to a BigInt");

        let (kind, _) = thrown(runtime.construct(&ctor, &[]));
        assert_eq!(kind, ErrorKind::TypeError);
    }

    #[test]
    fn test_string_argument_whitespace() {
        let mut runtime = Runtime::new();
        let ctor = instant_ctor(&runtime);

        let padded = runtime
            .construct(&ctor, &[Value::from("\u{00A0} 42\u{2028}")])
            .unwrap();
        assert_eq!(
            runtime.call_method(&padded, "epochNanoseconds", &[]).unwrap(),
            big(42)
        );

        let (kind, message) = thrown(runtime.construct(&ctor, &[Value::from("\u{0085}5")]));
        assert_eq!(kind, ErrorKind::SyntaxError);
        assert_eq!(message, "Cannot convert \u{0085}5 to a BigInt");
    }
}

mod equals {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_equal_and_reflexive() {
        let mut runtime = Runtime::new();
        let a = runtime.new_instant(111).unwrap();
        let b = runtime.new_instant(111).unwrap();
        assert_eq!(
            runtime.call_method(&a, "equals", &[a.clone()]).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            runtime.call_method(&a, "equals", &[b.clone()]).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            runtime.call_method(&b, "equals", &[a]).unwrap(),
            Value::Boolean(true)
        );
    }

    #[test]
    fn test_different_values() {
        let mut runtime = Runtime::new();
        let a = runtime.new_instant(111).unwrap();
        let b = runtime.new_instant(999).unwrap();
        assert_eq!(
            runtime.call_method(&a, "equals", &[b]).unwrap(),
            Value::Boolean(false)
        );
    }

    #[test]
    fn test_string_receiver_via_call() {
        let mut runtime = Runtime::new();
        let equals = runtime.lookup("Temporal.Instant.prototype.equals").unwrap();
        let (kind, message) = thrown(runtime.call_method(
            &equals,
            "call",
            &[Value::from("foo"), Value::Number(1.0), Value::Number(2.0)],
        ));
        assert_eq!(kind, ErrorKind::TypeError);
        assert_eq!(message, "Not a Temporal.Instant");
    }

    #[test]
    fn test_duck_typed_receiver_is_rejected() {
        let mut runtime = Runtime::new();
        let equals = runtime.lookup("Temporal.Instant.prototype.equals").unwrap();
        let impostor = Value::new_object();
        impostor.set_property("epochNanoseconds", big(111));
        let real = runtime.new_instant(111).unwrap();
        let (kind, message) = thrown(runtime.call(&equals, Some(impostor), &[real]));
        assert_eq!(kind, ErrorKind::TypeError);
        assert_eq!(message, "Not a Temporal.Instant");
    }

    #[test]
    fn test_other_may_be_a_string() {
        let mut runtime = Runtime::new();
        let epoch = runtime.new_instant(0).unwrap();
        assert_eq!(
            runtime
                .call_method(&epoch, "equals", &[Value::from("1970-01-01T00:00:00Z")])
                .unwrap(),
            Value::Boolean(true)
        );
        let (kind, _) = thrown(runtime.call_method(&epoch, "equals", &[Value::from("nope")]));
        assert_eq!(kind, ErrorKind::RangeError);
    }

    #[test]
    fn test_other_must_be_convertible() {
        let mut runtime = Runtime::new();
        let epoch = runtime.new_instant(0).unwrap();
        let (kind, message) = thrown(runtime.call_method(&epoch, "equals", &[Value::Number(0.0)]));
        assert_eq!(kind, ErrorKind::TypeError);
        assert_eq!(message, "Cannot convert number to Temporal.Instant");
    }
}

mod statics {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_epoch_nanoseconds() {
        let mut runtime = Runtime::new();
        let ctor = instant_ctor(&runtime);
        let instant = runtime
            .call_method(&ctor, "fromEpochNanoseconds", &[big(-5)])
            .unwrap();
        assert_eq!(
            runtime.call_method(&instant, "epochNanoseconds", &[]).unwrap(),
            big(-5)
        );
        let (kind, _) = thrown(runtime.call_method(
            &ctor,
            "fromEpochNanoseconds",
            &[big_str("8640000000000000000001")],
        ));
        assert_eq!(kind, ErrorKind::RangeError);
    }

    #[test]
    fn test_from_copies_an_instant() {
        let mut runtime = Runtime::new();
        let ctor = instant_ctor(&runtime);
        let original = runtime.new_instant(42).unwrap();
        let copy = runtime.call_method(&ctor, "from", &[original.clone()]).unwrap();
        assert!(!copy.strict_equals(&original));
        assert_eq!(
            runtime.call_method(&copy, "equals", &[original]).unwrap(),
            Value::Boolean(true)
        );
    }

    #[test]
    fn test_from_parses_offsets() {
        let mut runtime = Runtime::new();
        let ctor = instant_ctor(&runtime);
        let instant = runtime
            .call_method(&ctor, "from", &[Value::from("1970-01-01T01:00:00.000000001+01:00")])
            .unwrap();
        assert_eq!(
            runtime.call_method(&instant, "epochNanoseconds", &[]).unwrap(),
            big(1)
        );
    }

    #[test]
    fn test_from_rejects_sub_nanosecond_fractions() {
        let mut runtime = Runtime::new();
        let ctor = instant_ctor(&runtime);
        let (kind, message) = thrown(runtime.call_method(
            &ctor,
            "from",
            &[Value::from("1970-01-01T00:00:00.0000000019Z")],
        ));
        assert_eq!(kind, ErrorKind::RangeError);
        assert_eq!(
            message,
            "Invalid instant string: 1970-01-01T00:00:00.0000000019Z"
        );

        let one = runtime.new_instant(1).unwrap();
        let (kind, _) = thrown(runtime.call_method(
            &one,
            "equals",
            &[Value::from("1970-01-01T00:00:00.0000000011Z")],
        ));
        assert_eq!(kind, ErrorKind::RangeError);
    }

    #[test]
    fn test_from_folds_leap_second() {
        let mut runtime = Runtime::new();
        let ctor = instant_ctor(&runtime);
        let leap = runtime
            .call_method(&ctor, "from", &[Value::from("1970-01-01T23:59:60Z")])
            .unwrap();
        assert_eq!(
            runtime.call_method(&leap, "epochNanoseconds", &[]).unwrap(),
            big(86_399_999_999_999)
        );
    }

    #[test]
    fn test_methods_live_on_the_shared_prototype() {
        let mut runtime = Runtime::new();
        let a = runtime.new_instant(1).unwrap();
        let b = runtime.new_instant(2).unwrap();
        let ea = a.get_property("equals").unwrap();
        let eb = b.get_property("equals").unwrap();
        assert!(ea.strict_equals(&eb));
        assert!(!a.as_object().unwrap().borrow().has_own_property("equals"));
    }
}
