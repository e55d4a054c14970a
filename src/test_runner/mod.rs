//! Built-in test runner for slatejs
//!
//! Provides a describe/test style harness: suites of named test cases whose
//! bodies are host closures driving a fresh [`Runtime`]. Each test runs in an
//! isolated runtime and reports pass/fail together with the thrown error.
//!
//! # Example
//!
//! ```no_run
//! use slatejs::test_runner::{builtin_suites, TestConfig, TestRunner};
//!
//! let mut runner = TestRunner::new(TestConfig::default());
//! for suite in builtin_suites() {
//!     runner.add_suite(suite);
//! }
//! let report = runner.run();
//! println!("{}", report);
//! ```

use crate::error::{Error, ErrorKind, Result};
use crate::runtime::{FunctionFlags, Runtime, Value};
use num_bigint::BigInt;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// TestResult
// ---------------------------------------------------------------------------

/// Outcome of a single test case.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestResult {
    /// Test passed.
    Passed,
    /// Test failed with the given message.
    Failed { message: String },
    /// Test was skipped by the name filter.
    Skipped,
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestResult::Passed => write!(f, "PASSED"),
            TestResult::Failed { message } => write!(f, "FAILED: {}", message),
            TestResult::Skipped => write!(f, "SKIPPED"),
        }
    }
}

// ---------------------------------------------------------------------------
// TestCase / TestSuite
// ---------------------------------------------------------------------------

/// Body of a test case
pub type TestBody = Rc<dyn Fn(&mut Runtime) -> Result<()>>;

/// A single test case (`test` block).
#[derive(Clone)]
pub struct TestCase {
    /// Human-readable name supplied in `test('name', ...)`.
    pub name: String,
    /// The test body.
    pub body: TestBody,
}

impl TestCase {
    /// Create a new test case.
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut Runtime) -> Result<()> + 'static,
    {
        Self {
            name: name.into(),
            body: Rc::new(body),
        }
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase").field("name", &self.name).finish()
    }
}

/// A named collection of test cases (a `describe` block).
#[derive(Debug, Clone)]
pub struct TestSuite {
    /// Suite name from `describe('name', ...)`.
    pub name: String,
    /// Test cases belonging to this suite.
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    /// Create a new, empty test suite.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: Vec::new(),
        }
    }

    /// Add a test case to this suite.
    pub fn test<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut Runtime) -> Result<()> + 'static,
    {
        self.tests.push(TestCase::new(name, body));
        self
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Result of one executed test case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    /// Test name.
    pub name: String,
    /// Outcome.
    pub result: TestResult,
    /// Wall-clock time spent in the body.
    pub duration: Duration,
}

/// Aggregated results for a single suite.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteResult {
    /// Suite name.
    pub name: String,
    /// Individual test results.
    pub tests: Vec<CaseResult>,
    /// Total wall-clock time for the suite.
    pub duration: Duration,
}

/// Summary report for an entire test run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TestReport {
    /// Total number of tests.
    pub total: usize,
    /// Number of passed tests.
    pub passed: usize,
    /// Number of failed tests.
    pub failed: usize,
    /// Number of skipped tests.
    pub skipped: usize,
    /// Total wall-clock duration.
    pub duration: Duration,
    /// Per-suite results.
    pub suite_results: Vec<SuiteResult>,
}

impl TestReport {
    /// True when no test failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Serialize the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::InternalError(format!("failed to serialize report: {}", e)))
    }

    /// Write the JSON report to `path`.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for suite in &self.suite_results {
            writeln!(f, "{} ({:?})", suite.name, suite.duration)?;
            for case in &suite.tests {
                let icon = match case.result {
                    TestResult::Passed => "✓",
                    TestResult::Failed { .. } => "✗",
                    TestResult::Skipped => "○",
                };
                writeln!(f, "  {} {} ({:?})", icon, case.name, case.duration)?;
                if let TestResult::Failed { message } = &case.result {
                    writeln!(f, "    {}", message)?;
                }
            }
        }
        writeln!(
            f,
            "Total: {}  Passed: {}  Failed: {}  Skipped: {}  ({:?})",
            self.total, self.passed, self.failed, self.skipped, self.duration
        )
    }
}

// ---------------------------------------------------------------------------
// TestConfig / TestRunner
// ---------------------------------------------------------------------------

/// Configuration for the test runner.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Only tests whose `suite name` contains the pattern are executed.
    pub filter: Option<String>,
    /// Emit per-test output to stderr while running.
    pub verbose: bool,
    /// Stop at the first failing test; the rest are reported as skipped.
    pub fail_fast: bool,
}

/// Runs suites, one fresh runtime per test.
pub struct TestRunner {
    config: TestConfig,
    suites: Vec<TestSuite>,
}

impl TestRunner {
    /// Create a runner with the given configuration.
    pub fn new(config: TestConfig) -> Self {
        Self {
            config,
            suites: Vec::new(),
        }
    }

    /// Register a suite.
    pub fn add_suite(&mut self, suite: TestSuite) {
        self.suites.push(suite);
    }

    /// Execute every registered suite.
    pub fn run(&self) -> TestReport {
        let start = Instant::now();
        let mut report = TestReport::default();
        let mut stop = false;

        for suite in &self.suites {
            tracing::info!(suite = %suite.name, tests = suite.tests.len(), "running suite");
            let suite_start = Instant::now();
            let mut tests = Vec::with_capacity(suite.tests.len());

            for case in &suite.tests {
                let full_name = format!("{} {}", suite.name, case.name);
                let selected = self
                    .config
                    .filter
                    .as_deref()
                    .map_or(true, |pattern| full_name.contains(pattern));

                let case_start = Instant::now();
                let result = if stop || !selected {
                    TestResult::Skipped
                } else {
                    run_case(case)
                };
                let duration = case_start.elapsed();

                if self.config.verbose {
                    eprintln!("{} ... {}", full_name, result);
                }
                report.total += 1;
                match result {
                    TestResult::Passed => report.passed += 1,
                    TestResult::Failed { .. } => {
                        report.failed += 1;
                        stop = self.config.fail_fast;
                    }
                    TestResult::Skipped => report.skipped += 1,
                }
                tests.push(CaseResult {
                    name: case.name.clone(),
                    result,
                    duration,
                });
            }

            report.suite_results.push(SuiteResult {
                name: suite.name.clone(),
                tests,
                duration: suite_start.elapsed(),
            });
        }

        report.duration = start.elapsed();
        report
    }
}

fn run_case(case: &TestCase) -> TestResult {
    let mut runtime = Runtime::new();
    match (case.body)(&mut runtime) {
        Ok(()) => TestResult::Passed,
        Err(err) => {
            tracing::debug!(test = %case.name, error = %err, "test failed");
            let message = match err.kind() {
                Some(kind) => format!("{}: {}", kind, err.message()),
                None => err.to_string(),
            };
            TestResult::Failed { message }
        }
    }
}

// ---------------------------------------------------------------------------
// Assertions
// ---------------------------------------------------------------------------

/// Fail with a descriptive error unless `condition` holds.
pub fn expect(condition: bool, description: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::generic(format!("Expectation failed: {}", description)))
    }
}

/// Require that `operation` throws an error of `kind` with exactly `message`.
pub fn expect_throw_with_message<T, F>(kind: ErrorKind, message: &str, operation: F) -> Result<()>
where
    F: FnOnce() -> Result<T>,
{
    match operation() {
        Ok(_) => Err(Error::generic(format!(
            "Expected {} with message \"{}\", but nothing was thrown",
            kind, message
        ))),
        Err(err) if err.kind() == Some(kind) && err.message() == message => Ok(()),
        Err(err) => Err(Error::generic(format!(
            "Expected {} with message \"{}\", got {}: \"{}\"",
            kind,
            message,
            err.kind()
                .map(|k| k.to_string())
                .unwrap_or_else(|| "non-JS error".to_string()),
            err.message()
        ))),
    }
}

// ---------------------------------------------------------------------------
// Built-in conformance suites
// ---------------------------------------------------------------------------

/// The conformance suites shipped with the runtime.
pub fn builtin_suites() -> Vec<TestSuite> {
    vec![function_this_suite(), instant_equals_suite(), instant_constructor_suite()]
}

fn function_this_suite() -> TestSuite {
    TestSuite::new("function this")
        .test("top-level this is the global object", |rt| {
            let this = rt.top_level_this();
            expect(this.type_of() == "object", "typeof this === \"object\"")?;
            let global_this = rt.lookup("globalThis")?;
            expect(this.strict_equals(&global_this), "this === globalThis")
        })
        .test("constructor receives a fresh object", |rt| {
            let foo = rt.define_function("Foo", 0, FunctionFlags::CONSTRUCTOR, |_, frame, _| {
                frame.this_value.set_property("x", Value::Number(5.0));
                expect(frame.this_value.type_of() == "object", "typeof this === \"object\"")?;
                expect(
                    frame.this_value.get_property("x") == Some(Value::Number(5.0)),
                    "this.x === 5",
                )?;
                Ok(Value::Undefined)
            });
            let instance = rt.construct(&foo, &[])?;
            expect(instance.get_property("x") == Some(Value::Number(5.0)), "new Foo().x === 5")
        })
        .test("sloppy plain call sees the global object", |rt| {
            let f = rt.define_function("f", 0, FunctionFlags::empty(), |_, frame, _| {
                Ok(frame.this_value.clone())
            });
            let this = rt.call(&f, None, &[])?;
            expect(this.strict_equals(&rt.global_object()), "this === globalThis")
        })
        .test("strict plain call sees undefined", |rt| {
            let f = rt.define_function("f", 0, FunctionFlags::STRICT, |_, frame, _| {
                Ok(frame.this_value.clone())
            });
            let this = rt.call(&f, None, &[])?;
            expect(this.is_undefined(), "this === undefined")
        })
}

fn instant_equals_suite() -> TestSuite {
    TestSuite::new("Temporal.Instant.prototype.equals")
        .test("basic functionality", |rt| {
            let instant1 = rt.new_instant(111)?;
            let same = rt.call_method(&instant1, "equals", &[instant1.clone()])?;
            expect(same.to_boolean(), "instant1.equals(instant1)")?;
            let twin = rt.new_instant(111)?;
            let equal = rt.call_method(&instant1, "equals", &[twin])?;
            expect(equal.to_boolean(), "instant1.equals(new Temporal.Instant(111n))")?;
            let instant2 = rt.new_instant(999)?;
            let different = rt.call_method(&instant1, "equals", &[instant2])?;
            expect(!different.to_boolean(), "!instant1.equals(instant2)")
        })
        .test("this value must be a Temporal.Instant object", |rt| {
            let equals = rt.lookup("Temporal.Instant.prototype.equals")?;
            expect_throw_with_message(ErrorKind::TypeError, "Not a Temporal.Instant", || {
                rt.call_method(
                    &equals,
                    "call",
                    &[Value::from("foo"), Value::Number(1.0), Value::Number(2.0)],
                )
            })
        })
}

fn instant_constructor_suite() -> TestSuite {
    TestSuite::new("Temporal.Instant")
        .test("boundary values are accepted", |rt| {
            let limit = crate::runtime::temporal::max_epoch_nanoseconds();
            rt.new_instant(limit.clone())?;
            rt.new_instant(-limit)?;
            Ok(())
        })
        .test("values outside the window are rejected", |rt| {
            let limit = crate::runtime::temporal::max_epoch_nanoseconds();
            expect_throw_with_message(ErrorKind::RangeError, "Invalid epoch nanoseconds value", || {
                rt.new_instant(limit + 1)
            })
        })
        .test("must be called with new", |rt| {
            let ctor = rt.lookup("Temporal.Instant")?;
            expect_throw_with_message(
                ErrorKind::TypeError,
                "Temporal.Instant constructor must be called with 'new'",
                || rt.call(&ctor, None, &[Value::from(BigInt::from(111))]),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_suites_pass() {
        let mut runner = TestRunner::new(TestConfig::default());
        for suite in builtin_suites() {
            runner.add_suite(suite);
        }
        let report = runner.run();
        assert!(report.is_success(), "{}", report);
        assert_eq!(report.passed, report.total);
    }

    #[test]
    fn test_failures_are_reported_with_message() {
        let mut runner = TestRunner::new(TestConfig::default());
        runner.add_suite(TestSuite::new("broken").test("fails", |_| expect(false, "1 === 2")));
        let report = runner.run();
        assert_eq!(report.failed, 1);
        let case = &report.suite_results[0].tests[0];
        assert_eq!(
            case.result,
            TestResult::Failed {
                message: "Error: Expectation failed: 1 === 2".to_string()
            }
        );
    }

    #[test]
    fn test_filter_skips_unmatched() {
        let config = TestConfig {
            filter: Some("equals".to_string()),
            ..TestConfig::default()
        };
        let mut runner = TestRunner::new(config);
        for suite in builtin_suites() {
            runner.add_suite(suite);
        }
        let report = runner.run();
        assert_eq!(report.passed, 2);
        assert_eq!(report.skipped, report.total - 2);
    }

    #[test]
    fn test_fail_fast_skips_remaining() {
        let config = TestConfig {
            fail_fast: true,
            ..TestConfig::default()
        };
        let mut runner = TestRunner::new(config);
        runner.add_suite(
            TestSuite::new("s")
                .test("first", |_| expect(false, "nope"))
                .test("second", |_| Ok(())),
        );
        let report = runner.run();
        assert_eq!((report.failed, report.skipped), (1, 1));
    }

    #[test]
    fn test_expect_throw_reports_mismatch() {
        let err = expect_throw_with_message(ErrorKind::TypeError, "x", || {
            Err::<(), _>(Error::range_error("y"))
        })
        .unwrap_err();
        assert_eq!(
            err.message(),
            "Expected TypeError with message \"x\", got RangeError: \"y\""
        );

        let err = expect_throw_with_message(ErrorKind::TypeError, "x", || Ok(1)).unwrap_err();
        assert!(err.message().contains("nothing was thrown"));
    }

    #[test]
    fn test_report_json() {
        let mut runner = TestRunner::new(TestConfig::default());
        runner.add_suite(TestSuite::new("s").test("ok", |_| Ok(())));
        let json = runner.run().to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["passed"], 1);
        assert_eq!(parsed["suite_results"][0]["tests"][0]["result"]["status"], "passed");
    }
}
