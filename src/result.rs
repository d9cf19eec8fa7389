//! The verdict vocabulary shared by every test program and the line protocol used to hand it
//! to the test runner.
//!
//! A test prints exactly one `PIGLIT: {'result': ...}` line and exits. Sub-tests may be
//! reported before that with [`report_subtest`].

use std::error::Error;
use std::fmt;
use std::io::{self, Write};
use std::process;

use crate::context::ContextCreationError;
use crate::program::ProgramCreationError;
use crate::vbo::VboError;

/// Outcome of a test.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TestResult {
    /// The behavior under test is correct.
    Pass,
    /// The behavior under test is wrong.
    Fail,
    /// The test could not run on this implementation.
    Skip,
    /// The behavior is acceptable but suspicious.
    Warn,
}

impl TestResult {
    /// Merges two results. A skipped result yields the other one, otherwise the worst of the
    /// two wins, with `Fail` worse than `Warn` and `Warn` worse than `Pass`.
    pub fn merge(self, other: TestResult) -> TestResult {
        match (self, other) {
            (TestResult::Skip, other) => other,
            (this, TestResult::Skip) => this,
            (TestResult::Fail, _) | (_, TestResult::Fail) => TestResult::Fail,
            (TestResult::Warn, _) | (_, TestResult::Warn) => TestResult::Warn,
            (TestResult::Pass, TestResult::Pass) => TestResult::Pass,
        }
    }

    /// Returns `"pass"`, `"fail"`, `"skip"` or `"warn"`.
    pub fn name(self) -> &'static str {
        match self {
            TestResult::Pass => "pass",
            TestResult::Fail => "fail",
            TestResult::Skip => "skip",
            TestResult::Warn => "warn",
        }
    }

    /// Returns the line the test runner parses.
    pub fn line(self) -> String {
        format!("PIGLIT: {{'result': '{}' }}", self.name())
    }

    /// Process exit code for this result. Only failures are nonzero.
    pub fn exit_code(self) -> i32 {
        match self {
            TestResult::Fail => 1,
            TestResult::Pass | TestResult::Skip | TestResult::Warn => 0,
        }
    }

    /// Prints the result line and terminates the process.
    ///
    /// Diagnostics already written to stdout and stderr are flushed first so that the result
    /// line is always the last thing the runner sees.
    pub fn report(self) -> ! {
        let _ = io::stderr().flush();
        let _ = io::stdout().flush();

        println!("{}", self.line());
        let _ = io::stdout().flush();

        process::exit(self.exit_code())
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.name())
    }
}

/// Returns the line reporting the result of one sub-test.
pub fn subtest_line(name: &str, result: TestResult) -> String {
    format!("PIGLIT: {{'subtest': {{'{}' : '{}'}}}}", name, result.name())
}

/// Reports the result of one sub-test without exiting.
pub fn report_subtest(name: &str, result: TestResult) {
    println!("{}", subtest_line(name, result));
    let _ = io::stdout().flush();
}

/// Error that stops a test before it could produce its own verdict.
///
/// The framework turns it into a result exactly once, at the top of the test program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestError {
    /// The test is broken or the implementation failed during setup.
    Fail(String),
    /// The implementation lacks something the test requires.
    Skip(String),
}

impl TestError {
    /// Result reported for this error.
    pub fn result(&self) -> TestResult {
        match self {
            TestError::Fail(_) => TestResult::Fail,
            TestError::Skip(_) => TestResult::Skip,
        }
    }
}

impl fmt::Display for TestError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestError::Fail(msg) | TestError::Skip(msg) => fmt.write_str(msg),
        }
    }
}

impl Error for TestError {}

impl From<VboError> for TestError {
    fn from(err: VboError) -> TestError {
        TestError::Fail(err.to_string())
    }
}

impl From<ProgramCreationError> for TestError {
    fn from(err: ProgramCreationError) -> TestError {
        TestError::Fail(err.to_string())
    }
}

impl From<ContextCreationError> for TestError {
    fn from(err: ContextCreationError) -> TestError {
        TestError::Fail(err.to_string())
    }
}
