//! # tapline
//!
//! Predicate-wrapping assertions with a TAP version 13 line reporter.
//!
//! This library has two tightly coupled halves: [`wrap`] turns any
//! truthiness-producing predicate into an [`Assertion`] that fails with
//! structured metadata (actual, expected, operator, name), and
//! [`ReportSession`] turns sequential assertion invocations into a TAP
//! stream: versioned header, per-test `ok` / `not ok` lines, YAML-ish
//! failure diagnostics, and a final summary.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tapline::{values, SessionSet};
//!
//! let tap = SessionSet::stdout();
//!
//! tap.ok.describe("truthy answer", &[]).test(&values![42]);
//! tap.equal.test(&values![2 + 2, 4]);
//! tap.not_ok.describe("flaky on CI # skip", &[]).test(&values![1]);
//!
//! tap.exit(0);
//! ```
//!
//! Output (failure block elided):
//!
//! ```text
//! TAP version 13
//! ok 1 - truthy answer
//! ok 2 - equal
//! not ok 3 - flaky on CI # skip
//! 1..3
//! # tests 3
//! # pass  2
//! # fail  0
//! # skip  1
//! ```
//!
//! ## Custom Assertions
//!
//! ```rust,ignore
//! use tapline::{values, wrap, ReportSession, Value};
//!
//! let positive = wrap(|args| {
//!     Value::Bool(matches!(args.first(), Some(Value::Int(n)) if *n > 0))
//! })
//! .named("positive")
//! .operator(">");
//!
//! let session = ReportSession::stdout(positive);
//! session.test(&values![3]);
//! session.exit(0);
//! ```
//!
//! ## Capturing Output
//!
//! Sessions write through an injected [`Sink`]; use a [`BufferSink`] to
//! capture the stream instead of printing it:
//!
//! ```rust
//! use tapline::{values, BufferSink, SessionSet};
//!
//! let sink = BufferSink::new();
//! let tap = SessionSet::new(sink.clone());
//! tap.equal.test(&values![1, 1]);
//! tap.exit(0);
//! assert_eq!(sink.lines()[1], "ok 1 - equal");
//! ```

pub mod assert;
pub mod report;
pub mod sink;
pub mod value;

// Assertion wrapping
pub use assert::{wrap, Assertion, AssertionFailure, Assertions};

// Report emission
pub use report::{render_failure, ReportSession, SessionSet, Totals};

// Line sinks
pub use sink::{BufferSink, Sink, StdoutSink, WriteSink};

// Dynamic values
pub use value::Value;
