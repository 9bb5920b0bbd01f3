//! Assertion wrapping.
//!
//! This module turns an arbitrary predicate over dynamic values into an
//! [`Assertion`]: a named, shareable check that returns the predicate's
//! truthy witness on success and a structured [`AssertionFailure`] otherwise.
//! A small standard set (truthiness, falsiness, same-value equality and its
//! negation) is built on the same primitive.
//!
//! # Example
//!
//! ```rust
//! use tapline::{values, wrap, Value};
//!
//! let positive = wrap(|args| {
//!     Value::Bool(matches!(args.first(), Some(Value::Int(n)) if *n > 0))
//! })
//! .named("positive")
//! .operator(">");
//!
//! assert!(positive.check(&values![3]).is_ok());
//! assert!(positive.check(&values![-3]).is_err());
//! ```

use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use crate::value::Value;

/// The failure raised by a falsy predicate result.
///
/// Carries the assertion's display identity plus the actual/expected pair so
/// the reporter can render a diagnostic block. It never crosses the
/// [`ReportSession`](crate::ReportSession) boundary; only direct
/// [`Assertion::check`] callers see it as an `Err`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("'{name}' assertion failed ({operator})")]
pub struct AssertionFailure {
    /// Display name of the failed assertion; empty when unnamed.
    pub name: String,
    /// The wrap-time operator label, e.g. `"is"` or `"!!"`.
    pub operator: String,
    /// Second call argument if supplied, else the wrapper's fallback.
    pub expected: Value,
    /// First call argument, `Null` when the call had none.
    pub actual: Value,
    /// Caller location text, one entry per line. May be empty.
    pub trace: String,
}

type Predicate = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// A predicate wrapped with failure metadata.
///
/// Assertions are stateless and cheap to clone; one instance can back any
/// number of report sessions. Configure with the builder methods:
///
/// ```rust
/// use tapline::{wrap, Value};
///
/// let ok = wrap(|args| Value::Bool(args.first().map(Value::is_truthy).unwrap_or(false)))
///     .named("ok")
///     .operator("!!")
///     .fallback(true);
/// assert_eq!(ok.name(), Some("ok"));
/// ```
#[derive(Clone)]
pub struct Assertion {
    name: Option<String>,
    operator: String,
    fallback: Option<Value>,
    predicate: Predicate,
}

/// Wrap a predicate into an unnamed [`Assertion`] with operator `"is"` and
/// no expected fallback.
pub fn wrap<F>(predicate: F) -> Assertion
where
    F: Fn(&[Value]) -> Value + Send + Sync + 'static,
{
    Assertion {
        name: None,
        operator: "is".to_string(),
        fallback: None,
        predicate: Arc::new(predicate),
    }
}

impl Assertion {
    /// The default assertion: plain truthiness of the first argument.
    ///
    /// Unnamed, so a session reporting it falls back to the `"(anon)"`
    /// description placeholder.
    pub fn identity() -> Self {
        wrap(|args| args.first().cloned().unwrap_or(Value::Null))
    }

    /// Set the display name used as the default test description.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the operator label reported in failure blocks.
    pub fn operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = operator.into();
        self
    }

    /// Set the expected value reported when a call supplies no second
    /// argument.
    pub fn fallback(mut self, value: impl Into<Value>) -> Self {
        self.fallback = Some(value.into());
        self
    }

    /// The display name, if one was set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Run the predicate over `args`.
    ///
    /// A truthy result is returned as the witness. A falsy result becomes an
    /// [`AssertionFailure`] with `actual` = first argument, `expected` =
    /// second argument (else the configured fallback), and a trace pointing
    /// at the calling location.
    #[track_caller]
    pub fn check(&self, args: &[Value]) -> Result<Value, AssertionFailure> {
        let result = (self.predicate)(args);
        if result.is_truthy() {
            return Ok(result);
        }

        let actual = args.first().cloned().unwrap_or(Value::Null);
        let expected = args
            .get(1)
            .cloned()
            .or_else(|| self.fallback.clone())
            .unwrap_or(Value::Null);
        let caller = Location::caller();

        Err(AssertionFailure {
            name: self.name.clone().unwrap_or_default(),
            operator: self.operator.clone(),
            expected,
            actual,
            trace: format!("at {}:{}:{}", caller.file(), caller.line(), caller.column()),
        })
    }
}

impl fmt::Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertion")
            .field("name", &self.name)
            .field("operator", &self.operator)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

/// The standard assertion set, selected by field access.
///
/// # Example
///
/// ```rust
/// use tapline::{values, Assertions};
///
/// let named = Assertions::standard();
/// assert!(named.equal.check(&values![4, 4]).is_ok());
/// assert!(named.not_ok.check(&values![0]).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Assertions {
    /// Truthiness of the first argument; unnamed.
    pub default: Assertion,
    /// Truthiness check, operator `"!!"`.
    pub ok: Assertion,
    /// Falsiness check, operator `"!"`.
    pub not_ok: Assertion,
    /// Same-value equality of the first two arguments.
    pub equal: Assertion,
    /// Same-value inequality of the first two arguments.
    pub not_equal: Assertion,
}

impl Assertions {
    /// Build the standard set.
    pub fn standard() -> Self {
        Self {
            default: Assertion::identity(),
            ok: wrap(first_is_truthy).named("ok").operator("!!").fallback(true),
            not_ok: wrap(|args| Value::Bool(!first_is_truthy(args).is_truthy()))
                .named("not_ok")
                .operator("!")
                .fallback(false),
            equal: wrap(|args| Value::Bool(first_two(args, Value::same_value))).named("equal"),
            not_equal: wrap(|args| Value::Bool(!first_two(args, Value::same_value)))
                .named("not_equal"),
        }
    }
}

impl Default for Assertions {
    fn default() -> Self {
        Self::standard()
    }
}

fn first_is_truthy(args: &[Value]) -> Value {
    Value::Bool(args.first().map(Value::is_truthy).unwrap_or(false))
}

fn first_two(args: &[Value], compare: fn(&Value, &Value) -> bool) -> bool {
    let a = args.first().unwrap_or(&Value::Null);
    let b = args.get(1).unwrap_or(&Value::Null);
    compare(a, b)
}
