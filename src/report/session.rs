//! The TAP reporting state machine.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;

use crate::assert::{Assertion, Assertions};
use crate::sink::{Sink, StdoutSink};
use crate::value::Value;

use super::block::render_failure;

const HEADER: &str = "TAP version 13";

/// Directive patterns, compiled once. The match is a case-insensitive
/// substring search anywhere in the description; this fragile-looking text
/// convention is the contract, not an implementation detail.
fn skip_directive() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("(?i)# skip").expect("directive pattern is valid"))
}

fn todo_directive() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("(?i)# todo").expect("directive pattern is valid"))
}

/// Running counters for one report run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub tests: u32,
    pub pass: u32,
    pub fail: u32,
    pub skip: u32,
}

/// State shared by a session and all of its children.
struct SessionState {
    sink: Box<dyn Sink>,
    totals: Totals,
    header_pending: bool,
    description: Option<String>,
    diagnostics: Option<Vec<String>>,
}

impl SessionState {
    fn new(sink: Box<dyn Sink>) -> Self {
        Self {
            sink,
            totals: Totals::default(),
            header_pending: true,
            description: None,
            diagnostics: None,
        }
    }

    fn emit(&mut self, line: &str) {
        self.sink.write_line(line);
    }
}

/// A stateful test-line processor bound to one assertion.
///
/// Each `test()` call runs the held assertion, updates counters, and emits
/// protocol lines through the injected sink. Child sessions created with
/// [`child`](ReportSession::child) share counters, staging, and sink, so a
/// family of named assertions reports into a single TAP stream.
///
/// Sessions are single-threaded: an assertion run never suspends, and
/// counters are only touched by the session's own method calls.
///
/// # Example
///
/// ```rust
/// use tapline::{values, Assertion, BufferSink, ReportSession};
///
/// let sink = BufferSink::new();
/// let session = ReportSession::new(Assertion::identity(), sink.clone());
/// session.test(&values![true]);
/// session.exit(0);
/// assert_eq!(sink.lines()[0], "TAP version 13");
/// assert_eq!(sink.lines()[1], "ok 1 - (anon)");
/// ```
pub struct ReportSession {
    state: Rc<RefCell<SessionState>>,
    assertion: Assertion,
}

impl ReportSession {
    /// Create a session over `assertion`, reporting through `sink`.
    pub fn new(assertion: Assertion, sink: impl Sink + 'static) -> Self {
        Self {
            state: Rc::new(RefCell::new(SessionState::new(Box::new(sink)))),
            assertion,
        }
    }

    /// Create a session reporting to stdout.
    pub fn stdout(assertion: Assertion) -> Self {
        Self::new(assertion, StdoutSink)
    }

    /// Derive a session over a different assertion that shares this
    /// session's counters, staging, and sink.
    pub fn child(&self, assertion: Assertion) -> Self {
        Self {
            state: Rc::clone(&self.state),
            assertion,
        }
    }

    /// Stage a description and diagnostic lines for the next `test()` call.
    ///
    /// Staging is last-write-wins; a second `describe` before a `test`
    /// replaces both fields. Diagnostics are emitted after the result line,
    /// each prefixed with `# `.
    pub fn describe(&self, message: impl Into<String>, diagnostics: &[&str]) -> &Self {
        let mut state = self.state.borrow_mut();
        state.description = Some(message.into());
        state.diagnostics = Some(diagnostics.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Process one test line.
    ///
    /// Runs the held assertion over `args`, consumes any staged
    /// description/diagnostics, classifies the outcome from `# skip` and
    /// `# todo` directives, updates counters, and emits the header (first
    /// call of a run only), the result line, the failure block, and the
    /// diagnostics. Never panics and never surfaces the failure; the `not
    /// ok` line and its block are the whole error path.
    #[track_caller]
    pub fn test(&self, args: &[Value]) -> &Self {
        let error_block = match self.assertion.check(args) {
            Ok(_) => None,
            Err(failure) => Some(render_failure(&failure)),
        };

        let mut state = self.state.borrow_mut();

        let description = state.description.take().unwrap_or_else(|| {
            match self.assertion.name() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => "(anon)".to_string(),
            }
        });
        let diagnostics = state.diagnostics.take().unwrap_or_default();

        let skip = skip_directive().is_match(&description);
        let todo = todo_directive().is_match(&description);
        let errored = error_block.is_some();

        // Order matters against the display below: a skipped or todo test
        // keeps its `not ok` framing while staying out of the fail count.
        if skip {
            state.totals.skip += 1;
        }
        if errored && !skip && !todo {
            state.totals.fail += 1;
        }
        if !errored && !skip {
            state.totals.pass += 1;
        }
        state.totals.tests += 1;

        if state.header_pending {
            state.emit(HEADER);
        }
        if !description.is_empty() {
            let line = format!(
                "{} {} - {}",
                if errored { "not ok" } else { "ok" },
                state.totals.tests,
                description
            );
            state.emit(&line);
        }
        if let Some(block) = &error_block {
            state.emit(block);
        }
        for item in &diagnostics {
            if !item.is_empty() {
                state.emit(&format!("# {}", item));
            }
        }

        state.header_pending = false;
        self
    }

    /// Finish the run.
    ///
    /// A nonzero `code` bails out: only the header (if still pending) and a
    /// `Bail out!` line are emitted. A zero code emits the plan (`1..N` and
    /// `# tests N`, skipped only when nothing ran after a previous exit
    /// already reported) and the final pass/fail/skip comment lines.
    ///
    /// Counters reset and the header re-arms afterwards, so `exit` is safe
    /// to call repeatedly and the session is immediately reusable.
    pub fn exit(&self, code: i32) {
        let mut state = self.state.borrow_mut();
        let totals = state.totals;

        let header_was_pending = state.header_pending;
        if header_was_pending {
            state.emit(HEADER);
            state.header_pending = false;
        }

        if code != 0 {
            state.emit(&format!("Bail out! Exit with code {}", code));
        } else {
            if totals.tests > 0 || header_was_pending {
                state.emit(&format!("1..{}", totals.tests));
                state.emit(&format!("# tests {}", totals.tests));
            }
            state.emit(&format!("# pass  {}", totals.pass));
            state.emit(&format!("# fail  {}", totals.fail));
            state.emit(&format!("# skip  {}", totals.skip));
        }

        state.totals = Totals::default();
        state.header_pending = true;
    }

    /// Snapshot of the running counters.
    pub fn totals(&self) -> Totals {
        self.state.borrow().totals
    }
}

/// One session per standard assertion, all reporting into the same stream.
///
/// # Example
///
/// ```rust
/// use tapline::{values, BufferSink, SessionSet};
///
/// let sink = BufferSink::new();
/// let tap = SessionSet::new(sink.clone());
/// tap.ok.test(&values![1]);
/// tap.equal.test(&values![2 + 2, 4]);
/// tap.exit(0);
/// assert_eq!(sink.lines()[1], "ok 1 - ok");
/// assert_eq!(sink.lines()[2], "ok 2 - equal");
/// ```
pub struct SessionSet {
    pub default: ReportSession,
    pub ok: ReportSession,
    pub not_ok: ReportSession,
    pub equal: ReportSession,
    pub not_equal: ReportSession,
}

impl SessionSet {
    /// Wire the standard assertion set over one shared sink.
    pub fn new(sink: impl Sink + 'static) -> Self {
        let named = Assertions::standard();
        let default = ReportSession::new(named.default, sink);
        Self {
            ok: default.child(named.ok),
            not_ok: default.child(named.not_ok),
            equal: default.child(named.equal),
            not_equal: default.child(named.not_equal),
            default,
        }
    }

    /// Wire the standard set over stdout.
    pub fn stdout() -> Self {
        Self::new(StdoutSink)
    }

    /// Finish the shared run; see [`ReportSession::exit`].
    pub fn exit(&self, code: i32) {
        self.default.exit(code);
    }

    /// Snapshot of the shared counters.
    pub fn totals(&self) -> Totals {
        self.default.totals()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::BufferSink;
    use crate::values;

    fn session() -> (BufferSink, ReportSession) {
        let sink = BufferSink::new();
        let session = ReportSession::new(Assertion::identity(), sink.clone());
        (sink, session)
    }

    #[test]
    fn test_describe_is_last_write_wins() {
        let (sink, session) = session();
        session
            .describe("first", &["dropped"])
            .describe("second", &["kept"])
            .test(&values![true]);
        let lines = sink.lines();
        assert_eq!(lines[1], "ok 1 - second");
        assert_eq!(lines[2], "# kept");
        assert!(!sink.text().contains("dropped"));
    }

    #[test]
    fn test_description_falls_back_to_assertion_name() {
        let sink = BufferSink::new();
        let session = ReportSession::new(Assertions::standard().ok, sink.clone());
        session.test(&values![1]);
        assert_eq!(sink.lines()[1], "ok 1 - ok");
    }

    #[test]
    fn test_empty_description_suppresses_result_line() {
        let (sink, session) = session();
        session.describe("", &[]).test(&values![true]);
        assert_eq!(sink.lines(), vec![HEADER.to_string()]);
        assert_eq!(session.totals().pass, 1);
        assert_eq!(session.totals().tests, 1);
    }

    #[test]
    fn test_directives_match_case_insensitively() {
        let (_, session) = session();
        session.describe("works anyway # SKIP on CI", &[]).test(&values![false]);
        session.describe("later # ToDo", &[]).test(&values![false]);
        let totals = session.totals();
        assert_eq!(totals.skip, 1);
        assert_eq!(totals.fail, 0);
        assert_eq!(totals.pass, 0);
        assert_eq!(totals.tests, 2);
    }

    #[test]
    fn test_child_shares_counters_and_numbering() {
        let (sink, session) = session();
        let equal = session.child(Assertions::standard().equal);
        session.test(&values![true]);
        equal.test(&values![3, 3]);
        assert_eq!(sink.lines()[2], "ok 2 - equal");
        assert_eq!(session.totals().tests, 2);
        assert_eq!(equal.totals().tests, 2);
    }

    #[test]
    fn test_staged_description_survives_exit() {
        let (sink, session) = session();
        session.describe("carried over", &[]);
        session.exit(0);
        session.test(&values![true]);
        assert!(sink.text().contains("ok 1 - carried over"));
    }
}
