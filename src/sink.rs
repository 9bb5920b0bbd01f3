//! Line sinks for emitted report text.
//!
//! The reporter never prints on its own; it writes through a [`Sink`]
//! injected at session construction. A sink is synchronous and assumed to
//! always succeed, and receives exactly one call per emitted line or
//! diagnostic block.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// Receiver of formatted report lines.
pub trait Sink {
    /// Write one line (or one multi-line diagnostic block). The sink supplies
    /// the line termination.
    fn write_line(&mut self, line: &str);
}

/// Writes each line to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn write_line(&mut self, line: &str) {
        println!("{}", line);
    }
}

/// Adapts any [`std::io::Write`] into a sink.
///
/// Write errors are swallowed; the report protocol treats its sink as always
/// available, and a failed diagnostic line must not abort the run.
///
/// # Example
///
/// ```rust,ignore
/// use tapline::{ReportSession, WriteSink};
///
/// let file = std::fs::File::create("report.tap")?;
/// let session = ReportSession::new(assertion, WriteSink::new(file));
/// ```
#[derive(Debug)]
pub struct WriteSink<W: Write> {
    writer: W,
}

impl<W: Write> WriteSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for WriteSink<W> {
    fn write_line(&mut self, line: &str) {
        let _ = writeln!(self.writer, "{}", line);
    }
}

/// In-memory sink for tests and embedding.
///
/// Clones share one buffer, so a clone handed to a session can be inspected
/// after the session has written through its own copy.
///
/// # Example
///
/// ```rust
/// use tapline::{BufferSink, Sink};
///
/// let sink = BufferSink::new();
/// let mut writer = sink.clone();
/// writer.write_line("TAP version 13");
/// assert_eq!(sink.lines(), vec!["TAP version 13".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    lines: Rc<RefCell<Vec<String>>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far, one entry per write.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Everything written so far, joined with newlines.
    pub fn text(&self) -> String {
        self.lines.borrow().join("\n")
    }

    /// Discard captured output.
    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl Sink for BufferSink {
    fn write_line(&mut self, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}
