//! Integration tests for the TAP session lifecycle.
//!
//! Each test drives a session through a capturing sink and checks the exact
//! emitted transcript: header placement, result-line framing, failure
//! blocks, directives, and summary/bail behavior.

use tapline::{values, Assertion, Assertions, BufferSink, ReportSession, SessionSet, WriteSink};

fn anon_session() -> (BufferSink, ReportSession) {
    let sink = BufferSink::new();
    let session = ReportSession::new(Assertion::identity(), sink.clone());
    (sink, session)
}

#[test]
fn test_single_pass_transcript() {
    let (sink, session) = anon_session();
    session.test(&values![true]);
    session.exit(0);

    assert_eq!(
        sink.lines(),
        vec![
            "TAP version 13".to_string(),
            "ok 1 - (anon)".to_string(),
            "1..1".to_string(),
            "# tests 1".to_string(),
            "# pass  1".to_string(),
            "# fail  0".to_string(),
            "# skip  0".to_string(),
        ]
    );
}

#[test]
fn test_failure_emits_not_ok_with_block() {
    let sink = BufferSink::new();
    let tap = SessionSet::new(sink.clone());
    tap.equal.test(&values![4, 5]);

    let lines = sink.lines();
    assert_eq!(lines[0], "TAP version 13");
    assert_eq!(lines[1], "not ok 1 - equal");

    let block = &lines[2];
    assert!(block.starts_with("  ---\n"), "block was: {}", block);
    assert!(block.contains("  operator: \"is\""));
    assert!(block.contains("  expected: 5"));
    assert!(block.contains("  actual: 4"));
    assert!(block.contains("  stack:\n    at "));
    assert!(block.ends_with("\n  ..."));

    assert_eq!(tap.totals().fail, 1);
    assert_eq!(tap.totals().pass, 0);
}

#[test]
fn test_skip_directive_counts_skip_not_fail() {
    let (sink, session) = anon_session();
    session
        .describe("should skip # skip", &[])
        .test(&values![false]);

    let lines = sink.lines();
    assert_eq!(lines[1], "not ok 1 - should skip # skip");
    assert!(lines[2].starts_with("  ---"), "failure block still emitted");

    let totals = session.totals();
    assert_eq!(totals.skip, 1);
    assert_eq!(totals.fail, 0);
    assert_eq!(totals.pass, 0);
    assert_eq!(totals.tests, 1);
}

#[test]
fn test_skip_directive_applies_to_passing_tests_too() {
    let (_, session) = anon_session();
    session
        .describe("green but quarantined # SKIP", &[])
        .test(&values![true]);

    let totals = session.totals();
    assert_eq!(totals.skip, 1);
    assert_eq!(totals.pass, 0);
    assert_eq!(totals.fail, 0);
}

#[test]
fn test_todo_failure_counts_in_neither_bucket() {
    let (_, session) = anon_session();
    session.describe("wire up later # todo", &[]).test(&values![false]);

    let totals = session.totals();
    assert_eq!(totals.tests, 1);
    assert_eq!(totals.pass, 0);
    assert_eq!(totals.fail, 0);
    assert_eq!(totals.skip, 0);
}

#[test]
fn test_todo_pass_still_counts_as_pass() {
    let (_, session) = anon_session();
    session.describe("already done # todo", &[]).test(&values![true]);

    let totals = session.totals();
    assert_eq!(totals.pass, 1);
    assert_eq!(totals.fail, 0);
}

#[test]
fn test_header_appears_exactly_once_per_run() {
    let (sink, session) = anon_session();
    session.test(&values![true]);
    session.test(&values![true]);
    session.test(&values![false]);
    session.exit(0);

    let headers = sink
        .lines()
        .iter()
        .filter(|line| *line == "TAP version 13")
        .count();
    assert_eq!(headers, 1);
}

#[test]
fn test_zero_test_exit_emits_header_and_empty_plan() {
    let (sink, session) = anon_session();
    session.exit(0);

    assert_eq!(
        sink.lines(),
        vec![
            "TAP version 13".to_string(),
            "1..0".to_string(),
            "# tests 0".to_string(),
            "# pass  0".to_string(),
            "# fail  0".to_string(),
            "# skip  0".to_string(),
        ]
    );

    // exit on an already-reset session is safe and repeats the same shape.
    session.exit(0);
    assert_eq!(sink.lines().len(), 12);
    assert_eq!(sink.lines()[6], "TAP version 13");
}

#[test]
fn test_bail_out_suppresses_summary() {
    let (sink, session) = anon_session();
    session.test(&values![true]);
    session.exit(3);

    let lines = sink.lines();
    assert_eq!(lines.last().unwrap(), "Bail out! Exit with code 3");
    assert!(!lines.iter().any(|line| line.starts_with("1..")));
    assert!(!lines.iter().any(|line| line.starts_with("# pass")));
    assert!(!lines.iter().any(|line| line.starts_with("# tests")));
}

#[test]
fn test_bail_with_header_pending_still_emits_header() {
    let (sink, session) = anon_session();
    session.exit(1);

    assert_eq!(
        sink.lines(),
        vec![
            "TAP version 13".to_string(),
            "Bail out! Exit with code 1".to_string(),
        ]
    );
}

#[test]
fn test_exit_resets_counters_and_numbering() {
    let (sink, session) = anon_session();
    session.test(&values![true]).test(&values![true]);
    session.exit(0);
    assert_eq!(session.totals().tests, 0);

    session.test(&values![true]);
    assert_eq!(session.totals().tests, 1);
    assert!(sink.text().contains("\nok 1 - (anon)\nok 2 - (anon)\n"));
    // Numbering restarts after the reset.
    let restarts = sink
        .lines()
        .iter()
        .filter(|line| *line == "ok 1 - (anon)")
        .count();
    assert_eq!(restarts, 2);
}

#[test]
fn test_diagnostics_follow_the_result_line() {
    let (sink, session) = anon_session();
    session
        .describe("with notes", &["first note", "second note"])
        .test(&values![true]);

    assert_eq!(
        sink.lines(),
        vec![
            "TAP version 13".to_string(),
            "ok 1 - with notes".to_string(),
            "# first note".to_string(),
            "# second note".to_string(),
        ]
    );
}

#[test]
fn test_diagnostics_are_consumed_by_one_test() {
    let (sink, session) = anon_session();
    session
        .describe("first", &["only here"])
        .test(&values![true])
        .test(&values![true]);

    let lines = sink.lines();
    assert_eq!(lines[3], "ok 2 - (anon)");
    assert_eq!(
        lines.iter().filter(|l| *l == "# only here").count(),
        1
    );
}

#[test]
fn test_counter_identity_holds_without_todo_failures() {
    let (_, session) = anon_session();
    session.test(&values![true]);
    session.describe("bad", &[]).test(&values![false]);
    session.describe("off # skip", &[]).test(&values![false]);
    session.describe("green # todo", &[]).test(&values![true]);

    let totals = session.totals();
    assert_eq!(totals.pass + totals.fail + totals.skip, totals.tests);
}

#[test]
fn test_session_set_interleaves_into_one_stream() {
    let sink = BufferSink::new();
    let tap = SessionSet::new(sink.clone());
    tap.ok.test(&values![1]);
    tap.equal.test(&values![2, 2]);
    tap.not_ok.test(&values![0]);
    tap.exit(0);

    let lines = sink.lines();
    assert_eq!(lines[1], "ok 1 - ok");
    assert_eq!(lines[2], "ok 2 - equal");
    assert_eq!(lines[3], "ok 3 - not_ok");
    assert_eq!(lines[4], "1..3");
    assert_eq!(tap.totals().tests, 0, "exit resets the shared counters");
}

#[test]
fn test_report_written_through_file_sink() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("report.tap");

    {
        let file = std::fs::File::create(&path).unwrap();
        let session = ReportSession::new(Assertions::standard().ok, WriteSink::new(file));
        session.test(&values![1]);
        session.exit(0);
    }

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("TAP version 13\nok 1 - ok\n"));
    assert!(text.contains("# pass  1\n"));
    assert!(text.contains("# fail  0\n"));
}
