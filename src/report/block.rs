//! YAML-ish diagnostic blocks for `not ok` lines.

use serde::Serialize;

use crate::assert::AssertionFailure;

/// Render a failure into the diagnostic block that follows its `not ok`
/// line.
///
/// The block is one multi-line string, emitted through the sink as a single
/// write. Operator, expected, and actual values are serialized as JSON
/// literals so strings stay quoted and nested values stay visible. Block
/// lines carry a two-space margin; trace lines are padded a second time so
/// they nest under `stack:`.
///
/// Rendering is infallible: an empty trace simply contributes no lines.
pub fn render_failure(failure: &AssertionFailure) -> String {
    let mut lines = vec![
        "---".to_string(),
        format!("operator: {}", json(&failure.operator)),
        format!("expected: {}", json(&failure.expected)),
        format!("actual: {}", json(&failure.actual)),
        "stack:".to_string(),
    ];
    for line in failure.trace.lines() {
        lines.push(pad(line));
    }
    lines.push("...".to_string());

    lines
        .iter()
        .map(|line| pad(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn pad(line: &str) -> String {
    format!("  {}", line)
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}
