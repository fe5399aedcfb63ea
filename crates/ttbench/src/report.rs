//! Error chain rendering.

use std::fmt::Write;

/// Renders `error` and its causes, one per line, each indented two spaces
/// deeper than the one before. Every line but the last ends with `:`, the
/// last with `.`.
pub fn render_error(error: &anyhow::Error) -> String {
    let causes: Vec<String> = error.chain().map(ToString::to_string).collect();
    let mut out = String::new();
    for (depth, message) in causes.iter().enumerate() {
        let end = if depth + 1 == causes.len() { '.' } else { ':' };
        let _ = writeln!(out, "{:indent$}{message}{end}", "", indent = depth * 2);
    }
    out
}

/// Prints the rendered chain to stderr.
pub fn report_error(error: &anyhow::Error) {
    eprint!("{}", render_error(error));
}
