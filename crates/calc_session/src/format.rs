//! HTML output formatting for the command executor.
//!
//! Every result renders to a small HTML fragment; the desktop front
//! end injects it into the output pane and the CLI strips the tags.

use calc_engine::{EngineError, Registry, Value};
use calc_num::format::decimal_str;
use calc_num::{Numeric, NumericMode};

pub const MAX_INLINE_ROWS: usize = 6;
pub const MAX_INLINE_COLS: usize = 24;

pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Mode-aware number rendering: Big mode expands rationals to a
/// decimal string at the session precision, Rational mode keeps the
/// fraction, Float mode uses the shortest round-trip form.
pub fn number_text(n: &Numeric, mode: NumericMode) -> String {
    match (n, mode) {
        (Numeric::Exact(r), NumericMode::Big { precision }) => decimal_str(r, precision),
        _ => n.to_string(),
    }
}

pub fn format_value(reg: &Registry, mode: NumericMode, value: &Value) -> String {
    match value {
        Value::Number(n) => escape(&number_text(n, mode)),
        Value::Str(s) if s.is_empty() => {
            "<span class=\"output-none\">No output</span>".to_string()
        }
        Value::Str(s) if s == "null" => "<span class=\"output-null\">null</span>".to_string(),
        Value::Str(s) => format!("<span class=\"output-string\">{}</span>", escape(s)),
        Value::Symbolic(e) => escape(&e.to_string()),
        Value::Function(name) => {
            let (params, help) = reg
                .get(name)
                .map(|def| (def.params, def.help))
                .unwrap_or(("", ""));
            format!(
                "<span class=\"output-help\">{}({}) - {}</span>",
                escape(name),
                escape(params),
                escape(help)
            )
        }
        Value::Matrix(rows) => format_matrix(rows, mode),
        Value::Record(pairs) => format_record(pairs),
    }
}

fn format_matrix(rows: &[Vec<Numeric>], mode: NumericMode) -> String {
    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    if rows.len() >= MAX_INLINE_ROWS || cols >= MAX_INLINE_COLS {
        return format!(
            "<span class=\"view-matrix-link\">{} x {} matrix</span>",
            rows.len(),
            cols
        );
    }
    let mut out = String::from("<table class=\"matrix-table\">");
    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!("<td>{}</td>", escape(&number_text(cell, mode))));
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");
    out
}

fn format_record(pairs: &[(String, String)]) -> String {
    let mut out = String::from("<table class=\"record-table\">");
    for (key, value) in pairs {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>",
            escape(key),
            escape(value)
        ));
    }
    out.push_str("</table>");
    out
}

pub fn format_error(err: &EngineError) -> String {
    format!(
        "<span class=\"error-msg\"><b>{}</b> {}</span>",
        err.name(),
        escape(&err.to_string())
    )
}

pub fn format_warning(msg: &str) -> String {
    format!("<span class=\"warning-msg\">{}</span>", escape(msg))
}
