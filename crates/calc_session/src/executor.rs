//! Command executor: the never-fails boundary between raw input lines
//! and display HTML.

use crate::format;
use crate::state::SessionState;
use calc_engine::simplify::simplify;
use calc_engine::{eval, EngineError, Value};
use regex::Regex;
use std::sync::LazyLock;

// `Ans` only at word boundaries: `Ans^2` substitutes, `cleanse` does not
static ANS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bAns\b").expect("valid regex literal"));

/// Substitute the previous answer's full-precision serialization so
/// re-evaluation reproduces the value exactly. Plain numbers are
/// parenthesized to survive adjacent operators.
fn substitute_ans(state: &SessionState, line: &str) -> String {
    let Some((text, value)) = &state.ans else {
        return line.to_string();
    };
    let replacement = match value {
        Value::Number(_) => format!("({})", text),
        _ => text.clone(),
    };
    ANS_RE.replace_all(line, replacement.as_str()).into_owned()
}

/// Run one input line to completion. Never returns an error: every
/// failure renders as an error span, blank input renders as nothing.
pub fn execute(state: &mut SessionState, input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    state.push_history(trimmed);
    tracing::debug!(input = trimmed, "execute");

    let line = substitute_ans(state, trimmed);
    let parsed = match calc_parser::parse(&line) {
        Ok(p) => p,
        Err(err) => return format::format_error(&EngineError::Parse(err)),
    };

    let mut ctx = state.context();
    let result = match eval(&mut ctx, &parsed) {
        // Unknown symbols usually mean symbolic intent: `x + x` is an
        // expression to simplify, not a lookup failure
        Err(EngineError::UndefinedSymbol(_)) => Ok(Value::Symbolic(simplify(&parsed))),
        other => other,
    };
    let notices = ctx.take_notices();
    drop(ctx);

    let mut html = match result {
        Ok(value) => {
            if value.is_numeric_like() {
                state.ans = Some((value.to_string(), value.clone()));
            }
            format::format_value(state.registry(), state.numeric_mode, &value)
        }
        Err(err) => format::format_error(&err),
    };
    for notice in notices {
        html.push_str(&format::format_warning(&notice));
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_num::NumericMode;
    use std::time::Duration;

    fn run(state: &mut SessionState, line: &str) -> String {
        execute(state, line)
    }

    #[test]
    fn blank_input_renders_nothing_and_skips_history() {
        let mut state = SessionState::new();
        assert_eq!(run(&mut state, "   "), "");
        assert!(state.history.is_empty());
    }

    #[test]
    fn arithmetic_and_ans_chain() {
        let mut state = SessionState::new();
        assert_eq!(run(&mut state, "2 + 3"), "5");
        assert_eq!(run(&mut state, "Ans * 2"), "10");
        assert_eq!(state.history.len(), 2);
    }

    #[test]
    fn ans_is_word_bounded() {
        let mut state = SessionState::new();
        run(&mut state, "7");
        let html = run(&mut state, "Answer");
        // `Answer` is an undefined symbol, not an Ans reference
        assert_eq!(html, "Answer");
    }

    #[test]
    fn ans_round_trips_fractions_exactly() {
        let mut state = SessionState::new();
        state.numeric_mode = NumericMode::Rational;
        assert_eq!(run(&mut state, "1/3"), "1/3");
        assert_eq!(run(&mut state, "Ans * 3"), "1");
    }

    #[test]
    fn undefined_symbols_fall_back_to_simplification() {
        let mut state = SessionState::new();
        assert_eq!(run(&mut state, "x + x"), "2 * x");
        // Symbolic results do not become Ans
        assert!(state.ans.is_none());
    }

    #[test]
    fn parse_errors_render_as_error_spans() {
        let mut state = SessionState::new();
        let html = run(&mut state, "2 +* 3");
        assert!(html.starts_with("<span class=\"error-msg\"><b>"));
    }

    #[test]
    fn unknown_function_renders_as_error_span() {
        let mut state = SessionState::new();
        let html = run(&mut state, "frobnicate(2)");
        assert!(html.contains("<b>UnknownFunction</b>"));
    }

    #[test]
    fn calculus_timeout_appends_a_warning_span() {
        let mut state = SessionState::new();
        state.max_func_run_time = Duration::ZERO;
        let html = run(&mut state, "summation(\"x\", 1, 100000)");
        assert!(html.contains("warning-msg"));
        assert!(html.contains("Function timed out"));
    }

    #[test]
    fn library_functions_run_through_the_executor() {
        let mut state = SessionState::new();
        assert_eq!(run(&mut state, "derivative(\"x^2\")"), "2 * x");
        let html = run(&mut state, "summary([1, 2, 3])");
        assert!(html.starts_with("<table class=\"record-table\">"));
    }
}
