//! Per-session calculator state: modes, history, the last answer and
//! the function registry.

use calc_engine::{builtins, AngleMode, EvalContext, Registry, Value};
use calc_num::NumericMode;
use std::collections::VecDeque;
use std::time::Duration;

pub const HISTORY_CAP: usize = 1000;
pub const DEFAULT_BUDGET: Duration = Duration::from_millis(1000);

pub struct SessionState {
    pub numeric_mode: NumericMode,
    pub angle_mode: AngleMode,
    pub enable_autocomplete: bool,
    /// Wall-clock budget for one iterative calculus call.
    pub max_func_run_time: Duration,
    pub history: VecDeque<String>,
    /// Plain serialization and value of the last numeric-like result,
    /// substituted for `Ans` in later inputs.
    pub ans: Option<(String, Value)>,
    registry: Registry,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        let mut registry = Registry::new();
        builtins::register(&mut registry);
        calc_funcs::register_all(&mut registry);
        Self {
            numeric_mode: NumericMode::Float,
            angle_mode: AngleMode::Radians,
            enable_autocomplete: true,
            max_func_run_time: DEFAULT_BUDGET,
            history: VecDeque::new(),
            ans: None,
            registry,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Fresh evaluation context carrying the session modes.
    pub fn context(&self) -> EvalContext<'_> {
        EvalContext::new(
            self.numeric_mode,
            self.angle_mode,
            self.max_func_run_time,
            &self.registry,
        )
    }

    /// Record an input line, evicting the oldest entry at the cap.
    pub fn push_history(&mut self, line: &str) {
        if self.history.len() == HISTORY_CAP {
            self.history.pop_front();
        }
        self.history.push_back(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_carries_engine_and_library_functions() {
        let state = SessionState::new();
        assert!(state.registry().get("sin").is_some());
        assert!(state.registry().get("derivative").is_some());
        assert!(state.registry().get("normalcdf").is_some());
    }

    #[test]
    fn history_evicts_at_cap() {
        let mut state = SessionState::new();
        for i in 0..(HISTORY_CAP + 5) {
            state.push_history(&format!("line {}", i));
        }
        assert_eq!(state.history.len(), HISTORY_CAP);
        assert_eq!(state.history.front().map(String::as_str), Some("line 5"));
    }
}
