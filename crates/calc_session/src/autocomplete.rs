//! Autocomplete controller: suggestion ranking, tab cycling and the
//! argument-help fallback.
//!
//! The controller owns no text buffer. The host hands in the current
//! line and cursor on every input event; tab and escape come back as
//! `Edit` instructions the host applies to its own buffer.

use calc_engine::Registry;

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// What the UI should show for the current input state.
#[derive(Debug, PartialEq)]
pub enum Feedback {
    Suggestions(Vec<&'static str>),
    /// Signature help for the function call enclosing the cursor.
    Help {
        name: &'static str,
        params: &'static str,
        help: &'static str,
    },
    None,
}

/// A text edit the host applies to its input buffer: delete the byte
/// range, insert the text at its start, place the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub remove_start: usize,
    pub remove_end: usize,
    pub insert: String,
    pub cursor: usize,
}

#[derive(Default)]
pub struct Autocomplete {
    candidates: Vec<&'static str>,
    /// Next candidate to insert; post-incremented by tab.
    index: usize,
    /// Byte offset where the fragment starts.
    anchor: usize,
    fragment: String,
    /// Length of the text currently occupying the anchor (the fragment
    /// before the first tab, the last insertion afterwards).
    current_len: usize,
}

impl Autocomplete {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
        self.index = 0;
        self.fragment.clear();
        self.current_len = 0;
    }

    /// Re-derive suggestions from the line and cursor. Called at the
    /// start of every input event; any pending cycle state is dropped.
    pub fn refresh(
        &mut self,
        reg: &Registry,
        enabled: bool,
        line: &str,
        cursor: usize,
    ) -> Feedback {
        self.clear();
        if !enabled {
            return Feedback::None;
        }
        let head = &line[..cursor.min(line.len())];
        let start = head
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_ident_char(*c))
            .last()
            .map(|(i, _)| i)
            .unwrap_or(head.len());
        let fragment = &head[start..];

        if fragment.len() < 2 || fragment.chars().all(|c| c.is_ascii_digit()) {
            return match enclosing_call(reg, &head[..start]) {
                Some(def) => Feedback::Help {
                    name: def.0,
                    params: def.1,
                    help: def.2,
                },
                None => Feedback::None,
            };
        }

        let lower = fragment.to_ascii_lowercase();
        let mut prefix: Vec<&'static str> = Vec::new();
        let mut inner: Vec<&'static str> = Vec::new();
        for name in reg.names() {
            let lname = name.to_ascii_lowercase();
            if lname.starts_with(&lower) {
                prefix.push(name);
            } else if lname.contains(&lower) {
                inner.push(name);
            }
        }
        // Longest names first within each tier
        prefix.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        inner.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        prefix.extend(inner);

        if prefix.is_empty() {
            return Feedback::None;
        }
        self.candidates = prefix;
        self.anchor = start;
        self.fragment = fragment.to_string();
        self.current_len = fragment.len();
        Feedback::Suggestions(self.candidates.clone())
    }

    /// Cycle to the next (or with shift, previous) candidate.
    pub fn tab(&mut self, shift: bool) -> Option<Edit> {
        if self.candidates.is_empty() {
            return None;
        }
        let len = self.candidates.len();
        if shift {
            // Undo the post-increment, then step back one more
            self.index = (self.index + len - 2) % len;
        }
        let name = self.candidates[self.index % len];
        self.index = (self.index + 1) % len;

        let insert = format!("{}()", name);
        let edit = Edit {
            remove_start: self.anchor,
            remove_end: self.anchor + self.current_len,
            insert,
            // Inside the parens
            cursor: self.anchor + name.len() + 1,
        };
        self.current_len = name.len() + 2;
        Some(edit)
    }

    /// Drop the cycle and restore the typed fragment verbatim.
    pub fn escape(&mut self) -> Option<Edit> {
        if self.candidates.is_empty() || self.current_len == self.fragment.len() {
            self.clear();
            return None;
        }
        let edit = Edit {
            remove_start: self.anchor,
            remove_end: self.anchor + self.current_len,
            insert: self.fragment.clone(),
            cursor: self.anchor + self.fragment.len(),
        };
        self.clear();
        Some(edit)
    }
}

/// Walk backward looking for an unbalanced `(` and the identifier in
/// front of it.
fn enclosing_call(
    reg: &Registry,
    head: &str,
) -> Option<(&'static str, &'static str, &'static str)> {
    let mut depth = 0i32;
    for (i, c) in head.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth < 0 {
                    let name_end = i;
                    let name_start = head[..name_end]
                        .char_indices()
                        .rev()
                        .take_while(|(_, c)| is_ident_char(*c))
                        .last()
                        .map(|(j, _)| j)?;
                    let name = &head[name_start..name_end];
                    let def = reg.get(name)?;
                    return Some((def.name, def.params, def.help));
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_engine::builtins;

    fn reg() -> Registry {
        let mut reg = Registry::new();
        builtins::register(&mut reg);
        calc_funcs::register_all(&mut reg);
        reg
    }

    #[test]
    fn short_or_numeric_fragments_suppress_suggestions() {
        let reg = reg();
        let mut ac = Autocomplete::new();
        assert_eq!(ac.refresh(&reg, true, "s", 1), Feedback::None);
        assert_eq!(ac.refresh(&reg, true, "123", 3), Feedback::None);
        assert!(ac.tab(false).is_none());
    }

    #[test]
    fn disabled_flag_short_circuits() {
        let reg = reg();
        let mut ac = Autocomplete::new();
        assert_eq!(ac.refresh(&reg, false, "deriv", 5), Feedback::None);
    }

    #[test]
    fn prefix_tier_ranks_before_substring_tier() {
        let reg = reg();
        let mut ac = Autocomplete::new();
        match ac.refresh(&reg, true, "in", 2) {
            Feedback::Suggestions(names) => {
                let first_inner = names
                    .iter()
                    .position(|n| !n.to_ascii_lowercase().starts_with("in"))
                    .unwrap_or(names.len());
                // Every prefix match comes before every substring match
                assert!(names[..first_inner]
                    .iter()
                    .all(|n| n.to_ascii_lowercase().starts_with("in")));
                assert!(names.contains(&"invNorm"));
                assert!(names.contains(&"sin"));
                // Tiers are each longest-first
                for pair in names[..first_inner].windows(2) {
                    assert!(pair[0].len() >= pair[1].len());
                }
            }
            other => panic!("expected suggestions, got {:?}", other),
        }
    }

    #[test]
    fn tab_cycles_and_wraps() {
        let reg = reg();
        let mut ac = Autocomplete::new();
        let names = match ac.refresh(&reg, true, "derivat", 7) {
            Feedback::Suggestions(names) => names,
            other => panic!("expected suggestions, got {:?}", other),
        };
        let first = ac.tab(false).unwrap();
        assert_eq!(first.remove_start, 0);
        assert_eq!(first.remove_end, 7);
        assert_eq!(first.insert, format!("{}()", names[0]));
        assert_eq!(first.cursor, names[0].len() + 1);
        // Second tab replaces the previous insertion
        let second = ac.tab(false).unwrap();
        assert_eq!(second.remove_end, names[0].len() + 2);
        assert_eq!(second.insert, format!("{}()", names[1 % names.len()]));
    }

    #[test]
    fn shift_tab_steps_backward() {
        let reg = reg();
        let mut ac = Autocomplete::new();
        let names = match ac.refresh(&reg, true, "in", 2) {
            Feedback::Suggestions(names) => names,
            other => panic!("expected suggestions, got {:?}", other),
        };
        ac.tab(false);
        ac.tab(false);
        // After two forward steps, shift-tab re-inserts the first
        let back = ac.tab(true).unwrap();
        assert_eq!(back.insert, format!("{}()", names[0]));
    }

    #[test]
    fn escape_restores_the_fragment() {
        let reg = reg();
        let mut ac = Autocomplete::new();
        ac.refresh(&reg, true, "summ", 4);
        ac.tab(false).unwrap();
        let edit = ac.escape().unwrap();
        assert_eq!(edit.insert, "summ");
        assert_eq!(edit.remove_start, 0);
        assert_eq!(edit.cursor, 4);
        // A second escape has nothing to undo
        assert!(ac.escape().is_none());
    }

    #[test]
    fn numeric_fragment_inside_call_shows_help() {
        let reg = reg();
        let mut ac = Autocomplete::new();
        let line = "normalcdf(1, 2";
        match ac.refresh(&reg, true, line, line.len()) {
            Feedback::Help { name, params, .. } => {
                assert_eq!(name, "normalcdf");
                assert!(params.contains("low"));
            }
            other => panic!("expected help, got {:?}", other),
        }
    }

    #[test]
    fn balanced_parens_do_not_trigger_help() {
        let reg = reg();
        let mut ac = Autocomplete::new();
        let line = "sin(1) + 2";
        assert_eq!(ac.refresh(&reg, true, line, line.len()), Feedback::None);
    }

    #[test]
    fn anchor_tracks_mid_line_fragments() {
        let reg = reg();
        let mut ac = Autocomplete::new();
        let line = "2 + summ";
        ac.refresh(&reg, true, line, line.len());
        let edit = ac.tab(false).unwrap();
        assert_eq!(edit.remove_start, 4);
        assert_eq!(edit.remove_end, 8);
    }
}
