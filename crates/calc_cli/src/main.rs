//! `scicalc` terminal front end: flags, config file, rustyline editor
//! and a tag stripper that turns the session HTML into plain text.

mod config;

use anyhow::Result;
use calc_engine::AngleMode;
use calc_num::NumericMode;
use calc_session::{execute, SessionState};
use clap::Parser;
use config::CliConfig;
use regex::Regex;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Context, Editor, Helper};
use std::sync::LazyLock;
use tracing_subscriber::EnvFilter;

const HISTORY_FILE: &str = ".scicalc_history";

#[derive(Parser, Debug)]
#[command(name = "scicalc", about = "Scientific calculator with an exact numeric core")]
struct Args {
    /// Significant digits for big mode output
    #[arg(long)]
    precision: Option<u32>,

    /// Numeric mode: float, big or rational
    #[arg(long, value_name = "MODE")]
    numeric_mode: Option<String>,

    /// Angle mode: rad, deg or grad
    #[arg(long, value_name = "ANGLE")]
    angle: Option<String>,

    /// Wall-clock budget in milliseconds for iterative functions
    #[arg(long)]
    budget_ms: Option<u64>,

    /// Disable tab completion
    #[arg(long)]
    no_autocomplete: bool,

    /// Evaluate one expression and exit
    #[arg(short = 'e', long = "eval", value_name = "EXPR")]
    eval: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut cfg = CliConfig::load();
    if let Some(p) = args.precision {
        cfg.precision = p;
    }
    if let Some(m) = &args.numeric_mode {
        cfg.numeric_mode = m.clone();
    }
    if let Some(a) = &args.angle {
        cfg.angle = a.clone();
    }
    if let Some(b) = args.budget_ms {
        cfg.budget_ms = b;
    }
    if args.no_autocomplete {
        cfg.autocomplete = false;
    }

    let mut state = SessionState::new();
    apply_config(&mut state, &cfg);

    if let Some(expr) = &args.eval {
        let text = strip_html(&execute(&mut state, expr));
        if !text.is_empty() {
            println!("{}", text);
        }
        return Ok(());
    }

    run_repl(&mut state, &mut cfg)
}

fn apply_config(state: &mut SessionState, cfg: &CliConfig) {
    if let Some(mode) = parse_numeric_mode(&cfg.numeric_mode, cfg.precision) {
        state.numeric_mode = mode;
    } else {
        println!("Unknown numeric mode '{}', staying in float", cfg.numeric_mode);
    }
    if let Some(angle) = parse_angle(&cfg.angle) {
        state.angle_mode = angle;
    } else {
        println!("Unknown angle mode '{}', staying in rad", cfg.angle);
    }
    state.max_func_run_time = std::time::Duration::from_millis(cfg.budget_ms);
    state.enable_autocomplete = cfg.autocomplete;
}

fn parse_numeric_mode(name: &str, precision: u32) -> Option<NumericMode> {
    match name {
        "float" => Some(NumericMode::Float),
        "big" => Some(NumericMode::Big { precision }),
        "rational" | "frac" => Some(NumericMode::Rational),
        _ => None,
    }
}

fn parse_angle(name: &str) -> Option<AngleMode> {
    match name {
        "rad" | "radians" => Some(AngleMode::Radians),
        "deg" | "degrees" => Some(AngleMode::Degrees),
        "grad" | "gradians" => Some(AngleMode::Gradians),
        _ => None,
    }
}

struct CalcHelper {
    names: Vec<&'static str>,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

impl Completer for CalcHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let head = &line[..pos.min(line.len())];
        let start = head
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_ident_char(*c))
            .last()
            .map(|(i, _)| i)
            .unwrap_or(head.len());
        let word = &head[start..];
        if word.len() < 2 || word.chars().all(|c| c.is_ascii_digit()) {
            return Ok((pos, Vec::new()));
        }
        let lower = word.to_ascii_lowercase();
        let mut matches: Vec<Pair> = self
            .names
            .iter()
            .filter(|n| n.to_ascii_lowercase().starts_with(&lower))
            .map(|n| Pair {
                display: n.to_string(),
                replacement: format!("{}(", n),
            })
            .collect();
        matches.sort_by(|a, b| a.display.cmp(&b.display));
        Ok((start, matches))
    }
}

impl Hinter for CalcHelper {
    type Hint = String;
}

impl Highlighter for CalcHelper {}
impl Validator for CalcHelper {}
impl Helper for CalcHelper {}

fn build_prompt(state: &SessionState) -> String {
    let mut tags: Vec<String> = Vec::new();
    match state.numeric_mode {
        NumericMode::Float => {}
        NumericMode::Big { precision } => tags.push(format!("big:{}", precision)),
        NumericMode::Rational => tags.push("frac".to_string()),
    }
    if state.angle_mode != AngleMode::Radians {
        tags.push(state.angle_mode.label().to_string());
    }
    if tags.is_empty() {
        "> ".to_string()
    } else {
        format!("[{}] > ", tags.join(" "))
    }
}

fn run_repl(state: &mut SessionState, cfg: &mut CliConfig) -> Result<()> {
    let rl_config = rustyline::Config::builder()
        .max_history_size(100)?
        .completion_type(CompletionType::List)
        .build();
    let mut rl = Editor::<CalcHelper, DefaultHistory>::with_config(rl_config)?;
    if state.enable_autocomplete {
        rl.set_helper(Some(CalcHelper {
            names: state.registry().names().to_vec(),
        }));
    }
    let _ = rl.load_history(HISTORY_FILE);

    println!("scicalc {} (:help for commands, :quit to leave)", env!("CARGO_PKG_VERSION"));
    loop {
        match rl.readline(&build_prompt(state)) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);
                if trimmed == "quit" || trimmed == "exit" {
                    break;
                }
                if let Some(command) = trimmed.strip_prefix(':') {
                    if handle_command(state, cfg, command) {
                        break;
                    }
                    continue;
                }
                let text = strip_html(&execute(state, trimmed));
                if !text.is_empty() {
                    println!("{}", text);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    let _ = rl.save_history(HISTORY_FILE);
    Ok(())
}

/// Handle a `:command`, returning true when the loop should exit.
fn handle_command(state: &mut SessionState, cfg: &mut CliConfig, command: &str) -> bool {
    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("quit") | Some("q") => return true,
        Some("help") => print_help(),
        Some("mode") => match parts.next() {
            None => println!("numeric mode: {}", cfg.numeric_mode),
            Some(name) => match parse_numeric_mode(name, cfg.precision) {
                Some(mode) => {
                    state.numeric_mode = mode;
                    cfg.numeric_mode = name.to_string();
                }
                None => println!("Numeric mode must be 'float', 'big' or 'rational'"),
            },
        },
        Some("angle") => match parts.next() {
            None => {
                // Bare :angle cycles, like a mode key on a handheld
                state.angle_mode = state.angle_mode.cycle();
                cfg.angle = state.angle_mode.label().to_string();
                println!("angle mode: {}", state.angle_mode.label());
            }
            Some(name) => match parse_angle(name) {
                Some(angle) => {
                    state.angle_mode = angle;
                    cfg.angle = angle.label().to_string();
                }
                None => println!("Angle mode must be 'rad', 'deg' or 'grad'"),
            },
        },
        Some("precision") => match parts.next().and_then(|p| p.parse::<u32>().ok()) {
            Some(p) if p > 0 => {
                cfg.precision = p;
                if let NumericMode::Big { .. } = state.numeric_mode {
                    state.numeric_mode = NumericMode::Big { precision: p };
                }
            }
            _ => println!("Usage: :precision <digits>"),
        },
        Some("budget") => match parts.next().and_then(|b| b.parse::<u64>().ok()) {
            Some(ms) => {
                cfg.budget_ms = ms;
                state.max_func_run_time = std::time::Duration::from_millis(ms);
            }
            None => println!("Usage: :budget <milliseconds>"),
        },
        Some("config") => match parts.next() {
            Some("save") => match cfg.save() {
                Ok(()) => println!("Configuration saved"),
                Err(e) => println!("Could not save configuration: {}", e),
            },
            Some("restore") => {
                *cfg = CliConfig::restore();
                apply_config(state, cfg);
                println!("Configuration restored to defaults");
            }
            _ => println!("Usage: :config save | :config restore"),
        },
        _ => println!("Unknown command ':{}', try :help", command),
    }
    false
}

fn print_help() {
    println!("Commands:");
    println!("  :mode [float|big|rational]   show or set the numeric mode");
    println!("  :angle [rad|deg|grad]        set the angle mode (bare :angle cycles)");
    println!("  :precision <digits>          significant digits for big mode");
    println!("  :budget <milliseconds>       runtime budget for iterative functions");
    println!("  :config save|restore         persist or reset settings");
    println!("  :quit                        leave the calculator");
    println!("Call any function with no arguments listed, e.g. derivative(), to see its help.");
}

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex literal"));

/// Reduce the session HTML to terminal text: table rows become lines,
/// warnings get their own prefixed line, tags and entities go away.
fn strip_html(html: &str) -> String {
    let text = html
        .replace("</tr>", "\n")
        .replace("</td><td>", "  ")
        .replace("<span class=\"warning-msg\">", "\nwarning: ");
    let text = TAG_RE.replace_all(&text, "");
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_value_and_error_spans() {
        assert_eq!(strip_html("5"), "5");
        assert_eq!(
            strip_html("<span class=\"error-msg\"><b>ParseError</b> bad token</span>"),
            "ParseError bad token"
        );
    }

    #[test]
    fn warnings_land_on_their_own_line() {
        let html = "41<span class=\"warning-msg\">Function timed out</span>";
        assert_eq!(strip_html(html), "41\nwarning: Function timed out");
    }

    #[test]
    fn tables_become_rows() {
        let html = "<table class=\"record-table\"><tr><td>mean</td><td>2.5</td></tr></table>";
        assert_eq!(strip_html(html), "mean  2.5");
    }

    #[test]
    fn entities_unescape_after_tag_removal() {
        assert_eq!(strip_html("1 &lt; 2 &amp; 3 &gt; 2"), "1 < 2 & 3 > 2");
    }

    #[test]
    fn mode_parsers_accept_labels_and_reject_noise() {
        assert_eq!(parse_angle("deg"), Some(AngleMode::Degrees));
        assert_eq!(parse_angle("turns"), None);
        assert!(matches!(
            parse_numeric_mode("big", 12),
            Some(NumericMode::Big { precision: 12 })
        ));
        assert!(parse_numeric_mode("decimal", 10).is_none());
    }
}
