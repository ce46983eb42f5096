//! Evaluation context. Numeric mode, angle mode, runtime budget,
//! variable scope and the function registry all travel through this
//! object, so every dependency of an evaluation is visible at the
//! call site.

use crate::error::{CalcResult, EngineError};
use crate::value::Value;
use calc_num::{Numeric, NumericMode};
use rustc_hash::FxHashMap;
use std::time::{Duration, Instant};

/// Angle interpretation for trigonometric primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleMode {
    #[default]
    Radians,
    Degrees,
    Gradians,
}

impl AngleMode {
    pub fn label(self) -> &'static str {
        match self {
            AngleMode::Radians => "rad",
            AngleMode::Degrees => "deg",
            AngleMode::Gradians => "grad",
        }
    }

    /// rad -> deg -> grad -> rad
    pub fn cycle(self) -> Self {
        match self {
            AngleMode::Radians => AngleMode::Degrees,
            AngleMode::Degrees => AngleMode::Gradians,
            AngleMode::Gradians => AngleMode::Radians,
        }
    }

    pub fn to_radians(self, x: f64) -> f64 {
        match self {
            AngleMode::Radians => x,
            AngleMode::Degrees => x * std::f64::consts::PI / 180.0,
            AngleMode::Gradians => x * std::f64::consts::PI / 200.0,
        }
    }

    pub fn from_radians(self, x: f64) -> f64 {
        match self {
            AngleMode::Radians => x,
            AngleMode::Degrees => x * 180.0 / std::f64::consts::PI,
            AngleMode::Gradians => x * 200.0 / std::f64::consts::PI,
        }
    }
}

/// Wall-clock budget for iterative calculus loops. Checked once per
/// loop iteration; cancellation is best-effort, a single expensive
/// iteration can overrun before the next check.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    /// Start the clock now with the given budget.
    pub fn start(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget: Some(budget),
        }
    }

    pub fn unlimited() -> Self {
        Self {
            start: Instant::now(),
            budget: None,
        }
    }

    pub fn expired(&self) -> bool {
        match self.budget {
            Some(budget) => self.start.elapsed() > budget,
            None => false,
        }
    }
}

/// Signature of every registered calculator function.
pub type NativeFn = fn(&mut EvalContext, &[Value]) -> CalcResult<Value>;

/// Metadata and entry point for one calculator function. `params` and
/// `help` feed the autocomplete help display.
#[derive(Clone, Copy)]
pub struct FunctionDef {
    pub name: &'static str,
    pub params: &'static str,
    pub help: &'static str,
    pub func: NativeFn,
}

/// Name -> function table. Built once per session; the engine's own
/// math primitives and the calculator library both register here.
#[derive(Default)]
pub struct Registry {
    map: FxHashMap<&'static str, FunctionDef>,
    names: Vec<&'static str>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, def: FunctionDef) {
        if self.map.insert(def.name, def).is_none() {
            self.names.push(def.name);
        }
    }

    /// Register `def` under an alternate name.
    pub fn alias(&mut self, name: &'static str, target: &str) {
        if let Some(def) = self.map.get(target).copied() {
            if self.map.insert(name, def).is_none() {
                self.names.push(name);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.map.get(name)
    }

    /// All registered names, in registration order.
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }
}

/// Everything one evaluation needs, passed explicitly.
pub struct EvalContext<'r> {
    pub mode: NumericMode,
    pub angle: AngleMode,
    /// Per-call runtime budget for the iterative calculus operations.
    pub budget: Duration,
    pub registry: &'r Registry,
    pub scope: FxHashMap<String, Numeric>,
    notices: Vec<String>,
}

impl<'r> EvalContext<'r> {
    pub fn new(mode: NumericMode, angle: AngleMode, budget: Duration, registry: &'r Registry) -> Self {
        Self {
            mode,
            angle,
            budget,
            registry,
            scope: FxHashMap::default(),
            notices: Vec::new(),
        }
    }

    /// Fresh deadline for one calculus call; the clock restarts per call.
    pub fn deadline(&self) -> Deadline {
        Deadline::start(self.budget)
    }

    /// Record a soft-degrade notice (timeout truncation, residual
    /// warnings). Drained by the command executor and rendered inline.
    pub fn push_notice(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::warn!(notice = %msg, "soft degrade");
        self.notices.push(msg);
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// Call a registered function by name.
    pub fn call(&mut self, name: &str, args: &[Value]) -> CalcResult<Value> {
        let def = self
            .registry
            .get(name)
            .copied()
            .ok_or_else(|| EngineError::UnknownFunction(name.to_string()))?;
        (def.func)(self, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_mode_cycles() {
        let mut m = AngleMode::Radians;
        m = m.cycle();
        assert_eq!(m, AngleMode::Degrees);
        m = m.cycle();
        assert_eq!(m, AngleMode::Gradians);
        m = m.cycle();
        assert_eq!(m, AngleMode::Radians);
    }

    #[test]
    fn angle_conversions() {
        assert!((AngleMode::Degrees.to_radians(180.0) - std::f64::consts::PI).abs() < 1e-12);
        assert!((AngleMode::Gradians.to_radians(200.0) - std::f64::consts::PI).abs() < 1e-12);
        assert!((AngleMode::Degrees.from_radians(std::f64::consts::PI) - 180.0).abs() < 1e-12);
    }

    #[test]
    fn deadline_expiry() {
        let d = Deadline::start(Duration::from_secs(1000));
        assert!(!d.expired());
        let d = Deadline::start(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        assert!(d.expired());
        assert!(!Deadline::unlimited().expired());
    }

    #[test]
    fn registry_aliases_resolve() {
        fn noop(_: &mut EvalContext, _: &[Value]) -> CalcResult<Value> {
            Ok(Value::Number(Numeric::int(0)))
        }
        let mut reg = Registry::new();
        reg.register(FunctionDef {
            name: "factorization",
            params: "n",
            help: "",
            func: noop,
        });
        reg.alias("primeFactors", "factorization");
        assert!(reg.get("primeFactors").is_some());
        assert_eq!(reg.names().len(), 2);
    }
}
