//! Core math primitives registered on every session's function table.
//!
//! Trigonometric entries respect the context's angle mode and snap
//! outputs below 1e-15 in magnitude to exactly 0, so `sin(pi)` prints
//! as 0 rather than float residue.

use crate::context::{EvalContext, FunctionDef, Registry};
use crate::error::{CalcResult, EngineError};
use crate::eval::factorial_value;
use crate::value::Value;
use calc_num::numeric::factorial_big;
use calc_num::Numeric;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;

const SNAP_EPSILON: f64 = 1e-15;

fn snap(x: f64) -> f64 {
    if x.abs() < SNAP_EPSILON {
        0.0
    } else {
        x
    }
}

fn expect_args(name: &str, args: &[Value], n: usize) -> CalcResult<()> {
    if args.len() == n {
        Ok(())
    } else {
        Err(EngineError::InvalidArgument(format!(
            "{} expects {} argument(s), got {}",
            name,
            n,
            args.len()
        )))
    }
}

fn num_arg(name: &str, args: &[Value], i: usize) -> CalcResult<Numeric> {
    match args.get(i) {
        Some(Value::Number(n)) => Ok(n.clone()),
        Some(other) => Err(EngineError::InvalidArgument(format!(
            "{}: argument {} must be a number, got {}",
            name,
            i + 1,
            other
        ))),
        None => Err(EngineError::InvalidArgument(format!(
            "{}: missing argument {}",
            name,
            i + 1
        ))),
    }
}

fn int_arg(name: &str, args: &[Value], i: usize) -> CalcResult<i64> {
    num_arg(name, args, i)?.as_i64().ok_or_else(|| {
        EngineError::InvalidArgument(format!("{}: argument {} must be an integer", name, i + 1))
    })
}

// Forward trig: interpret the argument in the session's angle mode.
fn trig(ctx: &mut EvalContext, args: &[Value], name: &str, op: fn(f64) -> f64) -> CalcResult<Value> {
    expect_args(name, args, 1)?;
    let x = num_arg(name, args, 0)?;
    let angle = ctx.angle;
    Ok(Value::Number(x.map_f64(|v| snap(op(angle.to_radians(v))))))
}

// Inverse trig: convert the radian result back to the session's mode.
fn inv_trig(
    ctx: &mut EvalContext,
    args: &[Value],
    name: &str,
    op: fn(f64) -> f64,
) -> CalcResult<Value> {
    expect_args(name, args, 1)?;
    let x = num_arg(name, args, 0)?;
    let angle = ctx.angle;
    Ok(Value::Number(x.map_f64(|v| snap(angle.from_radians(op(v))))))
}

macro_rules! trig_fn {
    ($fname:ident, $name:literal, $op:expr) => {
        fn $fname(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
            trig(ctx, args, $name, $op)
        }
    };
}

macro_rules! inv_trig_fn {
    ($fname:ident, $name:literal, $op:expr) => {
        fn $fname(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
            inv_trig(ctx, args, $name, $op)
        }
    };
}

macro_rules! float_fn {
    ($fname:ident, $name:literal, $op:expr) => {
        fn $fname(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
            expect_args($name, args, 1)?;
            let x = num_arg($name, args, 0)?;
            let op: fn(f64) -> f64 = $op;
            Ok(Value::Number(x.map_f64(op)))
        }
    };
}

trig_fn!(b_sin, "sin", f64::sin);
trig_fn!(b_cos, "cos", f64::cos);
trig_fn!(b_tan, "tan", f64::tan);
inv_trig_fn!(b_asin, "asin", f64::asin);
inv_trig_fn!(b_acos, "acos", f64::acos);
inv_trig_fn!(b_atan, "atan", f64::atan);

float_fn!(b_sinh, "sinh", f64::sinh);
float_fn!(b_cosh, "cosh", f64::cosh);
float_fn!(b_tanh, "tanh", f64::tanh);
float_fn!(b_asinh, "asinh", f64::asinh);
float_fn!(b_acosh, "acosh", f64::acosh);
float_fn!(b_atanh, "atanh", f64::atanh);
float_fn!(b_ln, "ln", f64::ln);
float_fn!(b_log2, "log2", f64::log2);
float_fn!(b_log10, "log10", f64::log10);
float_fn!(b_sqrt, "sqrt", f64::sqrt);
float_fn!(b_cbrt, "cbrt", f64::cbrt);
float_fn!(b_exp, "exp", f64::exp);

fn b_atan2(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    expect_args("atan2", args, 2)?;
    let y = num_arg("atan2", args, 0)?;
    let x = num_arg("atan2", args, 1)?;
    let angle = ctx.angle;
    let out = snap(angle.from_radians(y.to_f64().atan2(x.to_f64())));
    Ok(Value::Number(y.map_f64(|_| out)))
}

fn b_log(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    if args.len() == 2 {
        let x = num_arg("log", args, 0)?;
        let base = num_arg("log", args, 1)?.to_f64();
        return Ok(Value::Number(x.map_f64(|v| v.log(base))));
    }
    expect_args("log", args, 1)?;
    let x = num_arg("log", args, 0)?;
    Ok(Value::Number(x.map_f64(f64::ln)))
}

fn b_abs(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    expect_args("abs", args, 1)?;
    Ok(Value::Number(num_arg("abs", args, 0)?.abs()))
}

fn b_sign(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    expect_args("sign", args, 1)?;
    let x = num_arg("sign", args, 0)?;
    let s = if x.is_zero() {
        0
    } else if x.is_negative() {
        -1
    } else {
        1
    };
    Ok(Value::Number(Numeric::int(s)))
}

fn exact_unary(
    name: &str,
    args: &[Value],
    fe: fn(&BigRational) -> BigRational,
    ff: fn(f64) -> f64,
) -> CalcResult<Value> {
    expect_args(name, args, 1)?;
    match num_arg(name, args, 0)? {
        Numeric::Exact(r) => Ok(Value::Number(Numeric::Exact(fe(&r)))),
        Numeric::Float(f) => Ok(Value::Number(Numeric::Float(ff(f)))),
    }
}

fn b_floor(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    exact_unary("floor", args, BigRational::floor, f64::floor)
}

fn b_ceil(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    exact_unary("ceil", args, BigRational::ceil, f64::ceil)
}

fn b_round(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    if args.len() == 2 {
        let x = num_arg("round", args, 0)?;
        let digits = int_arg("round", args, 1)?;
        if !(0..=15).contains(&digits) {
            return Err(EngineError::InvalidArgument(
                "round: digits must be between 0 and 15".to_string(),
            ));
        }
        let scale = 10f64.powi(digits as i32);
        return Ok(Value::Number(x.map_f64(|v| (v * scale).round() / scale)));
    }
    exact_unary("round", args, BigRational::round, f64::round)
}

fn fold_extremum(name: &str, args: &[Value], want_max: bool) -> CalcResult<Value> {
    if args.is_empty() {
        return Err(EngineError::InvalidArgument(format!(
            "{} expects at least 1 argument",
            name
        )));
    }
    let mut best = num_arg(name, args, 0)?;
    for i in 1..args.len() {
        let next = num_arg(name, args, i)?;
        let replace = match next.compare(&best) {
            Some(std::cmp::Ordering::Greater) => want_max,
            Some(std::cmp::Ordering::Less) => !want_max,
            _ => false,
        };
        if replace {
            best = next;
        }
    }
    Ok(Value::Number(best))
}

fn b_min(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    fold_extremum("min", args, false)
}

fn b_max(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    fold_extremum("max", args, true)
}

fn fold_gcd(name: &str, args: &[Value], lcm: bool) -> CalcResult<Value> {
    if args.len() < 2 {
        return Err(EngineError::InvalidArgument(format!(
            "{} expects at least 2 arguments",
            name
        )));
    }
    let mut acc = BigInt::from(int_arg(name, args, 0)?);
    for i in 1..args.len() {
        let next = BigInt::from(int_arg(name, args, i)?);
        acc = if lcm { acc.lcm(&next) } else { acc.gcd(&next) };
    }
    Ok(Value::Number(Numeric::Exact(BigRational::from_integer(acc))))
}

fn b_gcd(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    fold_gcd("gcd", args, false)
}

fn b_lcm(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    fold_gcd("lcm", args, true)
}

fn b_mod(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    expect_args("mod", args, 2)?;
    let a = num_arg("mod", args, 0)?;
    let b = num_arg("mod", args, 1)?;
    Ok(Value::Number(a.rem(&b)))
}

fn b_factorial(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    expect_args("factorial", args, 1)?;
    let n = num_arg("factorial", args, 0)?;
    factorial_value(ctx, &n)
}

fn combinatoric(name: &str, args: &[Value], choose: bool) -> CalcResult<Value> {
    expect_args(name, args, 2)?;
    let n = int_arg(name, args, 0)?;
    let r = int_arg(name, args, 1)?;
    if n < 0 || r < 0 || r > n {
        return Err(EngineError::InvalidArgument(format!(
            "{} requires integers with 0 <= r <= n",
            name
        )));
    }
    let mut out = factorial_big(n as u64) / factorial_big((n - r) as u64);
    if choose {
        out /= factorial_big(r as u64);
    }
    Ok(Value::Number(Numeric::Exact(BigRational::from_integer(out))))
}

fn b_ncr(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    combinatoric("nCr", args, true)
}

fn b_npr(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    combinatoric("nPr", args, false)
}

/// Register all math primitives on `reg`.
pub fn register(reg: &mut Registry) {
    let defs: &[FunctionDef] = &[
        FunctionDef { name: "sin", params: "angle", help: "Sine, in the current angle mode", func: b_sin },
        FunctionDef { name: "cos", params: "angle", help: "Cosine, in the current angle mode", func: b_cos },
        FunctionDef { name: "tan", params: "angle", help: "Tangent, in the current angle mode", func: b_tan },
        FunctionDef { name: "asin", params: "x", help: "Inverse sine, result in the current angle mode", func: b_asin },
        FunctionDef { name: "acos", params: "x", help: "Inverse cosine, result in the current angle mode", func: b_acos },
        FunctionDef { name: "atan", params: "x", help: "Inverse tangent, result in the current angle mode", func: b_atan },
        FunctionDef { name: "atan2", params: "y, x", help: "Two-argument inverse tangent", func: b_atan2 },
        FunctionDef { name: "sinh", params: "x", help: "Hyperbolic sine", func: b_sinh },
        FunctionDef { name: "cosh", params: "x", help: "Hyperbolic cosine", func: b_cosh },
        FunctionDef { name: "tanh", params: "x", help: "Hyperbolic tangent", func: b_tanh },
        FunctionDef { name: "asinh", params: "x", help: "Inverse hyperbolic sine", func: b_asinh },
        FunctionDef { name: "acosh", params: "x", help: "Inverse hyperbolic cosine", func: b_acosh },
        FunctionDef { name: "atanh", params: "x", help: "Inverse hyperbolic tangent", func: b_atanh },
        FunctionDef { name: "ln", params: "x", help: "Natural logarithm", func: b_ln },
        FunctionDef { name: "log", params: "x, base = e", help: "Logarithm, natural by default", func: b_log },
        FunctionDef { name: "log2", params: "x", help: "Base-2 logarithm", func: b_log2 },
        FunctionDef { name: "log10", params: "x", help: "Base-10 logarithm", func: b_log10 },
        FunctionDef { name: "sqrt", params: "x", help: "Square root", func: b_sqrt },
        FunctionDef { name: "cbrt", params: "x", help: "Cube root", func: b_cbrt },
        FunctionDef { name: "exp", params: "x", help: "e raised to x", func: b_exp },
        FunctionDef { name: "abs", params: "x", help: "Absolute value", func: b_abs },
        FunctionDef { name: "sign", params: "x", help: "Sign of x: -1, 0 or 1", func: b_sign },
        FunctionDef { name: "floor", params: "x", help: "Round down to an integer", func: b_floor },
        FunctionDef { name: "ceil", params: "x", help: "Round up to an integer", func: b_ceil },
        FunctionDef { name: "round", params: "x, digits = 0", help: "Round to the nearest value", func: b_round },
        FunctionDef { name: "min", params: "a, b, ...", help: "Smallest of the arguments", func: b_min },
        FunctionDef { name: "max", params: "a, b, ...", help: "Largest of the arguments", func: b_max },
        FunctionDef { name: "gcd", params: "a, b, ...", help: "Greatest common divisor", func: b_gcd },
        FunctionDef { name: "lcm", params: "a, b, ...", help: "Least common multiple", func: b_lcm },
        FunctionDef { name: "mod", params: "a, b", help: "Euclidean remainder of a / b", func: b_mod },
        FunctionDef { name: "factorial", params: "n", help: "Factorial, exact for integers", func: b_factorial },
        FunctionDef { name: "nCr", params: "n, r", help: "Combinations of n items taken r at a time", func: b_ncr },
        FunctionDef { name: "nPr", params: "n, r", help: "Permutations of n items taken r at a time", func: b_npr },
    ];
    for def in defs {
        reg.register(*def);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AngleMode;
    use calc_num::NumericMode;
    use std::time::Duration;

    fn ctx_with(reg: &Registry) -> EvalContext<'_> {
        EvalContext::new(
            NumericMode::Float,
            AngleMode::Radians,
            Duration::from_secs(1),
            reg,
        )
    }

    fn n(v: f64) -> Value {
        Value::Number(Numeric::Float(v))
    }

    #[test]
    fn gcd_lcm_are_exact_integers() {
        let mut reg = Registry::new();
        register(&mut reg);
        let mut ctx = ctx_with(&reg);
        let g = ctx.call("gcd", &[n(12.0), n(18.0)]).unwrap();
        assert_eq!(g.to_string(), "6");
        let l = ctx.call("lcm", &[n(4.0), n(6.0)]).unwrap();
        assert_eq!(l.to_string(), "12");
    }

    #[test]
    fn combinatorics() {
        let mut reg = Registry::new();
        register(&mut reg);
        let mut ctx = ctx_with(&reg);
        assert_eq!(ctx.call("nCr", &[n(5.0), n(2.0)]).unwrap().to_string(), "10");
        assert_eq!(ctx.call("nPr", &[n(5.0), n(2.0)]).unwrap().to_string(), "20");
        assert!(ctx.call("nCr", &[n(2.0), n(5.0)]).is_err());
    }

    #[test]
    fn round_with_digits() {
        let mut reg = Registry::new();
        register(&mut reg);
        let mut ctx = ctx_with(&reg);
        let v = ctx.call("round", &[n(3.14159), n(2.0)]).unwrap();
        assert_eq!(v.as_number().unwrap().to_f64(), 3.14);
    }

    #[test]
    fn min_max_varargs() {
        let mut reg = Registry::new();
        register(&mut reg);
        let mut ctx = ctx_with(&reg);
        let v = ctx.call("max", &[n(1.0), n(9.0), n(4.0)]).unwrap();
        assert_eq!(v.as_number().unwrap().to_f64(), 9.0);
        let v = ctx.call("min", &[n(1.0), n(9.0), n(4.0)]).unwrap();
        assert_eq!(v.as_number().unwrap().to_f64(), 1.0);
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let mut reg = Registry::new();
        register(&mut reg);
        let mut ctx = ctx_with(&reg);
        assert!(ctx.call("sin", &[]).is_err());
        assert!(ctx.call("sin", &[n(1.0), n(2.0)]).is_err());
    }
}
