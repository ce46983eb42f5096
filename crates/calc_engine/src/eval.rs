//! Tree-walking evaluator. All arithmetic goes through [`Numeric`] so
//! the session's numeric mode decides the representation in one place.

use crate::context::EvalContext;
use crate::error::{CalcResult, EngineError};
use crate::value::Value;
use calc_ast::{Constant, Expr};
use calc_num::numeric::factorial_big;
use calc_num::Numeric;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Pow;

// 50-digit expansions, enough for any practical display precision.
const PI_DIGITS: &str = "314159265358979323846264338327950288419716939937510";
const E_DIGITS: &str = "271828182845904523536028747135266249775724709369995";

fn constant_rational(digits: &str) -> BigRational {
    let numer: BigInt = digits.parse().expect("constant digits parse");
    let denom = Pow::pow(&BigInt::from(10), digits.len() - 1);
    BigRational::new(numer, denom)
}

/// Constant value under the context's numeric mode.
pub fn constant_value(ctx: &EvalContext, c: Constant) -> Numeric {
    if ctx.mode.is_exact() {
        let r = match c {
            Constant::Pi => constant_rational(PI_DIGITS),
            Constant::E => constant_rational(E_DIGITS),
            Constant::Tau => constant_rational(PI_DIGITS) * BigRational::from_integer(2.into()),
        };
        Numeric::Exact(r)
    } else {
        Numeric::Float(match c {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
            Constant::Tau => std::f64::consts::TAU,
        })
    }
}

/// Evaluate an expression to a tagged value.
pub fn eval(ctx: &mut EvalContext, expr: &Expr) -> CalcResult<Value> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(ctx.mode.from_rational(n.clone()))),
        Expr::Constant(c) => Ok(Value::Number(constant_value(ctx, *c))),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Variable(name) => {
            if let Some(v) = ctx.scope.get(name) {
                return Ok(Value::Number(v.clone()));
            }
            if let Some(def) = ctx.registry.get(name) {
                return Ok(Value::Function(def.name));
            }
            Err(EngineError::UndefinedSymbol(name.clone()))
        }
        Expr::Add(l, r) => binary(ctx, l, r, |a, b| a.add(b)),
        Expr::Sub(l, r) => binary(ctx, l, r, |a, b| a.sub(b)),
        Expr::Mul(l, r) => binary(ctx, l, r, |a, b| a.mul(b)),
        Expr::Div(l, r) => binary(ctx, l, r, |a, b| a.div(b)),
        Expr::Pow(l, r) => binary(ctx, l, r, |a, b| a.pow(b)),
        Expr::Neg(e) => Ok(Value::Number(eval_numeric(ctx, e)?.neg())),
        Expr::Factorial(e) => {
            let n = eval_numeric(ctx, e)?;
            factorial_value(ctx, &n)
        }
        Expr::Function(name, args) => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval(ctx, arg)?);
            }
            ctx.call(name, &values)
        }
        Expr::Matrix(rows) => {
            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                let mut cells = Vec::with_capacity(row.len());
                for cell in row {
                    cells.push(eval_numeric(ctx, cell)?);
                }
                out.push(cells);
            }
            Ok(Value::Matrix(out))
        }
    }
}

fn binary(
    ctx: &mut EvalContext,
    l: &Expr,
    r: &Expr,
    op: impl Fn(&Numeric, &Numeric) -> Numeric,
) -> CalcResult<Value> {
    let a = eval_numeric(ctx, l)?;
    let b = eval_numeric(ctx, r)?;
    Ok(Value::Number(op(&a, &b)))
}

/// Evaluate and require a scalar number.
pub fn eval_numeric(ctx: &mut EvalContext, expr: &Expr) -> CalcResult<Numeric> {
    match eval(ctx, expr)? {
        Value::Number(n) => Ok(n),
        other => Err(EngineError::InvalidArgument(format!(
            "Expected a number, got {}",
            other
        ))),
    }
}

pub(crate) fn factorial_value(ctx: &mut EvalContext, n: &Numeric) -> CalcResult<Value> {
    if let Some(k) = n.as_i64() {
        if k < 0 {
            return Err(EngineError::InvalidArgument(
                "Factorial requires a nonnegative integer".to_string(),
            ));
        }
        let exact = BigRational::from_integer(factorial_big(k as u64));
        return Ok(Value::Number(ctx.mode.from_rational(exact)));
    }
    // Non-integer factorials defer to gamma(x + 1) when registered
    let shifted = n.add(&Numeric::int(1));
    ctx.call("gamma", &[Value::Number(shifted)])
}
