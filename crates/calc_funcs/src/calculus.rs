//! Calculus operation set.
//!
//! Every operation is stateless apart from the per-call deadline taken
//! from the context budget. A blown deadline is a soft degrade: the
//! partial value is returned and a truncation notice is pushed for the
//! executor to render inline.

use crate::util;
use calc_ast::{self as ast, Expr};
use calc_engine::diff;
use calc_engine::integrate::antiderivative;
use calc_engine::simplify::simplify;
use calc_engine::{CalcResult, EngineError, EvalContext, Value};
use calc_num::{Numeric, NumericMode};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Pow;
use std::rc::Rc;

const INTEGRAL_ERROR: f64 = 1e-8;
const NEWTON_TOLERANCE: f64 = 1e-8;
const NEWTON_ITERATIONS: usize = 20;
const GOLDEN_RATIO: f64 = 0.381_966_011_250_105;

/// Optional evaluation point: absent, scalar, or a variable map.
enum Point {
    None,
    Scalar(Numeric),
    Map(Vec<(String, Numeric)>),
}

impl Point {
    fn is_none(&self) -> bool {
        matches!(self, Point::None)
    }
}

fn point_arg(ctx: &mut EvalContext, name: &str, args: &[Value], i: usize) -> CalcResult<Point> {
    match args.get(i) {
        None => Ok(Point::None),
        Some(Value::Number(n)) => Ok(Point::Scalar(n.clone())),
        Some(Value::Str(s)) => Ok(Point::Map(parse_point_map(ctx, s)?)),
        Some(other) => Err(EngineError::InvalidArgument(format!(
            "{}: point must be a number or a map like \"x: 1, y: 1\", got {}",
            name, other
        ))),
    }
}

/// Parse a point map written as `x: 1, y: 2` (braces optional).
fn parse_point_map(ctx: &mut EvalContext, text: &str) -> CalcResult<Vec<(String, Numeric)>> {
    let trimmed = text.trim().trim_start_matches('{').trim_end_matches('}');
    let mut out = Vec::new();
    for part in trimmed.split(',') {
        if part.trim().is_empty() {
            continue;
        }
        let (name, value) = part
            .split_once(':')
            .or_else(|| part.split_once('='))
            .ok_or(EngineError::MultivariableContextRequired)?;
        let expr = calc_parser::parse(value)?;
        let num = calc_engine::eval_numeric(ctx, &expr)?;
        out.push((name.trim().to_string(), num));
    }
    if out.is_empty() {
        return Err(EngineError::MultivariableContextRequired);
    }
    Ok(out)
}

/// Evaluate `expr` with the given variable bindings layered over an
/// empty scope.
fn eval_with(
    ctx: &mut EvalContext,
    expr: &Rc<Expr>,
    bindings: &[(String, Numeric)],
) -> CalcResult<Numeric> {
    let saved = std::mem::take(&mut ctx.scope);
    for (name, value) in bindings {
        ctx.scope.insert(name.clone(), value.clone());
    }
    let out = calc_engine::eval_numeric(ctx, expr);
    ctx.scope = saved;
    out
}

fn eval_f64(ctx: &mut EvalContext, expr: &Rc<Expr>, var: &str, x: f64) -> CalcResult<f64> {
    let saved = ctx.mode;
    ctx.mode = NumericMode::Float;
    let out = eval_with(ctx, expr, &[(var.to_string(), Numeric::Float(x))]);
    ctx.mode = saved;
    Ok(out?.to_f64())
}

fn exact_eps() -> Numeric {
    Numeric::Exact(BigRational::new(
        BigInt::from(1),
        Pow::pow(&BigInt::from(10), 15u32),
    ))
}

fn expression_arg(name: &str, args: &[Value], missing_msg: &str) -> CalcResult<String> {
    match args.first() {
        Some(Value::Str(s)) if !s.trim().is_empty() => Ok(s.clone()),
        _ => Err(EngineError::InvalidInput(format!("{}: {}", name, missing_msg))),
    }
}

// ---- derivative ----------------------------------------------------------

pub fn derivative(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("derivative", args, 1, 4)?;
    let text = expression_arg("derivative", args, "Expression needs to be given")?;
    let var = util::text_opt("derivative", args, 1, "x")?;
    let point = point_arg(ctx, "derivative", args, 2)?;
    let order = util::int_opt("derivative", args, 3, 1)?;
    if order < 1 {
        return Err(EngineError::InvalidArgument(
            "derivative: order must be at least 1".to_string(),
        ));
    }

    let parsed = calc_parser::parse(&text)?;
    let free = parsed.free_vars();

    let deadline = ctx.deadline();
    let mut expr = parsed.clone();
    let mut reached = 0i64;
    for i in 0..order {
        if deadline.expired() {
            ctx.push_notice(format!(
                "Function timed out, only could compute {} th derivative",
                i
            ));
            break;
        }
        match diff::derivative(&expr, &var) {
            Ok(d) => {
                expr = d;
                reached += 1;
            }
            Err(err) => {
                if reached == 0 {
                    return numeric_derivative(ctx, &parsed, &var, &point, order, err);
                }
                return Err(err);
            }
        }
    }
    let expr = simplify(&expr);

    match point {
        Point::None => Ok(Value::Symbolic(expr)),
        Point::Scalar(x) => {
            if free.len() > 1 {
                return Err(EngineError::MultivariableContextRequired);
            }
            let out = eval_with(ctx, &expr, &[(var, x)])
                .map_err(multivariable_hint)?;
            Ok(Value::Number(out))
        }
        Point::Map(bindings) => {
            let out = eval_with(ctx, &expr, &bindings).map_err(multivariable_hint)?;
            Ok(Value::Number(out))
        }
    }
}

fn multivariable_hint(err: EngineError) -> EngineError {
    match err {
        EngineError::UndefinedSymbol(_) => EngineError::MultivariableContextRequired,
        other => other,
    }
}

/// Central-difference fallback when symbolic differentiation fails,
/// evaluated in exact arithmetic so the tiny step survives.
fn numeric_derivative(
    ctx: &mut EvalContext,
    expr: &Rc<Expr>,
    var: &str,
    point: &Point,
    order: i64,
    symbolic_err: EngineError,
) -> CalcResult<Value> {
    let bindings = match point {
        Point::Scalar(x) => vec![(var.to_string(), x.clone())],
        Point::Map(map) => map.clone(),
        Point::None => return Err(symbolic_err),
    };
    tracing::debug!(expr = %expr, var, "falling back to numeric differentiation");
    if order != 1 {
        return Err(symbolic_err);
    }
    let x0 = bindings
        .iter()
        .find(|(name, _)| name == var)
        .map(|(_, v)| v.clone())
        .ok_or(EngineError::MultivariableContextRequired)?;
    let h = exact_eps();

    let saved = ctx.mode;
    ctx.mode = NumericMode::Rational;
    let result = (|| {
        let mut lo = bindings.clone();
        for (name, value) in &mut lo {
            if name == var {
                *value = x0.sub(&h);
            }
        }
        let f1 = eval_with(ctx, expr, &lo)?;
        let mut hi = bindings.clone();
        for (name, value) in &mut hi {
            if name == var {
                *value = x0.add(&h);
            }
        }
        let f2 = eval_with(ctx, expr, &hi)?;
        Ok(f2.sub(&f1).div(&h.add(&h)))
    })();
    ctx.mode = saved;

    let slope = result.map_err(multivariable_hint)?;
    Ok(Value::Number(match ctx.mode {
        NumericMode::Float => Numeric::Float(slope.to_f64()),
        _ => slope,
    }))
}

// ---- gradient ------------------------------------------------------------

pub fn gradient(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("gradient", args, 1, 3)?;
    let text = expression_arg("gradient", args, "Expression needs to be given")?;
    let point = point_arg(ctx, "gradient", args, 1)?;
    let vars = util::text_opt("gradient", args, 2, "x, y, z")?;
    let vars: Vec<String> = vars.split(',').map(|v| v.trim().to_string()).collect();

    let parsed = calc_parser::parse(&text)?;
    let mut parts = Vec::with_capacity(vars.len());
    for var in &vars {
        parts.push(simplify(&diff::derivative(&parsed, var)?));
    }
    match point {
        Point::None => {
            let rendered: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
            Ok(Value::Str(format!("[{}]", rendered.join(", "))))
        }
        Point::Scalar(x) => {
            if parsed.free_vars().len() > 1 {
                return Err(EngineError::MultivariableContextRequired);
            }
            let mut out = Vec::with_capacity(parts.len());
            for (part, var) in parts.iter().zip(&vars) {
                out.push(
                    eval_with(ctx, part, &[(var.clone(), x.clone())])
                        .map_err(multivariable_hint)?,
                );
            }
            Ok(Value::row(out))
        }
        Point::Map(bindings) => {
            let mut out = Vec::with_capacity(parts.len());
            for part in &parts {
                out.push(eval_with(ctx, part, &bindings).map_err(multivariable_hint)?);
            }
            Ok(Value::row(out))
        }
    }
}

// ---- limit ---------------------------------------------------------------

const LIMIT_EPSILON: f64 = 1e-9;

pub fn limit(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("limit", args, 2, 3)?;
    let text = expression_arg("limit", args, "Function must be supplied")?;
    let point = util::num("limit", args, 1)?;
    let dir = util::text_opt("limit", args, 2, "middle")?;
    if !matches!(dir.as_str(), "left" | "middle" | "mid" | "right") {
        return Err(EngineError::InvalidArgument(
            "Dir must be 'left', 'middle' or 'right'".to_string(),
        ));
    }

    let parsed = calc_parser::parse(&text)?;
    let free = parsed.free_vars();
    if free.iter().any(|v| v != "x") {
        return Err(EngineError::UnsupportedExpression(
            "Function must be in terms of the variable x".to_string(),
        ));
    }

    let eps = exact_eps();
    let point = point.to_exact().map(Numeric::Exact).unwrap_or(point);

    let saved = ctx.mode;
    ctx.mode = NumericMode::Rational;
    let result = (|| match dir.as_str() {
        "left" => eval_with(ctx, &parsed, &[("x".to_string(), point.sub(&eps))]),
        "right" => eval_with(ctx, &parsed, &[("x".to_string(), point.add(&eps))]),
        _ => {
            let s1 = eval_with(ctx, &parsed, &[("x".to_string(), point.sub(&eps))])?;
            let s2 = eval_with(ctx, &parsed, &[("x".to_string(), point.add(&eps))])?;
            let gap = s1.sub(&s2).abs().to_f64();
            if !(gap < LIMIT_EPSILON) {
                return Err(EngineError::LimitDoesNotConverge {
                    left: s1.to_string(),
                    right: s2.to_string(),
                });
            }
            Ok(s1.add(&s2).div(&Numeric::int(2)))
        }
    })();
    ctx.mode = saved;

    let out = result.map_err(|err| match err {
        EngineError::UndefinedSymbol(_) => EngineError::UnsupportedExpression(
            "Function must be in terms of the variable x".to_string(),
        ),
        other => other,
    })?;
    Ok(Value::Number(match ctx.mode {
        NumericMode::Float => Numeric::Float(out.to_f64()),
        _ => out,
    }))
}

// ---- taylor series -------------------------------------------------------

pub fn taylor_series(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("taylorSeries", args, 1, 4)?;
    let text = expression_arg("taylorSeries", args, "Expression needs to be given")?;
    let center = util::f64_opt("taylorSeries", args, 1, 0.0)?;
    let terms = util::int_opt("taylorSeries", args, 2, 6)?;
    let point = match args.get(3) {
        None => None,
        Some(Value::Number(n)) => Some(n.to_f64()),
        Some(other) => {
            return Err(EngineError::InvalidArgument(format!(
                "taylorSeries: point must be a number, got {}",
                other
            )))
        }
    };

    let mut expr = calc_parser::parse(&text)?;
    if expr.free_vars().iter().any(|v| v != "x") {
        return Err(EngineError::UnsupportedExpression(
            "Function must be in terms of the variable x".to_string(),
        ));
    }

    // coeff[i] is the i-th derivative at the center, not yet divided
    // by i!
    let deadline = ctx.deadline();
    let mut coeff = Vec::new();
    for _ in 0..terms {
        if deadline.expired() {
            ctx.push_notice(format!(
                "Function timed out, only could compute {} terms",
                coeff.len()
            ));
            break;
        }
        coeff.push(eval_f64(ctx, &expr, "x", center)?);
        expr = diff::derivative(&expr, "x")?;
    }

    match point {
        None => Ok(Value::Str(render_taylor(&coeff, center))),
        Some(p) => {
            let h = p - center;
            let mut sum = 0.0;
            let mut fact = 1.0;
            for (i, c) in coeff.iter().enumerate() {
                if i > 0 {
                    fact *= i as f64;
                }
                sum += c * h.powi(i as i32) / fact;
            }
            Ok(Value::Number(ctx.mode.from_f64(sum)))
        }
    }
}

fn trim_4dp(x: f64) -> String {
    let rounded = (x * 1e4).round() / 1e4;
    format!("{}", rounded)
}

/// Render the general series: zero terms elided, coefficients to four
/// decimals, unit coefficients reduced to their sign.
fn render_taylor(coeff: &[f64], center: f64) -> String {
    let h = if center != 0.0 {
        format!("(x - {})", center)
    } else {
        "x".to_string()
    };
    let mut out = String::new();
    let mut first = true;
    for (i, &c) in coeff.iter().enumerate() {
        if c == 0.0 {
            continue;
        }
        if first {
            if c < 0.0 {
                out.push('-');
            }
            first = false;
        } else {
            out.push_str(if c < 0.0 { " - " } else { " + " });
        }
        let mag = c.abs();
        if mag != 1.0 || i == 0 {
            out.push_str(&trim_4dp(mag));
        }
        if i != 0 {
            out.push_str(&h);
            if i != 1 {
                out.push_str(&format!("^{} / {}!", i, i));
            }
        }
    }
    out.push_str(" + ...");
    out
}

// ---- summation and series product ----------------------------------------

fn series_args(
    name: &str,
    args: &[Value],
) -> CalcResult<(String, Numeric, Numeric, Numeric, String)> {
    util::require(name, args, 3, 5)?;
    let text = expression_arg(name, args, "Expression needs to be given")?;
    let start = util::num(name, args, 1)?;
    let end = util::num(name, args, 2)?;
    let inc = if args.len() > 3 {
        util::num(name, args, 3)?
    } else {
        Numeric::int(1)
    };
    let var = util::text_opt(name, args, 4, "x")?;
    if inc.is_zero() {
        return Err(EngineError::InvalidArgument(
            "Increment cannot be 0".to_string(),
        ));
    }
    Ok((text, start, end, inc, var))
}

fn direction_matches(start: &Numeric, end: &Numeric, inc: &Numeric) -> bool {
    let span = end.sub(start);
    span.is_zero() || span.is_negative() == inc.is_negative()
}

pub fn summation(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    let (text, start, end, inc, var) = series_args("summation", args)?;
    if !direction_matches(&start, &end, &inc) {
        return Err(EngineError::NonConvergent(format!(
            "Summation from {} to {} with increment {} does not terminate",
            start, end, inc
        )));
    }
    let parsed = calc_parser::parse(&text)?;
    let deadline = ctx.deadline();
    let forward = !inc.is_negative();

    let mut sum = Numeric::zero();
    let mut i = start;
    loop {
        let past = match i.compare(&end) {
            Some(ord) => {
                if forward {
                    ord == std::cmp::Ordering::Greater
                } else {
                    ord == std::cmp::Ordering::Less
                }
            }
            None => true,
        };
        if past {
            break;
        }
        if deadline.expired() {
            ctx.push_notice(format!(
                "Function timed out, only could compute up to {} = {}",
                var, i
            ));
            break;
        }
        let term = eval_with(ctx, &parsed, &[(var.clone(), i.clone())])?;
        sum = sum.add(&term);
        i = i.add(&inc);
    }
    Ok(Value::Number(sum))
}

pub fn series_product(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    let (text, start, end, inc, var) = series_args("seriesProduct", args)?;
    // Products normalize a mismatched direction instead of failing
    let (start, end, inc) = if direction_matches(&start, &end, &inc) {
        (start, end, inc)
    } else {
        (end, start, inc.abs())
    };
    let parsed = calc_parser::parse(&text)?;
    let deadline = ctx.deadline();
    let forward = !inc.is_negative();

    let mut product = Numeric::int(1);
    let mut i = start;
    loop {
        let past = match i.compare(&end) {
            Some(ord) => {
                if forward {
                    ord == std::cmp::Ordering::Greater
                } else {
                    ord == std::cmp::Ordering::Less
                }
            }
            None => true,
        };
        if past {
            break;
        }
        if deadline.expired() {
            ctx.push_notice(format!(
                "Function timed out, only could compute up to {} = {}",
                var, i
            ));
            break;
        }
        let term = eval_with(ctx, &parsed, &[(var.clone(), i.clone())])?;
        product = product.mul(&term);
        i = i.add(&inc);
    }
    Ok(Value::Number(product))
}

// ---- integration ---------------------------------------------------------

pub fn integral(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("integral", args, 1, 4)?;
    let text = expression_arg("integral", args, "Expression needs to be given")?;
    let var = util::text_opt("integral", args, 3, "x")?;
    let parsed = calc_parser::parse(&text)?;

    match (args.get(1), args.get(2)) {
        (None, _) => {
            // Indefinite: infer the variable when the default is absent
            let free = parsed.free_vars();
            let var = if !free.contains(&var) && free.len() == 1 {
                free.into_iter().next().unwrap_or(var)
            } else {
                var
            };
            Ok(Value::Symbolic(antiderivative(&parsed, &var)?))
        }
        (Some(_), None) => Err(EngineError::InvalidArgument(
            "End value must be defined".to_string(),
        )),
        (Some(_), Some(_)) => {
            let a = util::f64_arg("integral", args, 1)?;
            let b = util::f64_arg("integral", args, 2)?;
            let value = adaptive_simpson(ctx, &parsed, &var, a, b, INTEGRAL_ERROR)?;
            Ok(Value::Number(ctx.mode.from_f64(value)))
        }
    }
}

fn adaptive_simpson(
    ctx: &mut EvalContext,
    expr: &Rc<Expr>,
    var: &str,
    a: f64,
    b: f64,
    eps: f64,
) -> CalcResult<f64> {
    let fa = eval_f64(ctx, expr, var, a)?;
    let fb = eval_f64(ctx, expr, var, b)?;
    let m = 0.5 * (a + b);
    let fm = eval_f64(ctx, expr, var, m)?;
    let whole = (b - a) / 6.0 * (fa + 4.0 * fm + fb);
    simpson_step(ctx, expr, var, a, b, fa, fb, fm, whole, eps, 50)
}

#[allow(clippy::too_many_arguments)]
fn simpson_step(
    ctx: &mut EvalContext,
    expr: &Rc<Expr>,
    var: &str,
    a: f64,
    b: f64,
    fa: f64,
    fb: f64,
    fm: f64,
    whole: f64,
    eps: f64,
    depth: u32,
) -> CalcResult<f64> {
    let m = 0.5 * (a + b);
    let lm = 0.5 * (a + m);
    let rm = 0.5 * (m + b);
    let flm = eval_f64(ctx, expr, var, lm)?;
    let frm = eval_f64(ctx, expr, var, rm)?;
    let left = (m - a) / 6.0 * (fa + 4.0 * flm + fm);
    let right = (b - m) / 6.0 * (fm + 4.0 * frm + fb);
    let delta = left + right - whole;
    if depth == 0 || delta.abs() <= 15.0 * eps {
        return Ok(left + right + delta / 15.0);
    }
    let half = eps / 2.0;
    Ok(
        simpson_step(ctx, expr, var, a, m, fa, fm, flm, left, half, depth - 1)?
            + simpson_step(ctx, expr, var, m, b, fm, fb, frm, right, half, depth - 1)?,
    )
}

pub fn riemann(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("riemann", args, 4, 5)?;
    let text = expression_arg("riemann", args, "Expression needs to be given")?;
    let a = util::f64_arg("riemann", args, 1)?;
    let b = util::f64_arg("riemann", args, 2)?;
    let divisions = util::int("riemann", args, 3)?;
    let corner = util::text_opt("riemann", args, 4, "left")?;
    if divisions < 1 {
        return Err(EngineError::InvalidArgument(
            "Divisions must be a positive integer".to_string(),
        ));
    }
    let offset = match corner.as_str() {
        "left" => 0.0,
        "right" => 1.0,
        "middle" => 0.5,
        _ => {
            return Err(EngineError::InvalidArgument(
                "Corner must be 'left', 'right' or 'middle'".to_string(),
            ))
        }
    };
    let parsed = calc_parser::parse(&text)?;
    let dx = (b - a) / divisions as f64;
    let mut sum = 0.0;
    for i in 0..divisions {
        let x = a + (i as f64 + offset) * dx;
        sum += eval_f64(ctx, &parsed, "x", x)?;
    }
    Ok(Value::Number(ctx.mode.from_f64(sum * dx)))
}

// ---- root finding and extrema --------------------------------------------

pub fn newton_raphson(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("newtonRaphson", args, 2, 3)?;
    let text = expression_arg("newtonRaphson", args, "Expression needs to be given")?;
    let guess = util::f64_arg("newtonRaphson", args, 1)?;
    let var = util::text_opt("newtonRaphson", args, 2, "x")?;

    let f = calc_parser::parse(&text)?;
    let f1 = simplify(&diff::derivative(&f, &var)?);
    let f2 = simplify(&diff::derivative(&f1, &var)?);

    // Modified Newton-Raphson: x - f f' / (f'^2 - f f'')
    let mut x = guess;
    for _ in 0..NEWTON_ITERATIONS {
        let fx = eval_f64(ctx, &f, &var, x)?;
        let f1x = eval_f64(ctx, &f1, &var, x)?;
        let f2x = eval_f64(ctx, &f2, &var, x)?;
        let denom = f1x * f1x - fx * f2x;
        if denom == 0.0 {
            break;
        }
        let step = fx * f1x / denom;
        x -= step;
        if step.abs() < NEWTON_TOLERANCE {
            break;
        }
    }
    let residual = eval_f64(ctx, &f, &var, x)?;
    if residual.abs() > 1e-6 {
        ctx.push_notice(format!(
            "Newton-Raphson residual is large: f({}) = {}",
            x, residual
        ));
    }
    Ok(Value::Number(ctx.mode.from_f64(x)))
}

fn golden_section(
    ctx: &mut EvalContext,
    args: &[Value],
    name: &str,
    maximize: bool,
) -> CalcResult<Value> {
    util::require(name, args, 3, 5)?;
    let text = expression_arg(name, args, "Expression needs to be given")?;
    let mut a = util::f64_arg(name, args, 1)?;
    let mut b = util::f64_arg(name, args, 2)?;
    let var = util::text_opt(name, args, 3, "x")?;
    let max_error = util::f64_opt(name, args, 4, 1e-4)?;
    if b <= a {
        return Err(EngineError::InvalidArgument(
            "End must be greater than start".to_string(),
        ));
    }
    if max_error <= 0.0 {
        return Err(EngineError::InvalidArgument(
            "Max error must be positive".to_string(),
        ));
    }
    let parsed = calc_parser::parse(&text)?;
    let sign = if maximize { -1.0 } else { 1.0 };
    let deadline = ctx.deadline();

    let mut c = a + GOLDEN_RATIO * (b - a);
    let mut d = b - GOLDEN_RATIO * (b - a);
    let mut fc = sign * eval_f64(ctx, &parsed, &var, c)?;
    let mut fd = sign * eval_f64(ctx, &parsed, &var, d)?;
    while (b - a).abs() > max_error {
        if deadline.expired() {
            ctx.push_notice(format!(
                "Function timed out, interval narrowed to [{}, {}]",
                a, b
            ));
            break;
        }
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = a + GOLDEN_RATIO * (b - a);
            fc = sign * eval_f64(ctx, &parsed, &var, c)?;
        } else {
            a = c;
            c = d;
            fc = fd;
            d = b - GOLDEN_RATIO * (b - a);
            fd = sign * eval_f64(ctx, &parsed, &var, d)?;
        }
    }
    Ok(Value::Number(ctx.mode.from_f64(0.5 * (a + b))))
}

pub fn fmin(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    golden_section(ctx, args, "fmin", false)
}

pub fn fmax(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    golden_section(ctx, args, "fmax", true)
}

// ---- vector calculus -----------------------------------------------------

fn field_arg(
    name: &str,
    args: &[Value],
    vars_index: usize,
) -> CalcResult<(Vec<Rc<Expr>>, Vec<String>)> {
    let text = expression_arg(name, args, "Field needs to be given, ie \"[x, y]\"")?;
    let parsed = calc_parser::parse(&text)?;
    let components: Vec<Rc<Expr>> = match parsed.as_ref() {
        Expr::Matrix(rows) if rows.len() == 1 => rows[0].clone(),
        _ => {
            return Err(EngineError::InvalidArgument(format!(
                "{}: field must be a list of components, ie \"[x, y]\"",
                name
            )))
        }
    };
    let default_vars = ["x", "y", "z"];
    let vars: Vec<String> = match args.get(vars_index) {
        Some(Value::Str(s)) => s.split(',').map(|v| v.trim().to_string()).collect(),
        None => default_vars
            .iter()
            .take(components.len())
            .map(|v| v.to_string())
            .collect(),
        Some(other) => {
            return Err(EngineError::InvalidArgument(format!(
                "{}: variables must be a string like \"x, y\", got {}",
                name, other
            )))
        }
    };
    if vars.len() != components.len() {
        return Err(EngineError::InvalidArgument(
            "Number of variables must match the field components".to_string(),
        ));
    }
    Ok((components, vars))
}

/// Paired component derivatives: g[i] = d(field[i]) / d(vars[i]).
fn paired_partials(
    components: &[Rc<Expr>],
    vars: &[String],
) -> CalcResult<Vec<Rc<Expr>>> {
    components
        .iter()
        .zip(vars)
        .map(|(c, v)| diff::derivative(c, v).map(|d| simplify(&d)))
        .collect()
}

fn symbolic_or_eval(
    ctx: &mut EvalContext,
    expr: &Rc<Expr>,
    point: &Point,
) -> CalcResult<Value> {
    match point {
        Point::None => Ok(Value::Symbolic(expr.clone())),
        Point::Scalar(_) => Err(EngineError::MultivariableContextRequired),
        Point::Map(bindings) => Ok(Value::Number(
            eval_with(ctx, expr, bindings).map_err(multivariable_hint)?,
        )),
    }
}

pub fn curl(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("curl", args, 1, 3)?;
    let (components, vars) = field_arg("curl", args, 2)?;
    let point = point_arg(ctx, "curl", args, 1)?;
    let g = paired_partials(&components, &vars)?;

    match components.len() {
        2 => {
            // Scalar: g_x F_y - g_y F_x
            let cross = simplify(&ast::add(
                ast::neg(ast::mul(g[1].clone(), components[0].clone())),
                ast::mul(g[0].clone(), components[1].clone()),
            ));
            symbolic_or_eval(ctx, &cross, &point)
        }
        3 => {
            let comp = |i: usize, j: usize| {
                simplify(&ast::sub(
                    ast::mul(g[i].clone(), components[j].clone()),
                    ast::mul(g[j].clone(), components[i].clone()),
                ))
            };
            let out = [comp(1, 2), comp(2, 0), comp(0, 1)];
            match point {
                Point::None => {
                    let rendered: Vec<String> = out.iter().map(|e| e.to_string()).collect();
                    Ok(Value::Str(format!("[{}]", rendered.join(", "))))
                }
                Point::Scalar(_) => Err(EngineError::MultivariableContextRequired),
                Point::Map(bindings) => {
                    let mut values = Vec::with_capacity(3);
                    for e in &out {
                        values.push(eval_with(ctx, e, &bindings).map_err(multivariable_hint)?);
                    }
                    Ok(Value::row(values))
                }
            }
        }
        _ => Err(EngineError::InvalidArgument(
            "Field must have 2 or 3 components".to_string(),
        )),
    }
}

pub fn divergence(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("div", args, 1, 3)?;
    let (components, vars) = field_arg("div", args, 2)?;
    let point = point_arg(ctx, "div", args, 1)?;
    let g = paired_partials(&components, &vars)?;

    let mut acc = g[0].clone();
    for part in &g[1..] {
        acc = ast::add(acc, part.clone());
    }
    let total = simplify(&acc);
    symbolic_or_eval(ctx, &total, &point)
}

// ---- error bounds --------------------------------------------------------

pub fn lagrange_error_bound(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("lagrangeErrorBound", args, 4, 4)?;
    let text = expression_arg("lagrangeErrorBound", args, "Expression needs to be given")?;
    let x = util::f64_arg("lagrangeErrorBound", args, 1)?;
    let center = util::f64_arg("lagrangeErrorBound", args, 2)?;
    let degree = util::int("lagrangeErrorBound", args, 3)?;
    if degree < 0 {
        return Err(EngineError::InvalidArgument(
            "Degree must be nonnegative".to_string(),
        ));
    }

    let mut expr = calc_parser::parse(&text)?;
    for _ in 0..=degree {
        expr = diff::derivative(&expr, "x")?;
    }
    let expr = simplify(&expr);

    // Sample |f^(n+1)| over [center, x] for the worst case M
    let (lo, hi) = if center <= x { (center, x) } else { (x, center) };
    let samples = 100;
    let mut m: f64 = 0.0;
    for i in 0..=samples {
        let t = lo + (hi - lo) * i as f64 / samples as f64;
        m = m.max(eval_f64(ctx, &expr, "x", t)?.abs());
    }

    let n1 = (degree + 1) as u32;
    let mut fact = 1.0;
    for k in 2..=n1 {
        fact *= k as f64;
    }
    let bound = m * (x - center).abs().powi(n1 as i32) / fact;
    Ok(Value::Number(ctx.mode.from_f64(bound)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_engine::{builtins, AngleMode, Registry};
    use std::time::Duration;

    fn registry() -> Registry {
        let mut reg = Registry::new();
        builtins::register(&mut reg);
        reg
    }

    fn ctx(reg: &Registry) -> EvalContext<'_> {
        EvalContext::new(
            NumericMode::Float,
            AngleMode::Radians,
            Duration::from_secs(5),
            reg,
        )
    }

    fn s(v: &str) -> Value {
        Value::Str(v.to_string())
    }

    fn n(v: f64) -> Value {
        Value::Number(Numeric::Float(v))
    }

    #[test]
    fn derivative_symbolic_and_at_point() {
        let reg = registry();
        let mut c = ctx(&reg);
        let v = derivative(&mut c, &[s("x^5 + 2x")]).unwrap();
        assert_eq!(v.to_string(), "5 * x^4 + 2");
        let v = derivative(&mut c, &[s("x^2"), s("x"), n(3.0)]).unwrap();
        assert_eq!(v.as_number().unwrap().to_f64(), 6.0);
    }

    #[test]
    fn second_derivative() {
        let reg = registry();
        let mut c = ctx(&reg);
        let v = derivative(&mut c, &[s("x^2"), s("x"), n(1.0), n(2.0)]).unwrap();
        assert_eq!(v.as_number().unwrap().to_f64(), 2.0);
        let v = derivative(&mut c, &[s("x^3"), s("x")]).unwrap();
        assert_eq!(v.to_string(), "3 * x^2");
    }

    #[test]
    fn numeric_fallback_for_abs() {
        let reg = registry();
        let mut c = ctx(&reg);
        // abs has no symbolic rule; slope of |x| at 3 is 1
        let v = derivative(&mut c, &[s("abs(x)"), s("x"), n(3.0)]).unwrap();
        assert!((v.as_number().unwrap().to_f64() - 1.0).abs() < 1e-9);
        // With no point there is nothing to fall back to
        assert!(derivative(&mut c, &[s("abs(x)")]).is_err());
    }

    #[test]
    fn scalar_point_with_two_variables_is_rejected() {
        let reg = registry();
        let mut c = ctx(&reg);
        let err = derivative(&mut c, &[s("x * y"), s("x"), n(1.0)]).unwrap_err();
        assert!(matches!(err, EngineError::MultivariableContextRequired));
        let v = derivative(&mut c, &[s("x * y"), s("x"), s("x: 1, y: 4")]).unwrap();
        assert_eq!(v.as_number().unwrap().to_f64(), 4.0);
    }

    #[test]
    fn missing_expression_is_invalid_input() {
        let reg = registry();
        let mut c = ctx(&reg);
        assert!(matches!(
            derivative(&mut c, &[s("")]),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn limit_of_continuous_function() {
        let reg = registry();
        let mut c = ctx(&reg);
        let v = limit(&mut c, &[s("x^2"), n(3.0)]).unwrap();
        assert!((v.as_number().unwrap().to_f64() - 9.0).abs() < 1e-9);
    }

    #[test]
    fn limit_one_sided_and_diverging() {
        let reg = registry();
        let mut c = ctx(&reg);
        let v = limit(&mut c, &[s("1/x"), n(0.0), s("right")]).unwrap();
        assert_eq!(v.as_number().unwrap().to_f64(), 1e15);
        let v = limit(&mut c, &[s("1/x"), n(0.0), s("left")]).unwrap();
        assert_eq!(v.as_number().unwrap().to_f64(), -1e15);
        let err = limit(&mut c, &[s("1/x"), n(0.0)]).unwrap_err();
        assert!(matches!(err, EngineError::LimitDoesNotConverge { .. }));
        let msg = err.to_string();
        assert!(msg.contains("x-") && msg.contains("x+"));
    }

    #[test]
    fn limit_rejects_bad_direction_and_foreign_variables() {
        let reg = registry();
        let mut c = ctx(&reg);
        assert!(matches!(
            limit(&mut c, &[s("x^2"), n(0.0), s("sideways")]),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(matches!(
            limit(&mut c, &[s("y^2"), n(0.0)]),
            Err(EngineError::UnsupportedExpression(_))
        ));
    }

    #[test]
    fn summation_both_directions() {
        let reg = registry();
        let mut c = ctx(&reg);
        let v = summation(&mut c, &[s("x"), n(1.0), n(100.0)]).unwrap();
        assert_eq!(v.as_number().unwrap().to_f64(), 5050.0);
        let v = summation(&mut c, &[s("x"), n(100.0), n(1.0), n(-1.0)]).unwrap();
        assert_eq!(v.as_number().unwrap().to_f64(), 5050.0);
    }

    #[test]
    fn summation_direction_mismatch_fails_but_product_normalizes() {
        let reg = registry();
        let mut c = ctx(&reg);
        assert!(matches!(
            summation(&mut c, &[s("x"), n(100.0), n(1.0)]),
            Err(EngineError::NonConvergent(_))
        ));
        let v = series_product(&mut c, &[s("x"), n(5.0), n(1.0)]).unwrap();
        assert_eq!(v.as_number().unwrap().to_f64(), 120.0);
    }

    #[test]
    fn summation_zero_increment_is_invalid() {
        let reg = registry();
        let mut c = ctx(&reg);
        assert!(matches!(
            summation(&mut c, &[s("x"), n(1.0), n(10.0), n(0.0)]),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn definite_integral_quadrature() {
        let reg = registry();
        let mut c = ctx(&reg);
        let v = integral(&mut c, &[s("x^2"), n(-1.0), n(1.0)]).unwrap();
        assert!((v.as_number().unwrap().to_f64() - 2.0 / 3.0).abs() < 1e-6);
        let v = integral(&mut c, &[s("sin(x)"), n(0.0), n(std::f64::consts::PI)]).unwrap();
        assert!((v.as_number().unwrap().to_f64() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn indefinite_integral_infers_variable() {
        let reg = registry();
        let mut c = ctx(&reg);
        let v = integral(&mut c, &[s("y^2")]).unwrap();
        assert_eq!(v.to_string(), "1/3 * y^3");
    }

    #[test]
    fn integral_with_one_bound_is_invalid() {
        let reg = registry();
        let mut c = ctx(&reg);
        assert!(matches!(
            integral(&mut c, &[s("x^2"), n(0.0)]),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn riemann_sums() {
        let reg = registry();
        let mut c = ctx(&reg);
        // Middle sum of x^2 on [0, 1] with many divisions approaches 1/3
        let v = riemann(&mut c, &[s("x^2"), n(0.0), n(1.0), n(1000.0), s("middle")]).unwrap();
        assert!((v.as_number().unwrap().to_f64() - 1.0 / 3.0).abs() < 1e-5);
        // Left sum of an increasing function underestimates
        let v = riemann(&mut c, &[s("x^2"), n(0.0), n(1.0), n(10.0)]).unwrap();
        assert!(v.as_number().unwrap().to_f64() < 1.0 / 3.0);
        assert!(riemann(&mut c, &[s("x^2"), n(0.0), n(1.0), n(10.0), s("corner")]).is_err());
    }

    #[test]
    fn newton_raphson_finds_sqrt2() {
        let reg = registry();
        let mut c = ctx(&reg);
        let v = newton_raphson(&mut c, &[s("x^2 - 2"), n(1.0)]).unwrap();
        assert!((v.as_number().unwrap().to_f64() - std::f64::consts::SQRT_2).abs() < 1e-7);
    }

    #[test]
    fn golden_section_extrema() {
        let reg = registry();
        let mut c = ctx(&reg);
        let v = fmin(&mut c, &[s("(x - 2)^2"), n(0.0), n(5.0)]).unwrap();
        assert!((v.as_number().unwrap().to_f64() - 2.0).abs() < 1e-3);
        let v = fmax(&mut c, &[s("sin(x)"), n(0.0), n(3.0)]).unwrap();
        assert!((v.as_number().unwrap().to_f64() - std::f64::consts::FRAC_PI_2).abs() < 1e-3);
        assert!(fmin(&mut c, &[s("x"), n(5.0), n(1.0)]).is_err());
    }

    #[test]
    fn curl_and_divergence_2d() {
        let reg = registry();
        let mut c = ctx(&reg);
        let v = curl(&mut c, &[s("[x, y]")]).unwrap();
        assert_eq!(v.to_string(), "-x + y");
        let v = divergence(&mut c, &[s("[x, y]")]).unwrap();
        assert_eq!(v.to_string(), "2");
    }

    #[test]
    fn curl_3d_at_point() {
        let reg = registry();
        let mut c = ctx(&reg);
        let v = curl(
            &mut c,
            &[s("[x^2, y^2, z^2]"), s("x: 1, y: 2, z: 3")],
        )
        .unwrap();
        match v {
            Value::Matrix(rows) => {
                // g = [2x, 2y, 2z]; cross with F at (1,2,3)
                assert_eq!(rows[0].len(), 3);
                assert_eq!(rows[0][0].to_f64(), 4.0 * 9.0 - 6.0 * 4.0);
            }
            other => panic!("expected vector, got {}", other),
        }
    }

    #[test]
    fn field_length_mismatch_is_invalid() {
        let reg = registry();
        let mut c = ctx(&reg);
        assert!(matches!(
            curl(&mut c, &[s("[x, y]"), s("x: 1"), s("x")]),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn taylor_series_renders_sine() {
        let reg = registry();
        let mut c = ctx(&reg);
        let v = taylor_series(&mut c, &[s("sin(x)"), n(0.0), n(6.0)]).unwrap();
        assert_eq!(v.to_string(), "\"x - x^3 / 3! + x^5 / 5! + ...\"");
    }

    #[test]
    fn taylor_series_evaluates_at_point() {
        let reg = registry();
        let mut c = ctx(&reg);
        let v = taylor_series(&mut c, &[s("exp(x)"), n(0.0), n(12.0), n(1.0)]).unwrap();
        assert!((v.as_number().unwrap().to_f64() - std::f64::consts::E).abs() < 1e-6);
    }

    #[test]
    fn lagrange_bound_for_sine() {
        let reg = registry();
        let mut c = ctx(&reg);
        let v = lagrange_error_bound(&mut c, &[s("sin(x)"), n(1.0), n(0.0), n(3.0)]).unwrap();
        let bound = v.as_number().unwrap().to_f64();
        // M = sin(1) on [0, 1], degree 3: M / 4! ~ 0.035
        assert!((bound - (1.0f64).sin() / 24.0).abs() < 1e-3);
    }

    #[test]
    fn gradient_symbolic_and_at_point() {
        let reg = registry();
        let mut c = ctx(&reg);
        let v = gradient(&mut c, &[s("x^2 + y^2"), s("x: 1, y: 2"), s("x, y")]).unwrap();
        match v {
            Value::Matrix(rows) => {
                assert_eq!(rows[0][0].to_f64(), 2.0);
                assert_eq!(rows[0][1].to_f64(), 4.0);
            }
            other => panic!("expected vector, got {}", other),
        }
        let v = gradient(&mut c, &[s("x^2 + y^2")]).unwrap();
        assert_eq!(v.to_string(), "\"[2 * x, 2 * y, 0]\"");
    }
}
