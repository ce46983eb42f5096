//! Integer factorization and modular arithmetic.

use crate::util;
use calc_engine::{CalcResult, EngineError, EvalContext, Value};
use calc_num::Numeric;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Pow, Signed, ToPrimitive, Zero};

/// Prime factors with multiplicity, ascending. `None` when the budget
/// ran out, together with the unfactored cofactor.
fn trial_division(
    ctx: &mut EvalContext,
    mut n: i64,
) -> (Vec<(i64, u32)>, Option<i64>) {
    let deadline = ctx.deadline();
    let mut factors: Vec<(i64, u32)> = Vec::new();
    let mut push = |p: i64, factors: &mut Vec<(i64, u32)>| match factors.last_mut() {
        Some((q, e)) if *q == p => *e += 1,
        _ => factors.push((p, 1)),
    };
    while n % 2 == 0 {
        push(2, &mut factors);
        n /= 2;
    }
    let mut d = 3i64;
    while d * d <= n {
        if deadline.expired() {
            return (factors, Some(n));
        }
        while n % d == 0 {
            push(d, &mut factors);
            n /= d;
        }
        d += 2;
    }
    if n > 1 {
        push(n, &mut factors);
    }
    (factors, None)
}

fn integer_above_one(name: &str, args: &[Value], i: usize) -> CalcResult<i64> {
    let n = util::int(name, args, i)?;
    if n < 2 {
        return Err(EngineError::InvalidArgument(
            "n must be an integer greater than 1".to_string(),
        ));
    }
    Ok(n)
}

/// factor(n): prime factorization rendered as `2^3 * 5 * 7`.
pub fn factorization(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("factor", args, 1, 1)?;
    let n = integer_above_one("factor", args, 0)?;
    let (factors, leftover) = trial_division(ctx, n);
    let mut parts: Vec<String> = factors
        .iter()
        .map(|(p, e)| {
            if *e == 1 {
                p.to_string()
            } else {
                format!("{}^{}", p, e)
            }
        })
        .collect();
    if let Some(m) = leftover {
        ctx.push_notice(format!(
            "Function timed out, cofactor {} is left unfactored",
            m
        ));
        parts.push(m.to_string());
    }
    Ok(Value::Str(parts.join(" * ")))
}

/// divisorCount(n): number of positive divisors, from the exponent
/// pattern of the factorization.
pub fn divisor_count(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("divisorCount", args, 1, 1)?;
    let n = integer_above_one("divisorCount", args, 0)?;
    let (factors, leftover) = trial_division(ctx, n);
    if let Some(m) = leftover {
        return Err(EngineError::NonConvergent(format!(
            "Timed out factoring {}, cofactor {} remains",
            n, m
        )));
    }
    let count: u64 = factors.iter().map(|(_, e)| (*e as u64) + 1).product();
    Ok(Value::Number(Numeric::int(count as i64)))
}

/// divisorSum(n): sum of positive divisors.
pub fn divisor_sum(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("divisorSum", args, 1, 1)?;
    let n = integer_above_one("divisorSum", args, 0)?;
    let (factors, leftover) = trial_division(ctx, n);
    if let Some(m) = leftover {
        return Err(EngineError::NonConvergent(format!(
            "Timed out factoring {}, cofactor {} remains",
            n, m
        )));
    }
    let mut sum = BigInt::one();
    for (p, e) in factors {
        // Geometric series (p^(e+1) - 1) / (p - 1)
        let p = BigInt::from(p);
        let num = Pow::pow(&p, e + 1) - BigInt::one();
        sum *= num / (&p - BigInt::one());
    }
    Ok(Value::Number(Numeric::Exact(sum.into())))
}

fn modulus_arg(name: &str, args: &[Value], i: usize) -> CalcResult<BigInt> {
    let m = util::num(name, args, i)?;
    let m = m
        .to_exact()
        .filter(|r| r.is_integer())
        .map(|r| r.to_integer())
        .ok_or_else(|| {
            EngineError::InvalidArgument(format!("{}: modulus must be an integer", name))
        })?;
    if !m.is_positive() {
        return Err(EngineError::InvalidArgument(format!(
            "m (value = {}) must be positive",
            m
        )));
    }
    Ok(m)
}

/// powMod(base, exponent, m): modular exponentiation by squaring.
pub fn pow_mod(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("powMod", args, 3, 3)?;
    let base = util::num("powMod", args, 0)?;
    let exp = util::num("powMod", args, 1)?;
    let m = modulus_arg("powMod", args, 2)?;

    let (base_int, exp_int) = match (
        base.to_exact().filter(|r| r.is_integer()),
        exp.to_exact().filter(|r| r.is_integer() && !r.is_negative()),
    ) {
        (Some(b), Some(e)) => (b.to_integer(), e.to_integer()),
        _ => {
            // Fractional or negative input degrades to float pow
            let x = base.to_f64().powf(exp.to_f64());
            let m = m.to_f64().unwrap_or(f64::INFINITY);
            return Ok(Value::Number(ctx.mode.from_f64(x.rem_euclid(m))));
        }
    };
    let out = base_int.modpow(&exp_int, &m);
    let out = if out.is_negative() { out + &m } else { out };
    Ok(Value::Number(Numeric::Exact(out.into())))
}

/// geoSumMod(n, b, m): (1 + b + ... + b^n) mod m without materializing
/// the series.
pub fn geo_sum_mod(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("geoSumMod", args, 3, 3)?;
    let n = util::int("geoSumMod", args, 0)?;
    let b = util::int("geoSumMod", args, 1)?;
    let m = modulus_arg("geoSumMod", args, 2)?;
    if n < 0 {
        return Err(EngineError::InvalidArgument(format!(
            "n (value = {}) must be nonnegative",
            n
        )));
    }
    let b = BigInt::from(b).mod_floor(&m);
    let out = geo_terms(n as u64 + 1, &b, &m);
    Ok(Value::Number(Numeric::Exact(out.into())))
}

// Sum of the first t powers of b (from b^0), mod m, by halving t.
fn geo_terms(t: u64, b: &BigInt, m: &BigInt) -> BigInt {
    if t == 0 {
        return BigInt::zero();
    }
    if t % 2 == 1 {
        (b * geo_terms(t - 1, b, m) + BigInt::one()) % m
    } else {
        let half = geo_terms(t / 2, b, m);
        let shift = b.modpow(&BigInt::from(t / 2), m);
        (half * (BigInt::one() + shift)) % m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_engine::{AngleMode, Registry};
    use calc_num::NumericMode;
    use std::time::Duration;

    fn n(v: i64) -> Value {
        Value::Number(Numeric::int(v))
    }

    fn with_ctx(f: impl FnOnce(&mut EvalContext)) {
        let reg = Registry::new();
        let mut ctx = EvalContext::new(
            NumericMode::Float,
            AngleMode::Radians,
            Duration::from_secs(5),
            &reg,
        );
        f(&mut ctx);
    }

    #[test]
    fn factorization_renders_exponents() {
        with_ctx(|ctx| {
            assert_eq!(factorization(ctx, &[n(40)]).unwrap().to_string(), "\"2^3 * 5\"");
            assert_eq!(factorization(ctx, &[n(97)]).unwrap().to_string(), "\"97\"");
            assert_eq!(
                factorization(ctx, &[n(360)]).unwrap().to_string(),
                "\"2^3 * 3^2 * 5\""
            );
            assert!(factorization(ctx, &[n(1)]).is_err());
        });
    }

    #[test]
    fn divisor_functions() {
        with_ctx(|ctx| {
            // 12 = 2^2 * 3: divisors 1, 2, 3, 4, 6, 12
            let v = divisor_count(ctx, &[n(12)]).unwrap();
            assert_eq!(v.as_number().unwrap().to_f64(), 6.0);
            let v = divisor_sum(ctx, &[n(12)]).unwrap();
            assert_eq!(v.as_number().unwrap().to_f64(), 28.0);
            let v = divisor_sum(ctx, &[n(97)]).unwrap();
            assert_eq!(v.as_number().unwrap().to_f64(), 98.0);
        });
    }

    #[test]
    fn pow_mod_matches_direct_computation() {
        with_ctx(|ctx| {
            let v = pow_mod(ctx, &[n(3), n(100), n(7)]).unwrap();
            // 3^6 = 1 mod 7, 100 = 6 * 16 + 4, so 3^100 = 3^4 = 4 mod 7
            assert_eq!(v.as_number().unwrap().to_f64(), 4.0);
            assert!(pow_mod(ctx, &[n(3), n(4), n(0)]).is_err());
        });
    }

    #[test]
    fn geo_sum_mod_small_cases() {
        with_ctx(|ctx| {
            // 1 + 2 + 4 + 8 = 15
            let v = geo_sum_mod(ctx, &[n(3), n(2), n(100)]).unwrap();
            assert_eq!(v.as_number().unwrap().to_f64(), 15.0);
            let v = geo_sum_mod(ctx, &[n(3), n(2), n(7)]).unwrap();
            assert_eq!(v.as_number().unwrap().to_f64(), 1.0);
            let err = geo_sum_mod(ctx, &[n(-1), n(2), n(7)]).unwrap_err();
            assert_eq!(err.to_string(), "n (value = -1) must be nonnegative");
        });
    }
}
