//! Random number generation.

use crate::util;
use calc_engine::{CalcResult, EngineError, EvalContext, Value};
use calc_num::Numeric;
use rand::Rng;

const MAX_COUNT: i64 = 50;

/// randInt(low, high, count = 1): uniform integers, inclusive on both
/// ends. More than one draw comes back as a list.
pub fn rand_int(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("randInt", args, 2, 3)?;
    let low = util::int("randInt", args, 0)?;
    let high = util::int("randInt", args, 1)?;
    let count = match args.get(2) {
        None => 1,
        Some(Value::Number(n)) => n.as_i64().filter(|c| *c > 0).ok_or_else(|| {
            EngineError::InvalidArgument(
                "Count must be an integer greater than 0".to_string(),
            )
        })?,
        Some(_) => {
            return Err(EngineError::InvalidArgument(
                "Count must be an integer greater than 0".to_string(),
            ))
        }
    };
    if count > MAX_COUNT {
        return Err(EngineError::InvalidArgument(
            "Too many random numbers to generate, must < 51".to_string(),
        ));
    }
    if low > high {
        return Err(EngineError::InvalidArgument(
            "Low must not be greater than high".to_string(),
        ));
    }
    let mut rng = rand::thread_rng();
    if count == 1 {
        return Ok(Value::Number(Numeric::int(rng.gen_range(low..=high))));
    }
    let draws = (0..count)
        .map(|_| Numeric::int(rng.gen_range(low..=high)))
        .collect();
    Ok(Value::row(draws))
}

/// uniform(low = 0, high = 1): one float draw from [low, high).
pub fn uniform(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("uniform", args, 0, 2)?;
    let low = util::f64_opt("uniform", args, 0, 0.0)?;
    let high = util::f64_opt("uniform", args, 1, 1.0)?;
    if high <= low {
        return Err(EngineError::InvalidArgument(
            "High must be greater than low".to_string(),
        ));
    }
    let mut rng = rand::thread_rng();
    let x = low + (high - low) * rng.gen::<f64>();
    Ok(Value::Number(ctx.mode.from_f64(x)))
}

/// randNorm(mean = 0, stdev = 1): one normal draw via Box-Muller.
pub fn rand_norm(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("randNorm", args, 0, 2)?;
    let mean = util::f64_opt("randNorm", args, 0, 0.0)?;
    let stdev = util::f64_opt("randNorm", args, 1, 1.0)?;
    if stdev <= 0.0 {
        return Err(EngineError::InvalidArgument(
            "Standard deviation must be positive".to_string(),
        ));
    }
    let mut rng = rand::thread_rng();
    let u1: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
    let u2: f64 = rng.gen::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    Ok(Value::Number(ctx.mode.from_f64(mean + stdev * z)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_engine::{AngleMode, Registry};
    use calc_num::NumericMode;
    use std::time::Duration;

    fn n(v: f64) -> Value {
        Value::Number(Numeric::Float(v))
    }

    fn with_ctx(f: impl FnOnce(&mut EvalContext)) {
        let reg = Registry::new();
        let mut ctx = EvalContext::new(
            NumericMode::Float,
            AngleMode::Radians,
            Duration::from_secs(1),
            &reg,
        );
        f(&mut ctx);
    }

    #[test]
    fn rand_int_stays_in_range() {
        with_ctx(|ctx| {
            for _ in 0..100 {
                let v = rand_int(ctx, &[n(1.0), n(6.0)]).unwrap();
                let x = v.as_number().unwrap().to_f64();
                assert!((1.0..=6.0).contains(&x));
                assert_eq!(x.fract(), 0.0);
            }
        });
    }

    #[test]
    fn rand_int_count_makes_a_list() {
        with_ctx(|ctx| {
            let v = rand_int(ctx, &[n(1.0), n(6.0), n(5.0)]).unwrap();
            match v {
                Value::Matrix(rows) => assert_eq!(rows[0].len(), 5),
                other => panic!("expected list, got {}", other),
            }
        });
    }

    #[test]
    fn rand_int_count_validation() {
        with_ctx(|ctx| {
            let err = rand_int(ctx, &[n(1.0), n(6.0), n(0.0)]).unwrap_err();
            assert_eq!(err.to_string(), "Count must be an integer greater than 0");
            let err = rand_int(ctx, &[n(1.0), n(6.0), n(51.0)]).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Too many random numbers to generate, must < 51"
            );
        });
    }

    #[test]
    fn uniform_respects_bounds() {
        with_ctx(|ctx| {
            for _ in 0..100 {
                let v = uniform(ctx, &[n(2.0), n(3.0)]).unwrap();
                let x = v.as_number().unwrap().to_f64();
                assert!((2.0..3.0).contains(&x));
            }
            assert!(uniform(ctx, &[n(3.0), n(2.0)]).is_err());
        });
    }

    #[test]
    fn rand_norm_is_finite() {
        with_ctx(|ctx| {
            for _ in 0..100 {
                let v = rand_norm(ctx, &[]).unwrap();
                assert!(v.as_number().unwrap().to_f64().is_finite());
            }
            assert!(rand_norm(ctx, &[n(0.0), n(-1.0)]).is_err());
        });
    }
}
