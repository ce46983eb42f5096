//! Presentation functions: fraction strings, DMS angles, number names
//! and humanized durations, over the `calc_num::format` helpers.

use crate::util;
use calc_engine::{CalcResult, EvalContext, Value};
use calc_num::format;

const DEFAULT_FRACTION_ERROR: f64 = 1e-6;

pub fn to_fraction(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("toFraction", args, 1, 2)?;
    let x = util::f64_arg("toFraction", args, 0)?;
    let max_error = util::f64_opt("toFraction", args, 1, DEFAULT_FRACTION_ERROR)?;
    Ok(Value::Str(format::to_fraction(x, max_error)))
}

pub fn to_mixed_fraction(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("toMixedFraction", args, 1, 2)?;
    let x = util::f64_arg("toMixedFraction", args, 0)?;
    let max_error = util::f64_opt("toMixedFraction", args, 1, DEFAULT_FRACTION_ERROR)?;
    Ok(Value::Str(format::to_mixed_fraction(x, max_error)))
}

pub fn dms(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("dms", args, 1, 1)?;
    let angle = util::f64_arg("dms", args, 0)?;
    Ok(Value::Str(format::format_dms(angle)))
}

pub fn number_name(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("numberName", args, 1, 1)?;
    let x = util::f64_arg("numberName", args, 0)?;
    Ok(Value::Str(format::number_name(x)))
}

pub fn seconds(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("seconds", args, 1, 1)?;
    let s = util::f64_arg("seconds", args, 0)?;
    Ok(Value::Str(format::format_seconds(s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_engine::{AngleMode, Registry};
    use calc_num::{Numeric, NumericMode};
    use std::time::Duration;

    fn call(f: fn(&mut EvalContext, &[Value]) -> CalcResult<Value>, args: &[Value]) -> Value {
        let reg = Registry::new();
        let mut ctx = EvalContext::new(
            NumericMode::Float,
            AngleMode::Radians,
            Duration::from_secs(1),
            &reg,
        );
        f(&mut ctx, args).unwrap()
    }

    fn n(v: f64) -> Value {
        Value::Number(Numeric::Float(v))
    }

    #[test]
    fn quarter_becomes_a_fraction() {
        assert_eq!(call(to_fraction, &[n(0.25)]).to_string(), "\"1 / 4\"");
    }

    #[test]
    fn mixed_fraction_splits_the_integer_part() {
        assert_eq!(
            call(to_mixed_fraction, &[n(2.5)]).to_string(),
            "\"2 1 / 2\""
        );
    }

    #[test]
    fn dms_formats_minutes_and_seconds() {
        assert_eq!(call(dms, &[n(30.5)]).to_string(), "\"30° 30' 0.00000\"\"");
    }

    #[test]
    fn number_names_are_short_scale() {
        assert_eq!(
            call(number_name, &[n(1_000_000.0)]).to_string(),
            "\"one million\""
        );
    }

    #[test]
    fn durations_humanize() {
        assert_eq!(
            call(seconds, &[n(3661.0)]).to_string(),
            "\"1 hour, 1 minute, 1 second\""
        );
    }
}
