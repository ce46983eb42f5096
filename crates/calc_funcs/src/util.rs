//! Argument extraction helpers shared by the function library.

use calc_engine::{CalcResult, EngineError, Value};
use calc_num::Numeric;

pub fn require(name: &str, args: &[Value], min: usize, max: usize) -> CalcResult<()> {
    if args.len() < min || args.len() > max {
        return Err(EngineError::InvalidArgument(format!(
            "{} expects between {} and {} arguments, got {}",
            name,
            min,
            max,
            args.len()
        )));
    }
    Ok(())
}

pub fn num(name: &str, args: &[Value], i: usize) -> CalcResult<Numeric> {
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

pub fn f64_arg(name: &str, args: &[Value], i: usize) -> CalcResult<f64> {
    Ok(num(name, args, i)?.to_f64())
}

pub fn f64_opt(name: &str, args: &[Value], i: usize, default: f64) -> CalcResult<f64> {
    if args.len() > i {
        f64_arg(name, args, i)
    } else {
        Ok(default)
    }
}

pub fn int(name: &str, args: &[Value], i: usize) -> CalcResult<i64> {
    num(name, args, i)?.as_i64().ok_or_else(|| {
        EngineError::InvalidArgument(format!("{}: argument {} must be an integer", name, i + 1))
    })
}

pub fn int_opt(name: &str, args: &[Value], i: usize, default: i64) -> CalcResult<i64> {
    if args.len() > i {
        int(name, args, i)
    } else {
        Ok(default)
    }
}

pub fn text(name: &str, args: &[Value], i: usize) -> CalcResult<String> {
    match args.get(i) {
        Some(Value::Str(s)) => Ok(s.clone()),
        Some(other) => Err(EngineError::InvalidArgument(format!(
            "{}: argument {} must be a quoted string, got {}",
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

pub fn text_opt(name: &str, args: &[Value], i: usize, default: &str) -> CalcResult<String> {
    if args.len() > i {
        text(name, args, i)
    } else {
        Ok(default.to_string())
    }
}

/// A list argument: a single-row matrix of numbers.
pub fn list(name: &str, args: &[Value], i: usize) -> CalcResult<Vec<f64>> {
    match args.get(i) {
        Some(Value::Matrix(rows)) => {
            Ok(rows.iter().flatten().map(|n| n.to_f64()).collect())
        }
        Some(Value::Number(n)) => Ok(vec![n.to_f64()]),
        Some(other) => Err(EngineError::InvalidArgument(format!(
            "{}: argument {} must be a list, got {}",
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
