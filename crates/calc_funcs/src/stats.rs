//! Descriptive statistics over list arguments.

use crate::util;
use calc_engine::{CalcResult, EngineError, EvalContext, Value};

fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

// Sample standard deviation (n - 1 denominator)
fn stdev(data: &[f64], mean: f64) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let ss: f64 = data.iter().map(|x| (x - mean) * (x - mean)).sum();
    (ss / (data.len() - 1) as f64).sqrt()
}

fn fmt6(x: f64) -> String {
    let rounded = (x * 1e6).round() / 1e6;
    format!("{}", rounded)
}

/// summary(list): five-number style report as a labelled record.
pub fn summary(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("summary", args, 1, 1)?;
    let data = util::list("summary", args, 0)?;
    if data.is_empty() {
        return Err(EngineError::InvalidArgument(
            "summary: list must not be empty".to_string(),
        ));
    }
    let mut sorted = data.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let m = mean(&data);
    Ok(Value::Record(vec![
        ("mean".to_string(), fmt6(m)),
        ("median".to_string(), fmt6(median(&sorted))),
        ("min".to_string(), fmt6(sorted[0])),
        ("max".to_string(), fmt6(sorted[sorted.len() - 1])),
        ("stdev".to_string(), fmt6(stdev(&data, m))),
    ]))
}

/// percentDiff(experimental, trueValue): relative error against the
/// true value, as a fraction.
pub fn percent_diff(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("percentDiff", args, 2, 2)?;
    let experimental = util::f64_arg("percentDiff", args, 0)?;
    let true_value = util::f64_arg("percentDiff", args, 1)?;
    if true_value == 0.0 {
        return Err(EngineError::InvalidArgument(
            "True value must not be 0".to_string(),
        ));
    }
    let diff = ((true_value - experimental) / true_value).abs();
    Ok(Value::Number(ctx.mode.from_f64(diff)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_engine::{AngleMode, Registry};
    use calc_num::{Numeric, NumericMode};
    use std::time::Duration;

    fn list(values: &[f64]) -> Value {
        Value::row(values.iter().map(|v| Numeric::Float(*v)).collect())
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
    fn summary_reports_all_fields() {
        with_ctx(|ctx| {
            let v = summary(ctx, &[list(&[4.0, 1.0, 3.0, 2.0])]).unwrap();
            match v {
                Value::Record(fields) => {
                    let get = |k: &str| {
                        fields
                            .iter()
                            .find(|(name, _)| name == k)
                            .map(|(_, v)| v.clone())
                            .unwrap_or_default()
                    };
                    assert_eq!(get("mean"), "2.5");
                    assert_eq!(get("median"), "2.5");
                    assert_eq!(get("min"), "1");
                    assert_eq!(get("max"), "4");
                    // Sample stdev of 1..4 is sqrt(5/3)
                    assert_eq!(get("stdev"), "1.290994");
                }
                other => panic!("expected record, got {}", other),
            }
        });
    }

    #[test]
    fn summary_odd_length_median() {
        with_ctx(|ctx| {
            let v = summary(ctx, &[list(&[5.0, 1.0, 3.0])]).unwrap();
            match v {
                Value::Record(fields) => {
                    assert!(fields.contains(&("median".to_string(), "3".to_string())));
                }
                other => panic!("expected record, got {}", other),
            }
        });
    }

    #[test]
    fn summary_rejects_empty_list() {
        with_ctx(|ctx| {
            assert!(summary(ctx, &[list(&[])]).is_err());
        });
    }

    #[test]
    fn percent_diff_is_relative_to_true_value() {
        with_ctx(|ctx| {
            let v = percent_diff(
                ctx,
                &[
                    Value::Number(Numeric::Float(9.8)),
                    Value::Number(Numeric::Float(10.0)),
                ],
            )
            .unwrap();
            assert!((v.as_number().unwrap().to_f64() - 0.02).abs() < 1e-12);
            assert!(percent_diff(
                ctx,
                &[
                    Value::Number(Numeric::Float(1.0)),
                    Value::Number(Numeric::Float(0.0)),
                ],
            )
            .is_err());
        });
    }
}
