//! Property tests for the polynomial core and the series operations.

use calc_engine::{builtins, AngleMode, EvalContext, Registry, Value};
use calc_funcs::calculus;
use calc_funcs::poly::Poly;
use calc_num::{Numeric, NumericMode};
use num_bigint::BigInt;
use num_rational::BigRational;
use proptest::prelude::*;
use std::time::Duration;

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

fn poly(coeffs: &[i64]) -> Poly {
    Poly::new(coeffs.iter().map(|c| rat(*c)).collect())
}

fn run_summation(expr: &str, start: i64, end: i64) -> f64 {
    let mut reg = Registry::new();
    builtins::register(&mut reg);
    calc_funcs::register_all(&mut reg);
    let mut ctx = EvalContext::new(
        NumericMode::Float,
        AngleMode::Radians,
        Duration::from_secs(10),
        &reg,
    );
    let args = [
        Value::Str(expr.to_string()),
        Value::Number(Numeric::int(start)),
        Value::Number(Numeric::int(end)),
    ];
    calculus::summation(&mut ctx, &args)
        .and_then(|v| {
            v.as_number().cloned().ok_or_else(|| {
                calc_engine::EngineError::Numeric("not a number".to_string())
            })
        })
        .map(|n| n.to_f64())
        .unwrap_or(f64::NAN)
}

proptest! {
    #[test]
    fn poly_derivative_is_linear(
        a in proptest::collection::vec(-50i64..50, 1..6),
        b in proptest::collection::vec(-50i64..50, 1..6),
        x in -20i64..20,
    ) {
        let p = poly(&a);
        let q = poly(&b);
        let sum = Poly::new(
            (0..a.len().max(b.len()))
                .map(|i| {
                    rat(*a.get(i).unwrap_or(&0)) + rat(*b.get(i).unwrap_or(&0))
                })
                .collect(),
        );
        let x = rat(x);
        let lhs = sum.derivative().eval(&x);
        let rhs = p.derivative().eval(&x) + q.derivative().eval(&x);
        prop_assert_eq!(lhs, rhs);
    }

    #[test]
    fn poly_eval_agrees_with_horner_by_hand(
        coeffs in proptest::collection::vec(-9i64..10, 1..5),
        x in -9i64..10,
    ) {
        let p = poly(&coeffs);
        let mut expected = rat(0);
        for (i, c) in coeffs.iter().enumerate() {
            let mut term = rat(*c);
            for _ in 0..i {
                term *= rat(x);
            }
            expected += term;
        }
        prop_assert_eq!(p.eval(&rat(x)), expected);
    }

    #[test]
    fn summation_of_identity_matches_closed_form(n in 1i64..200) {
        let got = run_summation("x", 1, n);
        let expected = (n * (n + 1) / 2) as f64;
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn summation_respects_bounds(start in -20i64..20, len in 0i64..30) {
        let end = start + len;
        let got = run_summation("1", start, end);
        prop_assert_eq!(got, (len + 1) as f64);
    }
}
