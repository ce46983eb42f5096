//! Table-driven symbolic antiderivatives.
//!
//! Covers what a desk calculator needs: term-wise integration of
//! polynomial terms, reciprocals, and the elementary functions with a
//! linear inner argument (u = a*x + b, divided through by a). Anything
//! outside the table raises `UnsupportedExpression` and the caller
//! falls back to numeric quadrature when bounds are available.

use crate::error::{CalcResult, EngineError};
use crate::simplify::simplify;
use calc_ast::{self as ast, Expr};
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::rc::Rc;

/// Antiderivative of `expr` with respect to `var`, without the
/// integration constant. The result is simplified.
pub fn antiderivative(expr: &Rc<Expr>, var: &str) -> CalcResult<Rc<Expr>> {
    let reduced = simplify(expr);
    let raw = integrate_node(&reduced, var)?;
    Ok(simplify(&raw))
}

fn unsupported(expr: &Expr) -> EngineError {
    EngineError::UnsupportedExpression(format!("No symbolic integral for {}", expr))
}

fn integrate_node(expr: &Rc<Expr>, var: &str) -> CalcResult<Rc<Expr>> {
    // Anything constant in var integrates to c * x
    if !expr.free_vars().contains(var) {
        return Ok(ast::mul(expr.clone(), ast::var(var)));
    }
    match expr.as_ref() {
        Expr::Variable(_) => Ok(ast::div(
            ast::pow(ast::var(var), ast::num(2)),
            ast::num(2),
        )),
        Expr::Add(l, r) => Ok(ast::add(
            integrate_node(l, var)?,
            integrate_node(r, var)?,
        )),
        Expr::Sub(l, r) => Ok(ast::sub(
            integrate_node(l, var)?,
            integrate_node(r, var)?,
        )),
        Expr::Neg(e) => Ok(ast::neg(integrate_node(e, var)?)),
        Expr::Mul(l, r) => {
            // Pull the constant factor out; two var-dependent factors
            // are beyond the table
            if !l.free_vars().contains(var) {
                Ok(ast::mul(l.clone(), integrate_node(r, var)?))
            } else if !r.free_vars().contains(var) {
                Ok(ast::mul(r.clone(), integrate_node(l, var)?))
            } else {
                Err(unsupported(expr))
            }
        }
        Expr::Div(l, r) => {
            if !r.free_vars().contains(var) {
                return Ok(ast::div(integrate_node(l, var)?, r.clone()));
            }
            // c / (a*x + b) -> c/a * ln(a*x + b)
            if !l.free_vars().contains(var) {
                if let Some((a, _)) = linear_in(r, var) {
                    return Ok(ast::div(
                        ast::mul(l.clone(), ast::func("ln", vec![r.clone()])),
                        ast::ratio(a),
                    ));
                }
            }
            Err(unsupported(expr))
        }
        Expr::Pow(base, exp) => {
            let n = match exp.as_number() {
                Some(n) => n.clone(),
                None => return Err(unsupported(expr)),
            };
            let (a, _) = linear_in(base, var).ok_or_else(|| unsupported(expr))?;
            if n == -BigRational::one() {
                // u^-1 -> ln(u) / a
                return Ok(ast::div(
                    ast::func("ln", vec![base.clone()]),
                    ast::ratio(a),
                ));
            }
            // u^n -> u^(n+1) / (a * (n+1))
            let next = n + BigRational::one();
            Ok(ast::div(
                ast::pow(base.clone(), ast::ratio(next.clone())),
                ast::ratio(a * next),
            ))
        }
        Expr::Function(name, args) if args.len() == 1 => {
            integrate_function(expr, name, &args[0], var)
        }
        _ => Err(unsupported(expr)),
    }
}

fn integrate_function(
    whole: &Rc<Expr>,
    name: &str,
    inner: &Rc<Expr>,
    var: &str,
) -> CalcResult<Rc<Expr>> {
    let (a, _) = linear_in(inner, var).ok_or_else(|| unsupported(whole))?;
    let scale = ast::ratio(a);
    let out = match name {
        "sin" => ast::div(
            ast::neg(ast::func("cos", vec![inner.clone()])),
            scale,
        ),
        "cos" => ast::div(ast::func("sin", vec![inner.clone()]), scale),
        "exp" => ast::div(ast::func("exp", vec![inner.clone()]), scale),
        "sqrt" => {
            // (2/3) * u^(3/2) / a
            let three_halves = BigRational::new(3.into(), 2.into());
            let two_thirds = BigRational::new(2.into(), 3.into());
            ast::div(
                ast::mul(
                    ast::ratio(two_thirds),
                    ast::pow(inner.clone(), ast::ratio(three_halves)),
                ),
                scale,
            )
        }
        "ln" => {
            // (u ln u - u) / a
            ast::div(
                ast::sub(
                    ast::mul(inner.clone(), ast::func("ln", vec![inner.clone()])),
                    inner.clone(),
                ),
                scale,
            )
        }
        _ => return Err(unsupported(whole)),
    };
    Ok(out)
}

/// Recognize `a*x + b` in `var` with `a != 0`, returning `(a, b)`.
fn linear_in(expr: &Rc<Expr>, var: &str) -> Option<(BigRational, BigRational)> {
    fn walk(expr: &Expr, var: &str) -> Option<(BigRational, BigRational)> {
        match expr {
            Expr::Number(n) => Some((BigRational::zero(), n.clone())),
            Expr::Variable(name) if name == var => Some((BigRational::one(), BigRational::zero())),
            Expr::Variable(_) | Expr::Constant(_) => Some((BigRational::zero(), BigRational::zero())),
            Expr::Add(l, r) => {
                let (a1, b1) = walk(l, var)?;
                let (a2, b2) = walk(r, var)?;
                Some((a1 + a2, b1 + b2))
            }
            Expr::Sub(l, r) => {
                let (a1, b1) = walk(l, var)?;
                let (a2, b2) = walk(r, var)?;
                Some((a1 - a2, b1 - b2))
            }
            Expr::Neg(e) => {
                let (a, b) = walk(e, var)?;
                Some((-a, -b))
            }
            Expr::Mul(l, r) => {
                if let Some(n) = l.as_number() {
                    let (a, b) = walk(r, var)?;
                    return Some((n * a, n * b));
                }
                if let Some(n) = r.as_number() {
                    let (a, b) = walk(l, var)?;
                    return Some((n * a, n * b));
                }
                None
            }
            Expr::Div(l, r) => {
                let n = r.as_number()?;
                if n.is_zero() {
                    return None;
                }
                let (a, b) = walk(l, var)?;
                Some((a / n, b / n))
            }
            _ => None,
        }
    }
    let (a, b) = walk(expr, var)?;
    if a.is_zero() {
        None
    } else {
        Some((a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anti(input: &str, var: &str) -> String {
        antiderivative(&calc_parser::parse(input).unwrap(), var)
            .unwrap()
            .to_string()
    }

    #[test]
    fn power_rule() {
        assert_eq!(anti("x^2", "x"), "1/3 * x^3");
        assert_eq!(anti("y^2", "y"), "1/3 * y^3");
        assert_eq!(anti("x", "x"), "1/2 * x^2");
    }

    #[test]
    fn constants_and_sums() {
        assert_eq!(anti("3", "x"), "3 * x");
        assert_eq!(anti("2x + 1", "x"), "x^2 + x");
    }

    #[test]
    fn reciprocal_gives_log() {
        assert_eq!(anti("1/x", "x"), "ln(x)");
        assert_eq!(anti("x^(0-1)", "x"), "ln(x)");
    }

    #[test]
    fn elementary_functions_with_linear_inner() {
        assert_eq!(anti("cos(x)", "x"), "sin(x)");
        assert_eq!(anti("sin(2x)", "x"), "-1/2 * cos(2 * x)");
        assert_eq!(anti("exp(x)", "x"), "exp(x)");
    }

    #[test]
    fn log_integral() {
        assert_eq!(anti("ln(x)", "x"), "x * ln(x) - x");
    }

    #[test]
    fn rejects_products_of_the_variable() {
        let e = calc_parser::parse("x * sin(x)").unwrap();
        assert!(antiderivative(&e, "x").is_err());
    }

    #[test]
    fn linear_recognizer() {
        let e = calc_parser::parse("2x + 3").unwrap();
        let (a, b) = linear_in(&e, "x").unwrap();
        assert_eq!(a, BigRational::from_integer(2.into()));
        assert_eq!(b, BigRational::from_integer(3.into()));
        let e = calc_parser::parse("x^2").unwrap();
        assert!(linear_in(&e, "x").is_none());
    }
}
