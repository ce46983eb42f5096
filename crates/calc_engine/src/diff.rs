//! Symbolic differentiation over the expression tree.
//!
//! Produces an unsimplified derivative; callers run [`crate::simplify`]
//! on the result before display. Functions outside the rule table raise
//! `UnsupportedExpression` so the caller can fall back to a numeric
//! difference quotient.

use crate::error::{CalcResult, EngineError};
use calc_ast::{self as ast, Expr};
use std::rc::Rc;

/// d(expr)/d(var), as a new tree.
pub fn derivative(expr: &Rc<Expr>, var: &str) -> CalcResult<Rc<Expr>> {
    match expr.as_ref() {
        Expr::Number(_) | Expr::Constant(_) => Ok(ast::num(0)),
        Expr::Variable(name) => {
            if name == var {
                Ok(ast::num(1))
            } else {
                Ok(ast::num(0))
            }
        }
        Expr::Add(l, r) => Ok(ast::add(derivative(l, var)?, derivative(r, var)?)),
        Expr::Sub(l, r) => Ok(ast::sub(derivative(l, var)?, derivative(r, var)?)),
        Expr::Neg(e) => Ok(ast::neg(derivative(e, var)?)),
        Expr::Mul(l, r) => {
            // (uv)' = u'v + uv'
            let du = derivative(l, var)?;
            let dv = derivative(r, var)?;
            Ok(ast::add(
                ast::mul(du, r.clone()),
                ast::mul(l.clone(), dv),
            ))
        }
        Expr::Div(l, r) => {
            // (u/v)' = (u'v - uv') / v^2
            let du = derivative(l, var)?;
            let dv = derivative(r, var)?;
            Ok(ast::div(
                ast::sub(ast::mul(du, r.clone()), ast::mul(l.clone(), dv)),
                ast::pow(r.clone(), ast::num(2)),
            ))
        }
        Expr::Pow(base, exp) => pow_rule(base, exp, var),
        Expr::Function(name, args) => function_rule(name, args, var),
        Expr::Str(_) | Expr::Factorial(_) | Expr::Matrix(_) => Err(
            EngineError::UnsupportedExpression(format!(
                "Cannot differentiate {}",
                expr
            )),
        ),
    }
}

fn depends_on(expr: &Expr, var: &str) -> bool {
    expr.free_vars().contains(var)
}

fn pow_rule(base: &Rc<Expr>, exp: &Rc<Expr>, var: &str) -> CalcResult<Rc<Expr>> {
    let base_dep = depends_on(base, var);
    let exp_dep = depends_on(exp, var);
    if !base_dep && !exp_dep {
        return Ok(ast::num(0));
    }
    if base_dep && !exp_dep {
        // power rule: n * u^(n-1) * u'
        let du = derivative(base, var)?;
        return Ok(ast::mul(
            ast::mul(
                exp.clone(),
                ast::pow(base.clone(), ast::sub(exp.clone(), ast::num(1))),
            ),
            du,
        ));
    }
    if !base_dep && exp_dep {
        // a^v: a^v * ln(a) * v'
        let dv = derivative(exp, var)?;
        return Ok(ast::mul(
            ast::mul(
                ast::pow(base.clone(), exp.clone()),
                ast::func("ln", vec![base.clone()]),
            ),
            dv,
        ));
    }
    // u^v: u^v * (v' ln u + v u' / u)
    let du = derivative(base, var)?;
    let dv = derivative(exp, var)?;
    Ok(ast::mul(
        ast::pow(base.clone(), exp.clone()),
        ast::add(
            ast::mul(dv, ast::func("ln", vec![base.clone()])),
            ast::div(ast::mul(exp.clone(), du), base.clone()),
        ),
    ))
}

fn function_rule(name: &str, args: &[Rc<Expr>], var: &str) -> CalcResult<Rc<Expr>> {
    if args.len() != 1 {
        return Err(EngineError::UnsupportedExpression(format!(
            "Function {} is not supported by derivative",
            name
        )));
    }
    let u = &args[0];
    let du = derivative(u, var)?;
    let outer = match name {
        "sin" => ast::func("cos", vec![u.clone()]),
        "cos" => ast::neg(ast::func("sin", vec![u.clone()])),
        "tan" => ast::div(
            ast::num(1),
            ast::pow(ast::func("cos", vec![u.clone()]), ast::num(2)),
        ),
        "sinh" => ast::func("cosh", vec![u.clone()]),
        "cosh" => ast::func("sinh", vec![u.clone()]),
        "tanh" => ast::div(
            ast::num(1),
            ast::pow(ast::func("cosh", vec![u.clone()]), ast::num(2)),
        ),
        "asin" => ast::div(
            ast::num(1),
            ast::func(
                "sqrt",
                vec![ast::sub(ast::num(1), ast::pow(u.clone(), ast::num(2)))],
            ),
        ),
        "acos" => ast::neg(ast::div(
            ast::num(1),
            ast::func(
                "sqrt",
                vec![ast::sub(ast::num(1), ast::pow(u.clone(), ast::num(2)))],
            ),
        )),
        "atan" => ast::div(
            ast::num(1),
            ast::add(ast::num(1), ast::pow(u.clone(), ast::num(2))),
        ),
        "ln" | "log" => ast::div(ast::num(1), u.clone()),
        "log2" => ast::div(
            ast::num(1),
            ast::mul(u.clone(), ast::func("ln", vec![ast::num(2)])),
        ),
        "log10" => ast::div(
            ast::num(1),
            ast::mul(u.clone(), ast::func("ln", vec![ast::num(10)])),
        ),
        "exp" => ast::func("exp", vec![u.clone()]),
        "sqrt" => ast::div(
            ast::num(1),
            ast::mul(ast::num(2), ast::func("sqrt", vec![u.clone()])),
        ),
        _ => {
            return Err(EngineError::UnsupportedExpression(format!(
                "Function {} is not supported by derivative",
                name
            )))
        }
    };
    Ok(ast::mul(outer, du))
}
