//! Light algebraic cleanup for symbolic results.
//!
//! This is a presentation pass, not a full rewrite system: it folds
//! constants, flattens sum and product chains, combines like terms and
//! drops identity elements, which is enough to turn raw derivative
//! output like `1 * 5 * x^(5 - 1) + (0 * x + 2 * 1)` into
//! `5 * x^4 + 2`.

use calc_ast::{self as ast, Expr};
use num_rational::BigRational;
use num_traits::{One, Pow, Signed, ToPrimitive, Zero};
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Simplify a tree bottom-up.
pub fn simplify(expr: &Rc<Expr>) -> Rc<Expr> {
    match expr.as_ref() {
        Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) | Expr::Str(_) => expr.clone(),
        Expr::Add(_, _) | Expr::Sub(_, _) => simplify_sum(expr),
        Expr::Mul(_, _) => simplify_product(expr),
        Expr::Div(l, r) => simplify_div(&simplify(l), &simplify(r)),
        Expr::Pow(b, e) => simplify_pow(&simplify(b), &simplify(e)),
        Expr::Neg(e) => simplify_neg(&simplify(e)),
        Expr::Factorial(e) => Rc::new(Expr::Factorial(simplify(e))),
        Expr::Function(name, args) => ast::func(name, args.iter().map(simplify).collect()),
        Expr::Matrix(rows) => Rc::new(Expr::Matrix(
            rows.iter()
                .map(|row| row.iter().map(simplify).collect())
                .collect(),
        )),
    }
}

fn rational(n: BigRational) -> Rc<Expr> {
    ast::ratio(n)
}

fn simplify_neg(inner: &Rc<Expr>) -> Rc<Expr> {
    match inner.as_ref() {
        Expr::Number(n) => rational(-n.clone()),
        Expr::Neg(e) => e.clone(),
        _ => ast::neg(inner.clone()),
    }
}

// ---- sums ----------------------------------------------------------------

/// One additive term: `coeff * core`, where `core == None` is the
/// constant part.
struct Term {
    coeff: BigRational,
    core: Option<Rc<Expr>>,
}

fn collect_terms(expr: &Rc<Expr>, negate: bool, out: &mut Vec<Term>) {
    match expr.as_ref() {
        Expr::Add(l, r) => {
            collect_terms(l, negate, out);
            collect_terms(r, negate, out);
        }
        Expr::Sub(l, r) => {
            collect_terms(l, negate, out);
            collect_terms(r, !negate, out);
        }
        _ => {
            let simplified = simplify(expr);
            // A nested sum can reappear after simplification
            if matches!(simplified.as_ref(), Expr::Add(_, _) | Expr::Sub(_, _)) {
                collect_terms(&simplified, negate, out);
                return;
            }
            let mut term = split_term(&simplified);
            if negate {
                term.coeff = -term.coeff;
            }
            out.push(term);
        }
    }
}

fn split_term(expr: &Rc<Expr>) -> Term {
    match expr.as_ref() {
        Expr::Number(n) => Term {
            coeff: n.clone(),
            core: None,
        },
        Expr::Neg(e) => {
            let inner = split_term(e);
            Term {
                coeff: -inner.coeff,
                core: inner.core,
            }
        }
        Expr::Mul(l, r) => {
            if let Expr::Number(n) = l.as_ref() {
                let inner = split_term(r);
                return Term {
                    coeff: n.clone() * inner.coeff,
                    core: inner.core,
                };
            }
            Term {
                coeff: BigRational::one(),
                core: Some(expr.clone()),
            }
        }
        _ => Term {
            coeff: BigRational::one(),
            core: Some(expr.clone()),
        },
    }
}

fn simplify_sum(expr: &Rc<Expr>) -> Rc<Expr> {
    let mut raw = Vec::new();
    collect_terms(expr, false, &mut raw);

    // Combine like terms, keyed by the core's rendering
    let mut constant = BigRational::zero();
    let mut order: Vec<(BigRational, Rc<Expr>)> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    for term in raw {
        match term.core {
            None => constant += term.coeff,
            Some(core) => {
                let key = core.to_string();
                match index.get(&key) {
                    Some(&i) => order[i].0 += term.coeff,
                    None => {
                        index.insert(key, order.len());
                        order.push((term.coeff, core));
                    }
                }
            }
        }
    }
    order.retain(|(c, _)| !c.is_zero());

    if order.is_empty() {
        return rational(constant);
    }

    let mut acc = term_expr(&order[0].0, &order[0].1);
    for (coeff, core) in &order[1..] {
        if coeff.is_negative() {
            acc = ast::sub(acc, term_expr(&-coeff.clone(), core));
        } else {
            acc = ast::add(acc, term_expr(coeff, core));
        }
    }
    if !constant.is_zero() {
        if constant.is_negative() {
            acc = ast::sub(acc, rational(-constant));
        } else {
            acc = ast::add(acc, rational(constant));
        }
    }
    acc
}

fn term_expr(coeff: &BigRational, core: &Rc<Expr>) -> Rc<Expr> {
    if coeff.is_one() {
        return core.clone();
    }
    if coeff.is_negative() {
        let pos = -coeff.clone();
        if pos.is_one() {
            return ast::neg(core.clone());
        }
        return ast::neg(ast::mul(rational(pos), core.clone()));
    }
    ast::mul(rational(coeff.clone()), core.clone())
}

// ---- products ------------------------------------------------------------

fn collect_factors(expr: &Rc<Expr>, coeff: &mut BigRational, out: &mut Vec<Rc<Expr>>) {
    match expr.as_ref() {
        Expr::Mul(l, r) => {
            collect_factors(l, coeff, out);
            collect_factors(r, coeff, out);
        }
        _ => {
            let simplified = simplify(expr);
            match simplified.as_ref() {
                Expr::Mul(_, _) => collect_factors(&simplified, coeff, out),
                Expr::Number(n) => *coeff *= n.clone(),
                Expr::Neg(e) => {
                    *coeff = -coeff.clone();
                    collect_factors(e, coeff, out);
                }
                _ => out.push(simplified),
            }
        }
    }
}

fn simplify_product(expr: &Rc<Expr>) -> Rc<Expr> {
    let mut coeff = BigRational::one();
    let mut factors = Vec::new();
    collect_factors(expr, &mut coeff, &mut factors);
    if coeff.is_zero() {
        return ast::num(0);
    }

    // Merge repeated bases: x * x^2 -> x^3
    let mut order: Vec<(Rc<Expr>, BigRational)> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    for factor in factors {
        let (base, exp) = match factor.as_ref() {
            Expr::Pow(b, e) => match e.as_number() {
                Some(n) => (b.clone(), n.clone()),
                None => (factor.clone(), BigRational::one()),
            },
            _ => (factor.clone(), BigRational::one()),
        };
        let key = base.to_string();
        match index.get(&key) {
            Some(&i) => order[i].1 += exp,
            None => {
                index.insert(key, order.len());
                order.push((base, exp));
            }
        }
    }

    let mut product: Option<Rc<Expr>> = None;
    for (base, exp) in order {
        if exp.is_zero() {
            continue;
        }
        let factor = if exp.is_one() {
            base
        } else {
            simplify_pow(&base, &rational(exp))
        };
        product = Some(match product {
            Some(acc) => ast::mul(acc, factor),
            None => factor,
        });
    }

    match product {
        None => rational(coeff),
        Some(p) => {
            if coeff.is_one() {
                p
            } else if coeff.is_negative() {
                let pos = -coeff.clone();
                if pos.is_one() {
                    ast::neg(p)
                } else {
                    ast::neg(ast::mul(rational(pos), p))
                }
            } else {
                ast::mul(rational(coeff), p)
            }
        }
    }
}

// ---- division and powers -------------------------------------------------

fn simplify_div(num: &Rc<Expr>, den: &Rc<Expr>) -> Rc<Expr> {
    if den.is_one() {
        return num.clone();
    }
    if let (Some(a), Some(b)) = (num.as_number(), den.as_number()) {
        if !b.is_zero() {
            return rational(a / b);
        }
    }
    if num.is_zero() && !den.is_zero() {
        return ast::num(0);
    }
    // Numeric denominator becomes a leading coefficient: x^3 / 3 -> 1/3 * x^3
    if let Some(b) = den.as_number() {
        if !b.is_zero() {
            return simplify(&ast::mul(rational(b.recip()), num.clone()));
        }
    }
    if let Expr::Number(n) = num.as_ref() {
        if n.is_negative() {
            return ast::neg(ast::div(rational(-n.clone()), den.clone()));
        }
    }
    ast::div(num.clone(), den.clone())
}

fn simplify_pow(base: &Rc<Expr>, exp: &Rc<Expr>) -> Rc<Expr> {
    if exp.is_one() {
        return base.clone();
    }
    if exp.is_zero() && !base.is_zero() {
        return ast::num(1);
    }
    if base.is_zero() || base.is_one() {
        return base.clone();
    }
    if let (Some(b), Some(e)) = (base.as_number(), exp.as_number()) {
        if e.is_integer() {
            if let Some(e32) = e.numer().to_i32().filter(|k| k.abs() <= 64) {
                if !(b.is_zero() && e32 < 0) {
                    return rational(Pow::pow(b, e32));
                }
            }
        }
    }
    ast::pow(base.clone(), exp.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn s(input: &str) -> String {
        simplify(&calc_parser::parse(input).unwrap()).to_string()
    }

    #[test]
    fn folds_constants() {
        assert_eq!(s("1 + 2 * 3"), "7");
        assert_eq!(s("2^10 / 4"), "256");
        assert_eq!(s("5 - 5"), "0");
    }

    #[test]
    fn drops_identities() {
        assert_eq!(s("x + 0"), "x");
        assert_eq!(s("1 * x"), "x");
        assert_eq!(s("x^1"), "x");
        assert_eq!(s("x * 0"), "0");
        assert_eq!(s("0 / x"), "0");
    }

    #[test]
    fn combines_like_terms() {
        assert_eq!(s("x + x"), "2 * x");
        assert_eq!(s("3x^2 + 2x^2 - x^2"), "4 * x^2");
        assert_eq!(s("x - x"), "0");
    }

    #[test]
    fn merges_repeated_factors() {
        assert_eq!(s("x * x"), "x^2");
        assert_eq!(s("x * x^2"), "x^3");
        assert_eq!(s("x^2 / 1"), "x^2");
    }

    #[test]
    fn coefficient_comes_first() {
        assert_eq!(s("x * 3"), "3 * x");
        assert_eq!(s("sin(x) * 2"), "2 * sin(x)");
    }

    #[test]
    fn negative_terms_render_as_subtraction() {
        assert_eq!(s("x^2 + (0 - 2) * x"), "x^2 - 2 * x");
    }

    #[test]
    fn leaves_opaque_structure_alone() {
        assert_eq!(s("sin(x) + cos(x)"), "sin(x) + cos(x)");
        assert_eq!(s("x / y"), "x / y");
    }

    #[test]
    fn fractional_coefficients_survive() {
        let third = BigRational::new(BigInt::from(1), BigInt::from(3));
        let e = ast::mul(ast::ratio(third), ast::pow(ast::var("y"), ast::num(3)));
        assert_eq!(simplify(&e).to_string(), "1/3 * y^3");
    }
}
