//! Dense univariate polynomials over the rationals, backing partial
//! fraction decomposition.

use crate::util;
use calc_ast::{self as ast, Expr};
use calc_engine::simplify::simplify;
use calc_engine::{CalcResult, EngineError, EvalContext, Value};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::rc::Rc;

/// Coefficients in ascending order, no trailing zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct Poly(Vec<BigRational>);

impl Poly {
    pub fn new(mut coeffs: Vec<BigRational>) -> Self {
        while coeffs.last().map(|c| c.is_zero()).unwrap_or(false) {
            coeffs.pop();
        }
        Poly(coeffs)
    }

    pub fn zero() -> Self {
        Poly(Vec::new())
    }

    pub fn constant(c: BigRational) -> Self {
        Poly::new(vec![c])
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    pub fn degree(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    fn coeff(&self, i: usize) -> BigRational {
        self.0.get(i).cloned().unwrap_or_else(BigRational::zero)
    }

    pub fn eval(&self, x: &BigRational) -> BigRational {
        let mut acc = BigRational::zero();
        for c in self.0.iter().rev() {
            acc = acc * x + c;
        }
        acc
    }

    pub fn derivative(&self) -> Poly {
        let coeffs = self
            .0
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| c * BigRational::from_integer(BigInt::from(i)))
            .collect();
        Poly::new(coeffs)
    }

    fn add(&self, rhs: &Poly) -> Poly {
        let n = self.0.len().max(rhs.0.len());
        Poly::new((0..n).map(|i| self.coeff(i) + rhs.coeff(i)).collect())
    }

    fn sub(&self, rhs: &Poly) -> Poly {
        let n = self.0.len().max(rhs.0.len());
        Poly::new((0..n).map(|i| self.coeff(i) - rhs.coeff(i)).collect())
    }

    fn neg(&self) -> Poly {
        Poly::new(self.0.iter().map(|c| -c.clone()).collect())
    }

    fn mul(&self, rhs: &Poly) -> Poly {
        if self.is_zero() || rhs.is_zero() {
            return Poly::zero();
        }
        let mut out = vec![BigRational::zero(); self.0.len() + rhs.0.len() - 1];
        for (i, a) in self.0.iter().enumerate() {
            for (j, b) in rhs.0.iter().enumerate() {
                out[i + j] += a * b;
            }
        }
        Poly::new(out)
    }

    fn scale(&self, k: &BigRational) -> Poly {
        Poly::new(self.0.iter().map(|c| c * k).collect())
    }

    /// Polynomial long division: returns (quotient, remainder).
    pub fn div_rem(&self, den: &Poly) -> CalcResult<(Poly, Poly)> {
        if den.is_zero() {
            return Err(EngineError::InvalidArgument(
                "Cannot divide by the zero polynomial".to_string(),
            ));
        }
        let mut rem = self.clone();
        let mut quot = vec![BigRational::zero(); self.0.len()];
        let lead = den.0[den.0.len() - 1].clone();
        while !rem.is_zero() && rem.degree() >= den.degree() {
            let shift = rem.degree() - den.degree();
            let factor = rem.0[rem.0.len() - 1].clone() / lead.clone();
            quot[shift] = factor.clone();
            let mut scaled = vec![BigRational::zero(); shift];
            scaled.extend(den.0.iter().map(|c| c * &factor));
            rem = rem.sub(&Poly::new(scaled));
        }
        Ok((Poly::new(quot), rem))
    }

    /// Build a polynomial from an expression tree, failing on anything
    /// that is not polynomial in `var`.
    pub fn from_expr(expr: &Rc<Expr>, var: &str) -> CalcResult<Poly> {
        let not_poly = || {
            EngineError::UnsupportedExpression(format!(
                "{} is not a polynomial in {}",
                expr, var
            ))
        };
        match expr.as_ref() {
            Expr::Number(r) => Ok(Poly::constant(r.clone())),
            Expr::Variable(v) if v == var => {
                Ok(Poly::new(vec![BigRational::zero(), BigRational::one()]))
            }
            Expr::Add(a, b) => Ok(Poly::from_expr(a, var)?.add(&Poly::from_expr(b, var)?)),
            Expr::Sub(a, b) => Ok(Poly::from_expr(a, var)?.sub(&Poly::from_expr(b, var)?)),
            Expr::Neg(a) => Ok(Poly::from_expr(a, var)?.neg()),
            Expr::Mul(a, b) => Ok(Poly::from_expr(a, var)?.mul(&Poly::from_expr(b, var)?)),
            Expr::Div(a, b) => match b.as_ref() {
                Expr::Number(r) if !r.is_zero() => {
                    Ok(Poly::from_expr(a, var)?.scale(&r.recip()))
                }
                _ => Err(not_poly()),
            },
            Expr::Pow(base, exp) => {
                let k = exp
                    .as_number()
                    .filter(|e| e.is_integer() && !e.is_negative())
                    .and_then(|e| e.numer().to_u32())
                    .filter(|k| *k <= 64)
                    .ok_or_else(not_poly)?;
                let base = Poly::from_expr(base, var)?;
                let mut out = Poly::constant(BigRational::one());
                for _ in 0..k {
                    out = out.mul(&base);
                }
                Ok(out)
            }
            _ => Err(not_poly()),
        }
    }

    pub fn to_expr(&self, var: &str) -> Rc<Expr> {
        if self.is_zero() {
            return ast::num(0);
        }
        let mut acc: Option<Rc<Expr>> = None;
        for (i, c) in self.0.iter().enumerate().rev() {
            if c.is_zero() {
                continue;
            }
            let monomial = match i {
                0 => ast::ratio(c.clone()),
                1 => ast::mul(ast::ratio(c.clone()), ast::var(var)),
                _ => ast::mul(
                    ast::ratio(c.clone()),
                    ast::pow(ast::var(var), ast::num(i as i64)),
                ),
            };
            acc = Some(match acc {
                None => monomial,
                Some(prev) => ast::add(prev, monomial),
            });
        }
        simplify(&acc.unwrap_or_else(|| ast::num(0)))
    }

    /// All roots when every one of them is rational. Returns `None` as
    /// soon as an irrational or complex factor is left over.
    pub fn rational_roots(&self) -> Option<Vec<BigRational>> {
        let mut p = self.clone();
        let mut roots = Vec::new();
        while !p.is_zero() && p.0[0].is_zero() {
            roots.push(BigRational::zero());
            p.0.remove(0);
        }
        while p.degree() > 0 {
            let root = p.find_root()?;
            let divisor = Poly::new(vec![-root.clone(), BigRational::one()]);
            let (q, r) = p.div_rem(&divisor).ok()?;
            if !r.is_zero() {
                return None;
            }
            roots.push(root);
            p = q;
        }
        Some(roots)
    }

    // Rational root theorem over the integer-scaled coefficients.
    fn find_root(&self) -> Option<BigRational> {
        let mut lcm = BigInt::one();
        for c in &self.0 {
            lcm = lcm.lcm(c.denom());
        }
        let ints: Vec<BigInt> = self.0.iter().map(|c| (c * &lcm).to_integer()).collect();
        let a0 = ints.first()?.abs().to_i64()?;
        let an = ints.last()?.abs().to_i64()?;
        for p in divisors(a0) {
            for q in divisors(an) {
                for sign in [1i64, -1] {
                    let cand = BigRational::new(BigInt::from(sign * p), BigInt::from(q));
                    if self.eval(&cand).is_zero() {
                        return Some(cand);
                    }
                }
            }
        }
        None
    }
}

fn divisors(n: i64) -> Vec<i64> {
    let n = n.abs();
    let mut out = Vec::new();
    let mut i = 1;
    while i * i <= n {
        if n % i == 0 {
            out.push(i);
            if i != n / i {
                out.push(n / i);
            }
        }
        i += 1;
    }
    out.sort_unstable();
    out
}

/// Partial fraction decomposition over distinct rational linear
/// factors, with polynomial part split off for improper inputs.
pub fn partfrac(_ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("partfrac", args, 1, 2)?;
    let text = match args.first() {
        Some(Value::Str(s)) if !s.trim().is_empty() => s.clone(),
        _ => {
            return Err(EngineError::InvalidInput(
                "partfrac: Expression needs to be given".to_string(),
            ))
        }
    };
    let var = util::text_opt("partfrac", args, 1, "x")?;
    let parsed = calc_parser::parse(&text)?;
    let (num_e, den_e) = match parsed.as_ref() {
        Expr::Div(a, b) => (a, b),
        _ => {
            return Err(EngineError::UnsupportedExpression(
                "partfrac expects a rational function like (x + 1) / (x^2 - 1)".to_string(),
            ))
        }
    };
    let num = Poly::from_expr(num_e, &var)?;
    let den = Poly::from_expr(den_e, &var)?;
    if den.degree() == 0 {
        return Err(EngineError::UnsupportedExpression(
            "Denominator must not be constant".to_string(),
        ));
    }
    let (quotient, rem) = num.div_rem(&den)?;
    let roots = den.rational_roots().ok_or_else(|| {
        EngineError::UnsupportedExpression(
            "Denominator does not factor into rational linear factors".to_string(),
        )
    })?;
    for (i, a) in roots.iter().enumerate() {
        if roots[i + 1..].contains(a) {
            return Err(EngineError::UnsupportedExpression(
                "Denominator must have distinct linear factors".to_string(),
            ));
        }
    }

    let den_prime = den.derivative();
    let mut acc: Option<Rc<Expr>> = if quotient.is_zero() {
        None
    } else {
        Some(quotient.to_expr(&var))
    };
    for root in &roots {
        let residue = rem.eval(root) / den_prime.eval(root);
        if residue.is_zero() {
            continue;
        }
        let linear = if root.is_zero() {
            ast::var(&var)
        } else if root.is_negative() {
            ast::add(ast::var(&var), ast::ratio(-root.clone()))
        } else {
            ast::sub(ast::var(&var), ast::ratio(root.clone()))
        };
        let term = ast::div(ast::ratio(residue.abs()), linear);
        acc = Some(match acc {
            None if residue.is_negative() => ast::neg(term),
            None => term,
            Some(prev) if residue.is_negative() => ast::sub(prev, term),
            Some(prev) => ast::add(prev, term),
        });
    }
    Ok(Value::Symbolic(acc.unwrap_or_else(|| ast::num(0))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_engine::{builtins, AngleMode, Registry};
    use calc_num::NumericMode;
    use std::time::Duration;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn run(input: &str) -> String {
        let mut reg = Registry::new();
        builtins::register(&mut reg);
        let mut ctx = EvalContext::new(
            NumericMode::Float,
            AngleMode::Radians,
            Duration::from_secs(5),
            &reg,
        );
        partfrac(&mut ctx, &[Value::Str(input.to_string())])
            .map(|v| v.to_string())
            .unwrap_or_else(|e| format!("error: {}", e))
    }

    #[test]
    fn from_expr_round_trips() {
        let e = calc_parser::parse("x^2 + 3x + 2").unwrap();
        let p = Poly::from_expr(&e, "x").unwrap();
        assert_eq!(p.degree(), 2);
        assert_eq!(p.eval(&rat(2)), rat(12));
    }

    #[test]
    fn long_division() {
        let num = Poly::from_expr(&calc_parser::parse("x^3 - 1").unwrap(), "x").unwrap();
        let den = Poly::from_expr(&calc_parser::parse("x - 1").unwrap(), "x").unwrap();
        let (q, r) = num.div_rem(&den).unwrap();
        assert!(r.is_zero());
        assert_eq!(q.eval(&rat(3)), rat(13));
    }

    #[test]
    fn rational_roots_of_factorable_poly() {
        let p = Poly::from_expr(&calc_parser::parse("x^2 + 3x + 2").unwrap(), "x").unwrap();
        let mut roots = p.rational_roots().unwrap();
        roots.sort();
        assert_eq!(roots, vec![rat(-2), rat(-1)]);
        let irred = Poly::from_expr(&calc_parser::parse("x^2 + 1").unwrap(), "x").unwrap();
        assert!(irred.rational_roots().is_none());
    }

    #[test]
    fn partfrac_distinct_linear_factors() {
        assert_eq!(run("1/(x^2 - 1)"), "1/2 / (x - 1) - 1/2 / (x + 1)");
        assert_eq!(run("(3x + 5)/(x^2 + 3x + 2)"), "2 / (x + 1) + 1 / (x + 2)");
    }

    #[test]
    fn partfrac_improper_fraction_keeps_polynomial_part() {
        assert_eq!(run("x^2/(x - 1)"), "x + 1 + 1 / (x - 1)");
    }

    #[test]
    fn partfrac_rejects_irrational_and_repeated_factors() {
        assert!(run("1/(x^2 + 1)").starts_with("error:"));
        assert!(run("1/(x^2 + 2x + 1)").starts_with("error:"));
        assert!(run("x + 1").starts_with("error:"));
    }
}
