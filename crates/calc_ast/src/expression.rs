use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// Named mathematical constants understood by the parser and evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    Pi,
    E,
    Tau,
}

impl Constant {
    pub fn name(self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "e",
            Constant::Tau => "tau",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" | "PI" | "π" => Some(Constant::Pi),
            "e" => Some(Constant::E),
            "tau" | "τ" => Some(Constant::Tau),
            _ => None,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Expression tree node. Numbers are exact rationals so that decimal
/// literals survive parsing without rounding.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(BigRational),
    Constant(Constant),
    Variable(String),
    Str(String),
    Add(Rc<Expr>, Rc<Expr>),
    Sub(Rc<Expr>, Rc<Expr>),
    Mul(Rc<Expr>, Rc<Expr>),
    Div(Rc<Expr>, Rc<Expr>),
    Pow(Rc<Expr>, Rc<Expr>),
    Neg(Rc<Expr>),
    Factorial(Rc<Expr>),
    Function(String, Vec<Rc<Expr>>),
    /// Row-major matrix literal. A flat list parses as a single row.
    Matrix(Vec<Vec<Rc<Expr>>>),
}

pub fn num(n: i64) -> Rc<Expr> {
    Rc::new(Expr::Number(BigRational::from_integer(BigInt::from(n))))
}

pub fn ratio(n: BigRational) -> Rc<Expr> {
    Rc::new(Expr::Number(n))
}

pub fn var(name: &str) -> Rc<Expr> {
    Rc::new(Expr::Variable(name.to_string()))
}

pub fn add(lhs: Rc<Expr>, rhs: Rc<Expr>) -> Rc<Expr> {
    Rc::new(Expr::Add(lhs, rhs))
}

pub fn sub(lhs: Rc<Expr>, rhs: Rc<Expr>) -> Rc<Expr> {
    Rc::new(Expr::Sub(lhs, rhs))
}

pub fn mul(lhs: Rc<Expr>, rhs: Rc<Expr>) -> Rc<Expr> {
    Rc::new(Expr::Mul(lhs, rhs))
}

pub fn div(lhs: Rc<Expr>, rhs: Rc<Expr>) -> Rc<Expr> {
    Rc::new(Expr::Div(lhs, rhs))
}

pub fn pow(base: Rc<Expr>, exp: Rc<Expr>) -> Rc<Expr> {
    Rc::new(Expr::Pow(base, exp))
}

pub fn neg(expr: Rc<Expr>) -> Rc<Expr> {
    Rc::new(Expr::Neg(expr))
}

pub fn func(name: &str, args: Vec<Rc<Expr>>) -> Rc<Expr> {
    Rc::new(Expr::Function(name.to_string(), args))
}

impl Expr {
    /// Extract an exact number if this node is a literal.
    pub fn as_number(&self) -> Option<&BigRational> {
        match self {
            Expr::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Number(n) if n.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Number(n) if n.is_one())
    }

    /// Collect the set of unbound variable names, sorted.
    pub fn free_vars(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        self.collect_vars(&mut vars);
        vars
    }

    fn collect_vars(&self, vars: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) | Expr::Constant(_) | Expr::Str(_) => {}
            Expr::Variable(name) => {
                vars.insert(name.clone());
            }
            Expr::Add(l, r)
            | Expr::Sub(l, r)
            | Expr::Mul(l, r)
            | Expr::Div(l, r)
            | Expr::Pow(l, r) => {
                l.collect_vars(vars);
                r.collect_vars(vars);
            }
            Expr::Neg(e) | Expr::Factorial(e) => e.collect_vars(vars),
            Expr::Function(_, args) => {
                for arg in args {
                    arg.collect_vars(vars);
                }
            }
            Expr::Matrix(rows) => {
                for row in rows {
                    for cell in row {
                        cell.collect_vars(vars);
                    }
                }
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            // Unary minus binds looser than * and /: -1/x^2 is -(1/x^2)
            Expr::Add(_, _) | Expr::Sub(_, _) | Expr::Neg(_) => 1,
            Expr::Mul(_, _) | Expr::Div(_, _) => 2,
            Expr::Pow(_, _) => 4,
            // Negative or fractional literals need parens in tighter contexts
            Expr::Number(n) => {
                if n.is_negative() {
                    1
                } else if !n.is_integer() {
                    2
                } else {
                    5
                }
            }
            _ => 5,
        }
    }
}

fn fmt_child(f: &mut fmt::Formatter<'_>, child: &Expr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({})", child)
    } else {
        write!(f, "{}", child)
    }
}

fn fmt_number(f: &mut fmt::Formatter<'_>, n: &BigRational) -> fmt::Result {
    if n.is_integer() {
        write!(f, "{}", n.numer())
    } else {
        write!(f, "{}/{}", n.numer(), n.denom())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = self.precedence();
        match self {
            Expr::Number(n) => fmt_number(f, n),
            Expr::Constant(c) => write!(f, "{}", c),
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::Str(s) => write!(f, "\"{}\"", s),
            Expr::Add(l, r) => {
                fmt_child(f, l, l.precedence() < prec)?;
                write!(f, " + ")?;
                fmt_child(f, r, r.precedence() < prec)
            }
            Expr::Sub(l, r) => {
                fmt_child(f, l, l.precedence() < prec)?;
                write!(f, " - ")?;
                // Right side needs parens at equal precedence: a - (b - c)
                fmt_child(f, r, r.precedence() <= prec)
            }
            Expr::Mul(l, r) => {
                fmt_child(f, l, l.precedence() < prec)?;
                write!(f, " * ")?;
                fmt_child(f, r, r.precedence() < prec)
            }
            Expr::Div(l, r) => {
                fmt_child(f, l, l.precedence() < prec)?;
                write!(f, " / ")?;
                fmt_child(f, r, r.precedence() <= prec)
            }
            Expr::Pow(b, e) => {
                // Power is right-associative; base needs parens at equal precedence
                fmt_child(f, b, b.precedence() <= prec)?;
                write!(f, "^")?;
                fmt_child(f, e, e.precedence() < prec)
            }
            Expr::Neg(e) => {
                write!(f, "-")?;
                fmt_child(f, e, e.precedence() < prec)
            }
            Expr::Factorial(e) => {
                fmt_child(f, e, e.precedence() < 5)?;
                write!(f, "!")
            }
            Expr::Function(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Matrix(rows) => {
                if rows.len() == 1 {
                    write!(f, "[")?;
                    for (i, cell) in rows[0].iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", cell)?;
                    }
                    return write!(f, "]");
                }
                write!(f, "[")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "[")?;
                    for (j, cell) in row.iter().enumerate() {
                        if j > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", cell)?;
                    }
                    write!(f, "]")?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_respects_precedence() {
        let e = add(num(1), mul(var("x"), num(2)));
        assert_eq!(format!("{}", e), "1 + x * 2");

        let e = pow(add(var("a"), var("b")), num(2));
        assert_eq!(format!("{}", e), "(a + b)^2");

        let e = mul(num(2), add(var("x"), num(1)));
        assert_eq!(format!("{}", e), "2 * (x + 1)");
    }

    #[test]
    fn display_subtraction_right_parens() {
        let e = sub(var("a"), sub(var("b"), var("c")));
        assert_eq!(format!("{}", e), "a - (b - c)");
    }

    #[test]
    fn display_fraction_in_product() {
        let third = BigRational::new(BigInt::from(1), BigInt::from(3));
        let e = mul(ratio(third), pow(var("y"), num(3)));
        assert_eq!(format!("{}", e), "1/3 * y^3");
    }

    #[test]
    fn free_vars_sorted_and_deduped() {
        let e = add(
            mul(var("y"), var("x")),
            func("sin", vec![var("x")]),
        );
        let vars: Vec<String> = e.free_vars().into_iter().collect();
        assert_eq!(vars, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn constants_round_trip_names() {
        assert_eq!(Constant::from_name("pi"), Some(Constant::Pi));
        assert_eq!(Constant::from_name("tau"), Some(Constant::Tau));
        assert_eq!(Constant::from_name("nope"), None);
        assert_eq!(Constant::Pi.to_string(), "pi");
    }
}
