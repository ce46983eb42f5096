use calc_ast::Expr;
use calc_num::Numeric;
use std::fmt;
use std::rc::Rc;

/// Result of evaluating one expression.
///
/// Immutable once produced; the executor derives display HTML from it
/// and the most recent numeric-like value becomes `Ans`.
#[derive(Debug, Clone)]
pub enum Value {
    Number(Numeric),
    Str(String),
    /// Symbolic result (indefinite integral, unevaluated derivative)
    Symbolic(Rc<Expr>),
    Matrix(Vec<Vec<Numeric>>),
    /// Key/value result rendered as a two-column table
    Record(Vec<(String, String)>),
    /// A bare reference to a registered function
    Function(&'static str),
}

impl Value {
    pub fn number(n: Numeric) -> Self {
        Value::Number(n)
    }

    pub fn as_number(&self) -> Option<&Numeric> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Row vector helper used by gradient/curl.
    pub fn row(values: Vec<Numeric>) -> Self {
        Value::Matrix(vec![values])
    }

    pub fn is_numeric_like(&self) -> bool {
        matches!(self, Value::Number(_) | Value::Matrix(_))
    }
}

impl fmt::Display for Value {
    /// Plain (non-HTML) serialization. For numbers this is the exact
    /// round-trip form that `Ans` substitution relies on.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Symbolic(e) => write!(f, "{}", e),
            Value::Matrix(rows) => {
                if rows.len() == 1 {
                    write!(f, "[")?;
                    for (i, n) in rows[0].iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", n)?;
                    }
                    return write!(f, "]");
                }
                write!(f, "[")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "[")?;
                    for (j, n) in row.iter().enumerate() {
                        if j > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", n)?;
                    }
                    write!(f, "]")?;
                }
                write!(f, "]")
            }
            Value::Record(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Function(name) => write!(f, "function {}", name),
        }
    }
}
