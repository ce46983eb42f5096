//! Tagged-union numeric value used everywhere the calculator computes.
//!
//! The session's numeric mode picks the representation at construction
//! time: `Float` mode builds machine floats, `Big` and `Rational` modes
//! build exact rationals (they differ only in how results are printed).
//! Arithmetic dispatches on the variant pair in one place instead of
//! per-call-site type inspection.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{FromPrimitive, One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;

/// How the session represents and prints numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericMode {
    /// Machine `f64`
    Float,
    /// Exact rational arithmetic, printed as a decimal expansion with
    /// this many significant digits
    Big { precision: u32 },
    /// Exact rational arithmetic, printed as a fraction
    Rational,
}

impl Default for NumericMode {
    fn default() -> Self {
        NumericMode::Float
    }
}

impl NumericMode {
    pub fn is_exact(self) -> bool {
        !matches!(self, NumericMode::Float)
    }

    /// Wrap a float into this mode's representation.
    pub fn from_f64(self, f: f64) -> Numeric {
        match self {
            NumericMode::Float => Numeric::Float(f),
            _ => BigRational::from_float(f)
                .map(Numeric::Exact)
                .unwrap_or(Numeric::Float(f)),
        }
    }

    pub fn from_rational(self, r: BigRational) -> Numeric {
        match self {
            NumericMode::Float => Numeric::Float(rational_to_f64(&r)),
            _ => Numeric::Exact(r),
        }
    }
}

/// A number: either a machine float or an exact big rational.
#[derive(Debug, Clone)]
pub enum Numeric {
    Float(f64),
    Exact(BigRational),
}

pub(crate) fn rational_to_f64(r: &BigRational) -> f64 {
    r.to_f64().unwrap_or_else(|| {
        // Magnitude overflow: fall back to the sign-appropriate infinity
        if r.is_negative() {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        }
    })
}

impl Numeric {
    pub fn int(n: i64) -> Self {
        Numeric::Exact(BigRational::from_integer(BigInt::from(n)))
    }

    pub fn zero() -> Self {
        Numeric::Exact(BigRational::zero())
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Numeric::Float(f) => *f,
            Numeric::Exact(r) => rational_to_f64(r),
        }
    }

    /// Exact view, lifting floats when they are finite.
    pub fn to_exact(&self) -> Option<BigRational> {
        match self {
            Numeric::Float(f) => BigRational::from_float(*f),
            Numeric::Exact(r) => Some(r.clone()),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Numeric::Float(f) => *f == 0.0,
            Numeric::Exact(r) => r.is_zero(),
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Numeric::Float(f) => *f < 0.0,
            Numeric::Exact(r) => r.is_negative(),
        }
    }

    pub fn is_integer(&self) -> bool {
        match self {
            Numeric::Float(f) => f.fract() == 0.0 && f.is_finite(),
            Numeric::Exact(r) => r.is_integer(),
        }
    }

    /// Integer view for argument validation (`Some` only when whole).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Numeric::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Numeric::Exact(r) if r.is_integer() => r.numer().to_i64(),
            _ => None,
        }
    }

    pub fn abs(&self) -> Numeric {
        match self {
            Numeric::Float(f) => Numeric::Float(f.abs()),
            Numeric::Exact(r) => Numeric::Exact(r.abs()),
        }
    }

    pub fn neg(&self) -> Numeric {
        match self {
            Numeric::Float(f) => Numeric::Float(-f),
            Numeric::Exact(r) => Numeric::Exact(-r.clone()),
        }
    }

    fn binary(
        &self,
        rhs: &Numeric,
        ff: impl Fn(f64, f64) -> f64,
        ee: impl Fn(&BigRational, &BigRational) -> BigRational,
    ) -> Numeric {
        match (self, rhs) {
            (Numeric::Exact(a), Numeric::Exact(b)) => Numeric::Exact(ee(a, b)),
            _ => Numeric::Float(ff(self.to_f64(), rhs.to_f64())),
        }
    }

    pub fn add(&self, rhs: &Numeric) -> Numeric {
        self.binary(rhs, |a, b| a + b, |a, b| a + b)
    }

    pub fn sub(&self, rhs: &Numeric) -> Numeric {
        self.binary(rhs, |a, b| a - b, |a, b| a - b)
    }

    pub fn mul(&self, rhs: &Numeric) -> Numeric {
        self.binary(rhs, |a, b| a * b, |a, b| a * b)
    }

    /// Division. Exact division by zero degrades to float semantics
    /// (signed infinity / NaN) rather than erroring, matching the
    /// float path.
    pub fn div(&self, rhs: &Numeric) -> Numeric {
        if rhs.is_zero() {
            return Numeric::Float(self.to_f64() / rhs.to_f64());
        }
        self.binary(rhs, |a, b| a / b, |a, b| a / b)
    }

    pub fn rem(&self, rhs: &Numeric) -> Numeric {
        if rhs.is_zero() {
            return Numeric::Float(f64::NAN);
        }
        self.binary(rhs, |a, b| a.rem_euclid(b), |a, b| {
            let q = (a / b).floor();
            a - b * q
        })
    }

    /// Power. Stays exact for integer exponents of exact bases within
    /// `i32` range; everything else goes through floats.
    pub fn pow(&self, rhs: &Numeric) -> Numeric {
        if let (Numeric::Exact(base), Some(exp)) = (self, rhs.as_i64()) {
            if let Ok(exp) = i32::try_from(exp) {
                if !(base.is_zero() && exp < 0) {
                    return Numeric::Exact(base.pow(exp));
                }
            }
        }
        Numeric::Float(self.to_f64().powf(rhs.to_f64()))
    }

    pub fn compare(&self, rhs: &Numeric) -> Option<Ordering> {
        match (self, rhs) {
            (Numeric::Exact(a), Numeric::Exact(b)) => Some(a.cmp(b)),
            _ => self.to_f64().partial_cmp(&rhs.to_f64()),
        }
    }

    /// Run a float-only primitive (trig, exp, ...) and re-wrap in the
    /// representation of `self`. Exactness is capped at `f64` here;
    /// field arithmetic elsewhere stays exact.
    pub fn map_f64(&self, op: impl Fn(f64) -> f64) -> Numeric {
        let out = op(self.to_f64());
        match self {
            Numeric::Float(_) => Numeric::Float(out),
            Numeric::Exact(_) => BigRational::from_float(out)
                .map(Numeric::Exact)
                .unwrap_or(Numeric::Float(out)),
        }
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl fmt::Display for Numeric {
    /// Round-trip-safe plain serialization: floats use Rust's shortest
    /// representation, rationals print as `n/d`. Pretty-printing under
    /// display options lives in the session formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Float(v) => write!(f, "{}", v),
            Numeric::Exact(r) => {
                if r.is_integer() {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
        }
    }
}

/// Exact factorial of a nonnegative integer.
pub fn factorial_big(n: u64) -> BigInt {
    let mut acc = BigInt::one();
    for k in 2..=n {
        acc *= BigInt::from_u64(k).expect("u64 fits BigInt");
    }
    acc
}
