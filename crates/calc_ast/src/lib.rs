pub mod expression;

pub use expression::{
    add, div, func, mul, neg, num, pow, ratio, sub, var, Constant, Expr,
};
