//! Expression engine: evaluation context, tree evaluator, and the
//! symbolic derivative/simplify/antiderivative passes the calculus
//! operations build on.

pub mod builtins;
pub mod context;
pub mod diff;
pub mod error;
pub mod eval;
pub mod integrate;
pub mod simplify;
pub mod value;

pub use context::{AngleMode, Deadline, EvalContext, FunctionDef, NativeFn, Registry};
pub use error::{CalcResult, EngineError};
pub use eval::{eval, eval_numeric};
pub use value::Value;
