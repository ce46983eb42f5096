use calc_parser::ParseError;
use thiserror::Error;

/// Error taxonomy for evaluation and the calculus operation set.
///
/// Validation errors are raised before any computation; convergence
/// errors carry the partial findings in their message. Timeouts are
/// deliberately not here: a blown runtime budget degrades to a partial
/// result plus a notice on the context.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    UnsupportedExpression(String),

    #[error("Multivariable functions require a map for the point, ie {{ x: 1, y: 1 }}")]
    MultivariableContextRequired,

    #[error("Limit does not converge from both sides: x- = {left} while x+ = {right}")]
    LimitDoesNotConverge { left: String, right: String },

    #[error("{0}")]
    NonConvergent(String),

    #[error("Undefined symbol {0}")]
    UndefinedSymbol(String),

    #[error("Unknown function {0}")]
    UnknownFunction(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Numeric(String),
}

impl EngineError {
    /// Short tag used by the output formatter as the bold error name.
    pub fn name(&self) -> &'static str {
        match self {
            EngineError::InvalidInput(_) => "InvalidInput",
            EngineError::InvalidArgument(_) => "InvalidArgument",
            EngineError::UnsupportedExpression(_) => "UnsupportedExpression",
            EngineError::MultivariableContextRequired => "MultivariableContextRequired",
            EngineError::LimitDoesNotConverge { .. } => "LimitDoesNotConverge",
            EngineError::NonConvergent(_) => "NonConvergent",
            EngineError::UndefinedSymbol(_) => "UndefinedSymbol",
            EngineError::UnknownFunction(_) => "UnknownFunction",
            EngineError::Parse(_) => "ParseError",
            EngineError::Numeric(_) => "NumericError",
        }
    }
}

pub type CalcResult<T> = Result<T, EngineError>;
