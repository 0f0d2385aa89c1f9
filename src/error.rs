use std::fmt;

/// Error types for the optimizer and its random engine
#[derive(Debug, Clone, PartialEq)]
pub enum MinimizerError {
    Configuration(String),
    DimensionMismatch { expected: usize, found: usize },
    FunctionEvaluationError,
    IndexOutOfRange { index: usize, len: usize },
    InvalidDimension,
    InvalidParameters(String),
}

impl fmt::Display for MinimizerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MinimizerError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            MinimizerError::DimensionMismatch { expected, found } => {
                write!(
                    f,
                    "Dimension mismatch: expected {} values, found {}",
                    expected, found
                )
            }
            MinimizerError::FunctionEvaluationError => {
                write!(f, "Function evaluation returned invalid value")
            }
            MinimizerError::IndexOutOfRange { index, len } => {
                write!(f, "Index {} out of range for population of {}", index, len)
            }
            MinimizerError::InvalidDimension => write!(f, "Invalid dimension or empty vector"),
            MinimizerError::InvalidParameters(msg) => {
                write!(f, "Invalid parameters: {}", msg)
            }
        }
    }
}

impl std::error::Error for MinimizerError {}
