use thiserror::Error;

/// Failures raised by the analysis core (ingest, cleaning, aggregation, forecast).
///
/// These are structural data problems; none of them is transient.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// A date or numeric field could not be parsed.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A forecast was requested from fewer than two months of history.
    #[error("Forecast needs at least 2 months of history, got {observed}.")]
    InsufficientData { observed: usize },

    /// The monthly revenue series holds a NaN or infinite value, or the
    /// least-squares solve did not produce a finite line.
    #[error("Revenue history over {observed} months is not finite; no trend can be fitted.")]
    NonFiniteHistory { observed: usize },

    /// Every row was removed by cleaning or filtering.
    #[error("No sales records remain after {stage}.")]
    EmptyDataset { stage: &'static str },
}

impl AnalysisError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Error surfaced by the `sales` binary: a message plus a process exit code.
///
/// Exit codes: 2 input/IO, 3 data, 4 runtime/rendering.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        let exit_code = match err {
            AnalysisError::Parse { .. } => 2,
            AnalysisError::InsufficientData { .. }
            | AnalysisError::NonFiniteHistory { .. }
            | AnalysisError::EmptyDataset { .. } => 3,
        };
        Self::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
