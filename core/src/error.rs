// core/src/error.rs
use thiserror::Error;

/// Datafeil som avbryter analysen av én økt.
///
/// Degenererte tilfeller (for få steg, for få fatigue-vinduer osv.) er
/// ikke feil – de løses til dokumenterte standardverdier i resultatet.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{series} series is empty")]
    EmptySeries { series: &'static str },

    #[error("{series} time is not monotonic at index {index}: {current} < {previous}")]
    NonMonotonicTime {
        series: &'static str,
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("{series} field '{field}' is not finite at index {index}")]
    NonFinite {
        series: &'static str,
        field: &'static str,
        index: usize,
    },

    #[error("unknown device position '{name}'")]
    UnknownDevice { name: String },

    #[error("required column '{column}' is missing")]
    MissingColumn { column: &'static str },

    #[error("invalid config value '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("parse error ({context}) at {path}: {message}")]
    Parse {
        context: &'static str,
        path: String,
        message: String,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Bygger en `Parse`-feil fra serde_path_to_error, med JSON-stien bevart.
    pub(crate) fn parse(
        context: &'static str,
        err: serde_path_to_error::Error<serde_json::Error>,
    ) -> Self {
        AnalysisError::Parse {
            context,
            path: err.path().to_string(),
            message: err.inner().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
